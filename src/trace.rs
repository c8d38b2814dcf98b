// Trace builder: shape raw or aggregated series into a renderable
// trace/layout pair. Pure function of its inputs; same inputs, same output.

use serde::Serialize;

use crate::data::{Datum, RawSeries};
use crate::selection::{Aggregation, ChartKind, Orientation, Selection};
use crate::transform::AggregatedSeries;

/// Default bar fill when no color column is bound.
pub const DEFAULT_BAR_COLOR: &str = "#3b82f6";
/// Default line stroke. Kept distinct from the bar fill so traces from the
/// same session never collide.
pub const DEFAULT_LINE_COLOR: &str = "#f59e0b";
/// Flat scatter marker color when no color scale is in play.
pub const DEFAULT_MARKER_COLOR: &str = "#10b981";

/// Input to the trace builder: either the raw fetched columns or the
/// aggregator's grouped output.
#[derive(Debug, Clone, Copy)]
pub enum TraceSeries<'a> {
    Raw {
        x: &'a RawSeries,
        y: Option<&'a RawSeries>,
        color: Option<&'a RawSeries>,
    },
    Aggregated(&'a AggregatedSeries),
}

/// Marker styling. Optional fields stay off the wire entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<MarkerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
}

impl Marker {
    fn flat(color: &str) -> Self {
        Self {
            color: Some(MarkerColor::Fixed(color.to_string())),
            colorscale: None,
            showscale: None,
        }
    }
}

/// Either one fixed color for the whole trace or one value per row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Fixed(String),
    PerPoint(Vec<Datum>),
}

/// Stroke hints for line traces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineHint {
    pub shape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Chart geometry, discriminated by chart kind. Each variant carries exactly
/// the fields its kind renders with; serialization is the wire shape handed
/// to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TraceSpec {
    Histogram {
        x: Vec<Datum>,
        name: String,
    },
    Pie {
        labels: Vec<Datum>,
        values: Vec<Datum>,
        textinfo: String,
        name: String,
    },
    Box {
        #[serde(skip_serializing_if = "Option::is_none")]
        x: Option<Vec<Datum>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        y: Option<Vec<Datum>>,
        name: String,
    },
    Bar {
        x: Vec<Datum>,
        y: Vec<Datum>,
        #[serde(skip_serializing_if = "Option::is_none")]
        orientation: Option<String>,
        marker: Marker,
        name: String,
    },
    Line {
        x: Vec<Datum>,
        y: Vec<Datum>,
        mode: String,
        line: LineHint,
        #[serde(skip_serializing_if = "Option::is_none")]
        marker: Option<Marker>,
        name: String,
    },
    Scatter {
        x: Vec<Datum>,
        y: Vec<Datum>,
        mode: String,
        marker: Marker,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub showgrid: bool,
}

/// Axis titles and display toggles accompanying a trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub xaxis: AxisSpec,
    pub yaxis: AxisSpec,
    pub showlegend: bool,
}

/// Build the trace/layout pair for one selection.
pub fn build_trace(series: &TraceSeries, selection: &Selection) -> (TraceSpec, LayoutSpec) {
    (shape_trace(series, selection), derive_layout(selection))
}

/// x and y arrays for the active series. Aggregated keys become text labels,
/// aggregated values become numbers; a missing raw y shows up as empty.
fn xy_arrays(series: &TraceSeries) -> (Vec<Datum>, Vec<Datum>) {
    match *series {
        TraceSeries::Raw { x, y, .. } => (x.clone(), y.cloned().unwrap_or_default()),
        TraceSeries::Aggregated(agg) => (
            agg.keys.iter().map(|k| Datum::Text(k.clone())).collect(),
            agg.values.iter().map(|v| Datum::Number(*v)).collect(),
        ),
    }
}

/// Per-row color values, present only when a color column is bound and no
/// aggregation collapsed the rows it indexes.
fn row_colors(series: &TraceSeries, selection: &Selection) -> Option<Vec<Datum>> {
    if selection.aggregation != Aggregation::None || selection.color_axis.is_none() {
        return None;
    }
    match *series {
        TraceSeries::Raw { color: Some(vals), .. } => Some(vals.clone()),
        _ => None,
    }
}

fn shape_trace(series: &TraceSeries, selection: &Selection) -> TraceSpec {
    let x_name = selection.x_axis.as_ref().map(|c| c.name.clone());
    let y_name = selection.y_axis.as_ref().map(|c| c.name.clone());
    let name = y_name.or(x_name).unwrap_or_default();

    match selection.chart_kind {
        ChartKind::Histogram => {
            // Single-axis distribution: y and color bindings are ignored.
            let (x, _) = xy_arrays(series);
            TraceSpec::Histogram { x, name }
        }
        ChartKind::Pie => {
            let (labels, values) = xy_arrays(series);
            TraceSpec::Pie {
                labels,
                values,
                textinfo: "label+percent".to_string(),
                name,
            }
        }
        ChartKind::Box => {
            let (values, grouping) = match *series {
                TraceSeries::Raw { x, y, .. } => (x.clone(), y.cloned()),
                TraceSeries::Aggregated(_) => {
                    let (x, _) = xy_arrays(series);
                    (x, None)
                }
            };
            // Vertical: values on the value (y) axis, optional grouping on x.
            // Horizontal swaps them.
            match selection.orientation {
                Orientation::Vertical => TraceSpec::Box {
                    x: grouping,
                    y: Some(values),
                    name,
                },
                Orientation::Horizontal => TraceSpec::Box {
                    x: Some(values),
                    y: grouping,
                    name,
                },
            }
        }
        ChartKind::Bar => {
            let (x, y) = xy_arrays(series);
            let marker = match row_colors(series, selection) {
                Some(colors) => Marker {
                    color: Some(MarkerColor::PerPoint(colors)),
                    colorscale: None,
                    showscale: None,
                },
                None => Marker::flat(DEFAULT_BAR_COLOR),
            };
            match selection.orientation {
                Orientation::Vertical => TraceSpec::Bar {
                    x,
                    y,
                    orientation: None,
                    marker,
                    name,
                },
                Orientation::Horizontal => TraceSpec::Bar {
                    x: y,
                    y: x,
                    orientation: Some("h".to_string()),
                    marker,
                    name,
                },
            }
        }
        ChartKind::Line => {
            let (x, y) = xy_arrays(series);
            let colors = row_colors(series, selection);
            TraceSpec::Line {
                x,
                y,
                mode: "lines+markers".to_string(),
                line: LineHint {
                    shape: "spline".to_string(),
                    // Default stroke only when no color column takes over.
                    color: if colors.is_none() {
                        Some(DEFAULT_LINE_COLOR.to_string())
                    } else {
                        None
                    },
                },
                marker: colors.map(|vals| Marker {
                    color: Some(MarkerColor::PerPoint(vals)),
                    colorscale: None,
                    showscale: None,
                }),
                name,
            }
        }
        ChartKind::Scatter => {
            let (x, y) = xy_arrays(series);
            let marker = match row_colors(series, selection) {
                Some(colors) => Marker {
                    color: Some(MarkerColor::PerPoint(colors)),
                    colorscale: Some("Viridis".to_string()),
                    showscale: Some(true),
                },
                None => Marker::flat(DEFAULT_MARKER_COLOR),
            };
            TraceSpec::Scatter {
                x,
                y,
                mode: "markers".to_string(),
                marker,
                name,
            }
        }
    }
}

/// Axis titles follow the selected column names, swapped under horizontal
/// orientation exactly as the data is swapped; toggles pass through verbatim.
fn derive_layout(selection: &Selection) -> LayoutSpec {
    let x_title = selection.x_axis.as_ref().map(|c| c.name.clone());
    let y_title = selection.y_axis.as_ref().map(|c| c.name.clone());

    let swapped = selection.orientation == Orientation::Horizontal
        && matches!(selection.chart_kind, ChartKind::Bar | ChartKind::Box);
    let (x_title, y_title) = if swapped {
        (y_title, x_title)
    } else {
        (x_title, y_title)
    };

    LayoutSpec {
        title: selection.style.title.clone(),
        xaxis: AxisSpec {
            title: x_title,
            showgrid: selection.style.show_grid,
        },
        yaxis: AxisSpec {
            title: y_title,
            showgrid: selection.style.show_grid,
        },
        showlegend: selection.style.show_legend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnRef;
    use crate::selection::ChartStyle;

    fn texts(values: &[&str]) -> RawSeries {
        values.iter().map(|v| Datum::Text(v.to_string())).collect()
    }

    fn numbers(values: &[f64]) -> RawSeries {
        values.iter().map(|v| Datum::Number(*v)).collect()
    }

    fn selection(kind: ChartKind) -> Selection {
        Selection {
            chart_kind: kind,
            x_axis: Some(ColumnRef::named("city")),
            y_axis: Some(ColumnRef::named("sales")),
            color_axis: None,
            aggregation: Aggregation::None,
            orientation: Orientation::Vertical,
            style: ChartStyle::default(),
        }
    }

    #[test]
    fn test_build_trace_is_idempotent() {
        let x = texts(&["a", "b"]);
        let y = numbers(&[1.0, 2.0]);
        let series = TraceSeries::Raw {
            x: &x,
            y: Some(&y),
            color: None,
        };
        let sel = selection(ChartKind::Bar);
        let first = build_trace(&series, &sel);
        let second = build_trace(&series, &sel);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.0).unwrap(),
            serde_json::to_string(&second.0).unwrap()
        );
    }

    #[test]
    fn test_histogram_ignores_y_and_color() {
        let x = numbers(&[1.0, 2.0, 2.0]);
        let y = numbers(&[9.0, 9.0, 9.0]);
        let color = numbers(&[1.0, 2.0, 3.0]);
        let series = TraceSeries::Raw {
            x: &x,
            y: Some(&y),
            color: Some(&color),
        };
        let mut sel = selection(ChartKind::Histogram);
        sel.color_axis = Some(ColumnRef::named("heat"));
        let (trace, _) = build_trace(&series, &sel);
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["type"], "histogram");
        assert_eq!(json["x"].as_array().unwrap().len(), 3);
        assert!(json.get("y").is_none());
        assert!(json.get("marker").is_none());
        assert!(json.get("values").is_none());
    }

    #[test]
    fn test_pie_labels_values_and_textinfo() {
        let agg = AggregatedSeries {
            keys: vec!["a".into(), "b".into()],
            values: vec![3.0, 1.0],
        };
        let mut sel = selection(ChartKind::Pie);
        sel.aggregation = Aggregation::Count;
        let (trace, _) = build_trace(&TraceSeries::Aggregated(&agg), &sel);
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["type"], "pie");
        assert_eq!(json["labels"], serde_json::json!(["a", "b"]));
        assert_eq!(json["values"], serde_json::json!([3.0, 1.0]));
        assert_eq!(json["textinfo"], "label+percent");
    }

    #[test]
    fn test_box_orientation_swap() {
        let values = numbers(&[1.0, 2.0, 3.0]);
        let groups = texts(&["g1", "g1", "g2"]);
        let series = TraceSeries::Raw {
            x: &values,
            y: Some(&groups),
            color: None,
        };

        let vertical = selection(ChartKind::Box);
        let (trace, _) = build_trace(&series, &vertical);
        match trace {
            TraceSpec::Box { x, y, .. } => {
                assert_eq!(x, Some(groups.clone()));
                assert_eq!(y, Some(values.clone()));
            }
            other => panic!("expected box trace, got {:?}", other),
        }

        let mut horizontal = selection(ChartKind::Box);
        horizontal.orientation = Orientation::Horizontal;
        let (trace, _) = build_trace(&series, &horizontal);
        match trace {
            TraceSpec::Box { x, y, .. } => {
                assert_eq!(x, Some(values.clone()));
                assert_eq!(y, Some(groups.clone()));
            }
            other => panic!("expected box trace, got {:?}", other),
        }
    }

    #[test]
    fn test_bar_orientation_symmetry() {
        let x = texts(&["a", "b"]);
        let y = numbers(&[1.0, 2.0]);

        let mut horizontal = selection(ChartKind::Bar);
        horizontal.orientation = Orientation::Horizontal;
        let series = TraceSeries::Raw {
            x: &x,
            y: Some(&y),
            color: None,
        };
        let (h_trace, h_layout) = build_trace(&series, &horizontal);

        // Building the vertical counterpart from pre-swapped columns must
        // land the same values on the same geometric axes.
        let mut vertical = selection(ChartKind::Bar);
        vertical.x_axis = Some(ColumnRef::named("sales"));
        vertical.y_axis = Some(ColumnRef::named("city"));
        let swapped_series = TraceSeries::Raw {
            x: &y,
            y: Some(&x),
            color: None,
        };
        let (v_trace, v_layout) = build_trace(&swapped_series, &vertical);

        match (&h_trace, &v_trace) {
            (
                TraceSpec::Bar { x: hx, y: hy, orientation, .. },
                TraceSpec::Bar { x: vx, y: vy, .. },
            ) => {
                assert_eq!(orientation.as_deref(), Some("h"));
                assert_eq!(hx, vx);
                assert_eq!(hy, vy);
            }
            other => panic!("expected bar traces, got {:?}", other),
        }
        assert_eq!(h_layout.xaxis.title, v_layout.xaxis.title);
        assert_eq!(h_layout.yaxis.title, v_layout.yaxis.title);
    }

    #[test]
    fn test_bar_color_suppressed_under_aggregation() {
        let x = texts(&["a", "b"]);
        let y = numbers(&[1.0, 2.0]);
        let color = numbers(&[0.1, 0.9]);
        let mut sel = selection(ChartKind::Bar);
        sel.color_axis = Some(ColumnRef::named("heat"));
        sel.aggregation = Aggregation::Sum;
        let series = TraceSeries::Raw {
            x: &x,
            y: Some(&y),
            color: Some(&color),
        };
        let (trace, _) = build_trace(&series, &sel);
        match trace {
            TraceSpec::Bar { marker, .. } => {
                assert_eq!(
                    marker.color,
                    Some(MarkerColor::Fixed(DEFAULT_BAR_COLOR.to_string()))
                );
                assert!(marker.colorscale.is_none());
            }
            other => panic!("expected bar trace, got {:?}", other),
        }
    }

    #[test]
    fn test_bar_per_row_colors_without_aggregation() {
        let x = texts(&["a", "b"]);
        let y = numbers(&[1.0, 2.0]);
        let color = numbers(&[0.1, 0.9]);
        let mut sel = selection(ChartKind::Bar);
        sel.color_axis = Some(ColumnRef::named("heat"));
        let series = TraceSeries::Raw {
            x: &x,
            y: Some(&y),
            color: Some(&color),
        };
        let (trace, _) = build_trace(&series, &sel);
        match trace {
            TraceSpec::Bar { marker, .. } => {
                assert_eq!(marker.color, Some(MarkerColor::PerPoint(color.clone())));
            }
            other => panic!("expected bar trace, got {:?}", other),
        }
    }

    #[test]
    fn test_line_defaults() {
        let x = numbers(&[1.0, 2.0]);
        let y = numbers(&[3.0, 4.0]);
        let series = TraceSeries::Raw {
            x: &x,
            y: Some(&y),
            color: None,
        };
        let (trace, _) = build_trace(&series, &selection(ChartKind::Line));
        match trace {
            TraceSpec::Line { mode, line, marker, .. } => {
                assert_eq!(mode, "lines+markers");
                assert_eq!(line.shape, "spline");
                assert_eq!(line.color.as_deref(), Some(DEFAULT_LINE_COLOR));
                assert!(marker.is_none());
            }
            other => panic!("expected line trace, got {:?}", other),
        }
    }

    #[test]
    fn test_default_colors_never_collide() {
        assert_ne!(DEFAULT_BAR_COLOR, DEFAULT_LINE_COLOR);
    }

    #[test]
    fn test_scatter_color_scale() {
        let x = numbers(&[1.0, 2.0]);
        let y = numbers(&[3.0, 4.0]);
        let color = numbers(&[10.0, 20.0]);
        let mut sel = selection(ChartKind::Scatter);
        sel.color_axis = Some(ColumnRef::named("heat"));
        let series = TraceSeries::Raw {
            x: &x,
            y: Some(&y),
            color: Some(&color),
        };
        let (trace, _) = build_trace(&series, &sel);
        match trace {
            TraceSpec::Scatter { mode, marker, .. } => {
                assert_eq!(mode, "markers");
                assert_eq!(marker.color, Some(MarkerColor::PerPoint(color.clone())));
                assert_eq!(marker.colorscale.as_deref(), Some("Viridis"));
                assert_eq!(marker.showscale, Some(true));
            }
            other => panic!("expected scatter trace, got {:?}", other),
        }

        // Without the color column the marker is one flat color.
        let plain = TraceSeries::Raw {
            x: &x,
            y: Some(&y),
            color: None,
        };
        let (trace, _) = build_trace(&plain, &selection(ChartKind::Scatter));
        match trace {
            TraceSpec::Scatter { marker, .. } => {
                assert_eq!(
                    marker.color,
                    Some(MarkerColor::Fixed(DEFAULT_MARKER_COLOR.to_string()))
                );
                assert!(marker.showscale.is_none());
            }
            other => panic!("expected scatter trace, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_series_builds_empty_trace() {
        let x = RawSeries::new();
        let series = TraceSeries::Raw {
            x: &x,
            y: None,
            color: None,
        };
        let (trace, _) = build_trace(&series, &selection(ChartKind::Scatter));
        match trace {
            TraceSpec::Scatter { x, y, .. } => {
                assert!(x.is_empty());
                assert!(y.is_empty());
            }
            other => panic!("expected scatter trace, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_passthrough_and_swap() {
        let mut sel = selection(ChartKind::Bar);
        sel.style = ChartStyle {
            title: Some("Sales".into()),
            show_legend: false,
            show_grid: false,
        };
        sel.orientation = Orientation::Horizontal;
        let layout = derive_layout(&sel);
        assert_eq!(layout.title.as_deref(), Some("Sales"));
        assert!(!layout.showlegend);
        assert!(!layout.xaxis.showgrid);
        // Titles follow the data swap
        assert_eq!(layout.xaxis.title.as_deref(), Some("sales"));
        assert_eq!(layout.yaxis.title.as_deref(), Some("city"));

        // Orientation is meaningless for a line chart, titles stay put
        let mut line_sel = selection(ChartKind::Line);
        line_sel.orientation = Orientation::Horizontal;
        let layout = derive_layout(&line_sel);
        assert_eq!(layout.xaxis.title.as_deref(), Some("city"));
        assert_eq!(layout.yaxis.title.as_deref(), Some("sales"));
    }
}
