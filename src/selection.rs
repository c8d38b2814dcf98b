// Selection state: the immutable snapshot of user-chosen chart parameters.
// The surrounding UI rebuilds and replaces it wholesale on every interaction.

use serde::Deserialize;

use crate::data::ColumnRef;
use crate::error::EngineError;
use crate::transform::AggregateMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Pie,
    Histogram,
    Box,
}

impl ChartKind {
    /// Group-by aggregation collapses rows per x value, which has no meaning
    /// for distribution charts. For those the request is ignored rather than
    /// rejected.
    pub fn supports_aggregation(self) -> bool {
        !matches!(self, ChartKind::Box | ChartKind::Histogram)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    None,
    Count,
    Sum,
    Avg,
}

impl Aggregation {
    /// The reducer to run, or None when raw rows pass through unchanged.
    pub fn reducer(self) -> Option<AggregateMode> {
        match self {
            Aggregation::None => None,
            Aggregation::Count => Some(AggregateMode::Count),
            Aggregation::Sum => Some(AggregateMode::Sum),
            Aggregation::Avg => Some(AggregateMode::Avg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Display toggles passed through verbatim into the layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartStyle {
    pub title: Option<String>,
    pub show_legend: bool,
    pub show_grid: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: None,
            show_legend: true,
            show_grid: true,
        }
    }
}

/// Complete chart parameter snapshot for one recomputation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub chart_kind: ChartKind,
    #[serde(default)]
    pub x_axis: Option<ColumnRef>,
    #[serde(default)]
    pub y_axis: Option<ColumnRef>,
    #[serde(default)]
    pub color_axis: Option<ColumnRef>,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub style: ChartStyle,
}

impl Selection {
    /// Every chart kind needs an x binding; refuse to build without one.
    pub fn require_x(&self) -> Result<&ColumnRef, EngineError> {
        self.x_axis.as_ref().ok_or(EngineError::IncompleteSelection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnKind;

    #[test]
    fn test_deserialize_full_selection() {
        let sel: Selection = serde_json::from_str(
            r#"{
                "chartKind": "bar",
                "xAxis": "city",
                "yAxis": {"name": "sales", "kind": "numeric"},
                "aggregation": "sum",
                "orientation": "horizontal",
                "style": {"title": "Sales by city", "showLegend": false, "showGrid": true}
            }"#,
        )
        .unwrap();
        assert_eq!(sel.chart_kind, ChartKind::Bar);
        assert_eq!(sel.x_axis.unwrap().name, "city");
        let y = sel.y_axis.unwrap();
        assert_eq!(y.kind, ColumnKind::Numeric);
        assert_eq!(sel.aggregation, Aggregation::Sum);
        assert_eq!(sel.orientation, Orientation::Horizontal);
        assert_eq!(sel.style.title.as_deref(), Some("Sales by city"));
        assert!(!sel.style.show_legend);
    }

    #[test]
    fn test_deserialize_defaults() {
        let sel: Selection =
            serde_json::from_str(r#"{"chartKind": "histogram", "xAxis": "age"}"#).unwrap();
        assert_eq!(sel.aggregation, Aggregation::None);
        assert_eq!(sel.orientation, Orientation::Vertical);
        assert!(sel.y_axis.is_none());
        assert!(sel.color_axis.is_none());
        assert!(sel.style.show_legend);
        assert!(sel.style.show_grid);
    }

    #[test]
    fn test_require_x_missing() {
        let sel: Selection = serde_json::from_str(r#"{"chartKind": "line"}"#).unwrap();
        assert_eq!(sel.require_x().unwrap_err(), EngineError::IncompleteSelection);
    }

    #[test]
    fn test_aggregation_supported_per_kind() {
        assert!(ChartKind::Bar.supports_aggregation());
        assert!(ChartKind::Pie.supports_aggregation());
        assert!(!ChartKind::Box.supports_aggregation());
        assert!(!ChartKind::Histogram.supports_aggregation());
    }
}
