// Pipeline executor: one synchronous recomputation per selection change.
// Validate, fetch, optionally aggregate, then shape the trace/layout pair.
// No state survives between runs.

use serde::Serialize;

use crate::data::{Dataset, RawSeries};
use crate::error::EngineError;
use crate::selection::Selection;
use crate::trace::{build_trace, LayoutSpec, TraceSeries, TraceSpec};
use crate::transform::aggregate;

/// The finished figure handed back to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<TraceSpec>,
    pub layout: LayoutSpec,
}

/// Build a figure from a dataset and the current selection.
pub fn build_figure(dataset: &Dataset, selection: &Selection) -> Result<Figure, EngineError> {
    let x_ref = selection.require_x()?;
    let raw_x = dataset.fetch_column(&x_ref.name)?;

    let raw_y = fetch_optional(dataset, selection.y_axis.as_ref().map(|c| c.name.as_str()))?;
    let raw_color =
        fetch_optional(dataset, selection.color_axis.as_ref().map(|c| c.name.as_str()))?;

    // Columns referenced by one selection must be index-aligned.
    check_alignment(&raw_x, raw_y.as_ref(), selection.y_axis.as_ref().map(|c| c.name.as_str()))?;
    check_alignment(
        &raw_x,
        raw_color.as_ref(),
        selection.color_axis.as_ref().map(|c| c.name.as_str()),
    )?;

    let reducer = selection.aggregation.reducer();
    let (trace, layout) = match reducer {
        // Aggregation requests on distribution charts degrade to the raw path.
        Some(mode) if selection.chart_kind.supports_aggregation() => {
            let grouped = aggregate(&raw_x, raw_y.as_ref(), mode)?;
            build_trace(&TraceSeries::Aggregated(&grouped), selection)
        }
        _ => build_trace(
            &TraceSeries::Raw {
                x: &raw_x,
                y: raw_y.as_ref(),
                color: raw_color.as_ref(),
            },
            selection,
        ),
    };

    Ok(Figure {
        data: vec![trace],
        layout,
    })
}

fn fetch_optional(dataset: &Dataset, name: Option<&str>) -> Result<Option<RawSeries>, EngineError> {
    match name {
        Some(name) => Ok(Some(dataset.fetch_column(name)?)),
        None => Ok(None),
    }
}

fn check_alignment(
    raw_x: &RawSeries,
    other: Option<&RawSeries>,
    column: Option<&str>,
) -> Result<(), EngineError> {
    if let (Some(series), Some(column)) = (other, column) {
        if series.len() != raw_x.len() {
            return Err(EngineError::ShapeMismatch {
                column: column.to_string(),
                expected: raw_x.len(),
                actual: series.len(),
            });
        }
    }
    Ok(())
}
