use thiserror::Error;

/// Failures the chart engine can report to its caller.
///
/// Everything here is a configuration problem with the current selection or
/// dataset; there is no transient failure mode, so nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Every chart kind needs at least an x binding.
    #[error("incomplete selection: no x-axis column is bound")]
    IncompleteSelection,

    /// Columns referenced by one selection must be index-aligned. We refuse
    /// to zero-pad or truncate.
    #[error("series length mismatch: x column has {expected} rows but '{column}' has {actual}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' not found in dataset")]
    ColumnNotFound(String),
}
