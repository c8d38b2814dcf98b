// Library exports for plotspec

pub mod csv_reader;
pub mod data;
pub mod error;
pub mod runtime;
pub mod selection;
pub mod trace;
pub mod transform;

pub use data::{ColumnKind, ColumnRef, Dataset, Datum, RawSeries};
pub use error::EngineError;
pub use runtime::{build_figure, Figure};
pub use selection::{Aggregation, ChartKind, ChartStyle, Orientation, Selection};
pub use trace::{build_trace, LayoutSpec, TraceSeries, TraceSpec};
pub use transform::{aggregate, AggregateMode, AggregatedSeries};
