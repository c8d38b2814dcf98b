// Group-by aggregation: collapse rows sharing an x value into one
// (key, value) pair per distinct key, in first-occurrence order.

use std::collections::HashMap;

use crate::data::{Datum, RawSeries};
use crate::error::EngineError;

/// The reducer to apply to each group's y values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    Count,
    Sum,
    Avg,
}

/// Grouped result: keys unique, ordered by first occurrence in the x column.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSeries {
    pub keys: Vec<String>,
    pub values: Vec<f64>,
}

impl AggregatedSeries {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Aggregate `raw_y` grouped by the stringified values of `raw_x`.
///
/// One pass over the rows, keeping a running (sum, count) per key. Keys are
/// emitted in the order their first row appears, never sorted. When `raw_y`
/// is absent every row contributes its presence, so the result is the group
/// count whatever the requested mode. An empty `raw_x` yields an empty
/// series, not an error.
pub fn aggregate(
    raw_x: &RawSeries,
    raw_y: Option<&RawSeries>,
    mode: AggregateMode,
) -> Result<AggregatedSeries, EngineError> {
    if let Some(y) = raw_y {
        if y.len() != raw_x.len() {
            return Err(EngineError::ShapeMismatch {
                column: "y-axis".to_string(),
                expected: raw_x.len(),
                actual: y.len(),
            });
        }
    }

    let mut slot_of: HashMap<String, usize> = HashMap::new();
    let mut keys: Vec<String> = Vec::new();
    let mut sums: Vec<f64> = Vec::new();
    let mut counts: Vec<u64> = Vec::new();

    for (i, x) in raw_x.iter().enumerate() {
        let key = x.key_string();
        let slot = match slot_of.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = keys.len();
                slot_of.insert(key.clone(), slot);
                keys.push(key);
                sums.push(0.0);
                counts.push(0);
                slot
            }
        };
        if let Some(y) = raw_y {
            sums[slot] += y[i].coerce_f64();
        }
        counts[slot] += 1;
    }

    let values = (0..keys.len())
        .map(|slot| match (raw_y, mode) {
            // Nothing to sum or average: fall back to counting rows per key.
            (None, _) | (_, AggregateMode::Count) => counts[slot] as f64,
            (Some(_), AggregateMode::Sum) => sums[slot],
            (Some(_), AggregateMode::Avg) => sums[slot] / counts[slot] as f64,
        })
        .collect();

    Ok(AggregatedSeries { keys, values })
}
