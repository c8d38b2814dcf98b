use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::EngineError;

/// A single cell value as fetched for one column: number, string or null.
///
/// Untagged so a JSON column like `[1, "a", null]` maps directly onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Number(f64),
    Text(String),
    Null,
}

/// One column's fetched values, index-aligned with its sibling columns.
pub type RawSeries = Vec<Datum>;

impl Datum {
    /// Numeric view used by sum/avg reduction. Text that fails to parse and
    /// nulls contribute 0; stricter filtering is the caller's job using the
    /// dataset's declared column kinds.
    pub fn coerce_f64(&self) -> f64 {
        match self {
            Datum::Number(v) => *v,
            Datum::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Datum::Null => 0.0,
        }
    }

    /// Group key for aggregation. Matches how the consuming UI stringifies
    /// cell values: integral numbers print without a decimal point, null
    /// prints as "null".
    pub fn key_string(&self) -> String {
        match self {
            Datum::Number(v) => format_number(*v),
            Datum::Text(s) => s.clone(),
            Datum::Null => "null".to_string(),
        }
    }
}

fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Declared type of a dataset column, as reported to the UI on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    #[default]
    Other,
}

/// Name and declared kind of one dataset column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColumnRefRepr")]
pub struct ColumnRef {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Other,
        }
    }
}

/// Accepts either a bare column name or a full `{name, kind}` descriptor.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnRefRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        kind: ColumnKind,
    },
}

impl From<ColumnRefRepr> for ColumnRef {
    fn from(repr: ColumnRefRepr) -> Self {
        match repr {
            ColumnRefRepr::Name(name) => ColumnRef::named(name),
            ColumnRefRepr::Full { name, kind } => ColumnRef { name, kind },
        }
    }
}

/// In-memory tabular dataset: the data-access collaborator behind the
/// engine's fetch-column contract.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Create a Dataset from a JSON array of objects (one object per row).
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(anyhow!("Input data array is empty"));
        }

        // Headers come from the first object
        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| anyhow!("Items in array must be objects"))?;

        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut row = Vec::new();
            for header in &headers {
                let val_str = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => "".to_string(),
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                row.push(val_str);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Fetch one column's ordered values. Empty cells become null, cells that
    /// parse as f64 become numbers, everything else stays text.
    pub fn fetch_column(&self, name: &str) -> Result<RawSeries, EngineError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| EngineError::ColumnNotFound(name.to_string()))?;

        Ok(self
            .rows
            .iter()
            .map(|row| parse_cell(row.get(idx).map(String::as_str).unwrap_or("")))
            .collect())
    }

    /// Column descriptors with inferred kinds, in header order.
    pub fn columns(&self) -> Vec<ColumnRef> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, name)| ColumnRef {
                name: name.clone(),
                kind: self.infer_kind(idx),
            })
            .collect()
    }

    fn infer_kind(&self, idx: usize) -> ColumnKind {
        let cells: Vec<&str> = self
            .rows
            .iter()
            .filter_map(|row| row.get(idx))
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();

        if cells.is_empty() {
            return ColumnKind::Other;
        }
        if cells.iter().all(|c| c.parse::<f64>().is_ok()) {
            return ColumnKind::Numeric;
        }

        let distinct: HashSet<&str> = cells.iter().copied().collect();
        if distinct.len() <= 20 || distinct.len() * 2 <= cells.len() {
            ColumnKind::Categorical
        } else {
            ColumnKind::Other
        }
    }
}

fn parse_cell(raw: &str) -> Datum {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Datum::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(v) => Datum::Number(v),
        Err(_) => Datum::Text(trimmed.to_string()),
    }
}
