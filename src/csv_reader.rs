use anyhow::{Context, Result};
use std::io::{self, Read};

use crate::data::Dataset;

/// Read CSV with a header row from stdin.
pub fn read_csv_from_stdin() -> Result<Dataset> {
    read_csv_from_reader(io::stdin().lock())
}

/// Read CSV with a header row from an in-memory string.
pub fn read_csv_from_str(content: &str) -> Result<Dataset> {
    read_csv_from_reader(content.as_bytes())
}

fn read_csv_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.context("Failed to read CSV record")?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(Dataset::new(headers, rows))
}
