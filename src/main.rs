use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};

use plotspec::{csv_reader, data::Dataset, runtime, selection::Selection};

#[derive(Parser, Debug)]
#[command(name = "plotspec")]
#[command(about = "Build renderable figure JSON from tabular data and a chart selection", long_about = None)]
struct Args {
    /// Chart selection as JSON
    /// (e.g. '{"chartKind":"bar","xAxis":"city","yAxis":"sales","aggregation":"sum"}')
    #[arg(required_unless_present = "columns")]
    selection: Option<String>,

    /// Read rows as a JSON array of objects instead of CSV
    #[arg(long)]
    json: bool,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,

    /// List the dataset's columns with inferred kinds instead of building a figure
    #[arg(long)]
    columns: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Read tabular data from stdin
    let dataset = if args.json {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read JSON from stdin")?;
        let value = serde_json::from_str(&input).context("Input is not valid JSON")?;
        Dataset::from_json(&value).context("Failed to build dataset from JSON rows")?
    } else {
        csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?
    };

    let output = if args.columns {
        to_json(&dataset.columns(), args.pretty)?
    } else {
        let selection_json = args.selection.as_deref().unwrap_or_default();
        let selection: Selection =
            serde_json::from_str(selection_json).context("Failed to parse selection JSON")?;

        let figure = runtime::build_figure(&dataset, &selection)
            .context("Failed to build figure from selection")?;
        to_json(&figure, args.pretty)?
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", output).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    out.context("Failed to serialize output")
}
