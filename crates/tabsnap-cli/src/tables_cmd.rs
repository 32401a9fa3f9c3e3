use std::io;
use std::path::Path;

use tabsnap::{DocumentResult, Table, process_document};

use crate::cli::{OutputFormat, Tuning};
use crate::shared::{build_options, group_into_regions, load_regions, load_tokens};

pub fn run(
    tokens_path: &Path,
    regions_path: Option<&Path>,
    format: &OutputFormat,
    canonical: bool,
    tuning: &Tuning,
) -> Result<(), i32> {
    let tokens = load_tokens(tokens_path)?;
    let regions = match regions_path {
        Some(path) => Some(load_regions(path)?),
        None => None,
    };

    let options = build_options(tuning);
    let result = process_document(group_into_regions(tokens, regions), None, None, &options);

    match format {
        OutputFormat::Text => write_text(&result, canonical),
        OutputFormat::Json => write_json(&result, canonical),
        OutputFormat::Csv => write_csv(&result, canonical),
    }
}

fn chosen<'a>(table: &'a tabsnap::ExtractedTable, canonical: bool) -> &'a Table {
    if canonical {
        &table.validation
    } else {
        &table.table
    }
}

fn write_text(result: &DocumentResult, canonical: bool) -> Result<(), i32> {
    for extracted in &result.tables {
        let table = chosen(extracted, canonical);
        println!("# table {} ({} rows)", extracted.index, table.row_count());
        let labels: Vec<&str> = table.columns.iter().map(|c| c.label.as_str()).collect();
        println!("{}", labels.join("\t"));
        for row in &table.rows {
            println!("{}", row.join("\t"));
        }
    }
    Ok(())
}

fn write_json(result: &DocumentResult, canonical: bool) -> Result<(), i32> {
    let tables: Vec<&Table> = result.tables.iter().map(|t| chosen(t, canonical)).collect();
    let json = serde_json::to_string(&tables).expect("tables serialize");
    println!("{json}");
    Ok(())
}

fn write_csv(result: &DocumentResult, canonical: bool) -> Result<(), i32> {
    let mut first = true;
    for extracted in &result.tables {
        let table = chosen(extracted, canonical);
        if !first {
            println!();
        }
        first = false;

        let mut writer = csv::Writer::from_writer(io::stdout());
        let labels: Vec<&str> = table.columns.iter().map(|c| c.label.as_str()).collect();
        writer.write_record(&labels).map_err(csv_error)?;
        for row in &table.rows {
            writer.write_record(row).map_err(csv_error)?;
        }
        writer.flush().map_err(|e| {
            eprintln!("Error: failed to write CSV: {e}");
            1
        })?;
    }
    Ok(())
}

fn csv_error(e: csv::Error) -> i32 {
    eprintln!("Error: failed to write CSV: {e}");
    1
}
