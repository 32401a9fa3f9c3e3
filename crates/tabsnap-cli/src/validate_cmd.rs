use std::path::Path;

use tabsnap::process_document;

use crate::cli::{OutputFormat, Tuning};
use crate::shared::{
    build_options, group_into_regions, load_regions, load_string_map, load_tokens, read_file,
};

pub fn run(
    tokens_path: &Path,
    regions_path: Option<&Path>,
    header_path: Option<&Path>,
    page_text_path: Option<&Path>,
    format: &OutputFormat,
    tuning: &Tuning,
) -> Result<(), i32> {
    let tokens = load_tokens(tokens_path)?;
    let regions = match regions_path {
        Some(path) => Some(load_regions(path)?),
        None => None,
    };
    let header = match header_path {
        Some(path) => Some(load_string_map(path)?),
        None => None,
    };
    let page_text = match page_text_path {
        Some(path) => Some(read_file(path)?),
        None => None,
    };

    let options = build_options(tuning);
    let result = process_document(
        group_into_regions(tokens, regions),
        header.as_ref(),
        page_text.as_deref(),
        &options,
    );

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(&result.warnings).expect("warnings serialize");
            println!("{json}");
        }
        _ => {
            for warning in &result.warnings {
                println!("{warning}");
            }
            eprintln!(
                "{} table(s), {} warning(s)",
                result.tables.len(),
                result.warnings.len()
            );
        }
    }
    Ok(())
}
