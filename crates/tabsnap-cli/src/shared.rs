use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tabsnap::{ExtractOptions, Region, RegionTokens, TableConfig, Token};

use crate::cli::Tuning;

/// Load the OCR token dump with user-friendly error messages.
///
/// Returns `Err(2)` with a message printed to stderr if the file is
/// missing or not valid token JSON.
pub fn load_tokens(path: &Path) -> Result<Vec<Token>, i32> {
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("Error: failed to parse token JSON: {e}");
        2
    })
}

/// Load detector regions from JSON.
pub fn load_regions(path: &Path) -> Result<Vec<Region>, i32> {
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("Error: failed to parse region JSON: {e}");
        2
    })
}

/// Load a flat string-to-string JSON object (header fields, key maps).
pub fn load_string_map(path: &Path) -> Result<BTreeMap<String, String>, i32> {
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("Error: failed to parse JSON object: {e}");
        2
    })
}

/// Read a file to a string, reporting missing files distinctly.
pub fn read_file(path: &Path) -> Result<String, i32> {
    if !path.exists() {
        eprintln!("Error: file not found: {}", path.display());
        return Err(2);
    }
    fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", path.display());
        2
    })
}

/// Build extraction options from the tuning flags.
pub fn build_options(tuning: &Tuning) -> ExtractOptions {
    ExtractOptions {
        confidence_threshold: tuning.confidence_threshold,
        table: TableConfig {
            row_tolerance: tuning.row_tolerance,
            dynamic_row_tolerance: !tuning.no_dynamic_tolerance,
            header_merge_tolerance: tuning.header_merge_tolerance,
            column_binning_from_header: !tuning.no_header_bins,
            band_pad: tuning.band_pad,
            ..TableConfig::default()
        },
        ..ExtractOptions::default()
    }
}

/// Pair tokens with their regions.
///
/// Without a region file, all tokens form one region spanning their full
/// extent. With one, each token is assigned to every region containing
/// its box center (tokens in page coordinates).
pub fn group_into_regions(tokens: Vec<Token>, regions: Option<Vec<Region>>) -> Vec<RegionTokens> {
    match regions {
        None => {
            if tokens.is_empty() {
                return Vec::new();
            }
            let x2 = tokens.iter().map(|t| t.left + t.width).max().unwrap_or(0);
            let y2 = tokens.iter().map(|t| t.top + t.height).max().unwrap_or(0);
            vec![RegionTokens {
                region: Region::new(0, 0, x2, y2),
                tokens,
            }]
        }
        Some(regions) => regions
            .into_iter()
            .map(|region| {
                let inside: Vec<Token> = tokens
                    .iter()
                    .filter(|t| {
                        let cx = t.left + t.width / 2;
                        let cy = t.top + t.height / 2;
                        cx >= region.x1 && cx <= region.x2 && cy >= region.y1 && cy <= region.y2
                    })
                    .cloned()
                    .collect();
                RegionTokens {
                    region,
                    tokens: inside,
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_span_one_region_without_a_region_file() {
        let tokens = vec![Token::new("a", 10, 10, 30, 20), Token::new("b", 500, 300, 40, 20)];
        let grouped = group_into_regions(tokens, None);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].region, Region::new(0, 0, 540, 320));
        assert_eq!(grouped[0].tokens.len(), 2);
    }

    #[test]
    fn tokens_are_assigned_to_containing_regions() {
        let tokens = vec![Token::new("a", 10, 10, 30, 20), Token::new("b", 500, 700, 40, 20)];
        let regions = vec![Region::new(0, 0, 400, 400), Region::new(400, 600, 800, 800)];
        let grouped = group_into_regions(tokens, Some(regions));
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].tokens.len(), 1);
        assert_eq!(grouped[0].tokens[0].text, "a");
        assert_eq!(grouped[1].tokens[0].text, "b");
    }

    #[test]
    fn no_tokens_means_no_regions() {
        assert!(group_into_regions(Vec::new(), None).is_empty());
    }
}
