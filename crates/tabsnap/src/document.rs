//! Document orchestration: many regions, one warning list.
//!
//! Regions are independent — extraction runs them in parallel — and join
//! only for the document-level aggregate checks at the end.

use std::collections::BTreeMap;

use rayon::prelude::*;

use tabsnap_core::geometry::Region;
use tabsnap_core::table::Table;
use tabsnap_core::token::Token;
use tabsnap_core::validate::{Warning, validate_document};

use crate::pipeline::{ExtractOptions, extract_table};

/// Regions smaller than this on either axis are detector slivers.
pub const MIN_REGION_SIZE: i64 = 20;

/// The OCR tokens recognized inside one detected table region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionTokens {
    /// The region rectangle, in page coordinates.
    pub region: Region,
    /// Tokens recognized within the region crop.
    pub tokens: Vec<Token>,
}

/// One extracted table with its display and validation forms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractedTable {
    /// Stable table index within the document (top-to-bottom order).
    pub index: usize,
    /// The region this table came from.
    pub region: Region,
    /// The display table (original labels, configured column order).
    pub table: Table,
    /// The validation view (canonical-role columns only).
    pub validation: Table,
}

/// The result of processing one document page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentResult {
    /// Extracted tables, one per usable region, in region order.
    pub tables: Vec<ExtractedTable>,
    /// All validation findings for the document.
    pub warnings: Vec<Warning>,
}

/// Parse `Key: Value` lines from header-strip text into a field map.
///
/// Keys are renamed through `key_map` when present, so downstream
/// consumers see normalized field names regardless of the drawing's
/// labeling language.
pub fn parse_header_lines(
    text: &str,
    key_map: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut header = BTreeMap::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let key = key_map.get(key).cloned().unwrap_or_else(|| key.to_string());
            header.insert(key, value.trim().to_string());
        }
    }
    header
}

/// Process every region of a document page.
///
/// Degenerate regions are skipped; the rest are sorted top-to-bottom,
/// left-to-right (table numbering depends on this order) and extracted in
/// parallel. Validation runs once over all validation views, including the
/// document-level totals check when `page_text` is available.
pub fn process_document(
    regions: Vec<RegionTokens>,
    header: Option<&BTreeMap<String, String>>,
    page_text: Option<&str>,
    options: &ExtractOptions,
) -> DocumentResult {
    let mut usable: Vec<RegionTokens> = regions
        .into_iter()
        .filter(|r| !r.region.is_degenerate(MIN_REGION_SIZE))
        .collect();
    usable.sort_by(|a, b| {
        a.region
            .y1
            .cmp(&b.region.y1)
            .then(a.region.x1.cmp(&b.region.x1))
    });

    let tables: Vec<ExtractedTable> = usable
        .par_iter()
        .enumerate()
        .map(|(index, r)| {
            let table = extract_table(&r.tokens, r.region.width(), options);
            let validation = table.validation_view();
            ExtractedTable {
                index,
                region: r.region,
                table,
                validation,
            }
        })
        .collect();

    let views: Vec<Table> = tables.iter().map(|t| t.validation.clone()).collect();
    let warnings = validate_document(&views, header, page_text, &options.validation);

    DocumentResult { tables, warnings }
}
