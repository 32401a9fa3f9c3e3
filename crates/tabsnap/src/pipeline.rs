//! The per-region extraction pipeline.
//!
//! One call to [`extract_table`] turns the OCR tokens of a single detected
//! table region into a canonicalized, post-processed [`Table`]. Every stage
//! is total: unusable input degrades to an empty table, never an error.

use tabsnap_core::bins::{BinStrategy, TableConfig, choose_bins, is_numeric_token};
use tabsnap_core::header::{AliasTable, canonicalize_columns};
use tabsnap_core::normalize::{NormalizeConfig, normalize_tokens};
use tabsnap_core::postprocess::postprocess;
use tabsnap_core::rows::{dynamic_row_tolerance, group_rows};
use tabsnap_core::snap::{assemble_row, is_schedule_header_text, is_title_row};
use tabsnap_core::table::{Column, Table};
use tabsnap_core::token::{Token, split_by_confidence};
use tabsnap_core::validate::ValidationConfig;

/// Configuration for one extraction run.
///
/// All fields have workable defaults for German steel schedules scanned at
/// common office DPI; callers tune individual knobs rather than building
/// the whole struct.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Minimum OCR confidence for body tokens (header tokens use the
    /// relaxed `max(10, threshold - 20)` cutoff).
    pub confidence_threshold: f64,
    /// Table structure recovery settings.
    pub table: TableConfig,
    /// Text normalization settings.
    pub normalize: NormalizeConfig,
    /// Header alias dictionary.
    pub aliases: AliasTable,
    /// Validator tolerances and domain constants.
    pub validation: ValidationConfig,
    /// Optional display column order for the final table.
    pub final_display_order: Option<Vec<String>>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 30.0,
            table: TableConfig::default(),
            normalize: NormalizeConfig::default(),
            aliases: AliasTable::default(),
            validation: ValidationConfig::default(),
            final_display_order: None,
        }
    }
}

/// Extract one table from the tokens of a detected region.
///
/// `page_width` is the pixel width of the region raster; it scales the gap
/// threshold of the numeric fallback binner.
pub fn extract_table(tokens: &[Token], page_width: i64, options: &ExtractOptions) -> Table {
    let normalized = normalize_tokens(tokens, &options.normalize);
    let (body, header_set) = split_by_confidence(&normalized, options.confidence_threshold);
    if body.is_empty() {
        return Table::empty();
    }

    let config = &options.table;
    let body_tolerance = if config.dynamic_row_tolerance {
        dynamic_row_tolerance(&body, config.row_tolerance)
    } else {
        config.row_tolerance
    };
    let body_rows = group_rows(&body, body_tolerance);

    let header_tolerance = if config.dynamic_row_tolerance {
        dynamic_row_tolerance(&header_set, config.row_tolerance)
    } else {
        config.row_tolerance
    };
    let header_rows = group_rows(&header_set, header_tolerance);
    let header_tokens = header_candidate_tokens(&header_rows);

    let strategy = choose_bins(&header_tokens, &body, page_width, config);

    let table = match strategy {
        BinStrategy::Header { bins, labels } | BinStrategy::NumericFallback { bins, labels } => {
            let columns: Vec<Column> = (0..bins.len())
                .map(|i| match labels.get(i) {
                    Some(label) if !label.is_empty() => Column::new(label.clone()),
                    _ => Column::new(format!("Column_{}", i + 1)),
                })
                .collect();
            let rows: Vec<Vec<String>> = body_rows
                .iter()
                .filter(|row| !is_excluded_row(row))
                .map(|row| assemble_row(row, &bins, config.band_pad))
                .filter(|cells| cells.iter().any(|c| !c.is_empty()))
                .collect();
            Table::new(columns, rows)
        }
        BinStrategy::Naive => naive_table(&body_rows),
    };

    let canonical = canonicalize_columns(&table, &options.aliases);
    let shape_label = config.shape_column.as_ref().map(|r| r.label.as_str());
    postprocess(
        &canonical,
        shape_label,
        options.final_display_order.as_deref(),
    )
}

/// Tokens of the rows eligible as header input: up to two geometric rows
/// above the first row that looks like numeric data.
fn header_candidate_tokens(rows: &[Vec<Token>]) -> Vec<Token> {
    rows.iter()
        .take_while(|row| !is_numeric_data_row(row))
        .take(2)
        .flat_map(|row| row.iter().cloned())
        .collect()
}

/// A row is numeric data when the majority of its tokens are plain numbers.
fn is_numeric_data_row(row: &[Token]) -> bool {
    let numeric = row.iter().filter(|t| is_numeric_token(&t.text)).count();
    numeric * 2 > row.len()
}

/// Header, units, and title rows must not become data rows.
fn is_excluded_row(row: &[Token]) -> bool {
    let texts: Vec<&str> = row.iter().map(|t| t.text.as_str()).collect();
    let joined = texts.join(" ");
    is_schedule_header_text(&joined) || is_title_row(&texts)
}

/// Last-resort assembly: each kept row's tokens become `Column_1..N`
/// positionally. Column structure is not guaranteed in this path; it
/// exists so the pipeline never aborts on a structureless region.
fn naive_table(body_rows: &[Vec<Token>]) -> Table {
    let kept: Vec<Vec<String>> = body_rows
        .iter()
        .filter(|row| !is_excluded_row(row))
        .map(|row| {
            let mut sorted: Vec<&Token> = row.iter().collect();
            sorted.sort_by_key(|t| t.left);
            sorted
                .iter()
                .map(|t| t.text.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<String>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let width = kept.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Table::empty();
    }
    let columns = (1..=width).map(|i| Column::new(format!("Column_{i}"))).collect();
    Table::new(columns, kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_data_rows_detected_by_majority() {
        let data: Vec<Token> = ["3", "12", "10", "1.50"]
            .iter()
            .enumerate()
            .map(|(i, t)| Token::new(*t, i as i64 * 100, 200, 30, 20))
            .collect();
        assert!(is_numeric_data_row(&data));

        let header: Vec<Token> = ["Position", "Stück", "10"]
            .iter()
            .enumerate()
            .map(|(i, t)| Token::new(*t, i as i64 * 100, 100, 60, 20))
            .collect();
        assert!(!is_numeric_data_row(&header));
    }

    #[test]
    fn header_candidates_stop_at_first_data_row() {
        let row = |texts: &[&str], top: i64| -> Vec<Token> {
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| Token::new(*t, i as i64 * 100, top, 40, 20))
                .collect()
        };
        let rows = vec![
            row(&["Position", "Stück"], 100),
            row(&["[m]", "[kg]"], 130),
            row(&["3", "12"], 200),
            row(&["4", "8"], 240),
        ];
        let tokens = header_candidate_tokens(&rows);
        assert_eq!(tokens.len(), 4);
        assert!(tokens.iter().all(|t| t.top < 200));

        let headerless = vec![row(&["3", "12"], 200)];
        assert!(header_candidate_tokens(&headerless).is_empty());
    }

    #[test]
    fn naive_assembly_is_positional() {
        let rows = vec![
            vec![
                Token::new("b4", 300, 200, 40, 20),
                Token::new("a7", 0, 200, 40, 20),
            ],
            vec![Token::new("c1", 0, 240, 40, 20)],
        ];
        let table = naive_table(&rows);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.columns[0].label, "Column_1");
        assert_eq!(table.rows[0], vec!["a7", "b4"]);
        assert_eq!(table.rows[1], vec!["c1", ""]);
    }
}
