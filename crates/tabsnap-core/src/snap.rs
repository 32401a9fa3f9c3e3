//! Row snapping: assign each token of a geometric row to its nearest
//! column bin and assemble the row's cell texts.

use std::sync::LazyLock;

use regex::Regex;

use crate::bins::Bin;
use crate::token::Token;

static HEADER_VOCAB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"pos|stück|stuck|stueck|einzell(ä|a)nge|gesamtl(ä|a)nge|gewicht|ø|\[")
        .expect("valid pattern")
});

static UNITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[(?:m|kg|mm)\]").expect("valid pattern"));

/// Returns `true` when joined row text hits the schedule header vocabulary.
///
/// Row grouping occasionally misclassifies a boundary row; this keeps
/// header fragments out of the data rows.
pub fn is_schedule_header_text(joined: &str) -> bool {
    HEADER_VOCAB_RE.is_match(&joined.to_lowercase())
}

/// Returns `true` for a units-only row such as `[m] [kg]`.
pub fn is_units_text(joined: &str) -> bool {
    UNITS_RE.is_match(joined)
}

/// Returns `true` for a title-like row: many letters, almost no digits.
pub fn is_title_row(texts: &[&str]) -> bool {
    if texts.is_empty() {
        return false;
    }
    let letters: usize = texts
        .iter()
        .map(|t| t.chars().filter(|c| c.is_alphabetic()).count())
        .sum();
    let digits: usize = texts
        .iter()
        .map(|t| t.chars().filter(|c| c.is_ascii_digit()).count())
        .sum();
    letters >= 8 && digits <= 2
}

/// Keep only tokens whose center lies within the table band.
///
/// The band is the horizontal extent of the bins, padded by `pad` on each
/// side. Running titles and legends share the table's vertical band but
/// sit outside its horizontal extent; without this filter they would snap
/// onto the nearest column.
pub fn restrict_to_band(tokens: &[Token], bins: &[Bin], pad: i64) -> Vec<Token> {
    if bins.is_empty() {
        return tokens.to_vec();
    }
    let x_min = (bins.iter().map(|b| b.left).min().expect("bins non-empty") - pad) as f64;
    let x_max = (bins.iter().map(|b| b.right).max().expect("bins non-empty") + pad) as f64;
    tokens
        .iter()
        .filter(|t| {
            let xc = t.x_center();
            xc >= x_min && xc <= x_max
        })
        .cloned()
        .collect()
}

/// Index of the bin whose midpoint is nearest to `x_center`.
///
/// Ties resolve to the lowest bin index, so assignment is deterministic.
pub fn nearest_bin(x_center: f64, bins: &[Bin]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, bin) in bins.iter().enumerate() {
        let dist = (x_center - bin.midpoint()).abs();
        match best {
            Some((_, d)) if dist >= d => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Assemble one geometric row into per-column cell texts.
///
/// Tokens are sorted left-to-right, restricted to the table band, snapped
/// to their nearest bin, and concatenated per bin with single spaces. The
/// result always has exactly `bins.len()` cells; a bin that received no
/// tokens yields an empty cell.
pub fn assemble_row(row: &[Token], bins: &[Bin], pad: i64) -> Vec<String> {
    let mut cells = vec![String::new(); bins.len()];
    if bins.is_empty() {
        return cells;
    }

    let mut sorted: Vec<Token> = row.to_vec();
    sorted.sort_by_key(|t| t.left);
    let in_band = restrict_to_band(&sorted, bins, pad);

    for token in &in_band {
        let Some(idx) = nearest_bin(token.x_center(), bins) else {
            continue;
        };
        let text = token.text.trim();
        if text.is_empty() {
            continue;
        }
        if cells[idx].is_empty() {
            cells[idx].push_str(text);
        } else {
            cells[idx].push(' ');
            cells[idx].push_str(text);
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, left: i64, width: i64) -> Token {
        Token::new(text, left, 200, width, 20)
    }

    #[test]
    fn header_vocabulary_detected() {
        assert!(is_schedule_header_text("Position Stück Gewicht"));
        assert!(is_schedule_header_text("Ø [mm]"));
        assert!(is_schedule_header_text("Einzellange"));
        assert!(!is_schedule_header_text("3 12 10 1.50"));
    }

    #[test]
    fn units_row_detected() {
        assert!(is_units_text("[m] [kg]"));
        assert!(!is_units_text("1.50 18.00"));
    }

    #[test]
    fn title_rows_are_lettery() {
        assert!(is_title_row(&["Bewehrungsplan", "Decke", "über", "EG"]));
        assert!(!is_title_row(&["3", "12", "10"]));
        assert!(!is_title_row(&[]));
    }

    #[test]
    fn band_restriction_drops_page_furniture() {
        let bins = vec![Bin::new(100, 200), Bin::new(300, 400)];
        let tokens = vec![
            tok("legend", 600, 80),
            tok("7", 120, 20),
            tok("title", 0, 40),
        ];
        let kept = restrict_to_band(&tokens, &bins, 6);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "7");
    }

    #[test]
    fn nearest_bin_ties_break_low() {
        let bins = vec![Bin::new(0, 100), Bin::new(100, 200)];
        // Midpoints at 50 and 150; 100 is equidistant.
        assert_eq!(nearest_bin(100.0, &bins), Some(0));
        assert_eq!(nearest_bin(140.0, &bins), Some(1));
        assert_eq!(nearest_bin(10.0, &[]), None);
    }

    #[test]
    fn every_in_band_token_lands_in_exactly_one_cell() {
        let bins = vec![Bin::new(0, 100), Bin::new(200, 300), Bin::new(400, 500)];
        let row = vec![tok("a", 40, 20), tok("b", 240, 20), tok("c", 460, 20)];
        let cells = assemble_row(&row, &bins, 6);
        assert_eq!(cells, vec!["a", "b", "c"]);
        let assigned: usize = cells.iter().filter(|c| !c.is_empty()).count();
        assert_eq!(assigned, row.len());
    }

    #[test]
    fn same_bin_tokens_concatenate_left_to_right() {
        let bins = vec![Bin::new(0, 300)];
        // Out-of-order input still concatenates by geometry.
        let row = vec![tok("Länge", 160, 60), tok("Einzel-", 20, 60)];
        let cells = assemble_row(&row, &bins, 6);
        assert_eq!(cells, vec!["Einzel- Länge"]);
    }

    #[test]
    fn unpopulated_bins_yield_declared_empty_cells() {
        let bins = vec![Bin::new(0, 100), Bin::new(200, 300)];
        let row = vec![tok("x", 40, 20)];
        let cells = assemble_row(&row, &bins, 6);
        assert_eq!(cells, vec!["x".to_string(), String::new()]);
    }
}
