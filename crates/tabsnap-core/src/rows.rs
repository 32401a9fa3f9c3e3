//! Row grouping: cluster tokens into horizontal rows by vertical proximity.

use crate::token::Token;

/// Fallback row tolerance in pixels when nothing better is configured.
pub const DEFAULT_ROW_TOLERANCE: i64 = 15;

/// Compute a row-grouping tolerance from the token population itself.
///
/// Uses 60% of the median token height, clamped below by `fallback`. Header
/// and body fonts, or scans at different DPI, shift the useful tolerance by
/// more than 2×, so a fixed value under- or over-groups on half the inputs.
/// A non-positive `fallback` clamps to [`DEFAULT_ROW_TOLERANCE`].
pub fn dynamic_row_tolerance(tokens: &[Token], fallback: i64) -> i64 {
    let fallback = if fallback > 0 {
        fallback
    } else {
        DEFAULT_ROW_TOLERANCE
    };
    let mut heights: Vec<i64> = tokens.iter().map(|t| t.height).filter(|&h| h > 0).collect();
    if heights.is_empty() {
        return fallback;
    }
    heights.sort_unstable();
    let median = median_of_sorted(&heights);
    fallback.max((0.6 * median).round() as i64)
}

fn median_of_sorted(values: &[i64]) -> f64 {
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2] as f64
    } else {
        (values[n / 2 - 1] + values[n / 2]) as f64 / 2.0
    }
}

/// Group tokens into rows, top-to-bottom.
///
/// Tokens are sorted by `(top, left)` and scanned once: a token joins the
/// current row while `|top - anchor_top| <= tolerance`, where the anchor is
/// the `top` of the first token placed into the row; otherwise the row is
/// flushed and a new one starts. The result is a partition of the input in
/// top-to-bottom order. A non-positive tolerance clamps to
/// [`DEFAULT_ROW_TOLERANCE`].
pub fn group_rows(tokens: &[Token], tolerance: i64) -> Vec<Vec<Token>> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let tolerance = if tolerance > 0 {
        tolerance
    } else {
        DEFAULT_ROW_TOLERANCE
    };

    let mut sorted: Vec<Token> = tokens.to_vec();
    sorted.sort_by(|a, b| a.top.cmp(&b.top).then(a.left.cmp(&b.left)));

    let mut rows: Vec<Vec<Token>> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut anchor_top = sorted[0].top;

    for token in sorted {
        if current.is_empty() {
            anchor_top = token.top;
            current.push(token);
        } else if (token.top - anchor_top).abs() <= tolerance {
            current.push(token);
        } else {
            rows.push(std::mem::take(&mut current));
            anchor_top = token.top;
            current.push(token);
        }
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}
