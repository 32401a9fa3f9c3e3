//! Column binning: horizontal intervals that define the table's columns.
//!
//! Bins come from one of three escalating strategies: intervals merged from
//! header token geometry, 1-D clustering of numeric body tokens when the
//! header is missing or under-resolved, and a naive positional assignment
//! when not even numeric structure is recoverable. The decision function
//! [`choose_bins`] encodes the escalation thresholds and is testable apart
//! from any one strategy.

use std::sync::LazyLock;

use regex::Regex;

use crate::header::reduce_header_labels;
use crate::snap::restrict_to_band;
use crate::token::Token;

/// A horizontal interval on the page representing one table column.
///
/// Bins are positional: their index in the owning list is the column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bin {
    /// Left bound.
    pub left: i64,
    /// Right bound (always greater than `left`).
    pub right: i64,
}

impl Bin {
    pub fn new(left: i64, right: i64) -> Self {
        Self { left, right }
    }

    /// Horizontal midpoint.
    pub fn midpoint(&self) -> f64 {
        (self.left + self.right) as f64 / 2.0
    }
}

/// Display labels assigned positionally when bins come from numeric
/// clustering and no header text exists.
pub const POSITIONAL_LABELS: [&str; 6] = [
    "Position",
    "Stück",
    "Ø [mm]",
    "Einzellänge [m]",
    "Gesamtlänge [m]",
    "Gewicht [kg]",
];

/// Insertion rule for the non-numeric shape/remarks column.
///
/// Steel bending schedules carry a drawing column between the diameter and
/// the unit length; it holds no numbers, so numeric clustering cannot see
/// it. The rule is configuration rather than a structural constant: other
/// document families place it elsewhere or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeColumnRule {
    /// Display label for the synthesized column.
    pub label: String,
    /// Index of the numeric bin the column is carved after.
    pub after: usize,
    /// Pixels trimmed from each side of the carved gap.
    pub inset: i64,
}

impl Default for ShapeColumnRule {
    fn default() -> Self {
        Self {
            label: "Biegeform".to_string(),
            after: 2,
            inset: 10,
        }
    }
}

/// Configuration for table structure recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    /// Row-grouping tolerance fallback in pixels.
    pub row_tolerance: i64,
    /// Recompute the row tolerance from the token population's heights.
    pub dynamic_row_tolerance: bool,
    /// Gap below which adjacent header tokens merge into one bin.
    pub header_merge_tolerance: i64,
    /// Derive column bins from header geometry (the primary strategy).
    pub column_binning_from_header: bool,
    /// Padding around the table band when filtering out-of-band tokens.
    pub band_pad: i64,
    /// Lower clamp for the numeric-clustering gap threshold.
    pub min_numeric_gap: i64,
    /// Shape-column insertion rule for the numeric fallback, if any.
    pub shape_column: Option<ShapeColumnRule>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 15,
            dynamic_row_tolerance: true,
            header_merge_tolerance: 120,
            column_binning_from_header: true,
            band_pad: 6,
            min_numeric_gap: 40,
            shape_column: Some(ShapeColumnRule::default()),
        }
    }
}

/// The binning strategy selected for one table.
#[derive(Debug, Clone, PartialEq)]
pub enum BinStrategy {
    /// Bins merged from header token geometry, with reduced labels.
    Header { bins: Vec<Bin>, labels: Vec<String> },
    /// Bins clustered from numeric body tokens, labels assigned positionally.
    NumericFallback { bins: Vec<Bin>, labels: Vec<String> },
    /// No recoverable column structure; tokens become `Column_1..N` per row.
    Naive,
}

static NUMERIC_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.,]\d+)?$").expect("valid pattern"));

/// Returns `true` for tokens that are a plain number with at most one
/// decimal separator.
pub fn is_numeric_token(text: &str) -> bool {
    NUMERIC_TOKEN_RE.is_match(text)
}

/// Build column bins from header token geometry.
///
/// Tokens are walked left-to-right; a token whose `left` is within
/// `merge_tolerance` of the previous token's right edge extends the open
/// bin (a header label broken into sub-words stays one column), otherwise
/// a new bin opens at the token's extent.
pub fn bins_from_header(header_tokens: &[Token], merge_tolerance: i64) -> Vec<Bin> {
    let mut sorted: Vec<&Token> = header_tokens.iter().collect();
    sorted.sort_by_key(|t| t.left);

    let mut bins: Vec<Bin> = Vec::new();
    let mut last_right: Option<i64> = None;

    for token in sorted {
        let left = token.left;
        let right = token.right();
        match (last_right, bins.last_mut()) {
            (Some(prev_right), Some(open)) if left - prev_right < merge_tolerance => {
                open.left = open.left.min(left);
                open.right = open.right.max(right);
            }
            _ => bins.push(Bin::new(left, right)),
        }
        last_right = Some(right);
    }
    bins
}

/// Recover column bins by clustering numeric body tokens horizontally.
///
/// Strictly numeric tokens are sorted by center and cut into groups
/// wherever the gap between consecutive centers exceeds
/// `max(min_numeric_gap, page_width / 40)`. While more than 7 groups
/// remain, the two horizontally closest adjacent groups merge (each merge
/// strictly reduces the count, so the loop terminates). The 6 most
/// populated groups survive, re-sorted by median center, and become bins
/// from their min/max extents. With exactly 6 bins the configured shape
/// column is carved from the gap between the diameter and unit-length
/// bins; positional labels are assigned since no header text exists here.
///
/// Returns `None` when fewer than 2 numeric groups exist.
pub fn bins_from_numeric_body(
    body: &[Token],
    page_width: i64,
    config: &TableConfig,
) -> Option<(Vec<Bin>, Vec<String>)> {
    let mut numeric: Vec<&Token> = body.iter().filter(|t| is_numeric_token(&t.text)).collect();
    if numeric.is_empty() {
        return None;
    }
    numeric.sort_by(|a, b| {
        a.x_center()
            .partial_cmp(&b.x_center())
            .expect("token centers are finite")
    });

    let gap = config.min_numeric_gap.max(page_width / 40) as f64;

    let mut groups: Vec<Vec<&Token>> = vec![vec![numeric[0]]];
    let mut last_center = numeric[0].x_center();
    for &token in &numeric[1..] {
        if token.x_center() - last_center <= gap {
            groups.last_mut().expect("groups non-empty").push(token);
        } else {
            groups.push(vec![token]);
        }
        last_center = token.x_center();
    }

    // Merge the closest adjacent pair until at most 7 groups remain.
    while groups.len() > 7 {
        let mut best = 0;
        let mut best_gap = f64::INFINITY;
        for i in 0..groups.len() - 1 {
            let d = median_center(&groups[i + 1]) - median_center(&groups[i]);
            if d < best_gap {
                best_gap = d;
                best = i;
            }
        }
        let merged = groups.remove(best + 1);
        groups[best].extend(merged);
    }

    if groups.len() < 2 {
        return None;
    }

    // Keep the 6 most populated groups, then restore left-to-right order.
    groups.sort_by(|a, b| {
        b.len().cmp(&a.len()).then(
            median_center(a)
                .partial_cmp(&median_center(b))
                .expect("token centers are finite"),
        )
    });
    groups.truncate(6);
    groups.sort_by(|a, b| {
        median_center(a)
            .partial_cmp(&median_center(b))
            .expect("token centers are finite")
    });

    let mut bins: Vec<Bin> = groups
        .iter()
        .map(|g| {
            let left = g.iter().map(|t| t.left).min().expect("group non-empty");
            let right = g.iter().map(|t| t.right()).max().expect("group non-empty");
            Bin::new(left, right)
        })
        .collect();

    let mut labels: Vec<String> = if bins.len() == 6 {
        POSITIONAL_LABELS.iter().map(|s| s.to_string()).collect()
    } else {
        // Too few numeric columns to name positionally with confidence.
        (1..=bins.len()).map(|i| format!("Column_{i}")).collect()
    };

    if bins.len() == 6 {
        if let Some(rule) = &config.shape_column {
            if let Some((carved, at)) = carve_shape_bin(&bins, rule) {
                bins.insert(at, carved);
                labels.insert(at, rule.label.clone());
            }
        }
    }

    Some((bins, labels))
}

/// Carve a non-numeric bin from the gap after `rule.after`, when wide enough.
fn carve_shape_bin(bins: &[Bin], rule: &ShapeColumnRule) -> Option<(Bin, usize)> {
    let after = rule.after;
    if after + 1 >= bins.len() {
        return None;
    }
    let left = bins[after].right + rule.inset;
    let right = bins[after + 1].left - rule.inset;
    if right > left {
        Some((Bin::new(left, right), after + 1))
    } else {
        None
    }
}

fn median_center(group: &[&Token]) -> f64 {
    let mut centers: Vec<f64> = group.iter().map(|t| t.x_center()).collect();
    centers.sort_by(|a, b| a.partial_cmp(b).expect("token centers are finite"));
    let n = centers.len();
    if n % 2 == 1 {
        centers[n / 2]
    } else {
        (centers[n / 2 - 1] + centers[n / 2]) / 2.0
    }
}

/// Select the binning strategy for one table.
///
/// Header binning is primary. Fewer than 4 bins means the merge tolerance
/// under-split (two real columns false-merged), so it retries once with a
/// tolerance of at least 200. The numeric fallback takes over when header
/// binning produced nothing or resolved fewer than 5 non-empty labels;
/// when the fallback also fails, whatever header bins exist are kept, and
/// with none at all the naive positional strategy is selected.
pub fn choose_bins(
    header_tokens: &[Token],
    body: &[Token],
    page_width: i64,
    config: &TableConfig,
) -> BinStrategy {
    let mut header_bins: Vec<Bin> = Vec::new();
    let mut labels: Vec<String> = Vec::new();

    if config.column_binning_from_header && !header_tokens.is_empty() {
        let mut bins = bins_from_header(header_tokens, config.header_merge_tolerance);
        if !bins.is_empty() && bins.len() < 4 {
            bins = bins_from_header(header_tokens, config.header_merge_tolerance.max(200));
        }
        if !bins.is_empty() {
            let band = restrict_to_band(header_tokens, &bins, config.band_pad);
            labels = reduce_header_labels(&band, &bins);
            header_bins = bins;
        }
    }

    let resolved = labels.iter().filter(|l| !l.is_empty()).count();
    if header_bins.is_empty() || resolved < 5 {
        if let Some((bins, labels)) = bins_from_numeric_body(body, page_width, config) {
            return BinStrategy::NumericFallback { bins, labels };
        }
    }

    if header_bins.is_empty() {
        BinStrategy::Naive
    } else {
        BinStrategy::Header {
            bins: header_bins,
            labels,
        }
    }
}
