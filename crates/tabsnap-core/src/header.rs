//! Header label reduction and canonicalization.
//!
//! Reduction turns the header rows' tokens into one display label per bin,
//! fixing the known two-line label idioms. Canonicalization maps those
//! display labels (or anything a caller supplies) onto the fixed semantic
//! [`Role`]s via an alias table, with an edit-distance fallback for
//! OCR-mangled spellings.

use std::sync::LazyLock;

use regex::Regex;

use crate::bins::Bin;
use crate::normalize::ascii_fold;
use crate::table::{Column, Role, Table};
use crate::token::Token;

static EINZEL_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)einzel\s*-\s*l(ä|a)nge").expect("valid pattern"));
static GESAMT_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)gesamt\s*-\s*l(ä|a)nge").expect("valid pattern"));
static DIAMETER_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(ø|@|durchmesser|\[mm\])").expect("valid pattern"));

/// Build one display label per bin from the header tokens.
///
/// For each bin, the tokens whose center falls inside it are sorted by
/// `(top, left)` — a label split across two physical lines reads in
/// order — and their text is joined and passed through the known header
/// idiom merges. Trailing empty labels are trimmed.
pub fn reduce_header_labels(header_tokens: &[Token], bins: &[Bin]) -> Vec<String> {
    let mut labels: Vec<String> = bins
        .iter()
        .map(|bin| {
            let mut in_bin: Vec<&Token> = header_tokens
                .iter()
                .filter(|t| {
                    let xc = t.x_center();
                    xc >= bin.left as f64 && xc <= bin.right as f64
                })
                .collect();
            in_bin.sort_by(|a, b| a.top.cmp(&b.top).then(a.left.cmp(&b.left)));
            let words: Vec<&str> = in_bin
                .iter()
                .map(|t| t.text.trim())
                .filter(|t| !t.is_empty())
                .collect();
            merge_header_words(&words)
        })
        .collect();

    while labels.last().is_some_and(|l| l.is_empty()) {
        labels.pop();
    }
    labels
}

/// Join header words and apply the known multi-line header idioms.
///
/// `Einzel-` / `Länge [m]` (and the `Gesamt-` twin) merge into the single
/// composed label; anything carrying a diameter marker becomes `Ø [mm]`.
pub fn merge_header_words(words: &[&str]) -> String {
    let mut joined = words.join(" ");

    let has_unit_m = joined.contains("[m]") || joined.contains("m]");
    if (joined.contains("Einzel-") && joined.contains("Länge")) || EINZEL_SPLIT_RE.is_match(&joined)
    {
        joined = if has_unit_m {
            "Einzellänge [m]".to_string()
        } else {
            "Einzellänge".to_string()
        };
    }
    if (joined.contains("Gesamt-") && joined.contains("Länge")) || GESAMT_SPLIT_RE.is_match(&joined)
    {
        joined = if has_unit_m {
            "Gesamtlänge [m]".to_string()
        } else {
            "Gesamtlänge".to_string()
        };
    }

    if DIAMETER_MARKER_RE.is_match(&joined) {
        joined = "Ø [mm]".to_string();
    }

    joined.trim().to_string()
}

/// Alias dictionary mapping canonical roles to their known display
/// synonyms, plus the similarity cutoff for the fuzzy fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable {
    /// Role → synonyms, matched case- and diacritic-insensitively.
    pub entries: Vec<(Role, Vec<String>)>,
    /// Minimum normalized edit-distance similarity for a fuzzy match.
    pub fuzzy_cutoff: f64,
}

impl Default for AliasTable {
    fn default() -> Self {
        let syns = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            entries: vec![
                (
                    Role::Position,
                    syns(&["position", "pos.", "pos", "nr.:", "nr", "nr.", "no.pcs", "#"]),
                ),
                (
                    Role::Quantity,
                    syns(&[
                        "stück", "stk.", "stck", "st.", "anzahl", "anz.", "anz", "stuck", "stük",
                    ]),
                ),
                (
                    Role::DiameterMm,
                    syns(&["durchmesser", "ø", "ø [mm]", "d(mm)", "d8", "d10", "d12", "d"]),
                ),
                (
                    Role::UnitLengthM,
                    syns(&[
                        "einzellänge",
                        "einzellänge [m]",
                        "einzel-",
                        "schnittlänge",
                        "länge",
                        "einzellange",
                        "einzellange [m]",
                    ]),
                ),
                (
                    Role::TotalLengthM,
                    syns(&[
                        "gesamtlänge",
                        "gesamtlänge [m]",
                        "ges.länge",
                        "ges.l",
                        "gesamt-",
                        "gesamtlange",
                    ]),
                ),
                (
                    Role::WeightKg,
                    syns(&[
                        "gewicht",
                        "gewicht [kg]",
                        "gew.",
                        "gewicht(kg)",
                        "masse",
                        "gewich:",
                    ]),
                ),
            ],
            fuzzy_cutoff: 0.8,
        }
    }
}

impl AliasTable {
    /// Resolve one display label to a canonical role.
    ///
    /// Matching order: the stable role names themselves, then exact
    /// folded/lowercased alias lookup, then the fuzzy pass over the whole
    /// synonym vocabulary. Returns `None` for unrecognized labels — not an
    /// error, merely an unrecognized column.
    pub fn resolve(&self, label: &str) -> Option<Role> {
        let folded = ascii_fold(label);
        if let Some(role) = Role::from_name(&folded) {
            return Some(role);
        }

        let lower = label.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        for (role, synonyms) in &self.entries {
            for synonym in synonyms {
                let folded_syn = ascii_fold(synonym);
                if (!folded.is_empty() && folded == folded_syn) || lower == synonym.to_lowercase() {
                    return Some(*role);
                }
            }
        }

        // Fuzzy pass: best normalized edit-distance similarity above the
        // cutoff wins, scored over every synonym.
        let mut best: Option<(Role, f64)> = None;
        for (role, synonyms) in &self.entries {
            for synonym in synonyms {
                let score = strsim::normalized_levenshtein(&lower, &synonym.to_lowercase());
                if score >= self.fuzzy_cutoff && best.is_none_or(|(_, s)| score > s) {
                    best = Some((*role, score));
                }
            }
        }
        best.map(|(role, _)| role)
    }
}

/// Attach canonical roles to a table's columns.
///
/// Labels are preserved verbatim; only the role annotation changes, so a
/// table whose labels already are canonical role names round-trips as an
/// identity on roles.
pub fn canonicalize_columns(table: &Table, aliases: &AliasTable) -> Table {
    let columns = table
        .columns
        .iter()
        .map(|c| Column {
            label: c.label.clone(),
            role: aliases.resolve(&c.label),
        })
        .collect();
    Table {
        columns,
        rows: table.rows.clone(),
    }
}
