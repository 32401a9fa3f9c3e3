//! Text normalization applied to every token before structural reasoning.
//!
//! Provides [`NormalizeConfig`] with the symbol substitutions and literal
//! replacements for common OCR misreads, plus [`ascii_fold`] used by the
//! header canonicalizer for diacritic-insensitive matching.

use unicode_normalization::UnicodeNormalization;

use crate::token::Token;

/// Symbol substitutions and ordered literal replacements.
///
/// The defaults target the misreads seen in scanned steel schedules: the
/// diameter symbol `Ø` comes back as `@`, `O/`, `0/`, or `o/`, and the
/// engine reads `ß` as `B` inside words like `Bemaßte`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    /// Substring substitutions applied first (e.g. `@` → `Ø`).
    pub symbol_map: Vec<(String, String)>,
    /// Literal replacements applied afterwards, in order.
    pub replacements: Vec<(String, String)>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        let pairs = |items: &[(&str, &str)]| {
            items
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect()
        };
        Self {
            symbol_map: pairs(&[
                ("@", "Ø"),
                ("O/", "Ø"),
                ("0/", "Ø"),
                ("o/", "Ø"),
                ("Ø/", "Ø"),
            ]),
            replacements: pairs(&[("BemaBte", "Bemaßte")]),
        }
    }
}

/// Normalize one text fragment.
///
/// Applies the symbol map, then the ordered replacements, then collapses
/// internal whitespace runs to a single space and trims. Total: unmapped
/// input passes through unchanged.
pub fn normalize_text(text: &str, config: &NormalizeConfig) -> String {
    let mut s = text.to_string();
    for (from, to) in &config.symbol_map {
        s = s.replace(from.as_str(), to);
    }
    for (from, to) in &config.replacements {
        s = s.replace(from.as_str(), to);
    }
    collapse_whitespace(&s)
}

/// Normalize every token's text, dropping tokens that normalize to empty.
pub fn normalize_tokens(tokens: &[Token], config: &NormalizeConfig) -> Vec<Token> {
    tokens
        .iter()
        .filter_map(|t| {
            let text = normalize_text(&t.text, config);
            if text.is_empty() {
                None
            } else {
                Some(Token { text, ..t.clone() })
            }
        })
        .collect()
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fold a label for matching: NFKD-decompose, drop combining marks and
/// non-ASCII leftovers, lowercase, and remove all whitespace.
///
/// `"Einzellänge [m]"` and `"einzellange[m]"` fold to the same key.
pub fn ascii_fold(s: &str) -> String {
    s.nfkd()
        .filter(|c| c.is_ascii() && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_map_restores_diameter_sign() {
        let config = NormalizeConfig::default();
        assert_eq!(normalize_text("@ 12", &config), "Ø 12");
        assert_eq!(normalize_text("O/8", &config), "Ø8");
    }

    #[test]
    fn replacements_applied_in_order() {
        let config = NormalizeConfig {
            symbol_map: Vec::new(),
            replacements: vec![
                ("a".to_string(), "b".to_string()),
                ("bb".to_string(), "c".to_string()),
            ],
        };
        assert_eq!(normalize_text("ab", &config), "c");
    }

    #[test]
    fn whitespace_collapsed_and_trimmed() {
        let config = NormalizeConfig::default();
        assert_eq!(normalize_text("  Gesamt-   Länge \t[m] ", &config), "Gesamt- Länge [m]");
    }

    #[test]
    fn unmapped_input_passes_through() {
        let config = NormalizeConfig::default();
        assert_eq!(normalize_text("Position", &config), "Position");
    }

    #[test]
    fn normalize_tokens_drops_empty() {
        let config = NormalizeConfig::default();
        let tokens = vec![Token::new("  ", 0, 0, 5, 10), Token::new("12", 10, 0, 5, 10)];
        let out = normalize_tokens(&tokens, &config);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "12");
    }

    #[test]
    fn ascii_fold_strips_diacritics_case_and_spaces() {
        assert_eq!(ascii_fold("Einzellänge [m]"), "einzellange[m]");
        assert_eq!(ascii_fold("Stück"), "stuck");
        assert_eq!(ascii_fold("GEW."), "gew.");
    }
}
