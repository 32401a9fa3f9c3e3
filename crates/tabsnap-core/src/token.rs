//! The token model: one recognized text fragment with its box and confidence.

/// A recognized text fragment from the OCR engine.
///
/// Matches the engine's word-level dump: `left`/`top`/`width`/`height` in
/// pixels (top-left origin) and a confidence score in the 0–100 range.
/// Tokens are immutable once normalized; every later stage works on the
/// same population produced for one extraction run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// Recognized text (normalized before structural reasoning).
    pub text: String,
    /// Left edge of the bounding box.
    pub left: i64,
    /// Top edge of the bounding box.
    pub top: i64,
    /// Box width.
    pub width: i64,
    /// Box height.
    pub height: i64,
    /// Recognition confidence, 0–100. The engine reports -1 for
    /// layout-only pseudo-tokens; those never pass a threshold.
    #[cfg_attr(feature = "serde", serde(rename = "conf"))]
    pub confidence: f64,
}

impl Token {
    pub fn new(text: impl Into<String>, left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width,
            height,
            confidence: 100.0,
        }
    }

    /// Horizontal center of the bounding box.
    pub fn x_center(&self) -> f64 {
        self.left as f64 + self.width as f64 / 2.0
    }

    /// Right edge of the bounding box.
    pub fn right(&self) -> i64 {
        self.left + self.width
    }
}

/// Split a token population into body and header candidate sets.
///
/// The body set keeps tokens above `threshold`; the header set uses the
/// relaxed `max(10, threshold - 20)` cutoff, because header labels sit in
/// the noisiest band of the crop and a hard cutoff there loses whole
/// columns. When the strict set comes back empty the relaxed set is used
/// for the body too, so a low-quality scan still yields a best-effort table.
pub fn split_by_confidence(tokens: &[Token], threshold: f64) -> (Vec<Token>, Vec<Token>) {
    let header_threshold = header_confidence_threshold(threshold);

    let body: Vec<Token> = tokens
        .iter()
        .filter(|t| t.confidence > threshold)
        .cloned()
        .collect();
    let header: Vec<Token> = tokens
        .iter()
        .filter(|t| t.confidence > header_threshold)
        .cloned()
        .collect();

    if body.is_empty() {
        (header.clone(), header)
    } else {
        (body, header)
    }
}

/// The relaxed confidence cutoff used for header tokens.
pub fn header_confidence_threshold(threshold: f64) -> f64 {
    (threshold - 20.0).max(10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, conf: f64) -> Token {
        Token {
            confidence: conf,
            ..Token::new(text, 0, 0, 10, 12)
        }
    }

    #[test]
    fn x_center_is_box_midpoint() {
        let t = Token::new("7", 100, 0, 30, 12);
        assert_eq!(t.x_center(), 115.0);
        assert_eq!(t.right(), 130);
    }

    #[test]
    fn split_keeps_relaxed_set_for_headers() {
        let tokens = vec![tok("Position", 15.0), tok("3", 80.0)];
        let (body, header) = split_by_confidence(&tokens, 30.0);
        assert_eq!(body.len(), 1);
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn split_falls_back_to_header_set_when_body_empty() {
        let tokens = vec![tok("Position", 15.0), tok("3", 18.0)];
        let (body, header) = split_by_confidence(&tokens, 30.0);
        assert_eq!(body.len(), 2);
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn header_threshold_never_drops_below_ten() {
        assert_eq!(header_confidence_threshold(30.0), 10.0);
        assert_eq!(header_confidence_threshold(50.0), 30.0);
        assert_eq!(header_confidence_threshold(5.0), 10.0);
    }
}
