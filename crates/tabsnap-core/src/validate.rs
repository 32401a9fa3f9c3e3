//! Domain validation of canonicalized tables.
//!
//! Every check emits [`Warning`]s instead of failing: the pipeline runs
//! unattended over whole document batches, and a human reviewer triages
//! the warning list afterwards. The validator is a pure function of
//! (tables, header fields, raw page text); no state survives a call.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::table::{Role, Table};

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(?:[.,]\d+)?$").expect("valid pattern"));
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4})\b")
        .expect("valid pattern")
});
static TOTAL_WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)gesamtgewicht[^0-9]*([0-9]+(?:[.,][0-9]+)?)\s*kg").expect("valid pattern")
});
static TOTAL_QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)anzahl\s+der\s+ausf(?:[üu]hrungen)?[^0-9]*([0-9]+(?:[.,][0-9]+)?)")
        .expect("valid pattern")
});
static TOTAL_LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)summe[^0-9]*([0-9]+(?:[.,][0-9]+)?)\s*m\b").expect("valid pattern")
});

/// A non-fatal validation finding.
///
/// `row` is the 1-based row number inside the table, matching the
/// serialized warning artifact reviewers see. Document- and header-level
/// findings carry no table index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warning {
    /// Index of the affected table within the document, if any.
    pub table: Option<usize>,
    /// 1-based row number within the table, if the finding is row-level.
    pub row: Option<usize>,
    /// Affected field (canonical role name or header key), if known.
    pub field: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Warning {
    /// A row-level finding.
    pub fn row(
        table: usize,
        row: usize,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            table: Some(table),
            row: Some(row),
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// A table-level finding.
    pub fn table(table: usize, message: impl Into<String>) -> Self {
        Self {
            table: Some(table),
            row: None,
            field: None,
            message: message.into(),
        }
    }

    /// A header-field finding.
    pub fn header(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            table: None,
            row: None,
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// A document-level finding.
    pub fn document(message: impl Into<String>) -> Self {
        Self {
            table: None,
            row: None,
            field: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = self.table {
            write!(f, "table {table}")?;
            if let Some(row) = self.row {
                write!(f, ", row {row}")?;
            }
            if let Some(ref field) = self.field {
                write!(f, ", field {field}")?;
            }
            write!(f, ": ")?;
        } else if let Some(ref field) = self.field {
            write!(f, "{field}: ")?;
        }
        f.write_str(&self.message)
    }
}

/// Tolerances and domain constants for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Standard bar diameters in millimetres.
    pub allowed_diameters_mm: Vec<i64>,
    /// Relative tolerance for the length consistency check, in percent.
    pub length_tolerance_pct: f64,
    /// Absolute floor for the length tolerance, in metres.
    pub length_tolerance_abs_m: f64,
    /// Relative tolerance for the weight consistency check, in percent.
    pub weight_tolerance_pct: f64,
    /// Absolute floor for the weight tolerance, in kilograms.
    pub weight_tolerance_abs_kg: f64,
    /// Header fields that must be present and non-empty.
    pub required_header_fields: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_diameters_mm: vec![6, 8, 10, 12, 14, 16, 20, 25, 28, 32, 40],
            length_tolerance_pct: 3.0,
            length_tolerance_abs_m: 0.10,
            weight_tolerance_pct: 5.0,
            weight_tolerance_abs_kg: 0.20,
            required_header_fields: vec![
                "PROJECT".to_string(),
                "DRAWING_NO".to_string(),
                "DATE".to_string(),
            ],
        }
    }
}

/// Parse a cell as a number: `4,78` and ` 12 ` both parse, junk does not.
pub fn parse_number(cell: &str) -> Option<f64> {
    let compact: String = cell.chars().filter(|c| !c.is_whitespace()).collect();
    if !NUMBER_RE.is_match(&compact) {
        return None;
    }
    compact.replace(',', ".").parse().ok()
}

/// Parse a cell as an integer, rounding a decimal value if needed.
pub fn parse_int(cell: &str) -> Option<i64> {
    cell.trim()
        .parse::<i64>()
        .ok()
        .or_else(|| parse_number(cell).map(|f| f.round() as i64))
}

/// Kilograms per metre of a round bar of diameter `d_mm`.
///
/// The d²/162 rule for steel: ρ·π/4 ≈ 1/162 when d is in mm and the
/// result in kg/m.
pub fn kg_per_m(d_mm: f64) -> f64 {
    d_mm * d_mm / 162.0
}

/// Totals recovered from the raw page text by phrase-anchored search.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DocumentTotals {
    /// Total mass in kilograms.
    pub weight_kg: Option<f64>,
    /// Total piece count.
    pub quantity: Option<f64>,
    /// Total length in metres.
    pub length_m: Option<f64>,
}

impl DocumentTotals {
    /// Returns `true` if no total was recovered.
    pub fn is_empty(&self) -> bool {
        self.weight_kg.is_none() && self.quantity.is_none() && self.length_m.is_none()
    }
}

/// Recover document-level totals from raw full-page OCR text.
///
/// Searches for the aggregate phrases of German schedules: total weight
/// (`Gesamtgewicht … kg`), execution count (`Anzahl der Ausführungen …`),
/// and the length sum line (`Summe … m`).
pub fn extract_totals(page_text: &str) -> DocumentTotals {
    let text = page_text.replace('\u{00A0}', " ");
    let find = |re: &Regex| {
        re.captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_number(m.as_str()))
    };
    DocumentTotals {
        weight_kg: find(&TOTAL_WEIGHT_RE),
        quantity: find(&TOTAL_QUANTITY_RE).map(|q| q.round()),
        length_m: find(&TOTAL_LENGTH_RE),
    }
}

/// Run the row-level checks for one table row.
pub fn validate_row(
    table: &Table,
    row_idx: usize,
    table_idx: usize,
    config: &ValidationConfig,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let row_no = row_idx + 1;

    let cell = |role: Role| table.cell_by_role(row_idx, role);
    let qty = cell(Role::Quantity).and_then(parse_int);
    let dia = cell(Role::DiameterMm).and_then(parse_int);
    let unit_len = cell(Role::UnitLengthM).and_then(parse_number);
    let total_len = cell(Role::TotalLengthM).and_then(parse_number);
    let weight = cell(Role::WeightKg).and_then(parse_number);
    let pos = cell(Role::Position).and_then(parse_int);

    let presence: [(Role, bool); 6] = [
        (Role::Position, pos.is_some()),
        (Role::Quantity, qty.is_some()),
        (Role::DiameterMm, dia.is_some()),
        (Role::UnitLengthM, unit_len.is_some()),
        (Role::TotalLengthM, total_len.is_some()),
        (Role::WeightKg, weight.is_some()),
    ];
    for (role, present) in presence {
        if !present {
            warnings.push(Warning::row(
                table_idx,
                row_no,
                role.as_str(),
                "Missing or invalid value",
            ));
        }
    }

    if let Some(q) = qty {
        if q <= 0 {
            warnings.push(Warning::row(
                table_idx,
                row_no,
                Role::Quantity.as_str(),
                "Quantity must be > 0",
            ));
        }
    }

    let negatives: [(Role, Option<f64>); 4] = [
        (Role::DiameterMm, dia.map(|d| d as f64)),
        (Role::UnitLengthM, unit_len),
        (Role::TotalLengthM, total_len),
        (Role::WeightKg, weight),
    ];
    for (role, value) in negatives {
        if let Some(v) = value {
            if v < 0.0 {
                warnings.push(Warning::row(
                    table_idx,
                    row_no,
                    role.as_str(),
                    format!("{} must be non-negative", role.as_str()),
                ));
            }
        }
    }

    if let Some(d) = dia {
        if !config.allowed_diameters_mm.contains(&d) {
            warnings.push(Warning::row(
                table_idx,
                row_no,
                Role::DiameterMm.as_str(),
                format!("Unexpected Ø value {d} mm"),
            ));
        }
    }

    if let (Some(q), Some(l1), Some(lt)) = (qty, unit_len, total_len) {
        let expected = q as f64 * l1;
        let tol = (expected * config.length_tolerance_pct / 100.0).max(config.length_tolerance_abs_m);
        if (lt - expected).abs() > tol {
            warnings.push(Warning::row(
                table_idx,
                row_no,
                Role::TotalLengthM.as_str(),
                format!("Gesamtlänge mismatch: {lt} vs qty×Einzellänge {expected:.2} (±{tol:.2})"),
            ));
        }
    }

    if let (Some(d), Some(lt), Some(w)) = (dia, total_len, weight) {
        let expected = kg_per_m(d as f64) * lt;
        let tol =
            (expected * config.weight_tolerance_pct / 100.0).max(config.weight_tolerance_abs_kg);
        if (w - expected).abs() > tol {
            warnings.push(Warning::row(
                table_idx,
                row_no,
                Role::WeightKg.as_str(),
                format!("Gewicht mismatch: {w} vs expected {expected:.2} (±{tol:.2})"),
            ));
        }
    }

    warnings
}

/// Table-level checks: duplicate position values across rows.
pub fn validate_table(table: &Table, table_idx: usize) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let Some(pos_col) = table.column_index(Role::Position) else {
        return warnings;
    };

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &table.rows {
        let value = row[pos_col].trim();
        if !value.is_empty() {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let duplicated: Vec<usize> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let value = row[pos_col].trim();
            !value.is_empty() && counts.get(value).copied().unwrap_or(0) > 1
        })
        .map(|(i, _)| i + 1)
        .collect();

    if !duplicated.is_empty() {
        warnings.push(Warning::table(
            table_idx,
            format!("Duplicate Position values at rows {duplicated:?}"),
        ));
    }
    warnings
}

/// Header checks: required fields present, date field plausible.
pub fn validate_header(
    header: &BTreeMap<String, String>,
    config: &ValidationConfig,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for key in &config.required_header_fields {
        let missing = header.get(key).map_or(true, |v| v.trim().is_empty());
        if missing {
            warnings.push(Warning::header(
                key.clone(),
                format!("Missing {key} in header"),
            ));
        }
    }
    if let Some(date) = header.get("DATE") {
        if !date.trim().is_empty() && !DATE_RE.is_match(date) {
            warnings.push(Warning::header(
                "DATE",
                format!("DATE value looks unusual: {date}"),
            ));
        }
    }
    warnings
}

/// Validate a whole document: every table, the header fields, and the
/// document-level aggregate totals when raw page text is available.
///
/// Tables must be canonicalized (validation views). An empty table is a
/// single table-level warning, never an error — one unreadable region must
/// not abort the rest of the document.
pub fn validate_document(
    tables: &[Table],
    header: Option<&BTreeMap<String, String>>,
    page_text: Option<&str>,
    config: &ValidationConfig,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if let Some(header) = header {
        warnings.extend(validate_header(header, config));
    }

    let mut sum_qty: i64 = 0;
    let mut sum_len: f64 = 0.0;
    let mut sum_weight: f64 = 0.0;

    for (i, table) in tables.iter().enumerate() {
        if table.is_empty() {
            warnings.push(Warning::table(i, "Empty table"));
            continue;
        }
        for row_idx in 0..table.row_count() {
            warnings.extend(validate_row(table, row_idx, i, config));
            sum_qty += table
                .cell_by_role(row_idx, Role::Quantity)
                .and_then(parse_int)
                .unwrap_or(0);
            sum_len += table
                .cell_by_role(row_idx, Role::TotalLengthM)
                .and_then(parse_number)
                .unwrap_or(0.0);
            sum_weight += table
                .cell_by_role(row_idx, Role::WeightKg)
                .and_then(parse_number)
                .unwrap_or(0.0);
        }
        warnings.extend(validate_table(table, i));
    }

    if let Some(text) = page_text {
        let totals = extract_totals(text);
        if let Some(expected) = totals.quantity {
            if sum_qty != 0 {
                let tol = (0.01 * sum_qty as f64).max(1.0);
                if (sum_qty as f64 - expected).abs() > tol {
                    warnings.push(Warning::document(format!(
                        "Anzahl mismatch: table Σ={sum_qty} vs OCR {expected}"
                    )));
                }
            }
        }
        if let Some(expected) = totals.length_m {
            if sum_len != 0.0 {
                let tol = (0.03 * sum_len).max(0.10);
                if (sum_len - expected).abs() > tol {
                    warnings.push(Warning::document(format!(
                        "Summe Länge mismatch: table Σ={sum_len:.2} m vs OCR {expected:.2} m (±{tol:.2})"
                    )));
                }
            }
        }
        if let Some(expected) = totals.weight_kg {
            if sum_weight != 0.0 {
                let tol = (0.05 * sum_weight).max(0.2);
                if (sum_weight - expected).abs() > tol {
                    warnings.push(Warning::document(format!(
                        "Gesamtgewicht mismatch: table Σ={sum_weight:.2} kg vs OCR {expected:.2} kg (±{tol:.2})"
                    )));
                }
            }
        }
    }

    warnings
}
