//! End-to-end pipeline tests over synthetic OCR token populations.

use tabsnap::{ExtractOptions, Role, Token, extract_table};
use tabsnap_core::validate::{ValidationConfig, validate_document};

fn tok(text: &str, left: i64, top: i64, width: i64) -> Token {
    Token {
        confidence: 90.0,
        ..Token::new(text, left, top, width, 20)
    }
}

/// Header and one data row of a German steel schedule.
fn schedule_tokens() -> Vec<Token> {
    vec![
        // Header line.
        tok("Position", 0, 100, 80),
        tok("Stück", 200, 100, 60),
        tok("Ø", 400, 100, 30),
        tok("Einzellänge", 600, 100, 110),
        tok("Gesamtlänge", 850, 100, 110),
        tok("Gewicht", 1100, 100, 80),
        // Data row: 18.00 = 12 × 1.50, 11.1 ≈ 10²/162 × 18.00.
        tok("3", 30, 200, 20),
        tok("12", 220, 200, 20),
        tok("10", 405, 200, 20),
        tok("1.50", 640, 200, 30),
        tok("18.00", 890, 200, 30),
        tok("11.1", 1125, 200, 30),
    ]
}

#[test]
fn german_header_schedule_extracts_one_canonical_row() {
    let table = extract_table(&schedule_tokens(), 1400, &ExtractOptions::default());

    assert_eq!(table.row_count(), 1);
    assert_eq!(table.column_count(), 6);
    assert_eq!(table.cell_by_role(0, Role::Position), Some("3"));
    assert_eq!(table.cell_by_role(0, Role::Quantity), Some("12"));
    assert_eq!(table.cell_by_role(0, Role::DiameterMm), Some("10"));
    assert_eq!(table.cell_by_role(0, Role::UnitLengthM), Some("1.50"));
    assert_eq!(table.cell_by_role(0, Role::TotalLengthM), Some("18.00"));
    assert_eq!(table.cell_by_role(0, Role::WeightKg), Some("11.1"));
    // Display labels survive canonicalization.
    assert!(table.columns.iter().any(|c| c.label == "Ø [mm]"));
}

#[test]
fn extracted_schedule_validates_cleanly() {
    let table = extract_table(&schedule_tokens(), 1400, &ExtractOptions::default());
    let view = table.validation_view();
    assert_eq!(view.column_count(), 6);

    let warnings = validate_document(&[view], None, None, &ValidationConfig::default());
    assert!(warnings.is_empty(), "unexpected: {warnings:?}");
}

#[test]
fn headerless_schedule_recovers_columns_from_numeric_layout() {
    // Three data rows, six numeric columns, no header at all.
    let centers = [50, 250, 450, 850, 1050, 1250];
    let rows = [
        ["1", "4", "10", "1.50", "6.00", "3.70"],
        ["2", "2", "12", "2.00", "4.00", "3.56"],
        ["3", "6", "8", "1.00", "6.00", "2.37"],
    ];
    let mut tokens = Vec::new();
    for (r, row) in rows.iter().enumerate() {
        for (c, text) in row.iter().enumerate() {
            tokens.push(tok(text, centers[c] - 10, 200 + 40 * r as i64, 20));
        }
    }

    let table = extract_table(&tokens, 1400, &ExtractOptions::default());

    // The empty synthesized shape column is cleaned away again.
    assert_eq!(table.column_count(), 6);
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.cell_by_role(1, Role::Position), Some("2"));
    assert_eq!(table.cell_by_role(2, Role::DiameterMm), Some("8"));
    assert_eq!(table.cell_by_role(0, Role::TotalLengthM), Some("6.00"));
}

#[test]
fn single_numeric_column_degrades_to_positional_assignment() {
    let tokens = vec![tok("1", 0, 200, 20), tok("2", 0, 240, 20), tok("3", 0, 280, 20)];
    let table = extract_table(&tokens, 400, &ExtractOptions::default());

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_count(), 1);
    // A first column that is all integers is recovered as the position column.
    assert_eq!(table.columns[0].role, Some(Role::Position));
}

#[test]
fn zero_tokens_yield_an_empty_table() {
    let table = extract_table(&[], 1400, &ExtractOptions::default());
    assert!(table.is_empty());
}

#[test]
fn summary_lines_do_not_become_data_rows() {
    let mut tokens = schedule_tokens();
    tokens.push(tok("Summe", 30, 240, 60));
    tokens.push(tok("18.00", 890, 240, 30));

    let table = extract_table(&tokens, 1400, &ExtractOptions::default());
    assert_eq!(table.row_count(), 1);
}

#[test]
fn comma_decimals_are_normalized() {
    let mut tokens = schedule_tokens();
    // Replace the unit length with a comma-decimal reading.
    for t in &mut tokens {
        if t.text == "1.50" {
            t.text = "1,50".to_string();
        }
    }
    let table = extract_table(&tokens, 1400, &ExtractOptions::default());
    assert_eq!(table.cell_by_role(0, Role::UnitLengthM), Some("1.50"));
}

#[test]
fn low_confidence_body_still_extracts_via_relaxed_threshold() {
    let mut tokens = schedule_tokens();
    for t in &mut tokens {
        t.confidence = 25.0;
    }
    let table = extract_table(&tokens, 1400, &ExtractOptions::default());
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.cell_by_role(0, Role::Position), Some("3"));
}

#[test]
fn final_display_order_is_applied() {
    let options = ExtractOptions {
        final_display_order: Some(vec![
            "Gewicht".to_string(),
            "Position".to_string(),
        ]),
        ..ExtractOptions::default()
    };
    let table = extract_table(&schedule_tokens(), 1400, &options);
    assert_eq!(table.columns[0].label, "Gewicht");
    assert_eq!(table.columns[1].label, "Position");
    assert_eq!(table.rows[0][0], "11.1");
}
