//! Serde round-trip tests for the serializable artifacts.
#![cfg(feature = "serde")]

use tabsnap::{Column, Region, Role, Table, Token, Warning};

#[test]
fn token_round_trips_with_ocr_dump_field_names() {
    let json = r#"{"text":"Ø","left":400,"top":100,"width":30,"height":20,"conf":87.5}"#;
    let token: Token = serde_json::from_str(json).unwrap();
    assert_eq!(token.text, "Ø");
    assert_eq!(token.confidence, 87.5);

    let back = serde_json::to_string(&token).unwrap();
    assert!(back.contains("\"conf\":87.5"));
    let again: Token = serde_json::from_str(&back).unwrap();
    assert_eq!(again, token);
}

#[test]
fn table_round_trips() {
    let table = Table::new(
        vec![
            Column::with_role("Position", Role::Position),
            Column::new("Biegeform"),
        ],
        vec![vec!["3".to_string(), "S1".to_string()]],
    );
    let json = serde_json::to_string(&table).unwrap();
    let back: Table = serde_json::from_str(&json).unwrap();
    assert_eq!(back, table);
    assert!(json.contains("\"position\""));
}

#[test]
fn warning_round_trips() {
    let warning = Warning::row(0, 3, "weight_kg", "Gewicht mismatch");
    let json = serde_json::to_string(&warning).unwrap();
    let back: Warning = serde_json::from_str(&json).unwrap();
    assert_eq!(back, warning);
}

#[test]
fn region_list_parses_from_detector_output() {
    let json = r#"[{"x1":0,"y1":0,"x2":1400,"y2":400},{"x1":0,"y1":600,"x2":1400,"y2":900}]"#;
    let regions: Vec<Region> = serde_json::from_str(json).unwrap();
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[1].y1, 600);
}
