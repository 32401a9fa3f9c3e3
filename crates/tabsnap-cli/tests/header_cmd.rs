//! Integration tests for the `header` subcommand.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn cmd() -> Command {
    Command::cargo_bin("tabsnap").unwrap()
}

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn header_lines_become_a_json_map() {
    let strip = write_file("Projekt: BV Musterhaus\nDatum: 12.03.2024\n");
    let output = cmd().arg("header").arg(strip.path()).output().unwrap();
    assert!(output.status.success());
    let map: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(map["Projekt"], "BV Musterhaus");
    assert_eq!(map["Datum"], "12.03.2024");
}

#[test]
fn key_map_renames_parsed_keys() {
    let strip = write_file("Projekt: BV Musterhaus\n");
    let key_map = write_file(r#"{"Projekt": "PROJECT"}"#);
    let output = cmd()
        .arg("header")
        .arg(strip.path())
        .arg("--key-map")
        .arg(key_map.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let map: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(map["PROJECT"], "BV Musterhaus");
    assert!(map.get("Projekt").is_none());
}

#[test]
fn lines_without_a_colon_are_ignored() {
    let strip = write_file("Stahlliste Decke\nProjekt: BV Nord\n");
    let output = cmd().arg("header").arg(strip.path()).output().unwrap();
    assert!(output.status.success());
    let map: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(map.as_object().unwrap().len(), 1);
}

#[test]
fn missing_file_exits_with_code_two() {
    cmd()
        .arg("header")
        .arg("nope.txt")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("file not found"));
}
