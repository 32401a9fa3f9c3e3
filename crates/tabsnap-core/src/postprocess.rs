//! Table cleanup rules applied after assembly and canonicalization.
//!
//! Each rule is independent; [`postprocess`] chains them in a fixed order
//! but none of them depends on another having run first.

use std::sync::LazyLock;

use regex::Regex;

use crate::table::{Column, Role, Table};

static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(summe|gesamtgewicht|anzahl der ausf|anzahl der ausfüh|ausführungen)\b")
        .expect("valid pattern")
});
static SYMBOL_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w\s]+$").expect("valid pattern"));
static INT_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,4}$").expect("valid pattern"));
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.,]?\d*$").expect("valid pattern"));
static PURE_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid pattern"));

/// Blank placeholder glyphs that OCR emits for empty ruled cells.
const BLANK_PLACEHOLDERS: [&str; 3] = ["—", "―", " "];

/// Scrub cell text: trim, repair the diameter glyph, and blank out
/// placeholder or symbol-only cells (`—`, `=`, stray punctuation).
pub fn scrub_cells(table: &Table) -> Table {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    let text = cell.trim().replace('@', "Ø");
                    if BLANK_PLACEHOLDERS.contains(&text.as_str())
                        || SYMBOL_ONLY_RE.is_match(&text)
                    {
                        String::new()
                    } else {
                        text
                    }
                })
                .collect()
        })
        .collect();
    Table {
        columns: table.columns.clone(),
        rows,
    }
}

/// Drop summary/total lines that bleed into the table body.
///
/// Sum and total-weight lines are document-level aggregates; counting them
/// as data rows would double everything downstream.
pub fn drop_summary_rows(table: &Table) -> Table {
    let rows = table
        .rows
        .iter()
        .filter(|row| !SUMMARY_RE.is_match(&row.join(" ").to_lowercase()))
        .cloned()
        .collect();
    Table {
        columns: table.columns.clone(),
        rows,
    }
}

/// Keep only rows where at least 2 of the structurally reliable columns
/// (position, count, diameter) hold an integer-like value.
///
/// Stray OCR noise that lands inside the table band rarely produces two
/// plausible integers in the right columns. Applied only when at least two
/// of those columns exist, so sparse tables are not wiped out.
pub fn retain_core_numeric_rows(table: &Table) -> Table {
    let mut core: Vec<usize> = Vec::new();
    for (i, column) in table.columns.iter().enumerate() {
        let by_role = matches!(
            column.role,
            Some(Role::Position) | Some(Role::Quantity) | Some(Role::DiameterMm)
        );
        let by_label = matches!(column.label.as_str(), "Position" | "Stück" | "Ø [mm]");
        if by_role || by_label {
            core.push(i);
        }
    }
    if core.len() < 2 {
        return table.clone();
    }

    let rows = table
        .rows
        .iter()
        .filter(|row| {
            let hits = core
                .iter()
                .filter(|&&i| INT_LIKE_RE.is_match(row[i].trim()))
                .count();
            hits >= 2
        })
        .cloned()
        .collect();
    Table {
        columns: table.columns.clone(),
        rows,
    }
}

/// Drop tiny noise rows when a shape column is present.
///
/// Isolated single-letter artifacts (a stray `S` or `N` from the bending
/// shape sketches) produce rows with one or two short cells and nothing
/// else.
pub fn drop_shape_noise_rows(table: &Table, shape_label: &str) -> Table {
    if !table.columns.iter().any(|c| c.label == shape_label) {
        return table.clone();
    }
    let rows = table
        .rows
        .iter()
        .filter(|row| {
            let filled: Vec<&str> = row
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect();
            !(filled.len() <= 2 && filled.iter().all(|c| c.chars().count() <= 2))
        })
        .cloned()
        .collect();
    Table {
        columns: table.columns.clone(),
        rows,
    }
}

/// Rewrite comma decimal separators to periods in numeric-looking cells.
pub fn normalize_decimals(table: &Table) -> Table {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    if DECIMAL_RE.is_match(cell) {
                        cell.replace(',', ".")
                    } else {
                        cell.clone()
                    }
                })
                .collect()
        })
        .collect();
    Table {
        columns: table.columns.clone(),
        rows,
    }
}

/// Drop rows with no cell content at all.
pub fn drop_empty_rows(table: &Table) -> Table {
    let rows = table
        .rows
        .iter()
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .cloned()
        .collect();
    Table {
        columns: table.columns.clone(),
        rows,
    }
}

/// Drop columns with no cell content in any row (only when rows exist).
pub fn drop_empty_columns(table: &Table) -> Table {
    if table.rows.is_empty() {
        return table.clone();
    }
    let keep: Vec<usize> = (0..table.column_count())
        .filter(|&i| table.rows.iter().any(|row| !row[i].trim().is_empty()))
        .collect();
    if keep.len() == table.column_count() {
        return table.clone();
    }
    let columns = keep.iter().map(|&i| table.columns[i].clone()).collect();
    let rows = table
        .rows
        .iter()
        .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Table { columns, rows }
}

/// Relabel the first column as the position column when it is mostly
/// integers and no position column was recognized.
pub fn recover_position_column(table: &Table) -> Table {
    let has_position = table
        .columns
        .iter()
        .any(|c| c.role == Some(Role::Position) || c.label == "Position");
    if has_position || table.rows.is_empty() || table.columns.is_empty() {
        return table.clone();
    }

    let int_count = table
        .rows
        .iter()
        .filter(|row| PURE_INT_RE.is_match(row[0].trim()))
        .count();
    if (int_count as f64) / (table.rows.len() as f64) < 0.60 {
        return table.clone();
    }

    let mut columns = table.columns.clone();
    columns[0] = Column::with_role("Position", Role::Position);
    Table {
        columns,
        rows: table.rows.clone(),
    }
}

/// Reorder columns to a configured display order.
///
/// Labels listed in `order` come first, in that order, and are created as
/// empty columns when absent; unlisted columns follow in their original
/// relative order.
pub fn apply_display_order(table: &Table, order: &[String]) -> Table {
    let mut columns = table.columns.clone();
    let mut rows = table.rows.clone();

    for label in order {
        if !columns.iter().any(|c| &c.label == label) {
            columns.push(Column::new(label.clone()));
            for row in &mut rows {
                row.push(String::new());
            }
        }
    }

    let mut ordered: Vec<usize> = Vec::new();
    for label in order {
        if let Some(i) = columns.iter().position(|c| &c.label == label) {
            ordered.push(i);
        }
    }
    for i in 0..columns.len() {
        if !ordered.contains(&i) {
            ordered.push(i);
        }
    }

    let columns = ordered.iter().map(|&i| columns[i].clone()).collect();
    let rows = rows
        .iter()
        .map(|row| ordered.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Table { columns, rows }
}

/// Run the full cleanup pass.
pub fn postprocess(
    table: &Table,
    shape_label: Option<&str>,
    final_order: Option<&[String]>,
) -> Table {
    let mut out = scrub_cells(table);
    out = drop_summary_rows(&out);
    out = retain_core_numeric_rows(&out);
    if let Some(label) = shape_label {
        out = drop_shape_noise_rows(&out, label);
    }
    out = normalize_decimals(&out);
    out = drop_empty_rows(&out);
    out = drop_empty_columns(&out);
    out = recover_position_column(&out);
    if let Some(order) = final_order {
        out = apply_display_order(&out, order);
    }
    out
}
