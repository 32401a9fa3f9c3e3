//! Table value types: canonical column roles, columns, and the table itself.

use std::fmt;

/// Canonical semantic identity of a schedule column.
///
/// Display labels (possibly abbreviated, accented, or OCR-mangled) are
/// mapped onto these fixed roles by the header canonicalizer. The string
/// forms are stable and double as the validation-view column labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Role {
    /// Row identifier within the schedule.
    Position,
    /// Piece count.
    Quantity,
    /// Bar diameter in millimetres.
    DiameterMm,
    /// Length of a single piece in metres.
    UnitLengthM,
    /// Total length (count × unit length) in metres.
    TotalLengthM,
    /// Row mass in kilograms.
    WeightKg,
}

impl Role {
    /// All roles in canonical column order.
    pub const ALL: [Role; 6] = [
        Role::Position,
        Role::Quantity,
        Role::DiameterMm,
        Role::UnitLengthM,
        Role::TotalLengthM,
        Role::WeightKg,
    ];

    /// Stable snake_case name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Position => "position",
            Role::Quantity => "quantity",
            Role::DiameterMm => "diameter_mm",
            Role::UnitLengthM => "unit_length_m",
            Role::TotalLengthM => "total_length_m",
            Role::WeightKg => "weight_kg",
        }
    }

    /// Parse a stable role name back into a role.
    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL.iter().copied().find(|r| r.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One table column: the display label plus its canonical role, if known.
///
/// Unrecognized labels keep `role: None` and are preserved, never dropped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    /// Display label as recovered from the header (or assigned positionally).
    pub label: String,
    /// Canonical role, when the label was recognized.
    pub role: Option<Role>,
}

impl Column {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            role: None,
        }
    }

    pub fn with_role(label: impl Into<String>, role: Role) -> Self {
        Self {
            label: label.into(),
            role: Some(role),
        }
    }
}

/// A rectangular table of cells.
///
/// Every row holds exactly `columns.len()` cells; a cell that received no
/// tokens is the empty string. Declared-empty and absent are different
/// things downstream, so the shape is kept rectangular at all times.
/// Pipeline stages consume a table and return a new one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    /// Ordered columns; index in this list is the column index.
    pub columns: Vec<Column>,
    /// Row-major cell text.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from column definitions and rows, padding or truncating
    /// each row to the column count.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// An empty table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if the table has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of the column carrying `role`, if any.
    pub fn column_index(&self, role: Role) -> Option<usize> {
        self.columns.iter().position(|c| c.role == Some(role))
    }

    /// Cell text at `(row, column)`, or `None` when out of range.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(column)).map(String::as_str)
    }

    /// Cell text for `role` in `row`, or `None` when the role is absent.
    pub fn cell_by_role(&self, row: usize, role: Role) -> Option<&str> {
        self.column_index(role).and_then(|c| self.cell(row, c))
    }

    /// The validation view: canonical-role columns only, in canonical order,
    /// labels rewritten to the stable role names.
    ///
    /// Validation always parses this view, so display formatting changes
    /// (label language, column order) never affect validation semantics.
    pub fn validation_view(&self) -> Table {
        let mut columns = Vec::new();
        let mut indices = Vec::new();
        for role in Role::ALL {
            if let Some(idx) = self.column_index(role) {
                columns.push(Column::with_role(role.as_str(), role));
                indices.push(idx);
            }
        }
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec![
                Column::with_role("Position", Role::Position),
                Column::new("Biegeform"),
                Column::with_role("Gewicht [kg]", Role::WeightKg),
            ],
            vec![
                vec!["1".into(), "S".into(), "4.5".into()],
                vec!["2".into(), "".into(), "9.0".into()],
            ],
        )
    }

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_name(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_name("shape"), None);
    }

    #[test]
    fn rows_are_padded_to_column_count() {
        let t = Table::new(
            vec![Column::new("A"), Column::new("B")],
            vec![vec!["1".into()]],
        );
        assert_eq!(t.rows[0], vec!["1".to_string(), String::new()]);
    }

    #[test]
    fn cell_lookup_by_role() {
        let t = sample();
        assert_eq!(t.cell_by_role(0, Role::WeightKg), Some("4.5"));
        assert_eq!(t.cell_by_role(1, Role::Quantity), None);
    }

    #[test]
    fn validation_view_keeps_only_roles_in_canonical_order() {
        let t = sample();
        let v = t.validation_view();
        assert_eq!(v.column_count(), 2);
        assert_eq!(v.columns[0].label, "position");
        assert_eq!(v.columns[1].label, "weight_kg");
        assert_eq!(v.rows[0], vec!["1".to_string(), "4.5".to_string()]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn table_serializes_with_role_names() {
        let t = sample();
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"position\""));
        assert!(json.contains("Biegeform"));
    }
}
