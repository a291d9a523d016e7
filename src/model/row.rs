//! The row value type

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::property::Property;
use crate::error::{Result, RowError};

/// One row of tabular data
///
/// Cells are ordered and may repeat. Properties are string metadata keyed
/// uniquely by name. The optional original index records the row's position
/// in some earlier ordering and breaks ties when sorting.
///
/// Two rows are equal when their cells are pairwise equal and their original
/// indices match (an unset index only equals another unset index).
/// Properties never take part in equality. [`Hash`] covers the cells only,
/// so rows that differ just by original index land in the same bucket and
/// are told apart by `Eq`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "c", default)]
    cells: Vec<Cell>,
    #[serde(rename = "p", default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
    #[serde(rename = "i", default, skip_serializing_if = "Option::is_none")]
    original_index: Option<i32>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row holding the given cells in order
    pub fn from_cells<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append a cell to the end of the row
    pub fn add(&mut self, cell: impl Into<Cell>) {
        self.cells.push(cell.into());
    }

    /// Get the cell at `index`, failing when the index is out of range
    pub fn cell(&self, index: usize) -> Result<&Cell> {
        self.cells.get(index).ok_or(RowError::IndexOutOfBounds {
            index,
            len: self.cells.len(),
        })
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn has_cell(&self, index: usize) -> bool {
        index < self.cells.len()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Set a property, returning the value it replaced
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.properties.insert(key.into(), value.into())
    }

    /// Builder-style variant of [`Row::set_property`]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Look up a property by exact key
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Iterate properties as `(key, value)` pairs in insertion order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Owned copies of all properties
    pub fn to_properties(&self) -> Vec<Property> {
        self.properties()
            .map(|(k, v)| Property::new(k, v))
            .collect()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Index of this row in the original order, or 0 when unset.
    ///
    /// An explicit 0 and an unset index read the same here; use
    /// [`Row::original_index_opt`] to tell them apart.
    pub fn original_index(&self) -> i32 {
        self.original_index.unwrap_or(0)
    }

    pub fn original_index_opt(&self) -> Option<i32> {
        self.original_index
    }

    pub fn has_original_index(&self) -> bool {
        self.original_index.is_some()
    }

    /// Store or clear the original index
    pub fn set_original_index(&mut self, index: Option<i32>) {
        self.original_index = index;
    }

    /// Builder-style variant of [`Row::set_original_index`]
    pub fn with_original_index(mut self, index: i32) -> Self {
        self.original_index = Some(index);
        self
    }

    /// Hash of the cell sequence using FxHasher, matching [`Hash`] for `Row`
    pub fn cell_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.cells.len() == other.cells.len()
            && self.cells.iter().zip(&other.cells).all(|(a, b)| a == b)
            && self.original_index == other.original_index
    }
}

impl Eq for Row {}

impl Hash for Row {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cells.hash(state);
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", cell)?;
        }
        f.write_str("]")
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }
}

impl FromIterator<Cell> for Row {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl Extend<Cell> for Row {
    fn extend<I: IntoIterator<Item = Cell>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}

impl IntoIterator for Row {
    type Item = Cell;
    type IntoIter = std::vec::IntoIter<Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_lookup() {
        let mut row = Row::new();
        assert_eq!(row.len(), 0);
        assert!(!row.has_cell(0));
        assert_eq!(row.iter().count(), 0);

        row.add("a1");
        row.add(2i64);
        assert_eq!(row.len(), 2);
        assert_eq!(row.cell(0).unwrap(), &Cell::from("a1"));
        assert_eq!(row.cell(1).unwrap(), &Cell::Int(2));
        assert!(row.has_cell(1));
        assert!(!row.has_cell(2));
    }

    #[test]
    fn test_cell_out_of_bounds() {
        let row = Row::from_cells(["a"]);
        match row.cell(1) {
            Err(RowError::IndexOutOfBounds { index, len }) => {
                assert_eq!(index, 1);
                assert_eq!(len, 1);
            }
            other => panic!("expected out-of-bounds error, got {:?}", other),
        }
        assert!(row.get(1).is_none());
    }

    #[test]
    fn test_properties_last_write_wins() {
        let mut row = Row::new();
        assert_eq!(row.property("unit"), None);
        assert_eq!(row.set_property("unit", "kg"), None);
        assert_eq!(row.property("unit"), Some("kg"));
        assert_eq!(row.set_property("unit", "g"), Some("kg".to_string()));
        assert_eq!(row.property("unit"), Some("g"));
        assert_eq!(row.property("Unit"), None);
        assert_eq!(row.property_count(), 1);
    }

    #[test]
    fn test_original_index_default_and_clear() {
        let mut row = Row::new();
        assert_eq!(row.original_index(), 0);
        assert!(!row.has_original_index());

        row.set_original_index(Some(5));
        assert_eq!(row.original_index(), 5);
        assert_eq!(row.original_index_opt(), Some(5));

        row.set_original_index(None);
        assert_eq!(row.original_index_opt(), None);
    }

    #[test]
    fn test_equality_includes_original_index_not_properties() {
        let a = Row::from_cells(["x", "y"]);
        let b = Row::from_cells(["x", "y"]).with_property("k", "v");
        assert_eq!(a, b);
        assert_eq!(a.cell_hash(), b.cell_hash());

        let zero = Row::from_cells(["x", "y"]).with_original_index(0);
        assert_ne!(a, zero);
        assert_eq!(a.cell_hash(), zero.cell_hash());

        assert_ne!(a, Row::from_cells(["x"]));
        assert_ne!(a, Row::from_cells(["x", "z"]));
    }

    #[test]
    fn test_display_renders_cell_list() {
        let row = Row::from_cells([Cell::from("a"), Cell::Int(1), Cell::Null]);
        assert_eq!(row.to_string(), "[a, 1, NULL]");
        assert_eq!(Row::new().to_string(), "[]");
    }

    #[test]
    fn test_iteration_order() {
        let row: Row = vec![Cell::from("a"), Cell::from("b")].into();
        let rendered: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered, vec!["a", "b"]);

        let owned: Vec<Cell> = row.into_iter().collect();
        assert_eq!(owned.len(), 2);
    }
}
