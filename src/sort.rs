//! Ordering helpers built on the original index

use std::cmp::Ordering;

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tracing::{trace, warn};

use crate::model::Row;

/// Record each row's current position as its original index
///
/// Returns the number of rows numbered; see [`number_rows_from`].
pub fn number_rows(rows: &mut [Row]) -> usize {
    number_rows_from(rows, 0)
}

/// Number rows by position starting at `start`
///
/// Numbering stops at the first position past `i32::MAX`; those rows keep
/// whatever index they had. Returns the number of rows numbered.
pub fn number_rows_from(rows: &mut [Row], start: i32) -> usize {
    let total = rows.len();
    for (i, row) in rows.iter_mut().enumerate() {
        let index = i32::try_from(i).ok().and_then(|i| start.checked_add(i));
        let Some(index) = index else {
            warn!(numbered = i, total, "original index overflow, numbering stopped");
            return i;
        };
        row.set_original_index(Some(index));
    }
    total
}

/// Stable sort with a caller comparator, ties broken by original index
pub fn sort_rows_by<F>(rows: &mut [Row], mut compare: F)
where
    F: FnMut(&Row, &Row) -> Ordering,
{
    rows.sort_by(|a, b| {
        compare(a, b).then_with(|| a.original_index().cmp(&b.original_index()))
    });
    trace!(rows = rows.len(), "sorted rows");
}

/// Sort rows by the cell in `column`
///
/// Rows too short to have the column sort before all others.
pub fn sort_rows_by_cell(rows: &mut [Row], column: usize) {
    sort_rows_by(rows, |a, b| match (a.get(column), b.get(column)) {
        (Some(x), Some(y)) => x.compare(y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Drop rows equal to an earlier row, keeping first occurrences in order
pub fn dedup_rows<I>(rows: I) -> Vec<Row>
where
    I: IntoIterator<Item = Row>,
{
    let mut seen: IndexSet<Row, FxBuildHasher> = IndexSet::default();
    let mut total = 0usize;
    for row in rows {
        total += 1;
        seen.insert(row);
    }
    trace!(total, kept = seen.len(), "deduplicated rows");
    seen.into_iter().collect()
}
