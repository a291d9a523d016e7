//! Data model for a single row of tabular data

mod cell;
mod property;
mod row;

pub use cell::Cell;
pub use property::Property;
pub use row::Row;
