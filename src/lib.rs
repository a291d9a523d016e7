//! tablestream - Row values for streamed tabular data
//!
//! A [`Row`] is an ordered sequence of [`Cell`] values with optional string
//! properties and an optional original index used as a sort tie-breaker.
//! Rows encode to a versioned XML or JSON schema through [`codec`].

pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod sort;

pub use config::{Config, Format};
pub use error::{Result, RowError};
pub use model::{Cell, Property, Row};
