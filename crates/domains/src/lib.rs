//! # domains
//!
//! Entities, the persisted [`Document`] with its invariants, pagination,
//! the error type and the port traits. No I/O happens in this crate.

pub mod document;
pub mod errors;
pub mod models;
pub mod pagination;
pub mod ports;

pub use document::{CascadeReport, Document, Stored, HISTORY_LIMIT};
pub use errors::{AppError, Result};
pub use pagination::{Page, PageRequest, SortKey};
