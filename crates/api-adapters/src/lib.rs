//! # api-adapters
//!
//! The HTTP surface of Inkwell. Handlers translate requests into service
//! calls and `AppError`s into status codes; no business rule lives here.

pub mod avatar;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod web;

#[cfg(feature = "web-axum")]
pub use web::{router, AppState};
