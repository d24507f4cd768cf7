//! # auth-adapters
//!
//! Credential hashing and session registry adapters.

pub mod argon;
pub mod session;

pub use argon::Argon2AuthProvider;
pub use session::InMemorySessionStore;
