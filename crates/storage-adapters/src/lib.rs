//! # storage-adapters
//!
//! Persistence and media adapters for the `domains` ports.

pub mod json_file;
pub mod local_media;
pub mod memory;

pub use json_file::JsonFileStore;
pub use local_media::LocalMediaStorage;
pub use memory::MemoryStore;
