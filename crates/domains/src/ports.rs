//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Services only ever see the traits, never a concrete adapter.

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;

use crate::document::Document;
use crate::errors::Result;

/// Persistence contract: the whole document in, the whole document out.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the entire persisted document. Fails if it is missing or malformed.
    async fn load(&self) -> anyhow::Result<Document>;
    /// Atomically replaces the persisted document.
    async fn save(&self, doc: &Document) -> anyhow::Result<()>;
}

/// Bearer token registry. Tokens live as long as the process does.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SessionStore: Send + Sync {
    fn put(&self, token: String, user_id: i64);
    fn get(&self, token: &str) -> Option<i64>;
    /// Returns whether the token was known.
    fn invalidate(&self, token: &str) -> bool;
    /// Drops every token of a user. Returns how many were removed.
    fn invalidate_user(&self, user_id: i64) -> usize;
}

/// Credential and identity primitives.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Salted one-way hash, self-describing (PHC string).
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;
    fn verify_password(&self, password: &str, hash: &str) -> bool;
    /// Fresh, unguessable bearer token.
    fn generate_token(&self) -> String;
    /// Stable pseudonymous identifier for a client address.
    fn hash_ip(&self, ip: &str) -> String;
}

/// Which upload side-tree a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Avatar,
    Cover,
}

impl MediaKind {
    pub fn dir(self) -> &'static str {
        match self {
            Self::Avatar => "avatars",
            Self::Cover => "covers",
        }
    }
}

/// Storage for uploaded images.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Stores an image for the entity `owner_id` and returns its public path.
    /// Rejects payloads that are not images with a validation error.
    async fn store_image(
        &self,
        kind: MediaKind,
        owner_id: i64,
        data: Bytes,
        content_type: Option<Mime>,
    ) -> Result<String>;
}
