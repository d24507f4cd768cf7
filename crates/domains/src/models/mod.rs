//! # Domain Models
//!
//! These structs represent the entities persisted in the Inkwell document.
//! Every record carries an integer `id` unique within its collection; field
//! names are pinned with serde so the on-disk JSON keeps its historical shape
//! (`authorId`, `postId`, `isRead`, ...).

macro_rules! entity {
    ($ty:ty, $name:literal, $policy:expr) => {
        impl $crate::models::Entity for $ty {
            const NAME: &'static str = $name;
            const DELETION: $crate::models::DeletionPolicy = $policy;

            fn id(&self) -> i64 {
                self.id
            }
        }
    };
}

mod anonymous;
mod comment;
mod history;
mod interaction;
mod notification;
mod post;
mod tag;
mod user;

pub use anonymous::AnonymousMessage;
pub use comment::Comment;
pub use history::History;
pub use interaction::{Bookmark, Follow, Like};
pub use notification::{Notification, NotificationKind, RelatedType};
pub use post::{Post, PostStatus};
pub use tag::{Tag, DEFAULT_TAG_COLOR};
pub use user::{PublicUser, Role, User};

use crate::errors::{AppError, Result};

/// How a record leaves its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Removed from its sequence; nothing references it.
    Hard,
    /// Removed together with every record that references it.
    Cascade,
    /// Kept in its sequence and flagged as deleted.
    Soft,
}

/// Common behaviour of every persisted record.
pub trait Entity {
    /// Singular name used in error messages ("post", "comment", ...).
    const NAME: &'static str;
    const DELETION: DeletionPolicy;

    fn id(&self) -> i64;
}

/// Lookup helpers over a collection of records.
pub trait Records<T: Entity> {
    /// `max(existing ids, default 0) + 1`. Gaps left by deletions are never reused.
    fn next_id(&self) -> i64;
    fn by_id(&self, id: i64) -> Option<&T>;
    fn by_id_mut(&mut self, id: i64) -> Option<&mut T>;

    fn fetch(&self, id: i64) -> Result<&T> {
        self.by_id(id).ok_or_else(|| AppError::not_found(T::NAME, id))
    }

    fn fetch_mut(&mut self, id: i64) -> Result<&mut T> {
        self.by_id_mut(id).ok_or_else(|| AppError::not_found(T::NAME, id))
    }
}

impl<T: Entity> Records<T> for Vec<T> {
    fn next_id(&self) -> i64 {
        self.iter().map(Entity::id).max().unwrap_or(0) + 1
    }

    fn by_id(&self, id: i64) -> Option<&T> {
        self.iter().find(|r| r.id() == id)
    }

    fn by_id_mut(&mut self, id: i64) -> Option<&mut T> {
        self.iter_mut().find(|r| r.id() == id)
    }
}
