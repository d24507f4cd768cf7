//! # Document
//!
//! The whole datastore as one value: ten named collections, each an ordered
//! sequence of typed records. Services load it, mutate it through the methods
//! below, and hand it back to the persistence port in one piece.
//!
//! Invariants maintained here:
//! - cascade deletes never leave a dangling foreign key behind;
//! - derived counters are recomputed from the source collections, never
//!   adjusted blindly, so they cannot drift;
//! - a user keeps at most [`HISTORY_LIMIT`] history records.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};
use crate::models::{
    AnonymousMessage, Bookmark, Comment, DeletionPolicy, Entity, Follow, History, Like,
    Notification, Post, Records, RelatedType, Tag, User,
};

/// Maximum number of history records kept per user.
pub const HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
    #[serde(default)]
    pub follows: Vec<Follow>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub history: Vec<History>,
    #[serde(default)]
    pub anonymous_messages: Vec<AnonymousMessage>,
}

/// What a cascade delete removed, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub likes: usize,
    pub bookmarks: usize,
    pub follows: usize,
    pub notifications: usize,
    pub history: usize,
}

/// Ties an entity to its collection and to the work its [`DeletionPolicy`]
/// calls for. Used by [`Document::delete`].
pub trait Stored: Entity + Sized {
    fn collection(doc: &mut Document) -> &mut Vec<Self>;

    /// Removes `id` and everything that depends on it. `Cascade` entities.
    fn cascade(_doc: &mut Document, _id: i64) -> Result<CascadeReport> {
        Err(AppError::Internal(anyhow::anyhow!("{} records do not cascade", Self::NAME)))
    }

    fn is_retired(&self) -> bool {
        false
    }

    /// Flags the record as deleted in place. `Soft` entities.
    fn retire(&mut self, _by: i64, _at: DateTime<Utc>) {}
}

macro_rules! stored {
    ($($ty:ty => $field:ident),* $(,)?) => {$(
        impl Stored for $ty {
            fn collection(doc: &mut Document) -> &mut Vec<Self> {
                &mut doc.$field
            }
        }
    )*};
}

stored!(
    Tag => tags,
    Like => likes,
    Bookmark => bookmarks,
    Follow => follows,
    Notification => notifications,
    History => history,
);

impl Stored for User {
    fn collection(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.users
    }

    fn cascade(doc: &mut Document, id: i64) -> Result<CascadeReport> {
        doc.delete_user(id)
    }
}

impl Stored for Post {
    fn collection(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.posts
    }

    fn cascade(doc: &mut Document, id: i64) -> Result<CascadeReport> {
        doc.delete_post(id)
    }
}

impl Stored for Comment {
    fn collection(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.comments
    }

    fn cascade(doc: &mut Document, id: i64) -> Result<CascadeReport> {
        doc.delete_comment(id)
    }
}

impl Stored for AnonymousMessage {
    fn collection(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.anonymous_messages
    }

    fn is_retired(&self) -> bool {
        self.is_deleted
    }

    fn retire(&mut self, by: i64, at: DateTime<Utc>) {
        self.soft_delete(by, at);
    }
}

/// Removes every element matching `pred` and returns how many went.
fn remove_where<T>(items: &mut Vec<T>, mut pred: impl FnMut(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(|item| !pred(item));
    before - items.len()
}

impl Document {
    // ── Lookups ──────────────────────────────────────────────────────────────

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn post_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn has_liked(&self, user_id: i64, post_id: i64) -> bool {
        self.likes.iter().any(|l| l.user_id == user_id && l.post_id == post_id)
    }

    pub fn has_bookmarked(&self, user_id: i64, post_id: i64) -> bool {
        self.bookmarks.iter().any(|b| b.user_id == user_id && b.post_id == post_id)
    }

    pub fn is_following(&self, follower_id: i64, following_id: i64) -> bool {
        self.follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id)
    }

    /// The given comments plus every reply beneath them, at any depth.
    pub fn comment_subtree(&self, roots: &[i64]) -> HashSet<i64> {
        let mut found: HashSet<i64> = roots.iter().copied().collect();
        loop {
            let before = found.len();
            for c in &self.comments {
                if let Some(parent) = c.parent_id {
                    if found.contains(&parent) {
                        found.insert(c.id);
                    }
                }
            }
            if found.len() == before {
                return found;
            }
        }
    }

    // ── Derived counters ─────────────────────────────────────────────────────

    /// Recomputes `comments_count`, `likes_count` and `bookmarks_count` of one post.
    pub fn recount_post(&mut self, post_id: i64) {
        let comments = self.comments.iter().filter(|c| c.post_id == post_id).count() as u64;
        let likes = self.likes.iter().filter(|l| l.post_id == post_id).count() as u64;
        let bookmarks = self.bookmarks.iter().filter(|b| b.post_id == post_id).count() as u64;
        if let Some(post) = self.posts.by_id_mut(post_id) {
            post.comments_count = comments;
            post.likes_count = likes;
            post.bookmarks_count = bookmarks;
        }
    }

    /// Recomputes `followers_count` and `following_count` of one user.
    pub fn recount_user(&mut self, user_id: i64) {
        let followers = self.follows.iter().filter(|f| f.following_id == user_id).count() as u64;
        let following = self.follows.iter().filter(|f| f.follower_id == user_id).count() as u64;
        if let Some(user) = self.users.by_id_mut(user_id) {
            user.followers_count = followers;
            user.following_count = following;
        }
    }

    /// Recomputes every tag's `post_count` from the tag names carried by posts.
    pub fn recount_tags(&mut self) {
        for tag in &mut self.tags {
            tag.post_count = self.posts.iter().filter(|p| p.has_tag(&tag.name)).count() as u64;
        }
    }

    /// Recomputes every derived counter in the document.
    pub fn recount_all(&mut self) {
        let post_ids: Vec<i64> = self.posts.iter().map(|p| p.id).collect();
        for id in post_ids {
            self.recount_post(id);
        }
        let user_ids: Vec<i64> = self.users.iter().map(|u| u.id).collect();
        for id in user_ids {
            self.recount_user(id);
        }
        self.recount_tags();
    }

    // ── Deletes ──────────────────────────────────────────────────────────────

    /// Deletes one record the way `T::DELETION` prescribes. `by` and `at` are
    /// stamped on soft-deleted records; one already retired reads as missing.
    pub fn delete<T: Stored>(&mut self, id: i64, by: i64, at: DateTime<Utc>) -> Result<CascadeReport> {
        match T::DELETION {
            DeletionPolicy::Hard => {
                let items = T::collection(self);
                items.fetch(id)?;
                items.retain(|r| r.id() != id);
                Ok(CascadeReport::default())
            }
            DeletionPolicy::Cascade => T::cascade(self, id),
            DeletionPolicy::Soft => {
                T::collection(self)
                    .by_id_mut(id)
                    .filter(|r| !r.is_retired())
                    .ok_or_else(|| AppError::not_found(T::NAME, id))?
                    .retire(by, at);
                Ok(CascadeReport::default())
            }
        }
    }

    /// Removes a comment and every reply beneath it.
    fn delete_comment(&mut self, comment_id: i64) -> Result<CascadeReport> {
        let post_id = self.comments.fetch(comment_id)?.post_id;
        let doomed = self.comment_subtree(&[comment_id]);
        let report = CascadeReport {
            comments: remove_where(&mut self.comments, |c| doomed.contains(&c.id)),
            ..CascadeReport::default()
        };
        self.recount_post(post_id);
        Ok(report)
    }

    /// Removes a post with its comments, likes, bookmarks, history entries and
    /// the notifications pointing at it.
    fn delete_post(&mut self, post_id: i64) -> Result<CascadeReport> {
        self.posts.fetch(post_id)?;
        let report = self.remove_posts(&[post_id]);
        self.recount_tags();
        Ok(report)
    }

    /// Removes a user and everything that belongs to or points at them.
    fn delete_user(&mut self, user_id: i64) -> Result<CascadeReport> {
        self.users.fetch(user_id)?;

        let authored: Vec<i64> = self
            .posts
            .iter()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        let mut report = self.remove_posts(&authored);

        let own_comments: Vec<i64> = self
            .comments
            .iter()
            .filter(|c| c.author_id == user_id)
            .map(|c| c.id)
            .collect();
        let doomed = self.comment_subtree(&own_comments);
        report.comments += remove_where(&mut self.comments, |c| doomed.contains(&c.id));
        report.likes += remove_where(&mut self.likes, |l| l.user_id == user_id);
        report.bookmarks += remove_where(&mut self.bookmarks, |b| b.user_id == user_id);
        report.follows += remove_where(&mut self.follows, |f| {
            f.follower_id == user_id || f.following_id == user_id
        });
        report.notifications += remove_where(&mut self.notifications, |n| {
            n.user_id == user_id || n.is_about(RelatedType::User, user_id)
        });
        report.history += remove_where(&mut self.history, |h| h.user_id == user_id);
        report.users = remove_where(&mut self.users, |u| u.id == user_id);

        // Likes, bookmarks and follows vanished from surviving posts and users.
        self.recount_all();
        Ok(report)
    }

    fn remove_posts(&mut self, post_ids: &[i64]) -> CascadeReport {
        let ids: HashSet<i64> = post_ids.iter().copied().collect();
        let comment_ids: HashSet<i64> = self
            .comments
            .iter()
            .filter(|c| ids.contains(&c.post_id))
            .map(|c| c.id)
            .collect();
        CascadeReport {
            comments: remove_where(&mut self.comments, |c| ids.contains(&c.post_id)),
            likes: remove_where(&mut self.likes, |l| ids.contains(&l.post_id)),
            bookmarks: remove_where(&mut self.bookmarks, |b| ids.contains(&b.post_id)),
            history: remove_where(&mut self.history, |h| ids.contains(&h.post_id)),
            notifications: remove_where(&mut self.notifications, |n| match (n.related_type, n.related_id) {
                (Some(RelatedType::Post), Some(id)) => ids.contains(&id),
                (Some(RelatedType::Comment), Some(id)) => comment_ids.contains(&id),
                _ => false,
            }),
            posts: remove_where(&mut self.posts, |p| ids.contains(&p.id)),
            ..CascadeReport::default()
        }
    }

    // ── History ──────────────────────────────────────────────────────────────

    /// Upserts the (user, post) history record and prunes the user's history
    /// to the [`HISTORY_LIMIT`] most recent visits.
    pub fn touch_history(&mut self, user_id: i64, post_id: i64, at: DateTime<Utc>) {
        match self
            .history
            .iter_mut()
            .find(|h| h.user_id == user_id && h.post_id == post_id)
        {
            Some(h) => h.visited_at = at,
            None => {
                let id = self.history.next_id();
                self.history.push(History { id, user_id, post_id, visited_at: at });
            }
        }
        self.prune_history(user_id, HISTORY_LIMIT);
    }

    /// Keeps only the `keep` most recent history records of a user.
    /// Equal timestamps are ordered by id, newest record first.
    pub fn prune_history(&mut self, user_id: i64, keep: usize) {
        let mut mine: Vec<(DateTime<Utc>, i64)> = self
            .history
            .iter()
            .filter(|h| h.user_id == user_id)
            .map(|h| (h.visited_at, h.id))
            .collect();
        if mine.len() <= keep {
            return;
        }
        mine.sort_by(|a, b| b.cmp(a));
        let survivors: HashSet<i64> = mine.iter().take(keep).map(|(_, id)| *id).collect();
        self.history
            .retain(|h| h.user_id != user_id || survivors.contains(&h.id));
    }
}
