//! Response shapes. Records are joined with their authors here and
//! private fields (password hashes, view records, ip hashes) are left out.

use chrono::{DateTime, Utc};
use domains::models::{AnonymousMessage, Comment, Post, PostStatus, Records, User};
use domains::Document;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorSummary {
    pub id: i64,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<&User> for AuthorSummary {
    fn from(u: &User) -> Self {
        Self { id: u.id, username: u.username.clone(), avatar: u.avatar.clone() }
    }
}

fn author(doc: &Document, id: i64) -> Option<AuthorSummary> {
    doc.users.by_id(id).map(AuthorSummary::from)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub tags: Vec<String>,
    #[serde(rename = "authorId")]
    pub author_id: i64,
    pub author: Option<AuthorSummary>,
    pub cover: Option<String>,
    pub likes_count: u64,
    pub views_count: u64,
    pub comments_count: u64,
    pub bookmarks_count: u64,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    pub fn build(post: &Post, doc: &Document) -> Self {
        Self {
            id: post.id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            summary: post.summary.clone(),
            tags: post.tags.clone(),
            author_id: post.author_id,
            author: author(doc, post.author_id),
            cover: post.cover.clone(),
            likes_count: post.likes_count,
            views_count: post.views_count,
            comments_count: post.comments_count,
            bookmarks_count: post.bookmarks_count,
            status: post.status,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: i64,
    #[serde(rename = "postId")]
    pub post_id: i64,
    #[serde(rename = "authorId")]
    pub author_id: i64,
    pub author: Option<AuthorSummary>,
    pub content: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<i64>,
    pub likes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn build(c: &Comment, doc: &Document) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            author: author(doc, c.author_id),
            content: c.content.clone(),
            parent_id: c.parent_id,
            likes: c.likes,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Public view of an anonymous message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnonymousMessageView {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&AnonymousMessage> for AnonymousMessageView {
    fn from(m: &AnonymousMessage) -> Self {
        Self { id: m.id, content: m.content.clone(), created_at: m.created_at }
    }
}

/// Moderator view: deletion metadata, still no sender hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminAnonymousMessageView {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<i64>,
}

impl From<&AnonymousMessage> for AdminAnonymousMessageView {
    fn from(m: &AnonymousMessage) -> Self {
        Self {
            id: m.id,
            content: m.content.clone(),
            created_at: m.created_at,
            is_deleted: m.is_deleted,
            deleted_at: m.deleted_at,
            deleted_by: m.deleted_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(rename = "postId")]
    pub post_id: i64,
    pub slug: String,
    pub title: String,
    pub visited_at: DateTime<Utc>,
}

/// Whether a viewer liked/bookmarked a post, with the post's current counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InteractionStatus {
    pub liked: bool,
    pub bookmarked: bool,
    pub likes_count: u64,
    pub bookmarks_count: u64,
}

impl InteractionStatus {
    pub fn of(doc: &Document, user_id: i64, post: &Post) -> Self {
        Self {
            liked: doc.has_liked(user_id, post.id),
            bookmarked: doc.has_bookmarked(user_id, post.id),
            likes_count: post.likes_count,
            bookmarks_count: post.bookmarks_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowStatus {
    pub following: bool,
    pub followers_count: u64,
    pub following_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub tags: usize,
    pub likes: usize,
    pub bookmarks: usize,
    pub follows: usize,
    pub notifications: usize,
    pub anonymous_messages: usize,
    pub users_today: usize,
    pub posts_today: usize,
    pub total_views: u64,
    pub total_likes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Post,
    Tag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub text: String,
    /// Set for post suggestions.
    pub slug: Option<String>,
}
