use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use domains::models::{Post, PostStatus, Records, User};
use domains::ports::{AuthProvider, MediaKind, MediaStorage};
use domains::{AppError, CascadeReport, Document, Page, PageRequest, Result, SortKey};
use mime::Mime;
use serde::Deserialize;

use crate::db::Db;
use crate::{live_account, validate};
use crate::views::PostView;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    /// Only posts carrying this tag (case-insensitive).
    #[serde(default)]
    pub tag: Option<String>,
    /// Only posts by this author id.
    #[serde(default)]
    pub author: Option<i64>,
    /// Free-text filter over title, summary, content and tags.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
}

impl PostQuery {
    pub fn page_request(&self) -> PageRequest {
        let d = PageRequest::default();
        PageRequest::new(self.page.unwrap_or(d.page), self.limit.unwrap_or(d.limit))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Generated from the title when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub status: Option<PostStatus>,
}

/// Case-insensitive match of `needle` (already lowercased) against a post's text.
pub(crate) fn post_matches(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle)
        || post.summary.to_lowercase().contains(needle)
        || post.content.to_lowercase().contains(needle)
        || post.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

fn visible_to(post: &Post, viewer: Option<&User>) -> bool {
    post.is_published() || viewer.is_some_and(|v| v.can_modify(post.author_id))
}

fn slug_taken(doc: &Document, slug: &str, except: Option<i64>) -> bool {
    doc.posts.iter().any(|p| p.slug == slug && Some(p.id) != except)
}

/// First free slug among `<title>`, `<title>-<id>`, `<title>-<id>-2`, ...
/// Titles without ASCII letters or digits start from `post-<id>`.
fn free_slug(doc: &Document, title: &str, id: i64) -> String {
    let base = validate::slugify(title);
    let stem = if base.is_empty() { format!("post-{id}") } else { format!("{base}-{id}") };
    std::iter::once(base)
        .filter(|b| !b.is_empty())
        .chain(std::iter::once(stem.clone()))
        .chain((2u64..).map(|n| format!("{stem}-{n}")))
        .find(|s| !slug_taken(doc, s, None))
        .unwrap_or(stem)
}

pub struct PostService {
    db: Arc<Db>,
    auth: Arc<dyn AuthProvider>,
    media: Arc<dyn MediaStorage>,
    view_window: Duration,
}

impl PostService {
    pub fn new(
        db: Arc<Db>,
        auth: Arc<dyn AuthProvider>,
        media: Arc<dyn MediaStorage>,
        view_window: Duration,
    ) -> Self {
        Self { db, auth, media, view_window }
    }

    /// Published posts, filtered, sorted and paginated.
    pub async fn list(&self, query: &PostQuery) -> Result<Page<PostView>> {
        let doc = self.db.read().await?;
        let needle = query.q.as_deref().map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());

        let mut hits: Vec<&Post> = doc
            .posts
            .iter()
            .filter(|p| p.is_published())
            .filter(|p| query.tag.as_deref().is_none_or(|t| p.has_tag(t)))
            .filter(|p| query.author.is_none_or(|a| p.author_id == a))
            .filter(|p| needle.as_deref().is_none_or(|n| post_matches(p, n)))
            .collect();
        query.sort.sort(&mut hits);

        Ok(Page::slice(hits, query.page_request())?.map(|p| PostView::build(p, &doc)))
    }

    /// Reads a post by slug, counting the view and recording history for
    /// signed-in viewers.
    #[tracing::instrument(skip(self, viewer, client_ip))]
    pub async fn get_by_slug(
        &self,
        slug: &str,
        viewer: Option<&User>,
        client_ip: &str,
    ) -> Result<PostView> {
        let client = match viewer {
            Some(u) => format!("user:{}", u.id),
            None => format!("ip:{}", self.auth.hash_ip(client_ip)),
        };
        let window = self.view_window;
        self.db
            .mutate(|doc| {
                let now = Utc::now();
                let post = doc
                    .posts
                    .iter_mut()
                    .find(|p| p.slug == slug)
                    .filter(|p| visible_to(p, viewer))
                    .ok_or_else(|| AppError::not_found("post", slug))?;
                post.register_view(&client, now, window);
                let post_id = post.id;
                if let Some(v) = viewer {
                    live_account(doc, v.id)?;
                    doc.touch_history(v.id, post_id, now);
                }
                let post = doc.posts.fetch(post_id)?;
                Ok(PostView::build(post, doc))
            })
            .await
    }

    /// Reads a post by id without counting a view (editing screens).
    pub async fn get_by_id(&self, id: i64, viewer: Option<&User>) -> Result<PostView> {
        let doc = self.db.read().await?;
        let post = doc
            .posts
            .by_id(id)
            .filter(|p| visible_to(p, viewer))
            .ok_or_else(|| AppError::not_found("post", id))?;
        Ok(PostView::build(post, &doc))
    }

    #[tracing::instrument(skip(self, author, input), fields(author_id = author.id))]
    pub async fn create(&self, author: &User, input: NewPost) -> Result<PostView> {
        let title = validate::length("title", &input.title, 1, validate::MAX_TITLE_LEN)?.to_string();
        let content = validate::length("content", &input.content, 1, usize::MAX)?.to_string();
        let tags = validate::tags(&input.tags)?;
        let explicit_slug = input.slug.as_deref().map(validate::slug).transpose()?;
        let summary = input
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| validate::summary_of(&content));

        let view = self
            .db
            .mutate(|doc| {
                live_account(doc, author.id)?;
                let id = doc.posts.next_id();
                let slug = match explicit_slug {
                    Some(s) if slug_taken(doc, &s, None) => {
                        return Err(AppError::conflict(format!("slug '{s}' is already in use")));
                    }
                    Some(s) => s,
                    None => free_slug(doc, &title, id),
                };
                let now = Utc::now();
                let post = Post {
                    id,
                    slug,
                    title,
                    content,
                    summary,
                    tags,
                    author_id: author.id,
                    cover: input.cover,
                    likes_count: 0,
                    views_count: 0,
                    comments_count: 0,
                    bookmarks_count: 0,
                    status: input.status,
                    created_at: now,
                    updated_at: now,
                    view_records: BTreeMap::new(),
                };
                doc.posts.push(post);
                doc.recount_tags();
                let post = doc.posts.fetch(id)?;
                Ok(PostView::build(post, doc))
            })
            .await?;
        tracing::info!(post_id = view.id, slug = %view.slug, "post created");
        Ok(view)
    }

    #[tracing::instrument(skip(self, actor, patch), fields(actor_id = actor.id))]
    pub async fn update(&self, actor: &User, id: i64, patch: PostPatch) -> Result<PostView> {
        let title = patch
            .title
            .as_deref()
            .map(|t| validate::length("title", t, 1, validate::MAX_TITLE_LEN).map(str::to_string))
            .transpose()?;
        let content = patch
            .content
            .as_deref()
            .map(|c| validate::length("content", c, 1, usize::MAX).map(str::to_string))
            .transpose()?;
        let tags = patch.tags.as_deref().map(validate::tags).transpose()?;
        let slug = patch.slug.as_deref().map(validate::slug).transpose()?;

        self.db
            .mutate(|doc| {
                let owner = doc.posts.fetch(id)?.author_id;
                if !actor.can_modify(owner) {
                    return Err(AppError::forbidden("only the author or an admin may edit this post"));
                }
                if let Some(s) = &slug {
                    if slug_taken(doc, s, Some(id)) {
                        return Err(AppError::conflict(format!("slug '{s}' is already in use")));
                    }
                }
                let post = doc.posts.fetch_mut(id)?;
                if let Some(v) = title {
                    post.title = v;
                }
                if let Some(v) = content {
                    post.content = v;
                }
                if let Some(v) = patch.summary {
                    post.summary = v.trim().to_string();
                }
                if let Some(v) = tags {
                    post.tags = v;
                }
                if let Some(v) = slug {
                    post.slug = v;
                }
                if let Some(v) = patch.cover {
                    post.cover = Some(v);
                }
                if let Some(v) = patch.status {
                    post.status = v;
                }
                post.updated_at = Utc::now();
                doc.recount_tags();
                let post = doc.posts.fetch(id)?;
                Ok(PostView::build(post, doc))
            })
            .await
    }

    #[tracing::instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn delete(&self, actor: &User, id: i64) -> Result<CascadeReport> {
        let report = self
            .db
            .mutate(|doc| {
                let owner = doc.posts.fetch(id)?.author_id;
                if !actor.can_modify(owner) {
                    return Err(AppError::forbidden("only the author or an admin may delete this post"));
                }
                doc.delete::<Post>(id, actor.id, Utc::now())
            })
            .await?;
        tracing::info!(post_id = id, ?report, "post deleted");
        Ok(report)
    }

    #[tracing::instrument(skip(self, actor, data), fields(actor_id = actor.id))]
    pub async fn set_cover(
        &self,
        actor: &User,
        id: i64,
        data: Bytes,
        content_type: Option<Mime>,
    ) -> Result<PostView> {
        let owner = self.db.read().await?.posts.fetch(id)?.author_id;
        if !actor.can_modify(owner) {
            return Err(AppError::forbidden("only the author or an admin may change the cover"));
        }
        let path = self.media.store_image(MediaKind::Cover, id, data, content_type).await?;
        self.db
            .mutate(|doc| {
                let post = doc.posts.fetch_mut(id)?;
                post.cover = Some(path);
                post.updated_at = Utc::now();
                let post = doc.posts.fetch(id)?;
                Ok(PostView::build(post, doc))
            })
            .await
    }
}
