use std::sync::Arc;

use chrono::Utc;
use domains::models::{Comment, NotificationKind, Records, RelatedType, User};
use domains::{AppError, CascadeReport, Page, PageRequest, Result};
use serde::Deserialize;

use crate::db::Db;
use crate::live_account;
use crate::notifications::{notify, Notice};
use crate::validate::{self, ContentFilter};
use crate::views::CommentView;

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub content: String,
    #[serde(default, rename = "parentId", alias = "parent_id")]
    pub parent_id: Option<i64>,
}

pub struct CommentService {
    db: Arc<Db>,
    filter: ContentFilter,
}

impl CommentService {
    pub fn new(db: Arc<Db>, filter: ContentFilter) -> Self {
        Self { db, filter }
    }

    /// Every comment of a post, oldest first. Replies carry their `parentId`.
    pub async fn list(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let doc = self.db.read().await?;
        doc.posts.fetch(post_id)?;
        let mut comments: Vec<&Comment> = doc.comments.iter().filter(|c| c.post_id == post_id).collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments.into_iter().map(|c| CommentView::build(c, &doc)).collect())
    }

    #[tracing::instrument(skip(self, author, input), fields(author_id = author.id))]
    pub async fn create(&self, author: &User, post_id: i64, input: NewComment) -> Result<CommentView> {
        let content = validate::length("content", &input.content, 1, validate::MAX_COMMENT_LEN)?.to_string();
        self.filter.check(&content)?;

        let view = self
            .db
            .mutate(|doc| {
                live_account(doc, author.id)?;
                let post = doc.posts.fetch(post_id)?;
                let (post_author, post_title) = (post.author_id, post.title.clone());

                let parent_author = match input.parent_id {
                    Some(pid) => {
                        let parent = doc.comments.fetch(pid)?;
                        if parent.post_id != post_id {
                            tracing::debug!(parent_id = pid, "parent belongs to another post");
                            return Err(AppError::validation("parent comment belongs to another post"));
                        }
                        Some(parent.author_id)
                    }
                    None => None,
                };

                let now = Utc::now();
                let id = doc.comments.next_id();
                doc.comments.push(Comment {
                    id,
                    post_id,
                    author_id: author.id,
                    content: content.clone(),
                    parent_id: input.parent_id,
                    likes: 0,
                    created_at: now,
                    updated_at: now,
                });
                doc.recount_post(post_id);

                notify(
                    doc,
                    Notice {
                        recipient: post_author,
                        actor: author.id,
                        kind: NotificationKind::Comment,
                        title: format!("{} commented on \"{post_title}\"", author.username),
                        content: validate::summary_of(&content),
                        related: Some((RelatedType::Post, post_id)),
                    },
                );
                // The post author already heard about it.
                if let Some(parent_author) = parent_author.filter(|a| *a != post_author) {
                    notify(
                        doc,
                        Notice {
                            recipient: parent_author,
                            actor: author.id,
                            kind: NotificationKind::Reply,
                            title: format!("{} replied to your comment", author.username),
                            content: validate::summary_of(&content),
                            related: Some((RelatedType::Post, post_id)),
                        },
                    );
                }

                let comment = doc.comments.fetch(id)?;
                Ok(CommentView::build(comment, doc))
            })
            .await?;
        tracing::info!(comment_id = view.id, post_id, "comment created");
        Ok(view)
    }

    /// Allowed for the comment author, the post author and admins. Takes the
    /// whole reply subtree with it.
    #[tracing::instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn delete(&self, actor: &User, id: i64) -> Result<CascadeReport> {
        let report = self
            .db
            .mutate(|doc| {
                let comment = doc.comments.fetch(id)?;
                let post_author = doc.posts.by_id(comment.post_id).map(|p| p.author_id);
                let allowed = actor.can_modify(comment.author_id) || post_author == Some(actor.id);
                if !allowed {
                    return Err(AppError::forbidden(
                        "only the comment author, the post author or an admin may delete this comment",
                    ));
                }
                doc.delete::<Comment>(id, actor.id, Utc::now())
            })
            .await?;
        tracing::info!(comment_id = id, removed = report.comments, "comment deleted");
        Ok(report)
    }

    /// Plain counter; likes on comments are not tracked per user.
    pub async fn like(&self, id: i64) -> Result<CommentView> {
        self.db
            .mutate(|doc| {
                let comment = doc.comments.fetch_mut(id)?;
                comment.likes += 1;
                let comment = doc.comments.fetch(id)?;
                Ok(CommentView::build(comment, doc))
            })
            .await
    }

    /// Comments written by a user, newest first.
    pub async fn by_user(&self, user_id: i64, page: PageRequest) -> Result<Page<CommentView>> {
        let doc = self.db.read().await?;
        doc.users.fetch(user_id)?;
        let mut mine: Vec<&Comment> = doc.comments.iter().filter(|c| c.author_id == user_id).collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::slice(mine, page)?.map(|c| CommentView::build(c, &doc)))
    }
}
