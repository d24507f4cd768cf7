use std::sync::Arc;

use chrono::Utc;
use domains::models::{Comment, Post, PublicUser, User};
use domains::{Page, PageRequest, Result};

use crate::db::Db;
use crate::require_admin;
use crate::views::{CommentView, PostView, Stats};

pub struct AdminService {
    db: Arc<Db>,
}

impl AdminService {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn stats(&self, actor: &User) -> Result<Stats> {
        require_admin(actor)?;
        let doc = self.db.read().await?;
        let today = Utc::now().date_naive();
        Ok(Stats {
            users: doc.users.len(),
            posts: doc.posts.len(),
            comments: doc.comments.len(),
            tags: doc.tags.len(),
            likes: doc.likes.len(),
            bookmarks: doc.bookmarks.len(),
            follows: doc.follows.len(),
            notifications: doc.notifications.len(),
            anonymous_messages: doc.anonymous_messages.iter().filter(|m| !m.is_deleted).count(),
            users_today: doc.users.iter().filter(|u| u.created_at.date_naive() == today).count(),
            posts_today: doc.posts.iter().filter(|p| p.created_at.date_naive() == today).count(),
            total_views: doc.posts.iter().map(|p| p.views_count).sum(),
            total_likes: doc.posts.iter().map(|p| p.likes_count).sum(),
        })
    }

    /// Newest account first.
    pub async fn users(&self, actor: &User, page: PageRequest) -> Result<Page<PublicUser>> {
        require_admin(actor)?;
        let doc = self.db.read().await?;
        let mut users: Vec<&User> = doc.users.iter().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::slice(users, page)?.map(PublicUser::from))
    }

    /// Drafts included.
    pub async fn posts(&self, actor: &User, page: PageRequest) -> Result<Page<PostView>> {
        require_admin(actor)?;
        let doc = self.db.read().await?;
        let mut posts: Vec<&Post> = doc.posts.iter().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::slice(posts, page)?.map(|p| PostView::build(p, &doc)))
    }

    pub async fn comments(&self, actor: &User, page: PageRequest) -> Result<Page<CommentView>> {
        require_admin(actor)?;
        let doc = self.db.read().await?;
        let mut comments: Vec<&Comment> = doc.comments.iter().collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::slice(comments, page)?.map(|c| CommentView::build(c, &doc)))
    }
}
