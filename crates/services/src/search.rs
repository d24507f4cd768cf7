use std::sync::Arc;

use domains::models::{Post, PublicUser, User};
use domains::{AppError, Page, PageRequest, Result, SortKey};

use crate::db::Db;
use crate::posts::post_matches;
use crate::views::{PostView, Suggestion, SuggestionKind};

pub const MAX_SUGGESTIONS: usize = 8;

fn needle(q: &str) -> Result<String> {
    let q = q.trim();
    if q.is_empty() {
        return Err(AppError::validation("search query must not be empty"));
    }
    Ok(q.to_lowercase())
}

pub struct SearchService {
    db: Arc<Db>,
}

impl SearchService {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Published posts matching `q`, newest first.
    pub async fn posts(&self, q: &str, page: PageRequest) -> Result<Page<PostView>> {
        let needle = needle(q)?;
        let doc = self.db.read().await?;
        let mut hits: Vec<&Post> = doc
            .posts
            .iter()
            .filter(|p| p.is_published() && post_matches(p, &needle))
            .collect();
        SortKey::Latest.sort(&mut hits);
        Ok(Page::slice(hits, page)?.map(|p| PostView::build(p, &doc)))
    }

    /// Users whose username or bio contains `q`.
    pub async fn users(&self, q: &str, page: PageRequest) -> Result<Page<PublicUser>> {
        let needle = needle(q)?;
        let doc = self.db.read().await?;
        let hits: Vec<&User> = doc
            .users
            .iter()
            .filter(|u| u.username.to_lowercase().contains(&needle) || u.bio.to_lowercase().contains(&needle))
            .collect();
        Ok(Page::slice(hits, page)?.map(PublicUser::from))
    }

    /// Post titles first, then tag names, at most [`MAX_SUGGESTIONS`] in total.
    pub async fn suggestions(&self, q: &str) -> Result<Vec<Suggestion>> {
        let needle = needle(q)?;
        let doc = self.db.read().await?;
        let posts = doc
            .posts
            .iter()
            .filter(|p| p.is_published() && p.title.to_lowercase().contains(&needle))
            .map(|p| Suggestion {
                kind: SuggestionKind::Post,
                text: p.title.clone(),
                slug: Some(p.slug.clone()),
            });
        let tags = doc
            .tags
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .map(|t| Suggestion { kind: SuggestionKind::Tag, text: t.name.clone(), slug: None });
        Ok(posts.chain(tags).take(MAX_SUGGESTIONS).collect())
    }
}
