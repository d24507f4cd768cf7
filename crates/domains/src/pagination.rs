//! Page slicing and sort keys shared by every list operation.

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};
use crate::models::Post;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// 1-based page request. Deserializes straight from query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn first_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_LIMIT }
    }
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(AppError::validation("page must be at least 1"));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(AppError::validation(format!("limit must be between 1 and {MAX_LIMIT}")));
        }
        Ok(())
    }
}

/// One slice of a filtered, sorted sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of items after filtering, before slicing.
    pub total: usize,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Slices `[(page-1)*limit, (page-1)*limit + limit)` out of `all`.
    pub fn slice(all: Vec<T>, req: PageRequest) -> Result<Self> {
        req.validate()?;
        let total = all.len();
        // validate() guarantees both are positive.
        let limit = req.limit as usize;
        let start = (req.page as usize - 1).saturating_mul(limit);
        let end = start.saturating_add(limit);
        let items = all.into_iter().skip(start).take(limit).collect();
        Ok(Self {
            items,
            total,
            page: req.page,
            limit: req.limit,
            has_more: end < total,
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            has_more: self.has_more,
        }
    }
}

/// Field a post listing is sorted on, always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Latest,
    Popular,
    Views,
    Comments,
}

impl SortKey {
    /// Stable descending sort; equal keys keep their insertion order.
    pub fn sort(self, posts: &mut [&Post]) {
        match self {
            Self::Latest => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Self::Popular => posts.sort_by(|a, b| b.likes_count.cmp(&a.likes_count)),
            Self::Views => posts.sort_by(|a, b| b.views_count.cmp(&a.views_count)),
            Self::Comments => posts.sort_by(|a, b| b.comments_count.cmp(&a.comments_count)),
        }
    }
}
