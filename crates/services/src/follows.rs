use std::sync::Arc;

use chrono::Utc;
use domains::models::{Follow, NotificationKind, PublicUser, Records, RelatedType, User};
use domains::{AppError, Document, Page, PageRequest, Result};

use crate::db::Db;
use crate::live_account;
use crate::notifications::{notify, Notice};
use crate::views::FollowStatus;

fn status_of(doc: &Document, follower_id: i64, target: &User) -> FollowStatus {
    FollowStatus {
        following: doc.is_following(follower_id, target.id),
        followers_count: target.followers_count,
        following_count: target.following_count,
    }
}

pub struct FollowService {
    db: Arc<Db>,
}

impl FollowService {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self, follower), fields(follower_id = follower.id))]
    pub async fn follow(&self, follower: &User, following_id: i64) -> Result<FollowStatus> {
        if follower.id == following_id {
            tracing::debug!("self-follow rejected");
            return Err(AppError::conflict("you cannot follow yourself"));
        }
        self.db
            .mutate(|doc| {
                live_account(doc, follower.id)?;
                doc.users.fetch(following_id)?;
                if doc.is_following(follower.id, following_id) {
                    return Err(AppError::conflict("already following this user"));
                }
                let id = doc.follows.next_id();
                doc.follows.push(Follow {
                    id,
                    follower_id: follower.id,
                    following_id,
                    created_at: Utc::now(),
                });
                doc.recount_user(follower.id);
                doc.recount_user(following_id);
                notify(
                    doc,
                    Notice {
                        recipient: following_id,
                        actor: follower.id,
                        kind: NotificationKind::Follow,
                        title: format!("{} started following you", follower.username),
                        content: String::new(),
                        related: Some((RelatedType::User, follower.id)),
                    },
                );
                Ok(status_of(doc, follower.id, doc.users.fetch(following_id)?))
            })
            .await
    }

    #[tracing::instrument(skip(self, follower), fields(follower_id = follower.id))]
    pub async fn unfollow(&self, follower: &User, following_id: i64) -> Result<FollowStatus> {
        self.db
            .mutate(|doc| {
                doc.users.fetch(following_id)?;
                let before = doc.follows.len();
                doc.follows
                    .retain(|f| !(f.follower_id == follower.id && f.following_id == following_id));
                if doc.follows.len() == before {
                    return Err(AppError::not_found("follow", following_id));
                }
                doc.recount_user(follower.id);
                doc.recount_user(following_id);
                Ok(status_of(doc, follower.id, doc.users.fetch(following_id)?))
            })
            .await
    }

    pub async fn status(&self, follower_id: i64, following_id: i64) -> Result<FollowStatus> {
        let doc = self.db.read().await?;
        let target = doc.users.fetch(following_id)?;
        Ok(status_of(&doc, follower_id, target))
    }

    /// Users following `user_id`, most recent follow first.
    pub async fn followers(&self, user_id: i64, page: PageRequest) -> Result<Page<PublicUser>> {
        self.edges(user_id, page, |f| (f.following_id == user_id).then_some(f.follower_id))
            .await
    }

    /// Users `user_id` follows, most recent follow first.
    pub async fn following(&self, user_id: i64, page: PageRequest) -> Result<Page<PublicUser>> {
        self.edges(user_id, page, |f| (f.follower_id == user_id).then_some(f.following_id))
            .await
    }

    async fn edges(
        &self,
        user_id: i64,
        page: PageRequest,
        other_end: impl Fn(&Follow) -> Option<i64>,
    ) -> Result<Page<PublicUser>> {
        let doc = self.db.read().await?;
        doc.users.fetch(user_id)?;
        let mut edges: Vec<&Follow> = doc.follows.iter().filter(|f| other_end(f).is_some()).collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let users: Vec<PublicUser> = edges
            .into_iter()
            .filter_map(|f| other_end(f))
            .filter_map(|id| doc.users.by_id(id))
            .map(PublicUser::from)
            .collect();
        Page::slice(users, page)
    }
}
