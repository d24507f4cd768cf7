use std::sync::Arc;

use chrono::Utc;
use domains::models::{Bookmark, Post, PublicUser, Records, User};
use domains::ports::SessionStore;
use domains::{AppError, CascadeReport, Page, PageRequest, Result, SortKey};

use crate::db::Db;
use crate::require_admin;
use crate::views::PostView;

pub struct UserService {
    db: Arc<Db>,
    sessions: Arc<dyn SessionStore>,
}

impl UserService {
    pub fn new(db: Arc<Db>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { db, sessions }
    }

    pub async fn get(&self, id: i64) -> Result<PublicUser> {
        let doc = self.db.read().await?;
        Ok(PublicUser::from(doc.users.fetch(id)?))
    }

    /// Most followed users, excluding the caller.
    pub async fn recommended(&self, viewer: Option<i64>, limit: usize) -> Result<Vec<PublicUser>> {
        let doc = self.db.read().await?;
        let mut users: Vec<&User> = doc.users.iter().filter(|u| Some(u.id) != viewer).collect();
        users.sort_by(|a, b| b.followers_count.cmp(&a.followers_count));
        Ok(users.into_iter().take(limit).map(PublicUser::from).collect())
    }

    /// A user's posts, newest first. Drafts are only listed for the owner.
    pub async fn posts(&self, user_id: i64, viewer: Option<&User>, page: PageRequest) -> Result<Page<PostView>> {
        let doc = self.db.read().await?;
        doc.users.fetch(user_id)?;
        let own = viewer.is_some_and(|v| v.id == user_id);
        let mut posts: Vec<&Post> = doc
            .posts
            .iter()
            .filter(|p| p.author_id == user_id && (own || p.is_published()))
            .collect();
        SortKey::Latest.sort(&mut posts);
        Ok(Page::slice(posts, page)?.map(|p| PostView::build(p, &doc)))
    }

    /// Bookmarked posts, most recently bookmarked first.
    pub async fn bookmarks(&self, user_id: i64, page: PageRequest) -> Result<Page<PostView>> {
        let doc = self.db.read().await?;
        doc.users.fetch(user_id)?;
        let mut marks: Vec<&Bookmark> = doc.bookmarks.iter().filter(|b| b.user_id == user_id).collect();
        marks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let posts: Vec<&Post> = marks.into_iter().filter_map(|b| doc.posts.by_id(b.post_id)).collect();
        Ok(Page::slice(posts, page)?.map(|p| PostView::build(p, &doc)))
    }

    /// Admin only. Removes the account with everything it owns and ends its
    /// sessions.
    #[tracing::instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn delete(&self, actor: &User, id: i64) -> Result<CascadeReport> {
        require_admin(actor)?;
        if actor.id == id {
            return Err(AppError::forbidden("admins cannot delete their own account"));
        }
        let report = self.db.mutate(|doc| doc.delete::<User>(id, actor.id, Utc::now())).await?;
        let sessions = self.sessions.invalidate_user(id);
        tracing::info!(user_id = id, ?report, sessions, "user deleted");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::models::Role;
    use domains::ports::{MockDocumentStore, MockSessionStore};

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            email: format!("u{id}@example.com"),
            password: "x".into(),
            username: format!("u{id}"),
            bio: String::new(),
            avatar: None,
            role,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now(),
        }
    }

    fn service(store: MockDocumentStore, sessions: MockSessionStore) -> UserService {
        UserService::new(Arc::new(Db::new(Arc::new(store))), Arc::new(sessions))
    }

    #[tokio::test]
    async fn only_admins_delete_users() {
        let mut store = MockDocumentStore::new();
        store.expect_load().times(0);
        let svc = service(store, MockSessionStore::new());

        let res = svc.delete(&user(2, Role::User), 3).await;
        assert!(matches!(res, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn admins_cannot_delete_themselves() {
        let mut store = MockDocumentStore::new();
        store.expect_load().times(0);
        let svc = service(store, MockSessionStore::new());

        let res = svc.delete(&user(1, Role::Admin), 1).await;
        assert!(matches!(res, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn deleting_a_user_ends_their_sessions() {
        let mut doc = domains::Document::default();
        doc.users.push(user(1, Role::Admin));
        doc.users.push(user(2, Role::User));
        let mut store = MockDocumentStore::new();
        store.expect_load().returning(move || Ok(doc.clone()));
        store
            .expect_save()
            .withf(|d| d.users.len() == 1)
            .times(1)
            .returning(|_| Ok(()));
        let mut sessions = MockSessionStore::new();
        sessions.expect_invalidate_user().withf(|id| *id == 2).times(1).returning(|_| 2);

        let report = service(store, sessions).delete(&user(1, Role::Admin), 2).await.unwrap();
        assert_eq!(report.users, 1);
    }

    #[tokio::test]
    async fn recommended_skips_the_viewer() {
        let mut doc = domains::Document::default();
        for id in 1..=3 {
            let mut u = user(id, Role::User);
            u.followers_count = id as u64;
            doc.users.push(u);
        }
        let mut store = MockDocumentStore::new();
        store.expect_load().returning(move || Ok(doc.clone()));

        let picks = service(store, MockSessionStore::new()).recommended(Some(3), 5).await.unwrap();
        let ids: Vec<i64> = picks.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
