//! Registration, login and profile management.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use domains::models::{PublicUser, Records, Role, User};
use domains::ports::{AuthProvider, MediaKind, MediaStorage, SessionStore};
use domains::{AppError, Result};
use mime::Mime;
use serde::{Deserialize, Serialize};

use crate::db::Db;
use crate::validate;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    /// Defaults to the email address.
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

pub struct AuthService {
    db: Arc<Db>,
    auth: Arc<dyn AuthProvider>,
    sessions: Arc<dyn SessionStore>,
    media: Arc<dyn MediaStorage>,
}

impl AuthService {
    pub fn new(
        db: Arc<Db>,
        auth: Arc<dyn AuthProvider>,
        sessions: Arc<dyn SessionStore>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self { db, auth, sessions, media }
    }

    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<PublicUser> {
        self.create_account(input, Role::User).await
    }

    /// Shared by registration and the seed tool.
    pub async fn create_account(&self, input: RegisterInput, role: Role) -> Result<PublicUser> {
        let email = validate::email(&input.email)?;
        validate::password(&input.password)?;
        let username = match input.username.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(u) => validate::length("username", u, 1, validate::MAX_USERNAME_LEN)?.to_string(),
            None => email.clone(),
        };
        // Hash outside the writer lock; it is the slow part.
        let password = self.auth.hash_password(&input.password)?;

        let user = self
            .db
            .mutate(|doc| {
                if doc.user_by_email(&email).is_some() {
                    return Err(AppError::conflict(format!("email {email} is already registered")));
                }
                let user = User {
                    id: doc.users.next_id(),
                    email,
                    password,
                    username,
                    bio: String::new(),
                    avatar: None,
                    role,
                    followers_count: 0,
                    following_count: 0,
                    created_at: Utc::now(),
                };
                doc.users.push(user.clone());
                Ok(user)
            })
            .await?;
        tracing::info!(user_id = user.id, "account created");
        Ok(PublicUser::from(&user))
    }

    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<LoginOutcome> {
        let doc = self.db.read().await?;
        let user = doc
            .user_by_email(input.email.trim())
            .filter(|u| self.auth.verify_password(&input.password, &u.password))
            .ok_or_else(|| {
                tracing::debug!("login rejected");
                AppError::unauthorized("invalid email or password")
            })?;

        let token = self.auth.generate_token();
        self.sessions.put(token.clone(), user.id);
        tracing::info!(user_id = user.id, "logged in");
        Ok(LoginOutcome { access_token: token, token_type: "bearer", user: PublicUser::from(user) })
    }

    pub fn logout(&self, token: &str) -> Result<()> {
        if !self.sessions.invalidate(token) {
            return Err(AppError::unauthorized("unknown session"));
        }
        Ok(())
    }

    /// Resolves a bearer token to its (still existing) user.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let user_id = self
            .sessions
            .get(token)
            .ok_or_else(|| AppError::unauthorized("invalid or expired token"))?;
        let doc = self.db.read().await?;
        match doc.users.by_id(user_id) {
            Some(u) => Ok(u.clone()),
            None => {
                self.sessions.invalidate_user(user_id);
                Err(AppError::unauthorized("account no longer exists"))
            }
        }
    }

    pub async fn profile(&self, user_id: i64) -> Result<PublicUser> {
        let doc = self.db.read().await?;
        Ok(PublicUser::from(doc.users.fetch(user_id)?))
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<PublicUser> {
        let username = update
            .username
            .as_deref()
            .map(|u| validate::length("username", u, 1, validate::MAX_USERNAME_LEN).map(str::to_string))
            .transpose()?;
        let bio = update
            .bio
            .as_deref()
            .map(|b| validate::length("bio", b, 0, validate::MAX_BIO_LEN).map(str::to_string))
            .transpose()?;
        let email = update.email.as_deref().map(validate::email).transpose()?;

        self.db
            .mutate(|doc| {
                if let Some(email) = &email {
                    let taken = doc
                        .users
                        .iter()
                        .any(|u| u.id != user_id && u.email.eq_ignore_ascii_case(email));
                    if taken {
                        return Err(AppError::conflict(format!("email {email} is already registered")));
                    }
                }
                let user = doc.users.fetch_mut(user_id)?;
                if let Some(username) = username {
                    user.username = username;
                }
                if let Some(bio) = bio {
                    user.bio = bio;
                }
                if let Some(email) = email {
                    user.email = email;
                }
                Ok(PublicUser::from(&*user))
            })
            .await
    }

    #[tracing::instrument(skip(self, change))]
    pub async fn change_password(&self, user_id: i64, change: PasswordChange) -> Result<()> {
        validate::password(&change.new_password)?;
        let doc = self.db.read().await?;
        let current = doc.users.fetch(user_id)?;
        if !self.auth.verify_password(&change.old_password, &current.password) {
            return Err(AppError::unauthorized("current password is incorrect"));
        }
        let hashed = self.auth.hash_password(&change.new_password)?;
        self.db
            .mutate(|doc| {
                doc.users.fetch_mut(user_id)?.password = hashed;
                Ok(())
            })
            .await?;
        tracing::info!(user_id, "password changed");
        Ok(())
    }

    #[tracing::instrument(skip(self, data))]
    pub async fn set_avatar(
        &self,
        user_id: i64,
        data: Bytes,
        content_type: Option<Mime>,
    ) -> Result<PublicUser> {
        // Fail before touching the disk when the account is gone.
        self.db.read().await?.users.fetch(user_id)?;
        let path = self
            .media
            .store_image(MediaKind::Avatar, user_id, data, content_type)
            .await?;
        self.db
            .mutate(|doc| {
                let user = doc.users.fetch_mut(user_id)?;
                user.avatar = Some(path);
                Ok(PublicUser::from(&*user))
            })
            .await
    }
}
