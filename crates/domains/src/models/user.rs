use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeletionPolicy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Unique across the collection, compared case-insensitively.
    pub email: String,
    /// Argon2 PHC string. Never leaves the service layer.
    pub password: String,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    /// Public path of the uploaded avatar, if any.
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    pub created_at: DateTime<Utc>,
}

entity!(User, "user", DeletionPolicy::Cascade);

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on anything; everyone else only on what they own.
    pub fn can_modify(&self, owner_id: i64) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

/// The user as exposed to API callers: everything but the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub followers_count: u64,
    pub following_count: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            username: u.username.clone(),
            bio: u.bio.clone(),
            avatar: u.avatar.clone(),
            role: u.role,
            followers_count: u.followers_count,
            following_count: u.following_count,
            created_at: u.created_at,
        }
    }
}
