pub mod admin;
pub mod anonymous;
pub mod auth;
pub mod catalog;
pub mod me;
pub mod posts;
pub mod social;
pub mod system;
pub mod users;
