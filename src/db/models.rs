use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_file: Option<String>,
    pub created_at: String,
}

impl User {
    /// URL the browser should load this user's avatar from.
    pub fn avatar_url(&self) -> String {
        match &self.avatar_file {
            Some(file) => format!("/media/{}", file),
            None => "/assets/img/default-avatar.svg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A post joined with its author, as listed on the home and author pages.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author_username: String,
    pub author_avatar: Option<String>,
}

impl PostWithAuthor {
    pub fn author_avatar_url(&self) -> String {
        match &self.author_avatar {
            Some(file) => format!("/media/{}", file),
            None => "/assets/img/default-avatar.svg".to_string(),
        }
    }
}
