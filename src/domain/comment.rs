use serde::{Deserialize, Serialize};

use crate::domain::text::short_date;
use crate::domain::{Identified, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub created_by: User,
    pub created_at: String,
    #[serde(default)]
    pub like_count: u32,
}

impl Comment {
    pub fn display_date(&self) -> String {
        short_date(&self.created_at)
    }
}

impl Identified for Comment {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body for creating, replying to or editing a comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRequest {
    pub text: String,
}

impl CommentRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The kind of record a comment thread hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    Article,
    Post,
}

impl CommentTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentTarget::Article => "Article",
            CommentTarget::Post => "Post",
        }
    }
}

impl std::str::FromStr for CommentTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "article" => Ok(CommentTarget::Article),
            "post" => Ok(CommentTarget::Post),
            other => Err(format!("Unknown comment target: {}", other)),
        }
    }
}

impl std::fmt::Display for CommentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
