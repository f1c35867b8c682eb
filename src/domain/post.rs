use serde::{Deserialize, Serialize};

use crate::domain::text::{plain_text, short_date};
use crate::domain::{Identified, Image, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    #[serde(rename = "image", default)]
    pub images: Option<Vec<Image>>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
    pub created_by: User,
    pub created_at: String,
    pub updated_at: String,
}

impl Post {
    pub fn images(&self) -> &[Image] {
        self.images.as_deref().unwrap_or(&[])
    }

    pub fn plain_content(&self) -> String {
        plain_text(&self.content)
    }

    pub fn display_date(&self) -> String {
        short_date(&self.created_at)
    }
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}
