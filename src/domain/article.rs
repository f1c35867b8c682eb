use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::text::{parse_timestamp, plain_text, short_date};
use crate::domain::{Identified, Image, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoCategory {
    #[serde(default)]
    pub primary: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub auto_category: Option<AutoCategory>,
    #[serde(default)]
    pub created_by: Option<User>,
    pub created_at: String,
}

impl Article {
    pub fn category_name(&self) -> &str {
        self.auto_category
            .as_ref()
            .and_then(|c| c.primary.as_ref())
            .map(|c| c.name.as_str())
            .unwrap_or("Article")
    }

    pub fn author_name(&self) -> String {
        self.created_by
            .as_ref()
            .map(User::display_name)
            .unwrap_or_else(|| "(Anonymous)".to_string())
    }

    pub fn plain_description(&self) -> String {
        plain_text(&self.description)
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn display_date(&self) -> String {
        short_date(&self.created_at)
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(|i| i.url.as_deref())
    }
}

impl Identified for Article {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields for creating or updating an article. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subtitle: Option<String>,
    pub category: Option<String>,
    pub section: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub image: Option<std::path::PathBuf>,
}

impl ArticleDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Text parts in wire order, tags comma-joined.
    pub fn text_parts(&self) -> Vec<(&'static str, String)> {
        let mut parts = Vec::new();
        if let Some(title) = &self.title {
            parts.push(("title", title.clone()));
        }
        if let Some(description) = &self.description {
            parts.push(("description", description.clone()));
        }
        if let Some(subtitle) = &self.subtitle {
            parts.push(("subtitle", subtitle.clone()));
        }
        if let Some(category) = &self.category {
            parts.push(("category", category.clone()));
        }
        if let Some(section) = &self.section {
            parts.push(("section", section.clone()));
        }
        if let Some(tags) = &self.tags {
            parts.push(("tags", tags.join(",")));
        }
        if let Some(is_published) = self.is_published {
            parts.push(("isPublished", is_published.to_string()));
        }
        parts
    }
}

/// Filters for article search. Unset filters are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    pub query: Option<String>,
    pub category: Option<String>,
    pub section: Option<String>,
}

impl ArticleQuery {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        [
            ("query", &self.query),
            ("category", &self.category),
            ("section", &self.section),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name, v.clone())))
        .collect()
    }
}
