use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::IgnoredAny;

use crate::api::{ApiClient, ApiError, ApiResponse, Listing};
use crate::domain::{Article, ArticleDraft, ArticleQuery};

#[async_trait]
pub trait ArticleApi: Send + Sync {
    async fn list_articles(&self, page: u32, limit: u32) -> Result<Listing<Article>, ApiError>;

    async fn list_organization_articles(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Listing<Article>, ApiError>;

    async fn search_articles(
        &self,
        query: &ArticleQuery,
        page: u32,
        limit: u32,
    ) -> Result<Listing<Article>, ApiError>;

    async fn get_article(&self, id: &str) -> Result<Article, ApiError>;

    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, ApiError>;

    async fn update_article(&self, id: &str, draft: &ArticleDraft) -> Result<Article, ApiError>;

    async fn delete_article(&self, id: &str) -> Result<(), ApiError>;

    async fn migrate_articles(&self) -> Result<(), ApiError>;
}

fn page_params(page: u32, limit: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("limit", limit.to_string())]
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

async fn article_form(draft: &ArticleDraft) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in draft.text_parts() {
        form = form.text(name, value);
    }

    if let Some(path) = &draft.image {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(image_mime(path))?;
        form = form.part("image", part);
    }

    Ok(form)
}

#[async_trait]
impl ArticleApi for ApiClient {
    async fn list_articles(&self, page: u32, limit: u32) -> Result<Listing<Article>, ApiError> {
        let response: ApiResponse<Vec<Article>> = self
            .get(&["api", "v1", "article", "all"], &page_params(page, limit))
            .await?;
        Ok(response.into())
    }

    async fn list_organization_articles(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Listing<Article>, ApiError> {
        let response: ApiResponse<Vec<Article>> = self
            .get(&["api", "v1", "article", "org", "all"], &page_params(page, limit))
            .await?;
        Ok(response.into())
    }

    async fn search_articles(
        &self,
        query: &ArticleQuery,
        page: u32,
        limit: u32,
    ) -> Result<Listing<Article>, ApiError> {
        let mut params = query.params();
        params.extend(page_params(page, limit));
        let response: ApiResponse<Vec<Article>> = self
            .get(&["api", "v1", "article", "search"], &params)
            .await?;
        Ok(response.into())
    }

    async fn get_article(&self, id: &str) -> Result<Article, ApiError> {
        let response: ApiResponse<Article> = self.get(&["api", "v1", "article", id], &[]).await?;
        response.into_data()
    }

    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, ApiError> {
        let form = article_form(draft).await?;
        let builder = self
            .request(Method::POST, &["api", "v1", "article", "create"])?
            .multipart(form);
        let response: ApiResponse<Article> = self.send(builder).await?;
        response.into_data()
    }

    async fn update_article(&self, id: &str, draft: &ArticleDraft) -> Result<Article, ApiError> {
        let form = article_form(draft).await?;
        let builder = self
            .request(Method::PUT, &["api", "v1", "article", id])?
            .multipart(form);
        let response: ApiResponse<Article> = self.send(builder).await?;
        response.into_data()
    }

    async fn delete_article(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &["api", "v1", "article", id])?;
        let _: ApiResponse<IgnoredAny> = self.send(builder).await?;
        Ok(())
    }

    async fn migrate_articles(&self) -> Result<(), ApiError> {
        let _: ApiResponse<IgnoredAny> = self.get(&["api", "v1", "article", "migrate"], &[]).await?;
        Ok(())
    }
}
