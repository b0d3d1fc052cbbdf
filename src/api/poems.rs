use reqwest::Method;
use serde::de::IgnoredAny;

use super::segment;
use crate::client::{ApiClient, ApiError, RequestOptions};
use crate::types::{CreatePoem, Page, PageQuery, Poem, UpdatePoem};

impl ApiClient {
    pub async fn list_poems(&self, query: &PageQuery) -> Result<Page<Poem>, ApiError> {
        self.get_data_with_query("/api/poems", query).await
    }

    pub async fn get_poem(&self, id: &str) -> Result<Poem, ApiError> {
        self.get_data(&format!("/api/poems/{}", segment(id))).await
    }

    pub async fn create_poem(&self, poem: &CreatePoem) -> Result<Poem, ApiError> {
        self.send_data(Method::POST, "/api/poems", Some(poem)).await
    }

    pub async fn update_poem(&self, id: &str, changes: &UpdatePoem) -> Result<Poem, ApiError> {
        let path = format!("/api/poems/{}", segment(id));
        self.send_data(Method::PUT, &path, Some(changes)).await
    }

    pub async fn delete_poem(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/poems/{}", segment(id))).await
    }

    pub async fn like_poem(&self, id: &str) -> Result<(), ApiError> {
        self.toggle(Method::POST, id, "like").await
    }

    pub async fn unlike_poem(&self, id: &str) -> Result<(), ApiError> {
        self.toggle(Method::DELETE, id, "like").await
    }

    pub async fn bookmark_poem(&self, id: &str) -> Result<(), ApiError> {
        self.toggle(Method::POST, id, "bookmark").await
    }

    pub async fn unbookmark_poem(&self, id: &str) -> Result<(), ApiError> {
        self.toggle(Method::DELETE, id, "bookmark").await
    }

    async fn toggle(&self, method: Method, id: &str, action: &str) -> Result<(), ApiError> {
        let path = format!("/api/poems/{}/{action}", segment(id));
        let _: IgnoredAny = self.request(method, &path, RequestOptions::new()).await?;
        Ok(())
    }
}
