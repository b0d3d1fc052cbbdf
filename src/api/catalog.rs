use serde::Serialize;

use super::segment;
use crate::client::{ApiClient, ApiError};
use crate::types::{Category, Page, PageQuery, Poet, SearchKind, SearchResults, Tag};

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<SearchKind>,
}

impl ApiClient {
    pub async fn list_categories(&self, query: &PageQuery) -> Result<Page<Category>, ApiError> {
        self.get_data_with_query("/api/categories", query).await
    }

    pub async fn list_poets(&self, query: &PageQuery) -> Result<Page<Poet>, ApiError> {
        self.get_data_with_query("/api/poets", query).await
    }

    pub async fn get_poet(&self, id: &str) -> Result<Poet, ApiError> {
        self.get_data(&format!("/api/poets/{}", segment(id))).await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.get_data("/api/tags").await
    }

    /// Full-text search, optionally restricted to one kind of result.
    pub async fn search(&self, text: &str, kind: Option<SearchKind>) -> Result<SearchResults, ApiError> {
        self.get_data_with_query("/api/search", &SearchQuery { q: text, kind })
            .await
    }
}
