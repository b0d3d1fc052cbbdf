use reqwest::Method;
use serde::Serialize;

use super::segment;
use crate::client::{ApiClient, ApiError};
use crate::types::{Collection, CreateCollection, Page, PageQuery, UpdateCollection};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddPoem<'a> {
    poem_id: &'a str,
}

impl ApiClient {
    pub async fn list_collections(&self, query: &PageQuery) -> Result<Page<Collection>, ApiError> {
        self.get_data_with_query("/api/collections", query).await
    }

    pub async fn get_collection(&self, id: &str) -> Result<Collection, ApiError> {
        self.get_data(&format!("/api/collections/{}", segment(id)))
            .await
    }

    pub async fn create_collection(
        &self,
        collection: &CreateCollection,
    ) -> Result<Collection, ApiError> {
        self.send_data(Method::POST, "/api/collections", Some(collection))
            .await
    }

    pub async fn update_collection(
        &self,
        id: &str,
        changes: &UpdateCollection,
    ) -> Result<Collection, ApiError> {
        let path = format!("/api/collections/{}", segment(id));
        self.send_data(Method::PUT, &path, Some(changes)).await
    }

    pub async fn delete_collection(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/collections/{}", segment(id)))
            .await
    }

    /// Returns the updated collection.
    pub async fn add_poem_to_collection(
        &self,
        collection_id: &str,
        poem_id: &str,
    ) -> Result<Collection, ApiError> {
        let path = format!("/api/collections/{}/poems", segment(collection_id));
        self.send_data(Method::POST, &path, Some(&AddPoem { poem_id }))
            .await
    }

    pub async fn remove_poem_from_collection(
        &self,
        collection_id: &str,
        poem_id: &str,
    ) -> Result<(), ApiError> {
        self.delete(&format!(
            "/api/collections/{}/poems/{}",
            segment(collection_id),
            segment(poem_id)
        ))
        .await
    }
}
