use super::segment;
use crate::client::{ApiClient, ApiError};
use crate::types::{Collection, Page, PageQuery, Poem, User};

impl ApiClient {
    pub async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        self.get_data(&format!("/api/users/{}", segment(id))).await
    }

    pub async fn user_poems(&self, user_id: &str, query: &PageQuery) -> Result<Page<Poem>, ApiError> {
        let path = format!("/api/users/{}/poems", segment(user_id));
        self.get_data_with_query(&path, query).await
    }

    pub async fn user_collections(
        &self,
        user_id: &str,
        query: &PageQuery,
    ) -> Result<Page<Collection>, ApiError> {
        let path = format!("/api/users/{}/collections", segment(user_id));
        self.get_data_with_query(&path, query).await
    }

    /// Poems the signed-in user bookmarked.
    pub async fn bookmarked_poems(&self, query: &PageQuery) -> Result<Page<Poem>, ApiError> {
        self.get_data_with_query("/api/users/bookmarks", query).await
    }
}
