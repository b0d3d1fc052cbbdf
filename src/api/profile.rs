use reqwest::Method;
use serde::Serialize;

use super::DEFAULT_ENGAGEMENT_DAYS;
use crate::client::{ApiClient, ApiError};
use crate::types::{
    AddInterestRequest, EngagementActivity, ExtendedUser, InterestType, ProfileVisibility,
    ReadingLevel, TargetType, TrackEngagementRequest, UpdateProfileRequest, User, UserInterest,
};

#[derive(Serialize)]
struct DaysQuery {
    days: u32,
}

impl ApiClient {
    pub async fn get_profile(&self) -> Result<ExtendedUser, ApiError> {
        self.get_data("/api/profile").await
    }

    pub async fn update_profile(
        &self,
        changes: &UpdateProfileRequest,
    ) -> Result<ExtendedUser, ApiError> {
        self.send_data(Method::PUT, "/api/profile", Some(changes))
            .await
    }

    pub async fn complete_onboarding(&self) -> Result<ExtendedUser, ApiError> {
        self.send_data::<_, ()>(Method::POST, "/api/profile/complete-onboarding", None)
            .await
    }

    /// Seed a new account's profile from what the identity provider told us
    /// and mark onboarding as done.
    pub async fn bootstrap_profile(&self, user: &User) -> Result<ExtendedUser, ApiError> {
        let seed = UpdateProfileRequest::builder()
            .full_name(user.display_name())
            .username(user.suggested_username().to_string())
            .preferred_language("en".to_string())
            .reading_level(ReadingLevel::Beginner)
            .profile_visibility(ProfileVisibility::Public)
            .build();
        self.update_profile(&seed).await?;
        self.complete_onboarding().await
    }

    pub async fn interests(&self) -> Result<Vec<UserInterest>, ApiError> {
        self.get_data("/api/profile/interests").await
    }

    pub async fn interests_by_type(
        &self,
        interest_type: InterestType,
    ) -> Result<Vec<UserInterest>, ApiError> {
        self.get_data(&format!("/api/profile/interests/{interest_type}"))
            .await
    }

    pub async fn add_interest(&self, interest: &AddInterestRequest) -> Result<UserInterest, ApiError> {
        self.send_data(Method::POST, "/api/profile/interests", Some(interest))
            .await
    }

    pub async fn remove_interest(
        &self,
        interest_type: InterestType,
        interest_id: i64,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/api/profile/interests/{interest_type}/{interest_id}"))
            .await
    }

    pub async fn track_engagement(
        &self,
        engagement: &TrackEngagementRequest,
    ) -> Result<EngagementActivity, ApiError> {
        self.send_data(Method::POST, "/api/profile/engagement/track", Some(engagement))
            .await
    }

    /// Activity over the last `days` (30 when `None`).
    pub async fn recent_engagement(
        &self,
        days: Option<u32>,
    ) -> Result<Vec<EngagementActivity>, ApiError> {
        let query = DaysQuery {
            days: days.unwrap_or(DEFAULT_ENGAGEMENT_DAYS),
        };
        self.get_data_with_query("/api/profile/engagement/recent", &query)
            .await
    }

    pub async fn top_engaged_content(
        &self,
        target_type: TargetType,
        days: Option<u32>,
    ) -> Result<Vec<EngagementActivity>, ApiError> {
        let query = DaysQuery {
            days: days.unwrap_or(DEFAULT_ENGAGEMENT_DAYS),
        };
        let path = format!("/api/profile/engagement/top/{target_type}");
        self.get_data_with_query(&path, &query).await
    }
}
