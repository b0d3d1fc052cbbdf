//! Extended profile, interests and engagement tracking.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::string_or_number;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InterestType {
    Category,
    Poet,
    Tag,
    Language,
    ContentType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    View,
    Like,
    Unlike,
    Bookmark,
    Unbookmark,
    Share,
    Search,
    FollowPoet,
    UnfollowPoet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Poem,
    Poet,
    Category,
    Tag,
    Collection,
    User,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Private,
    FriendsOnly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

/// Full profile returned by `/api/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default = "default_language")]
    pub preferred_language: String,
    #[serde(default)]
    pub reading_level: ReadingLevel,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub profile_visibility: ProfileVisibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

/// Partial profile update; only present fields are sent.
///
/// # Example
/// ```
/// use stanza::types::{ReadingLevel, UpdateProfileRequest};
///
/// let update = UpdateProfileRequest::builder()
///     .bio("Sonnets mostly".to_string())
///     .reading_level(ReadingLevel::Advanced)
///     .build();
/// assert!(update.full_name.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_level: Option<ReadingLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_visibility: Option<ProfileVisibility>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInterest {
    pub id: i64,
    pub interest_type: InterestType,
    pub interest_id: i64,
    pub interest_name: String,
    /// 0.0 to 1.0
    pub strength: f64,
    #[serde(default)]
    pub explicit_preference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInterestRequest {
    pub interest_type: InterestType,
    pub interest_id: i64,
    pub interest_name: String,
    pub strength: f64,
    pub explicit_preference: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementActivity {
    pub id: i64,
    pub activity_type: ActivityType,
    pub target_type: TargetType,
    pub target_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub interaction_strength: f64,
    pub activity_timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEngagementRequest {
    pub activity_type: ActivityType,
    pub target_type: TargetType,
    pub target_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_backend_spelling() {
        assert_eq!(InterestType::ContentType.to_string(), "CONTENT_TYPE");
        assert_eq!(
            serde_json::to_value(ProfileVisibility::FriendsOnly).unwrap(),
            "FRIENDS_ONLY"
        );
        assert_eq!(
            serde_json::to_value(Gender::PreferNotToSay).unwrap(),
            "prefer_not_to_say"
        );
        assert_eq!("POET".parse::<InterestType>().unwrap(), InterestType::Poet);
    }

    #[test]
    fn update_request_omits_absent_fields() {
        let update = UpdateProfileRequest::builder()
            .full_name("Ada".to_string())
            .build();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"fullName": "Ada"})
        );
    }

    #[test]
    fn extended_user_defaults_missing_preferences() {
        let profile: ExtendedUser =
            serde_json::from_str(r#"{"id":"u1","email":"a@b.c"}"#).unwrap();
        assert_eq!(profile.preferred_language, "en");
        assert_eq!(profile.reading_level, ReadingLevel::Beginner);
        assert!(!profile.onboarding_completed);
    }
}
