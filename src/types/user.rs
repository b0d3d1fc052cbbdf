//! Signed-in user record and display helpers.

use serde::{Deserialize, Serialize};

use super::string_or_number;

/// Identity returned by `GET /api/auth/me`.
///
/// The backend has shipped several field spellings over time (`name` vs
/// `fullName`, `profilePicture` vs `profileImageUrl`); both are kept and the
/// helpers below pick whichever is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: String::new(),
            full_name: None,
            profile_picture: None,
            profile_image_url: None,
            bio: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Name to show for this user.
    ///
    /// Falls back to the local part of the email address, and finally to
    /// `"User"`.
    pub fn display_name(&self) -> String {
        if let Some(full_name) = non_empty(self.full_name.as_deref()) {
            return full_name.to_string();
        }
        if let Some(name) = non_empty(Some(self.name.as_str())) {
            return name.to_string();
        }
        if let Some(local) = non_empty(self.email.split('@').next()) {
            return local.replace(['.', '_'], " ");
        }
        "User".to_string()
    }

    pub fn profile_picture(&self) -> Option<&str> {
        non_empty(self.profile_image_url.as_deref())
            .or_else(|| non_empty(self.profile_picture.as_deref()))
    }

    /// Up to two uppercase initials for an avatar fallback.
    pub fn initials(&self) -> String {
        let display_name = self.display_name();
        if display_name != "User" {
            let initials: String = display_name
                .split_whitespace()
                .filter_map(|word| word.chars().next())
                .flat_map(char::to_uppercase)
                .take(2)
                .collect();
            if !initials.is_empty() {
                return initials;
            }
        }
        self.email
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }

    /// Default username suggestion: the email's local part.
    pub fn suggested_username(&self) -> &str {
        self.email.split('@').next().unwrap_or_default()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
