//! Browsing types: categories, poets, tags, search.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{string_or_number, Collection, Poem, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub poems_count: u64,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_followed_by_user: Option<bool>,
    #[serde(default)]
    pub popular_poets: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub trending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poet {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    #[serde(default)]
    pub poems_count: u64,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_followed_by_user: Option<bool>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl Poet {
    /// `"1809–1849"`, `"b. 1950"`, or `None` when no years are known.
    pub fn lifespan(&self) -> Option<String> {
        match (self.birth_year, self.death_year) {
            (Some(born), Some(died)) => Some(format!("{born}–{died}")),
            (Some(born), None) => Some(format!("b. {born}")),
            (None, Some(died)) => Some(format!("d. {died}")),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<u64>,
}

/// Restricts a search to one kind of result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchKind {
    Poems,
    Poets,
    Collections,
    Users,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub poems: Vec<Poem>,
    #[serde(default)]
    pub poets: Vec<Poet>,
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub users: Vec<User>,
}
