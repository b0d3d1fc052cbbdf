//! Wire types exchanged with the Stanza backend.

pub mod catalog;
pub mod collection;
pub mod page;
pub mod poem;
pub mod profile;
pub mod user;

pub use catalog::*;
pub use collection::*;
pub use page::*;
pub use poem::*;
pub use profile::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Accept identifiers sent either as JSON strings or numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Int(value) => value.to_string(),
        Id::Float(value) => value.to_string(),
    })
}
