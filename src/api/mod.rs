//! Typed calls for the Stanza backend's resources.
//!
//! Each submodule adds methods to [`ApiClient`](crate::client::ApiClient);
//! all of them unwrap the `{data, message, success}` envelope and share the
//! gateway's auth and error handling.

mod catalog;
mod collections;
mod poems;
mod profile;
mod users;

/// Default look-back window for engagement queries.
pub const DEFAULT_ENGAGEMENT_DAYS: u32 = 30;

/// Escape a caller-supplied id for use as one path segment.
pub(crate) fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_escapes_separators() {
        assert_eq!(segment("42"), "42");
        assert_eq!(segment("a/b?c"), "a%2Fb%3Fc");
    }
}
