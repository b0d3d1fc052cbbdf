use std::sync::Arc;

use tracing::warn;

use super::storage::Storage;
use super::token::TokenPair;
use crate::types::User;

pub(crate) const ACCESS_TOKEN_KEY: &str = "accessToken";
pub(crate) const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub(crate) const USER_KEY: &str = "user";

/// Token pair and cached user persisted over a [`Storage`] medium.
///
/// Every operation is infallible: storage failures are logged and treated
/// as "nothing stored". Clone is cheap and clones share the medium.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use stanza::auth::{MemoryStorage, TokenPair, TokenStore};
///
/// let store = TokenStore::new(Arc::new(MemoryStorage::new()));
/// store.save(&TokenPair::new("access", "refresh"));
/// assert_eq!(store.load(), Some(TokenPair::new("access", "refresh")));
/// ```
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Persist both tokens, replacing any previous pair.
    pub fn save(&self, tokens: &TokenPair) {
        let entries = [
            (ACCESS_TOKEN_KEY, tokens.access_token.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh_token.as_str()),
        ];
        if let Err(error) = self.storage.set_many(&entries) {
            warn!(%error, "Failed to persist tokens");
        }
    }

    /// Stored pair, or `None` unless both halves are present.
    pub fn load(&self) -> Option<TokenPair> {
        let access_token = self.read(ACCESS_TOKEN_KEY)?;
        let refresh_token = self.read(REFRESH_TOKEN_KEY)?;
        Some(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Remove both tokens and the cached user.
    pub fn clear(&self) {
        if let Err(error) = self
            .storage
            .remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY])
        {
            warn!(%error, "Failed to clear stored session");
        }
    }

    pub fn save_user(&self, user: &User) {
        let serialized = match serde_json::to_string(user) {
            Ok(serialized) => serialized,
            Err(error) => {
                warn!(%error, "Failed to serialize user for cache");
                return;
            }
        };
        if let Err(error) = self.storage.set(USER_KEY, &serialized) {
            warn!(%error, "Failed to cache user");
        }
    }

    /// Cached user, or `None` when missing or unreadable.
    pub fn load_user(&self) -> Option<User> {
        let raw = self.read(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn has_tokens(&self) -> bool {
        self.load().is_some()
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(error) => {
                warn!(%error, key, "Failed to read session storage");
                None
            }
        }
    }
}
