//! Convenience re-exports for common use.

pub use crate::auth::{
    AuthError, FileStorage, MemoryStorage, SessionCoordinator, SessionEvent, SessionPhase,
    TokenPair, TokenStore,
};
pub use crate::client::{ApiClient, ApiError, RequestOptions};
pub use crate::config::ClientConfig;
pub use crate::error::{Result, StanzaError};
pub use crate::types::{Page, PageQuery, Poem, User};
