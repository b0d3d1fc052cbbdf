//! Stanza: session and API client core for the Stanza poetry service.
//!
//! Keeps an OAuth token pair alive (persisted, refreshed shortly before the
//! access token expires, cleared on any authentication failure) and routes
//! every backend call through one authenticated gateway.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use stanza::prelude::*;
//!
//! # async fn example() -> stanza::error::Result<()> {
//! let config = ClientConfig::from_env();
//! let store = TokenStore::new(Arc::new(FileStorage::new(config.storage_dir.clone())));
//! let session = SessionCoordinator::new(ApiClient::new(config, store)?);
//!
//! if session.initialize_session().await.is_some() {
//!     let poems = session.client().list_poems(&PageQuery::first(20)).await?;
//!     println!("{} poems", poems.total);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod routing;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
