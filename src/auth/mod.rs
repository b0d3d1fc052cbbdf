//! Token persistence, refresh scheduling and the session lifecycle.

pub mod callback;
pub mod error;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod store;
pub mod token;

pub use callback::{CallbackParams, SignInOutcome};
pub use error::AuthError;
pub use scheduler::{refresh_delay, RefreshScheduler, LEAD_SECONDS};
pub use session::{SessionCoordinator, SessionEvent, SessionPhase, SignOutReason};
pub use storage::{FileStorage, MemoryStorage, NoopStorage, Storage};
pub use store::TokenStore;
pub use token::{decode_expiry, TokenPair};
