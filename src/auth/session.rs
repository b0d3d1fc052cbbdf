//! Session lifecycle: tokens in, user loaded, refresh armed, and every
//! failure converging on a clean sign-out.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::callback::{CallbackParams, SignInOutcome};
use super::error::AuthError;
use super::scheduler::RefreshScheduler;
use super::store::TokenStore;
use super::token::TokenPair;
use crate::client::{ApiClient, ListenerId};
use crate::routing::sign_in_path;
use crate::types::User;

const EVENT_CAPACITY: usize = 32;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    SignedOut,
    /// Tokens are stored and the user is being fetched.
    Initializing,
    SignedIn,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SignOutReason {
    LoggedOut,
    RefreshFailed,
    Unauthorized,
    UserUnavailable,
    Cleared,
}

/// Broadcast to every [`SessionCoordinator::subscribe`] receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new token pair was stored (sign-in or refresh).
    TokensUpdated,
    SignedIn(User),
    SignedOut {
        reason: SignOutReason,
        /// Sign-in page carrying the last location reported through
        /// [`SessionCoordinator::set_return_path`].
        redirect: String,
    },
}

struct SessionState {
    phase: SessionPhase,
    /// Bumped by every sign-out and every externally installed token pair;
    /// in-flight work from an older epoch is discarded.
    epoch: u64,
    cancel: CancellationToken,
    user: Option<User>,
    return_path: Option<String>,
}

struct SessionInner {
    client: ApiClient,
    store: TokenStore,
    scheduler: RefreshScheduler,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
    listener: ListenerId,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.client.remove_unauthorized_listener(self.listener);
    }
}

/// Owns the authenticated session for one [`ApiClient`].
///
/// Clone is cheap; clones drive the same session. The coordinator registers
/// itself as an unauthorized listener on the client, so any 401 from a
/// regular request signs the session out.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use stanza::auth::{FileStorage, SessionCoordinator, TokenStore};
/// use stanza::client::ApiClient;
/// use stanza::config::ClientConfig;
///
/// # async fn example() -> stanza::error::Result<()> {
/// let config = ClientConfig::from_env();
/// let store = TokenStore::new(Arc::new(FileStorage::new(config.storage_dir.clone())));
/// let session = SessionCoordinator::new(ApiClient::new(config, store)?);
///
/// if let Some(user) = session.initialize_session().await {
///     println!("signed in as {}", user.display_name());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("phase", &self.phase())
            .field("scheduler", &self.inner.scheduler)
            .finish_non_exhaustive()
    }
}

impl SessionCoordinator {
    pub fn new(client: ApiClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let inner = Arc::new_cyclic(|weak: &Weak<SessionInner>| {
            let weak = weak.clone();
            let listener = client.add_session_listener(move || {
                if let Some(inner) = weak.upgrade() {
                    SessionCoordinator { inner }.end(None, SignOutReason::Unauthorized);
                }
            });
            SessionInner {
                store: client.token_store().clone(),
                client,
                scheduler: RefreshScheduler::new(),
                state: Mutex::new(SessionState {
                    phase: SessionPhase::SignedOut,
                    epoch: 0,
                    cancel: CancellationToken::new(),
                    user: None,
                    return_path: None,
                }),
                events,
                listener,
            }
        });
        Self { inner }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn phase(&self) -> SessionPhase {
        self.state().phase
    }

    /// Whether a token pair is stored. Says nothing about its validity.
    pub fn is_authenticated(&self) -> bool {
        self.inner.store.has_tokens()
    }

    /// The loaded user, falling back to the cached copy from a previous run.
    pub fn current_user(&self) -> Option<User> {
        let loaded = self.state().user.clone();
        loaded.or_else(|| self.inner.store.load_user())
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.inner.store.load()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Whether a refresh is waiting to fire.
    pub fn refresh_scheduled(&self) -> bool {
        self.inner.scheduler.is_armed()
    }

    /// Record the page the user is on, so a forced sign-out can send them
    /// back there after signing in again.
    pub fn set_return_path(&self, path: Option<&str>) {
        self.state().return_path = path.map(str::to_string);
    }

    /// OAuth entry point; see [`ApiClient::login_url`].
    pub fn login_url(&self, redirect_to: Option<&str>) -> String {
        self.inner.client.login_url(redirect_to)
    }

    /// Store `tokens` and arm the refresh timer for the new access token.
    ///
    /// The store is written before this returns, so the next request
    /// carries the new token. Refreshes and user fetches still running for
    /// the previous pair are cancelled and their results discarded.
    pub fn set_tokens(&self, tokens: TokenPair) {
        let mut state = self.state();
        Self::next_epoch(&mut state);
        self.install(&mut state, &tokens);
        drop(state);
        self.emit(SessionEvent::TokensUpdated);
    }

    /// Restore the session from storage.
    ///
    /// Without stored tokens this makes no network call and returns `None`.
    /// If the user cannot be fetched the session is cleared.
    pub async fn initialize_session(&self) -> Option<User> {
        let tokens = self.inner.store.load()?;
        let (epoch, cancel) = {
            let mut state = self.state();
            state.phase = SessionPhase::Initializing;
            self.arm(&tokens.access_token);
            (state.epoch, state.cancel.clone())
        };
        debug!(epoch, "Initializing session");

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            fetched = self.inner.client.me() => fetched,
        };

        match fetched {
            Ok(user) => {
                {
                    let mut state = self.state();
                    if state.epoch != epoch {
                        return None;
                    }
                    self.inner.store.save_user(&user);
                    state.user = Some(user.clone());
                    state.phase = SessionPhase::SignedIn;
                }
                info!(user_id = %user.id, "Session initialized");
                self.emit(SessionEvent::SignedIn(user.clone()));
                Some(user)
            }
            Err(error) => {
                warn!(%error, "Failed to load user; clearing session");
                self.end(Some(epoch), SignOutReason::UserUnavailable);
                None
            }
        }
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Any failure clears the session. If the session is cleared while the
    /// exchange is in flight the result is discarded and
    /// [`AuthError::SessionEnded`] is returned.
    pub async fn refresh_tokens(&self) -> Result<(), AuthError> {
        let (epoch, cancel) = {
            let state = self.state();
            (state.epoch, state.cancel.clone())
        };
        let Some(refresh_token) = self.inner.store.refresh_token() else {
            self.end(Some(epoch), SignOutReason::RefreshFailed);
            return Err(AuthError::NotLoggedIn);
        };

        let refreshed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AuthError::SessionEnded),
            refreshed = self.inner.client.refresh(&refresh_token) => refreshed,
        };

        match refreshed {
            Ok(tokens) => {
                {
                    let mut state = self.state();
                    if state.epoch != epoch {
                        debug!("Discarding refresh result from an ended session");
                        return Err(AuthError::SessionEnded);
                    }
                    self.install(&mut state, &tokens);
                }
                debug!("Tokens refreshed");
                self.emit(SessionEvent::TokensUpdated);
                Ok(())
            }
            Err(error) => {
                if self.epoch() != epoch {
                    return Err(AuthError::SessionEnded);
                }
                warn!(%error, "Token refresh failed; clearing session");
                self.end(Some(epoch), SignOutReason::RefreshFailed);
                Err(error.into())
            }
        }
    }

    /// Best-effort server-side logout, then clear the local session.
    pub async fn logout(&self) {
        if self.inner.store.access_token().is_some() {
            if let Err(error) = self.inner.client.logout().await {
                warn!(%error, "Logout request failed; clearing local session anyway");
            }
        }
        self.end(None, SignOutReason::LoggedOut);
    }

    /// Drop the session: cancel the refresh timer and in-flight session
    /// calls, and wipe stored tokens. Idempotent.
    pub fn clear(&self) {
        self.end(None, SignOutReason::Cleared);
    }

    /// Finish an OAuth redirect: store the tokens it carries, load the user
    /// and work out where to go next.
    pub async fn complete_sign_in(&self, callback_url: &str) -> Result<SignInOutcome, AuthError> {
        let (tokens, redirect_to) = CallbackParams::parse(callback_url)?.into_tokens()?;
        self.set_tokens(tokens);
        let user = self
            .initialize_session()
            .await
            .ok_or(AuthError::UserUnavailable)?;
        Ok(SignInOutcome::new(user, redirect_to.as_deref()))
    }

    /// Session generation; changes on every sign-out and [`Self::set_tokens`].
    pub fn epoch(&self) -> u64 {
        self.state().epoch
    }

    fn install(&self, state: &mut SessionState, tokens: &TokenPair) {
        self.inner.store.save(tokens);
        self.arm(&tokens.access_token);
        if state.phase == SessionPhase::SignedOut {
            state.phase = SessionPhase::SignedIn;
        }
    }

    fn arm(&self, access_token: &str) {
        let weak = Arc::downgrade(&self.inner);
        let armed = self.inner.scheduler.schedule_refresh(access_token, move || async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let session = SessionCoordinator { inner };
            if let Err(error) = session.refresh_tokens().await {
                debug!(%error, "Scheduled refresh did not complete");
            }
        });
        if !armed {
            debug!("Access token has no usable expiry; automatic refresh disabled");
        }
    }

    /// Sign out, optionally only if the session is still at `expected`
    /// epoch. Returns whether anything changed.
    fn end(&self, expected: Option<u64>, reason: SignOutReason) -> bool {
        let redirect = {
            let mut state = self.state();
            if expected.is_some_and(|epoch| epoch != state.epoch) {
                return false;
            }
            let had_tokens = self.inner.store.has_tokens();
            self.inner.scheduler.cancel();
            self.inner.store.clear();
            Self::next_epoch(&mut state);
            state.user = None;
            let previous = std::mem::replace(&mut state.phase, SessionPhase::SignedOut);
            if previous == SessionPhase::SignedOut && !had_tokens {
                return false;
            }
            sign_in_path(state.return_path.as_deref())
        };
        info!(%reason, "Session ended");
        self.emit(SessionEvent::SignedOut { reason, redirect });
        true
    }

    fn next_epoch(state: &mut SessionState) {
        state.cancel.cancel();
        state.cancel = CancellationToken::new();
        state.epoch += 1;
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
