//! Authenticated HTTP gateway to the Stanza backend.
//!
//! Every feature area reaches the backend through [`ApiClient::request`],
//! which attaches the stored bearer token, maps failures onto [`ApiError`],
//! and notifies unauthorized listeners when the server answers 401.
//! Nothing here retries; callers decide.

pub mod error;
pub mod unauthorized;

pub use error::ApiError;
pub use unauthorized::{ListenerId, UnauthorizedCallback};

use std::sync::Arc;

use reqwest::{header, Method, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{TokenPair, TokenStore};
use crate::config::ClientConfig;
use crate::types::{ApiResponse, User};
use unauthorized::UnauthorizedListeners;

const REFRESH_PATH: &str = "/api/auth/refresh";
const ME_PATH: &str = "/api/auth/me";
const LOGOUT_PATH: &str = "/api/auth/logout";
const CALLBACK_PATH: &str = "/auth/callback";

/// Per-call options for [`ApiClient::request`].
#[derive(Debug, Clone)]
pub struct RequestOptions {
    query: Option<serde_json::Value>,
    body: Option<serde_json::Value>,
    authenticated: bool,
    notify_unauthorized: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            query: None,
            body: None,
            authenticated: true,
            notify_unauthorized: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `query` into the query string. Absent (`None`) fields are
    /// the caller's job to skip.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self, ApiError> {
        self.query = Some(serde_json::to_value(query)?);
        Ok(self)
    }

    /// Send `body` as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Do not attach the stored access token.
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Report a 401 as [`ApiError::Unauthorized`] without notifying listeners.
    pub fn quiet_unauthorized(mut self) -> Self {
        self.notify_unauthorized = false;
        self
    }
}

/// HTTP client for the Stanza backend.
///
/// Clone is cheap: clones share the connection pool, the token store and
/// the listener registry.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use stanza::auth::{MemoryStorage, TokenStore};
/// use stanza::client::ApiClient;
/// use stanza::config::ClientConfig;
///
/// # async fn example() -> Result<(), stanza::client::ApiError> {
/// let store = TokenStore::new(Arc::new(MemoryStorage::new()));
/// let client = ApiClient::new(ClientConfig::default(), store)?;
/// let tags: serde_json::Value = client.get("/api/tags").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    store: TokenStore,
    listeners: Arc<UnauthorizedListeners>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.api_base_url)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: TokenStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_http_client(http, config, store))
    }

    /// Use a preconfigured `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, config: ClientConfig, store: TokenStore) -> Self {
        Self {
            http,
            config: Arc::new(config),
            store,
            listeners: Arc::new(UnauthorizedListeners::default()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Register an additional listener for 401 responses.
    pub fn add_unauthorized_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener))
    }

    pub(crate) fn add_session_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add_pinned(Arc::new(listener))
    }

    pub fn remove_unauthorized_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Make `handler` the only application 401 listener, dropping any
    /// registered before. A [`SessionCoordinator`](crate::auth::SessionCoordinator)
    /// built on this client keeps its own listener.
    pub fn set_unauthorized_handler<F>(&self, handler: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.replace_all(Arc::new(handler))
    }

    /// Perform a request against `path` (relative to the API base URL) and
    /// decode the JSON response.
    ///
    /// An empty response body decodes as JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let url = Url::parse(&url).map_err(|err| ApiError::InvalidUrl(format!("{url}: {err}")))?;
        debug!(method = %method, url = %url, "API request");

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if options.authenticated {
            if let Some(token) = self.store.access_token() {
                builder = builder.bearer_auth(token);
            }
        }
        if let Some(query) = &options.query {
            builder = builder.query(query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| ApiError::Network {
            message: err.to_string(),
        })?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(method = %method, url = %url, "API request unauthorized");
            if options.notify_unauthorized {
                self.listeners.notify();
            }
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = ApiError::from_response(status, &body);
            debug!(method = %method, url = %url, %error, "API request failed");
            return Err(error);
        }

        let bytes = response.bytes().await.map_err(|err| ApiError::Network {
            message: err.to_string(),
        })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, RequestOptions::new()).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.request(Method::GET, path, RequestOptions::new().query(query)?)
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, RequestOptions::new().json(body)?)
            .await
    }

    /// DELETE `path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .request(Method::DELETE, path, RequestOptions::new())
            .await?;
        Ok(())
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// Never sends the (possibly expired) access token, and a 401 here does
    /// not notify listeners: the session coordinator owns that failure.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let options = RequestOptions::new()
            .anonymous()
            .quiet_unauthorized()
            .json(&RefreshRequest { refresh_token })?;
        let envelope: ApiResponse<TokenPair> =
            self.request(Method::POST, REFRESH_PATH, options).await?;
        Ok(envelope.data)
    }

    /// The signed-in user.
    pub async fn me(&self) -> Result<User, ApiError> {
        let envelope: ApiResponse<User> = self.get(ME_PATH).await?;
        Ok(envelope.data)
    }

    /// Invalidate the session server-side. A 401 means the server already
    /// considers the session gone, so listeners are not notified.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .request(
                Method::POST,
                LOGOUT_PATH,
                RequestOptions::new().quiet_unauthorized(),
            )
            .await?;
        Ok(())
    }

    /// OAuth entry point. After sign-in the provider redirects to the
    /// frontend's `/auth/callback`, carrying `redirect_to` along when given.
    pub fn login_url(&self, redirect_to: Option<&str>) -> String {
        let mut callback = format!("{}{}", self.config.frontend_url, CALLBACK_PATH);
        if let Some(target) = redirect_to.filter(|t| !t.is_empty()) {
            callback.push_str("?redirectTo=");
            callback.push_str(&urlencoding::encode(target));
        }
        format!(
            "{}/oauth2/authorization/{}?redirect_uri={}",
            self.config.api_base_url,
            self.config.oauth_provider,
            urlencoding::encode(&callback)
        )
    }

    /// Unwrap the `{data, message, success}` envelope of a GET.
    pub(crate) async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let envelope: ApiResponse<T> = self.get(path).await?;
        Ok(envelope.data)
    }

    pub(crate) async fn get_data_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let envelope: ApiResponse<T> = self.get_with_query(path, query).await?;
        Ok(envelope.data)
    }

    pub(crate) async fn send_data<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut options = RequestOptions::new();
        if let Some(body) = body {
            options = options.json(body)?;
        }
        let envelope: ApiResponse<T> = self.request(method, path, options).await?;
        Ok(envelope.data)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.config.api_base_url, path)
        } else {
            format!("{}/{}", self.config.api_base_url, path)
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}
