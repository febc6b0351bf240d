//! The session client and its request primitive.
//!
//! Every resource helper funnels through
//! [`SessionClient::authenticated_request`], which attaches the JSON content
//! type and, when a token is held, the bearer token; performs the request;
//! and turns the reply into a typed value or a [`ClientError`].

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::auth::User;
use crate::cart::CartSnapshot;
use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::navigation::{Navigator, RecordingNavigator};
use crate::orders::Order;
use crate::products::Product;
use crate::session::{FileStore, MemoryStore, Session, SessionStore};
use crate::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use crate::ui::{Presenter, TracingPresenter};

/// Generic `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// Request options
// =============================================================================

/// Method, body, and extra headers for one request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method (default `GET`).
    pub method: Method,
    /// JSON body.
    pub body: Option<Value>,
    /// Headers merged over the defaults.
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    /// A `GET` with no body.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// A request with the given method and no body.
    #[must_use]
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// A request with the given method and JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Schema` if `body` cannot be represented as JSON.
    pub fn json(method: Method, body: &impl Serialize) -> Result<Self, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Schema {
            path: "<request body>".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            method,
            body: Some(body),
            headers: Vec::new(),
        })
    }

    /// Add a header; a later header with the same name wins.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Set `name` to `value`, replacing any existing header of that name.
fn merge_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    if let Some(existing) = headers
        .iter_mut()
        .find(|(key, _)| key.eq_ignore_ascii_case(&name))
    {
        *existing = (name, value);
    } else {
        headers.push((name, value));
    }
}

// =============================================================================
// Client
// =============================================================================

/// Last-fetched collections.
#[derive(Debug, Default)]
pub(crate) struct Cache {
    pub(crate) cart: CartSnapshot,
    pub(crate) products: Vec<Product>,
    pub(crate) orders: Vec<Order>,
}

pub(crate) struct Inner<T> {
    pub(crate) config: ClientConfig,
    pub(crate) transport: T,
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) presenter: Arc<dyn Presenter>,
    pub(crate) session: RwLock<Session>,
    pub(crate) cache: RwLock<Cache>,
}

/// Client for the Orders Management API.
///
/// Owns the [`Session`] and the last-fetched cart, product, and order
/// collections. Cloning is cheap and clones share state.
///
/// # Example
///
/// ```no_run
/// # async fn demo() -> Result<(), shopfront_client::ClientError> {
/// use secrecy::SecretString;
/// use shopfront_client::{ClientConfig, SessionClient};
///
/// let config = ClientConfig::new("http://localhost:5000/api").expect("valid url");
/// let client = SessionClient::from_config(config)?;
/// client.login("a@b.com", &SecretString::from("pw")).await?;
/// let cart = client.get_cart().await?;
/// println!("{} items", cart.count);
/// # Ok(())
/// # }
/// ```
pub struct SessionClient<T = ReqwestTransport> {
    pub(crate) inner: Arc<Inner<T>>,
}

impl<T> Clone for SessionClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for SessionClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("api_base_url", &self.inner.config.api_base_url)
            .finish_non_exhaustive()
    }
}

impl SessionClient<ReqwestTransport> {
    /// Create a client that talks HTTP via `reqwest` and persists the session
    /// to `config.session_file`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if the HTTP client cannot be built,
    /// or `ClientError::Storage` if the session file cannot be read.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        let store = Arc::new(FileStore::new(config.session_file.clone()));
        SessionClientBuilder::new(config, transport).store(store).build()
    }
}

impl<T: Transport> SessionClient<T> {
    /// Start building a client around `transport`.
    #[must_use]
    pub fn builder(config: ClientConfig, transport: T) -> SessionClientBuilder<T> {
        SessionClientBuilder::new(config, transport)
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The presenter feedback is sent to.
    #[must_use]
    pub fn presenter(&self) -> &dyn Presenter {
        self.inner.presenter.as_ref()
    }

    /// A snapshot of the current session.
    pub async fn session(&self) -> Session {
        self.inner.session.read().await.clone()
    }

    /// The logged-in user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.inner.session.read().await.user().cloned()
    }

    /// Whether a token and user are held.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.session.read().await.is_authenticated()
    }

    /// Whether the logged-in user is an administrator.
    pub async fn is_admin(&self) -> bool {
        self.inner.session.read().await.is_admin()
    }

    /// The cart as of the last fetch.
    pub async fn cart(&self) -> CartSnapshot {
        self.inner.cache.read().await.cart.clone()
    }

    /// Products from the last `get_products` call.
    pub async fn products(&self) -> Vec<Product> {
        self.inner.cache.read().await.products.clone()
    }

    /// Orders from the last `get_orders` call.
    pub async fn orders(&self) -> Vec<Order> {
        self.inner.cache.read().await.orders.clone()
    }

    /// Run `operation` with the loading indicator shown.
    pub async fn with_loading<F: Future>(&self, operation: F) -> F::Output {
        self.inner.presenter.show_loading();
        let output = operation.await;
        self.inner.presenter.hide_loading();
        output
    }

    // =========================================================================
    // Request primitive
    // =========================================================================

    /// Perform a request against `path` and decode the reply as `R`.
    ///
    /// # Errors
    ///
    /// - `ClientError::Transport` if the request fails or the body is not JSON
    /// - `ClientError::Api` if the status is not ok
    /// - `ClientError::Schema` if the body does not decode as `R`
    pub async fn authenticated_request<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let body = self.authenticated_request_value(path, options).await?;
        serde_json::from_value(body).map_err(|e| {
            warn!(path, error = %e, "Response did not match expected schema");
            ClientError::Schema {
                path: path.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Perform a request against `path` and return the raw JSON reply.
    ///
    /// # Errors
    ///
    /// - `ClientError::Transport` if the request fails or the body is not JSON
    /// - `ClientError::Api` if the status is not ok
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn authenticated_request_value(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, ClientError> {
        let request = self.build_request(path, options).await;
        debug!(url = %request.url, "Sending request");

        let response = self
            .inner
            .transport
            .send(request)
            .await
            .inspect_err(|e| warn!(error = %e, "Request failed before a response arrived"))?;

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            warn!(status = response.status, error = %e, "Response body is not JSON");
            TransportError::InvalidJson(e.to_string())
        })?;

        if !response.is_ok() {
            let err = ClientError::from_error_body(response.status, &body);
            warn!(status = response.status, error = %err, "API returned an error");
            return Err(err);
        }

        debug!(status = response.status, "Request succeeded");
        Ok(body)
    }

    async fn build_request(&self, path: &str, options: RequestOptions) -> HttpRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        for (name, value) in options.headers {
            // Authorization is derived from the session only.
            if name.eq_ignore_ascii_case("authorization") {
                continue;
            }
            merge_header(&mut headers, name, value);
        }

        if let Some(token) = self.inner.session.read().await.bearer_token() {
            merge_header(
                &mut headers,
                "Authorization".to_string(),
                format!("Bearer {token}"),
            );
        }

        HttpRequest {
            method: options.method,
            url: self.inner.config.endpoint(path),
            headers,
            body: options.body.map(|body| body.to_string()),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles a [`SessionClient`].
///
/// Defaults: an in-memory store, a navigator parked on the landing page, and
/// a presenter that logs through `tracing`.
pub struct SessionClientBuilder<T> {
    config: ClientConfig,
    transport: T,
    store: Option<Arc<dyn SessionStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    presenter: Option<Arc<dyn Presenter>>,
}

impl<T: Transport> SessionClientBuilder<T> {
    /// Start from a configuration and transport.
    #[must_use]
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            store: None,
            navigator: None,
            presenter: None,
        }
    }

    /// Persist the session in `store`.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Route redirects through `navigator`.
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Send user-visible feedback to `presenter`.
    #[must_use]
    pub fn presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Hydrate the session from the store and build the client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the store cannot be read.
    pub fn build(self) -> Result<SessionClient<T>, ClientError> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let navigator = self.navigator.unwrap_or_else(|| {
            Arc::new(RecordingNavigator::new(self.config.landing_page.clone()))
        });
        let presenter = self
            .presenter
            .unwrap_or_else(|| Arc::new(TracingPresenter));

        let session = Session::hydrate(store.as_ref())?;
        debug!(
            authenticated = session.is_authenticated(),
            "Session hydrated"
        );

        Ok(SessionClient {
            inner: Arc::new(Inner {
                config: self.config,
                transport: self.transport,
                store,
                navigator,
                presenter,
                session: RwLock::new(session),
                cache: RwLock::new(Cache::default()),
            }),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::FALLBACK_ERROR_MESSAGE;
    use crate::session::{TOKEN_KEY, USER_KEY};
    use crate::transport::mock::MockTransport;

    pub(crate) struct Harness {
        pub(crate) client: SessionClient<Arc<MockTransport>>,
        pub(crate) transport: Arc<MockTransport>,
        pub(crate) store: Arc<MemoryStore>,
        pub(crate) navigator: Arc<RecordingNavigator>,
        pub(crate) presenter: Arc<crate::ui::RecordingPresenter>,
    }

    pub(crate) fn harness_with_store(store: Arc<MemoryStore>, page: &str) -> Harness {
        let transport = Arc::new(MockTransport::new());
        let navigator = Arc::new(RecordingNavigator::new(page));
        let presenter = Arc::new(crate::ui::RecordingPresenter::default());
        let config = ClientConfig::new("http://api.test/api").unwrap();
        let client = SessionClient::builder(config, Arc::clone(&transport))
            .store(store.clone())
            .navigator(navigator.clone())
            .presenter(presenter.clone())
            .build()
            .unwrap();
        Harness {
            client,
            transport,
            store,
            navigator,
            presenter,
        }
    }

    pub(crate) fn harness() -> Harness {
        harness_with_store(Arc::new(MemoryStore::new()), "index.html")
    }

    pub(crate) fn logged_in_harness(role: &str) -> Harness {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "T").unwrap();
        store
            .set(
                USER_KEY,
                &json!({"id": 1, "email": "a@b.com", "role": role}).to_string(),
            )
            .unwrap();
        harness_with_store(store, "index.html")
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_authorization_header() {
        let h = harness();
        h.transport.push_json(200, &json!({"ok": true}));

        let _: Value = h
            .client
            .authenticated_request("/products", RequestOptions::get())
            .await
            .unwrap();

        let request = h.transport.last_request().unwrap();
        assert_eq!(request.url, "http://api.test/api/products");
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_token_attaches_bearer_header() {
        let h = logged_in_harness("user");
        h.transport.push_json(200, &json!({}));

        let _: Value = h
            .client
            .authenticated_request("/cart", RequestOptions::get())
            .await
            .unwrap();

        let request = h.transport.last_request().unwrap();
        assert_eq!(request.header("Authorization"), Some("Bearer T"));
    }

    #[tokio::test]
    async fn test_caller_headers_merge_over_defaults() {
        let h = harness();
        h.transport.push_json(200, &json!({}));

        let options = RequestOptions::get()
            .header("content-type", "application/vnd.api+json")
            .header("X-Trace", "abc")
            .header("Authorization", "Bearer forged");
        let _: Value = h.client.authenticated_request("/products", options).await.unwrap();

        let request = h.transport.last_request().unwrap();
        assert_eq!(request.header("Content-Type"), Some("application/vnd.api+json"));
        assert_eq!(request.header("X-Trace"), Some("abc"));
        assert_eq!(request.header("Authorization"), None);
        assert_eq!(
            request
                .headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_json_body_is_sent() {
        let h = harness();
        h.transport.push_json(201, &json!({"message": "created"}));

        let options = RequestOptions::json(Method::POST, &json!({"quantity": 2})).unwrap();
        let reply: MessageResponse = h.client.authenticated_request("/cart/add", options).await.unwrap();

        assert_eq!(reply.message, "created");
        let request = h.transport.last_request().unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.json_body(), Some(json!({"quantity": 2})));
    }

    #[tokio::test]
    async fn test_error_status_uses_error_field() {
        let h = harness();
        h.transport
            .push_json(404, &json!({"error": "Product not found", "message": "detail"}));

        let err = h
            .client
            .authenticated_request::<Value>("/products/99", RequestOptions::get())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 404, .. }));
        assert_eq!(err.to_string(), "Product not found");
    }

    #[tokio::test]
    async fn test_error_status_without_error_field_uses_fallback() {
        let h = harness();
        h.transport.push_json(500, &json!({}));

        let err = h
            .client
            .authenticated_request::<Value>("/orders", RequestOptions::get())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), FALLBACK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_non_json_body_is_transport_error() {
        let h = harness();
        h.transport.push_raw(502, "<html>Bad Gateway</html>");
        h.transport.push_raw(200, "");

        for _ in 0..2 {
            let err = h
                .client
                .authenticated_request::<Value>("/orders", RequestOptions::get())
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ClientError::Transport(TransportError::InvalidJson(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let h = harness();
        h.transport
            .push_error(TransportError::Network("connection refused".to_string()));

        let err = h
            .client
            .authenticated_request::<Value>("/orders", RequestOptions::get())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Network error: connection refused");
        assert_eq!(h.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_schema_mismatch() {
        let h = harness();
        h.transport.push_json(200, &json!({"message": 17}));

        let err = h
            .client
            .authenticated_request::<MessageResponse>("/cart/clear", RequestOptions::get())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Schema { ref path, .. } if path == "/cart/clear"));
    }

    #[tokio::test]
    async fn test_with_loading_brackets_operation() {
        use crate::ui::PresenterEvent;

        let h = harness();
        let value = h.client.with_loading(async { 7 }).await;

        assert_eq!(value, 7);
        assert_eq!(
            h.presenter.events(),
            vec![PresenterEvent::Loading(true), PresenterEvent::Loading(false)]
        );
    }

    #[tokio::test]
    async fn test_builder_hydrates_from_store() {
        let h = logged_in_harness("admin");
        let session = h.client.session().await;
        assert_eq!(session.bearer_token(), Some("T"));
        assert!(session.is_admin());
        assert!(h.client.is_authenticated().await);
    }
}
