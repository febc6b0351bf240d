//! Authentication and session lifecycle.
//!
//! Login stores the returned bearer token and profile in the [`Session`] and
//! persists both; logout forgets them. [`SessionClient::check_auth`] is the
//! client-side page gate: it never talks to the server.

use chrono::NaiveDateTime;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shopfront_core::{Email, UserId, UserRole};
use tracing::{info, instrument, warn};

use crate::client::{RequestOptions, SessionClient};
use crate::error::ClientError;
use crate::navigation::page_name;
use crate::session::{Session, is_blank};
use crate::transport::{Method, Transport};

// =============================================================================
// Domain Types
// =============================================================================

/// A user profile as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<Email>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

const fn default_true() -> bool {
    true
}

impl User {
    /// Whether this user has the `admin` role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// "First Last", or the email when no name is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email
                .as_ref()
                .map_or_else(|| format!("user #{}", self.id), ToString::to_string)
        } else {
            name.to_string()
        }
    }
}

/// Result of a successful login.
///
/// The token itself stays inside the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
}

#[derive(Deserialize)]
struct LoginReply {
    access_token: String,
    user: User,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Details for a new account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
struct RegistrationBody<'a> {
    email: &'a str,
    password: &'a str,
    first_name: &'a str,
    last_name: &'a str,
}

/// `{message, user}` reply carrying a profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub message: String,
    pub user: User,
}

/// Fields to change on the caller's own profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<SecretString>,
}

#[derive(Serialize)]
struct ProfileUpdateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

#[derive(Deserialize)]
struct ProfileEnvelope {
    user: User,
}

/// Outcome of [`SessionClient::check_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGate {
    /// The current page may be shown.
    Allowed,
    /// The visitor was sent to the login page.
    Redirected,
}

// =============================================================================
// Client Methods
// =============================================================================

impl<T: Transport> SessionClient<T> {
    /// Log in and persist the returned token and profile.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails, the reply carries a blank
    /// token, or the session cannot be persisted. The session is left
    /// unchanged on error.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ClientError> {
        let options = RequestOptions::json(
            Method::POST,
            &Credentials {
                email,
                password: password.expose_secret(),
            },
        )?;
        let reply: LoginReply = self.authenticated_request("/auth/login", options).await?;
        if is_blank(&reply.access_token) {
            warn!("Login reply carried a blank access token");
            return Err(ClientError::Schema {
                path: "/auth/login".to_string(),
                message: "access_token is blank".to_string(),
            });
        }

        let session = Session::authenticated(SecretString::from(reply.access_token), reply.user.clone());
        session.persist(self.inner.store.as_ref())?;
        *self.inner.session.write().await = session;

        info!(user_id = %reply.user.id, admin = reply.user.is_admin(), "Logged in");

        Ok(LoginResponse {
            message: reply.message,
            user: reply.user,
        })
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<UserResponse, ClientError> {
        let options = RequestOptions::json(
            Method::POST,
            &RegistrationBody {
                email: &registration.email,
                password: registration.password.expose_secret(),
                first_name: &registration.first_name,
                last_name: &registration.last_name,
            },
        )?;
        self.authenticated_request("/auth/register", options).await
    }

    /// Fetch the caller's profile from the server.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ClientError> {
        let envelope: ProfileEnvelope = self
            .authenticated_request("/auth/profile", RequestOptions::get())
            .await?;
        Ok(envelope.user)
    }

    /// Update the caller's profile and persist the returned copy.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the profile cannot be
    /// persisted.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserResponse, ClientError> {
        let options = RequestOptions::json(
            Method::PUT,
            &ProfileUpdateBody {
                first_name: update.first_name.as_deref(),
                last_name: update.last_name.as_deref(),
                password: update.password.as_ref().map(|p| p.expose_secret()),
            },
        )?;
        let reply: UserResponse = self.authenticated_request("/auth/profile", options).await?;

        let mut session = self.inner.session.write().await;
        let mut updated = session.clone();
        updated.set_user(reply.user.clone());
        updated.persist(self.inner.store.as_ref())?;
        *session = updated;

        Ok(reply)
    }

    /// Forget the session and return to the landing page.
    ///
    /// Memory, caches, and the badge are always reset and the redirect always
    /// happens. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the persisted entries could not be
    /// removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ClientError> {
        *self.inner.session.write().await = Session::anonymous();
        let cleared = Session::clear_store(self.inner.store.as_ref());

        *self.inner.cache.write().await = crate::client::Cache::default();
        self.inner.presenter.update_cart_badge(0);
        self.inner.navigator.redirect(&self.inner.config.landing_page);

        info!("Logged out");
        cleared.map_err(ClientError::from)
    }

    /// Send anonymous visitors on protected pages to the login page.
    ///
    /// Public pages and authenticated sessions pass through untouched.
    pub async fn check_auth(&self) -> AuthGate {
        if self.inner.session.read().await.is_authenticated() {
            return AuthGate::Allowed;
        }

        let current = self.inner.navigator.current_page();
        if self.inner.config.is_public_page(page_name(&current)) {
            return AuthGate::Allowed;
        }

        info!(page = %current, "Not logged in; redirecting to login");
        self.inner.navigator.redirect(&self.inner.config.login_page);
        AuthGate::Redirected
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::client::tests::{harness, harness_with_store, logged_in_harness};
    use crate::session::{MemoryStore, SessionStore, TOKEN_KEY, USER_KEY};
    use crate::ui::PresenterEvent;

    fn login_reply() -> serde_json::Value {
        json!({
            "message": "Login successful",
            "access_token": "T",
            "user": {
                "id": 1,
                "email": "admin@orders.com",
                "first_name": "Admin",
                "last_name": "User",
                "role": "admin",
                "is_active": true,
                "created_at": "2025-01-05T14:30:00.123456"
            }
        })
    }

    #[test]
    fn test_user_tolerates_sparse_and_extra_fields() {
        let user: User = serde_json::from_value(json!({"id": 4, "role": "user", "phone": "555"})).unwrap();
        assert_eq!(user.id, UserId::new(4));
        assert!(user.is_active);
        assert!(user.email.is_none());
        assert_eq!(user.display_name(), "user #4");
    }

    #[tokio::test]
    async fn test_admin_login_stores_token_and_role() {
        let h = harness();
        h.transport.push_json(200, &login_reply());
        h.transport.push_json(200, &json!({"cart_items": [], "total": 0, "count": 0}));

        let reply = h.client.login("admin@orders.com", &SecretString::from("pw")).await.unwrap();
        assert_eq!(reply.user.display_name(), "Admin User");
        assert!(h.client.is_admin().await);
        assert_eq!(h.store.get(TOKEN_KEY).unwrap().as_deref(), Some("T"));

        let login = h.transport.last_request().unwrap();
        assert_eq!(login.url, "http://api.test/api/auth/login");
        assert_eq!(login.json_body(), Some(json!({"email": "admin@orders.com", "password": "pw"})));
        assert_eq!(login.header("Authorization"), None);

        h.client.get_cart().await.unwrap();
        let next = h.transport.last_request().unwrap();
        assert_eq!(next.header("Authorization"), Some("Bearer T"));
    }

    #[tokio::test]
    async fn test_blank_token_login_is_rejected() {
        let h = harness();
        let mut reply = login_reply();
        reply["access_token"] = json!("   ");
        h.transport.push_json(200, &reply);

        let err = h
            .client
            .login("admin@orders.com", &SecretString::from("pw"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Schema { ref path, .. } if path == "/auth/login"));
        assert!(!h.client.is_authenticated().await);
        assert!(h.store.is_empty());

        h.transport.push_json(200, &json!({"orders": [], "count": 0}));
        h.client.get_orders().await.unwrap();
        assert_eq!(h.transport.last_request().unwrap().header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_unchanged() {
        let h = harness();
        h.transport.push_json(401, &json!({"error": "Invalid email or password"}));

        let err = h.client.login("a@b.com", &SecretString::from("nope")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(err.is_unauthorized());
        assert_eq!(h.client.session().await, Session::anonymous());
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_login_then_logout_restores_session() {
        let h = harness();
        let before = h.client.session().await;
        h.transport.push_json(200, &login_reply());

        h.client.login("admin@orders.com", &SecretString::from("pw")).await.unwrap();
        h.client.logout().await.unwrap();

        assert_eq!(h.client.session().await, before);
        assert!(!h.store.contains(TOKEN_KEY));
        assert!(!h.store.contains(USER_KEY));
        assert_eq!(h.navigator.redirects(), vec!["index.html"]);
        assert_eq!(h.presenter.badge(), Some(0));
        assert_eq!(h.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_login_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        let first = harness_with_store(Arc::clone(&store), "login.html");
        first.transport.push_json(200, &login_reply());
        first.client.login("admin@orders.com", &SecretString::from("pw")).await.unwrap();

        let second = harness_with_store(store, "admin.html");
        assert_eq!(second.client.session().await, first.client.session().await);
        assert_eq!(second.client.check_auth().await, AuthGate::Allowed);
    }

    #[tokio::test]
    async fn test_check_auth_redirects_once_without_requests() {
        let h = harness_with_store(Arc::new(MemoryStore::new()), "/shop/cart.html?x=1");

        assert_eq!(h.client.check_auth().await, AuthGate::Redirected);
        assert_eq!(h.navigator.redirects(), vec!["login.html"]);
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_check_auth_allows_public_pages() {
        for page in ["index.html", "/", "login.html", "/app/register.html"] {
            let h = harness_with_store(Arc::new(MemoryStore::new()), page);
            assert_eq!(h.client.check_auth().await, AuthGate::Allowed, "{page}");
            assert!(h.navigator.redirects().is_empty());
        }
    }

    #[tokio::test]
    async fn test_check_auth_requires_user_as_well_as_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "T").unwrap();
        store.set(USER_KEY, "{not json").unwrap();
        let h = harness_with_store(store, "orders.html");

        assert_eq!(h.client.check_auth().await, AuthGate::Redirected);
    }

    #[tokio::test]
    async fn test_register_does_not_log_in() {
        let h = harness();
        h.transport.push_json(
            201,
            &json!({"message": "User registered successfully", "user": {"id": 9, "email": "n@b.com", "role": "user"}}),
        );

        let reply = h
            .client
            .register(&Registration {
                email: "n@b.com".to_string(),
                password: SecretString::from("pw"),
                first_name: "New".to_string(),
                last_name: "Person".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(reply.user.id, UserId::new(9));
        assert!(!h.client.is_authenticated().await);
        let body = h.transport.last_request().unwrap().json_body().unwrap();
        assert_eq!(body["first_name"], "New");
        assert_eq!(body["password"], "pw");
    }

    #[tokio::test]
    async fn test_profile_unwraps_envelope() {
        let h = logged_in_harness("user");
        h.transport.push_json(200, &json!({"user": {"id": 1, "email": "a@b.com", "first_name": "Ann"}}));

        let user = h.client.profile().await.unwrap();
        assert_eq!(user.first_name, "Ann");
        assert_eq!(h.transport.last_request().unwrap().url, "http://api.test/api/auth/profile");
    }

    #[tokio::test]
    async fn test_update_profile_persists_returned_user() {
        let h = logged_in_harness("user");
        h.transport.push_json(
            200,
            &json!({"message": "Profile updated successfully", "user": {"id": 1, "email": "a@b.com", "first_name": "Renamed"}}),
        );

        h.client
            .update_profile(&ProfileUpdate {
                first_name: Some("Renamed".to_string()),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();

        let request = h.transport.last_request().unwrap();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.json_body(), Some(json!({"first_name": "Renamed"})));
        assert_eq!(h.client.current_user().await.unwrap().first_name, "Renamed");
        let stored: User = serde_json::from_str(&h.store.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.first_name, "Renamed");
        assert_eq!(h.client.session().await.bearer_token(), Some("T"));
    }

    #[tokio::test]
    async fn test_logout_when_anonymous_still_redirects() {
        let h = harness();
        h.client.logout().await.unwrap();
        assert_eq!(h.navigator.redirects(), vec!["index.html"]);
        assert!(h.presenter.events().contains(&PresenterEvent::CartBadge(0)));
    }
}
