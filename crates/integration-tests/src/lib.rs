//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! # Scripted end-to-end flows (no server needed)
//! cargo test -p shopfront-integration-tests
//!
//! # Against a running Orders Management API
//! SHOPFRONT_API_BASE_URL=http://localhost:5000/api \
//!     cargo test -p shopfront-integration-tests -- --ignored
//! ```
//!
//! Live tests log in with `ADMIN_EMAIL`/`ADMIN_PASSWORD` and
//! `USER_EMAIL`/`USER_PASSWORD`, defaulting to the seeded accounts.
//!
//! # Test Categories
//!
//! - `session_flow` - Full shopping sessions over a scripted transport, with
//!   the session persisted to a real file
//! - `live_api` - The same flows against a live server (ignored by default)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Value, json};
use shopfront_client::transport::mock::MockTransport;
use shopfront_client::ui::RecordingPresenter;
use shopfront_client::{ClientConfig, FileStore, RecordingNavigator, ReqwestTransport, SessionClient};
use tempfile::TempDir;

/// Base URL for live tests (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("SHOPFRONT_API_BASE_URL")
        .unwrap_or_else(|_| shopfront_client::config::DEFAULT_API_BASE_URL.to_string())
}

/// Credentials of the seeded administrator.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    credentials(|key| std::env::var(key).ok(), "ADMIN", ("admin@orders.com", "admin123"))
}

/// Credentials of the seeded shopper.
#[must_use]
pub fn user_credentials() -> (String, String) {
    credentials(|key| std::env::var(key).ok(), "USER", ("user@orders.com", "user123"))
}

/// `<PREFIX>_EMAIL` and `<PREFIX>_PASSWORD`, each falling back to its default.
fn credentials(
    lookup: impl Fn(&str) -> Option<String>,
    prefix: &str,
    (email, password): (&str, &str),
) -> (String, String) {
    (
        lookup(&format!("{prefix}_EMAIL")).unwrap_or_else(|| email.to_string()),
        lookup(&format!("{prefix}_PASSWORD")).unwrap_or_else(|| password.to_string()),
    )
}

/// A scripted client whose session lives in a temporary file.
pub struct TestShop {
    pub client: SessionClient<Arc<MockTransport>>,
    pub transport: Arc<MockTransport>,
    pub navigator: Arc<RecordingNavigator>,
    pub presenter: Arc<RecordingPresenter>,
    session_file: PathBuf,
    _dir: Option<TempDir>,
}

impl TestShop {
    /// A fresh shop on `page` with an empty session file.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new(page: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let session_file = dir.path().join("session.json");
        Self::open(&session_file, page, Some(dir))
    }

    /// Another shop sharing an existing session file, as after a restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be read.
    pub fn reopen(session_file: &Path, page: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Self::open(session_file, page, None)
    }

    fn open(
        session_file: &Path,
        page: &str,
        dir: Option<TempDir>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let transport = Arc::new(MockTransport::new());
        let navigator = Arc::new(RecordingNavigator::new(page));
        let presenter = Arc::new(RecordingPresenter::default());
        let config = ClientConfig::new("http://shop.test/api")?.with_session_file(session_file);
        let client = SessionClient::builder(config, Arc::clone(&transport))
            .store(Arc::new(FileStore::new(session_file)))
            .navigator(navigator.clone())
            .presenter(presenter.clone())
            .build()?;

        Ok(Self {
            client,
            transport,
            navigator,
            presenter,
            session_file: session_file.to_path_buf(),
            _dir: dir,
        })
    }

    /// Location of the session file.
    #[must_use]
    pub fn session_file(&self) -> &Path {
        &self.session_file
    }
}

/// A client talking to the live API with a session file in a temporary
/// directory.
///
/// # Errors
///
/// Returns an error if the configuration or HTTP client cannot be built.
pub fn live_client() -> Result<(SessionClient<ReqwestTransport>, TempDir), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = ClientConfig::new(&api_base_url())?.with_session_file(dir.path().join("session.json"));
    let client = SessionClient::from_config(config)?;
    Ok((client, dir))
}

// =============================================================================
// Response fixtures
// =============================================================================

pub mod fixtures {
    use super::{Value, json};

    #[must_use]
    pub fn user(id: i64, email: &str, role: &str) -> Value {
        json!({
            "id": id,
            "email": email,
            "first_name": "Test",
            "last_name": "Shopper",
            "role": role,
            "is_active": true,
            "created_at": "2025-01-05T14:30:00.000000"
        })
    }

    #[must_use]
    pub fn login(token: &str, user: Value) -> Value {
        json!({"message": "Login successful", "access_token": token, "user": user})
    }

    #[must_use]
    pub fn product(id: i64, name: &str, price: f64, stock: i64) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": "",
            "price": price,
            "stock_quantity": stock,
            "category": "Electronics",
            "image_url": "",
            "is_active": true,
            "created_at": "2025-01-05T14:30:00",
            "updated_at": "2025-01-05T14:30:00"
        })
    }

    #[must_use]
    pub fn cart_item(id: i64, product: &Value, quantity: u32) -> Value {
        let price = product["price"].as_f64().unwrap_or_default();
        json!({
            "id": id,
            "user_id": 2,
            "product_id": product["id"],
            "product": product,
            "quantity": quantity,
            "subtotal": price * f64::from(quantity),
            "created_at": "2025-01-05T14:30:00"
        })
    }

    #[must_use]
    pub fn cart(items: Vec<Value>) -> Value {
        let total: f64 = items
            .iter()
            .filter_map(|item| item["subtotal"].as_f64())
            .sum();
        let count = items.len();
        json!({"cart_items": items, "total": total, "count": count})
    }

    #[must_use]
    pub fn order(id: i64, status: &str, total: f64) -> Value {
        json!({
            "id": id,
            "user_id": 2,
            "total_amount": total,
            "status": status,
            "shipping_address": "1 Main St",
            "order_items": [],
            "created_at": "2025-01-05T14:30:00",
            "updated_at": "2025-01-05T14:30:00"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::credentials;

    #[test]
    fn test_credentials_follow_environment() {
        let seeded = credentials(|_| None, "USER", ("user@orders.com", "user123"));
        assert_eq!(seeded, ("user@orders.com".to_string(), "user123".to_string()));

        let overridden = credentials(
            |key| match key {
                "USER_EMAIL" => Some("shopper@staging.test".to_string()),
                "USER_PASSWORD" => Some("s3cret".to_string()),
                _ => None,
            },
            "USER",
            ("user@orders.com", "user123"),
        );
        assert_eq!(
            overridden,
            ("shopper@staging.test".to_string(), "s3cret".to_string())
        );
    }
}
