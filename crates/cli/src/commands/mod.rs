//! Command implementations, one module per area of the store.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;

use shopfront_client::{AlertKind, AuthGate, ClientError, ConfigError, SessionClient};
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// No session for a command that needs one.
    #[error("You are not logged in. Run `shopfront login` first.")]
    LoginRequired,

    /// Session without the admin role for an admin command.
    #[error("Administrator access required")]
    AdminRequired,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CliError {
    /// A follow-up suggestion for the user, if one applies.
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Client(err) if err.is_unauthorized() => {
                Some("Your session may have expired. Run `shopfront login` again.")
            }
            _ => None,
        }
    }
}

/// Stop unless the session may open the current page.
pub async fn require_login(client: &SessionClient) -> Result<(), CliError> {
    match client.check_auth().await {
        AuthGate::Allowed => Ok(()),
        AuthGate::Redirected => Err(CliError::LoginRequired),
    }
}

/// Stop unless the session belongs to an administrator.
pub async fn require_admin(client: &SessionClient) -> Result<(), CliError> {
    require_login(client).await?;
    if client.is_admin().await {
        Ok(())
    } else {
        Err(CliError::AdminRequired)
    }
}

/// Report success through the client's presenter.
pub fn success(client: &SessionClient, message: &str) {
    client.presenter().show_alert(message, AlertKind::Success);
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shopfront_client::ClientError;

    use super::*;

    #[test]
    fn test_hint_only_for_auth_failures() {
        let expired = CliError::from(ClientError::from_error_body(401, &json!({"error": "Token has expired"})));
        assert!(expired.hint().is_some());
        assert_eq!(expired.to_string(), "Token has expired");

        let missing = CliError::from(ClientError::from_error_body(404, &json!({})));
        assert!(missing.hint().is_none());
        assert!(CliError::LoginRequired.hint().is_none());
    }
}
