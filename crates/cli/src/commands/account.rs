//! Login, registration, and profile commands.
//!
//! # Usage
//!
//! ```bash
//! shopfront login -e admin@orders.com -p admin123
//! shopfront whoami
//! shopfront profile update --first-name Ada
//! shopfront logout
//! ```

use secrecy::SecretString;
use shopfront_client::{ProfileUpdate, Registration, SessionClient};

use super::{CliError, require_login, success};
use crate::terminal::{print_line, print_user};

pub async fn login(client: &SessionClient, email: &str, password: SecretString) -> Result<(), CliError> {
    let reply = client.login(email, &password).await?;
    success(client, &format!("Welcome back, {}!", reply.user.display_name()));
    Ok(())
}

pub async fn register(client: &SessionClient, registration: Registration) -> Result<(), CliError> {
    let reply = client.register(&registration).await?;
    success(client, &format!("{}. You can now log in.", reply.message));
    Ok(())
}

pub async fn logout(client: &SessionClient) -> Result<(), CliError> {
    client.logout().await?;
    success(client, "Logged out");
    Ok(())
}

/// Show the locally stored profile without contacting the server.
pub async fn whoami(client: &SessionClient) -> Result<(), CliError> {
    match client.current_user().await {
        Some(user) if client.is_authenticated().await => print_user(&user),
        _ => print_line("Not logged in"),
    }
    Ok(())
}

pub async fn show_profile(client: &SessionClient) -> Result<(), CliError> {
    require_login(client).await?;
    let user = client.with_loading(client.profile()).await?;
    print_user(&user);
    Ok(())
}

pub async fn update_profile(client: &SessionClient, update: ProfileUpdate) -> Result<(), CliError> {
    require_login(client).await?;
    let reply = client.update_profile(&update).await?;
    success(client, &reply.message);
    print_user(&reply.user);
    Ok(())
}

pub async fn status(client: &SessionClient) -> Result<(), CliError> {
    let status = client.api_status().await?;
    print_line(&format!(
        "{} {} ({}) at {}",
        status.api,
        status.version,
        status.status,
        client.config().api_base_url
    ));
    Ok(())
}
