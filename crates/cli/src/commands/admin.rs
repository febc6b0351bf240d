//! Store administration commands.
//!
//! # Usage
//!
//! ```bash
//! shopfront admin dashboard
//! shopfront admin orders --status pending
//! shopfront admin set-status 42 shipped
//! shopfront admin toggle-user 7
//! ```

use shopfront_client::SessionClient;
use shopfront_client::ui::format_currency;
use shopfront_core::{OrderId, OrderStatus, UserId};

use super::{CliError, require_admin, success};
use crate::terminal::{print_line, print_orders, print_payments, print_users};

pub async fn dashboard(client: &SessionClient) -> Result<(), CliError> {
    require_admin(client).await?;
    let dashboard = client.with_loading(client.get_dashboard()).await?;
    let stats = &dashboard.statistics;

    print_line(&format!("Users:          {}", stats.total_users));
    print_line(&format!("Products:       {}", stats.total_products));
    print_line(&format!("Orders:         {}", stats.total_orders));
    print_line(&format!("Pending orders: {}", stats.pending_orders));
    print_line(&format!("Revenue:        {}", format_currency(stats.total_revenue)));
    print_line("");
    print_line("Recent orders:");
    print_orders(&dashboard.recent_orders);
    Ok(())
}

pub async fn orders(client: &SessionClient, status: Option<OrderStatus>) -> Result<(), CliError> {
    require_admin(client).await?;
    let list = client.get_all_orders(status).await?;
    print_orders(&list.orders);
    Ok(())
}

pub async fn set_status(client: &SessionClient, id: OrderId, status: OrderStatus) -> Result<(), CliError> {
    require_admin(client).await?;
    let reply = client.update_order_status(id, status).await?;
    success(client, &format!("{}: #{} is now {}", reply.message, reply.order.id, reply.order.status));
    Ok(())
}

pub async fn users(client: &SessionClient) -> Result<(), CliError> {
    require_admin(client).await?;
    let list = client.get_all_users().await?;
    print_users(&list.users);
    Ok(())
}

pub async fn toggle_user(client: &SessionClient, id: UserId) -> Result<(), CliError> {
    require_admin(client).await?;
    let reply = client.toggle_user_status(id).await?;
    let state = if reply.user.is_active { "active" } else { "inactive" };
    success(client, &format!("{}: #{} is now {state}", reply.message, reply.user.id));
    Ok(())
}

pub async fn payments(client: &SessionClient) -> Result<(), CliError> {
    require_admin(client).await?;
    let list = client.get_all_payments().await?;
    print_payments(&list.payments);
    Ok(())
}
