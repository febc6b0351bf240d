//! Order history and checkout commands.

use shopfront_client::{CheckoutRequest, SessionClient};
use shopfront_core::OrderId;

use super::{CliError, require_login, success};
use crate::terminal::{print_order, print_orders};

pub async fn list(client: &SessionClient) -> Result<(), CliError> {
    require_login(client).await?;
    let list = client.with_loading(client.get_orders()).await?;
    print_orders(&list.orders);
    Ok(())
}

pub async fn show(client: &SessionClient, id: OrderId) -> Result<(), CliError> {
    require_login(client).await?;
    let order = client.get_order(id).await?;
    print_order(&order);
    Ok(())
}

pub async fn checkout(client: &SessionClient, request: CheckoutRequest) -> Result<(), CliError> {
    require_login(client).await?;
    let reply = client.with_loading(client.checkout(&request)).await?;
    success(client, &reply.message);
    print_order(&reply.order);
    Ok(())
}

pub async fn cancel(client: &SessionClient, id: OrderId) -> Result<(), CliError> {
    require_login(client).await?;
    let reply = client.cancel_order(id).await?;
    success(client, &reply.message);
    Ok(())
}
