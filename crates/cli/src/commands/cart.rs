//! Shopping cart commands. Each mutation prints the resynced cart.

use shopfront_client::SessionClient;
use shopfront_core::{CartItemId, ProductId};

use super::{CliError, require_login, success};
use crate::terminal::print_cart;

pub async fn show(client: &SessionClient) -> Result<(), CliError> {
    require_login(client).await?;
    let cart = client.with_loading(client.get_cart()).await?;
    print_cart(&cart);
    Ok(())
}

pub async fn add(client: &SessionClient, product_id: ProductId, quantity: u32) -> Result<(), CliError> {
    require_login(client).await?;
    let reply = client.add_to_cart(product_id, quantity).await?;
    success(client, &reply.message);
    print_cart(&client.cart().await);
    Ok(())
}

pub async fn update(client: &SessionClient, id: CartItemId, quantity: u32) -> Result<(), CliError> {
    require_login(client).await?;
    let reply = client.update_cart_item(id, quantity).await?;
    success(client, &reply.message);
    print_cart(&client.cart().await);
    Ok(())
}

pub async fn remove(client: &SessionClient, id: CartItemId) -> Result<(), CliError> {
    require_login(client).await?;
    let reply = client.remove_from_cart(id).await?;
    success(client, &reply.message);
    print_cart(&client.cart().await);
    Ok(())
}

pub async fn clear(client: &SessionClient) -> Result<(), CliError> {
    require_login(client).await?;
    let reply = client.clear_cart().await?;
    success(client, &reply.message);
    Ok(())
}
