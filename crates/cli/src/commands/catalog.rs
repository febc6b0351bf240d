//! Product catalog commands.

use shopfront_client::{NewProduct, ProductFilters, ProductUpdate, SessionClient};
use shopfront_core::ProductId;

use super::{CliError, require_admin, success};
use crate::terminal::{print_line, print_product, print_products};

pub async fn list(client: &SessionClient, filters: ProductFilters) -> Result<(), CliError> {
    let list = client.with_loading(client.get_products(&filters)).await?;
    print_products(&list.products);
    Ok(())
}

pub async fn show(client: &SessionClient, id: ProductId) -> Result<(), CliError> {
    let product = client.get_product(id).await?;
    print_product(&product);
    Ok(())
}

pub async fn categories(client: &SessionClient) -> Result<(), CliError> {
    for category in client.get_categories().await? {
        print_line(&category);
    }
    Ok(())
}

pub async fn create(client: &SessionClient, product: NewProduct) -> Result<(), CliError> {
    require_admin(client).await?;
    let reply = client.create_product(&product).await?;
    success(client, &reply.message);
    print_product(&reply.product);
    Ok(())
}

pub async fn update(client: &SessionClient, id: ProductId, update: ProductUpdate) -> Result<(), CliError> {
    require_admin(client).await?;
    let reply = client.update_product(id, &update).await?;
    success(client, &reply.message);
    print_product(&reply.product);
    Ok(())
}

pub async fn delete(client: &SessionClient, id: ProductId) -> Result<(), CliError> {
    require_admin(client).await?;
    let reply = client.delete_product(id).await?;
    success(client, &reply.message);
    Ok(())
}
