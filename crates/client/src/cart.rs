//! Shopping cart methods.
//!
//! Every mutation is followed by a fresh `GET /cart`, so the cached
//! [`CartSnapshot`] and the badge always reflect what the server holds.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopfront_core::{CartItemId, Money, ProductId, UserId};
use tracing::{debug, instrument};

use crate::client::{MessageResponse, RequestOptions, SessionClient};
use crate::error::ClientError;
use crate::products::Product;
use crate::transport::{Method, Transport};

// =============================================================================
// Domain Types
// =============================================================================

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    /// `None` if the product has since been removed.
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// The cart as returned by `GET /cart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(rename = "cart_items")]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub count: usize,
}

impl CartSnapshot {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// `{message, cart_item}` reply to an add or update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartItemResponse {
    #[serde(default)]
    pub message: String,
    pub cart_item: CartItem,
}

#[derive(Serialize)]
struct AddToCart {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct SetQuantity {
    quantity: u32,
}

// =============================================================================
// Client Methods
// =============================================================================

impl<T: Transport> SessionClient<T> {
    /// Fetch the cart, cache it, and update the badge.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<CartSnapshot, ClientError> {
        let cart: CartSnapshot = self.authenticated_request("/cart", RequestOptions::get()).await?;

        debug!(lines = cart.items.len(), total = %cart.total, "Fetched cart");
        self.inner.cache.write().await.cart = cart.clone();
        self.inner.presenter.update_cart_badge(cart.items.len());
        Ok(cart)
    }

    /// Add `quantity` units of a product, then resync the cart.
    ///
    /// # Errors
    ///
    /// Returns the add error if it fails (no resync is attempted), otherwise
    /// the resync error if that fails.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItemResponse, ClientError> {
        let options = RequestOptions::json(Method::POST, &AddToCart { product_id, quantity })?;
        let reply = self.authenticated_request("/cart/add", options).await?;
        self.get_cart().await?;
        Ok(reply)
    }

    /// Set the quantity of a cart line, then resync the cart.
    ///
    /// # Errors
    ///
    /// See [`Self::add_to_cart`].
    #[instrument(skip(self))]
    pub async fn update_cart_item(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItemResponse, ClientError> {
        let options = RequestOptions::json(Method::PUT, &SetQuantity { quantity })?;
        let reply = self.authenticated_request(&format!("/cart/{id}"), options).await?;
        self.get_cart().await?;
        Ok(reply)
    }

    /// Remove a cart line, then resync the cart.
    ///
    /// # Errors
    ///
    /// See [`Self::add_to_cart`].
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, id: CartItemId) -> Result<MessageResponse, ClientError> {
        let reply = self
            .authenticated_request(&format!("/cart/{id}"), RequestOptions::method(Method::DELETE))
            .await?;
        self.get_cart().await?;
        Ok(reply)
    }

    /// Empty the cart, then resync it.
    ///
    /// # Errors
    ///
    /// See [`Self::add_to_cart`].
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<MessageResponse, ClientError> {
        let reply = self
            .authenticated_request("/cart/clear", RequestOptions::method(Method::DELETE))
            .await?;
        self.get_cart().await?;
        Ok(reply)
    }
}
