//! Order history and checkout.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopfront_core::{Money, OrderId, OrderItemId, OrderStatus, PaymentId, PaymentStatus, ProductId, UserId};
use tracing::{debug, info, instrument};

use crate::client::{MessageResponse, RequestOptions, SessionClient};
use crate::error::ClientError;
use crate::products::Product;
use crate::transport::{Method, Transport};

/// Payment method sent when the caller does not choose one.
pub const DEFAULT_PAYMENT_METHOD: &str = "credit_card";

// =============================================================================
// Domain Types
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub total_amount: Money,
    pub status: OrderStatus,
    #[serde(default)]
    pub shipping_address: Option<String>,
    /// Empty in summary listings such as the admin dashboard.
    #[serde(default, alias = "order_items")]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub payment: Option<Payment>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Order {
    /// Whether the customer may still cancel this order.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        self.status.is_cancellable()
    }
}

/// One product line in an order, priced at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    pub price_at_purchase: Money,
    #[serde(default)]
    pub subtotal: Option<Money>,
}

impl OrderItem {
    /// Line total; computed from the unit price when the server omits it.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.subtotal
            .unwrap_or(self.price_at_purchase * self.quantity)
    }
}

/// A payment recorded against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub amount: Money,
    #[serde(default)]
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// `{orders, count}` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub count: usize,
}

/// Checkout details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub payment_method: String,
}

impl CheckoutRequest {
    /// Ship to `shipping_address`, paying by credit card.
    #[must_use]
    pub fn new(shipping_address: impl Into<String>) -> Self {
        Self {
            shipping_address: shipping_address.into(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
        }
    }

    /// Use a different payment method.
    #[must_use]
    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }
}

/// `{message, order}` reply to a checkout or status change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub message: String,
    pub order: Order,
}

#[derive(Deserialize)]
struct OrderEnvelope {
    order: Order,
}

// =============================================================================
// Client Methods
// =============================================================================

impl<T: Transport> SessionClient<T> {
    /// List the caller's orders, newest first, and remember them.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_orders(&self) -> Result<OrderList, ClientError> {
        let list: OrderList = self.authenticated_request("/orders", RequestOptions::get()).await?;

        debug!(count = list.orders.len(), "Fetched orders");
        self.inner.cache.write().await.orders.clone_from(&list.orders);
        Ok(list)
    }

    /// Fetch one of the caller's orders.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the order does not exist
    /// or belongs to someone else.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ClientError> {
        let envelope: OrderEnvelope = self
            .authenticated_request(&format!("/orders/{id}"), RequestOptions::get())
            .await?;
        Ok(envelope.order)
    }

    /// Turn the cart into an order, then resync the (now empty) cart.
    ///
    /// # Errors
    ///
    /// Returns the checkout error if it fails (no resync is attempted),
    /// otherwise the resync error if that fails.
    #[instrument(skip(self, request))]
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<OrderResponse, ClientError> {
        let options = RequestOptions::json(Method::POST, request)?;
        let reply: OrderResponse = self.authenticated_request("/orders/checkout", options).await?;

        info!(order_id = %reply.order.id, total = %reply.order.total_amount, "Order placed");
        self.get_cart().await?;
        Ok(reply)
    }

    /// Cancel a pending or processing order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 if the order can no longer
    /// be cancelled.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<MessageResponse, ClientError> {
        self.authenticated_request(
            &format!("/orders/{id}/cancel"),
            RequestOptions::method(Method::POST),
        )
        .await
    }
}
