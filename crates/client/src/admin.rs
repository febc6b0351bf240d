//! Store administration methods.
//!
//! All of these require an admin session. The server answers 403 for anyone
//! else, which surfaces as `ClientError::Api`.

use serde::{Deserialize, Serialize};
use shopfront_core::{Money, OrderId, OrderStatus, UserId};
use tracing::{info, instrument};

use crate::auth::{User, UserResponse};
use crate::client::{RequestOptions, SessionClient};
use crate::error::ClientError;
use crate::orders::{Order, OrderList, OrderResponse, Payment};
use crate::transport::{Method, Transport};

// =============================================================================
// Domain Types
// =============================================================================

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardStatistics {
    /// Accounts with the `user` role.
    pub total_users: u64,
    /// Active products.
    pub total_products: u64,
    pub total_orders: u64,
    /// Sum over processing, shipped, and delivered orders.
    pub total_revenue: Money,
    pub pending_orders: u64,
}

/// `GET /admin/dashboard` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Dashboard {
    pub statistics: DashboardStatistics,
    /// The ten most recent orders, without line items.
    #[serde(default)]
    pub recent_orders: Vec<Order>,
}

/// `{users, count}` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    #[serde(default)]
    pub count: usize,
}

/// `{payments, count}` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentList {
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub count: usize,
}

/// `GET /status` reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiStatus {
    pub api: String,
    pub version: String,
    pub status: String,
}

#[derive(Serialize)]
struct StatusChange {
    status: OrderStatus,
}

fn status_query(status: Option<OrderStatus>) -> String {
    status.map_or_else(String::new, |status| {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("status", status.as_str())
            .finish();
        format!("?{query}")
    })
}

// =============================================================================
// Client Methods
// =============================================================================

impl<T: Transport> SessionClient<T> {
    /// Store-wide statistics and recent orders.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_dashboard(&self) -> Result<Dashboard, ClientError> {
        self.authenticated_request("/admin/dashboard", RequestOptions::get())
            .await
    }

    /// Every customer's orders, optionally limited to one status.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_all_orders(&self, status: Option<OrderStatus>) -> Result<OrderList, ClientError> {
        let path = format!("/admin/orders{}", status_query(status));
        self.authenticated_request(&path, RequestOptions::get()).await
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderResponse, ClientError> {
        let options = RequestOptions::json(Method::PUT, &StatusChange { status })?;
        let reply: OrderResponse = self
            .authenticated_request(&format!("/admin/orders/{id}/status"), options)
            .await?;
        info!(order_id = %id, %status, "Order status updated");
        Ok(reply)
    }

    /// Every account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<UserList, ClientError> {
        self.authenticated_request("/admin/users", RequestOptions::get())
            .await
    }

    /// Activate or deactivate a non-admin account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 403 for admin accounts.
    #[instrument(skip(self))]
    pub async fn toggle_user_status(&self, id: UserId) -> Result<UserResponse, ClientError> {
        let reply: UserResponse = self
            .authenticated_request(
                &format!("/admin/users/{id}/toggle"),
                RequestOptions::method(Method::PUT),
            )
            .await?;
        info!(user_id = %id, active = reply.user.is_active, "User status toggled");
        Ok(reply)
    }

    /// Every payment, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_all_payments(&self) -> Result<PaymentList, ClientError> {
        self.authenticated_request("/admin/payments", RequestOptions::get())
            .await
    }

    /// Service name, version, and status. Needs no session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn api_status(&self) -> Result<ApiStatus, ClientError> {
        self.authenticated_request("/status", RequestOptions::get())
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::tests::{harness, logged_in_harness};
    use crate::orders::tests::order_json;

    #[test]
    fn test_status_query() {
        assert_eq!(status_query(None), "");
        assert_eq!(status_query(Some(OrderStatus::Shipped)), "?status=shipped");
    }

    #[tokio::test]
    async fn test_dashboard() {
        let h = logged_in_harness("admin");
        let mut recent = order_json(9, "pending");
        recent.as_object_mut().unwrap().remove("order_items");
        h.transport.push_json(
            200,
            &json!({
                "statistics": {
                    "total_users": 3,
                    "total_products": 12,
                    "total_orders": 7,
                    "total_revenue": 123.45,
                    "pending_orders": 1
                },
                "recent_orders": [recent]
            }),
        );

        let dashboard = h.client.get_dashboard().await.unwrap();

        assert_eq!(dashboard.statistics.total_revenue, Money::from_cents(12345));
        assert_eq!(dashboard.recent_orders.len(), 1);
        assert!(dashboard.recent_orders[0].items.is_empty());
        assert_eq!(
            h.transport.last_request().unwrap().header("Authorization"),
            Some("Bearer T")
        );
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let h = logged_in_harness("user");
        h.transport.push_json(403, &json!({"error": "Admin access required"}));

        let err = h.client.get_dashboard().await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Admin access required");
        assert!(h.client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_get_all_orders_filters_by_status() {
        let h = logged_in_harness("admin");
        h.transport.push_json(200, &json!({"orders": [], "count": 0}));
        h.transport.push_json(200, &json!({"orders": [order_json(1, "pending")], "count": 1}));

        h.client.get_all_orders(Some(OrderStatus::Cancelled)).await.unwrap();
        assert_eq!(
            h.transport.last_request().unwrap().url,
            "http://api.test/api/admin/orders?status=cancelled"
        );

        let all = h.client.get_all_orders(None).await.unwrap();
        assert_eq!(all.count, 1);
        assert_eq!(h.transport.last_request().unwrap().url, "http://api.test/api/admin/orders");
    }

    #[tokio::test]
    async fn test_update_order_status() {
        let h = logged_in_harness("admin");
        h.transport.push_json(200, &json!({"message": "Order status updated", "order": order_json(4, "shipped")}));

        let reply = h
            .client
            .update_order_status(OrderId::new(4), OrderStatus::Shipped)
            .await
            .unwrap();

        assert_eq!(reply.order.status, OrderStatus::Shipped);
        let request = h.transport.last_request().unwrap();
        assert_eq!(request.url, "http://api.test/api/admin/orders/4/status");
        assert_eq!(request.json_body(), Some(json!({"status": "shipped"})));
    }

    #[tokio::test]
    async fn test_users_and_toggle() {
        let h = logged_in_harness("admin");
        h.transport.push_json(
            200,
            &json!({"users": [{"id": 1, "email": "admin@orders.com", "role": "admin"}, {"id": 2, "email": "u@b.com", "role": "user"}], "count": 2}),
        );
        h.transport.push_json(
            200,
            &json!({"message": "User status updated", "user": {"id": 2, "email": "u@b.com", "role": "user", "is_active": false}}),
        );

        let users = h.client.get_all_users().await.unwrap();
        assert_eq!(users.users.iter().filter(|u| u.is_admin()).count(), 1);

        let reply = h.client.toggle_user_status(UserId::new(2)).await.unwrap();
        assert!(!reply.user.is_active);
        let request = h.transport.last_request().unwrap();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, "http://api.test/api/admin/users/2/toggle");
    }

    #[tokio::test]
    async fn test_get_all_payments() {
        let h = logged_in_harness("admin");
        h.transport.push_json(
            200,
            &json!({"payments": [{
                "id": 1, "order_id": 4, "amount": 9.99, "payment_method": "credit_card",
                "payment_status": "refunded", "transaction_id": "tx",
                "created_at": "2025-01-05T14:30:00", "updated_at": "2025-01-05T14:30:00"
            }], "count": 1}),
        );

        let payments = h.client.get_all_payments().await.unwrap();
        assert_eq!(payments.payments[0].amount, Money::from_cents(999));
    }

    #[tokio::test]
    async fn test_api_status_is_public() {
        let h = harness();
        h.transport.push_json(
            200,
            &json!({"api": "Orders Management API", "version": "1.0.0", "status": "running"}),
        );

        let status = h.client.api_status().await.unwrap();
        assert_eq!(status.version, "1.0.0");
        let request = h.transport.last_request().unwrap();
        assert_eq!(request.url, "http://api.test/api/status");
        assert_eq!(request.header("Authorization"), None);
    }
}
