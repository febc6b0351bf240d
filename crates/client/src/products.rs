//! Product catalog methods.
//!
//! Browsing is public. Creating, updating, and deleting products requires an
//! admin session; the server enforces that.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopfront_core::{Money, ProductId};
use tracing::{debug, instrument};

use crate::client::{MessageResponse, RequestOptions, SessionClient};
use crate::error::ClientError;
use crate::transport::{Method, Transport};

// =============================================================================
// Domain Types
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// Whether any units are left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// `{products, count}` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    #[serde(default)]
    pub count: usize,
}

/// Optional catalog filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
}

impl ProductFilters {
    /// Filter by category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by name.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// URL-encoded query string including the leading `?`, or empty when no
    /// filter is set.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (key, value) in [("category", &self.category), ("search", &self.search)] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.append_pair(key, value);
                any = true;
            }
        }
        if any {
            format!("?{}", query.finish())
        } else {
            String::new()
        }
    }
}

/// A product to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Fields to change on a product. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// `{message, product}` reply to a create or update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub message: String,
    pub product: Product,
}

#[derive(Deserialize)]
struct ProductEnvelope {
    product: Product,
}

#[derive(Deserialize)]
struct CategoryList {
    categories: Vec<String>,
}

// =============================================================================
// Client Methods
// =============================================================================

impl<T: Transport> SessionClient<T> {
    /// List active products and remember them as the last-fetched catalog.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, filters: &ProductFilters) -> Result<ProductList, ClientError> {
        let path = format!("/products{}", filters.query_string());
        let list: ProductList = self.authenticated_request(&path, RequestOptions::get()).await?;

        debug!(count = list.products.len(), "Fetched products");
        self.inner.cache.write().await.products.clone_from(&list.products);
        Ok(list)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the product does not
    /// exist.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ClientError> {
        let envelope: ProductEnvelope = self
            .authenticated_request(&format!("/products/{id}"), RequestOptions::get())
            .await?;
        Ok(envelope.product)
    }

    /// Distinct categories of active products.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<String>, ClientError> {
        let list: CategoryList = self
            .authenticated_request("/products/categories", RequestOptions::get())
            .await?;
        Ok(list.categories)
    }

    /// Create a product (admin).
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<ProductResponse, ClientError> {
        let options = RequestOptions::json(Method::POST, product)?;
        self.authenticated_request("/products", options).await
    }

    /// Update a product (admin).
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<ProductResponse, ClientError> {
        let options = RequestOptions::json(Method::PUT, update)?;
        self.authenticated_request(&format!("/products/{id}"), options).await
    }

    /// Deactivate a product (admin).
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<MessageResponse, ClientError> {
        self.authenticated_request(&format!("/products/{id}"), RequestOptions::method(Method::DELETE))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::tests::{harness, logged_in_harness};

    fn product_json(id: i64, name: &str, price: f64) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "description": "Fresh",
            "price": price,
            "stock_quantity": 12,
            "category": "Fruit",
            "image_url": null,
            "is_active": true,
            "created_at": "2025-01-05T14:30:00",
            "updated_at": "2025-01-06T09:00:00"
        })
    }

    #[test]
    fn test_query_string() {
        assert_eq!(ProductFilters::default().query_string(), "");
        assert_eq!(
            ProductFilters::default().category("").query_string(),
            ""
        );
        assert_eq!(
            ProductFilters::default().category("Home & Garden").query_string(),
            "?category=Home+%26+Garden"
        );
        assert_eq!(
            ProductFilters::default().category("Fruit").search("red apple").query_string(),
            "?category=Fruit&search=red+apple"
        );
    }

    #[tokio::test]
    async fn test_get_products_caches_list() {
        let h = harness();
        h.transport.push_json(
            200,
            &json!({"products": [product_json(1, "Apple", 0.5), product_json(2, "Pear", 0.75)], "count": 2}),
        );

        let list = h.client.get_products(&ProductFilters::default().search("a")).await.unwrap();

        assert_eq!(list.count, 2);
        assert_eq!(list.products[1].price, Money::from_cents(75));
        assert_eq!(h.client.products().await, list.products);
        assert_eq!(
            h.transport.last_request().unwrap().url,
            "http://api.test/api/products?search=a"
        );
    }

    #[tokio::test]
    async fn test_get_products_failure_keeps_cache() {
        let h = harness();
        h.transport.push_json(200, &json!({"products": [product_json(1, "Apple", 0.5)], "count": 1}));
        h.transport.push_json(500, &json!({"error": "Failed to get products"}));

        h.client.get_products(&ProductFilters::default()).await.unwrap();
        let err = h.client.get_products(&ProductFilters::default()).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to get products");
        assert_eq!(h.client.products().await.len(), 1);
    }

    #[tokio::test]
    async fn test_get_product_unwraps_envelope() {
        let h = harness();
        h.transport.push_json(200, &json!({"product": product_json(7, "Kiwi", 1.2)}));

        let product = h.client.get_product(ProductId::new(7)).await.unwrap();

        assert_eq!(product.name, "Kiwi");
        assert!(product.in_stock());
        assert_eq!(h.transport.last_request().unwrap().url, "http://api.test/api/products/7");
    }

    #[tokio::test]
    async fn test_get_product_rejects_wrong_shape() {
        let h = harness();
        h.transport.push_json(200, &json!({"product": {"id": "seven"}}));

        let err = h.client.get_product(ProductId::new(7)).await.unwrap_err();
        assert!(matches!(err, ClientError::Schema { ref path, .. } if path == "/products/7"));
    }

    #[tokio::test]
    async fn test_get_categories() {
        let h = harness();
        h.transport.push_json(200, &json!({"categories": ["Fruit", "Veg"]}));

        assert_eq!(h.client.get_categories().await.unwrap(), vec!["Fruit", "Veg"]);
    }

    #[tokio::test]
    async fn test_admin_product_mutations() {
        let h = logged_in_harness("admin");
        h.transport.push_json(
            201,
            &json!({"message": "Product created successfully", "product": product_json(3, "Plum", 2.0)}),
        );
        h.transport.push_json(
            200,
            &json!({"message": "Product updated successfully", "product": product_json(3, "Plum", 2.5)}),
        );
        h.transport.push_json(200, &json!({"message": "Product deleted successfully"}));

        let created = h
            .client
            .create_product(&NewProduct {
                name: "Plum".to_string(),
                price: Money::from_cents(200),
                description: None,
                stock_quantity: Some(5),
                category: None,
                image_url: None,
            })
            .await
            .unwrap();
        assert_eq!(created.product.id, ProductId::new(3));
        assert_eq!(
            h.transport.last_request().unwrap().json_body(),
            Some(json!({"name": "Plum", "price": 2.0, "stock_quantity": 5}))
        );

        let updated = h
            .client
            .update_product(
                ProductId::new(3),
                &ProductUpdate {
                    price: Some(Money::from_cents(250)),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.product.price, Money::from_cents(250));
        assert_eq!(h.transport.last_request().unwrap().method, Method::PUT);

        let deleted = h.client.delete_product(ProductId::new(3)).await.unwrap();
        assert_eq!(deleted.message, "Product deleted successfully");
        let request = h.transport.last_request().unwrap();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.body, None);
        assert_eq!(request.header("Authorization"), Some("Bearer T"));
    }
}
