//! Shopfront Client - Session client for the Orders Management REST API.
//!
//! The client keeps the caller's bearer token and profile in an owned
//! [`Session`], persists it through a [`SessionStore`], and exposes one async
//! method per API endpoint on [`SessionClient`].
//!
//! # Architecture
//!
//! - [`client`] - `SessionClient`, its builder, and the request primitive
//! - [`auth`], [`products`], [`cart`], [`orders`], [`admin`] - endpoint methods
//!   and their typed request/response schemas
//! - [`session`] - session state and the file/memory stores
//! - [`transport`] - the HTTP seam (`reqwest` in production)
//! - [`navigation`], [`ui`] - hooks the host front-end implements
//! - [`config`] - environment-driven configuration
//!
//! # Example
//!
//! ```no_run
//! use shopfront_client::{ClientConfig, ProductFilters, SessionClient};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SessionClient::from_config(ClientConfig::from_env()?)?;
//! let catalog = client.get_products(&ProductFilters::default().category("Fruit")).await?;
//! for product in catalog.products {
//!     println!("{} {}", product.name, product.price);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod auth;
pub mod cart;
pub mod client;
pub mod config;
pub mod error;
pub mod navigation;
pub mod orders;
pub mod products;
pub mod session;
pub mod transport;
pub mod ui;

pub use admin::{ApiStatus, Dashboard, DashboardStatistics, PaymentList, UserList};
pub use auth::{AuthGate, LoginResponse, ProfileUpdate, Registration, User, UserResponse};
pub use cart::{CartItem, CartItemResponse, CartSnapshot};
pub use client::{MessageResponse, RequestOptions, SessionClient, SessionClientBuilder};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, StorageError, TransportError};
pub use navigation::{Navigator, RecordingNavigator};
pub use orders::{CheckoutRequest, Order, OrderItem, OrderList, OrderResponse, Payment};
pub use products::{NewProduct, Product, ProductFilters, ProductList, ProductResponse, ProductUpdate};
pub use session::{FileStore, MemoryStore, Session, SessionStore};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
pub use ui::{AlertKind, NullPresenter, Presenter, TracingPresenter};
