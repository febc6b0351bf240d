//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for the API's domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use status::*;
