//! # Selly tools
//! A thin, typed wrapper around the Selly v2 REST API. Every call follows the same shape: marshal the request,
//! perform the HTTP call with basic auth, then decode either the expected entity or Selly's documented error object.

mod api;
mod config;
mod error;

pub mod data_objects;

pub use api::SellyApi;
pub use config::{SellyConfig, DEFAULT_SELLY_API_URL, DEFAULT_USER_AGENT};
pub use data_objects::{Coupon, NewCoupon, Order, Product, ProductGroup, Query, Webhook};
pub use error::{ErrorResponse, ErrorTitles, SellyApiError};
