//! Terminal storefront for the marketplace.
//!
//! # Overview
//! Plugs a blocking ureq transport and a file-backed cookie jar into the
//! I/O-free `mercari_core` client, and renders each screen as text.
//!
//! # Design
//! - `transport` is the only module that touches the network.
//! - `app::Storefront` owns the shared state; views borrow it per action.
//! - Every API failure becomes an error toast; nothing is retried.

pub mod app;
pub mod config;
pub mod cookies;
pub mod logging;
pub mod toast;
pub mod transport;
pub mod views;

pub use app::Storefront;
pub use cookies::CookieJar;
pub use toast::{Toast, ToastLevel, Toasts};
pub use transport::UreqTransport;
