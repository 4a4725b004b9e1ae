//! Synchronous API client core for the marketplace storefront.
//!
//! # Overview
//! Builds `HttpRequest` values and normalizes `HttpResponse` values without
//! touching the network (host-does-IO pattern). Hosts plug a network client
//! in through the `Transport` trait.
//!
//! # Design
//! - `MercariClient` holds the base address and bearer token; it builds
//!   requests and attaches authorization in one place.
//! - `normalize` turns a settled round-trip into a value or one tagged
//!   `ApiError`, for both JSON and blob responses.
//! - `ApiClient` binds the two to a `Transport` and exposes one method per
//!   endpoint.
//! - `session` holds the cookie-persisted identity and the view gate;
//!   `store` holds fetched item lists keyed by query.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod multipart;
pub mod normalize;
pub mod session;
pub mod store;
pub mod types;

pub use api::ApiClient;
pub use client::{MercariClient, RequestOptions};
pub use error::ApiError;
pub use http::{Blob, HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use normalize::{normalize_blob, normalize_json, ResponseShape};
pub use session::{Access, AuthState, CookieError, CookieStore, Gate, Identity, MemoryCookies, Session};
pub use store::{FetchTicket, ItemCollection, ItemQuery};
pub use types::{AuthUser, Category, ImageFile, Item, ItemFeed, ItemId, ItemStatus, NewItem, UserId};
