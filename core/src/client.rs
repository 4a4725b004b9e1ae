//! Stateless HTTP request builder for the marketplace API.
//!
//! # Design
//! `MercariClient` holds the base address and, once a session exists, the
//! bearer token. It never touches the network: every endpoint has a
//! `build_*` method producing an `HttpRequest`, and `ApiClient` (or any
//! other host) executes it and hands the response to the normalizer.
//!
//! Authorization is attached here, in one place: options marked
//! `authorized()` get `Authorization: Bearer <token>` whenever a token is
//! set, so no call site can forget the header.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::multipart::Multipart;
use crate::normalize::ResponseShape;
use crate::types::{
    AddBalance, DescriptionRequest, ItemFeed, ItemId, LoginById, LoginByName, NewItem,
    PurchaseRequest, Register, SellRequest, UserId,
};

/// Method, headers, body and auth requirement of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub authorized: bool,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn post_json<T: Serialize>(payload: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_vec(payload).map_err(ApiError::Serialization)?;
        Ok(Self::new(HttpMethod::Post)
            .header("content-type", "application/json")
            .body(body))
    }

    pub fn post_multipart(form: Multipart) -> Self {
        let content_type = form.content_type();
        Self::new(HttpMethod::Post)
            .header("content-type", &content_type)
            .body(form.into_body())
    }

    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: None,
            authorized: false,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Mark the call as requiring the session's bearer token.
    pub fn authorized(mut self) -> Self {
        self.authorized = true;
        self
    }
}

/// Synchronous, I/O-free request builder for the marketplace API.
#[derive(Debug, Clone)]
pub struct MercariClient {
    base_url: String,
    token: Option<String>,
}

impl MercariClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Build a request for `path` relative to the base address.
    pub fn request(&self, path: &str, options: RequestOptions, shape: ResponseShape) -> HttpRequest {
        let RequestOptions {
            method,
            mut headers,
            body,
            authorized,
        } = options;

        if let Some(accept) = shape.accept() {
            if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("accept")) {
                headers.push(("accept".to_string(), accept.to_string()));
            }
        }
        if authorized {
            match &self.token {
                Some(token) => headers.push(("authorization".to_string(), format!("Bearer {token}"))),
                None => tracing::debug!(%path, "authorized call without a session token"),
            }
        }

        HttpRequest {
            method,
            path: format!("{}{}", self.base_url, path),
            headers,
            body,
        }
    }

    fn json(&self, path: &str, options: RequestOptions) -> HttpRequest {
        self.request(path, options, ResponseShape::Json)
    }

    pub fn build_register(&self, input: &Register) -> Result<HttpRequest, ApiError> {
        Ok(self.json("/register", RequestOptions::post_json(input)?))
    }

    pub fn build_login(&self, input: &LoginById) -> Result<HttpRequest, ApiError> {
        Ok(self.json("/login", RequestOptions::post_json(input)?))
    }

    pub fn build_login_by_name(&self, input: &LoginByName) -> Result<HttpRequest, ApiError> {
        Ok(self.json("/login_name", RequestOptions::post_json(input)?))
    }

    pub fn build_list_items(&self, feed: ItemFeed) -> HttpRequest {
        self.json(feed.path(), RequestOptions::get())
    }

    pub fn build_get_item(&self, id: ItemId) -> HttpRequest {
        self.json(&format!("/items/{id}"), RequestOptions::get())
    }

    pub fn build_item_image(&self, id: ItemId) -> HttpRequest {
        self.request(
            &format!("/items/{id}/image"),
            RequestOptions::get(),
            ResponseShape::Blob,
        )
    }

    pub fn build_categories(&self) -> HttpRequest {
        self.json("/items/categories", RequestOptions::get())
    }

    pub fn build_add_item(&self, input: &NewItem) -> HttpRequest {
        let form = Multipart::new()
            .text("name", &input.name)
            .text("category_id", &input.category_id.to_string())
            .text("price", &input.price.to_string())
            .text("description", &input.description)
            .file("image", &input.image);
        self.json("/items", RequestOptions::post_multipart(form).authorized())
    }

    pub fn build_sell(&self, item_id: ItemId) -> Result<HttpRequest, ApiError> {
        let options = RequestOptions::post_json(&SellRequest { item_id })?.authorized();
        Ok(self.json("/sell", options))
    }

    pub fn build_purchase(&self, item_id: ItemId, user_id: UserId) -> Result<HttpRequest, ApiError> {
        let options = RequestOptions::post_json(&PurchaseRequest { user_id })?.authorized();
        Ok(self.json(&format!("/purchase/{item_id}"), options))
    }

    pub fn build_describe(&self, input: &DescriptionRequest) -> Result<HttpRequest, ApiError> {
        Ok(self.json("/description", RequestOptions::post_json(input)?.authorized()))
    }

    pub fn build_user_items(&self, user_id: UserId) -> HttpRequest {
        self.json(&format!("/users/{user_id}/items"), RequestOptions::get().authorized())
    }

    pub fn build_balance(&self) -> HttpRequest {
        self.json("/balance", RequestOptions::get().authorized())
    }

    pub fn build_add_balance(&self, amount: i64) -> Result<HttpRequest, ApiError> {
        let options = RequestOptions::post_json(&AddBalance { balance: amount })?.authorized();
        Ok(self.json("/balance", options))
    }

    pub fn build_search(&self, keyword: &str) -> HttpRequest {
        self.json(
            &format!("/search?name={}", encode_query(keyword)),
            RequestOptions::get(),
        )
    }
}

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

fn encode_query(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}
