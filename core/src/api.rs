//! API client: a `MercariClient` bound to a `Transport`.
//!
//! Every typed operation is build -> execute -> normalize. Failures are
//! returned, never retried.

use serde::de::DeserializeOwned;

use crate::client::{MercariClient, RequestOptions};
use crate::error::ApiError;
use crate::http::{Blob, HttpMethod, HttpRequest, Transport};
use crate::normalize::{normalize_blob, normalize_json, ResponseShape};
use crate::session::Session;
use crate::types::{
    AuthUser, Balance, Category, DescriptionRequest, Item, ItemCreated, ItemFeed, ItemId,
    LoginById, LoginByName, NewItem, Register, RegisteredUser, UserId,
};

pub struct ApiClient<T> {
    client: MercariClient,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: MercariClient::new(base_url),
            transport,
        }
    }

    pub fn client(&self) -> &MercariClient {
        &self.client
    }

    /// Attach the session's token to every authorized call from now on.
    pub fn set_session(&mut self, session: Option<&Session>) {
        self.client.set_token(session.map(|s| s.token.clone()));
    }

    pub fn clear_session(&mut self) {
        self.client.set_token(None);
    }

    /// Issue a call whose successful body is JSON.
    pub fn request_json<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ApiError> {
        self.send_json(self.client.request(path, options, ResponseShape::Json))
    }

    /// Issue a call whose successful body is binary.
    pub fn request_blob(&self, path: &str, options: RequestOptions) -> Result<Blob, ApiError> {
        self.send_blob(self.client.request(path, options, ResponseShape::Blob))
    }

    fn send_json<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        tracing::debug!(%method, %path, "sending request");
        let result = normalize_json(self.transport.execute(request));
        log_outcome(method, &path, &result);
        result
    }

    fn send_blob(&self, request: HttpRequest) -> Result<Blob, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        tracing::debug!(%method, %path, "sending request");
        let result = normalize_blob(self.transport.execute(request));
        log_outcome(method, &path, &result);
        result
    }

    pub fn register(&self, name: &str, password: &str) -> Result<RegisteredUser, ApiError> {
        let input = Register {
            name: name.to_string(),
            password: password.to_string(),
        };
        self.send_json(self.client.build_register(&input)?)
    }

    pub fn login(&self, user_id: UserId, password: &str) -> Result<AuthUser, ApiError> {
        let input = LoginById {
            user_id,
            password: password.to_string(),
        };
        self.send_json(self.client.build_login(&input)?)
    }

    pub fn login_by_name(&self, user_name: &str, password: &str) -> Result<AuthUser, ApiError> {
        let input = LoginByName {
            user_name: user_name.to_string(),
            password: password.to_string(),
        };
        self.send_json(self.client.build_login_by_name(&input)?)
    }

    pub fn items(&self, feed: ItemFeed) -> Result<Vec<Item>, ApiError> {
        self.send_json(self.client.build_list_items(feed))
    }

    pub fn item(&self, id: ItemId) -> Result<Item, ApiError> {
        self.send_json(self.client.build_get_item(id))
    }

    pub fn item_image(&self, id: ItemId) -> Result<Blob, ApiError> {
        self.send_blob(self.client.build_item_image(id))
    }

    pub fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.send_json(self.client.build_categories())
    }

    /// Submit a listing. The item starts out unpublished; see `sell`.
    pub fn add_item(&self, input: &NewItem) -> Result<ItemId, ApiError> {
        let created: ItemCreated = self.send_json(self.client.build_add_item(input))?;
        Ok(created.id)
    }

    pub fn sell(&self, item_id: ItemId) -> Result<(), ApiError> {
        let _: serde_json::Value = self.send_json(self.client.build_sell(item_id)?)?;
        Ok(())
    }

    pub fn purchase(&self, item_id: ItemId, user_id: UserId) -> Result<(), ApiError> {
        let _: serde_json::Value = self.send_json(self.client.build_purchase(item_id, user_id)?)?;
        Ok(())
    }

    /// Ask the server to suggest a description for a draft listing.
    pub fn describe(&self, name: &str, description: &str) -> Result<String, ApiError> {
        let input = DescriptionRequest {
            name: name.to_string(),
            description: description.to_string(),
        };
        self.send_json(self.client.build_describe(&input)?)
    }

    pub fn user_items(&self, user_id: UserId) -> Result<Vec<Item>, ApiError> {
        let items: Option<Vec<Item>> = self.send_json(self.client.build_user_items(user_id))?;
        Ok(items.unwrap_or_default())
    }

    pub fn balance(&self) -> Result<i64, ApiError> {
        let balance: Balance = self.send_json(self.client.build_balance())?;
        Ok(balance.balance)
    }

    pub fn add_balance(&self, amount: i64) -> Result<(), ApiError> {
        let _: serde_json::Value = self.send_json(self.client.build_add_balance(amount)?)?;
        Ok(())
    }

    pub fn search(&self, keyword: &str) -> Result<Vec<Item>, ApiError> {
        self.send_json(self.client.build_search(keyword))
    }
}

fn log_outcome<R>(method: HttpMethod, path: &str, result: &Result<R, ApiError>) {
    match result {
        Ok(_) => tracing::debug!(%method, %path, "request succeeded"),
        Err(err) => tracing::warn!(%method, %path, error = %err, "request failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::http::{HttpResponse, TransportError};

    fn ok(body: &str) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        })
    }

    fn canned(
        body: &'static str,
    ) -> impl Fn(HttpRequest) -> Result<HttpResponse, TransportError> {
        move |_| ok(body)
    }

    #[test]
    fn request_json_prefixes_base_address() {
        let seen = RefCell::new(Vec::new());
        let transport = |req: HttpRequest| {
            seen.borrow_mut().push(req.path.clone());
            ok("[]")
        };
        let api = ApiClient::new("http://api.test", transport);
        let items: Vec<Item> = api.request_json("/items_all", RequestOptions::get()).unwrap();
        assert!(items.is_empty());
        assert_eq!(seen.borrow().as_slice(), ["http://api.test/items_all"]);
    }

    #[test]
    fn session_token_is_attached_centrally() {
        let seen = RefCell::new(None);
        let transport = |req: HttpRequest| {
            *seen.borrow_mut() = req.header("authorization").map(str::to_string);
            ok(r#"{"balance":300}"#)
        };
        let mut api = ApiClient::new("http://api.test", transport);
        api.set_session(Some(&Session {
            user_id: 1,
            token: "abc".to_string(),
        }));
        assert_eq!(api.balance().unwrap(), 300);
        assert_eq!(seen.borrow().as_deref(), Some("Bearer abc"));

        api.clear_session();
        api.balance().unwrap();
        assert_eq!(*seen.borrow(), None);
    }

    #[test]
    fn add_item_returns_new_id() {
        let api = ApiClient::new("http://api.test", canned(r#"{"id":42}"#));
        let id = api
            .add_item(&NewItem {
                name: "lamp".to_string(),
                category_id: 1,
                price: 10,
                description: String::new(),
                image: crate::types::ImageFile {
                    file_name: "lamp.png".to_string(),
                    content_type: "image/png".to_string(),
                    bytes: vec![1],
                },
            })
            .unwrap();
        assert_eq!(id, 42);
    }

    #[test]
    fn null_user_items_is_empty_list() {
        let api = ApiClient::new("http://api.test", canned("null"));
        assert!(api.user_items(3).unwrap().is_empty());
    }

    #[test]
    fn describe_returns_text() {
        let api = ApiClient::new("http://api.test", canned(r#""A sturdy oak desk.""#));
        assert_eq!(api.describe("desk", "oak").unwrap(), "A sturdy oak desk.");
    }

    #[test]
    fn request_blob_reports_status_message() {
        let transport = |req: HttpRequest| -> Result<HttpResponse, TransportError> {
            assert_eq!(req.method, HttpMethod::Get);
            Ok(HttpResponse {
                status: 500,
                status_text: "Internal Server Error".to_string(),
                headers: Vec::new(),
                body: Vec::new(),
            })
        };
        let api = ApiClient::new("http://api.test", transport);
        let err = api.item_image(1).unwrap_err();
        assert_eq!(err.to_string(), "500: Internal Server Error");
    }

    #[test]
    fn transport_failure_surfaces_as_transport_error() {
        let transport =
            |_: HttpRequest| -> Result<HttpResponse, TransportError> { Err(TransportError::new("connection refused")) };
        let api = ApiClient::new("http://api.test", transport);
        let err = api.categories().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
