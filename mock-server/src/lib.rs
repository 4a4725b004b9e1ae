//! In-memory implementation of the marketplace HTTP API.
//!
//! Handlers are thin: they decode the request, take the market lock and
//! delegate to `Market`, whose methods carry the business rules.

pub mod error;
pub mod market;

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub use error::MarketError;
pub use market::{Category, ItemView, Listed, Listing, Market, UserItemView};

pub type Db = Arc<RwLock<Market>>;

#[derive(Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registered {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub user_id: i64,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginNameInput {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginOutput {
    pub id: i64,
    pub name: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Deserialize)]
pub struct SellInput {
    pub item_id: i64,
}

#[derive(Deserialize)]
pub struct PurchaseInput {
    pub user_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct DescribeInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceBody {
    pub balance: i64,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub name: String,
}

pub fn app() -> Router {
    app_with(Market::new())
}

pub fn app_with(market: Market) -> Router {
    let db: Db = Arc::new(RwLock::new(market));
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/login_name", post(login_by_name))
        .route("/items", get(list_on_sale).post(add_item))
        .route("/items_sold", get(list_with_sold_out))
        .route("/items_all", get(list_all))
        .route("/items/categories", get(categories))
        .route("/items/{id}", get(get_item))
        .route("/items/{id}/image", get(get_image))
        .route("/sell", post(sell))
        .route("/purchase/{id}", post(purchase))
        .route("/description", post(describe))
        .route("/users/{id}/items", get(user_items))
        .route("/balance", get(get_balance).post(add_balance))
        .route("/search", get(search))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<Registered>, MarketError> {
    let mut market = db.write().await;
    let user = market.register(&input.name, &input.password)?;
    tracing::info!(user_id = user.id, "registered user");
    Ok(Json(Registered {
        id: user.id,
        name: user.name.clone(),
    }))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginOutput>, MarketError> {
    let (user, token) = db.write().await.login(input.user_id, &input.password)?;
    Ok(Json(LoginOutput {
        id: user.id,
        name: user.name,
        token,
    }))
}

async fn login_by_name(
    State(db): State<Db>,
    Json(input): Json<LoginNameInput>,
) -> Result<Json<LoginOutput>, MarketError> {
    let (user, token) = db
        .write()
        .await
        .login_by_name(&input.user_name, &input.password)?;
    Ok(Json(LoginOutput {
        id: user.id,
        name: user.name,
        token,
    }))
}

async fn list_on_sale(State(db): State<Db>) -> Json<Vec<ItemView>> {
    let market = db.read().await;
    Json(market.list(Listed::OnSale))
}

async fn list_with_sold_out(State(db): State<Db>) -> Json<Vec<ItemView>> {
    let market = db.read().await;
    Json(market.list(Listed::OnSaleOrSoldOut))
}

async fn list_all(State(db): State<Db>) -> Json<Vec<ItemView>> {
    let market = db.read().await;
    Json(market.list(Listed::Everything))
}

async fn categories(State(db): State<Db>) -> Json<Vec<Category>> {
    let market = db.read().await;
    Json(market.categories().to_vec())
}

async fn get_item(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<ItemView>, MarketError> {
    let market = db.read().await;
    market.item(id).map(Json)
}

async fn get_image(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, MarketError> {
    let market = db.read().await;
    let (content_type, bytes) = market.image(id)?;
    Ok(([(header::CONTENT_TYPE, content_type.to_string())], bytes.to_vec()))
}

async fn add_item(
    State(db): State<Db>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Created>, MarketError> {
    let seller = db.read().await.authenticate(bearer(&headers))?;

    let mut listing = Listing::default();
    let mut has_image = false;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MarketError::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            listing.image_type = field.content_type().map(str::to_string);
            listing.image = field
                .bytes()
                .await
                .map_err(|e| MarketError::bad_request(e.to_string()))?
                .to_vec();
            has_image = true;
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|e| MarketError::bad_request(e.to_string()))?;
        match name.as_str() {
            "name" => listing.name = value,
            "description" => listing.description = value,
            "category_id" => listing.category_id = parse_number(&name, &value)?,
            "price" => listing.price = parse_number(&name, &value)?,
            _ => {}
        }
    }
    if !has_image {
        return Err(MarketError::bad_request("image is required"));
    }

    let id = db.write().await.add_item(seller, listing)?;
    tracing::info!(item_id = id, seller, "listed item");
    Ok(Json(Created { id }))
}

fn parse_number(field: &str, value: &str) -> Result<i64, MarketError> {
    value
        .trim()
        .parse()
        .map_err(|_| MarketError::bad_request(format!("invalid {field}")))
}

async fn sell(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<SellInput>,
) -> Result<Json<&'static str>, MarketError> {
    let mut market = db.write().await;
    let caller = market.authenticate(bearer(&headers))?;
    market.sell(caller, input.item_id)?;
    Ok(Json("successful"))
}

async fn purchase(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(_input): Json<PurchaseInput>,
) -> Result<Json<&'static str>, MarketError> {
    let mut market = db.write().await;
    let buyer = market.authenticate(bearer(&headers))?;
    market.purchase(buyer, id)?;
    tracing::info!(item_id = id, buyer, "item purchased");
    Ok(Json("successful"))
}

async fn describe(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<DescribeInput>,
) -> Result<Json<String>, MarketError> {
    db.read().await.authenticate(bearer(&headers))?;
    Ok(Json(market::describe(&input.name, &input.description)))
}

async fn user_items(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Vec<UserItemView>>, MarketError> {
    let market = db.read().await;
    market.authenticate(bearer(&headers))?;
    Ok(Json(market.user_items(id)))
}

async fn get_balance(State(db): State<Db>, headers: HeaderMap) -> Result<Json<BalanceBody>, MarketError> {
    let market = db.read().await;
    let user = market.authenticate(bearer(&headers))?;
    Ok(Json(BalanceBody {
        balance: market.balance(user)?,
    }))
}

async fn add_balance(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<BalanceBody>,
) -> Result<Json<&'static str>, MarketError> {
    let mut market = db.write().await;
    let user = market.authenticate(bearer(&headers))?;
    market.add_balance(user, input.balance)?;
    Ok(Json("successful"))
}

async fn search(State(db): State<Db>, Query(params): Query<SearchParams>) -> Json<Vec<ItemView>> {
    let market = db.read().await;
    Json(market.search(&params.name))
}
