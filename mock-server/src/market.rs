//! In-memory marketplace: users, sessions, categories and items.
//!
//! All business rules live here as synchronous methods so they can be unit
//! tested without a router.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MarketError;

/// Largest accepted listing image.
pub const MAX_IMAGE_BYTES: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Initial,
    OnSale,
    SoldOut,
}

impl ItemStatus {
    pub fn code(self) -> u8 {
        match self {
            ItemStatus::Initial => 1,
            ItemStatus::OnSale => 2,
            ItemStatus::SoldOut => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    password: String,
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct StoredItem {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub user_id: i64,
    pub price: i64,
    pub description: String,
    pub image: Vec<u8>,
    pub image_type: String,
    pub status: ItemStatus,
    touched: u64,
}

/// Item record as returned by listing, detail and search endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub category_name: String,
    pub user_id: i64,
    pub price: i64,
    pub description: String,
    pub status: u8,
}

/// Trimmed record returned by `/users/{id}/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserItemView {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub category_name: String,
    pub status: u8,
}

/// Fields of a listing submission after multipart decoding.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub name: String,
    pub category_id: i64,
    pub price: i64,
    pub description: String,
    pub image: Vec<u8>,
    pub image_type: Option<String>,
}

/// Which statuses a listing endpoint shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listed {
    OnSale,
    OnSaleOrSoldOut,
    Everything,
}

impl Listed {
    fn includes(self, status: ItemStatus) -> bool {
        match self {
            Listed::OnSale => status == ItemStatus::OnSale,
            Listed::OnSaleOrSoldOut => status != ItemStatus::Initial,
            Listed::Everything => true,
        }
    }
}

#[derive(Debug)]
pub struct Market {
    users: BTreeMap<i64, User>,
    tokens: HashMap<String, i64>,
    categories: Vec<Category>,
    items: BTreeMap<i64, StoredItem>,
    next_user_id: i64,
    next_item_id: i64,
    clock: u64,
}

impl Default for Market {
    fn default() -> Self {
        Self::new()
    }
}

impl Market {
    pub fn new() -> Self {
        let categories = ["food", "fashion", "furniture"]
            .iter()
            .zip(1..)
            .map(|(name, id)| Category {
                id,
                name: name.to_string(),
            })
            .collect();
        Self {
            users: BTreeMap::new(),
            tokens: HashMap::new(),
            categories,
            items: BTreeMap::new(),
            next_user_id: 1,
            next_item_id: 1,
            clock: 0,
        }
    }

    pub fn register(&mut self, name: &str, password: &str) -> Result<&User, MarketError> {
        if name.is_empty() {
            return Err(MarketError::bad_request("invalid username"));
        }
        if !is_valid_password(password) {
            return Err(MarketError::bad_request("invalid password"));
        }
        if self.users.values().any(|u| u.name == name) {
            return Err(MarketError::Conflict("user name already exists".to_string()));
        }
        let id = self.next_user_id;
        self.next_user_id += 1;
        let user = User {
            id,
            name: name.to_string(),
            password: password.to_string(),
            balance: 0,
        };
        Ok(self.users.entry(id).or_insert(user))
    }

    /// Check credentials and issue a bearer token.
    pub fn login(&mut self, user_id: i64, password: &str) -> Result<(User, String), MarketError> {
        if !is_valid_password(password) {
            return Err(MarketError::bad_request("invalid password"));
        }
        let user = self
            .users
            .get(&user_id)
            .ok_or_else(|| MarketError::not_found("user not found"))?;
        if user.password != password {
            return Err(MarketError::unauthorized("mismatch password"));
        }
        let user = user.clone();
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), user.id);
        Ok((user, token))
    }

    pub fn login_by_name(&mut self, name: &str, password: &str) -> Result<(User, String), MarketError> {
        if name.is_empty() {
            return Err(MarketError::bad_request("invalid username"));
        }
        let id = self
            .users
            .values()
            .find(|u| u.name == name)
            .map(|u| u.id)
            .ok_or_else(|| MarketError::not_found("user not found"))?;
        self.login(id, password)
    }

    /// Resolve a bearer token to its user id.
    pub fn authenticate(&self, token: Option<&str>) -> Result<i64, MarketError> {
        let token = token.ok_or_else(|| MarketError::unauthorized("missing or malformed jwt"))?;
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| MarketError::unauthorized("invalid or expired jwt"))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn add_item(&mut self, seller: i64, listing: Listing) -> Result<i64, MarketError> {
        if listing.image.len() > MAX_IMAGE_BYTES {
            return Err(MarketError::bad_request("file size is too large (> 1MB)"));
        }
        if listing.price <= 0 {
            return Err(MarketError::bad_request("price must be greater than 0"));
        }
        if listing.name.is_empty() {
            return Err(MarketError::bad_request("invalid name"));
        }
        if self.category_name(listing.category_id).is_none() {
            return Err(MarketError::bad_request("invalid categoryID"));
        }
        let id = self.next_item_id;
        self.next_item_id += 1;
        let touched = self.tick();
        self.items.insert(
            id,
            StoredItem {
                id,
                name: listing.name,
                category_id: listing.category_id,
                user_id: seller,
                price: listing.price,
                description: listing.description,
                image: listing.image,
                image_type: listing.image_type.unwrap_or_else(|| "image/jpeg".to_string()),
                status: ItemStatus::Initial,
                touched,
            },
        );
        Ok(id)
    }

    pub fn sell(&mut self, caller: i64, item_id: i64) -> Result<(), MarketError> {
        let touched = self.tick();
        let item = self
            .items
            .get_mut(&item_id)
            .ok_or_else(|| MarketError::not_found("item not found"))?;
        if item.user_id != caller {
            return Err(MarketError::precondition("can not sell other's item"));
        }
        if item.status != ItemStatus::Initial {
            return Err(MarketError::precondition("invalid item status"));
        }
        item.status = ItemStatus::OnSale;
        item.touched = touched;
        Ok(())
    }

    pub fn purchase(&mut self, buyer: i64, item_id: i64) -> Result<(), MarketError> {
        let item = self
            .items
            .get(&item_id)
            .ok_or_else(|| MarketError::not_found("item not found"))?;
        let (price, seller) = (item.price, item.user_id);
        let buyer_balance = self
            .users
            .get(&buyer)
            .ok_or_else(|| MarketError::not_found("user not found"))?
            .balance;
        let seller_balance = self
            .users
            .get(&seller)
            .ok_or_else(|| MarketError::not_found("seller not found"))?
            .balance;
        if item.status != ItemStatus::OnSale {
            return Err(MarketError::precondition("item is not on sale"));
        }
        if buyer_balance < price {
            return Err(MarketError::precondition("balance is not enough"));
        }
        if buyer == seller {
            return Err(MarketError::precondition("can not buy own items"));
        }
        let seller_balance = seller_balance
            .checked_add(price)
            .ok_or_else(|| MarketError::bad_request("balance overflow"))?;

        let touched = self.tick();
        if let Some(user) = self.users.get_mut(&buyer) {
            user.balance -= price;
        }
        if let Some(user) = self.users.get_mut(&seller) {
            user.balance = seller_balance;
        }
        if let Some(item) = self.items.get_mut(&item_id) {
            item.status = ItemStatus::SoldOut;
            item.touched = touched;
        }
        Ok(())
    }

    pub fn balance(&self, user_id: i64) -> Result<i64, MarketError> {
        self.users
            .get(&user_id)
            .map(|u| u.balance)
            .ok_or_else(|| MarketError::not_found("user not found"))
    }

    pub fn add_balance(&mut self, user_id: i64, amount: i64) -> Result<(), MarketError> {
        if amount <= 0 {
            return Err(MarketError::bad_request("balance must be positive"));
        }
        let user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| MarketError::not_found("user not found"))?;
        user.balance = user
            .balance
            .checked_add(amount)
            .ok_or_else(|| MarketError::bad_request("balance overflow"))?;
        Ok(())
    }

    /// Items visible on a listing endpoint, most recently touched first.
    pub fn list(&self, listed: Listed) -> Vec<ItemView> {
        self.views(|item| listed.includes(item.status))
    }

    pub fn search(&self, name: &str) -> Vec<ItemView> {
        let needle = name.to_lowercase();
        self.views(|item| item.name.to_lowercase().contains(&needle))
    }

    pub fn item(&self, id: i64) -> Result<ItemView, MarketError> {
        self.items
            .get(&id)
            .map(|item| self.view(item))
            .ok_or_else(|| MarketError::not_found("item not found"))
    }

    pub fn image(&self, id: i64) -> Result<(&str, &[u8]), MarketError> {
        self.items
            .get(&id)
            .map(|item| (item.image_type.as_str(), item.image.as_slice()))
            .ok_or_else(|| MarketError::not_found("item not found"))
    }

    pub fn user_items(&self, user_id: i64) -> Vec<UserItemView> {
        self.items
            .values()
            .filter(|item| item.user_id == user_id)
            .map(|item| UserItemView {
                id: item.id,
                name: item.name.clone(),
                price: item.price,
                category_name: self.category_name(item.category_id).unwrap_or_default(),
                status: item.status.code(),
            })
            .collect()
    }

    fn views(&self, keep: impl Fn(&StoredItem) -> bool) -> Vec<ItemView> {
        let mut items: Vec<&StoredItem> = self.items.values().filter(|item| keep(item)).collect();
        items.sort_by(|a, b| b.touched.cmp(&a.touched));
        items.into_iter().map(|item| self.view(item)).collect()
    }

    fn view(&self, item: &StoredItem) -> ItemView {
        ItemView {
            id: item.id,
            name: item.name.clone(),
            category_id: item.category_id,
            category_name: self.category_name(item.category_id).unwrap_or_default(),
            user_id: item.user_id,
            price: item.price,
            description: item.description.clone(),
            status: item.status.code(),
        }
    }

    fn category_name(&self, id: i64) -> Option<String> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Suggest a short listing description (at most 15 words).
pub fn describe(name: &str, description: &str) -> String {
    let pitch = format!("Lovely {name} in great shape. {description}");
    pitch.split_whitespace().take(15).collect::<Vec<_>>().join(" ")
}

fn is_valid_password(password: &str) -> bool {
    !password.is_empty()
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!@#$%^&*".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, price: i64) -> Listing {
        Listing {
            name: name.to_string(),
            category_id: 1,
            price,
            description: "fresh".to_string(),
            image: vec![1, 2, 3],
            image_type: None,
        }
    }

    /// Seller 1 with an on-sale item, buyer 2 with `balance`.
    fn market_with_sale(balance: i64) -> (Market, i64) {
        let mut market = Market::new();
        market.register("seller", "pass123").unwrap();
        market.register("buyer", "pass456").unwrap();
        let id = market.add_item(1, listing("apple", 100)).unwrap();
        market.sell(1, id).unwrap();
        if balance > 0 {
            market.add_balance(2, balance).unwrap();
        }
        (market, id)
    }

    #[test]
    fn register_validates_and_rejects_duplicates() {
        let mut market = Market::new();
        assert_eq!(market.register("alice", "abc123").unwrap().id, 1);
        assert!(matches!(market.register("alice", "abc123"), Err(MarketError::Conflict(_))));
        assert!(matches!(market.register("", "abc123"), Err(MarketError::BadRequest(_))));
        assert!(matches!(market.register("bob", "has space"), Err(MarketError::BadRequest(_))));
    }

    #[test]
    fn login_issues_token_that_authenticates() {
        let mut market = Market::new();
        market.register("alice", "abc123").unwrap();
        let (user, token) = market.login(1, "abc123").unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(market.authenticate(Some(token.as_str())), Ok(1));
        assert!(matches!(market.login(1, "wrong1"), Err(MarketError::Unauthorized(_))));
        assert!(matches!(market.authenticate(Some("nope")), Err(MarketError::Unauthorized(_))));
        assert!(matches!(market.authenticate(None), Err(MarketError::Unauthorized(_))));
    }

    #[test]
    fn login_by_name_finds_user() {
        let mut market = Market::new();
        market.register("alice", "abc123").unwrap();
        let (user, _) = market.login_by_name("alice", "abc123").unwrap();
        assert_eq!(user.id, 1);
        assert!(matches!(market.login_by_name("carol", "abc123"), Err(MarketError::NotFound(_))));
    }

    #[test]
    fn new_items_start_unlisted() {
        let mut market = Market::new();
        let id = market.add_item(1, listing("desk", 10)).unwrap();
        assert!(market.list(Listed::OnSale).is_empty());
        assert_eq!(market.list(Listed::Everything)[0].id, id);
        assert_eq!(market.item(id).unwrap().status, 1);
    }

    #[test]
    fn add_item_validation() {
        let mut market = Market::new();
        assert!(market.add_item(1, listing("desk", 0)).is_err());
        assert!(market.add_item(1, listing("", 10)).is_err());
        let mut big = listing("desk", 10);
        big.image = vec![0; MAX_IMAGE_BYTES + 1];
        assert!(market.add_item(1, big).is_err());
        let mut odd = listing("desk", 10);
        odd.category_id = 99;
        assert!(market.add_item(1, odd).is_err());
    }

    #[test]
    fn only_owner_can_sell_once() {
        let mut market = Market::new();
        let id = market.add_item(1, listing("desk", 10)).unwrap();
        assert!(matches!(market.sell(2, id), Err(MarketError::PreconditionFailed(_))));
        market.sell(1, id).unwrap();
        assert!(matches!(market.sell(1, id), Err(MarketError::PreconditionFailed(_))));
        assert_eq!(market.list(Listed::OnSale).len(), 1);
    }

    #[test]
    fn purchase_moves_money_and_marks_sold_out() {
        let (mut market, id) = market_with_sale(150);
        market.purchase(2, id).unwrap();
        assert_eq!(market.balance(2), Ok(50));
        assert_eq!(market.balance(1), Ok(100));
        assert_eq!(market.item(id).unwrap().status, 3);
        assert!(market.list(Listed::OnSale).is_empty());
        assert_eq!(market.list(Listed::OnSaleOrSoldOut).len(), 1);
    }

    #[test]
    fn purchase_rules() {
        let (mut market, id) = market_with_sale(50);
        assert_eq!(
            market.purchase(2, id),
            Err(MarketError::precondition("balance is not enough"))
        );
        market.add_balance(1, 500).unwrap();
        assert_eq!(
            market.purchase(1, id),
            Err(MarketError::precondition("can not buy own items"))
        );
        market.add_balance(2, 100).unwrap();
        market.purchase(2, id).unwrap();
        assert_eq!(
            market.purchase(2, id),
            Err(MarketError::precondition("item is not on sale"))
        );
    }

    #[test]
    fn top_up_past_i64_max_is_rejected() {
        let mut market = Market::new();
        market.register("alice", "abc123").unwrap();
        market.add_balance(1, i64::MAX).unwrap();
        assert_eq!(
            market.add_balance(1, 1),
            Err(MarketError::bad_request("balance overflow"))
        );
        assert_eq!(market.balance(1), Ok(i64::MAX));
    }

    #[test]
    fn overflowing_seller_credit_leaves_balances_untouched() {
        let (mut market, id) = market_with_sale(150);
        market.add_balance(1, i64::MAX).unwrap();
        assert_eq!(
            market.purchase(2, id),
            Err(MarketError::bad_request("balance overflow"))
        );
        assert_eq!(market.balance(1), Ok(i64::MAX));
        assert_eq!(market.balance(2), Ok(150));
        assert_eq!(market.item(id).unwrap().status, 2);
    }

    #[test]
    fn balance_top_up_must_be_positive() {
        let (mut market, _) = market_with_sale(0);
        assert!(matches!(market.add_balance(2, 0), Err(MarketError::BadRequest(_))));
        assert!(matches!(market.add_balance(2, -5), Err(MarketError::BadRequest(_))));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let (market, id) = market_with_sale(0);
        assert_eq!(market.search("APP")[0].id, id);
        assert!(market.search("pear").is_empty());
    }

    #[test]
    fn listings_show_most_recent_first() {
        let mut market = Market::new();
        let first = market.add_item(1, listing("a", 1)).unwrap();
        let second = market.add_item(1, listing("b", 1)).unwrap();
        market.sell(1, second).unwrap();
        market.sell(1, first).unwrap();
        let ids: Vec<i64> = market.list(Listed::OnSale).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn description_is_at_most_fifteen_words() {
        let text = describe("desk", "one two three four five six seven eight nine ten eleven twelve");
        assert!(text.starts_with("Lovely desk"));
        assert_eq!(text.split_whitespace().count(), 15);
    }
}
