//! Domain DTOs for the marketplace API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any drift between the two crates. Listing
//! endpoints return trimmed item records (a user's items carry no owner or
//! description), so the optional columns of `Item` default when absent.

use std::fmt;

use serde::{Deserialize, Serialize};

pub type ItemId = i64;
pub type UserId = i64;

/// Lifecycle of an item. Travels on the wire as 1, 2, 3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ItemStatus {
    #[default]
    Initial,
    OnSale,
    SoldOut,
}

impl From<ItemStatus> for u8 {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Initial => 1,
            ItemStatus::OnSale => 2,
            ItemStatus::SoldOut => 3,
        }
    }
}

impl TryFrom<u8> for ItemStatus {
    type Error = UnknownStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ItemStatus::Initial),
            2 => Ok(ItemStatus::OnSale),
            3 => Ok(ItemStatus::SoldOut),
            other => Err(UnknownStatus(other)),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Initial => f.write_str("initial"),
            ItemStatus::OnSale => f.write_str("on sale"),
            ItemStatus::SoldOut => f.write_str("sold out"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown item status {0}")]
pub struct UnknownStatus(pub u8);

/// A listed item as returned by the item endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub category_id: i64,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub user_id: UserId,
    pub price: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ItemStatus,
}

impl Item {
    pub fn is_sold_out(&self) -> bool {
        self.status == ItemStatus::SoldOut
    }
}

/// Reference data for the listing form's category selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Which item listing endpoint to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ItemFeed {
    /// `/items`: items currently on sale.
    #[default]
    OnSale,
    /// `/items_sold`: on-sale and sold-out items.
    WithSoldOut,
    /// `/items_all`: every item, including unpublished ones.
    All,
}

impl ItemFeed {
    pub fn path(self) -> &'static str {
        match self {
            ItemFeed::OnSale => "/items",
            ItemFeed::WithSoldOut => "/items_sold",
            ItemFeed::All => "/items_all",
        }
    }
}

/// Request payload for `/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginById {
    pub user_id: UserId,
    pub password: String,
}

/// Request payload for `/login_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginByName {
    pub user_name: String,
    pub password: String,
}

/// Request payload for `/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Register {
    pub name: String,
    pub password: String,
}

/// Response of `/login` and `/login_name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub name: String,
    pub token: String,
}

/// Response of `/register`. Registration does not issue a token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredUser {
    pub id: UserId,
    pub name: String,
}

/// An image file attached to a listing submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Form fields of a listing submission (`POST /items`, multipart).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category_id: i64,
    pub price: i64,
    pub description: String,
    pub image: ImageFile,
}

/// Response of `POST /items`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemCreated {
    pub id: ItemId,
}

/// Request payload for `/sell`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SellRequest {
    pub item_id: ItemId,
}

/// Request payload for `/purchase/{id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub user_id: UserId,
}

/// Request payload for `/description`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionRequest {
    pub name: String,
    pub description: String,
}

/// Response of `GET /balance`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    pub balance: i64,
}

/// Request payload for `POST /balance`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AddBalance {
    pub balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_travels_as_one_based_number() {
        assert_eq!(serde_json::to_value(ItemStatus::Initial).unwrap(), 1);
        assert_eq!(serde_json::to_value(ItemStatus::SoldOut).unwrap(), 3);
        let status: ItemStatus = serde_json::from_str("2").unwrap();
        assert_eq!(status, ItemStatus::OnSale);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<ItemStatus>("0").is_err());
        assert!(serde_json::from_str::<ItemStatus>("4").is_err());
    }

    #[test]
    fn trimmed_user_item_record_decodes() {
        let item: Item = serde_json::from_str(
            r#"{"id":7,"name":"desk","price":1200,"category_name":"furniture","status":3}"#,
        )
        .unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.user_id, 0);
        assert!(item.description.is_empty());
        assert!(item.is_sold_out());
    }

    #[test]
    fn full_item_record_decodes() {
        let item: Item = serde_json::from_str(
            r#"{"id":1,"name":"apple","category_id":1,"category_name":"food","user_id":4,
                "price":100,"description":"fresh","status":2}"#,
        )
        .unwrap();
        assert_eq!(item.category_id, 1);
        assert_eq!(item.user_id, 4);
        assert_eq!(item.status, ItemStatus::OnSale);
        assert!(!item.is_sold_out());
    }

    #[test]
    fn feeds_map_to_their_endpoints() {
        assert_eq!(ItemFeed::OnSale.path(), "/items");
        assert_eq!(ItemFeed::WithSoldOut.path(), "/items_sold");
        assert_eq!(ItemFeed::All.path(), "/items_all");
    }
}
