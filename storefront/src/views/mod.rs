//! Text renderings of the storefront screens.
//!
//! Each view keeps its own local state (form drafts, loading flags, fetched
//! records), performs its calls against a borrowed `Storefront`, and renders
//! to a `String`. Protected content always goes through the session gate.

pub mod chrome;
pub mod home;
pub mod item_detail;
pub mod listing;
pub mod login;
pub mod search;
pub mod signup;
pub mod user_profile;

use std::fmt::Write as _;

use mercari_core::{Access, Identity, Item};

pub use chrome::{footer, header, not_found, sign_in_prompt};
pub use home::Home;
pub use item_detail::ItemDetail;
pub use listing::{Listing, ListingDraft};
pub use login::{Credentials, Login};
pub use search::Search;
pub use signup::{Signup, SignupForm, SignupInvalid};
pub use user_profile::UserProfile;

/// Wrap `content` in the gate decision: open renders the content plus the
/// footer, anything else renders `fallback`.
pub fn gated(access: Access, identity: &Identity, content: String, fallback: String) -> String {
    match access {
        Access::Open => {
            let mut out = content;
            if let Some(footer) = footer(identity) {
                out.push('\n');
                out.push_str(&footer);
            }
            out
        }
        Access::Fallback => fallback,
    }
}

pub fn item_line(item: &Item) -> String {
    let mut line = format!("#{:<4} {:<24} {:>8}", item.id, item.name, item.price);
    if !item.category_name.is_empty() {
        let _ = write!(line, "  [{}]", item.category_name);
    }
    let _ = write!(line, "  {}", item.status);
    line
}

pub fn item_list(items: &[Item]) -> String {
    if items.is_empty() {
        return "No items.".to_string();
    }
    items.iter().map(item_line).collect::<Vec<_>>().join("\n")
}
