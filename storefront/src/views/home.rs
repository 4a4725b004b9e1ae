use mercari_core::{AuthState, CookieStore, ItemFeed, ItemQuery, Transport};

use super::{gated, item_list, not_found, sign_in_prompt};
use crate::app::Storefront;

/// Landing page: the item feed for signed-in users, sign-up/login
/// otherwise.
#[derive(Debug, Default)]
pub struct Home {
    feed: ItemFeed,
    loading: bool,
}

impl Home {
    pub fn new(feed: ItemFeed) -> Self {
        Self {
            feed,
            loading: false,
        }
    }

    pub fn feed(&self) -> ItemFeed {
        self.feed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the feed into the shared collection. Returns whether the
    /// result was committed.
    pub fn load<T: Transport, C: CookieStore>(&mut self, app: &mut Storefront<T, C>) -> bool {
        self.loading = true;
        let ticket = app.items_mut().begin(ItemQuery::Feed(self.feed));
        let committed = match app.api().items(self.feed) {
            Ok(items) => app.items_mut().commit(ticket, items),
            Err(err) => {
                app.report(&err);
                false
            }
        };
        self.loading = false;
        committed
    }

    pub fn render<T: Transport, C: CookieStore>(&self, app: &Storefront<T, C>) -> String {
        if app.identity().state() == AuthState::Anonymous {
            return sign_in_prompt();
        }
        if self.loading {
            return "Loading...".to_string();
        }
        let user_id = app
            .user_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        let content = format!(
            "Logged in User ID: {user_id}\n{}",
            item_list(app.items().items(&ItemQuery::Feed(self.feed)))
        );
        gated(app.gate().check(), app.identity(), content, not_found())
    }
}
