use mercari_core::{CookieStore, ItemQuery, Transport, UserId};

use super::{gated, item_list, not_found};
use crate::app::Storefront;

pub struct UserProfile {
    user_id: UserId,
    balance: Option<i64>,
    loading: bool,
}

impl UserProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            balance: None,
            loading: false,
        }
    }

    pub fn balance(&self) -> Option<i64> {
        self.balance
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load<T: Transport, C: CookieStore>(&mut self, app: &mut Storefront<T, C>) {
        self.loading = true;
        let query = ItemQuery::User(self.user_id);
        let ticket = app.items_mut().begin(query);
        match app.api().user_items(self.user_id) {
            Ok(items) => {
                app.items_mut().commit(ticket, items);
            }
            Err(err) => app.report(&err),
        }
        match app.api().balance() {
            Ok(balance) => self.balance = Some(balance),
            Err(err) => app.report(&err),
        }
        self.loading = false;
    }

    /// Top up the balance, then reload the page state.
    pub fn add_balance<T: Transport, C: CookieStore>(
        &mut self,
        app: &mut Storefront<T, C>,
        amount: i64,
    ) -> bool {
        if amount <= 0 {
            app.toasts_mut().error("Please enter a number greater than 0");
            return false;
        }
        match app.api().add_balance(amount) {
            Ok(()) => {
                self.load(app);
                true
            }
            Err(err) => {
                app.report(&err);
                false
            }
        }
    }

    pub fn render<T: Transport, C: CookieStore>(&self, app: &Storefront<T, C>) -> String {
        let balance = self
            .balance
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string());
        let content = format!(
            "Balance: {balance}\nItem List\n{}",
            item_list(app.items().items(&ItemQuery::User(self.user_id)))
        );
        gated(app.gate().check(), app.identity(), content, not_found())
    }
}
