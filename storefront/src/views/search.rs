use mercari_core::{CookieStore, ItemQuery, Transport};

use super::{gated, item_list, not_found};
use crate::app::Storefront;
use crate::cookies::SEARCH_RESULT_COOKIE;

/// Keyword search. Each keyword is its own result set, so a search never
/// overwrites the home feed, and a superseded request cannot commit.
#[derive(Debug, Default)]
pub struct Search {
    keyword: Option<String>,
    loading: bool,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Run a search for `keyword`, remembering it for the next visit.
    pub fn run<T: Transport, C: CookieStore>(&mut self, app: &mut Storefront<T, C>, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.keyword = None;
            return false;
        }
        self.keyword = Some(keyword.to_string());
        if let Err(err) = app.cookies_mut().set(SEARCH_RESULT_COOKIE, keyword) {
            app.report_cookies(&err);
        }

        self.loading = true;
        let ticket = app.items_mut().begin(ItemQuery::Search(keyword.to_string()));
        let committed = match app.api().search(keyword) {
            Ok(items) => app.items_mut().commit(ticket, items),
            Err(err) => {
                app.report(&err);
                false
            }
        };
        self.loading = false;
        committed
    }

    /// Repeat the last remembered search, if any.
    pub fn resume<T: Transport, C: CookieStore>(&mut self, app: &mut Storefront<T, C>) -> bool {
        match app.cookies().get(SEARCH_RESULT_COOKIE) {
            Some(keyword) => self.run(app, &keyword),
            None => false,
        }
    }

    pub fn render<T: Transport, C: CookieStore>(&self, app: &Storefront<T, C>) -> String {
        if self.loading {
            return "Loading...".to_string();
        }
        let Some(keyword) = &self.keyword else {
            return "No search result.".to_string();
        };
        let query = ItemQuery::Search(keyword.clone());
        if !app.items().contains(&query) {
            return "No search result.".to_string();
        }
        let content = format!(
            "Results for \"{keyword}\"\n{}",
            item_list(app.items().items(&query))
        );
        gated(app.gate().check(), app.identity(), content, not_found())
    }
}
