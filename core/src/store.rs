//! Shared item collection, keyed by the query that produced each result set.
//!
//! # Design
//! Every write replaces a result set wholesale; there is no merging. Result
//! sets are keyed by query so a search cannot clobber the home feed.
//!
//! Fetches that may be superseded go through a `FetchTicket`: `begin` bumps
//! the query's generation, and `commit` drops results carrying an older
//! generation. A response that settles after the user has already asked for
//! something newer therefore never overwrites the newer state.

use std::collections::HashMap;

use crate::types::{Item, ItemFeed, UserId};

/// The query a result set answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemQuery {
    Feed(ItemFeed),
    Search(String),
    User(UserId),
}

/// Proof that a fetch was started; needed to commit its result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
    query: ItemQuery,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct ItemCollection {
    results: HashMap<ItemQuery, Vec<Item>>,
    generations: HashMap<ItemQuery, u64>,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current result set for `query`; empty if nothing was written yet.
    pub fn items(&self, query: &ItemQuery) -> &[Item] {
        self.results.get(query).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, query: &ItemQuery) -> bool {
        self.results.contains_key(query)
    }

    /// Overwrite the result set for `query`, bypassing tickets.
    pub fn replace(&mut self, query: ItemQuery, items: Vec<Item>) {
        self.results.insert(query, items);
    }

    /// Start a fetch. Any ticket previously issued for the same query
    /// becomes stale.
    pub fn begin(&mut self, query: ItemQuery) -> FetchTicket {
        let generation = self.generations.entry(query.clone()).or_insert(0);
        *generation += 1;
        FetchTicket {
            generation: *generation,
            query,
        }
    }

    /// Store a fetch result if its ticket is still the latest for the
    /// query. Returns whether the result was kept.
    pub fn commit(&mut self, ticket: FetchTicket, items: Vec<Item>) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(query = ?ticket.query, "discarding stale result");
            return false;
        }
        self.results.insert(ticket.query, items);
        true
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.generations.get(&ticket.query) == Some(&ticket.generation)
    }

    /// Invalidate any in-flight fetch for `query` without writing.
    pub fn cancel(&mut self, query: &ItemQuery) {
        if let Some(generation) = self.generations.get_mut(query) {
            *generation += 1;
        }
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemStatus;

    fn item(id: i64, name: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
            category_id: 1,
            category_name: "food".to_string(),
            user_id: 1,
            price: 100,
            description: String::new(),
            status: ItemStatus::OnSale,
        }
    }

    const HOME: ItemQuery = ItemQuery::Feed(ItemFeed::OnSale);

    #[test]
    fn second_write_replaces_first() {
        let mut store = ItemCollection::new();
        store.replace(HOME, vec![item(1, "apple"), item(2, "pear")]);
        store.replace(HOME, vec![item(3, "plum")]);
        assert_eq!(store.items(&HOME), &[item(3, "plum")]);
    }

    #[test]
    fn unknown_query_reads_empty() {
        let store = ItemCollection::new();
        assert!(store.items(&HOME).is_empty());
        assert!(!store.contains(&HOME));
    }

    #[test]
    fn queries_do_not_clobber_each_other() {
        let mut store = ItemCollection::new();
        store.replace(HOME, vec![item(1, "apple")]);
        store.replace(ItemQuery::Search("pear".to_string()), vec![item(2, "pear")]);
        assert_eq!(store.items(&HOME), &[item(1, "apple")]);
    }

    #[test]
    fn stale_ticket_cannot_commit() {
        let mut store = ItemCollection::new();
        let first = store.begin(HOME);
        let second = store.begin(HOME);

        assert!(store.commit(second, vec![item(2, "new")]));
        assert!(!store.commit(first, vec![item(1, "old")]));
        assert_eq!(store.items(&HOME), &[item(2, "new")]);
    }

    #[test]
    fn tickets_are_per_query() {
        let mut store = ItemCollection::new();
        let home = store.begin(HOME);
        let search = store.begin(ItemQuery::Search("a".to_string()));
        assert!(store.commit(search, vec![item(1, "a")]));
        assert!(store.commit(home, vec![item(2, "b")]));
    }

    #[test]
    fn cancel_invalidates_in_flight_fetch() {
        let mut store = ItemCollection::new();
        let ticket = store.begin(HOME);
        store.cancel(&HOME);
        assert!(!store.is_current(&ticket));
        assert!(!store.commit(ticket, vec![item(1, "late")]));
        assert!(!store.contains(&HOME));
    }
}
