use std::fmt::Write as _;

use mercari_core::{
    Category, CookieStore, ImageFile, ItemFeed, ItemId, ItemQuery, NewItem, Transport,
};

use super::{gated, sign_in_prompt};
use crate::app::Storefront;

/// Uncommitted listing input. Category defaults to the first seeded one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub name: String,
    pub category_id: i64,
    pub price: i64,
    pub description: String,
    pub image: Option<ImageFile>,
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            category_id: 1,
            price: 0,
            description: String::new(),
            image: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Listing {
    categories: Vec<Category>,
    draft: ListingDraft,
    loading: bool,
}

impl Listing {
    pub fn new(draft: ListingDraft) -> Self {
        Self {
            draft,
            ..Self::default()
        }
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ListingDraft {
        &mut self.draft
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_categories<T: Transport, C: CookieStore>(&mut self, app: &mut Storefront<T, C>) {
        match app.api().categories() {
            Ok(categories) => self.categories = categories,
            Err(err) => app.report(&err),
        }
    }

    /// Replace the draft description with a server-generated one.
    pub fn suggest_description<T: Transport, C: CookieStore>(
        &mut self,
        app: &mut Storefront<T, C>,
    ) -> bool {
        self.loading = true;
        let result = app
            .api()
            .describe(&self.draft.name, &self.draft.description);
        self.loading = false;
        match result {
            Ok(text) => {
                self.draft.description = text;
                true
            }
            Err(err) => {
                app.report(&err);
                false
            }
        }
    }

    /// Create the item, then publish it. The draft is discarded on success.
    pub fn submit<T: Transport, C: CookieStore>(
        &mut self,
        app: &mut Storefront<T, C>,
    ) -> Option<ItemId> {
        let Some(image) = self.draft.image.clone() else {
            app.toasts_mut().error("An image is required");
            return None;
        };
        let input = NewItem {
            name: self.draft.name.clone(),
            category_id: self.draft.category_id,
            price: self.draft.price,
            description: self.draft.description.clone(),
            image,
        };

        self.loading = true;
        let result = app
            .api()
            .add_item(&input)
            .and_then(|id| app.api().sell(id).map(|()| id));
        self.loading = false;

        match result {
            Ok(id) => {
                self.draft = ListingDraft::default();
                app.items_mut().cancel(&ItemQuery::Feed(ItemFeed::OnSale));
                app.toasts_mut().success("Item added successfully!");
                tracing::info!(item_id = id, "listing published");
                Some(id)
            }
            Err(err) => {
                app.report(&err);
                None
            }
        }
    }

    pub fn render<T: Transport, C: CookieStore>(&self, app: &Storefront<T, C>) -> String {
        let mut content = String::from("Listing\n");
        for category in &self.categories {
            let marker = if category.id == self.draft.category_id { '*' } else { ' ' };
            let _ = writeln!(content, " {marker} {}: {}", category.id, category.name);
        }
        let _ = write!(
            content,
            "name: {}\nprice: {}\ndescription: {}",
            self.draft.name, self.draft.price, self.draft.description
        );
        gated(app.gate().check(), app.identity(), content, sign_in_prompt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_defaults_to_first_category() {
        let draft = ListingDraft::default();
        assert_eq!(draft.category_id, 1);
        assert!(draft.image.is_none());
    }
}
