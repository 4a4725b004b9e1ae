use mercari_core::{Blob, CookieStore, Item, ItemId, Transport};

use super::{gated, not_found};
use crate::app::Storefront;

pub struct ItemDetail {
    id: ItemId,
    item: Option<Item>,
    image: Option<Blob>,
    loading: bool,
}

impl ItemDetail {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            item: None,
            image: None,
            loading: false,
        }
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn image(&self) -> Option<&Blob> {
        self.image.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sold-out items cannot be bought; the button stays disabled.
    pub fn can_purchase(&self) -> bool {
        self.item.as_ref().is_some_and(|item| !item.is_sold_out())
    }

    /// Fetch the record and its image. Each failure is reported on its own;
    /// the loading flag is cleared either way.
    pub fn load<T: Transport, C: CookieStore>(&mut self, app: &mut Storefront<T, C>) {
        self.loading = true;
        match app.api().item(self.id) {
            Ok(item) => self.item = Some(item),
            Err(err) => app.report(&err),
        }
        match app.api().item_image(self.id) {
            Ok(blob) => self.image = Some(blob),
            Err(err) => app.report(&err),
        }
        self.loading = false;
    }

    /// Buy the item as the signed-in user, then reload it.
    pub fn purchase<T: Transport, C: CookieStore>(&mut self, app: &mut Storefront<T, C>) -> bool {
        if !self.can_purchase() {
            app.toasts_mut().info("This item is sold out");
            return false;
        }
        let Some(user_id) = app.user_id() else {
            app.toasts_mut().error("Log in to purchase items");
            return false;
        };

        self.loading = true;
        let result = app.api().purchase(self.id, user_id);
        self.loading = false;
        match result {
            Ok(()) => {
                app.toasts_mut().success("Purchased!");
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
        let access = app.gate().check_with(|| self.item.is_some());
        let content = match &self.item {
            Some(item) => {
                let button = if item.is_sold_out() { "[SoldOut]" } else { "[Purchase]" };
                let image = match &self.image {
                    Some(blob) => format!(
                        "{} bytes ({})",
                        blob.len(),
                        blob.content_type.as_deref().unwrap_or("unknown type")
                    ),
                    None => "not loaded".to_string(),
                };
                format!(
                    "Item Name: {}\nPrice: {}\nUserID: {}\nCategory: {}\nDescription: {}\nImage: {image}\n{button}",
                    item.name, item.price, item.user_id, item.category_name, item.description
                )
            }
            None => String::new(),
        };
        gated(access, app.identity(), content, not_found())
    }
}
