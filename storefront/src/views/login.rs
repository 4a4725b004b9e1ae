use mercari_core::{CookieStore, Transport, UserId};

use crate::app::Storefront;

/// Who is logging in: `/login` takes a user id, `/login_name` a user name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Id { user_id: UserId, password: String },
    Name { user_name: String, password: String },
}

#[derive(Debug, Default)]
pub struct Login {
    loading: bool,
}

impl Login {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Exchange credentials for a session and persist it.
    pub fn submit<T: Transport, C: CookieStore>(
        &mut self,
        app: &mut Storefront<T, C>,
        credentials: &Credentials,
    ) -> bool {
        self.loading = true;
        let result = match credentials {
            Credentials::Id { user_id, password } => app.api().login(*user_id, password),
            Credentials::Name {
                user_name,
                password,
            } => app.api().login_by_name(user_name, password),
        };
        self.loading = false;

        let user = match result {
            Ok(user) => user,
            Err(err) => {
                app.report(&err);
                return false;
            }
        };
        match app.sign_in(&user) {
            Ok(_) => {
                app.toasts_mut().success("Signed in!");
                true
            }
            Err(err) => {
                app.report_cookies(&err);
                false
            }
        }
    }

    pub fn render<T: Transport, C: CookieStore>(&self, app: &Storefront<T, C>) -> String {
        match app.user_id() {
            Some(id) if app.gate().check().is_open() => format!("Logged in as user {id}"),
            _ => "Log in with a user id or user name and password.".to_string(),
        }
    }
}
