use mercari_core::{CookieStore, Transport};
use thiserror::Error;

use crate::app::Storefront;

const MIN_NAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;
const CONFLICT: u16 = 409;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignupInvalid {
    #[error("user name must be at least 3 characters")]
    NameTooShort,
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
    #[error("password must contain a number")]
    PasswordNeedsDigit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), SignupInvalid> {
        if self.name.chars().count() < MIN_NAME_LEN {
            return Err(SignupInvalid::NameTooShort);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SignupInvalid::PasswordTooShort);
        }
        if !self.password.chars().any(|c| c.is_ascii_digit()) {
            return Err(SignupInvalid::PasswordNeedsDigit);
        }
        Ok(())
    }

    /// Whether the submit button is enabled.
    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }
}

#[derive(Debug, Default)]
pub struct Signup {
    loading: bool,
}

impl Signup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Register, then log in with the new id so both session fields exist.
    pub fn submit<T: Transport, C: CookieStore>(
        &mut self,
        app: &mut Storefront<T, C>,
        form: &SignupForm,
    ) -> bool {
        if let Err(invalid) = form.validate() {
            app.toasts_mut().error(invalid.to_string());
            return false;
        }

        self.loading = true;
        let registered = app.api().register(&form.name, &form.password);
        let user = match registered {
            Ok(registered) => app.api().login(registered.id, &form.password),
            Err(err) => Err(err),
        };
        self.loading = false;

        let user = match user {
            Ok(user) => user,
            Err(err) if err.status() == Some(CONFLICT) => {
                tracing::warn!(name = %form.name, "user name already taken");
                app.toasts_mut().error("This User Name is already used");
                return false;
            }
            Err(err) => {
                app.report(&err);
                return false;
            }
        };
        match app.sign_in(&user) {
            Ok(session) => {
                app.toasts_mut()
                    .success(format!("New account is created! Your user id is {}", session.user_id));
                true
            }
            Err(err) => {
                app.report_cookies(&err);
                false
            }
        }
    }
}
