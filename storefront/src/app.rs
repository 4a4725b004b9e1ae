//! Application state shared by every view.
//!
//! `Storefront` owns the API client, the cookie store, the loaded identity,
//! the keyed item collection and the toast queue. Views borrow it mutably
//! for the duration of one action and never hold on to it.

use mercari_core::{
    ApiClient, ApiError, AuthUser, CookieError, CookieStore, Gate, Identity, ItemCollection,
    Session, Transport, UserId,
};

use crate::toast::Toasts;

pub struct Storefront<T, C> {
    api: ApiClient<T>,
    cookies: C,
    identity: Identity,
    items: ItemCollection,
    toasts: Toasts,
}

impl<T: Transport, C: CookieStore> Storefront<T, C> {
    /// Restore whatever identity the cookies hold and arm the client with it.
    pub fn new(mut api: ApiClient<T>, cookies: C) -> Self {
        let identity = Identity::load(&cookies);
        api.set_session(identity.session().as_ref());
        tracing::debug!(state = ?identity.state(), "restored identity");
        Self {
            api,
            cookies,
            identity,
            items: ItemCollection::new(),
            toasts: Toasts::new(),
        }
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.identity.user_id
    }

    pub fn gate(&self) -> Gate<'_> {
        Gate::new(&self.identity)
    }

    pub fn cookies(&self) -> &C {
        &self.cookies
    }

    pub fn cookies_mut(&mut self) -> &mut C {
        &mut self.cookies
    }

    pub fn items(&self) -> &ItemCollection {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut ItemCollection {
        &mut self.items
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    /// Anonymous -> Authenticated: persist both halves of the session.
    pub fn sign_in(&mut self, user: &AuthUser) -> Result<Session, CookieError> {
        let session = Session::from(user);
        session.persist(&mut self.cookies)?;
        self.api.set_session(Some(&session));
        self.identity = Identity::from(&session);
        tracing::info!(user_id = session.user_id, "signed in");
        Ok(session)
    }

    /// Authenticated -> Anonymous. Cached result sets go with the session.
    pub fn logout(&mut self) -> Result<(), CookieError> {
        self.identity.clear(&mut self.cookies)?;
        self.api.clear_session();
        self.items.clear();
        tracing::info!("logged out");
        Ok(())
    }

    /// Surface a failed call as an error toast. All failure kinds look the
    /// same to the user.
    pub fn report(&mut self, err: &ApiError) {
        tracing::warn!(error = %err, "request failed");
        self.toasts.error(err.to_string());
    }

    pub fn report_cookies(&mut self, err: &CookieError) {
        tracing::warn!(error = %err, "cookie storage failed");
        self.toasts.error(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercari_core::session::{TOKEN_COOKIE, USER_ID_COOKIE};
    use mercari_core::{AuthState, HttpRequest, HttpResponse, MemoryCookies, TransportError};

    fn offline() -> impl Fn(HttpRequest) -> Result<HttpResponse, TransportError> {
        |_req| Err(TransportError::new("offline"))
    }

    #[test]
    fn restores_identity_from_cookies() {
        let mut cookies = MemoryCookies::default();
        cookies.set(USER_ID_COOKIE, "3").unwrap();
        cookies.set(TOKEN_COOKIE, "tok").unwrap();

        let app = Storefront::new(ApiClient::new("http://x", offline()), cookies);
        assert_eq!(app.identity().state(), AuthState::Authenticated);
        assert_eq!(app.api().client().token(), Some("tok"));
    }

    #[test]
    fn sign_in_then_logout_round_trips_cookies() {
        let mut app = Storefront::new(ApiClient::new("http://x", offline()), MemoryCookies::default());
        assert!(!app.gate().check().is_open());

        app.sign_in(&AuthUser {
            id: 9,
            name: "alice".to_string(),
            token: "t".to_string(),
        })
        .unwrap();
        assert!(app.gate().check().is_open());
        assert_eq!(app.cookies().get(USER_ID_COOKIE).as_deref(), Some("9"));

        app.logout().unwrap();
        assert!(!app.gate().check().is_open());
        assert_eq!(app.cookies().get(TOKEN_COOKIE), None);
        assert_eq!(app.api().client().token(), None);
    }

    #[test]
    fn report_queues_error_toast() {
        let mut app = Storefront::new(ApiClient::new("http://x", offline()), MemoryCookies::default());
        let err = app.api().categories().unwrap_err();
        app.report(&err);
        assert_eq!(app.toasts().pending()[0].message, "offline");
    }
}
