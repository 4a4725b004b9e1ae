//! Client-held identity and the authentication gate.
//!
//! # Design
//! The persisted identity is two cookie-like entries, `userID` and `token`.
//! A `Session` exists only when both are present. Tokens are never
//! inspected client-side: an expired or forged token is only discovered when
//! an authorized call comes back 401.
//!
//! The gate is a pure decision over the identity plus an optional
//! view-supplied predicate, re-evaluated on every render.

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{AuthUser, UserId};

pub const USER_ID_COOKIE: &str = "userID";
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("cookie storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("cookie storage is corrupt: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Client-side persisted key-value storage.
pub trait CookieStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), CookieError>;
    fn remove(&mut self, key: &str) -> Result<(), CookieError>;
}

/// Cookie storage that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookies {
    entries: HashMap<String, String>,
}

impl CookieStore for MemoryCookies {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CookieError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), CookieError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Proof of identity: both halves present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub token: String,
}

impl Session {
    pub fn persist(&self, cookies: &mut impl CookieStore) -> Result<(), CookieError> {
        cookies.set(USER_ID_COOKIE, &self.user_id.to_string())?;
        cookies.set(TOKEN_COOKIE, &self.token)
    }
}

impl From<&AuthUser> for Session {
    fn from(user: &AuthUser) -> Self {
        Self {
            user_id: user.id,
            token: user.token.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

/// Whatever identity fields are currently persisted, complete or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<UserId>,
    pub token: Option<String>,
}

impl Identity {
    /// Read the identity cookies. Unparseable or empty values count as absent.
    pub fn load(cookies: &impl CookieStore) -> Self {
        let user_id = cookies
            .get(USER_ID_COOKIE)
            .and_then(|raw| raw.trim().parse().ok());
        let token = cookies.get(TOKEN_COOKIE).filter(|t| !t.is_empty());
        Self { user_id, token }
    }

    pub fn session(&self) -> Option<Session> {
        match (self.user_id, &self.token) {
            (Some(user_id), Some(token)) => Some(Session {
                user_id,
                token: token.clone(),
            }),
            _ => None,
        }
    }

    pub fn state(&self) -> AuthState {
        if self.session().is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    /// Logout: drop both cookies.
    pub fn clear(&mut self, cookies: &mut impl CookieStore) -> Result<(), CookieError> {
        cookies.remove(USER_ID_COOKIE)?;
        cookies.remove(TOKEN_COOKIE)?;
        *self = Identity::default();
        Ok(())
    }
}

impl From<&Session> for Identity {
    fn from(session: &Session) -> Self {
        Self {
            user_id: Some(session.user_id),
            token: Some(session.token.clone()),
        }
    }
}

/// Outcome of a gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Open,
    Fallback,
}

impl Access {
    pub fn is_open(self) -> bool {
        self == Access::Open
    }
}

/// Decides whether a protected view renders its content.
#[derive(Debug, Clone, Copy)]
pub struct Gate<'a> {
    identity: &'a Identity,
}

impl<'a> Gate<'a> {
    pub fn new(identity: &'a Identity) -> Self {
        Self { identity }
    }

    pub fn check(&self) -> Access {
        self.check_with(|| true)
    }

    /// Open only if the identity is complete and `condition` holds. The
    /// condition is not evaluated for an incomplete identity.
    pub fn check_with(&self, condition: impl FnOnce() -> bool) -> Access {
        if self.identity.state() == AuthState::Authenticated && condition() {
            Access::Open
        } else {
            Access::Fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn signed_in() -> Identity {
        Identity {
            user_id: Some(1),
            token: Some("t".to_string()),
        }
    }

    #[test]
    fn missing_identity_always_falls_back() {
        let anonymous = Identity::default();
        let only_id = Identity {
            user_id: Some(1),
            token: None,
        };
        let only_token = Identity {
            user_id: None,
            token: Some("t".to_string()),
        };
        for identity in [&anonymous, &only_id, &only_token] {
            assert_eq!(Gate::new(identity).check(), Access::Fallback);
            assert_eq!(Gate::new(identity).check_with(|| true), Access::Fallback);
            assert_eq!(Gate::new(identity).check_with(|| false), Access::Fallback);
        }
    }

    #[test]
    fn predicate_decides_for_complete_identity() {
        let identity = signed_in();
        assert_eq!(Gate::new(&identity).check(), Access::Open);
        assert_eq!(Gate::new(&identity).check_with(|| true), Access::Open);
        assert_eq!(Gate::new(&identity).check_with(|| false), Access::Fallback);
    }

    #[test]
    fn predicate_skipped_without_identity() {
        let calls = Cell::new(0);
        let identity = Identity::default();
        Gate::new(&identity).check_with(|| {
            calls.set(calls.get() + 1);
            true
        });
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn session_roundtrips_through_cookies() {
        let mut cookies = MemoryCookies::default();
        assert_eq!(Identity::load(&cookies).state(), AuthState::Anonymous);

        let session = Session {
            user_id: 12,
            token: "jwt".to_string(),
        };
        session.persist(&mut cookies).unwrap();
        let mut identity = Identity::load(&cookies);
        assert_eq!(identity.session(), Some(session));
        assert_eq!(identity.state(), AuthState::Authenticated);

        identity.clear(&mut cookies).unwrap();
        assert_eq!(identity, Identity::default());
        assert_eq!(Identity::load(&cookies).state(), AuthState::Anonymous);
    }

    #[test]
    fn garbage_user_id_is_absent() {
        let mut cookies = MemoryCookies::default();
        cookies.set(USER_ID_COOKIE, "abc").unwrap();
        cookies.set(TOKEN_COOKIE, "t").unwrap();
        let identity = Identity::load(&cookies);
        assert_eq!(identity.user_id, None);
        assert_eq!(identity.session(), None);
    }

    #[test]
    fn empty_token_is_absent() {
        let mut cookies = MemoryCookies::default();
        cookies.set(USER_ID_COOKIE, "3").unwrap();
        cookies.set(TOKEN_COOKIE, "").unwrap();
        assert_eq!(Identity::load(&cookies).state(), AuthState::Anonymous);
    }
}
