use mercari_core::Identity;

pub fn header(identity: &Identity) -> String {
    match identity.user_id {
        Some(id) => format!("Simple Mercari  (user {id})  [logout]"),
        None => "Simple Mercari".to_string(),
    }
}

/// Navigation links. Hidden until a user id is known.
pub fn footer(identity: &Identity) -> Option<String> {
    identity
        .user_id
        .map(|id| format!("Home: /  |  Listing: /sell  |  MyPage: /user/{id}"))
}

pub fn not_found() -> String {
    "404: Page Not Found".to_string()
}

pub fn sign_in_prompt() -> String {
    "Signup: mercari signup <name> <password>\nLogin:  mercari login <user-id> <password>".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_chrome_has_no_footer() {
        let identity = Identity::default();
        assert_eq!(footer(&identity), None);
        assert!(!header(&identity).contains("logout"));
    }
}
