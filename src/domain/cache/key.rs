//! Cache key layout

use crate::domain::user::UserId;

/// Namespace for cached user records
pub const USER_NAMESPACE: &str = "user";

/// Builds `namespace:id` keys
pub fn namespaced_key(namespace: &str, id: &str) -> String {
    format!("{}:{}", namespace, id)
}

/// Key under which a user record is cached
pub fn user_key(id: &UserId) -> String {
    namespaced_key(USER_NAMESPACE, id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key() {
        let id = UserId::new("u1").unwrap();
        assert_eq!(user_key(&id), "user:u1");
    }

    #[test]
    fn test_namespaced_key() {
        assert_eq!(namespaced_key("session", "abc"), "session:abc");
    }
}
