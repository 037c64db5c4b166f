//! Bearer-token claims (spec §3 "User claim", §4.M).

/// Claims derived from a verified bearer token. Owned by the authoring
/// service; the redirect service only ever consumes it read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        let claims = Claims { user_id: 1, email: "a@b.com".to_string(), role: "admin".to_string() };
        assert!(claims.is_admin());

        let claims = Claims { user_id: 1, email: "a@b.com".to_string(), role: "user".to_string() };
        assert!(!claims.is_admin());
    }
}
