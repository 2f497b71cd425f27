//! Users are owned by an external store; this crate only carries their identifier.
use serde::{Deserialize, Serialize};

/// A unique, stable identifier for a user in the external user store.
/// Treat as opaque: the store decides its shape (UUID, integer, prefixed string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: &str) -> Self {
        UserId(id.to_string())
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_round_trip() {
        let id = UserId::new("U1");
        assert_eq!(id.as_str(), "U1");
        assert_eq!(id.to_string(), "U1");
        assert_eq!(UserId::from("U1".to_string()), id);
        assert_eq!(id.into_inner(), "U1");
    }

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::new("42")).unwrap();
        assert_eq!(json, "\"42\"");
    }
}
