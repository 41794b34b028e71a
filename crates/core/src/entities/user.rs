//! User profile entity.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{UserId, UserRole};

/// Profile of an authenticated (or newly registered) user.
///
/// The backend sends `address` and `role` as possibly-empty strings; both
/// normalize to `None` here rather than at call sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "role_from_server")]
    pub role: Option<UserRole>,
}

impl UserProfile {
    /// Whether this user may issue admin-only commands (product/category
    /// mutation). A UI convenience, not a security boundary.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(UserRole::Admin)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn role_from_server<'de, D>(deserializer: D) -> Result<Option<UserRole>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(UserRole::from_server))
}
