//! User profile returned by the auth service.

use serde::{Deserialize, Serialize};

use super::{Email, UserId, UserRole};

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Account email, when the server includes it.
    #[serde(default)]
    pub email: Option<Email>,
    /// Account role; absent means a regular customer.
    #[serde(default)]
    pub role: UserRole,
}
