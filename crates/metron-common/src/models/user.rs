//! User model: accounts used for login and edit attribution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

static USERNAME_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[a-zA-Z0-9_.@+-]+$").expect("username pattern"));

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub email: String,
    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Bitfield, see [`user_flags`]
    pub flags: i64,
    pub created_on: DateTime<Utc>,
}

/// Bitflags for user account flags.
pub mod user_flags {
    /// Account may log in
    pub const ACTIVE: i64 = 1 << 0;
    /// May create and edit catalog data
    pub const EDITOR: i64 = 1 << 1;
    /// Site staff; implies every editor right plus admin actions
    pub const STAFF: i64 = 1 << 2;

    pub fn has(flags: i64, flag: i64) -> bool {
        flags & flag == flag
    }

    pub fn can_edit(flags: i64) -> bool {
        has(flags, EDITOR) || has(flags, STAFF)
    }
}

impl User {
    pub fn is_active(&self) -> bool {
        user_flags::has(self.flags, user_flags::ACTIVE)
    }
}

/// Input for `metron create-user`.
#[derive(Debug, Validate)]
pub struct NewUser {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username may only contain letters, digits and @/./+/-/_"
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    pub flags: i64,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Safe user representation for API responses (no sensitive fields)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub flags: i64,
    pub created_on: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            flags: u.flags,
            created_on: u.created_on,
        }
    }
}

/// `{id, username}` of the owner of a reading list or collection item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_can_edit_without_editor_flag() {
        assert!(user_flags::can_edit(user_flags::ACTIVE | user_flags::STAFF));
        assert!(user_flags::can_edit(user_flags::ACTIVE | user_flags::EDITOR));
        assert!(!user_flags::can_edit(user_flags::ACTIVE));
    }

    #[test]
    fn new_user_validation() {
        let user = NewUser {
            username: "b j".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            flags: user_flags::ACTIVE,
        };
        let errors = user.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 3);
    }
}
