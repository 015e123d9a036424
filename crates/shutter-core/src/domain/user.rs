use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

static ACCOUNT_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[0-9a-zA-Z_]{3,}\z").expect("valid account name pattern"));

static PASSWORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[0-9a-zA-Z_]{6,}\z").expect("valid password pattern"));

/// User entity - an account that can post, comment and (as admin) ban others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub account_name: String,
    #[serde(skip_serializing, default)]
    pub passhash: String,
    /// Non-zero for administrators.
    pub authority: i32,
    /// Ban flag. Non-zero hides every post of this user.
    pub del_flg: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.authority != 0
    }

    pub fn is_banned(&self) -> bool {
        self.del_flg != 0
    }
}

/// Insert payload for registration. The store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub account_name: String,
    pub passhash: String,
}

/// Check the registration form before anything is hashed or stored.
///
/// Account names need 3+ and passwords 6+ characters from `[0-9a-zA-Z_]`.
pub fn validate_registration(account_name: &str, password: &str) -> Result<(), DomainError> {
    if ACCOUNT_NAME_PATTERN.is_match(account_name) && PASSWORD_PATTERN.is_match(password) {
        Ok(())
    } else {
        Err(DomainError::Validation(
            "account name or password has an invalid format".to_string(),
        ))
    }
}
