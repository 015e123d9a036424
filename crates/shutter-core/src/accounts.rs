//! Account login and registration on top of the credential digest.

use std::sync::Arc;

use crate::domain::{NewUser, User, validate_registration};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, UserRepository};

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Resolve an unbanned account whose stored digest matches `password`.
    ///
    /// Unknown, banned and wrong-password attempts all yield `Ok(None)`.
    pub async fn authenticate(
        &self,
        account_name: &str,
        password: &str,
    ) -> Result<Option<User>, RepoError> {
        let Some(user) = self.users.find_active_by_account_name(account_name).await? else {
            return Ok(None);
        };

        if self
            .passwords
            .verify(&user.account_name, password, &user.passhash)
        {
            Ok(Some(user))
        } else {
            tracing::debug!(user_id = user.id, "Password mismatch");
            Ok(None)
        }
    }

    /// Validate, check the name is free, then insert.
    ///
    /// The availability check and the insert are separate statements; a
    /// concurrent registration of the same name surfaces as `Duplicate` only
    /// when the store enforces a unique index.
    pub async fn register(&self, account_name: &str, password: &str) -> Result<User, DomainError> {
        validate_registration(account_name, password)?;

        if self.users.account_name_exists(account_name).await? {
            return Err(DomainError::Duplicate(account_name.to_string()));
        }

        let passhash = self.passwords.hash(account_name, password);
        let user = self
            .users
            .create(NewUser {
                account_name: account_name.to_string(),
                passhash,
            })
            .await?;

        tracing::info!(user_id = user.id, "Account registered");
        Ok(user)
    }
}
