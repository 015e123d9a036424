//! SHA-512 account-salted password digest.

use sha2::{Digest, Sha512};

use shutter_core::ports::PasswordService;

/// Lowercase hex SHA-512 of a UTF-8 string, the same text `openssl dgst -sha512` prints.
pub fn digest(src: &str) -> String {
    hex::encode(Sha512::digest(src.as_bytes()))
}

/// SHA-512 password service.
///
/// The salt is the digest of the account name; the stored hash is the digest
/// of `password:salt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512PasswordService;

impl Sha512PasswordService {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordService for Sha512PasswordService {
    fn salt(&self, account_name: &str) -> String {
        digest(account_name)
    }

    fn hash(&self, account_name: &str, password: &str) -> String {
        digest(&format!("{}:{}", password, self.salt(account_name)))
    }
}
