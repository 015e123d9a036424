//! Credential digest port.

/// Account-salted one-way password digest.
///
/// Implementations must be deterministic: the same account name and password
/// always yield the same digest string, so stored hashes stay verifiable.
pub trait PasswordService: Send + Sync {
    /// Salt derived from the account name alone.
    fn salt(&self, account_name: &str) -> String;

    /// Digest of `password + ":" + salt(account_name)`.
    fn hash(&self, account_name: &str, password: &str) -> String;

    /// Recompute the digest and compare it with a stored one.
    fn verify(&self, account_name: &str, password: &str, stored_hash: &str) -> bool {
        self.hash(account_name, password) == stored_hash
    }
}
