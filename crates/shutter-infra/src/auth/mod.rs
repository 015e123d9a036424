//! Credential digest implementation.

mod password;

pub use password::Sha512PasswordService;
