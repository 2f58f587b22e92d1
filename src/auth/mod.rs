//! Credential lifecycle: hashing on write, verification on login.

mod hook;
pub mod password;

pub use hook::HashPasswords;
