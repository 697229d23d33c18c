//! Credential subsystem: password hashing and session tokens.

pub mod extract;
pub mod password;
pub mod token;

pub use extract::AuthUser;
pub use password::{generate_salt, hash_password, verify_password, DEFAULT_ITERATIONS};
pub use token::{Claims, TokenSigner, TOKEN_TTL_SECS};
