//! # User Authentication
//!
//! Registration and login primitives: Argon2id password hashing and
//! HMAC-SHA256 signed bearer tokens with a one-hour expiry.
//!
//! Route protection is a client-side concern in this deployment — the
//! API issues and verifies tokens but does not gate the analysis or
//! compliance endpoints behind them.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner};
