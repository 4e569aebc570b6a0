//! # chateo-auth
//!
//! Verifies the signed credential a client presents when opening a
//! connection. Issuance belongs to the external authenticator; the encoder
//! here only mints tokens for tests and tooling.

pub mod error;
pub mod jwt;

pub use error::AuthError;
pub use jwt::{Claims, IdentityVerifier, JwtDecoder, JwtEncoder};
