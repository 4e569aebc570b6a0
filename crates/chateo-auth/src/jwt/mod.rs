//! JWT claims, verification, and minting.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::Claims;
pub use decoder::{IdentityVerifier, JwtDecoder};
pub use encoder::JwtEncoder;
