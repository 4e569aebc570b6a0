//! # chateo-core
//!
//! Core crate for Chateo. Contains configuration schemas, the `Identity`
//! type, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Chateo crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::identity::Identity;
