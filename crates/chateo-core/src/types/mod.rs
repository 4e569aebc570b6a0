//! Shared domain value types.

pub mod identity;

pub use identity::Identity;
