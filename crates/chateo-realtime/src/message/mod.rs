//! Wire event definitions.

pub mod types;

pub use types::{Counterparty, InboundEvent, OutboundEvent};
