//! Per-identity delivery channels ("rooms").

pub mod registry;

pub use registry::ChannelRegistry;
