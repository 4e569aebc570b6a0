//! Direct messaging.

pub mod clock;
pub mod pipeline;

pub use clock::MonotonicClock;
pub use pipeline::{MessageEdge, MessagePipeline};
