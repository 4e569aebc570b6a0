//! # chateo-api
//!
//! HTTP layer for Chateo built on Axum.
//!
//! Provides the WebSocket upgrade endpoint that feeds the real-time engine,
//! a small read-only query surface (presence, conversation history, health),
//! middleware (CORS, request logging), and extractors.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
