//! API module for HTTP and WebSocket endpoints
//!
//! This module wires the relay core into an axum router.

pub mod http;
pub mod rest;

pub use http::create_router;
