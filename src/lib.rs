//! Minimal WebSocket echo server.
//!
//! - [`config`]: Environment-driven server configuration.
//! - [`server`]: Listener — HTTP accept loop, router, shared state.
//! - [`ws`]: Connection sessions — registry, events, receive loop.
//! - [`echo`]: The echo policy task wired over the event channel.

pub mod config;
pub mod echo;
pub mod server;
pub mod ws;
