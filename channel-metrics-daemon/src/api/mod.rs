//! JSON-RPC API module for the channel-metrics-daemon.
//!
//! This module exposes channel analysis to clients (dashboards, scripts)
//! over a JSON-RPC interface via TCP.

pub mod handlers;
pub mod server;

pub use server::start_server;
