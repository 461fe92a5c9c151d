//! Reminder service library.
//!
//! This crate provides the CLI, configuration, the HTTP and WebSocket
//! listeners, the alert fan-out and the periodic sweep.

mod cli;
pub mod commands;
mod config;
pub mod fanout;
pub mod http;
pub mod scheduler;
pub mod ws;

pub use cli::{Cli, Commands};
pub use config::{Config, InvalidConfig};
