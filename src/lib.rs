//! Sketchroom - accounts, rooms, chat history and drawing elements over HTTP
//!
//! This is the library interface for Sketchroom. The binary wires the
//! [`cli`] onto it; tests drive [`api::create_router`] directly.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;

pub use config::Config;
pub use error::Error;
