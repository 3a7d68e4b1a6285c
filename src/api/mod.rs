//! HTTP API server

pub mod error;
pub mod models;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::*;
