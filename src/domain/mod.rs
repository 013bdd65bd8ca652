//! Domain layer for Runway
//!
//! This module contains the core models of a supervised startup and the port
//! traits that infrastructure adapters implement.

pub mod error;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use error::{LaunchError, StartupError};
