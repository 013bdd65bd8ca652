//! Infrastructure layer module
//!
//! This module contains the adapters behind the domain ports and the
//! ambient plumbing:
//! - Process launching and output draining
//! - TCP readiness probing
//! - HTTP client for the endpoint probes
//! - Tool detection
//! - Credential prompting
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod credentials;
pub mod http;
pub mod logging;
pub mod network;
pub mod process;
pub mod tools;
