//! HTTP client for the service endpoints

pub mod client;

pub use client::{ApiClient, EndpointResponse, HttpProbeError};
