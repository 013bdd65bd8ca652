//! Runway - startup supervisor and demo runner
//!
//! Runway brings a separately maintained HTTP API service (a Spring Boot
//! application) from "unknown/unreachable" to "reachable on a known port",
//! then drives a demo against it: four endpoint probes and an interactive
//! CLI client session.
//!
//! # Architecture
//!
//! The crate follows the same layering as a hexagonal application:
//!
//! - **Domain Layer** (`domain`): configuration, attempt records, launch plans,
//!   the log diagnosis rule set and the port traits
//! - **Service Layer** (`services`): the startup supervisor, endpoint prober,
//!   seed loader, client session and prerequisite checks
//! - **Infrastructure Layer** (`infrastructure`): process launching, log
//!   draining, TCP probing, HTTP, tool detection, config loading and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use runway::domain::ports::NullReporter;
//! use runway::services::{StartupRequest, StartupSupervisor};
//! use runway::ConfigLoader;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ConfigLoader::load()?;
//! let supervisor = StartupSupervisor::from_config(&config, Arc::new(NullReporter))?;
//! let outcome = supervisor
//!     .ensure_service_running(&StartupRequest::from_config(&config))
//!     .await?;
//! println!("service reachable: {}", outcome.is_already_running());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AttemptOutcome, AttemptRecord, Config, Diagnosis, DiagnosisRules, LaunchPlan, LaunchSpec,
};
pub use domain::{LaunchError, StartupError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{StartupOutcome, StartupRequest, StartupSupervisor};
