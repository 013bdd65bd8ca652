//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the startup supervisor depends on:
//! - ReadinessProbe: is the target port accepting connections
//! - ServiceLauncher / ServiceProcess: start and control the service process
//! - StartupReporter: progress notifications for the operator
//! - CredentialPrompt: interactive secret input
//!
//! Infrastructure adapters implement these; tests substitute fakes.

pub mod credential_prompt;
pub mod readiness_probe;
pub mod service_launcher;
pub mod startup_reporter;

pub use credential_prompt::CredentialPrompt;
pub use readiness_probe::ReadinessProbe;
pub use service_launcher::{ProcessExit, ServiceLauncher, ServiceProcess};
pub use startup_reporter::{FailedAttempt, NullReporter, StartupReporter};
