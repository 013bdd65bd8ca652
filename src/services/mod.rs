//! Service layer
//!
//! Use cases composed from the domain ports and infrastructure adapters.

pub mod client_session;
pub mod endpoint_prober;
pub mod prerequisites;
pub mod seed_loader;
pub mod startup_supervisor;

pub use client_session::{ClientError, ClientExit, ClientSession};
pub use endpoint_prober::{EndpointProber, EndpointResult, ProbeReport};
pub use prerequisites::{check_prerequisites, PrerequisiteReport};
pub use seed_loader::{SeedError, SeedLoader, SeedOutcome};
pub use startup_supervisor::{
    RunningService, StartupOutcome, StartupRequest, StartupSupervisor, SupervisorSettings,
};
