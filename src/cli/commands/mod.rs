//! CLI command implementations.

pub mod demo;
pub mod diagnose;
pub mod doctor;
pub mod init;
pub mod probe;
pub mod up;
