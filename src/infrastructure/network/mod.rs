//! Network readiness probing

pub mod tcp_probe;

pub use tcp_probe::TcpReadinessProbe;
