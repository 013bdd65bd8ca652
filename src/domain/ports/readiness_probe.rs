use async_trait::async_trait;

/// Readiness check of a network service
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Whether `host:port` accepts a connection right now
    ///
    /// Implementations must return within a bounded time.
    async fn is_ready(&self, host: &str, port: u16) -> bool;
}
