use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::domain::ports::ReadinessProbe;

/// Readiness probe that opens and immediately drops a TCP connection
///
/// Name resolution and connection establishment share one timeout, so a
/// probe never blocks longer than `connect_timeout`.
#[derive(Debug, Clone, Copy)]
pub struct TcpReadinessProbe {
    connect_timeout: Duration,
}

impl TcpReadinessProbe {
    pub const fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpReadinessProbe {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl ReadinessProbe for TcpReadinessProbe {
    async fn is_ready(&self, host: &str, port: u16) -> bool {
        match timeout(self.connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::trace!(host, port, error = %e, "port not reachable");
                false
            }
            Err(_) => {
                tracing::trace!(host, port, "connect timed out");
                false
            }
        }
    }
}
