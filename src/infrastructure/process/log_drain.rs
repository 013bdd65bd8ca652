//! Background copiers from child output pipes into log files
//!
//! Each stream gets its own task bound to a shared cancellation token. A
//! copier ends at EOF, on a read or write error, or when the token is
//! cancelled; it flushes its file before returning the byte count.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const BUFFER_SIZE: usize = 8 * 1024;

/// Drain tasks of one child process
pub struct LogDrain {
    token: CancellationToken,
    tasks: JoinSet<u64>,
}

impl LogDrain {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            tasks: JoinSet::new(),
        }
    }

    /// Copy `reader` into `writer` in the background until EOF or cancellation
    pub fn attach<R, W>(&mut self, stream: &'static str, reader: R, writer: W)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let token = self.token.clone();
        self.tasks
            .spawn(copy_until_cancelled(stream, reader, writer, token));
    }

    /// Number of copiers still running
    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    /// Stop draining and join every copier
    ///
    /// Copiers get up to `wait` to reach EOF on their own, which happens as
    /// soon as every holder of the pipe has exited. Whatever is still running
    /// after that is cancelled. Returns the total number of bytes written.
    pub async fn stop(mut self, wait: Duration) -> u64 {
        let deadline = Instant::now() + wait;
        let mut total = 0;

        loop {
            match tokio::time::timeout_at(deadline, self.tasks.join_next()).await {
                Ok(Some(joined)) => total += bytes_of(joined),
                Ok(None) => return total,
                Err(_) => break,
            }
        }

        tracing::debug!(remaining = self.tasks.len(), "cancelling log drains");
        self.token.cancel();
        while let Some(joined) = self.tasks.join_next().await {
            total += bytes_of(joined);
        }
        total
    }
}

impl Default for LogDrain {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LogDrain {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn bytes_of(joined: Result<u64, tokio::task::JoinError>) -> u64 {
    joined.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "log drain task failed");
        0
    })
}

async fn copy_until_cancelled<R, W>(
    stream: &'static str,
    mut reader: R,
    mut writer: W,
    token: CancellationToken,
) -> u64
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let read = tokio::select! {
            biased;
            () = token.cancelled() => break,
            read = reader.read(&mut buf) => read,
        };

        let n = match read {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(stream, error = %e, "failed to read child output");
                break;
            }
        };

        if let Err(e) = writer.write_all(&buf[..n]).await {
            tracing::warn!(stream, error = %e, "failed to write log file");
            break;
        }
        total += n as u64;
    }

    if let Err(e) = writer.flush().await {
        tracing::warn!(stream, error = %e, "failed to flush log file");
    }
    tracing::trace!(stream, bytes = total, "log drain finished");
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_drain_copies_until_eof() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        let file = tokio::fs::File::create(&path).await.unwrap();

        let (mut tx, rx) = duplex(64);
        let mut drain = LogDrain::new();
        drain.attach("stdout", rx, file);

        tx.write_all(b"Started Application in 3.2 seconds\n")
            .await
            .unwrap();
        drop(tx);

        let bytes = drain.stop(Duration::from_secs(5)).await;
        assert_eq!(bytes, 35);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Started Application in 3.2 seconds\n");
    }

    #[tokio::test]
    async fn test_stop_cancels_open_streams() {
        let dir = TempDir::new().unwrap();
        let file = tokio::fs::File::create(dir.path().join("err.log"))
            .await
            .unwrap();

        // Writer half stays open, as with a grandchild holding the pipe
        let (mut tx, rx) = duplex(64);
        let mut drain = LogDrain::new();
        drain.attach("stderr", rx, file);
        tx.write_all(b"partial").await.unwrap();

        let started = Instant::now();
        let bytes = drain.stop(Duration::from_millis(100)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(bytes <= 7);
        drop(tx);
    }

    #[tokio::test]
    async fn test_two_streams_are_joined() {
        let dir = TempDir::new().unwrap();
        let out = tokio::fs::File::create(dir.path().join("a.log")).await.unwrap();
        let err = tokio::fs::File::create(dir.path().join("b.log")).await.unwrap();

        let (out_tx, out_rx) = duplex(64);
        let (err_tx, err_rx) = duplex(64);
        let mut drain = LogDrain::new();
        drain.attach("stdout", out_rx, out);
        drain.attach("stderr", err_rx, err);
        assert_eq!(drain.active(), 2);

        drop(out_tx);
        drop(err_tx);
        assert_eq!(drain.stop(Duration::from_secs(5)).await, 0);
    }
}
