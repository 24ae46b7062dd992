//! Health check HTTP endpoint.
//!
//! Provides a tiny HTTP server on localhost that returns agent status as
//! JSON: per-timer last-tick times and uptime. Used by external uptime
//! monitors.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Which periodic job ticked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Sweep,
    Digest,
    Report,
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timer::Sweep => write!(f, "sweep"),
            Timer::Digest => write!(f, "digest"),
            Timer::Report => write!(f, "report"),
        }
    }
}

/// Shared health state updated by the scheduler loops.
#[derive(Clone)]
pub struct HealthState {
    inner: Arc<RwLock<HealthData>>,
}

#[derive(Debug, Clone, Serialize)]
struct HealthData {
    status: String,
    started_at: DateTime<Utc>,
    last_sweep_at: Option<DateTime<Utc>>,
    last_digest_at: Option<DateTime<Utc>>,
    last_report_at: Option<DateTime<Utc>>,
    uptime_seconds: i64,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HealthData {
                status: "ok".to_string(),
                started_at: Utc::now(),
                last_sweep_at: None,
                last_digest_at: None,
                last_report_at: None,
                uptime_seconds: 0,
            })),
        }
    }

    pub fn record_tick(&self, timer: Timer) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut data = inner.write().await;
            let now = Utc::now();
            match timer {
                Timer::Sweep => data.last_sweep_at = Some(now),
                Timer::Digest => data.last_digest_at = Some(now),
                Timer::Report => data.last_report_at = Some(now),
            }
            data.uptime_seconds = (now - data.started_at).num_seconds();
        });
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the health check HTTP server. Returns a handle that can be
/// aborted.
pub fn spawn_health_server(state: HealthState, port: u16) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = format!("127.0.0.1:{port}");
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => {
                info!(addr, "Health check server listening");
                l
            }
            Err(e) => {
                warn!(error = %e, addr, "Failed to bind health check server — continuing without it");
                return;
            }
        };

        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Failed to accept health check connection");
                    continue;
                }
            };

            let state = state.clone();
            tokio::spawn(async move {
                // Read the request (we don't care about the contents)
                let mut buf = [0u8; 1024];
                let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;

                // Build JSON response
                let data = state.inner.read().await;
                let body = serde_json::to_string(&*data).unwrap_or_else(|_| {
                    r#"{"status":"error","message":"serialization failed"}"#.to_string()
                });

                let response = format!(
                    "HTTP/1.1 200 OK\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\
                     \r\n\
                     {}",
                    body.len(),
                    body
                );

                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_state_creation() {
        let state = HealthState::new();
        // Should be constructable without async runtime
        let _ = state.clone();
    }

    #[tokio::test]
    async fn test_health_state_records_ticks() {
        let state = HealthState::new();
        state.record_tick(Timer::Sweep);
        state.record_tick(Timer::Report);

        // Give the spawned tasks time to complete
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let data = state.inner.read().await;
        assert!(data.last_sweep_at.is_some());
        assert!(data.last_report_at.is_some());
        assert!(data.last_digest_at.is_none());
    }

    #[tokio::test]
    async fn test_health_server_responds() {
        let state = HealthState::new();
        state.record_tick(Timer::Sweep);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let port = 19_090;
        let handle = spawn_health_server(state, port);

        // Give the server time to bind
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port))
            .await
            .expect("should connect to health server");

        let request = "GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n";
        tokio::io::AsyncWriteExt::write_all(&mut stream, request.as_bytes())
            .await
            .unwrap();

        let mut buf = vec![0u8; 4096];
        let n = tokio::io::AsyncReadExt::read(&mut stream, &mut buf)
            .await
            .unwrap();
        let response = String::from_utf8_lossy(&buf[..n]);

        assert!(response.contains("200 OK"));
        assert!(response.contains("\"status\":\"ok\""));
        assert!(response.contains("last_sweep_at"));

        handle.abort();
    }
}
