//! Site server management - optional spawning and reachability checks

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::{ProbeError, ProbeResult};

/// How long a server gets to exit after SIGTERM
const STOP_GRACE: Duration = Duration::from_millis(500);

/// Poll `url` until it answers with any HTTP status. Returns the number of
/// attempts it took.
pub async fn wait_until_reachable(url: &str, timeout_duration: Duration) -> ProbeResult<usize> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) => {
                debug!("{} answered {} after {} attempt(s)", url, resp.status(), attempts);
                return Ok(attempts);
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} to accept connections...", url);
                }
                // Connection refused is expected while a server is starting
                if !e.is_connect() {
                    warn!("Reachability check error: {}", e);
                }
            }
        }

        if start.elapsed() >= timeout_duration {
            return Err(ProbeError::Unreachable {
                url: url.to_string(),
                attempts,
            });
        }
        sleep(Duration::from_millis(200)).await;
    }
}

/// Configuration for spawning the site server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Shell command that serves the site, e.g. `python3 -m http.server 8080`
    pub command: String,

    /// URL the server is expected to answer on
    pub base_url: String,

    /// Timeout for server startup
    pub startup_timeout: Duration,
}

/// Handle to a running server process
pub struct ServerHandle {
    child: Child,
}

impl ServerHandle {
    /// Spawn the server command and wait until it answers
    pub async fn spawn(config: &ServerConfig) -> ProbeResult<Self> {
        info!("Starting site server: {}", config.command);

        // exec so that signals reach the server rather than the shell
        let child = Command::new("sh")
            .arg("-c")
            .arg(format!("exec {}", config.command))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProbeError::ServerStartup(format!("failed to spawn '{}': {}", config.command, e)))?;

        let mut handle = ServerHandle { child };

        if let Err(e) = wait_until_reachable(&config.base_url, config.startup_timeout).await {
            let _ = handle.stop().await;
            return Err(ProbeError::ServerStartup(format!("'{}': {}", config.command, e)));
        }

        info!("Server is answering at {}", config.base_url);
        Ok(handle)
    }

    /// Whether the server process is still alive
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Stop the server: SIGTERM, a short grace period, then SIGKILL
    pub async fn stop(&mut self) -> ProbeResult<()> {
        if !self.is_running() {
            return Ok(());
        }
        let Some(id) = self.child.id() else {
            return Ok(());
        };
        info!("Stopping server (pid: {})", id);

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if kill(Pid::from_raw(id as i32), Signal::SIGTERM).is_ok()
                && timeout(STOP_GRACE, self.child.wait()).await.is_ok()
            {
                return Ok(());
            }
        }

        // Force kill if still running
        self.child.kill().await?;
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.child.start_kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_any_status_counts_as_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await;
            }
        });

        let attempts = wait_until_reachable(&format!("http://{}/", addr), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let err = wait_until_reachable(&format!("http://{}/", addr), Duration::from_millis(300))
            .await
            .unwrap_err();
        match err {
            ProbeError::Unreachable { attempts, .. } => assert!(attempts >= 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_server_that_never_listens_fails_startup() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let config = ServerConfig {
            command: "sleep 30".to_string(),
            base_url: format!("http://{}/", addr),
            startup_timeout: Duration::from_millis(300),
        };

        let err = ServerHandle::spawn(&config).await.err().expect("startup must fail");
        assert!(matches!(err, ProbeError::ServerStartup(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_terminates_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await;
            }
        });
        let config = ServerConfig {
            command: "sleep 30".to_string(),
            base_url: format!("http://{}/", addr),
            startup_timeout: Duration::from_secs(5),
        };
        let mut handle = ServerHandle::spawn(&config).await.unwrap();
        assert!(handle.is_running());

        let started = std::time::Instant::now();
        handle.stop().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!handle.is_running());
    }
}
