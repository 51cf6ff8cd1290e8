//! Playwright browser automation
//!
//! A single Node process runs the embedded driver script for the whole run.
//! It launches the browser once and then serves probe requests sent as JSON
//! lines on stdin, answering each with one JSON line on stdout. Every
//! request runs in its own browser context which the driver closes before
//! replying.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{ProbeError, ProbeResult};
use crate::probes::Group;

/// Driver source, written to a temporary file at launch
pub const DRIVER_SCRIPT: &str = include_str!("driver.js");

/// Slack added on top of a request's own time budget before giving up on it
const DEADLINE_MARGIN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(format!("unknown browser '{}'", other)),
        }
    }
}

/// Configuration for the Playwright driver
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    /// Node executable
    pub node: PathBuf,
    pub browser: Browser,
    pub headless: bool,
    /// Time allowed for Node to start and the browser to launch
    pub launch_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            node: PathBuf::from("node"),
            browser: Browser::Chromium,
            headless: true,
            launch_timeout: Duration::from_secs(60),
        }
    }
}

/// Navigation completion condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    /// The load event
    Load,
    /// The load event, then network idle if it arrives within the timeout
    NetworkIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl From<&siteqa_common::profile::Viewport> for ViewportSize {
    fn from(vp: &siteqa_common::profile::Viewport) -> Self {
        Self {
            width: vp.width,
            height: vp.height,
        }
    }
}

/// One request line sent to the driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRequest {
    pub id: u64,
    pub url: String,
    pub viewport: ViewportSize,
    pub wait_until: WaitUntil,
    pub timeout_ms: u64,
    /// Body of an async function receiving `(page, args, errors)`
    pub script: String,
    pub args: serde_json::Value,
}

/// One response line from the driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResponse {
    pub id: u64,
    pub ok: bool,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub load_ms: Option<u64>,
    #[serde(default)]
    pub page_errors: Vec<String>,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
}

/// First line the driver writes, once the browser is up or has failed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverHello {
    pub ready: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub missing_playwright: bool,
}

/// A page visit a check group asks for
#[derive(Debug, Clone)]
pub struct Visit {
    pub group: Group,
    pub path: String,
    pub viewport: ViewportSize,
    pub wait_until: WaitUntil,
    pub navigation_timeout: Duration,
    /// Time the probe script itself may spend after navigation
    pub script_budget: Duration,
    pub script: &'static str,
    pub args: serde_json::Value,
}

impl Visit {
    /// Upper bound on the whole request, navigation through teardown
    pub fn deadline(&self) -> Duration {
        self.navigation_timeout + self.script_budget + DEADLINE_MARGIN
    }
}

/// What a visit observed
#[derive(Debug, Clone, Default)]
pub struct PageReport {
    pub status: Option<u16>,
    pub load_ms: Option<u64>,
    pub page_errors: Vec<String>,
    pub value: serde_json::Value,
}

impl PageReport {
    /// Decode the probe script's return value
    pub fn facts<T: DeserializeOwned>(&self) -> ProbeResult<T> {
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

/// Something that can load a page and run a probe script against it
#[allow(async_fn_in_trait)]
pub trait PageEngine {
    async fn visit(&mut self, base_url: &str, visit: Visit) -> ProbeResult<PageReport>;
}

/// Join a base URL and an absolute route path
pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Line-delimited JSON request/response channel
pub struct DriverChannel<W, R> {
    writer: W,
    lines: Lines<R>,
    next_id: u64,
}

impl<W, R> DriverChannel<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
{
    pub fn new(writer: W, reader: R) -> Self {
        Self {
            writer,
            lines: reader.lines(),
            next_id: 0,
        }
    }

    /// Wait for the driver's ready line
    pub async fn handshake(&mut self) -> ProbeResult<DriverHello> {
        loop {
            let line = self.lines.next_line().await?.ok_or(ProbeError::DriverClosed)?;
            match serde_json::from_str::<DriverHello>(&line) {
                Ok(hello) => return Ok(hello),
                Err(_) => debug!("driver: {}", line),
            }
        }
    }

    /// Send a request and wait for its response, bounded by `deadline`.
    /// Responses to earlier, abandoned requests are discarded.
    pub async fn call(&mut self, mut request: ProbeRequest, deadline: Duration) -> ProbeResult<ProbeResponse> {
        self.next_id += 1;
        request.id = self.next_id;

        let mut line = serde_json::to_string(&request)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;

        match timeout(deadline, self.read_response(request.id)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(format!(
                "{} (no response within {} ms)",
                request.url,
                deadline.as_millis()
            ))),
        }
    }

    async fn read_response(&mut self, id: u64) -> ProbeResult<ProbeResponse> {
        loop {
            let line = self.lines.next_line().await?.ok_or(ProbeError::DriverClosed)?;
            if line.trim().is_empty() {
                continue;
            }
            let response: ProbeResponse = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(_) => {
                    debug!("driver: {}", line);
                    continue;
                }
            };
            if response.id != id {
                debug!("Discarding stale response {} (waiting for {})", response.id, id);
                continue;
            }
            return Ok(response);
        }
    }
}

/// Running driver process
pub struct PlaywrightDriver {
    child: Child,
    channel: DriverChannel<ChildStdin, BufReader<ChildStdout>>,
    browser_version: String,
    _workdir: TempDir,
}

impl PlaywrightDriver {
    /// Start Node with the driver script and wait for the browser
    pub async fn launch(config: &PlaywrightConfig) -> ProbeResult<Self> {
        let workdir = tempfile::tempdir()?;
        let script_path = workdir.path().join("siteqa-driver.js");
        std::fs::write(&script_path, DRIVER_SCRIPT)?;

        debug!("Starting Playwright driver: {} {}", config.node.display(), script_path.display());

        let mut child = TokioCommand::new(&config.node)
            .arg(&script_path)
            .env("SITEQA_BROWSER", config.browser.as_str())
            .env("SITEQA_HEADLESS", if config.headless { "1" } else { "0" })
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ProbeError::DriverNotFound(format!("{} not found", config.node.display()))
                }
                _ => ProbeError::DriverLaunch(e.to_string()),
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProbeError::DriverLaunch("driver stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProbeError::DriverLaunch("driver stdout not captured".into()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("driver stderr: {}", line);
                }
            });
        }

        let mut channel = DriverChannel::new(stdin, BufReader::new(stdout));
        let hello = timeout(config.launch_timeout, channel.handshake())
            .await
            .map_err(|_| ProbeError::DriverLaunch("browser did not start in time".into()))??;

        if !hello.ready {
            let reason = hello.error.unwrap_or_else(|| "unknown error".into());
            return Err(if hello.missing_playwright {
                ProbeError::DriverNotFound(reason)
            } else {
                ProbeError::DriverLaunch(reason)
            });
        }

        let browser_version = hello.version.unwrap_or_default();
        info!("Launched {} {}", config.browser.as_str(), browser_version);

        Ok(Self {
            child,
            channel,
            browser_version,
            _workdir: workdir,
        })
    }

    pub fn browser_version(&self) -> &str {
        &self.browser_version
    }

    /// Close stdin so the driver shuts the browser down, then reap it
    pub async fn shutdown(self) -> ProbeResult<()> {
        let Self { mut child, channel, .. } = self;
        drop(channel);

        match timeout(Duration::from_secs(10), child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!("Driver exited with {}", status);
            }
            Err(_) => {
                warn!("Driver did not exit, killing it");
                child.kill().await?;
            }
        }
        Ok(())
    }
}

impl PageEngine for PlaywrightDriver {
    async fn visit(&mut self, base_url: &str, visit: Visit) -> ProbeResult<PageReport> {
        let deadline = visit.deadline();
        let request = ProbeRequest {
            id: 0,
            url: join_url(base_url, &visit.path),
            viewport: visit.viewport,
            wait_until: visit.wait_until,
            timeout_ms: visit.navigation_timeout.as_millis() as u64,
            script: visit.script.to_string(),
            args: visit.args,
        };
        debug!(
            "{} probe: {} at {}x{}",
            visit.group.title(),
            request.url,
            request.viewport.width,
            request.viewport.height
        );

        let response = self.channel.call(request, deadline).await?;
        if !response.ok {
            return Err(ProbeError::Driver(
                response.error.unwrap_or_else(|| "unknown driver error".into()),
            ));
        }
        Ok(PageReport {
            status: response.status,
            load_ms: response.load_ms,
            page_errors: response.page_errors,
            value: response.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use tokio::io::{duplex, split, AsyncReadExt};

    fn request(url: &str) -> ProbeRequest {
        ProbeRequest {
            id: 0,
            url: url.to_string(),
            viewport: ViewportSize { width: 375, height: 667 },
            wait_until: WaitUntil::NetworkIdle,
            timeout_ms: 15_000,
            script: "return null;".to_string(),
            args: serde_json::json!({}),
        }
    }

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_value(request("http://localhost:8080/")).unwrap();
        assert_eq!(json["waitUntil"], "networkidle");
        assert_eq!(json["timeoutMs"], 15_000);
        assert_eq!(json["viewport"]["width"], 375);
    }

    #[test]
    fn test_response_defaults() {
        let response: ProbeResponse =
            serde_json::from_str(r#"{"id":3,"ok":false,"error":"net::ERR_CONNECTION_REFUSED"}"#).unwrap();
        assert!(!response.ok);
        assert!(response.page_errors.is_empty());
        assert!(response.status.is_none());
        assert!(response.value.is_null());
    }

    #[test_case("http://localhost:8080", "/", "http://localhost:8080/"; "root")]
    #[test_case("http://localhost:8080/", "/termos/", "http://localhost:8080/termos/"; "trailing slash")]
    #[test_case("https://example.com/site", "/privacidade/", "https://example.com/site/privacidade/"; "base path")]
    fn test_join_url(base: &str, path: &str, expected: &str) {
        assert_eq!(join_url(base, path), expected);
    }

    #[test]
    fn test_browser_from_str() {
        assert_eq!("Firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert!("lynx".parse::<Browser>().is_err());
    }

    #[tokio::test]
    async fn test_channel_discards_stale_responses() {
        let (client, server) = duplex(4096);
        let (client_read, client_write) = split(client);
        let (server_read, mut server_write) = split(server);

        let fake_driver = tokio::spawn(async move {
            let mut lines = BufReader::new(server_read).lines();
            let line = lines.next_line().await.unwrap().unwrap();
            let req: ProbeRequest = serde_json::from_str(&line).unwrap();
            let stale = r#"{"id":99,"ok":true,"status":500}"#;
            let fresh = format!(r#"{{"id":{},"ok":true,"status":200,"loadMs":42,"value":{{"n":1}}}}"#, req.id);
            server_write
                .write_all(format!("not json\n{}\n{}\n", stale, fresh).as_bytes())
                .await
                .unwrap();
        });

        let mut channel = DriverChannel::new(client_write, BufReader::new(client_read));
        let response = channel
            .call(request("http://localhost:8080/"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(response.id, 1);
        assert_eq!(response.status, Some(200));
        assert_eq!(response.load_ms, Some(42));
        assert_eq!(response.value["n"], 1);
        fake_driver.await.unwrap();
    }

    #[tokio::test]
    async fn test_channel_times_out() {
        let (client, server) = duplex(4096);
        let (client_read, client_write) = split(client);
        let (mut server_read, _server_write) = split(server);

        let drain = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = server_read.read_to_end(&mut buf).await;
        });

        let mut channel = DriverChannel::new(client_write, BufReader::new(client_read));
        let err = channel
            .call(request("http://localhost:8080/slow"), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(_)));
        assert!(err.to_string().contains("/slow"));
        drop(channel);
        drain.abort();
    }

    #[tokio::test]
    async fn test_channel_reports_closed_driver() {
        let (client, server) = duplex(4096);
        let (client_read, client_write) = split(client);
        drop(server);

        let mut channel = DriverChannel::new(client_write, BufReader::new(client_read));
        let err = channel
            .call(request("http://localhost:8080/"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::DriverClosed | ProbeError::Io(_)));
    }

    #[tokio::test]
    async fn test_handshake_skips_noise() {
        let (client, server) = duplex(4096);
        let (client_read, client_write) = split(client);
        let (_server_read, mut server_write) = split(server);
        server_write
            .write_all(b"Debugger listening\n{\"ready\":false,\"missingPlaywright\":true,\"error\":\"Cannot find module 'playwright'\"}\n")
            .await
            .unwrap();

        let mut channel = DriverChannel::new(client_write, BufReader::new(client_read));
        let hello = channel.handshake().await.unwrap();
        assert!(!hello.ready);
        assert!(hello.missing_playwright);
    }

    #[test]
    fn test_deadline_covers_whole_navigation_budget() {
        let visit = Visit {
            group: Group::Load,
            path: "/".to_string(),
            viewport: ViewportSize { width: 1280, height: 800 },
            wait_until: WaitUntil::NetworkIdle,
            navigation_timeout: Duration::from_millis(15_000),
            script_budget: Duration::from_millis(600),
            script: "return null;",
            args: serde_json::Value::Null,
        };
        assert_eq!(visit.deadline(), Duration::from_millis(15_600) + DEADLINE_MARGIN);
    }

    #[test]
    fn test_driver_bounds_network_idle_by_remaining_navigation_time() {
        assert!(DRIVER_SCRIPT.contains("const idleBudgetMs = request.timeoutMs - loadMs;"));
        assert!(DRIVER_SCRIPT.contains("{ timeout: idleBudgetMs }"));
        assert!(!DRIVER_SCRIPT.contains("'networkidle', { timeout: request.timeoutMs }"));
    }
}
