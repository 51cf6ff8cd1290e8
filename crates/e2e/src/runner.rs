//! Probe runner that orchestrates the site server, the Playwright driver
//! and the check groups

use std::time::{Duration, Instant};

use siteqa_common::{Reporter, SiteProfile};
use tracing::{debug, info, warn};

use crate::error::ProbeResult;
use crate::playwright::{PageEngine, PlaywrightConfig, PlaywrightDriver};
use crate::probes::{Group, ProbeContext};
use crate::server::{wait_until_reachable, ServerConfig, ServerHandle};

/// Configuration for a behavioral run
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Site under test
    pub base_url: String,

    pub playwright: PlaywrightConfig,

    /// Command that serves the site, started before probing and stopped after
    pub server_command: Option<String>,

    /// How long to wait for the site to answer before giving up
    pub reachability_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            playwright: PlaywrightConfig::default(),
            server_command: None,
            reachability_timeout: Duration::from_secs(30),
        }
    }
}

/// Behavioral run against one base URL
pub struct ProbeRunner {
    config: RunnerConfig,
    server: Option<ServerHandle>,
}

impl ProbeRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            server: None,
        }
    }

    /// Start the configured server, or check that the site already answers
    pub async fn ensure_site(&mut self) -> ProbeResult<()> {
        if self.server.is_some() {
            return Ok(());
        }
        match &self.config.server_command {
            Some(command) => {
                let server = ServerHandle::spawn(&ServerConfig {
                    command: command.clone(),
                    base_url: self.config.base_url.clone(),
                    startup_timeout: self.config.reachability_timeout,
                })
                .await?;
                self.server = Some(server);
            }
            None => {
                wait_until_reachable(&self.config.base_url, self.config.reachability_timeout).await?;
            }
        }
        Ok(())
    }

    /// Stop the server if this runner started one
    pub async fn stop_server(&mut self) -> ProbeResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop().await?;
        }
        Ok(())
    }

    /// Run every group. Errors returned here are fatal: the site could not
    /// be reached or the browser could not be launched.
    pub async fn run(&mut self, profile: &SiteProfile, reporter: &mut Reporter) -> ProbeResult<()> {
        self.ensure_site().await?;

        let mut driver = PlaywrightDriver::launch(&self.config.playwright).await?;
        info!(
            "Probing {} with {} {}",
            self.config.base_url,
            self.config.playwright.browser.as_str(),
            driver.browser_version()
        );

        run_groups(&mut driver, &self.config.base_url, profile, reporter).await;

        if let Err(e) = driver.shutdown().await {
            warn!("Driver shutdown: {}", e);
        }
        self.stop_server().await
    }
}

/// Run all groups in order against `engine`. A group that errors records
/// one failure carrying the error and the sequence continues.
pub async fn run_groups<E: PageEngine>(
    engine: &mut E,
    base_url: &str,
    profile: &SiteProfile,
    reporter: &mut Reporter,
) {
    let mut ctx = ProbeContext::new(engine, base_url, profile);

    for group in Group::ALL {
        reporter.section(group.title());
        let start = Instant::now();

        if let Err(e) = group.run(&mut ctx, reporter).await {
            warn!("{} checks aborted: {}", group.title(), e);
            reporter.fail(format!("{} checks", group.title()), Some(&e.to_string()));
        }

        debug!("{} finished in {} ms", group.title(), start.elapsed().as_millis());
    }
}
