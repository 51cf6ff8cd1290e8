//! Behavioral probing of the running site

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use siteqa_common::{Reporter, SiteProfile};
use siteqa_e2e::{Browser, PlaywrightConfig, ProbeRunner, RunnerConfig};

use crate::output::print_banner;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Base URL of the site under test
    #[arg(default_value = "http://localhost:8080", env = "SITEQA_BASE_URL")]
    pub base_url: String,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    pub browser: Browser,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Node executable running the driver
    #[arg(long, default_value = "node")]
    pub node: PathBuf,

    /// Command serving the site, started before probing and stopped after
    #[arg(long)]
    pub server_cmd: Option<String>,

    /// Seconds to wait for the site to answer
    #[arg(long, default_value_t = 30)]
    pub wait_secs: u64,
}

impl ProbeArgs {
    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            playwright: PlaywrightConfig {
                node: self.node.clone(),
                browser: self.browser,
                headless: !self.headed,
                ..Default::default()
            },
            server_command: self.server_cmd.clone(),
            reachability_timeout: Duration::from_secs(self.wait_secs),
        }
    }
}

pub async fn execute(args: ProbeArgs, profile: &SiteProfile, reporter: &mut Reporter) -> Result<()> {
    print_banner("Behavioral probe", &args.base_url);
    let mut runner = ProbeRunner::new(args.runner_config());
    runner
        .run(profile, reporter)
        .await
        .with_context(|| format!("probe of {} aborted", args.base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_config_from_args() {
        let args = ProbeArgs {
            base_url: "http://127.0.0.1:4000/".to_string(),
            browser: Browser::Firefox,
            headed: true,
            node: PathBuf::from("/usr/local/bin/node"),
            server_cmd: Some("python3 -m http.server 4000".to_string()),
            wait_secs: 5,
        };
        let config = args.runner_config();
        assert_eq!(config.base_url, "http://127.0.0.1:4000");
        assert_eq!(config.playwright.browser, Browser::Firefox);
        assert!(!config.playwright.headless);
        assert_eq!(config.reachability_timeout, Duration::from_secs(5));
        assert_eq!(config.server_command.as_deref(), Some("python3 -m http.server 4000"));
    }
}
