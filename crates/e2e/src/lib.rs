//! siteqa behavioral prober
//!
//! Drives a real browser against the running site and reports what it
//! observes through the shared reporter:
//! - Spawns the site server as a subprocess when asked to, or waits for an
//!   already running one to answer
//! - Controls Playwright through a Node driver speaking line-delimited JSON
//! - Runs the check groups in a fixed order, isolating their failures
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ProbeRunner (Rust)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ensure_site() -> ServerHandle | reachability poll          │
//! │  PlaywrightDriver::launch() -> driver.js (node)             │
//! │  run_groups(engine: impl PageEngine)                        │
//! │    ├── load         status + script errors per route        │
//! │    ├── responsive   overflow and layout per viewport        │
//! │    ├── images       every image decoded after scrolling     │
//! │    ├── i18n         language switch round trip              │
//! │    ├── animation    chat timers and restart                 │
//! │    ├── interactive  accordion, tabs, phone input, anchors   │
//! │    └── performance  load latency and page weight            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Visit { path, viewport, script, args } -> PageReport       │
//! │    one isolated browser context per visit                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod playwright;
pub mod probes;
pub mod runner;
pub mod server;

pub use error::{ProbeError, ProbeResult};
pub use playwright::{Browser, PageEngine, PlaywrightConfig, PlaywrightDriver};
pub use runner::{run_groups, ProbeRunner, RunnerConfig};
pub use server::{ServerConfig, ServerHandle};
