//! Behavioral check groups
//!
//! Each group sends one or more visits to the page engine. A visit runs a
//! probe script in a fresh browser context and returns plain facts; the
//! group's `assess` function turns those facts into outcomes without any
//! browser involvement. Groups run in a fixed order.

pub mod animation;
pub mod i18n;
pub mod images;
pub mod interactive;
pub mod load;
pub mod performance;
pub mod responsive;

use std::time::Duration;

use serde_json::json;
use siteqa_common::{Reporter, SiteProfile};

use crate::error::ProbeResult;
use crate::playwright::{PageEngine, PageReport, ViewportSize, Visit, WaitUntil};

/// Behavioral check groups, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Load,
    Responsive,
    Images,
    I18n,
    Animation,
    Interactive,
    Performance,
}

impl Group {
    pub const ALL: [Group; 7] = [
        Group::Load,
        Group::Responsive,
        Group::Images,
        Group::I18n,
        Group::Animation,
        Group::Interactive,
        Group::Performance,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Group::Load => "Page load",
            Group::Responsive => "Responsive layout",
            Group::Images => "Image loading",
            Group::I18n => "Internationalization",
            Group::Animation => "Chat animation",
            Group::Interactive => "Interactive elements",
            Group::Performance => "Performance",
        }
    }

    /// Run the group. Per-route and per-viewport errors are recorded
    /// inside; an error returned here aborted the whole group.
    pub async fn run<E: PageEngine>(
        self,
        ctx: &mut ProbeContext<'_, E>,
        reporter: &mut Reporter,
    ) -> ProbeResult<()> {
        match self {
            Group::Load => load::run(ctx, reporter).await,
            Group::Responsive => responsive::run(ctx, reporter).await,
            Group::Images => images::run(ctx, reporter).await,
            Group::I18n => i18n::run(ctx, reporter).await,
            Group::Animation => animation::run(ctx, reporter).await,
            Group::Interactive => interactive::run(ctx, reporter).await,
            Group::Performance => performance::run(ctx, reporter).await,
        }
    }
}

/// Shared state the groups probe through
pub struct ProbeContext<'a, E> {
    pub engine: &'a mut E,
    pub base_url: &'a str,
    pub profile: &'a SiteProfile,
}

impl<'a, E: PageEngine> ProbeContext<'a, E> {
    pub fn new(engine: &'a mut E, base_url: &'a str, profile: &'a SiteProfile) -> Self {
        Self {
            engine,
            base_url,
            profile,
        }
    }

    pub async fn visit(&mut self, visit: Visit) -> ProbeResult<PageReport> {
        self.engine.visit(self.base_url, visit).await
    }

    /// Viewport used by groups that do not iterate viewports: the one named
    /// "desktop", else the first configured
    pub fn primary_viewport(&self) -> ViewportSize {
        let viewports = &self.profile.probe.viewports;
        viewports
            .iter()
            .find(|vp| vp.name == "desktop")
            .or_else(|| viewports.first())
            .map(ViewportSize::from)
            .unwrap_or(ViewportSize {
                width: 1280,
                height: 800,
            })
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.profile.probe.timing.navigation_timeout_ms)
    }

    /// A network-idle visit to the home route at the primary viewport
    pub fn home_visit(
        &self,
        group: Group,
        script: &'static str,
        args: serde_json::Value,
        script_budget: Duration,
    ) -> Visit {
        Visit {
            group,
            path: self.profile.probe.home_path().to_string(),
            viewport: self.primary_viewport(),
            wait_until: WaitUntil::NetworkIdle,
            navigation_timeout: self.navigation_timeout(),
            script_budget,
            script,
            args,
        }
    }

    /// Contract names in the shape the page-side accessor expects
    pub fn contract_args(&self) -> serde_json::Value {
        let c = &self.profile.contract;
        json!({
            "version": c.version,
            "introspectionGlobal": c.introspection_global,
            "switchLangFn": c.switch_lang_fn,
            "restartFn": c.restart_fn,
            "messageTimeoutGlobal": c.message_timeout_global,
            "timeoutTrackerGlobal": c.timeout_tracker_global,
            "defaultLangVar": c.default_lang_var,
        })
    }
}

/// Distinct values in first-seen order
pub(crate) fn distinct(values: &[String]) -> Vec<&String> {
    let mut seen = std::collections::HashSet::new();
    values.iter().filter(|v| seen.insert(v.as_str())).collect()
}

pub(crate) fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_order() {
        let titles: Vec<&str> = Group::ALL.iter().map(Group::title).collect();
        assert_eq!(
            titles,
            vec![
                "Page load",
                "Responsive layout",
                "Image loading",
                "Internationalization",
                "Chat animation",
                "Interactive elements",
                "Performance",
            ]
        );
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        let values: Vec<String> = ["b", "a", "b", "c", "a"].iter().map(|s| s.to_string()).collect();
        let found: Vec<&str> = distinct(&values).into_iter().map(String::as_str).collect();
        assert_eq!(found, vec!["b", "a", "c"]);
    }
}
