//! Page load: HTTP status and uncaught script errors, once per route

use serde_json::json;
use siteqa_common::profile::Route;
use siteqa_common::Reporter;

use super::{distinct, ms, Group, ProbeContext};
use crate::error::ProbeResult;
use crate::playwright::{PageEngine, PageReport, Visit, WaitUntil};

/// Lets late errors from deferred scripts surface before the context closes
const SCRIPT: &str = r#"
await page.waitForTimeout(args.settleMs);
return null;
"#;

#[derive(Debug, Clone, Default)]
pub struct LoadFacts {
    pub status: Option<u16>,
    pub errors: Vec<String>,
}

impl From<&PageReport> for LoadFacts {
    fn from(report: &PageReport) -> Self {
        Self {
            status: report.status,
            errors: report.page_errors.clone(),
        }
    }
}

fn route_label(route: &Route) -> String {
    format!("{} ({})", route.name, route.path)
}

pub fn assess(route: &Route, facts: &LoadFacts, reporter: &mut Reporter) {
    let name = route_label(route);
    let label = format!("{} returns 200", name);
    match facts.status {
        Some(200) => reporter.pass(label),
        Some(status) => reporter.fail(label, Some(&format!("got HTTP {}", status))),
        None => reporter.fail(label, Some("no HTTP response")),
    }

    let errors = distinct(&facts.errors);
    if errors.is_empty() {
        reporter.pass(format!("{}: no script errors", name));
    }
    for error in errors {
        reporter.fail(format!("{}: script error", name), Some(error.as_str()));
    }
}

pub async fn run<E: PageEngine>(ctx: &mut ProbeContext<'_, E>, reporter: &mut Reporter) -> ProbeResult<()> {
    let profile = ctx.profile;
    let settle = profile.probe.timing.interaction_settle_ms;

    for route in &profile.probe.routes {
        let visit = Visit {
            group: Group::Load,
            path: route.path.clone(),
            viewport: ctx.primary_viewport(),
            wait_until: WaitUntil::NetworkIdle,
            navigation_timeout: ctx.navigation_timeout(),
            script_budget: ms(settle),
            script: SCRIPT,
            args: json!({ "settleMs": settle }),
        };
        match ctx.visit(visit).await {
            Ok(report) => assess(route, &LoadFacts::from(&report), reporter),
            Err(e) => reporter.fail(format!("{} loads", route_label(route)), Some(&e.to_string())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteqa_common::report::captured;

    fn terms() -> Route {
        Route::new("terms", "/termos/")
    }

    #[test]
    fn test_clean_load_passes() {
        let (mut reporter, _) = captured();
        let facts = LoadFacts {
            status: Some(200),
            errors: vec![],
        };
        assess(&terms(), &facts, &mut reporter);
        assert_eq!((reporter.passed(), reporter.failed()), (2, 0));
    }

    #[test]
    fn test_not_found_is_single_failure() {
        let (mut reporter, capture) = captured();
        let facts = LoadFacts {
            status: Some(404),
            errors: vec![],
        };
        assess(&terms(), &facts, &mut reporter);
        assert_eq!(reporter.failed(), 1);
        assert!(capture.contents().contains("terms (/termos/) returns 200: got HTTP 404"));
    }

    #[test]
    fn test_each_distinct_script_error_fails() {
        let (mut reporter, _) = captured();
        let facts = LoadFacts {
            status: Some(200),
            errors: vec![
                "lucide is not defined".to_string(),
                "Cannot read properties of null".to_string(),
                "lucide is not defined".to_string(),
            ],
        };
        assess(&terms(), &facts, &mut reporter);
        assert_eq!(reporter.failed(), 2);
        assert_eq!(reporter.passed(), 1);
    }
}
