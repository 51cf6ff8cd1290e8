//! Load latency and page weight, home route only

use serde::Deserialize;
use serde_json::json;
use siteqa_common::profile::PerformanceBudget;
use siteqa_common::{Outcome, Reporter};

use super::{ms, Group, ProbeContext};
use crate::error::{ProbeError, ProbeResult};
use crate::playwright::{PageEngine, WaitUntil};

const SCRIPT: &str = r#"
return await page.evaluate(() => {
  const nav = performance.getEntriesByType('navigation')[0];
  const resources = performance.getEntriesByType('resource');
  let transferBytes = nav ? nav.transferSize || 0 : 0;
  for (const entry of resources) {
    transferBytes += entry.transferSize || 0;
  }
  return {
    transferBytes,
    resourceCount: resources.length,
    loadEventMs: nav && nav.loadEventEnd > 0 ? Math.round(nav.loadEventEnd - nav.startTime) : null,
  };
});
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageWeight {
    transfer_bytes: u64,
    resource_count: u32,
    load_event_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceFacts {
    pub load_ms: u64,
    pub transfer_bytes: u64,
    pub resource_count: u32,
}

pub fn classify_load(load_ms: u64, budget: &PerformanceBudget) -> Outcome {
    if load_ms < budget.load_pass_ms {
        Outcome::Pass
    } else if load_ms < budget.load_fail_ms {
        Outcome::Warn
    } else {
        Outcome::Fail
    }
}

pub fn classify_transfer(kilobytes: u64, budget: &PerformanceBudget) -> Outcome {
    if kilobytes < budget.transfer_warn_kb {
        Outcome::Pass
    } else {
        Outcome::Warn
    }
}

pub fn assess(budget: &PerformanceBudget, facts: &PerformanceFacts, reporter: &mut Reporter) {
    let outcome = classify_load(facts.load_ms, budget);
    let detail = match outcome {
        Outcome::Pass => format!("{} ms", facts.load_ms),
        _ => format!(
            "{} ms (pass < {} ms, fail >= {} ms)",
            facts.load_ms, budget.load_pass_ms, budget.load_fail_ms
        ),
    };
    reporter.record(outcome, "page load time", Some(&detail));

    let kilobytes = facts.transfer_bytes / 1024;
    let outcome = classify_transfer(kilobytes, budget);
    let detail = format!(
        "{} KB across {} resources{}",
        kilobytes,
        facts.resource_count,
        if outcome == Outcome::Warn {
            format!(" (warn >= {} KB)", budget.transfer_warn_kb)
        } else {
            String::new()
        }
    );
    reporter.record(outcome, "total transfer size", Some(&detail));
}

pub async fn run<E: PageEngine>(ctx: &mut ProbeContext<'_, E>, reporter: &mut Reporter) -> ProbeResult<()> {
    let profile = ctx.profile;
    let mut visit = ctx.home_visit(Group::Performance, SCRIPT, json!({}), ms(5_000));
    visit.wait_until = WaitUntil::Load;
    visit.navigation_timeout = ms(profile.probe.timing.performance_timeout_ms);

    let report = ctx.visit(visit).await?;
    let weight: PageWeight = report.facts()?;
    let load_ms = report
        .load_ms
        .or(weight.load_event_ms)
        .ok_or_else(|| ProbeError::Driver("no load timing reported".into()))?;

    let facts = PerformanceFacts {
        load_ms,
        transfer_bytes: weight.transfer_bytes,
        resource_count: weight.resource_count,
    };
    assess(&profile.probe.performance, &facts, reporter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteqa_common::report::captured;
    use test_case::test_case;

    #[test_case(0, Outcome::Pass; "instant")]
    #[test_case(2_999, Outcome::Pass; "just under pass")]
    #[test_case(3_000, Outcome::Warn; "at pass threshold")]
    #[test_case(4_999, Outcome::Warn; "just under fail")]
    #[test_case(5_000, Outcome::Fail; "at fail threshold")]
    #[test_case(12_000, Outcome::Fail; "very slow")]
    fn test_classify_load(load_ms: u64, expected: Outcome) {
        assert_eq!(classify_load(load_ms, &PerformanceBudget::default()), expected);
    }

    #[test_case(812, Outcome::Pass; "light page")]
    #[test_case(4_999, Outcome::Pass; "just under")]
    #[test_case(5_000, Outcome::Warn; "at threshold")]
    fn test_classify_transfer(kilobytes: u64, expected: Outcome) {
        assert_eq!(classify_transfer(kilobytes, &PerformanceBudget::default()), expected);
    }

    #[test]
    fn test_heavy_slow_page_never_fails_on_weight() {
        let (mut reporter, capture) = captured();
        let facts = PerformanceFacts {
            load_ms: 3_500,
            transfer_bytes: 6_000 * 1024,
            resource_count: 48,
        };
        assess(&PerformanceBudget::default(), &facts, &mut reporter);
        assert_eq!((reporter.passed(), reporter.failed(), reporter.warned()), (0, 0, 2));
        assert!(capture.contents().contains("6000 KB across 48 resources (warn >= 5000 KB)"));
    }
}
