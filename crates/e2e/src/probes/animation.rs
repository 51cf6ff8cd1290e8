//! Chat animation state through the page contract, home route only

use serde::Deserialize;
use serde_json::json;
use siteqa_common::profile::{PageContract, ProbeSelectors};
use siteqa_common::Reporter;

use super::{ms, Group, ProbeContext};
use crate::error::ProbeResult;
use crate::playwright::PageEngine;

const SCRIPT: &str = r#"
const read = () => page.evaluate(([c, sel]) => {
  const site = window.__siteqaContract(c);
  const box = document.querySelector(sel);
  return {
    containerFound: !!box,
    messages: box ? box.children.length : 0,
    timeoutSet: site.messageTimeout() != null,
    trackerExists: site.timeoutTracker() != null,
  };
}, [args.contract, args.messages]);

await page.waitForTimeout(args.settleMs);
const initial = await read();
await page.evaluate((c) => window.__siteqaContract(c).restartChat(), args.contract);
await page.waitForTimeout(args.restartSettleMs);
const afterRestart = await read();
return { initial, afterRestart };
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    pub container_found: bool,
    pub messages: u32,
    pub timeout_set: bool,
    pub tracker_exists: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationFacts {
    pub initial: ChatState,
    pub after_restart: ChatState,
}

pub fn assess(
    contract: &PageContract,
    selectors: &ProbeSelectors,
    facts: &AnimationFacts,
    reporter: &mut Reporter,
) {
    let initial = &facts.initial;
    if !initial.container_found {
        reporter.fail(
            format!("message container {}", selectors.messages),
            Some("element not found"),
        );
    } else {
        let label = "animation started";
        if initial.messages > 0 {
            reporter.pass(label);
        } else {
            reporter.fail(label, Some("no messages rendered after settling"));
        }
    }

    let label = format!("{} is set", contract.message_timeout_global);
    if initial.timeout_set {
        reporter.pass(label);
    } else {
        reporter.fail(label, Some("no pending message timeout"));
    }

    let label = format!("{} exists", contract.timeout_tracker_global);
    if initial.tracker_exists {
        reporter.pass(label);
    } else {
        reporter.fail(label, Some("timeout tracking collection missing"));
    }

    if initial.container_found {
        let label = format!("animation continues after {}()", contract.restart_fn);
        if facts.after_restart.messages > 0 {
            reporter.pass(label);
        } else {
            reporter.fail(label, Some("no messages rendered after restart"));
        }
    }
}

pub async fn run<E: PageEngine>(ctx: &mut ProbeContext<'_, E>, reporter: &mut Reporter) -> ProbeResult<()> {
    let profile = ctx.profile;
    let timing = &profile.probe.timing;
    let args = json!({
        "contract": ctx.contract_args(),
        "messages": profile.probe.selectors.messages,
        "settleMs": timing.animation_settle_ms,
        "restartSettleMs": timing.restart_settle_ms,
    });
    let budget = ms(timing.animation_settle_ms + timing.restart_settle_ms);
    let visit = ctx.home_visit(Group::Animation, SCRIPT, args, budget);

    let facts: AnimationFacts = ctx.visit(visit).await?.facts()?;
    assess(&profile.contract, &profile.probe.selectors, &facts, reporter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteqa_common::report::captured;

    fn state(container_found: bool, messages: u32, timeout_set: bool, tracker_exists: bool) -> ChatState {
        ChatState {
            container_found,
            messages,
            timeout_set,
            tracker_exists,
        }
    }

    #[test]
    fn test_running_animation_passes() {
        let (mut reporter, _) = captured();
        let facts = AnimationFacts {
            initial: state(true, 3, true, true),
            after_restart: state(true, 1, true, true),
        };
        assess(&PageContract::default(), &ProbeSelectors::default(), &facts, &mut reporter);
        assert_eq!((reporter.passed(), reporter.failed()), (4, 0));
    }

    #[test]
    fn test_restart_that_stops_animation_fails() {
        let (mut reporter, capture) = captured();
        let facts = AnimationFacts {
            initial: state(true, 3, true, true),
            after_restart: state(true, 0, false, true),
        };
        assess(&PageContract::default(), &ProbeSelectors::default(), &facts, &mut reporter);
        assert_eq!(reporter.failed(), 1);
        assert!(capture.contents().contains("animation continues after restartChat()"));
    }

    #[test]
    fn test_missing_container_skips_message_checks() {
        let (mut reporter, _) = captured();
        let facts = AnimationFacts {
            initial: state(false, 0, true, true),
            after_restart: state(false, 0, true, true),
        };
        assess(&PageContract::default(), &ProbeSelectors::default(), &facts, &mut reporter);
        assert_eq!((reporter.passed(), reporter.failed()), (2, 1));
    }
}
