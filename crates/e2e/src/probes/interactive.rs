//! Interactive elements, home route only
//!
//! Accordion opening and anchor scrolling depend on CSS transition timing,
//! so their problems are warnings. Tabs and the phone input are hard checks.

use serde::Deserialize;
use serde_json::json;
use siteqa_common::profile::ProbeSelectors;
use siteqa_common::Reporter;

use super::{ms, Group, ProbeContext};
use crate::error::ProbeResult;
use crate::playwright::PageEngine;

const SCRIPT: &str = r#"
const timeout = args.actionTimeoutMs;
const settle = () => page.waitForTimeout(args.settleMs);
const out = { accordion: null, tab: { count: 0, error: null }, phone: null, anchor: null };

const question = page.locator(args.accordion).first();
if (await question.count()) {
  try {
    await question.click({ timeout });
    await settle();
    out.accordion = await question.evaluate((el) => {
      const panel = el.nextElementSibling;
      if (!panel) {
        return { panelFound: false, height: 0, constraintOverridden: false, error: null };
      }
      const style = getComputedStyle(panel);
      return {
        panelFound: true,
        height: panel.getBoundingClientRect().height,
        constraintOverridden: style.display !== 'none' && style.maxHeight !== '0px',
        error: null,
      };
    });
  } catch (err) {
    out.accordion = { panelFound: false, height: 0, constraintOverridden: false, error: err.message };
  }
}

const tabs = page.locator(args.tab);
out.tab.count = await tabs.count();
if (out.tab.count >= 2) {
  try {
    await tabs.nth(1).click({ timeout });
  } catch (err) {
    out.tab.error = err.message;
  }
}

const phone = page.locator(args.phoneInput).first();
if (await phone.count()) {
  try {
    await phone.fill(args.phoneSample, { timeout });
    out.phone = { value: await phone.inputValue(), error: null };
  } catch (err) {
    out.phone = { value: '', error: err.message };
  }
}

const link = page.locator(args.anchorLink).first();
if (await link.count()) {
  const href = (await link.getAttribute('href')) || '';
  try {
    await link.click({ timeout });
    await page.waitForTimeout(args.scrollSettleMs);
    const top = await page.evaluate((id) => {
      const target = document.getElementById(id);
      return target ? target.getBoundingClientRect().top : null;
    }, decodeURIComponent(href.slice(1)));
    out.anchor = { href, top, error: null };
  } catch (err) {
    out.anchor = { href, top: null, error: err.message };
  }
}
return out;
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccordionState {
    pub panel_found: bool,
    pub height: f64,
    pub constraint_overridden: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TabState {
    pub count: u32,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhoneState {
    pub value: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnchorState {
    pub href: String,
    pub top: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveFacts {
    pub accordion: Option<AccordionState>,
    pub tab: TabState,
    pub phone: Option<PhoneState>,
    pub anchor: Option<AnchorState>,
}

/// Expectations the assessment needs beyond the facts
pub struct InteractiveExpectations<'a> {
    pub selectors: &'a ProbeSelectors,
    pub phone_sample: &'a str,
    pub anchor_tolerance_px: u32,
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

pub fn assess(expect: &InteractiveExpectations<'_>, facts: &InteractiveFacts, reporter: &mut Reporter) {
    let label = "accordion opens on click";
    match &facts.accordion {
        None => reporter.warn(
            label,
            Some(&format!("no element matches {}", expect.selectors.accordion)),
        ),
        Some(AccordionState { error: Some(e), .. }) => reporter.warn(label, Some(e.as_str())),
        Some(a) if a.panel_found && (a.height > 0.0 || a.constraint_overridden) => reporter.pass(label),
        Some(a) if !a.panel_found => reporter.warn(label, Some("no answer panel follows the control")),
        Some(_) => reporter.warn(label, Some("answer panel stayed collapsed")),
    }

    let label = "second tab is clickable";
    match &facts.tab {
        TabState { count, .. } if *count < 2 => reporter.fail(
            label,
            Some(&format!("found {} element(s) matching {}", count, expect.selectors.tab)),
        ),
        TabState { error: Some(e), .. } => reporter.fail(label, Some(e.as_str())),
        _ => reporter.pass(label),
    }

    let label = "phone input retains digits";
    match &facts.phone {
        None => reporter.fail(
            label,
            Some(&format!("no element matches {}", expect.selectors.phone_input)),
        ),
        Some(PhoneState { error: Some(e), .. }) => reporter.fail(label, Some(e.as_str())),
        Some(p) if digits(&p.value) == digits(expect.phone_sample) => reporter.pass(label),
        Some(p) => reporter.fail(
            label,
            Some(&format!("typed {:?}, field holds {:?}", expect.phone_sample, p.value)),
        ),
    }

    match &facts.anchor {
        None => reporter.warn(
            "anchor link scrolls to target",
            Some(&format!("no element matches {}", expect.selectors.anchor_link)),
        ),
        Some(anchor) => {
            let label = format!("anchor {} scrolls to target", anchor.href);
            let tolerance = f64::from(expect.anchor_tolerance_px);
            match (&anchor.error, anchor.top) {
                (Some(e), _) => reporter.warn(label, Some(e.as_str())),
                (None, None) => reporter.warn(label, Some("target element not found")),
                (None, Some(top)) if top.abs() <= tolerance => reporter.pass(label),
                (None, Some(top)) => reporter.warn(
                    label,
                    Some(&format!(
                        "target is {:.0}px from the viewport top (tolerance {}px)",
                        top, expect.anchor_tolerance_px
                    )),
                ),
            }
        }
    }
}

pub async fn run<E: PageEngine>(ctx: &mut ProbeContext<'_, E>, reporter: &mut Reporter) -> ProbeResult<()> {
    let profile = ctx.profile;
    let probe = &profile.probe;
    let timing = &probe.timing;
    let selectors = &probe.selectors;

    let action_timeout = timing.interaction_settle_ms * 5;
    let args = json!({
        "accordion": selectors.accordion,
        "tab": selectors.tab,
        "phoneInput": selectors.phone_input,
        "anchorLink": selectors.anchor_link,
        "phoneSample": probe.phone_sample,
        "actionTimeoutMs": action_timeout,
        "settleMs": timing.interaction_settle_ms,
        "scrollSettleMs": timing.animation_settle_ms,
    });
    let budget = ms(action_timeout * 4 + timing.interaction_settle_ms + timing.animation_settle_ms);
    let visit = ctx.home_visit(Group::Interactive, SCRIPT, args, budget);

    let facts: InteractiveFacts = ctx.visit(visit).await?.facts()?;
    let expect = InteractiveExpectations {
        selectors,
        phone_sample: &probe.phone_sample,
        anchor_tolerance_px: timing.anchor_tolerance_px,
    };
    assess(&expect, &facts, reporter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteqa_common::report::captured;

    fn facts(value: serde_json::Value) -> InteractiveFacts {
        serde_json::from_value(value).unwrap()
    }

    fn run_assess(f: &InteractiveFacts) -> (u32, u32, u32, String) {
        let selectors = ProbeSelectors::default();
        let expect = InteractiveExpectations {
            selectors: &selectors,
            phone_sample: "11987654321",
            anchor_tolerance_px: 150,
        };
        let (mut reporter, capture) = captured();
        assess(&expect, f, &mut reporter);
        (reporter.passed(), reporter.failed(), reporter.warned(), capture.contents())
    }

    #[test]
    fn test_all_interactions_work() {
        let f = facts(json!({
            "accordion": { "panelFound": true, "height": 120.0, "constraintOverridden": true, "error": null },
            "tab": { "count": 2, "error": null },
            "phone": { "value": "(11) 98765-4321", "error": null },
            "anchor": { "href": "#features", "top": 12.5, "error": null },
        }));
        let (passed, failed, warned, _) = run_assess(&f);
        assert_eq!((passed, failed, warned), (4, 0, 0));
    }

    #[test]
    fn test_timing_sensitive_checks_only_warn() {
        let f = facts(json!({
            "accordion": { "panelFound": true, "height": 0.0, "constraintOverridden": false, "error": null },
            "tab": { "count": 2, "error": null },
            "phone": { "value": "11987654321", "error": null },
            "anchor": { "href": "#faq", "top": 900.0, "error": null },
        }));
        let (passed, failed, warned, out) = run_assess(&f);
        assert_eq!((passed, failed, warned), (2, 0, 2));
        assert!(out.contains("answer panel stayed collapsed"));
        assert!(out.contains("900px from the viewport top"));
    }

    #[test]
    fn test_hard_checks_fail() {
        let f = facts(json!({
            "accordion": null,
            "tab": { "count": 1, "error": null },
            "phone": { "value": "", "error": null },
            "anchor": null,
        }));
        let (passed, failed, warned, out) = run_assess(&f);
        assert_eq!((passed, failed, warned), (0, 2, 2));
        assert!(out.contains("found 1 element(s) matching .tab-btn"));
    }

    #[test]
    fn test_action_errors_are_reported_as_detail() {
        let f = facts(json!({
            "accordion": { "panelFound": false, "height": 0, "constraintOverridden": false, "error": "Timeout 3000ms exceeded" },
            "tab": { "count": 3, "error": "element is not visible" },
            "phone": { "value": "", "error": "element is disabled" },
            "anchor": { "href": "#contact", "top": null, "error": null },
        }));
        let (passed, failed, warned, out) = run_assess(&f);
        assert_eq!((passed, failed, warned), (0, 2, 2));
        assert!(out.contains("second tab is clickable: element is not visible"));
        assert!(out.contains("target element not found"));
    }
}
