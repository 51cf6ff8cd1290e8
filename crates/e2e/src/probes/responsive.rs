//! Responsive layout, once per viewport against the home route

use serde::Deserialize;
use serde_json::json;
use siteqa_common::profile::{ProbeSelectors, Viewport};
use siteqa_common::Reporter;

use super::{ms, Group, ProbeContext};
use crate::error::ProbeResult;
use crate::playwright::{PageEngine, ViewportSize, Visit, WaitUntil};

const SCRIPT: &str = r#"
return await page.evaluate(async (a) => {
  const height = (el) => el.getBoundingClientRect().height;
  const nav = document.querySelector(a.nav);
  const mock = document.querySelector(a.mock);
  let mockState = null;
  if (mock) {
    const parent = mock.parentElement;
    mockState = {
      width: mock.getBoundingClientRect().width,
      displayed:
        getComputedStyle(mock).display !== 'none' &&
        (!parent || getComputedStyle(parent).display !== 'none'),
    };
  }
  const footer = document.querySelector(a.footer);
  if (footer) {
    footer.scrollIntoView();
    await new Promise((resolve) => setTimeout(resolve, a.pauseMs));
  }
  return {
    scrollWidth: document.documentElement.scrollWidth,
    navHeight: nav ? height(nav) : null,
    mock: mockState,
    footerHeight: footer ? height(footer) : null,
  };
}, args);
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockState {
    pub width: f64,
    pub displayed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveFacts {
    pub scroll_width: u32,
    pub nav_height: Option<f64>,
    pub mock: Option<MockState>,
    pub footer_height: Option<f64>,
}

fn check_height(
    reporter: &mut Reporter,
    label: String,
    selector: &str,
    height: Option<f64>,
) {
    match height {
        Some(h) if h > 0.0 => reporter.pass(label),
        Some(_) => reporter.fail(label, Some("rendered with zero height")),
        None => reporter.fail(label, Some(&format!("no element matches {}", selector))),
    }
}

pub fn assess(
    viewport: &Viewport,
    selectors: &ProbeSelectors,
    facts: &ResponsiveFacts,
    reporter: &mut Reporter,
) {
    let name = &viewport.name;

    let label = format!("{}: no horizontal overflow", name);
    if facts.scroll_width <= viewport.width {
        reporter.pass(label);
    } else {
        reporter.fail(
            label,
            Some(&format!(
                "document is {}px wide in a {}px viewport",
                facts.scroll_width, viewport.width
            )),
        );
    }

    check_height(
        reporter,
        format!("{}: navigation renders", name),
        &selectors.nav,
        facts.nav_height,
    );

    let label = format!("{}: {} visible", name, selectors.mock);
    match &facts.mock {
        Some(mock) if mock.displayed && mock.width > 0.0 => reporter.pass(label),
        Some(mock) if !mock.displayed => reporter.fail(label, Some("display suppressed")),
        Some(_) => reporter.fail(label, Some("rendered with zero width")),
        None => reporter.fail(label, Some("element not found")),
    }

    check_height(
        reporter,
        format!("{}: footer renders after scrolling", name),
        &selectors.footer,
        facts.footer_height,
    );
}

pub async fn run<E: PageEngine>(ctx: &mut ProbeContext<'_, E>, reporter: &mut Reporter) -> ProbeResult<()> {
    let profile = ctx.profile;
    let selectors = &profile.probe.selectors;
    let pause = profile.probe.timing.interaction_settle_ms;

    for viewport in &profile.probe.viewports {
        let visit = Visit {
            group: Group::Responsive,
            path: profile.probe.home_path().to_string(),
            viewport: ViewportSize::from(viewport),
            wait_until: WaitUntil::NetworkIdle,
            navigation_timeout: ctx.navigation_timeout(),
            script_budget: ms(pause),
            script: SCRIPT,
            args: json!({
                "nav": selectors.nav,
                "mock": selectors.mock,
                "footer": selectors.footer,
                "pauseMs": pause,
            }),
        };
        let facts = match ctx.visit(visit).await.and_then(|report| report.facts::<ResponsiveFacts>()) {
            Ok(facts) => facts,
            Err(e) => {
                reporter.fail(format!("{}: layout probe", viewport.name), Some(&e.to_string()));
                continue;
            }
        };
        assess(viewport, selectors, &facts, reporter);
    }
    Ok(())
}
