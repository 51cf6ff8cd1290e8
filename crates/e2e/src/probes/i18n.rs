//! Language switching through the page contract, home route only

use serde::Deserialize;
use serde_json::json;
use siteqa_common::profile::I18nExpectations;
use siteqa_common::Reporter;

use super::{distinct, ms, Group, ProbeContext};
use crate::error::ProbeResult;
use crate::playwright::PageEngine;

const SCRIPT: &str = r#"
const lang = () => page.evaluate(() => document.documentElement.lang);
const heading = () => page.evaluate((sel) => {
  const el = document.querySelector(sel);
  return el ? el.textContent.trim() : null;
}, args.heading);
const switchTo = (code) => page.evaluate(([c, code]) => {
  window.__siteqaContract(c).switchLang(code);
}, [args.contract, code]);

const initialLang = await lang();
const switches = [];
for (const code of args.codes) {
  await switchTo(code);
  await page.waitForTimeout(args.settleMs);
  switches.push({ code, lang: await lang(), heading: await heading() });
}

const before = errors.length;
const thrown = [];
for (let i = 0; i < args.cycles; i++) {
  for (const code of args.codes) {
    try {
      await switchTo(code);
    } catch (err) {
      thrown.push(err.message);
    }
  }
}
await page.waitForTimeout(args.settleMs);
return { initialLang, switches, toggleErrors: errors.slice(before).concat(thrown) };
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchState {
    pub code: String,
    pub lang: String,
    pub heading: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct I18nFacts {
    pub initial_lang: String,
    pub switches: Vec<SwitchState>,
    pub toggle_errors: Vec<String>,
}

pub fn assess(expect: &I18nExpectations, facts: &I18nFacts, reporter: &mut Reporter) {
    let label = format!("initial language is {}", expect.default_locale);
    if facts.initial_lang == expect.default_locale {
        reporter.pass(label);
    } else {
        reporter.fail(label, Some(&format!("got {:?}", facts.initial_lang)));
    }

    for switch in &expect.switches {
        let Some(state) = facts.switches.iter().find(|s| s.code == switch.code) else {
            reporter.fail(format!("switch to {}", switch.code), Some("not exercised"));
            continue;
        };

        let label = format!("switch to {} sets lang {}", switch.code, switch.lang);
        if state.lang == switch.lang {
            reporter.pass(label);
        } else {
            reporter.fail(label, Some(&format!("got {:?}", state.lang)));
        }

        let label = format!("switch to {} updates heading", switch.code);
        match &state.heading {
            Some(text) if text.to_lowercase().contains(&switch.heading_contains.to_lowercase()) => {
                reporter.pass(label)
            }
            Some(text) => reporter.fail(
                label,
                Some(&format!("{:?} does not contain {:?}", text, switch.heading_contains)),
            ),
            None => reporter.fail(label, Some("heading not found")),
        }
    }

    let label = format!("{} rapid toggle cycles", expect.toggle_cycles);
    let errors = distinct(&facts.toggle_errors);
    if errors.is_empty() {
        reporter.pass(format!("{} raise no errors", label));
    }
    for error in errors {
        reporter.fail(label.clone(), Some(error.as_str()));
    }
}

pub async fn run<E: PageEngine>(ctx: &mut ProbeContext<'_, E>, reporter: &mut Reporter) -> ProbeResult<()> {
    let profile = ctx.profile;
    let expect = &profile.probe.i18n;
    let settle = profile.probe.timing.interaction_settle_ms;
    let codes: Vec<&str> = expect.switches.iter().map(|s| s.code.as_str()).collect();

    let args = json!({
        "contract": ctx.contract_args(),
        "heading": profile.probe.selectors.heading,
        "codes": codes,
        "cycles": expect.toggle_cycles,
        "settleMs": settle,
    });
    let budget = ms(settle * (codes.len() as u64 + 1)) + ms(5_000);
    let visit = ctx.home_visit(Group::I18n, SCRIPT, args, budget);

    let facts: I18nFacts = ctx.visit(visit).await?.facts()?;
    assess(expect, &facts, reporter);
    Ok(())
}
