//! Image loading after a full scroll pass, home route only

use serde::Deserialize;
use serde_json::json;
use siteqa_common::Reporter;

use super::{ms, Group, ProbeContext};
use crate::error::ProbeResult;
use crate::playwright::PageEngine;

/// Scroll in fixed steps so lazy images cross their load threshold, return
/// to the top, then give pending images a bounded chance to finish.
const SCRIPT: &str = r#"
const images = await page.evaluate(async (a) => {
  const pause = (delay) => new Promise((resolve) => setTimeout(resolve, delay));
  const total = document.documentElement.scrollHeight;
  for (let y = 0; y < total; y += a.stepPx) {
    window.scrollTo(0, y);
    await pause(a.pauseMs);
  }
  window.scrollTo(0, document.documentElement.scrollHeight);
  await pause(a.pauseMs);
  window.scrollTo(0, 0);
  await pause(a.pauseMs);

  const pending = Array.from(document.images).filter((img) => !img.complete);
  await Promise.race([
    Promise.all(pending.map((img) => new Promise((resolve) => {
      img.addEventListener('load', resolve, { once: true });
      img.addEventListener('error', resolve, { once: true });
    }))),
    pause(a.loadWaitMs),
  ]);

  return Array.from(document.images)
    .map((img) => ({ src: img.currentSrc || img.src, complete: img.complete, naturalWidth: img.naturalWidth }))
    .filter((img) => img.src && !img.src.startsWith('data:'));
}, args);
return { images };
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageState {
    pub src: String,
    pub complete: bool,
    pub natural_width: u32,
}

impl ImageState {
    pub fn is_loaded(&self) -> bool {
        self.complete && self.natural_width > 0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageFacts {
    pub images: Vec<ImageState>,
}

pub fn assess(facts: &ImageFacts, reporter: &mut Reporter) {
    let mut seen = std::collections::HashSet::new();
    let mut broken = 0;
    for image in facts.images.iter().filter(|i| !i.is_loaded()) {
        if !seen.insert(image.src.as_str()) {
            continue;
        }
        broken += 1;
        let detail = if image.complete {
            "decoded with zero natural width"
        } else {
            "never finished loading"
        };
        reporter.fail(format!("broken image {}", image.src), Some(detail));
    }
    if broken == 0 {
        reporter.pass(format!("all {} images loaded", facts.images.len()));
    }
}

pub async fn run<E: PageEngine>(ctx: &mut ProbeContext<'_, E>, reporter: &mut Reporter) -> ProbeResult<()> {
    let profile = ctx.profile;
    let timing = &profile.probe.timing;
    let args = json!({
        "stepPx": timing.scroll_step_px,
        "pauseMs": timing.scroll_pause_ms,
        "loadWaitMs": timing.animation_settle_ms,
    });
    // The scroll pass length depends on page height; allow as long as a navigation
    let budget = ctx.navigation_timeout() + ms(timing.animation_settle_ms);
    let visit = ctx.home_visit(Group::Images, SCRIPT, args, budget);

    let facts: ImageFacts = ctx.visit(visit).await?.facts()?;
    assess(&facts, reporter);
    Ok(())
}
