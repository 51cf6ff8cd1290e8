//! Content structure: repeating-unit counts and per-card completeness

use std::collections::HashSet;

use siteqa_common::{FactSet, Reporter, SiteProfile};

use crate::document::{Document, Element};
use crate::error::ValidatorResult;
use crate::selector::Selector;

pub fn run(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    let validator = &profile.validator;
    let mut facts = FactSet::new();
    let mut broken: HashSet<String> = HashSet::new();

    for target in &validator.content {
        match doc.select_str(&target.selector) {
            Ok(found) => facts.insert(target.name.as_str(), found.len()),
            Err(e) => {
                reporter.fail(format!("content: {}", target.name), Some(&e.to_string()));
                broken.insert(target.name.clone());
            }
        }
    }

    let partners = doc
        .elements_by_tag("img")
        .into_iter()
        .filter_map(|img| img.attr("alt"))
        .filter(|alt| validator.partners.alt_allow_list.iter().any(|a| a == alt.trim()))
        .count();
    facts.insert(validator.partners.name.as_str(), partners);

    let mut schema = validator.content_schema();
    schema.rules.retain(|rule| !broken.contains(&rule.field));
    schema.evaluate(&facts, reporter);

    if let Err(e) = check_cards(doc, profile, reporter) {
        reporter.fail("content: card completeness", Some(&e.to_string()));
    }
}

/// Parts of one card that are missing, empty when complete
fn missing_parts(card: &Element, parts: &CardSelectors, min_tags: usize) -> Vec<String> {
    let mut missing = Vec::new();
    for (name, selector) in [("label", &parts.label), ("title", &parts.title), ("body", &parts.body)] {
        if card.select(selector).is_empty() {
            missing.push(name.to_string());
        }
    }
    let tags = card.select(&parts.tag).len();
    if tags < min_tags {
        missing.push(format!("tags ({}/{})", tags, min_tags));
    }
    missing
}

struct CardSelectors {
    card: Selector,
    label: Selector,
    title: Selector,
    body: Selector,
    tag: Selector,
}

fn check_cards(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) -> ValidatorResult<()> {
    let shape = &profile.validator.card;
    let parts = CardSelectors {
        card: Selector::parse(&shape.selector)?,
        label: Selector::parse(&shape.label)?,
        title: Selector::parse(&shape.title)?,
        body: Selector::parse(&shape.body)?,
        tag: Selector::parse(&shape.tag)?,
    };

    let cards = doc.select(&parts.card);
    if cards.is_empty() {
        return Ok(());
    }

    let mut incomplete = 0;
    for (idx, card) in cards.iter().enumerate() {
        let missing = missing_parts(card, &parts, shape.min_tags);
        if missing.is_empty() {
            continue;
        }
        incomplete += 1;
        let title = card
            .select(&parts.title)
            .first()
            .map(|t| t.text().trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "untitled".to_string());
        reporter.fail(
            format!("card #{} ({}) incomplete", idx + 1, title),
            Some(&format!("missing {}", missing.join(", "))),
        );
    }

    if incomplete == 0 {
        reporter.pass(format!("all {} cards complete", cards.len()));
    }
    Ok(())
}
