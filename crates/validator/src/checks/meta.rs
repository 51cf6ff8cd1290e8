//! Meta tag integrity

use siteqa_common::{FactSet, Reporter, SiteProfile};

use crate::document::Document;

const SOCIAL_TAGS: &[&str] = &["og:title", "og:description", "og:type", "og:locale", "og:image"];

/// Extract the meta facts the schema is evaluated against
pub fn extract(doc: &Document) -> FactSet {
    let mut facts = FactSet::new();
    if let Some(charset) = doc.charset() {
        facts.insert("charset", charset);
    }
    if let Some(viewport) = doc.meta_content("viewport") {
        facts.insert("viewport", viewport);
    }
    if let Some(title) = doc.title() {
        facts.insert("title", title);
    }
    if let Some(description) = doc.meta_content("description") {
        facts.insert("description", description.trim());
    }
    for tag in SOCIAL_TAGS {
        if let Some(content) = doc.meta_content(tag) {
            facts.insert(*tag, content.trim());
        }
    }
    if let Some(lang) = doc.html().and_then(|h| h.attr("lang")) {
        facts.insert("lang", lang);
    }
    facts
}

pub fn run(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    let facts = extract(doc);
    profile.validator.meta.evaluate(&facts, reporter);
}
