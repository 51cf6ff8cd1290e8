//! Declared third-party origins

use siteqa_common::{Reporter, SiteProfile};

use crate::document::Document;

pub fn run(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    for origin in &profile.validator.dependencies {
        let label = format!("dependency {}", origin);
        if doc.raw.contains(origin.as_str()) {
            reporter.pass(label);
        } else {
            reporter.fail(label, Some("origin not referenced"));
        }
    }
}
