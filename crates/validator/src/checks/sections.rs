//! Required landmark sections

use siteqa_common::{Reporter, SiteProfile};

use crate::document::Document;

pub fn run(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    for section in &profile.validator.sections {
        let label = format!("section {}", section);
        match doc.select_str(section) {
            Ok(found) if !found.is_empty() => reporter.pass(label),
            Ok(_) => reporter.fail(label, Some("not found in document")),
            Err(e) => reporter.fail(label, Some(&e.to_string())),
        }
    }
}
