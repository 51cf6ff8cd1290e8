//! Legal links, company registration and consent disclosure

use siteqa_common::{Reporter, SiteProfile};

use crate::document::Document;

/// Collapse runs of whitespace so phrases split across lines still match
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn run(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    let compliance = &profile.validator.compliance;

    let hrefs: Vec<&str> = doc
        .elements_by_tag("a")
        .into_iter()
        .filter_map(|a| a.attr("href"))
        .collect();
    for fragment in &compliance.legal_href_fragments {
        let label = format!("legal link {}", fragment);
        if hrefs.iter().any(|h| h.contains(fragment.as_str())) {
            reporter.pass(label);
        } else {
            reporter.fail(label, Some("no anchor href contains it"));
        }
    }

    let footer = doc.footer().map(|f| normalize(&f.visible_text()));
    for (what, needle) in [
        ("registration number", &compliance.registration_number),
        ("company name", &compliance.company_name),
    ] {
        let label = format!("footer {}", what);
        match &footer {
            Some(text) if text.contains(normalize(needle).as_str()) => reporter.pass(label),
            Some(_) => reporter.fail(label, Some(&format!("{:?} not in footer", needle))),
            None => reporter.fail(label, Some("document has no footer")),
        }
    }

    let body = normalize(&doc.visible_text());
    let label = "consent disclosure";
    if body.contains(normalize(&compliance.consent_phrase).as_str()) {
        reporter.pass(label);
    } else {
        reporter.fail(
            label,
            Some(&format!("{:?} not in body text", compliance.consent_phrase)),
        );
    }
}
