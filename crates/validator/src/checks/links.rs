//! Link integrity: in-page anchors and relative links

use std::path::Path;

use siteqa_common::{Reporter, SiteProfile};

use super::{is_remote, strip_suffixes};
use crate::document::Document;

/// Why a link does not resolve, if it does not. A relative link resolves
/// when its literal path exists, file or directory, or when it names a
/// directory holding `index.html`.
pub fn broken_reason(href: &str, ids: &std::collections::HashSet<&str>, base_dir: &Path) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href == "#" || is_remote(href) {
        return None;
    }

    if let Some(target) = href.strip_prefix('#') {
        if ids.contains(target) {
            return None;
        }
        return Some(format!("no element with id \"{}\"", target));
    }

    let path = strip_suffixes(href).trim_start_matches('/');
    if path.is_empty() {
        // "/" or "?x" points at the document's own directory
        return None;
    }
    let literal = base_dir.join(path);
    let as_dir = literal.join("index.html");
    if literal.exists() || as_dir.is_file() {
        return None;
    }
    Some(format!(
        "neither {} nor {} exists",
        literal.display(),
        as_dir.display()
    ))
}

pub fn run(doc: &Document, _profile: &SiteProfile, reporter: &mut Reporter) {
    let ids = doc.ids();
    let mut checked = 0;
    let mut broken = 0;

    for anchor in doc.elements_by_tag("a") {
        let Some(href) = anchor.attr("href") else {
            continue;
        };
        checked += 1;
        if let Some(reason) = broken_reason(href, &ids, &doc.base_dir) {
            broken += 1;
            reporter.fail(format!("broken link {}", href), Some(&reason));
        }
    }

    if broken == 0 {
        reporter.pass(format!("all {} links resolve", checked));
    }
}
