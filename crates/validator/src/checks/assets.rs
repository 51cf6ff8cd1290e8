//! Local asset existence
//!
//! References are scanned from the raw text rather than the tree so that
//! `url(...)` occurrences inside inline styles and style blocks are covered
//! by the same pass as `<img src>` and `<link href>`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use siteqa_common::{Reporter, SiteProfile};
use tracing::debug;

use super::{is_remote, strip_suffixes};
use crate::document::Document;

fn regex(pattern: &'static str, desc: &'static str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid {desc} regex: {err}"))
}

/// Local references in first-seen order, de-duplicated
pub fn local_references(raw: &str) -> Vec<String> {
    static IMG_SRC: OnceLock<Regex> = OnceLock::new();
    static LINK_HREF: OnceLock<Regex> = OnceLock::new();
    static CSS_URL: OnceLock<Regex> = OnceLock::new();

    let img_src = IMG_SRC.get_or_init(|| {
        regex(r#"(?is)<img\b[^>]*?[\s"']src\s*=\s*["']([^"']*)["']"#, "img src")
    });
    let link_href = LINK_HREF.get_or_init(|| {
        regex(r#"(?is)<link\b[^>]*?[\s"']href\s*=\s*["']([^"']*)["']"#, "link href")
    });
    let css_url = CSS_URL.get_or_init(|| {
        regex(r#"url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#, "css url")
    });

    // Collect with source offsets so output order follows the document
    let mut found: Vec<(usize, String)> = Vec::new();
    for re in [img_src, link_href, css_url] {
        for caps in re.captures_iter(raw) {
            if let Some(m) = caps.get(1) {
                found.push((m.start(), m.as_str().trim().to_string()));
            }
        }
    }
    found.sort_by_key(|(offset, _)| *offset);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|(_, reference)| reference)
        .filter(|r| !r.is_empty() && !r.starts_with('#') && !is_remote(r))
        .filter(|r| seen.insert(r.clone()))
        .collect()
}

/// Resolve a local reference against the document directory. A leading `/`
/// is taken as the site root, which is the document's own directory.
pub fn resolve(base_dir: &Path, reference: &str) -> PathBuf {
    let path = strip_suffixes(reference);
    base_dir.join(path.trim_start_matches('/'))
}

pub fn run(doc: &Document, _profile: &SiteProfile, reporter: &mut Reporter) {
    let references = local_references(&doc.raw);
    debug!("Found {} local asset references", references.len());

    let mut missing = 0;
    for reference in &references {
        let path = resolve(&doc.base_dir, reference);
        if !path.exists() {
            missing += 1;
            reporter.fail(
                format!("missing asset {}", reference),
                Some(&format!("not found at {}", path.display())),
            );
        }
    }

    if missing == 0 {
        reporter.pass(format!("all {} local assets exist", references.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all_reference_kinds_in_order() {
        let raw = r#"
            <link rel="stylesheet" href="css/site.css">
            <link rel="preconnect" href="https://fonts.googleapis.com">
            <style>.hero { background: url('img/hero.webp'); }</style>
            <img src="/img/logo.svg" alt="Logo">
            <img src="data:image/png;base64,AAAA" alt="">
            <div style="background-image: url(img/hero.webp)"></div>
        "#;
        assert_eq!(
            local_references(raw),
            vec!["css/site.css", "img/hero.webp", "/img/logo.svg"]
        );
    }

    #[test]
    fn test_prefixed_attributes_do_not_shadow_real_ones() {
        let raw = r#"
            <img data-src="img/hero.webp" src="img/placeholder.png" alt="">
            <link data-href="css/print.css" rel="stylesheet" href="css/site.css">
        "#;
        assert_eq!(
            local_references(raw),
            vec!["img/placeholder.png", "css/site.css"]
        );
    }

    #[test]
    fn test_resolve_root_relative() {
        let base = Path::new("/srv/site");
        assert_eq!(resolve(base, "/img/a.png?v=3"), PathBuf::from("/srv/site/img/a.png"));
        assert_eq!(resolve(base, "img/a.png"), PathBuf::from("/srv/site/img/a.png"));
    }
}
