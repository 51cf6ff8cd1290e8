//! Structural check groups.
//!
//! Groups run in a fixed order against one parsed document. Each group is
//! independent: a failing or erroring group records its outcomes and the
//! next group runs regardless. Extraction problems (an invalid selector from
//! the profile, say) become failures of the group that hit them.

pub mod assets;
pub mod compliance;
pub mod content;
pub mod conversations;
pub mod dependencies;
pub mod images;
pub mod links;
pub mod meta;
pub mod quality;
pub mod scripts;
pub mod sections;

use siteqa_common::{Reporter, SiteProfile};

use crate::document::Document;

/// Signature every group implements
pub type GroupFn = fn(&Document, &SiteProfile, &mut Reporter);

/// A named check group
pub struct CheckGroup {
    pub title: &'static str,
    pub run: GroupFn,
}

/// All groups, in required execution order
pub fn all_groups() -> Vec<CheckGroup> {
    vec![
        CheckGroup { title: "Meta tags", run: meta::run },
        CheckGroup { title: "Required sections", run: sections::run },
        CheckGroup { title: "Content structure", run: content::run },
        CheckGroup { title: "Asset references", run: assets::run },
        CheckGroup { title: "Link integrity", run: links::run },
        CheckGroup { title: "Image quality", run: images::run },
        CheckGroup { title: "Embedded script contract", run: scripts::run },
        CheckGroup { title: "Conversation data", run: conversations::run },
        CheckGroup { title: "Compliance content", run: compliance::run },
        CheckGroup { title: "Content quality", run: quality::run },
        CheckGroup { title: "External dependencies", run: dependencies::run },
    ]
}

/// Run every group in order
pub fn run_all(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    for group in all_groups() {
        reporter.section(group.title);
        (group.run)(doc, profile, reporter);
    }
}

/// True for references that point off-document: any URL scheme or a
/// protocol-relative `//host` form
pub(crate) fn is_remote(reference: &str) -> bool {
    if reference.starts_with("//") {
        return true;
    }
    match reference.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

/// Strip `?query` and `#fragment` from a local reference
pub(crate) fn strip_suffixes(reference: &str) -> &str {
    let end = reference
        .find(['?', '#'])
        .unwrap_or(reference.len());
    &reference[..end]
}
