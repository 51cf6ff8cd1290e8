//! siteqa structural validator
//!
//! Parses one HTML document and runs the fixed battery of structural check
//! groups against it, feeding every outcome into a [`Reporter`]. The only
//! fatal condition is failing to read the document; everything else is a
//! reported outcome.

pub mod checks;
pub mod document;
pub mod error;
pub mod selector;

use std::path::Path;

use siteqa_common::{Reporter, SiteProfile};
use tracing::info;

pub use document::Document;
pub use error::{ValidatorError, ValidatorResult};
pub use selector::Selector;

/// Validate the document at `path`, recording outcomes into `reporter`
pub fn validate(path: &Path, profile: &SiteProfile, reporter: &mut Reporter) -> ValidatorResult<()> {
    info!("Validating {}", path.display());
    let doc = Document::load(path)?;
    validate_document(&doc, profile, reporter);
    Ok(())
}

/// Run every check group against an already-parsed document
pub fn validate_document(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    checks::run_all(doc, profile, reporter);
    info!(
        passed = reporter.passed(),
        failed = reporter.failed(),
        warned = reporter.warned(),
        "Validation finished"
    );
}
