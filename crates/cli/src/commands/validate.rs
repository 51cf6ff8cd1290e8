//! Structural validation of the built document

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use siteqa_common::{Reporter, SiteProfile};

use crate::output::print_banner;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// HTML document to validate; local references resolve against its directory
    #[arg(default_value = "index.html")]
    pub document: PathBuf,
}

pub fn execute(args: ValidateArgs, profile: &SiteProfile, reporter: &mut Reporter) -> Result<()> {
    print_banner("Structural validation", &args.document.display().to_string());
    siteqa_validator::validate(&args.document, profile, reporter)
        .with_context(|| format!("validation of {} aborted", args.document.display()))
}
