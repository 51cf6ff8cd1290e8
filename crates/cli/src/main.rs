//! siteqa CLI - Main Entry Point
//!
//! Runs the structural validator against the built document or the
//! behavioral prober against the running site, and maps the outcome to an
//! exit code: 0 success, 1 any failed check, 2 the run could not complete.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use siteqa_common::{Reporter, SiteProfile};
use tracing::debug;

mod commands;
mod output;

use commands::{probe, validate};

/// siteqa - structural and behavioral QA for a static marketing site
#[derive(Parser, Debug)]
#[command(name = "siteqa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored report lines
    #[arg(long, global = true)]
    no_color: bool,

    /// Site profile overriding the built-in expectations
    #[arg(long, global = true, env = "SITEQA_PROFILE")]
    profile: Option<PathBuf>,

    /// Also write the run summary as JSON
    #[arg(long, global = true)]
    summary_json: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the built HTML document and its local assets
    Validate(validate::ValidateArgs),

    /// Drive a browser against the running site
    Probe(probe::ProbeArgs),
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let profile = match SiteProfile::load_or_default(cli.profile.as_deref()) {
        Ok(profile) => profile,
        Err(e) => {
            output::print_error(&e.to_string());
            return ExitCode::from(output::FATAL_EXIT);
        }
    };
    debug!("Profile loaded from {:?}", cli.profile);

    let mut reporter = Reporter::stdout(output::use_color(cli.no_color));

    let result = match cli.command {
        Commands::Validate(args) => validate::execute(args, &profile, &mut reporter),
        Commands::Probe(args) => probe::execute(args, &profile, &mut reporter).await,
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e));
        return ExitCode::from(output::FATAL_EXIT);
    }

    let summary = reporter.summarize();
    if let Some(path) = &cli.summary_json {
        output::write_summary(&summary, path);
    }
    ExitCode::from(output::exit_code(summary.status))
}
