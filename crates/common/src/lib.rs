//! siteqa common library
//!
//! The pieces both QA pipelines share: the check reporter with its
//! pass/fail/warn accounting, the declarative shape-rule engine, and the
//! site profile holding every fixed expectation the checks consult.

pub mod error;
pub mod profile;
pub mod report;
pub mod rules;

pub use error::{Error, Result};
pub use profile::SiteProfile;
pub use report::{Outcome, Reporter, RunStatus, RunSummary};
pub use rules::{Fact, FactSet, Predicate, Rule, Schema};
