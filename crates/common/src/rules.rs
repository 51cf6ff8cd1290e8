//! Declarative shape rules
//!
//! A rule is pure data: the field it inspects, a predicate over the extracted
//! fact, and the message reported when the predicate does not hold. Rules are
//! grouped into named schemas and evaluated as a unit, one outcome per rule.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::report::Reporter;

/// A scalar extracted from static markup or live page state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fact {
    Flag(bool),
    Count(usize),
    Text(String),
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::Text(s) => write!(f, "{:?}", s),
            Fact::Count(n) => write!(f, "{}", n),
            Fact::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Fact {
    fn from(value: &str) -> Self {
        Fact::Text(value.to_string())
    }
}

impl From<String> for Fact {
    fn from(value: String) -> Self {
        Fact::Text(value)
    }
}

impl From<usize> for Fact {
    fn from(value: usize) -> Self {
        Fact::Count(value)
    }
}

impl From<bool> for Fact {
    fn from(value: bool) -> Self {
        Fact::Flag(value)
    }
}

/// Field name to extracted fact. A missing key means "not found".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactSet {
    facts: BTreeMap<String, Fact>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, fact: impl Into<Fact>) {
        self.facts.insert(field.into(), fact.into());
    }

    pub fn get(&self, field: &str) -> Option<&Fact> {
        self.facts.get(field)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// Expected property of one fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum Predicate {
    /// Text equals the value exactly
    Equals(String),
    /// Text contains the value
    Contains(String),
    /// Text is at least this many characters long
    MinLength(usize),
    /// Count is at least this value
    MinCount(usize),
    /// Fact exists (a flag must be set, a count must be nonzero)
    Present,
}

impl Predicate {
    /// Evaluate against a fact. `None` fails every predicate.
    pub fn holds(&self, fact: Option<&Fact>) -> bool {
        let Some(fact) = fact else {
            return false;
        };
        match (self, fact) {
            (Predicate::Equals(want), Fact::Text(got)) => got == want,
            (Predicate::Contains(want), Fact::Text(got)) => got.contains(want.as_str()),
            (Predicate::MinLength(min), Fact::Text(got)) => got.chars().count() >= *min,
            (Predicate::MinCount(min), Fact::Count(got)) => got >= min,
            (Predicate::Present, Fact::Flag(set)) => *set,
            (Predicate::Present, Fact::Count(n)) => *n > 0,
            (Predicate::Present, Fact::Text(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equals(v) => write!(f, "equal to {:?}", v),
            Predicate::Contains(v) => write!(f, "containing {:?}", v),
            Predicate::MinLength(n) => write!(f, "at least {} characters", n),
            Predicate::MinCount(n) => write!(f, "at least {}", n),
            Predicate::Present => write!(f, "present"),
        }
    }
}

/// One declarative rule over one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub field: String,
    #[serde(rename = "expect")]
    pub predicate: Predicate,
    #[serde(default)]
    pub message: String,
}

impl Rule {
    pub fn new(field: &str, predicate: Predicate, message: &str) -> Self {
        Self {
            field: field.to_string(),
            predicate,
            message: message.to_string(),
        }
    }
}

/// A violated rule together with what was observed
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: String,
    pub message: String,
    pub detail: String,
}

/// Named group of rules evaluated as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub rules: Vec<Rule>,
}

impl Schema {
    pub fn new(name: &str, rules: Vec<Rule>) -> Self {
        Self {
            name: name.to_string(),
            rules,
        }
    }

    /// Rules that do not hold, in rule order
    pub fn violations(&self, facts: &FactSet) -> Vec<Violation> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let fact = facts.get(&rule.field);
                if rule.predicate.holds(fact) {
                    return None;
                }
                let observed = fact.map(Fact::to_string).unwrap_or_else(|| "missing".to_string());
                Some(Violation {
                    field: rule.field.clone(),
                    message: rule.message.clone(),
                    detail: format!("expected {}, got {}", rule.predicate, observed),
                })
            })
            .collect()
    }

    /// Record one outcome per rule: pass when it holds, fail otherwise
    pub fn evaluate(&self, facts: &FactSet, reporter: &mut Reporter) {
        for rule in &self.rules {
            let fact = facts.get(&rule.field);
            let label = format!("{}: {}", self.name, rule.field);
            if rule.predicate.holds(fact) {
                reporter.pass(label);
                continue;
            }
            let observed = fact.map(Fact::to_string).unwrap_or_else(|| "missing".to_string());
            let detail = if rule.message.is_empty() {
                format!("expected {}, got {}", rule.predicate, observed)
            } else {
                format!("{} (expected {}, got {})", rule.message, rule.predicate, observed)
            };
            reporter.fail(label, Some(&detail));
        }
    }
}
