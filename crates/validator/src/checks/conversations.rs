//! Per-language conversation data embedded in the page script

use regex::Regex;
use siteqa_common::{Reporter, SiteProfile};

use crate::document::Document;

/// The bracket-balanced array literal assigned to `name`, brackets included.
/// Brackets inside string literals do not count.
pub fn array_literal<'a>(script: &'a str, name: &str) -> Option<&'a str> {
    let pattern = format!(r"\b{}\s*=\s*\[", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let m = re.find(script)?;
    let start = m.end() - 1;

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (offset, ch) in script[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&script[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn run(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    let script = doc.inline_script_text();
    let data = &profile.validator.conversations;

    for variant in &data.variants {
        let label = format!("{} has {} conversations", variant, data.expected);
        match array_literal(&script, variant) {
            Some(literal) => {
                let count = literal.matches(data.marker.as_str()).count();
                if count == data.expected {
                    reporter.pass(label);
                } else {
                    reporter.fail(
                        label,
                        Some(&format!("found {} occurrences of {:?}", count, data.marker)),
                    );
                }
            }
            None => reporter.fail(label, Some("array assignment not found")),
        }
    }
}
