//! Content-quality heuristics
//!
//! Deprecated names and leftover marker comments are failures. Typographic
//! and placeholder findings are warnings only.

use std::sync::OnceLock;

use regex::Regex;
use siteqa_common::{Reporter, SiteProfile};

use crate::document::Document;

fn regex(pattern: &'static str, desc: &'static str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid {desc} regex: {err}"))
}

/// Text of HTML, block and line comments. Marker tokens are only looked for
/// here: "todo" is an ordinary word in Portuguese copy.
pub fn comment_text(raw: &str) -> String {
    static HTML_COMMENT: OnceLock<Regex> = OnceLock::new();
    static BLOCK_COMMENT: OnceLock<Regex> = OnceLock::new();
    static LINE_COMMENT: OnceLock<Regex> = OnceLock::new();

    let html = HTML_COMMENT.get_or_init(|| regex(r"(?s)<!--(.*?)-->", "html comment"));
    let block = BLOCK_COMMENT.get_or_init(|| regex(r"(?s)/\*(.*?)\*/", "block comment"));
    // `//` preceded by ':' is a URL scheme, not a comment
    let line = LINE_COMMENT.get_or_init(|| regex(r"(?m)(?:^|[^:/\\])//([^\n]*)", "line comment"));

    let mut out = Vec::new();
    for re in [html, block, line] {
        for caps in re.captures_iter(raw) {
            if let Some(m) = caps.get(1) {
                out.push(m.as_str());
            }
        }
    }
    out.join("\n")
}

/// Case-insensitive whole-word occurrences of `token`
pub fn count_token(text: &str, token: &str) -> usize {
    let Ok(re) = Regex::new(&format!("(?i){}", regex::escape(token))) else {
        return 0;
    };
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '-';
    re.find_iter(text)
        .filter(|m| {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            !before.is_some_and(is_word) && !after.is_some_and(is_word)
        })
        .count()
}

pub fn run(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    let quality = &profile.validator.quality;
    let raw_lower = doc.raw.to_lowercase();

    for name in &quality.deprecated_names {
        let label = format!("deprecated name {:?} absent", name);
        let hits = raw_lower.matches(name.to_lowercase().as_str()).count();
        if hits == 0 {
            reporter.pass(label);
        } else {
            reporter.fail(label, Some(&format!("found {} time(s)", hits)));
        }
    }

    let comments = comment_text(&doc.raw);
    let mut markers = 0;
    for token in &quality.marker_tokens {
        let hits = count_token(&comments, token);
        if hits > 0 {
            markers += 1;
            reporter.fail(
                format!("marker comment {}", token),
                Some(&format!("found {} time(s)", hits)),
            );
        }
    }
    if markers == 0 {
        reporter.pass("no marker comments");
    }

    let visible = doc.visible_text();
    for mark in &quality.warned_punctuation {
        let hits = visible.matches(mark.as_str()).count();
        if hits > 0 {
            reporter.warn(
                format!("punctuation {:?} in visible text", mark),
                Some(&format!("found {} time(s)", hits)),
            );
        }
    }

    for phone in &quality.placeholder_phones {
        if doc.raw.contains(phone.as_str()) {
            reporter.warn(format!("placeholder phone {}", phone), Some("replace with the real number"));
        }
    }

    let placeholder_links = doc
        .footer()
        .map(|footer| {
            let mut count = 0;
            footer.for_each_descendant(&mut |e| {
                if e.tag == "a" && e.attr("href") == Some("#") {
                    count += 1;
                }
            });
            count
        })
        .unwrap_or(0);
    if placeholder_links > 0 {
        reporter.warn(
            "footer placeholder links",
            Some(&format!("{} anchor(s) with href=\"#\"", placeholder_links)),
        );
    } else {
        reporter.pass("footer links have real targets");
    }
}
