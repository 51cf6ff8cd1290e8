//! Embedded-script contract
//!
//! The page's inline scripts must carry the translation data and the
//! functions the prober drives, initialize the default language, and must not
//! persist the language choice: a reload always starts in the default
//! language.

use regex::Regex;
use siteqa_common::{Reporter, SiteProfile};

use crate::document::Document;

/// `function name(`, or `name = function`, `name = (..) =>`, `name = x =>`
pub fn declares_function(script: &str, name: &str) -> bool {
    let name = regex::escape(name);
    let pattern = format!(
        r"\bfunction\s+{name}\s*\(|\b{name}\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)"
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(script))
}

/// `let|var|const name = 'value'`
pub fn initializes(script: &str, name: &str, value: &str) -> bool {
    let pattern = format!(
        r#"\b(?:let|var|const)\s+{}\s*=\s*["'`]{}["'`]"#,
        regex::escape(name),
        regex::escape(value)
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(script))
}

/// Any read, write or removal of `key` through the `storage` API
pub fn persists_key(script: &str, storage: &str, key: &str) -> bool {
    let storage = regex::escape(storage);
    let key = regex::escape(key);
    let pattern = format!(
        r#"\b{storage}\s*\.\s*(?:getItem|setItem|removeItem)\s*\(\s*["'`]{key}["'`]|\b{storage}\s*\[\s*["'`]{key}["'`]\s*\]|\b{storage}\s*\.\s*{key}\b"#
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(script))
}

pub fn run(doc: &Document, profile: &SiteProfile, reporter: &mut Reporter) {
    let script = doc.inline_script_text();
    let contract = &profile.validator.script;

    for key in &contract.translation_keys {
        let label = format!("translation key {}", key);
        if script.contains(key.as_str()) {
            reporter.pass(label);
        } else {
            reporter.fail(label, Some("not found in inline scripts"));
        }
    }

    for name in &contract.functions {
        let label = format!("function {}", name);
        if declares_function(&script, name) {
            reporter.pass(label);
        } else {
            reporter.fail(label, Some("declaration not found"));
        }
    }

    let page = &profile.contract;
    let label = format!("{} defaults to '{}'", page.default_lang_var, page.default_lang_value);
    if initializes(&script, &page.default_lang_var, &page.default_lang_value) {
        reporter.pass(label);
    } else {
        reporter.fail(label, Some("initialization not found"));
    }

    let label = format!(
        "language is not persisted in {} ('{}')",
        contract.forbidden_storage, contract.forbidden_storage_key
    );
    if persists_key(&script, &contract.forbidden_storage, &contract.forbidden_storage_key) {
        reporter.fail(label, Some("language choice must not survive a reload"));
    } else {
        reporter.pass(label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("function switchLang(code) {}", true; "declaration")]
    #[test_case("const switchLang = function (code) {}", true; "function expression")]
    #[test_case("window.switchLang = async (code) => {}", true; "async arrow")]
    #[test_case("let switchLang = code => code", true; "bare arrow")]
    #[test_case("switchLang('en');", false; "call only")]
    #[test_case("function switchLanguage() {}", false; "longer name")]
    fn test_declares_function(script: &str, expected: bool) {
        assert_eq!(declares_function(script, "switchLang"), expected);
    }

    #[test_case("let currentLang = 'pt';", true; "single quotes")]
    #[test_case("var currentLang=\"pt\"", true; "double quotes")]
    #[test_case("let currentLang = 'en';", false; "other value")]
    #[test_case("let currentLang = localStorage.getItem('lang') || 'pt';", false; "not a literal")]
    fn test_initializes(script: &str, expected: bool) {
        assert_eq!(initializes(script, "currentLang", "pt"), expected);
    }

    #[test_case("localStorage.setItem('lang', code)", true; "set")]
    #[test_case("localStorage.getItem(\"lang\")", true; "get")]
    #[test_case("localStorage['lang'] = code", true; "index")]
    #[test_case("localStorage.lang = code", true; "property")]
    #[test_case("localStorage.setItem('theme', 'dark')", false; "other key")]
    #[test_case("sessionStorage.setItem('lang', code)", false; "other storage")]
    fn test_persists_key(script: &str, expected: bool) {
        assert_eq!(persists_key(script, "localStorage", "lang"), expected);
    }
}
