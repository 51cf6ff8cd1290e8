//! Site profile
//!
//! Every fixed enumeration the checks consult (required sections, minimum
//! counts, viewports, routes, CDN origins, legal strings, thresholds) lives
//! here rather than in check logic. The defaults describe the current site
//! release; a TOML file can override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::rules::{Predicate, Rule, Schema};

/// Complete configuration for both pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Profile name, printed in the report header
    pub name: String,

    /// Globals the page exposes to the prober
    pub contract: PageContract,

    /// Structural validator expectations
    pub validator: ValidatorProfile,

    /// Behavioral prober expectations
    pub probe: ProbeProfile,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            name: "release".to_string(),
            contract: PageContract::default(),
            validator: ValidatorProfile::default(),
            probe: ProbeProfile::default(),
        }
    }
}

impl SiteProfile {
    /// Parse a profile from TOML. Unspecified fields keep their defaults.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self> {
        let profile: SiteProfile = toml::from_str(content).map_err(|source| Error::ProfileParse {
            path: origin.to_string(),
            source,
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading site profile from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Load from `path` when given, otherwise use the built-in release profile
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Reject profiles the checks cannot run against
    pub fn validate(&self) -> Result<()> {
        if self.probe.viewports.is_empty() {
            return Err(Error::InvalidProfile("at least one viewport is required".into()));
        }
        for vp in &self.probe.viewports {
            if vp.width == 0 || vp.height == 0 {
                return Err(Error::InvalidProfile(format!(
                    "viewport '{}' has a zero dimension",
                    vp.name
                )));
            }
        }
        for route in &self.probe.routes {
            if !route.path.starts_with('/') {
                return Err(Error::InvalidProfile(format!(
                    "route '{}' path must start with '/': {}",
                    route.name, route.path
                )));
            }
        }
        for (role, name) in self.contract.globals() {
            if !is_identifier(name) {
                return Err(Error::InvalidProfile(format!(
                    "contract {} must be a plain identifier: {:?}",
                    role, name
                )));
            }
        }
        let perf = &self.probe.performance;
        if perf.load_pass_ms >= perf.load_fail_ms {
            return Err(Error::InvalidProfile(format!(
                "load pass threshold ({} ms) must be below the fail threshold ({} ms)",
                perf.load_pass_ms, perf.load_fail_ms
            )));
        }
        Ok(())
    }
}

/// Named globals forming the page's introspection contract
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContract {
    /// Contract revision the page is expected to implement
    pub version: u32,

    /// Optional object exposing the contract explicitly; takes precedence
    /// over the individual globals when the page defines it
    pub introspection_global: String,

    pub switch_lang_fn: String,
    pub restart_fn: String,
    pub message_timeout_global: String,
    pub timeout_tracker_global: String,
    pub default_lang_var: String,

    /// Value the default-language variable must be initialized to
    pub default_lang_value: String,
}

impl Default for PageContract {
    fn default() -> Self {
        Self {
            version: 1,
            introspection_global: "__siteqa".to_string(),
            switch_lang_fn: "switchLang".to_string(),
            restart_fn: "restartChat".to_string(),
            message_timeout_global: "chatTimeout".to_string(),
            timeout_tracker_global: "chatTimeouts".to_string(),
            default_lang_var: "currentLang".to_string(),
            default_lang_value: "pt".to_string(),
        }
    }
}

impl PageContract {
    /// Every global name the prober may read, paired with its role
    pub fn globals(&self) -> [(&'static str, &str); 6] {
        [
            ("introspection object", &self.introspection_global),
            ("language switch", &self.switch_lang_fn),
            ("restart function", &self.restart_fn),
            ("message timeout", &self.message_timeout_global),
            ("timeout tracker", &self.timeout_tracker_global),
            ("language variable", &self.default_lang_var),
        ]
    }
}

/// Structural expectations on the static document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorProfile {
    pub meta: Schema,
    pub sections: Vec<String>,
    pub content: Vec<CountTarget>,
    pub partners: PartnerLogos,
    pub card: CardShape,
    pub script: ScriptContract,
    pub conversations: ConversationData,
    pub compliance: Compliance,
    pub quality: QualityHeuristics,
    pub dependencies: Vec<String>,
}

impl Default for ValidatorProfile {
    fn default() -> Self {
        Self {
            meta: default_meta_schema(),
            sections: strings(&[
                "header",
                "nav",
                "main",
                "footer",
                "#hero",
                "#features",
                "#how-it-works",
                "#faq",
                "#contact",
            ]),
            content: vec![
                CountTarget::new("feature cards", ".feature-card", 10),
                CountTarget::new("tabs", ".tab-btn", 2),
                CountTarget::new("faq items", ".faq-item", 5),
                CountTarget::new("steps", ".step-number", 3),
                CountTarget::new("forms", "form", 1),
            ],
            partners: PartnerLogos::default(),
            card: CardShape::default(),
            script: ScriptContract::default(),
            conversations: ConversationData::default(),
            compliance: Compliance::default(),
            quality: QualityHeuristics::default(),
            dependencies: strings(&[
                "https://fonts.googleapis.com",
                "https://fonts.gstatic.com",
                "https://cdn.jsdelivr.net",
            ]),
        }
    }
}

impl ValidatorProfile {
    /// Schema over the content counts, partner logos included
    pub fn content_schema(&self) -> Schema {
        let mut rules: Vec<Rule> = self
            .content
            .iter()
            .map(|target| Rule::new(&target.name, Predicate::MinCount(target.min), ""))
            .collect();
        rules.push(Rule::new(
            &self.partners.name,
            Predicate::MinCount(self.partners.min),
            "logos matched against the partner allow-list",
        ));
        Schema::new("content", rules)
    }
}

fn default_meta_schema() -> Schema {
    Schema::new(
        "meta",
        vec![
            Rule::new("charset", Predicate::Equals("UTF-8".into()), "document encoding"),
            Rule::new(
                "viewport",
                Predicate::Contains("width=device-width".into()),
                "responsive viewport",
            ),
            Rule::new("title", Predicate::MinLength(10), "page title too short"),
            Rule::new("description", Predicate::MinLength(50), "meta description too short"),
            Rule::new("og:title", Predicate::MinLength(10), ""),
            Rule::new("og:description", Predicate::MinLength(50), ""),
            Rule::new("og:type", Predicate::Equals("website".into()), ""),
            Rule::new("og:locale", Predicate::Equals("pt_BR".into()), ""),
            Rule::new("og:image", Predicate::MinLength(1), "social preview image"),
            Rule::new("lang", Predicate::Equals("pt-BR".into()), "document language"),
        ],
    )
}

/// Minimum number of elements matching a selector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountTarget {
    pub name: String,
    pub selector: String,
    pub min: usize,
}

impl CountTarget {
    pub fn new(name: &str, selector: &str, min: usize) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
            min,
        }
    }
}

/// Partner logos, identified by their alt text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerLogos {
    pub name: String,
    pub alt_allow_list: Vec<String>,
    pub min: usize,
}

impl Default for PartnerLogos {
    fn default() -> Self {
        Self {
            name: "partner logos".to_string(),
            alt_allow_list: strings(&[
                "Itaú",
                "Bradesco",
                "Santander",
                "Banco do Brasil",
                "Caixa",
                "Nubank",
                "Inter",
                "Sicoob",
            ]),
            min: 4,
        }
    }
}

/// Parts every feature card must contain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardShape {
    pub selector: String,
    pub label: String,
    pub title: String,
    pub body: String,
    pub tag: String,
    pub min_tags: usize,
}

impl Default for CardShape {
    fn default() -> Self {
        Self {
            selector: ".feature-card".to_string(),
            label: ".card-label".to_string(),
            title: ".card-title".to_string(),
            body: ".card-body".to_string(),
            tag: ".card-tag".to_string(),
            min_tags: 3,
        }
    }
}

/// Expectations on the concatenated inline script text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptContract {
    pub translation_keys: Vec<String>,
    pub functions: Vec<String>,

    /// Storage API whose use with `forbidden_storage_key` must be absent
    pub forbidden_storage: String,
    pub forbidden_storage_key: String,
}

impl Default for ScriptContract {
    fn default() -> Self {
        Self {
            translation_keys: strings(&[
                "translations",
                "hero_title",
                "hero_subtitle",
                "nav_features",
                "nav_faq",
                "cta_button",
            ]),
            functions: strings(&[
                "switchLang",
                "restartChat",
                "clearChatTimeouts",
                "startChat",
                "toggleFaq",
            ]),
            forbidden_storage: "localStorage".to_string(),
            forbidden_storage_key: "lang".to_string(),
        }
    }
}

/// Per-language conversation arrays embedded in the page script
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationData {
    pub variants: Vec<String>,
    pub marker: String,
    pub expected: usize,
}

impl Default for ConversationData {
    fn default() -> Self {
        Self {
            variants: strings(&["chatConversationsPt", "chatConversationsEn"]),
            marker: "messages:".to_string(),
            expected: 4,
        }
    }
}

/// Legal and consent content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Compliance {
    pub legal_href_fragments: Vec<String>,
    pub registration_number: String,
    pub company_name: String,
    pub consent_phrase: String,
}

impl Default for Compliance {
    fn default() -> Self {
        Self {
            legal_href_fragments: strings(&["privacidade", "termos"]),
            registration_number: "CNPJ 12.345.678/0001-90".to_string(),
            company_name: "Exemplo Pagamentos S.A.".to_string(),
            consent_phrase: "Ao enviar, você concorda".to_string(),
        }
    }
}

/// Content-quality heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityHeuristics {
    /// Product names that must not appear anywhere (case-insensitive)
    pub deprecated_names: Vec<String>,

    /// Leftover marker tokens (case-insensitive, whole word)
    pub marker_tokens: Vec<String>,

    /// Punctuation that produces a warning when found in visible text
    pub warned_punctuation: Vec<String>,

    /// Placeholder phone numbers that produce a warning
    pub placeholder_phones: Vec<String>,
}

impl Default for QualityHeuristics {
    fn default() -> Self {
        Self {
            deprecated_names: strings(&["PagaFácil"]),
            marker_tokens: strings(&["TODO", "FIXME", "XXX", "TO-DO"]),
            warned_punctuation: strings(&["\u{2014}"]),
            placeholder_phones: strings(&["(11) 99999-9999"]),
        }
    }
}

/// Runtime expectations on the live page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeProfile {
    pub viewports: Vec<Viewport>,
    pub routes: Vec<Route>,
    pub selectors: ProbeSelectors,
    pub i18n: I18nExpectations,
    pub timing: Timing,
    pub performance: PerformanceBudget,

    /// Digits typed into the phone input, which must retain them
    pub phone_sample: String,
}

impl Default for ProbeProfile {
    fn default() -> Self {
        Self {
            viewports: vec![
                Viewport::new("mobile", 375, 667),
                Viewport::new("tablet", 768, 1024),
                Viewport::new("desktop", 1280, 800),
                Viewport::new("wide desktop", 1920, 1080),
            ],
            routes: vec![
                Route::new("home", "/"),
                Route::new("privacy", "/privacidade/"),
                Route::new("terms", "/termos/"),
            ],
            selectors: ProbeSelectors::default(),
            i18n: I18nExpectations::default(),
            timing: Timing::default(),
            performance: PerformanceBudget::default(),
            phone_sample: "11987654321".to_string(),
        }
    }
}

impl ProbeProfile {
    /// Path of the route layout and feature groups run against
    pub fn home_path(&self) -> &str {
        self.routes
            .iter()
            .find(|r| r.name == "home")
            .map(|r| r.path.as_str())
            .unwrap_or("/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub path: String,
}

impl Route {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

/// CSS selectors the prober resolves against the live page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSelectors {
    pub nav: String,
    pub footer: String,
    pub mock: String,
    pub messages: String,
    pub heading: String,
    pub accordion: String,
    pub tab: String,
    pub phone_input: String,
    pub anchor_link: String,
}

impl Default for ProbeSelectors {
    fn default() -> Self {
        Self {
            nav: "nav".to_string(),
            footer: "footer".to_string(),
            mock: ".phone-mockup".to_string(),
            messages: "#chat-messages".to_string(),
            heading: "#hero h1".to_string(),
            accordion: ".faq-question".to_string(),
            tab: ".tab-btn".to_string(),
            phone_input: "input[type=\"tel\"]".to_string(),
            anchor_link: "a[href^=\"#\"]:not([href=\"#\"])".to_string(),
        }
    }
}

/// Language switching expectations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nExpectations {
    pub default_locale: String,

    /// Switches exercised in order; the last should restore the default
    pub switches: Vec<LanguageSwitch>,

    pub toggle_cycles: u32,
}

impl Default for I18nExpectations {
    fn default() -> Self {
        Self {
            default_locale: "pt-BR".to_string(),
            switches: vec![
                LanguageSwitch::new("en", "en", "payments"),
                LanguageSwitch::new("pt", "pt-BR", "pagamentos"),
            ],
            toggle_cycles: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSwitch {
    /// Code passed to the page's switch function
    pub code: String,
    /// Expected `document.documentElement.lang` afterwards
    pub lang: String,
    /// Expected substring of the designated heading afterwards
    pub heading_contains: String,
}

impl LanguageSwitch {
    pub fn new(code: &str, lang: &str, heading_contains: &str) -> Self {
        Self {
            code: code.to_string(),
            lang: lang.to_string(),
            heading_contains: heading_contains.to_string(),
        }
    }
}

/// Timeouts and settle delays, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub navigation_timeout_ms: u64,
    pub performance_timeout_ms: u64,
    pub animation_settle_ms: u64,
    pub restart_settle_ms: u64,
    pub interaction_settle_ms: u64,
    pub scroll_step_px: u32,
    pub scroll_pause_ms: u64,
    pub anchor_tolerance_px: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 15_000,
            performance_timeout_ms: 30_000,
            animation_settle_ms: 3_000,
            restart_settle_ms: 2_500,
            interaction_settle_ms: 600,
            scroll_step_px: 400,
            scroll_pause_ms: 100,
            anchor_tolerance_px: 150,
        }
    }
}

/// Load-time and page-weight thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceBudget {
    /// Below this, load time passes
    pub load_pass_ms: u64,
    /// At or above this, load time fails; in between it warns
    pub load_fail_ms: u64,
    /// At or above this, total transfer size warns
    pub transfer_warn_kb: u64,
}

impl Default for PerformanceBudget {
    fn default() -> Self {
        Self {
            load_pass_ms: 3_000,
            load_fail_ms: 5_000,
            transfer_warn_kb: 5_000,
        }
    }
}

/// JavaScript identifier made of ASCII letters, digits, `_` and `$`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        SiteProfile::default().validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let profile = SiteProfile::from_toml_str(
            r#"
            name = "staging"

            [probe.performance]
            load_pass_ms = 2000

            [validator.conversations]
            expected = 6
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(profile.name, "staging");
        assert_eq!(profile.probe.performance.load_pass_ms, 2000);
        assert_eq!(profile.probe.performance.load_fail_ms, 5000);
        assert_eq!(profile.validator.conversations.expected, 6);
        assert_eq!(profile.validator.conversations.marker, "messages:");
        assert_eq!(profile.probe.viewports.len(), 4);
        assert_eq!(profile.contract.switch_lang_fn, "switchLang");
    }

    #[test]
    fn test_viewports_override_replaces_list() {
        let profile = SiteProfile::from_toml_str(
            r#"
            [[probe.viewports]]
            name = "kiosk"
            width = 1080
            height = 1920
            "#,
            "inline",
        )
        .unwrap();
        assert_eq!(profile.probe.viewports, vec![Viewport::new("kiosk", 1080, 1920)]);
    }

    #[test]
    fn test_rejects_inverted_load_thresholds() {
        let err = SiteProfile::from_toml_str(
            "[probe.performance]\nload_pass_ms = 6000\n",
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidProfile(_)));
    }

    #[test]
    fn test_rejects_relative_route() {
        let err = SiteProfile::from_toml_str(
            "[[probe.routes]]\nname = \"home\"\npath = \"index.html\"\n",
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidProfile(_)));
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = SiteProfile::from_toml_str("name = [", "site.toml").unwrap_err();
        assert!(err.to_string().contains("site.toml"));
    }

    #[test]
    fn test_content_schema_includes_partners() {
        let schema = ValidatorProfile::default().content_schema();
        assert_eq!(schema.rules.len(), 6);
        assert_eq!(schema.rules.last().unwrap().field, "partner logos");
    }

    #[test]
    fn test_home_path_defaults_to_root() {
        let mut probe = ProbeProfile::default();
        probe.routes.clear();
        assert_eq!(probe.home_path(), "/");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, "[contract]\nrestart_fn = \"resetChat\"\n").unwrap();
        let profile = SiteProfile::load(&path).unwrap();
        assert_eq!(profile.contract.restart_fn, "resetChat");
        assert_eq!(profile.contract.version, 1);
    }

    #[test]
    fn test_rejects_non_identifier_contract_name() {
        let err = SiteProfile::from_toml_str(
            "[contract]\nswitch_lang_fn = \"window.switchLang()\"\n",
            "inline",
        )
        .unwrap_err();
        assert!(err.to_string().contains("language switch"));
    }
}
