//! Parsed HTML document
//!
//! The document is parsed with html5ever into an `RcDom` and immediately
//! converted into an owned element tree, which is all the static checks need:
//! tags, attributes, and text. The raw text is kept alongside for checks that
//! scan the source rather than the tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::debug;

use crate::error::{ValidatorError, ValidatorResult};
use crate::selector::Selector;

/// Elements whose text never renders
const NON_VISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_ascii_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// All descendant text, script and style contents included
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out, false);
        out
    }

    /// Descendant text that renders: script, style and template contents skipped
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out, true);
        out
    }

    /// Descendants matching `selector`, in document order
    pub fn select(&self, selector: &Selector) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut ancestors = vec![self];
        for child in self.child_elements() {
            walk(child, selector, &mut ancestors, &mut out);
        }
        out
    }

    /// First descendant with the given tag
    pub fn find_tag(&self, tag: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.tag == tag {
                return Some(child);
            }
            if let Some(found) = child.find_tag(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Visit every descendant element in document order
    pub fn for_each_descendant<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        for child in self.child_elements() {
            f(child);
            child.for_each_descendant(f);
        }
    }
}

fn collect_text(el: &Element, out: &mut String, visible_only: bool) {
    if visible_only && NON_VISIBLE_TAGS.contains(&el.tag.as_str()) {
        return;
    }
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out, visible_only),
        }
    }
}

fn walk<'a>(
    el: &'a Element,
    selector: &Selector,
    ancestors: &mut Vec<&'a Element>,
    out: &mut Vec<&'a Element>,
) {
    if selector.matches(el, ancestors) {
        out.push(el);
    }
    ancestors.push(el);
    for child in el.child_elements() {
        walk(child, selector, ancestors, out);
    }
    ancestors.pop();
}

/// One HTML artifact under validation
#[derive(Debug, Clone)]
pub struct Document {
    /// Source text as read from disk
    pub raw: String,

    /// Synthetic root holding the parsed top-level nodes
    pub root: Element,

    /// Directory local references resolve against
    pub base_dir: PathBuf,
}

impl Document {
    /// Read and parse a document. Failure here is fatal to the run.
    pub fn load(path: &Path) -> ValidatorResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ValidatorError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::parse(raw, base_dir)
    }

    /// Parse already-loaded source text
    pub fn parse(raw: String, base_dir: PathBuf) -> ValidatorResult<Self> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut raw.as_bytes())
            .map_err(|e| ValidatorError::Parse(e.to_string()))?;

        let children = dom
            .document
            .children
            .borrow()
            .iter()
            .filter_map(convert)
            .collect();
        let root = Element {
            tag: "#document".to_string(),
            attrs: Vec::new(),
            children,
        };
        debug!("Parsed document ({} bytes)", raw.len());

        Ok(Self {
            raw,
            root,
            base_dir,
        })
    }

    pub fn select(&self, selector: &Selector) -> Vec<&Element> {
        self.root.select(selector)
    }

    /// Parse `selector` and select; an invalid selector is an error
    pub fn select_str(&self, selector: &str) -> ValidatorResult<Vec<&Element>> {
        let selector = Selector::parse(selector)?;
        Ok(self.select(&selector))
    }

    pub fn html(&self) -> Option<&Element> {
        self.root.find_tag("html")
    }

    pub fn head(&self) -> Option<&Element> {
        self.root.find_tag("head")
    }

    pub fn body(&self) -> Option<&Element> {
        self.root.find_tag("body")
    }

    pub fn footer(&self) -> Option<&Element> {
        self.root.find_tag("footer")
    }

    /// Every element in document order
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.root.for_each_descendant(&mut |e| out.push(e));
        out
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<&Element> {
        self.elements().into_iter().filter(|e| e.tag == tag).collect()
    }

    /// All `id` attribute values
    pub fn ids(&self) -> HashSet<&str> {
        self.elements().into_iter().filter_map(|e| e.attr("id")).collect()
    }

    /// Content of `<meta name=..>` or `<meta property=..>`
    pub fn meta_content(&self, key: &str) -> Option<&str> {
        self.elements_by_tag("meta")
            .into_iter()
            .find(|m| m.attr("name") == Some(key) || m.attr("property") == Some(key))
            .and_then(|m| m.attr("content"))
    }

    /// Value of `<meta charset>`
    pub fn charset(&self) -> Option<&str> {
        self.elements_by_tag("meta")
            .into_iter()
            .find_map(|m| m.attr("charset"))
    }

    pub fn title(&self) -> Option<String> {
        self.head()
            .and_then(|h| h.find_tag("title"))
            .map(|t| t.text().trim().to_string())
    }

    /// Text of every inline (non-external) script block, concatenated
    pub fn inline_script_text(&self) -> String {
        self.elements_by_tag("script")
            .into_iter()
            .filter(|s| !s.has_attr("src"))
            .map(|s| s.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rendered body text
    pub fn visible_text(&self) -> String {
        self.body().map(Element::visible_text).unwrap_or_default()
    }
}

fn convert(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect();
            let children = handle.children.borrow().iter().filter_map(convert).collect();
            Some(Node::Element(Element {
                tag: name.local.to_string(),
                attrs,
                children,
            }))
        }
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::parse(html.to_string(), PathBuf::from(".")).unwrap()
    }

    #[test]
    fn test_meta_accessors() {
        let d = doc(r#"<!DOCTYPE html><html lang="pt-BR"><head>
            <meta charset="UTF-8">
            <meta name="description" content="Descrição">
            <meta property="og:type" content="website">
            <title> Título da página </title>
            </head><body></body></html>"#);
        assert_eq!(d.charset(), Some("UTF-8"));
        assert_eq!(d.meta_content("description"), Some("Descrição"));
        assert_eq!(d.meta_content("og:type"), Some("website"));
        assert_eq!(d.title().as_deref(), Some("Título da página"));
        assert_eq!(d.html().and_then(|h| h.attr("lang")), Some("pt-BR"));
    }

    #[test]
    fn test_inline_scripts_skip_external() {
        let d = doc(r#"<html><body>
            <script src="https://cdn.jsdelivr.net/x.js">ignored()</script>
            <script>let a = 1;</script>
            <script>function b() {}</script>
            </body></html>"#);
        let text = d.inline_script_text();
        assert!(text.contains("let a = 1;"));
        assert!(text.contains("function b()"));
        assert!(!text.contains("ignored"));
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let d = doc("<html><body><p>Olá</p><script>var hidden = 1;</script><style>p{}</style></body></html>");
        let text = d.visible_text();
        assert!(text.contains("Olá"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("p{}"));
    }

    #[test]
    fn test_select_in_document_order() {
        let d = doc(r#"<html><body>
            <div class="card" id="a"><span class="card">inner</span></div>
            <div class="card" id="b"></div>
            </body></html>"#);
        let found = d.select_str(".card").unwrap();
        let tags: Vec<&str> = found.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["div", "span", "div"]);
    }

    #[test]
    fn test_scoped_select_excludes_self() {
        let d = doc(r#"<html><body><div class="card"><p class="card-tag">x</p></div></body></html>"#);
        let card = d.select_str(".card").unwrap()[0];
        let selector = Selector::parse(".card").unwrap();
        assert!(card.select(&selector).is_empty());
        let tags = Selector::parse(".card-tag").unwrap();
        assert_eq!(card.select(&tags).len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = Document::load(Path::new("/nonexistent/siteqa/index.html")).unwrap_err();
        assert!(matches!(err, ValidatorError::Read { .. }));
    }
}
