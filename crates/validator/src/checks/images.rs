//! Image quality: alt text and lazy-load dimensions

use siteqa_common::{Reporter, SiteProfile};

use crate::document::{Document, Element};

fn describe(img: &Element) -> String {
    img.attr("src").unwrap_or("(no src)").to_string()
}

fn is_svg(src: &str) -> bool {
    super::strip_suffixes(src).to_ascii_lowercase().ends_with(".svg")
}

/// Lazy images without explicit dimensions can collapse to zero height
/// before the asset arrives. SVG sources carry their own intrinsic size.
pub fn collapses_when_lazy(img: &Element) -> bool {
    let lazy = img
        .attr("loading")
        .is_some_and(|l| l.trim().eq_ignore_ascii_case("lazy"));
    if !lazy {
        return false;
    }
    if img.attr("src").is_some_and(is_svg) {
        return false;
    }
    !(img.has_attr("width") && img.has_attr("height"))
}

pub fn run(doc: &Document, _profile: &SiteProfile, reporter: &mut Reporter) {
    let images = doc.elements_by_tag("img");

    // An empty alt is a deliberate decorative marker; only an absent one fails
    let without_alt: Vec<&&Element> = images.iter().filter(|img| !img.has_attr("alt")).collect();
    for img in &without_alt {
        reporter.fail(format!("image without alt {}", describe(img)), None);
    }
    if without_alt.is_empty() {
        reporter.pass(format!("all {} images declare alt", images.len()));
    }

    let collapsing: Vec<&&Element> = images.iter().filter(|img| collapses_when_lazy(img)).collect();
    for img in &collapsing {
        reporter.fail(
            format!("lazy image without dimensions {}", describe(img)),
            Some("loading=\"lazy\" needs width and height"),
        );
    }
    if collapsing.is_empty() {
        reporter.pass("lazy images declare dimensions");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn img(attrs: &[(&str, &str)]) -> Element {
        Element {
            tag: "img".to_string(),
            attrs: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            children: Vec::new(),
        }
    }

    #[test_case(&[("src", "img/a.png"), ("loading", "lazy")], true; "lazy without dimensions")]
    #[test_case(&[("src", "img/a.png"), ("loading", "lazy"), ("width", "40")], true; "lazy with width only")]
    #[test_case(&[("src", "img/a.png"), ("loading", "lazy"), ("width", "40"), ("height", "40")], false; "lazy with dimensions")]
    #[test_case(&[("src", "img/a.svg"), ("loading", "lazy")], false; "svg exempt")]
    #[test_case(&[("src", "img/A.SVG?v=2"), ("loading", "lazy")], false; "svg exempt with query")]
    #[test_case(&[("src", "img/a.png")], false; "eager image")]
    fn test_collapses_when_lazy(attrs: &[(&str, &str)], expected: bool) {
        assert_eq!(collapses_when_lazy(&img(attrs)), expected);
    }
}
