//! Minimal CSS selector support for static checks
//!
//! Covers what the checklist needs: compound selectors built from a tag name,
//! `#id`, `.class` and attribute tests (`[a]`, `[a=v]`, `[a^=v]`, `[a*=v]`,
//! `[a$=v]`), joined by the descendant combinator.

use crate::document::Element;
use crate::error::{ValidatorError, ValidatorResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Substring(String),
    Suffix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    op: AttrOp,
}

impl AttrTest {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == v,
            AttrOp::Prefix(v) => value.starts_with(v.as_str()),
            AttrOp::Substring(v) => value.contains(v.as_str()),
            AttrOp::Suffix(v) => value.ends_with(v.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| a.matches(el.attr(&a.name)))
    }
}

/// Parsed selector: compounds separated by descendant combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> ValidatorResult<Self> {
        let err = |reason: &str| ValidatorError::Selector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut compounds = Vec::new();
        for part in split_compounds(source).map_err(|r| err(&r))? {
            compounds.push(parse_compound(&part).map_err(|r| err(&r))?);
        }
        if compounds.is_empty() {
            return Err(err("empty selector"));
        }
        Ok(Self {
            source: source.to_string(),
            compounds,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match `el`, given its ancestors ordered root first
    pub(crate) fn matches(&self, el: &Element, ancestors: &[&Element]) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(el) {
            return false;
        }
        // Descendant-only chains can be matched greedily against the nearest
        // qualifying ancestor.
        let mut remaining = ancestors.len();
        for compound in rest.iter().rev() {
            let found = ancestors[..remaining].iter().rposition(|a| compound.matches(a));
            match found {
                Some(idx) => remaining = idx,
                None => return false,
            }
        }
        true
    }
}

/// Split on whitespace outside of attribute brackets and quotes
fn split_compounds(source: &str) -> Result<Vec<String>, String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for ch in source.chars() {
        match (ch, quote) {
            (q, Some(open)) if q == open => {
                quote = None;
                current.push(ch);
            }
            (_, Some(_)) => current.push(ch),
            ('"' | '\'', None) if in_brackets => {
                quote = Some(ch);
                current.push(ch);
            }
            ('[', None) => {
                in_brackets = true;
                current.push(ch);
            }
            (']', None) => {
                in_brackets = false;
                current.push(ch);
            }
            ('>' | '+' | '~' | ',', None) if !in_brackets => {
                return Err(format!("unsupported combinator '{}'", ch));
            }
            (c, None) if c.is_whitespace() && !in_brackets => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if in_brackets || quote.is_some() {
        return Err("unterminated attribute selector".to_string());
    }
    if !current.is_empty() {
        parts.push(current);
    }
    Ok(parts)
}

fn parse_compound(part: &str) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let chars: Vec<char> = part.chars().collect();
    let mut i = 0;

    let read_ident = |start: usize| -> (String, usize) {
        let mut end = start;
        while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '-' || chars[end] == '_') {
            end += 1;
        }
        (chars[start..end].iter().collect(), end)
    };

    if chars.first().is_some_and(|c| c.is_alphabetic() || *c == '*') {
        if chars[0] == '*' {
            i = 1;
        } else {
            let (tag, end) = read_ident(0);
            compound.tag = Some(tag.to_ascii_lowercase());
            i = end;
        }
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (id, end) = read_ident(i + 1);
                if id.is_empty() {
                    return Err("empty id".to_string());
                }
                compound.id = Some(id);
                i = end;
            }
            '.' => {
                let (class, end) = read_ident(i + 1);
                if class.is_empty() {
                    return Err("empty class".to_string());
                }
                compound.classes.push(class);
                i = end;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| "unterminated attribute selector".to_string())?;
                let body: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&body)?);
                i = close + 1;
            }
            ':' => return Err("pseudo-classes are not supported".to_string()),
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    Ok(compound)
}

fn parse_attr(body: &str) -> Result<AttrTest, String> {
    let unquote = |v: &str| -> String {
        let v = v.trim();
        v.strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| v.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .unwrap_or(v)
            .to_string()
    };

    let operators: [(&str, fn(String) -> AttrOp); 4] = [
        ("^=", AttrOp::Prefix),
        ("*=", AttrOp::Substring),
        ("$=", AttrOp::Suffix),
        ("=", AttrOp::Equals),
    ];
    for (token, make) in operators {
        if let Some((name, value)) = body.split_once(token) {
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return Err("empty attribute name".to_string());
            }
            return Ok(AttrTest {
                name,
                op: make(unquote(value)),
            });
        }
    }

    let name = body.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err("empty attribute name".to_string());
    }
    Ok(AttrTest {
        name,
        op: AttrOp::Exists,
    })
}
