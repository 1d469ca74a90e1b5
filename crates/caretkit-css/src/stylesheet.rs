//! Author and user-agent stylesheets with simple selectors.
//!
//! Supported selectors are compound `tag.class#id` (or `*`) joined by the
//! descendant and child combinators. Rules using anything else (attribute
//! selectors, pseudo-classes) are skipped, not rejected, so one unsupported
//! rule never drops a whole sheet.

use tracing::{debug, trace};

use crate::declaration::{split_top_level, StyleDeclaration};
use crate::CssError;

/// Element access needed for selector matching.
pub trait SelectorElement: Sized {
    /// Lower-case tag name.
    fn local_name(&self) -> String;
    /// Value of the `id` attribute.
    fn id(&self) -> Option<String>;
    /// Whether the `class` attribute contains `class`.
    fn has_class(&self, class: &str) -> bool;
    /// Parent element, `None` at the root or at a shadow boundary.
    fn parent_element(&self) -> Option<Self>;
}

/// Selector specificity as (ids, classes, types).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// One compound selector such as `div.note#main`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    fn parse(input: &str) -> Result<Self, CssError> {
        let mut compound = Compound::default();
        let mut rest = input;

        let tag_len = rest
            .find(|c: char| c == '.' || c == '#')
            .unwrap_or(rest.len());
        let tag = &rest[..tag_len];
        if !tag.is_empty() && tag != "*" {
            if !is_ident(tag) {
                return Err(CssError::InvalidSelector(input.to_string()));
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_len..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let len = body
                .find(|c: char| c == '.' || c == '#')
                .unwrap_or(body.len());
            let name = &body[..len];
            if !is_ident(name) {
                return Err(CssError::InvalidSelector(input.to_string()));
            }
            if marker == '#' {
                compound.id = Some(name.to_string());
            } else {
                compound.classes.push(name.to_string());
            }
            rest = &body[len..];
        }

        Ok(compound)
    }

    fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        if let Some(tag) = &self.tag {
            if element.local_name() != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id().as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| element.has_class(c))
    }

    fn specificity(&self) -> Specificity {
        Specificity(
            u32::from(self.id.is_some()),
            self.classes.len() as u32,
            u32::from(self.tag.is_some()),
        )
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
}

/// How a compound relates to the one on its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// A complex selector: the subject compound plus its ancestor compounds,
/// nearest first, each with the combinator that reaches it.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
}

impl Selector {
    /// Parse a single complex selector.
    pub fn parse(input: &str) -> Result<Self, CssError> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending_child = false;

        for token in input.replace('>', " > ").split_whitespace() {
            if token == ">" {
                if compounds.is_empty() || pending_child {
                    return Err(CssError::InvalidSelector(input.to_string()));
                }
                pending_child = true;
                continue;
            }
            if !compounds.is_empty() {
                combinators.push(if pending_child {
                    Combinator::Child
                } else {
                    Combinator::Descendant
                });
            }
            pending_child = false;
            compounds.push(Compound::parse(token)?);
        }

        if compounds.is_empty() || pending_child {
            return Err(CssError::InvalidSelector(input.to_string()));
        }

        let subject = compounds.pop().unwrap_or_default();
        let ancestors = combinators
            .into_iter()
            .rev()
            .zip(compounds.into_iter().rev())
            .collect();
        Ok(Self { subject, ancestors })
    }

    /// Selector specificity.
    pub fn specificity(&self) -> Specificity {
        self.ancestors
            .iter()
            .map(|(_, c)| c.specificity())
            .fold(self.subject.specificity(), |acc, s| {
                Specificity(acc.0 + s.0, acc.1 + s.1, acc.2 + s.2)
            })
    }

    /// Whether `element` matches this selector.
    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        self.subject.matches(element) && Self::match_ancestors(&self.ancestors, element)
    }

    fn match_ancestors<E: SelectorElement>(rest: &[(Combinator, Compound)], element: &E) -> bool {
        let Some(((combinator, compound), remaining)) = rest.split_first() else {
            return true;
        };
        let mut current = element.parent_element();
        while let Some(candidate) = current {
            if compound.matches(&candidate) && Self::match_ancestors(remaining, &candidate) {
                return true;
            }
            if *combinator == Combinator::Child {
                return false;
            }
            current = candidate.parent_element();
        }
        false
    }
}

/// A style rule: selector list plus declarations.
#[derive(Debug, Clone)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: StyleDeclaration,
}

impl Rule {
    /// Highest specificity among the selectors matching `element`.
    pub fn match_specificity<E: SelectorElement>(&self, element: &E) -> Option<Specificity> {
        self.selectors
            .iter()
            .filter(|s| s.matches(element))
            .map(Selector::specificity)
            .max()
    }
}

/// A parsed stylesheet.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Parse a CSS string into a stylesheet.
    ///
    /// At-rules are skipped along with their blocks. A block that is never
    /// closed is a parse error.
    pub fn parse(css: &str) -> Result<Self, CssError> {
        debug!(len = css.len(), "Parsing CSS");
        let css = strip_comments(css);
        let mut stylesheet = Stylesheet::new();
        let mut rest = css.as_str();

        while let Some(open) = rest.find('{') {
            let prelude = rest[..open].trim();
            let close = matching_brace(rest, open).ok_or_else(|| {
                CssError::ParseError(format!("unterminated block after '{prelude}'"))
            })?;
            let body = &rest[open + 1..close];
            rest = &rest[close + 1..];

            if prelude.starts_with('@') {
                trace!(prelude, "Skipping at-rule");
                continue;
            }

            let selectors: Result<Vec<_>, _> = split_top_level(prelude, ',')
                .into_iter()
                .map(Selector::parse)
                .collect();
            match selectors {
                Ok(selectors) if !selectors.is_empty() => stylesheet.rules.push(Rule {
                    selectors,
                    declarations: StyleDeclaration::parse(body),
                }),
                Ok(_) => {}
                Err(err) => debug!(%err, "Skipping rule with unsupported selector"),
            }
        }

        debug!(rule_count = stylesheet.rules.len(), "CSS parsed");
        Ok(stylesheet)
    }

    /// Get the number of rules in this stylesheet.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rules matching `element`, sorted by specificity then source order.
    pub fn matching_rules<E: SelectorElement>(&self, element: &E) -> Vec<(Specificity, &Rule)> {
        let mut matched: Vec<(Specificity, usize, &Rule)> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(order, rule)| {
                rule.match_specificity(element)
                    .map(|spec| (spec, order, rule))
            })
            .collect();
        matched.sort_by_key(|(spec, order, _)| (*spec, *order));
        matched
            .into_iter()
            .map(|(spec, _, rule)| (spec, rule))
            .collect()
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

fn matching_brace(input: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in input[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestElement {
        tag: &'static str,
        id: Option<&'static str>,
        classes: Vec<&'static str>,
        parent: Option<Box<TestElement>>,
    }

    impl TestElement {
        fn new(tag: &'static str) -> Self {
            Self {
                tag,
                id: None,
                classes: Vec::new(),
                parent: None,
            }
        }

        fn child_of(mut self, parent: TestElement) -> Self {
            self.parent = Some(Box::new(parent));
            self
        }
    }

    impl SelectorElement for TestElement {
        fn local_name(&self) -> String {
            self.tag.to_string()
        }
        fn id(&self) -> Option<String> {
            self.id.map(str::to_string)
        }
        fn has_class(&self, class: &str) -> bool {
            self.classes.contains(&class)
        }
        fn parent_element(&self) -> Option<Self> {
            self.parent.as_deref().cloned()
        }
    }

    #[test]
    fn test_parse_rules() {
        let sheet = Stylesheet::parse("div { width: 10px; } /* note */ p, span { color: red }")
            .unwrap();
        assert_eq!(sheet.rule_count(), 2);
        assert_eq!(sheet.rules[1].selectors.len(), 2);
        assert_eq!(sheet.rules[0].declarations.get("width"), Some("10px"));
    }

    #[test]
    fn test_at_rules_skipped() {
        let css = "@media screen { div { width: 1px } } span { width: 2px }";
        let sheet = Stylesheet::parse(css).unwrap();
        assert_eq!(sheet.rule_count(), 1);
        assert_eq!(sheet.rules[0].declarations.get("width"), Some("2px"));
    }

    #[test]
    fn test_unsupported_selector_skipped() {
        let css = "a:hover { color: red } b { color: blue }";
        let sheet = Stylesheet::parse(css).unwrap();
        assert_eq!(sheet.rule_count(), 1);
    }

    #[test]
    fn test_unterminated_block() {
        assert!(matches!(
            Stylesheet::parse("div { width: 1px"),
            Err(CssError::ParseError(_))
        ));
    }

    #[test]
    fn test_specificity() {
        let spec = |s: &str| Selector::parse(s).unwrap().specificity();
        assert_eq!(spec("div"), Specificity(0, 0, 1));
        assert_eq!(spec("div.a.b"), Specificity(0, 2, 1));
        assert_eq!(spec("#x span"), Specificity(1, 0, 1));
        assert_eq!(spec("*"), Specificity(0, 0, 0));
        assert!(spec("#x") > spec(".a.b.c"));
    }

    #[test]
    fn test_compound_matching() {
        let mut el = TestElement::new("div");
        el.id = Some("main");
        el.classes = vec!["note"];
        assert!(Selector::parse("div.note#main").unwrap().matches(&el));
        assert!(Selector::parse(".note").unwrap().matches(&el));
        assert!(!Selector::parse("span.note").unwrap().matches(&el));
        assert!(!Selector::parse(".other").unwrap().matches(&el));
    }

    #[test]
    fn test_combinators() {
        let body = TestElement::new("body");
        let section = TestElement::new("section").child_of(body);
        let div = TestElement::new("div").child_of(section);

        let matches = |s: &str| Selector::parse(s).unwrap().matches(&div);
        assert!(matches("body div"));
        assert!(matches("section > div"));
        assert!(!matches("body > div"));
        assert!(matches("body > section div"));
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(Selector::parse("> div").is_err());
        assert!(Selector::parse("div >").is_err());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div[x]").is_err());
    }

    #[test]
    fn test_matching_rules_order() {
        let css = "div.a { width: 2px } div { width: 1px }";
        let sheet = Stylesheet::parse(css).unwrap();
        let mut el = TestElement::new("div");
        el.classes = vec!["a"];
        let rules = sheet.matching_rules(&el);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].1.declarations.get("width"), Some("2px"));
    }
}
