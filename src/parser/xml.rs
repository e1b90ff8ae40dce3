//! Minimal XML tree and the node abstraction the projector walks.
//!
//! The projector only needs tag names, leaf text and children, so it is
//! written against [`XmlNode`] rather than a particular parser. [`Element`]
//! is the implementation built from `quick-xml` events.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;

use crate::error::AppError;

static DEFAULT_NAMESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sxmlns="[^"]+""#).expect("namespace pattern is valid"));

/// Removes the first default namespace declaration. The API emits at most one
/// per document; without it tag names are plain and path lookups stay simple.
pub fn strip_default_namespace(content: &str) -> Cow<'_, str> {
    DEFAULT_NAMESPACE.replacen(content, 1, "")
}

/// A tree node with a tag name, optional text and named children.
pub trait XmlNode {
    fn tag(&self) -> &str;

    /// Text directly inside this node, if any.
    fn text(&self) -> Option<&str>;

    /// Immediate children in document order.
    fn children(&self) -> impl Iterator<Item = &Self>;

    /// First immediate child with the given tag.
    fn child(&self, tag: &str) -> Option<&Self> {
        self.children().find(|c| c.tag() == tag)
    }

    /// All immediate children with the given tag.
    fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Self>
    where
        Self: 'a,
    {
        self.children().filter(move |c| c.tag() == tag)
    }

    /// Follows a `/`-separated path of child tags, taking the first match at
    /// every step.
    fn find(&self, path: &str) -> Option<&Self> {
        path.split('/')
            .filter(|step| !step.is_empty())
            .try_fold(self, |node, step| node.child(step))
    }

    /// Text at a relative path; `Some("")` when the element exists but is empty.
    fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).map(|node| node.text().unwrap_or(""))
    }

    /// Every descendant (excluding `self`) with the given tag, in document
    /// order.
    fn descendants<'a>(&'a self, tag: &str) -> Vec<&'a Self> {
        let mut found = Vec::new();
        collect_descendants(self, tag, &mut found);
        found
    }

    /// Every descendant reachable as `.../{path}`: the first path step is
    /// matched at any depth, the rest as direct children.
    fn descendants_at<'a>(&'a self, path: &str) -> Vec<&'a Self> {
        let mut steps = path.split('/').filter(|step| !step.is_empty());
        let Some(first) = steps.next() else {
            return Vec::new();
        };
        let rest: Vec<&str> = steps.collect();
        self.descendants(first)
            .into_iter()
            .flat_map(|start| {
                rest.iter().fold(vec![start], |nodes, &step| {
                    nodes
                        .into_iter()
                        .flat_map(|node| node.children().filter(move |c| c.tag() == step))
                        .collect()
                })
            })
            .collect()
    }
}

fn collect_descendants<'a, N: XmlNode + ?Sized>(node: &'a N, tag: &str, found: &mut Vec<&'a N>) {
    for child in node.children() {
        if child.tag() == tag {
            found.push(child);
        }
        collect_descendants(child, tag, found);
    }
}

/// Owned XML element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Parses a complete document and returns its root element.
    pub fn parse(content: &str) -> Result<Element, AppError> {
        let mut reader = Reader::from_str(content);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                AppError::malformed_response(format!(
                    "{e} at byte {}",
                    reader.buffer_position()
                ))
            })?;
            match event {
                Event::Start(start) => stack.push(Element::new(tag_name(&start)?)),
                Event::Empty(start) => {
                    let element = Element::new(tag_name(&start)?);
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| AppError::malformed_response("unexpected closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| AppError::malformed_response(e.to_string()))?;
                    append_text(&mut stack, &text);
                }
                Event::CData(data) => {
                    let bytes = data.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| AppError::malformed_response(e.to_string()))?;
                    append_text(&mut stack, text);
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(AppError::malformed_response(format!(
                "unclosed element <{}>",
                open.tag
            )));
        }
        root.ok_or_else(|| AppError::malformed_response("document has no root element"))
    }
}

fn tag_name(start: &BytesStart<'_>) -> Result<String, AppError> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|e| AppError::malformed_response(e.to_string()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), AppError> {
    match stack.last_mut() {
        Some(parent) => {
            // Indentation before the first child is layout, not text.
            if parent.children.is_empty()
                && parent
                    .text
                    .as_deref()
                    .is_some_and(|text| text.trim().is_empty())
            {
                parent.text = None;
            }
            parent.children.push(element);
        }
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(AppError::malformed_response(format!(
                "second root element <{}>",
                element.tag
            )));
        }
    }
    Ok(())
}

// Only text before the first child counts as the element's text. It is kept
// verbatim.
fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut()
        && current.children.is_empty()
    {
        current.text.get_or_insert_with(String::new).push_str(text);
    }
}

impl XmlNode for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fantasy_content xml:lang="en-US" xmlns:yahoo="http://www.yahooapis.com/v1/base.rng" xmlns="http://fantasysports.yahooapis.com/fantasy/v2/base.rng">
  <league><league_key>385.l.1</league_key><name>Hoops &amp; Dreams</name></league>
</fantasy_content>"#;

    #[test]
    fn test_strip_removes_only_first_default_namespace() {
        let stripped = strip_default_namespace(NAMESPACED);
        assert!(!stripped.contains(r#"xmlns="http://fantasysports"#));
        assert!(stripped.contains("xmlns:yahoo="));

        let twice = r#"<a xmlns="one"><b xmlns="two"/></a>"#;
        assert_eq!(strip_default_namespace(twice), r#"<a><b xmlns="two"/></a>"#);
    }

    #[test]
    fn test_strip_without_namespace_borrows() {
        let plain = "<a><b>1</b></a>";
        assert!(matches!(strip_default_namespace(plain), Cow::Borrowed(_)));
    }

    #[test]
    fn test_parse_builds_tree_and_unescapes_text() {
        let root = Element::parse(&strip_default_namespace(NAMESPACED)).unwrap();
        assert_eq!(root.tag(), "fantasy_content");
        let league = root.child("league").unwrap();
        assert_eq!(league.find_text("league_key"), Some("385.l.1"));
        assert_eq!(league.find_text("name"), Some("Hoops & Dreams"));
    }

    #[test]
    fn test_empty_elements_have_no_text() {
        let root = Element::parse("<a><b/><c></c></a>").unwrap();
        assert_eq!(root.child("b").unwrap().text(), None);
        assert_eq!(root.find_text("c"), Some(""));
        assert_eq!(root.find_text("d"), None);
    }

    #[test]
    fn test_leaf_text_is_kept_verbatim() {
        let root =
            Element::parse("<a><name>  Spaced Name  </name><pad>   </pad><nl>\n</nl></a>").unwrap();
        assert_eq!(root.find_text("name"), Some("  Spaced Name  "));
        assert_eq!(root.find_text("pad"), Some("   "));
        assert_eq!(root.find_text("nl"), Some("\n"));
    }

    #[test]
    fn test_indentation_between_children_is_not_text() {
        let root = Element::parse("<a>\n  <b>1</b>\n  <c>2</c>\n</a>").unwrap();
        assert_eq!(root.text(), None);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.find_text("b"), Some("1"));

        let mixed = Element::parse("<a>lead<b/>tail</a>").unwrap();
        assert_eq!(mixed.text(), Some("lead"));
    }

    #[test]
    fn test_cdata_is_text() {
        let root = Element::parse("<a><url><![CDATA[https://x?a=1&b=2]]></url></a>").unwrap();
        assert_eq!(root.find_text("url"), Some("https://x?a=1&b=2"));
    }

    #[test]
    fn test_find_follows_paths() {
        let root = Element::parse("<p><name><full>Al Horford</full></name></p>").unwrap();
        assert_eq!(root.find_text("name/full"), Some("Al Horford"));
        assert!(root.find("name/first").is_none());
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = Element::parse(
            "<r><x><player>1</player></x><player>2<player>3</player></player></r>",
        )
        .unwrap();
        let texts: Vec<_> = root
            .descendants("player")
            .into_iter()
            .map(|p| p.text().unwrap_or(""))
            .collect();
        assert_eq!(texts, ["1", "2", "3"]);
    }

    #[test]
    fn test_descendants_at_path() {
        let root = Element::parse(
            "<r><league><standings><teams><team>a</team><team>b</team></teams></standings></league>\
             <teams><team>c</team></teams></r>",
        )
        .unwrap();
        let texts: Vec<_> = root
            .descendants_at("standings/teams/team")
            .into_iter()
            .map(|t| t.text().unwrap_or(""))
            .collect();
        assert_eq!(texts, ["a", "b"]);
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        for bad in ["<a><b></a>", "<a>", "", "just text", "<a/><b/>"] {
            let err = Element::parse(bad).unwrap_err();
            assert!(
                matches!(err, AppError::MalformedResponse { .. }),
                "{bad:?} should be malformed, got {err:?}"
            );
        }
    }
}
