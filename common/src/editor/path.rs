//! Structural element paths.
//!
//! A path is the list of steps from the `<html>` element (excluded) down to an
//! element. Each step names the tag and either a stable `id` or the 1-based
//! position among same-tag siblings, like `:nth-of-type()` in CSS.
//!
//! Textual form, version 1:
//!
//! ```text
//! v1:body:nth-of-type(1)>section#services>div:nth-of-type(2)
//! ```
//!
//! The form is only used for storage and for the catalog key. Resolution of
//! text and image entries goes through their content instead, because the
//! document keeps changing between catalog builds and a stale position is
//! worse than a missing match.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::dom::LiveTree;
use crate::model::editable::{EditableElement, ElementKind};

const PATH_VERSION: &str = "v1";
const TOKEN_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    /// 1-based.
    NthOfType(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub tag: String,
    pub locator: Locator,
}

impl Segment {
    fn encode(&self) -> String {
        match &self.locator {
            Locator::Id(id) => format!("{}#{}", self.tag, id),
            Locator::NthOfType(index) => format!("{}:nth-of-type({})", self.tag, index),
        }
    }

    fn decode(raw: &str) -> Option<Self> {
        if let Some((tag, id)) = raw.split_once('#') {
            if tag.is_empty() || !is_stable_id(id) {
                return None;
            }
            return Some(Segment {
                tag: tag.to_string(),
                locator: Locator::Id(id.to_string()),
            });
        }
        let (tag, rest) = raw.split_once(":nth-of-type(")?;
        let index: u32 = rest.strip_suffix(')')?.parse().ok()?;
        if tag.is_empty() || index == 0 {
            return None;
        }
        Some(Segment {
            tag: tag.to_string(),
            locator: Locator::NthOfType(index),
        })
    }
}

/// Ordered root-to-leaf list of steps locating one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ElementPath {
    pub segments: Vec<Segment>,
}

impl ElementPath {
    pub fn leaf_tag(&self) -> Option<&str> {
        self.segments.last().map(|segment| segment.tag.as_str())
    }

    pub fn encode(&self) -> String {
        let steps: Vec<String> = self.segments.iter().map(Segment::encode).collect();
        format!("{}:{}", PATH_VERSION, steps.join(">"))
    }

    /// Inverse of [`ElementPath::encode`]. Unknown versions are rejected.
    pub fn decode(raw: &str) -> Option<Self> {
        let body = raw.strip_prefix(PATH_VERSION)?.strip_prefix(':')?;
        if body.is_empty() {
            return Some(ElementPath::default());
        }
        let segments = body
            .split('>')
            .map(Segment::decode)
            .collect::<Option<Vec<_>>>()?;
        Some(ElementPath { segments })
    }

    /// Short fixed-length key derived from the encoded form.
    pub fn token(&self) -> String {
        let digest = format!("{:x}", md5::compute(self.encode()));
        digest[..TOKEN_LEN].to_string()
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<ElementPath> for String {
    fn from(path: ElementPath) -> Self {
        path.encode()
    }
}

impl TryFrom<String> for ElementPath {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        ElementPath::decode(&raw).ok_or_else(|| format!("invalid element path: {}", raw))
    }
}

/// Ids that can be written into a path step and read back unambiguously.
fn is_stable_id(id: &str) -> bool {
    !id.is_empty()
        && !id
            .chars()
            .any(|c| c.is_whitespace() || c == '>' || c == ':' || c == '#')
}

/// Computes the path of `element` inside `tree`.
pub fn encode<T: LiveTree>(tree: &T, element: &T::Element) -> ElementPath {
    let mut segments = Vec::new();
    let mut current = element.clone();

    while let Some(parent) = tree.parent_element(&current) {
        let tag = tree.tag_name(&current);
        let locator = match tree.attribute(&current, "id") {
            Some(id) if is_stable_id(&id) => Locator::Id(id),
            _ => {
                let earlier = tree
                    .preceding_sibling_elements(&current)
                    .iter()
                    .filter(|sibling| tree.tag_name(sibling) == tag)
                    .count();
                Locator::NthOfType(earlier as u32 + 1)
            }
        };
        segments.push(Segment { tag, locator });
        current = parent;
    }

    segments.reverse();
    ElementPath { segments }
}

/// Walks `path` down from the `<html>` element.
pub fn element_at<T: LiveTree>(tree: &T, path: &ElementPath) -> Option<T::Element> {
    let mut current = tree.document_element()?;

    for segment in &path.segments {
        let mut candidates = tree
            .child_elements(&current)
            .into_iter()
            .filter(|child| tree.tag_name(child) == segment.tag);

        current = match &segment.locator {
            Locator::Id(id) => {
                candidates.find(|child| tree.attribute(child, "id").as_deref() == Some(id.as_str()))?
            }
            Locator::NthOfType(index) => candidates.nth((*index as usize).checked_sub(1)?)?,
        };
    }

    Some(current)
}

/// Finds the live element a catalog entry refers to.
///
/// Returns `None` when the element is gone or when more than one element
/// matches: ambiguous targets are never guessed.
pub fn resolve<T: LiveTree>(tree: &T, entry: &EditableElement) -> Option<T::Element> {
    if let Some(selector) = &entry.selector {
        return tree.query_selector(selector);
    }

    match entry.kind {
        ElementKind::Text => single(
            tree.elements_by_tag(entry.tag())
                .into_iter()
                .filter(|element| tree.text_content(element).trim() == entry.content),
        ),
        ElementKind::Image => single(tree.elements_by_tag("img").into_iter().filter(|element| {
            tree.attribute(element, "src").unwrap_or_default() == entry.content
        })),
        ElementKind::ServiceContainer => element_at(tree, &entry.path),
        ElementKind::BackgroundImage => None,
    }
}

fn single<E>(mut candidates: impl Iterator<Item = E>) -> Option<E> {
    let first = candidates.next()?;
    match candidates.next() {
        Some(_) => None,
        None => Some(first),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::dom::ParsedDocument;
    use pretty_assertions::assert_eq;

    fn text_entry(tree: &ParsedDocument, element: &kuchiki::NodeRef) -> EditableElement {
        EditableElement {
            id: "text-test".to_string(),
            kind: ElementKind::Text,
            content: tree.text_content(element).trim().to_string(),
            path: encode(tree, element),
            selector: None,
            display_name: String::new(),
        }
    }

    #[test]
    fn encodes_ids_and_positions() {
        let tree = ParsedDocument::parse(
            "<html><body><section id=\"hero\"><p>a</p><div></div><p>b</p></section></body></html>",
        );
        let second = tree.elements_by_tag("p").pop().expect("paragraph");
        assert_eq!(
            encode(&tree, &second).encode(),
            "v1:body:nth-of-type(1)>section#hero>p:nth-of-type(2)"
        );
    }

    #[test]
    fn ids_with_separators_fall_back_to_positions() {
        let tree = ParsedDocument::parse("<body><div id=\"a b\"></div></body>");
        let div = tree.elements_by_tag("div").pop().expect("div");
        let path = encode(&tree, &div);
        assert_eq!(path.segments[1].locator, Locator::NthOfType(1));
    }

    #[test]
    fn decode_inverts_encode() {
        let raw = "v1:body:nth-of-type(1)>main#content>ul:nth-of-type(3)>li:nth-of-type(2)";
        let path = ElementPath::decode(raw).expect("valid path");
        assert_eq!(path.segments.len(), 4);
        assert_eq!(path.encode(), raw);
        assert_eq!(path.leaf_tag(), Some("li"));
    }

    #[test]
    fn decode_rejects_other_versions_and_garbage() {
        assert!(ElementPath::decode("v2:body:nth-of-type(1)").is_none());
        assert!(ElementPath::decode("v1:body:nth-of-type(0)").is_none());
        assert!(ElementPath::decode("v1:body>").is_none());
    }

    #[test]
    fn token_is_short_and_stable() {
        let path = ElementPath::decode("v1:body:nth-of-type(1)>h1:nth-of-type(1)").expect("path");
        assert_eq!(path.token().len(), 12);
        assert_eq!(path.token(), path.clone().token());
    }

    #[test]
    fn serde_uses_textual_form() {
        let path = ElementPath::decode("v1:body:nth-of-type(1)>h1#title").expect("path");
        let json = serde_json::to_string(&path).expect("serialize");
        assert_eq!(json, "\"v1:body:nth-of-type(1)>h1#title\"");
        let back: ElementPath = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, path);
    }

    #[test]
    fn element_at_follows_path_after_reparse() {
        let html = "<body><div></div><div><span id=\"x\">hi</span></div></body>";
        let tree = ParsedDocument::parse(html);
        let span = tree.elements_by_tag("span").pop().expect("span");
        let path = encode(&tree, &span);

        let reparsed = ParsedDocument::parse(html);
        let found = element_at(&reparsed, &path).expect("resolved");
        assert_eq!(reparsed.text_content(&found), "hi");
    }

    #[test]
    fn text_resolution_survives_unrelated_sibling_insertions() {
        let tree = ParsedDocument::parse("<body><p>one</p><p>two</p></body>");
        let two = tree.elements_by_tag("p").pop().expect("paragraph");
        let entry = text_entry(&tree, &two);

        let shifted = ParsedDocument::parse("<body><p>new</p><p>one</p><p>two</p></body>");
        let found = resolve(&shifted, &entry).expect("resolved by content");
        assert_eq!(shifted.text_content(&found), "two");
    }

    #[test]
    fn duplicate_text_is_not_resolved() {
        let tree = ParsedDocument::parse("<body><p>Contact us</p><p>Contact us</p></body>");
        let first = tree.elements_by_tag("p").remove(0);
        let entry = text_entry(&tree, &first);
        assert!(resolve(&tree, &entry).is_none());
    }

    #[test]
    fn duplicate_images_are_not_resolved() {
        let tree = ParsedDocument::parse("<body><img src=\"/a.png\"><p>x</p><img src=\"/a.png\"></body>");
        let first = tree.elements_by_tag("img").remove(0);
        let entry = EditableElement {
            id: "image-test".to_string(),
            kind: ElementKind::Image,
            content: "/a.png".to_string(),
            path: encode(&tree, &first),
            selector: None,
            display_name: String::new(),
        };
        assert!(resolve(&tree, &entry).is_none());
    }
}
