//! The seam between the editing logic and a concrete element tree.
//!
//! Path encoding and resolution only need a handful of read operations, so
//! they are written once against `LiveTree` and run both over the detached
//! tree parsed here and over the browser DOM of the rendered sandbox.

use kuchiki::traits::*;
use kuchiki::NodeRef;

use super::mutate::EditError;

/// Read access to an element tree.
///
/// Tag names are reported in lowercase.
pub trait LiveTree {
    type Element: Clone;

    /// The `<html>` element.
    fn document_element(&self) -> Option<Self::Element>;
    fn parent_element(&self, element: &Self::Element) -> Option<Self::Element>;
    fn child_elements(&self, element: &Self::Element) -> Vec<Self::Element>;
    /// Element siblings before `element`, in any order.
    fn preceding_sibling_elements(&self, element: &Self::Element) -> Vec<Self::Element>;
    fn tag_name(&self, element: &Self::Element) -> String;
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn text_content(&self, element: &Self::Element) -> String;
    /// All elements with the given tag, in document order.
    fn elements_by_tag(&self, tag: &str) -> Vec<Self::Element>;
    fn query_selector(&self, selector: &str) -> Option<Self::Element>;
}

/// A detached, mutable tree parsed from a document string.
pub struct ParsedDocument {
    root: NodeRef,
}

impl ParsedDocument {
    /// Parses with html5ever's error recovery; this never fails.
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchiki::parse_html().one(html.to_string()),
        }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn serialize(&self) -> Result<String, EditError> {
        let mut output = Vec::new();
        self.root
            .serialize(&mut output)
            .map_err(|err| EditError::Serialize(err.to_string()))?;
        String::from_utf8(output).map_err(|err| EditError::Serialize(err.to_string()))
    }
}

impl LiveTree for ParsedDocument {
    type Element = NodeRef;

    fn document_element(&self) -> Option<NodeRef> {
        self.root
            .children()
            .elements()
            .find(|element| &*element.name.local == "html")
            .map(|element| element.as_node().clone())
    }

    fn parent_element(&self, element: &NodeRef) -> Option<NodeRef> {
        element.parent().filter(|parent| parent.as_element().is_some())
    }

    fn child_elements(&self, element: &NodeRef) -> Vec<NodeRef> {
        element
            .children()
            .elements()
            .map(|child| child.as_node().clone())
            .collect()
    }

    fn preceding_sibling_elements(&self, element: &NodeRef) -> Vec<NodeRef> {
        element
            .preceding_siblings()
            .elements()
            .map(|sibling| sibling.as_node().clone())
            .collect()
    }

    fn tag_name(&self, element: &NodeRef) -> String {
        element
            .as_element()
            .map(|data| (*data.name.local).to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn attribute(&self, element: &NodeRef, name: &str) -> Option<String> {
        let data = element.as_element()?;
        let attributes = data.attributes.borrow();
        attributes.get(name).map(str::to_string)
    }

    fn text_content(&self, element: &NodeRef) -> String {
        element.text_contents()
    }

    fn elements_by_tag(&self, tag: &str) -> Vec<NodeRef> {
        self.root
            .descendants()
            .elements()
            .filter(|element| (*element.name.local).eq_ignore_ascii_case(tag))
            .map(|element| element.as_node().clone())
            .collect()
    }

    fn query_selector(&self, selector: &str) -> Option<NodeRef> {
        self.root
            .select_first(selector)
            .ok()
            .map(|element| element.as_node().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_always_yields_html_root() {
        let tree = ParsedDocument::parse("<p>loose paragraph");
        let html = tree.document_element().expect("html element");
        assert_eq!(tree.tag_name(&html), "html");
        assert_eq!(tree.elements_by_tag("p").len(), 1);
    }

    #[test]
    fn html_root_has_no_parent_element() {
        let tree = ParsedDocument::parse("<html><body></body></html>");
        let html = tree.document_element().expect("html element");
        assert!(tree.parent_element(&html).is_none());
    }

    #[test]
    fn preceding_siblings_only_count_elements() {
        let tree = ParsedDocument::parse("<body><p>a</p> text <span>b</span><p>c</p></body>");
        let last = tree.elements_by_tag("p").pop().expect("second paragraph");
        let siblings = tree.preceding_sibling_elements(&last);
        assert_eq!(siblings.len(), 2);
    }
}
