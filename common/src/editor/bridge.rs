//! Catalog to rendered-tree mapping used by the selection layer.
//!
//! The rendered sandbox is a different tree instance from the one used for
//! mutation, so every entry is resolved again here. What to do with a binding
//! (classes, listeners, navigation guards) is up to the rendering platform.

use log::debug;

use super::dom::LiveTree;
use super::extract::Catalog;
use super::path::resolve;
use crate::model::editable::ElementKind;

/// One clickable element of the rendered document.
#[derive(Debug, Clone)]
pub struct Binding<E> {
    pub element_id: String,
    pub kind: ElementKind,
    pub element: E,
    pub is_anchor: bool,
}

impl<E> Binding<E> {
    pub fn affordance_class(&self) -> &'static str {
        self.kind.affordance_class()
    }
}

/// Resolves every catalog entry inside `tree`.
///
/// Entries that do not resolve (duplicated content, stale markers) are left
/// out and stay inert until a later render.
pub fn bind_catalog<T: LiveTree>(tree: &T, catalog: &Catalog) -> Vec<Binding<T::Element>> {
    let mut bindings = Vec::with_capacity(catalog.len());

    for entry in catalog {
        match resolve(tree, entry) {
            Some(element) => {
                let is_anchor = tree.tag_name(&element) == "a";
                bindings.push(Binding {
                    element_id: entry.id.clone(),
                    kind: entry.kind,
                    element,
                    is_anchor,
                });
            }
            None => debug!("{} is not interactive in this render", entry.id),
        }
    }

    bindings
}

/// Whether the sandbox needs a document-wide guard against link navigation.
pub fn needs_navigation_guard<E>(bindings: &[Binding<E>]) -> bool {
    bindings.iter().any(|binding| binding.is_anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::dom::ParsedDocument;
    use crate::editor::extract::extract;

    #[test]
    fn binds_resolvable_entries() {
        let extraction = extract(
            "<body><h1>Title</h1><img src=\"/a.png\"><div style=\"background-image:url(/b.png)\"></div></body>",
        );
        let rendered = ParsedDocument::parse(&extraction.document);

        let bindings = bind_catalog(&rendered, &extraction.catalog);
        let classes: Vec<_> = bindings.iter().map(Binding::affordance_class).collect();
        assert_eq!(
            classes,
            vec!["editable-text", "editable-image", "editable-background"]
        );
        assert!(!needs_navigation_guard(&bindings));
    }

    #[test]
    fn duplicates_are_left_unbound() {
        let extraction = extract("<body><p>Contact us</p><p>Contact us</p><p>Call</p></body>");
        let rendered = ParsedDocument::parse(&extraction.document);

        let bindings = bind_catalog(&rendered, &extraction.catalog);
        assert_eq!(extraction.catalog.len(), 3);
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn anchors_request_a_navigation_guard() {
        let extraction = extract("<body><a href=\"https://example.com\">Book now</a></body>");
        let rendered = ParsedDocument::parse(&extraction.document);

        let bindings = bind_catalog(&rendered, &extraction.catalog);
        assert!(bindings[0].is_anchor);
        assert!(needs_navigation_guard(&bindings));
    }
}
