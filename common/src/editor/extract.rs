//! Builds the catalog of editable elements from a document string.
//!
//! Extraction is a pure function of the input except for one side effect:
//! elements carrying an inline `background-image: url(...)` receive a
//! `data-edit-id` marker, and the annotated document is handed back so the
//! caller can adopt it. Markers already present are reused, which makes a
//! second extraction over the annotated output inject nothing.

use std::collections::HashSet;
use std::sync::LazyLock;

use kuchiki::traits::*;
use log::{debug, warn};
use regex::Regex;

use super::dom::ParsedDocument;
use super::path::{encode, ElementPath};
use super::EDIT_MARKER_ATTR;
use crate::model::editable::{EditableElement, ElementKind};

/// Tags whose text is offered for editing.
pub const TEXT_TAGS: [&str; 13] = [
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "span", "div", "a", "button", "label",
];

/// Structural selectors that mark the grid holding the service cards.
pub const SERVICE_CONTAINER_SELECTORS: [&str; 6] = [
    ".services-grid",
    ".services-container",
    ".services .grid",
    "#services .grid",
    "#services .row",
    "[data-section=\"services\"]",
];

/// `content` of every service container entry.
pub const SERVICE_CONTAINER_CONTENT: &str = "services";

const DISPLAY_NAME_CHARS: usize = 20;

/// `background-image: url(...)`, split so the URL can be swapped in place.
pub(crate) static BACKGROUND_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?P<prefix>background-image\s*:\s*url\(\s*["']?)(?P<url>[^"')]*)(?P<suffix>["']?\s*\))"#)
        .expect("background-image pattern is valid")
});

/// Ordered list of editable elements with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<EditableElement>,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&EditableElement> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EditableElement> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[EditableElement] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a EditableElement;
    type IntoIter = std::slice::Iter<'a, EditableElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Result of one extraction pass.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub catalog: Catalog,
    /// The input with edit markers added; identical to the input when
    /// `markers_injected` is zero.
    pub document: String,
    pub markers_injected: usize,
}

#[derive(Default)]
struct CatalogBuilder {
    entries: Vec<EditableElement>,
    ids: HashSet<String>,
}

impl CatalogBuilder {
    fn push(
        &mut self,
        kind: ElementKind,
        content: String,
        path: ElementPath,
        selector: Option<String>,
        display_name: String,
    ) {
        let base = format!("{}-{}", kind.as_str(), path.token());
        let mut id = base.clone();
        let mut suffix = 2;
        while !self.ids.insert(id.clone()) {
            id = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        self.entries.push(EditableElement {
            id,
            kind,
            content,
            path,
            selector,
            display_name,
        });
    }

    fn finish(self) -> Catalog {
        Catalog {
            entries: self.entries,
        }
    }
}

/// Scans `document` and returns its catalog. Never fails: malformed markup
/// only yields a smaller catalog.
pub fn extract(document: &str) -> Extraction {
    let tree = ParsedDocument::parse(document);
    let mut builder = CatalogBuilder::default();

    collect_text(&tree, &mut builder);
    collect_images(&tree, &mut builder);
    let markers_injected = collect_backgrounds(&tree, &mut builder);
    collect_service_containers(&tree, &mut builder);

    let catalog = builder.finish();
    debug!(
        "extracted {} editable elements ({} markers injected)",
        catalog.len(),
        markers_injected
    );

    let document = if markers_injected == 0 {
        document.to_string()
    } else {
        match tree.serialize() {
            Ok(annotated) => annotated,
            Err(err) => {
                warn!("could not serialize annotated document: {}", err);
                document.to_string()
            }
        }
    };

    Extraction {
        catalog,
        document,
        markers_injected,
    }
}

/// URL inside the first `background-image: url(...)` of an inline style.
pub fn background_url(style: &str) -> Option<String> {
    BACKGROUND_URL
        .captures(style)
        .and_then(|caps| caps.name("url"))
        .map(|url| url.as_str().trim().to_string())
}

fn collect_text(tree: &ParsedDocument, builder: &mut CatalogBuilder) {
    for element in tree.root().descendants().elements() {
        let tag = (*element.name.local).to_ascii_lowercase();
        if !TEXT_TAGS.contains(&tag.as_str()) {
            continue;
        }

        let content = element.as_node().text_contents().trim().to_string();
        if content.is_empty() {
            continue;
        }

        let display_name = format!("{}: {}", tag, preview(&content));
        builder.push(
            ElementKind::Text,
            content,
            encode(tree, element.as_node()),
            None,
            display_name,
        );
    }
}

fn collect_images(tree: &ParsedDocument, builder: &mut CatalogBuilder) {
    let mut count = 0;
    for element in tree.root().descendants().elements() {
        if !(*element.name.local).eq_ignore_ascii_case("img") {
            continue;
        }
        count += 1;

        let (src, alt) = {
            let attributes = element.attributes.borrow();
            (
                attributes.get("src").unwrap_or_default().to_string(),
                attributes.get("alt").map(|alt| alt.trim().to_string()),
            )
        };
        let display_name = match alt {
            Some(alt) if !alt.is_empty() => alt,
            _ => format!("Imagen {}", count),
        };

        builder.push(
            ElementKind::Image,
            src,
            encode(tree, element.as_node()),
            None,
            display_name,
        );
    }
}

/// Returns the number of markers written into the tree.
fn collect_backgrounds(tree: &ParsedDocument, builder: &mut CatalogBuilder) -> usize {
    let mut taken: HashSet<String> = tree
        .root()
        .descendants()
        .elements()
        .filter_map(|element| {
            element
                .attributes
                .borrow()
                .get(EDIT_MARKER_ATTR)
                .map(str::to_string)
        })
        .collect();
    let mut claimed = HashSet::new();
    let mut injected = 0;
    let mut count = 0;

    for element in tree.root().descendants().elements() {
        let Some(url) = element
            .attributes
            .borrow()
            .get("style")
            .and_then(background_url)
        else {
            continue;
        };
        count += 1;

        let path = encode(tree, element.as_node());
        let existing = element
            .attributes
            .borrow()
            .get(EDIT_MARKER_ATTR)
            .map(str::to_string);

        let marker = match existing {
            Some(marker) if is_safe_marker(&marker) && claimed.insert(marker.clone()) => marker,
            _ => {
                let marker = fresh_marker(&path, &taken);
                taken.insert(marker.clone());
                claimed.insert(marker.clone());
                element
                    .attributes
                    .borrow_mut()
                    .insert(EDIT_MARKER_ATTR, marker.clone());
                injected += 1;
                marker
            }
        };

        let tag = (*element.name.local).to_ascii_lowercase();
        builder.push(
            ElementKind::BackgroundImage,
            url,
            path,
            Some(format!("[{}=\"{}\"]", EDIT_MARKER_ATTR, marker)),
            format!("Imagen de fondo {} ({})", count, tag),
        );
    }

    injected
}

fn collect_service_containers(tree: &ParsedDocument, builder: &mut CatalogBuilder) {
    let selectors = SERVICE_CONTAINER_SELECTORS.join(", ");
    let Ok(matches) = tree.root().select(&selectors) else {
        warn!("service container selectors failed to compile");
        return;
    };

    for (index, element) in matches.enumerate() {
        builder.push(
            ElementKind::ServiceContainer,
            SERVICE_CONTAINER_CONTENT.to_string(),
            encode(tree, element.as_node()),
            None,
            format!("Contenedor de servicios {}", index + 1),
        );
    }
}

fn is_safe_marker(marker: &str) -> bool {
    !marker.is_empty()
        && marker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn fresh_marker(path: &ElementPath, taken: &HashSet<String>) -> String {
    let base = format!("bg-{}", path.token());
    let mut marker = base.clone();
    let mut suffix = 2;
    while taken.contains(&marker) {
        marker = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    marker
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(DISPLAY_NAME_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
