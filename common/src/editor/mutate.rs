//! Applies one semantic edit to a document.
//!
//! The document is parsed fresh for every edit and the target is resolved in
//! that tree, never in the one the catalog was built from: catalogs may lag
//! behind when edits come in quick succession.

use kuchiki::traits::*;
use kuchiki::NodeRef;
use log::{debug, warn};
use thiserror::Error;

use super::dom::ParsedDocument;
use super::extract::{Catalog, BACKGROUND_URL};
use super::path::resolve;
use super::EDIT_MARKER_ATTR;
use crate::model::editable::ElementKind;
use crate::model::service_block::ServiceBlock;

/// A user edit. The variant is the edit's type and must match the kind of
/// the targeted catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Plain text, never interpreted as markup.
    Text(String),
    Image(String),
    BackgroundImage(String),
    AppendService(ServiceBlock),
}

impl Edit {
    pub fn kind(&self) -> ElementKind {
        match self {
            Edit::Text(_) => ElementKind::Text,
            Edit::Image(_) => ElementKind::Image,
            Edit::BackgroundImage(_) => ElementKind::BackgroundImage,
            Edit::AppendService(_) => ElementKind::ServiceContainer,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("no catalog entry with id {0}")]
    UnknownElement(String),
    #[error("a {edit} edit cannot target a {entry} element")]
    KindMismatch {
        entry: ElementKind,
        edit: ElementKind,
    },
    #[error("element {0} could not be located unambiguously")]
    Unresolved(String),
    #[error("element {0} already holds this value")]
    Unchanged(String),
    #[error("element {0} has no background-image url() to replace")]
    MissingBackground(String),
    #[error("a service block needs a title")]
    BlankServiceBlock,
    #[error("service block template could not be built")]
    Template,
    #[error("could not serialize document: {0}")]
    Serialize(String),
}

/// Applies `edit` to the element `element_id` of `catalog` and returns the
/// new document.
pub fn try_apply_edit(
    document: &str,
    catalog: &Catalog,
    element_id: &str,
    edit: &Edit,
) -> Result<String, EditError> {
    let entry = catalog
        .get(element_id)
        .ok_or_else(|| EditError::UnknownElement(element_id.to_string()))?;
    if entry.kind != edit.kind() {
        return Err(EditError::KindMismatch {
            entry: entry.kind,
            edit: edit.kind(),
        });
    }

    let tree = ParsedDocument::parse(document);
    let element =
        resolve(&tree, entry).ok_or_else(|| EditError::Unresolved(element_id.to_string()))?;

    match edit {
        Edit::Text(value) => set_text(&element, value, element_id)?,
        Edit::Image(url) => set_src(&element, url, element_id)?,
        Edit::BackgroundImage(url) => replace_background_url(&element, url, element_id)?,
        Edit::AppendService(block) => append_service_block(&element, block)?,
    }

    tree.serialize()
}

/// Same as [`try_apply_edit`] but every failure yields the input unchanged.
///
/// Failures are local by nature (an ambiguous or vanished target) and only
/// make one edit inert, so they are logged and absorbed here.
pub fn apply_edit(document: &str, catalog: &Catalog, element_id: &str, edit: &Edit) -> String {
    match try_apply_edit(document, catalog, element_id, edit) {
        Ok(updated) => updated,
        Err(err @ (EditError::Unchanged(_) | EditError::Unresolved(_))) => {
            debug!("edit skipped: {}", err);
            document.to_string()
        }
        Err(err) => {
            warn!("edit rejected: {}", err);
            document.to_string()
        }
    }
}

/// Removes every `data-edit-id` marker, for documents leaving the editor.
pub fn strip_edit_markers(document: &str) -> String {
    let tree = ParsedDocument::parse(document);
    let mut removed = 0;
    for element in tree.root().descendants().elements() {
        if element
            .attributes
            .borrow_mut()
            .remove(EDIT_MARKER_ATTR)
            .is_some()
        {
            removed += 1;
        }
    }

    if removed == 0 {
        return document.to_string();
    }
    tree.serialize().unwrap_or_else(|err| {
        warn!("could not strip edit markers: {}", err);
        document.to_string()
    })
}

/// Escapes `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn set_text(element: &NodeRef, value: &str, element_id: &str) -> Result<(), EditError> {
    if element.text_contents().trim() == value {
        return Err(EditError::Unchanged(element_id.to_string()));
    }

    let children: Vec<NodeRef> = element.children().collect();
    for child in children {
        child.detach();
    }
    element.append(NodeRef::new_text(value));
    Ok(())
}

fn set_src(element: &NodeRef, url: &str, element_id: &str) -> Result<(), EditError> {
    let data = element
        .as_element()
        .ok_or_else(|| EditError::Unresolved(element_id.to_string()))?;
    let mut attributes = data.attributes.borrow_mut();
    if attributes.get("src") == Some(url) {
        return Err(EditError::Unchanged(element_id.to_string()));
    }
    attributes.insert("src", url.to_string());
    Ok(())
}

/// Swaps the payload of the first `url(...)` in the `background-image`
/// declaration. Every other byte of the style attribute is kept.
fn replace_background_url(element: &NodeRef, url: &str, element_id: &str) -> Result<(), EditError> {
    let data = element
        .as_element()
        .ok_or_else(|| EditError::Unresolved(element_id.to_string()))?;
    let mut attributes = data.attributes.borrow_mut();
    let style = attributes.get("style").unwrap_or_default().to_string();

    let current = BACKGROUND_URL
        .captures(&style)
        .and_then(|caps| caps.name("url"))
        .ok_or_else(|| EditError::MissingBackground(element_id.to_string()))?;

    let url = encode_css_url(url);
    if current.as_str().trim() == url {
        return Err(EditError::Unchanged(element_id.to_string()));
    }

    let updated = format!(
        "{}{}{}",
        &style[..current.start()],
        url,
        &style[current.end()..]
    );
    attributes.insert("style", updated);
    Ok(())
}

/// Keeps a URL from closing the surrounding `url(...)` or its quotes.
fn encode_css_url(url: &str) -> String {
    url.trim()
        .replace('"', "%22")
        .replace('\'', "%27")
        .replace('(', "%28")
        .replace(')', "%29")
        .replace(char::is_whitespace, "%20")
}

fn append_service_block(container: &NodeRef, block: &ServiceBlock) -> Result<(), EditError> {
    if block.is_blank() {
        return Err(EditError::BlankServiceBlock);
    }

    let markup = format!(
        "<div class=\"service-item\"><span class=\"service-icon\">{}</span><h3 class=\"service-title\">{}</h3><p class=\"service-description\">{}</p></div>",
        escape_html(block.icon.trim()),
        escape_html(block.title.trim()),
        escape_html(block.description.trim()),
    );
    let fragment = kuchiki::parse_html().one(markup);
    let item = fragment
        .select_first(".service-item")
        .map_err(|()| EditError::Template)?;

    let node = item.as_node().clone();
    node.detach();
    container.append(node);
    Ok(())
}
