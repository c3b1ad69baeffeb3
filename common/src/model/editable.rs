use std::fmt;

use serde::{Deserialize, Serialize};

use crate::editor::path::ElementPath;

/// The closed set of things a user can edit in a generated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Text,
    Image,
    BackgroundImage,
    ServiceContainer,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::BackgroundImage => "backgroundImage",
            ElementKind::ServiceContainer => "serviceContainer",
        }
    }

    /// CSS class the rendered sandbox puts on elements of this kind.
    pub fn affordance_class(self) -> &'static str {
        match self {
            ElementKind::Text => "editable-text",
            ElementKind::Image => "editable-image",
            ElementKind::BackgroundImage => "editable-background",
            ElementKind::ServiceContainer => "editable-services",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the catalog computed from a document.
///
/// Entries are never stored on their own: they are recomputed from the
/// document string every time it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableElement {
    /// `<kind>-<path token>`, unique within one catalog.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Trimmed text, image URL, or a constant for service containers.
    pub content: String,
    pub path: ElementPath,
    /// `[data-edit-id="..."]`, only set for background images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    pub display_name: String,
}

impl EditableElement {
    /// Tag name of the element the entry was built from.
    pub fn tag(&self) -> &str {
        self.path.leaf_tag().unwrap_or_default()
    }
}
