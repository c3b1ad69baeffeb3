//! Component state for the site editor.
//!
//! The edit session from `common` owns both documents, the history and the
//! save status; this struct only adds what the browser needs on top of it:
//! DOM refs, the sandbox bridge, the edit panel drafts and render bookkeeping.

use web_sys::HtmlIFrameElement;
use yew::prelude::*;

use common::editor::EditSession;
use common::model::editable::EditableElement;
use common::model::service_block::ServiceBlock;

use super::bridge::SandboxBridge;
use super::storage::LocalRecoveryStore;

/// Main state container for the `SiteEditorComponent`.
///
/// Fields are `pub` because they are accessed by the `view` and `update`
/// modules.
pub struct SiteEditorComponent {
    /// The editing session, `None` until a site has been loaded.
    pub session: Option<EditSession<LocalRecoveryStore>>,

    /// Active tab: either `"editor"` or `"html"`.
    pub active_tab: String,

    /// Reference to the sandbox `<iframe>`.
    pub sandbox_ref: NodeRef,

    /// Reference to the edit panel top sheet container.
    pub edit_panel_ref: NodeRef,

    /// Listeners wired into the current sandbox render.
    pub bridge: SandboxBridge,

    /// Session revision last written into the sandbox.
    pub rendered_revision: Option<u64>,

    /// The iframe that revision was written into. A different element means
    /// Yew remounted it and the render has to be redone.
    pub rendered_frame: Option<HtmlIFrameElement>,

    /// Snapshot of the selected catalog entry, refreshed after every edit.
    pub selected: Option<EditableElement>,

    /// Pending value for text, image and background edits.
    pub draft: String,

    /// Pending block for service container edits.
    pub service_draft: ServiceBlock,

    /// Set when loading failed, shown instead of the editor.
    pub load_error: Option<String>,

    /// Guard to avoid running first-render initialization more than once.
    pub loaded: bool,
}

impl SiteEditorComponent {
    pub fn new() -> Self {
        Self {
            session: None,
            active_tab: "editor".to_string(),
            sandbox_ref: Default::default(),
            edit_panel_ref: Default::default(),
            bridge: SandboxBridge::new(),
            rendered_revision: None,
            rendered_frame: None,
            selected: None,
            draft: String::new(),
            service_draft: ServiceBlock::default(),
            load_error: None,
            loaded: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_dirty())
    }

    /// Whether the sandbox shows an outdated revision or a remounted iframe.
    pub fn needs_render(&self, frame: &HtmlIFrameElement) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let same_frame = self
            .rendered_frame
            .as_ref()
            .is_some_and(|rendered| rendered.is_same_node(Some(frame.as_ref())));
        !same_frame || self.rendered_revision != Some(session.revision())
    }

    /// Forgets the current sandbox render so the next `rendered` pass redoes it.
    pub fn invalidate_render(&mut self) {
        self.rendered_revision = None;
        self.rendered_frame = None;
    }
}
