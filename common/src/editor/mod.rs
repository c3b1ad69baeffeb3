//! HTML editing core.
//!
//! The working document is always a plain string. Every operation parses it,
//! works on a detached tree and serializes the result back; nothing here keeps
//! a live tree between calls.
//!
//! - `path`: structural locators and their resolution against any tree.
//! - `dom`: the `LiveTree` seam and its implementation over a parsed document.
//! - `extract`: builds the catalog of editable elements.
//! - `mutate`: applies one edit and returns the new document.
//! - `bridge`: maps a catalog onto a rendered tree for click handling.
//! - `recovery`: keyed snapshot store used to survive reloads.
//! - `session`: the state machine tying all of the above together.

pub mod bridge;
pub mod dom;
pub mod extract;
pub mod mutate;
pub mod path;
pub mod recovery;
pub mod session;

pub use extract::{extract, Catalog, Extraction};
pub use mutate::{apply_edit, strip_edit_markers, try_apply_edit, Edit, EditError};
pub use session::{EditOutcome, EditSession, SaveStatus, SessionError};

/// Attribute injected on background-image carriers so they can be found again.
pub const EDIT_MARKER_ATTR: &str = "data-edit-id";

/// Delay after which a `Success`/`Error` save status goes back to `Idle`.
pub const SAVE_STATUS_RESET_MS: u32 = 3000;
