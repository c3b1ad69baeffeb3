//! Shared crate for the site editor: the HTML editing core used by the
//! frontend and the wire models exchanged with the backend.

pub mod editor;
pub mod model;
pub mod requests;
