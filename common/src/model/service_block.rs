use serde::{Deserialize, Serialize};

/// Structured value for appending a block to a services container.
///
/// All three fields are plain text; they are escaped before being placed in
/// the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBlock {
    pub icon: String,
    pub title: String,
    pub description: String,
}

impl ServiceBlock {
    /// A block with no title carries nothing worth appending.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }
}
