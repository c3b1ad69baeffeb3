use serde::{Deserialize, Serialize};

/// Request payload for `POST /api/sites/save`.
///
/// An empty `file_path` asks the backend to allocate a new handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSiteRequest {
    pub html_content: String,
    pub file_path: String,
}

/// Successful answer of `POST /api/sites/save`.
///
/// `file_path` is the handle the document is now stored under. It may differ
/// from the one sent, and the editor must use it for subsequent saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSiteResponse {
    pub file_path: String,
}
