use serde::{Deserialize, Serialize};

/// A generated page as handed over by the generation collaborator and as
/// returned by `GET /api/sites/{file_path}`.
///
/// `file_path` is an opaque handle. The editor never interprets it, it only
/// passes it back on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSite {
    pub html_content: String,
    pub file_path: String,
}
