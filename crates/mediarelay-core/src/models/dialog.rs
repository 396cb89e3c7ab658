use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A conversation reachable by the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DialogEntry {
    pub name: String,
    pub id: i64,
}

/// Response body for `GET /get_group`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DialogsResponse {
    pub success: bool,
    pub count: usize,
    pub dialogs: Vec<DialogEntry>,
}

impl From<Vec<DialogEntry>> for DialogsResponse {
    fn from(dialogs: Vec<DialogEntry>) -> Self {
        Self {
            success: true,
            count: dialogs.len(),
            dialogs,
        }
    }
}
