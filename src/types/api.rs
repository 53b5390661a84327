use serde::{Deserialize, Serialize};

use crate::models::Paste;

/// Request body for creating a paste.
#[derive(Debug, Deserialize)]
pub struct NewPaste {
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// A paste as seen by a particular caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteView {
    #[serde(flatten)]
    pub paste: Paste,
    pub is_owner: bool,
}

impl PasteView {
    pub fn for_caller(paste: Paste, caller: &str) -> Self {
        let is_owner = paste.is_owned_by(caller);
        PasteView { paste, is_owner }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
