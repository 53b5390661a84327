use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A paste as it is persisted, both in the database and in the cache.
///
/// Whether the caller owns the paste is deliberately not part of this type,
/// see [`crate::types::api::PasteView`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paste {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub owner_identity: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub language: String,
}

impl Paste {
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.owner_identity == identity
    }
}

/// A row whose storage key does not match its paste id.
#[derive(Debug, Clone, FromRow)]
pub struct LegacyKey {
    pub key: String,
    pub id: String,
}
