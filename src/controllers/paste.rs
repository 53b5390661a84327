use chrono::Utc;
use tracing::{debug, info};

use crate::cache::Cache;
use crate::db::Database;
use crate::error::ApiError;
use crate::ids::generate_paste_id;
use crate::models::Paste;
use crate::types::api::{NewPaste, PasteView};
use crate::App;

/// Read a paste, going to the database on a cache miss and repopulating the
/// cache with whatever it finds there.
pub async fn get(app: &App, id: &str, caller: &str) -> crate::ApiResult<PasteView> {
    let paste = match app.cache.get(id).await {
        Some(paste) => {
            debug!("found '{id}' in cache");
            paste
        }
        None => {
            let paste = lookup(&app.database, id).await?.ok_or(ApiError::NotFound)?;
            app.cache.set(&paste).await;
            debug!("added '{id}' to cache");
            paste
        }
    };

    Ok(PasteView::for_caller(paste, caller))
}

/// Look a paste up by storage key, then by id field for rows stored before
/// keys and ids were the same thing.
async fn lookup(database: &Database, id: &str) -> crate::ApiResult<Option<Paste>> {
    if let Some(paste) = database.get_paste(id).await? {
        return Ok(Some(paste));
    }

    // TODO: drop this fallback once `rekey-legacy` has run on every deployment
    let paste = database.find_paste_by_id(id).await?;
    if paste.is_some() {
        info!("resolved legacy paste '{id}' by id field");
    }
    Ok(paste)
}

pub async fn create(app: &App, new_paste: NewPaste, caller: &str) -> crate::ApiResult<PasteView> {
    let paste = Paste {
        id: generate_paste_id(),
        timestamp: Utc::now(),
        content: new_paste.content,
        owner_identity: caller.to_owned(),
        title: new_paste.title.unwrap_or_default(),
        language: new_paste.language.unwrap_or_default(),
    };

    info!(
        "new paste: id='{id}', owner='{caller}', size={size}",
        id = paste.id,
        size = paste.content.len()
    );

    app.database.insert_paste(&paste).await?;
    app.cache.set(&paste).await;

    Ok(PasteView {
        paste,
        is_owner: true,
    })
}

/// Delete a paste owned by the caller.
///
/// Unlike [`get`], this only considers the storage key and never consults
/// the cache.
pub async fn delete(app: &App, id: &str, caller: &str) -> crate::ApiResult<()> {
    let paste = app
        .database
        .get_paste(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !paste.is_owned_by(caller) {
        info!("refusing to delete '{id}': '{caller}' is not the owner");
        return Err(ApiError::NotOwner);
    }

    app.database.delete_paste(id).await?;
    app.cache.delete(id).await;
    info!("deleted paste '{id}'");

    Ok(())
}
