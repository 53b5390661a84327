use tracing::{info, warn};

use crate::App;

pub async fn run(app: App) -> anyhow::Result<()> {
    let count = rekey(&app).await?;
    info!("re-keyed {count} legacy pastes");
    Ok(())
}

/// Move every paste stored under a key other than its id to be keyed by
/// its id, returning how many were moved.
async fn rekey(app: &App) -> crate::ApiResult<usize> {
    let legacy = app.database.get_legacy_keys().await?;

    let mut count = 0;
    for row in legacy {
        if app.database.get_paste(&row.id).await?.is_some() {
            warn!(
                "not re-keying '{key}': id '{id}' is already in use as a key",
                key = row.key,
                id = row.id
            );
            continue;
        }

        app.database.rekey_paste(&row.key, &row.id).await?;
        info!("re-keyed paste '{}'", row.id);
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::cache::AnyCache;
    use crate::controllers::paste;
    use crate::db::tests::sample_paste;
    use crate::models::Paste;

    #[tokio::test]
    async fn rekeyed_pastes_become_deletable() {
        let app = App::for_tests().await;
        let legacy = sample_paste("legacy01", "alice@example.com");
        app.database.insert_legacy_paste("old-key", &legacy).await;

        assert_eq!(rekey(&app).await.unwrap(), 1);

        assert_eq!(app.database.get_paste("legacy01").await.unwrap(), Some(legacy));
        paste::delete(&app, "legacy01", "alice@example.com")
            .await
            .unwrap();
        assert!(paste::get(&app, "legacy01", "alice@example.com")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn conflicting_rows_are_skipped() {
        let app = App::for_tests().await;
        let current = sample_paste("abcd1234", "alice@example.com");
        app.database.insert_paste(&current).await.unwrap();
        app.database
            .insert_legacy_paste("old-key", &sample_paste("abcd1234", "bob@example.com"))
            .await;

        assert_eq!(rekey(&app).await.unwrap(), 0);

        assert_eq!(app.database.get_paste("abcd1234").await.unwrap(), Some(current));
        assert_eq!(app.database.get_legacy_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_legacy_ids_keep_the_row_reads_returned() {
        let mut app = App::for_tests().await;
        app.cache = AnyCache::Disabled;

        let older = Paste {
            content: "older".to_owned(),
            ..sample_paste("dupid001", "alice@example.com")
        };
        let newer = Paste {
            content: "newer".to_owned(),
            timestamp: older.timestamp + Duration::seconds(10),
            ..sample_paste("dupid001", "bob@example.com")
        };
        // insertion order must not decide which row wins
        app.database.insert_legacy_paste("k-newer", &newer).await;
        app.database.insert_legacy_paste("k-older", &older).await;

        let before = paste::get(&app, "dupid001", "alice@example.com")
            .await
            .unwrap();
        assert_eq!(before.paste, older);

        assert_eq!(rekey(&app).await.unwrap(), 1);

        let after = paste::get(&app, "dupid001", "alice@example.com")
            .await
            .unwrap();
        assert_eq!(after, before);
        assert_eq!(app.database.get_paste("dupid001").await.unwrap(), Some(older));

        let remaining = app.database.get_legacy_keys().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].key, "k-newer");
    }

    #[tokio::test]
    async fn nothing_to_do() {
        let app = App::for_tests().await;
        app.database
            .insert_paste(&sample_paste("abcd1234", "alice@example.com"))
            .await
            .unwrap();
        assert_eq!(rekey(&app).await.unwrap(), 0);
    }
}
