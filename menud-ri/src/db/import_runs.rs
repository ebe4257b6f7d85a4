//! Import run persistence
//!
//! The run row is the only progress surface for a submitted document: the
//! producer creates it pending with the document attached, the import job
//! owns it through processing to a terminal state.

use menud_common::{Error, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::models::{ImportCounts, ImportRun, ImportRunStatus};

/// Insert a freshly created run
pub async fn create_run(pool: &SqlitePool, run: &ImportRun) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO import_runs (id, status, document, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(run.id.to_string())
    .bind(run.status.as_str())
    .bind(&run.document)
    .bind(run.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a run by id
pub async fn load_run(pool: &SqlitePool, run_id: Uuid) -> Result<Option<ImportRun>> {
    let row = sqlx::query("SELECT * FROM import_runs WHERE id = ?")
        .bind(run_id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(row_to_run(&row)?)),
        None => Ok(None),
    }
}

/// Mark the run processing and stamp started_at
pub async fn mark_processing(pool: &SqlitePool, run_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE import_runs SET status = 'processing', started_at = ? WHERE id = ?")
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(run_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Mark the run completed, stamp finished_at and write all eight counters.
///
/// Counters land in one statement; they never partially update.
pub async fn mark_completed(pool: &SqlitePool, run_id: Uuid, counts: &ImportCounts) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE import_runs SET
            status = 'completed',
            finished_at = ?,
            created_restaurants_count = ?,
            created_menus_count = ?,
            created_menu_items_count = ?,
            linked_menu_items_count = ?,
            failed_restaurants_count = ?,
            failed_menus_count = ?,
            failed_menu_items_count = ?,
            failed_links_count = ?
        WHERE id = ?
        "#,
    )
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(counts.created_restaurants as i64)
    .bind(counts.created_menus as i64)
    .bind(counts.created_menu_items as i64)
    .bind(counts.linked_menu_items as i64)
    .bind(counts.failed_restaurants as i64)
    .bind(counts.failed_menus as i64)
    .bind(counts.failed_menu_items as i64)
    .bind(counts.failed_links as i64)
    .bind(run_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark the run failed with a human-readable message and stamp finished_at
pub async fn mark_failed(pool: &SqlitePool, run_id: Uuid, message: &str) -> Result<()> {
    sqlx::query(
        "UPDATE import_runs SET status = 'failed', error_message = ?, finished_at = ? WHERE id = ?",
    )
    .bind(message)
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(run_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

fn row_to_run(row: &SqliteRow) -> Result<ImportRun> {
    let id: String = row.get("id");
    let status: String = row.get("status");
    let status = ImportRunStatus::parse(&status)
        .ok_or_else(|| Error::Internal(format!("Unknown import run status: {}", status)))?;

    Ok(ImportRun {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(format!("Bad run id {}: {}", id, e)))?,
        status,
        document: row.get("document"),
        started_at: parse_timestamp(row.get("started_at"), "started_at")?,
        finished_at: parse_timestamp(row.get("finished_at"), "finished_at")?,
        error_message: row.get("error_message"),
        counts: ImportCounts {
            created_restaurants: row.get::<i64, _>("created_restaurants_count") as u64,
            created_menus: row.get::<i64, _>("created_menus_count") as u64,
            created_menu_items: row.get::<i64, _>("created_menu_items_count") as u64,
            linked_menu_items: row.get::<i64, _>("linked_menu_items_count") as u64,
            failed_restaurants: row.get::<i64, _>("failed_restaurants_count") as u64,
            failed_menus: row.get::<i64, _>("failed_menus_count") as u64,
            failed_menu_items: row.get::<i64, _>("failed_menu_items_count") as u64,
            failed_links: row.get::<i64, _>("failed_links_count") as u64,
        },
        created_at: parse_timestamp(row.get("created_at"), "created_at")?
            .ok_or_else(|| Error::Internal("Missing created_at on import run".to_string()))?,
    })
}

fn parse_timestamp(
    value: Option<String>,
    field: &str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
    value
        .map(|s| chrono::DateTime::parse_from_rfc3339(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", field, e)))
        .map(|opt| opt.map(|dt| dt.with_timezone(&chrono::Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn create_and_load_round_trip() {
        let pool = test_pool().await;
        let run = ImportRun::new(Some(r#"{"restaurants":[]}"#.to_string()));

        create_run(&pool, &run).await.unwrap();

        let loaded = load_run(&pool, run.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, run.id);
        assert_eq!(loaded.status, ImportRunStatus::Pending);
        assert_eq!(loaded.document.as_deref(), Some(r#"{"restaurants":[]}"#));
        assert!(loaded.started_at.is_none());
        assert_eq!(loaded.counts, ImportCounts::default());
    }

    #[tokio::test]
    async fn unknown_run_loads_none() {
        let pool = test_pool().await;
        assert!(load_run(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lifecycle_updates() {
        let pool = test_pool().await;
        let run = ImportRun::new(None);
        create_run(&pool, &run).await.unwrap();

        mark_processing(&pool, run.id).await.unwrap();
        let loaded = load_run(&pool, run.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ImportRunStatus::Processing);
        assert!(loaded.started_at.is_some());
        assert!(loaded.finished_at.is_none());

        let counts = ImportCounts {
            created_restaurants: 1,
            created_menus: 2,
            created_menu_items: 3,
            linked_menu_items: 3,
            ..Default::default()
        };
        mark_completed(&pool, run.id, &counts).await.unwrap();
        let loaded = load_run(&pool, run.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ImportRunStatus::Completed);
        assert!(loaded.finished_at.is_some());
        assert_eq!(loaded.counts, counts);
        assert!(loaded.error_message.is_none());
    }

    #[tokio::test]
    async fn mark_failed_sets_message() {
        let pool = test_pool().await;
        let run = ImportRun::new(None);
        create_run(&pool, &run).await.unwrap();

        mark_failed(&pool, run.id, "No file attached").await.unwrap();
        let loaded = load_run(&pool, run.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ImportRunStatus::Failed);
        assert_eq!(loaded.error_message.as_deref(), Some("No file attached"));
        assert!(loaded.finished_at.is_some());
    }
}
