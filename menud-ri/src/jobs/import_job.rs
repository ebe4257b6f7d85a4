//! Import job
//!
//! Owns one import run's lifecycle end to end: loads the run, decodes the
//! attached document, invokes the import service and writes the outcome back
//! onto the run. Spawned as one unit of asynchronous work per run; any
//! unhandled fault marks the run failed and propagates to the spawner's
//! fault logging.

use menud_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::import_runs;
use crate::models::{ImportCounts, MenuDocument};
use crate::services::ImportService;

/// Execute the import job for one run id.
///
/// Terminal outcomes:
/// - run id does not resolve: the error propagates, nothing is recorded
/// - no document attached: run marked failed ("No file attached"), Ok
/// - decode or import fault: run marked failed with the fault's message,
///   the original fault propagates
/// - success: run marked completed with all eight counters
///
/// Re-running the same id is safe downstream (upserts are idempotent) but
/// overwrites the run's own status and counters.
pub async fn run_import_job(pool: &SqlitePool, run_id: Uuid) -> Result<()> {
    let run = match import_runs::load_run(pool, run_id).await? {
        Some(run) => run,
        None => {
            tracing::error!(run_id = %run_id, "Import run not found");
            return Err(Error::NotFound(format!("Import run not found: {}", run_id)));
        }
    };

    match execute_run(pool, run_id, run.document.as_deref()).await {
        Ok(Some(counts)) => {
            tracing::info!(run_id = %run_id, ?counts, "Process completed");
            Ok(())
        }
        Ok(None) => {
            // Terminal and non-retryable; signaled only via run status
            tracing::error!(run_id = %run_id, "No file attached");
            import_runs::mark_failed(pool, run_id, "No file attached").await?;
            Ok(())
        }
        Err(e) => {
            tracing::error!(run_id = %run_id, error = %e, "Import failed");
            // A secondary fault while recording the failure must not mask
            // the original fault
            if let Err(update_err) = import_runs::mark_failed(pool, run_id, &e.to_string()).await {
                tracing::error!(
                    run_id = %run_id,
                    error = %update_err,
                    "Failed to record import failure"
                );
            }
            Err(e)
        }
    }
}

/// The fallible middle of the job. `Ok(None)` means no document was
/// attached; the caller records that terminal state.
async fn execute_run(
    pool: &SqlitePool,
    run_id: Uuid,
    document_text: Option<&str>,
) -> Result<Option<ImportCounts>> {
    import_runs::mark_processing(pool, run_id).await?;
    tracing::info!(run_id = %run_id, "Start processing");

    let Some(text) = document_text else {
        return Ok(None);
    };

    let document: MenuDocument = serde_json::from_str(text)
        .map_err(|e| Error::InvalidInput(format!("Invalid JSON document: {}", e)))?;

    let counts = ImportService::new(pool.clone(), run_id).call(&document).await?;
    import_runs::mark_completed(pool, run_id, &counts).await?;

    Ok(Some(counts))
}
