use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::descriptor::MigrationEntity;
use super::record_store::RecordStore;
use crate::shared::field_mapper;
use crate::shared::sheets::SheetGateway;

/// One pending copy of formula-derived values from a sheet row into a record
pub struct ReadBack {
    pub entity: &'static MigrationEntity,
    pub sheet_name: String,
    pub sheet_id: String,
    pub record_id: String,
}

/// Run the read-back after `delay` on a detached task. Failures are logged
/// and never reach the caller.
pub fn schedule(
    sheets: Arc<dyn SheetGateway>,
    store: Arc<dyn RecordStore>,
    job: ReadBack,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match run(sheets.as_ref(), store.as_ref(), &job).await {
            Ok(0) => tracing::debug!(
                "Read-back {} ({}): no computed values yet",
                job.sheet_id,
                job.entity.kind.display_name()
            ),
            Ok(count) => tracing::info!(
                "Read-back {}: copied {} computed fields into record {}",
                job.sheet_id,
                count,
                job.record_id
            ),
            Err(e) => tracing::warn!("Read-back {} failed: {}", job.sheet_id, e),
        }
    })
}

/// Re-read the row and store its computed columns. Returns how many
/// fields were written.
pub async fn run(
    sheets: &dyn SheetGateway,
    store: &dyn RecordStore,
    job: &ReadBack,
) -> anyhow::Result<usize> {
    let table = sheets.get_all(&job.sheet_name).await?;
    let row = table
        .find_by_id(&job.sheet_id)
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("row {} is gone from '{}'", job.sheet_id, job.sheet_name))?;
    let computed = field_mapper::computed_values(row, job.entity.fields);
    if computed.is_empty() {
        return Ok(0);
    }
    store.update_fields(&job.record_id, &computed).await?;
    Ok(computed.len())
}
