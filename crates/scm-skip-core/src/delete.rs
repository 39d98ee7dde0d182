//! Removing skipped builds.

use crate::annotate::is_marked_for_deletion;
use crate::error::Result;
use crate::host::BuildRun;
use crate::obs;

/// Delete `run` and hand its build number back to the owning job.
///
/// Must be called at most once per run.
pub async fn delete_build(run: &dyn BuildRun) -> Result<()> {
    let job = run.job();
    let number = run.number();

    run.delete().await?;
    job.update_next_build_number(number);
    job.save().await?;

    obs::emit_build_deleted(&run.id(), &job.name(), number);
    Ok(())
}

/// Delete `run` if a previous gate evaluation tagged it for deletion.
/// Returns whether the run was deleted.
pub async fn purge_if_marked(run: &dyn BuildRun) -> Result<bool> {
    if !is_marked_for_deletion(run) {
        return Ok(false);
    }
    delete_build(run).await?;
    Ok(true)
}
