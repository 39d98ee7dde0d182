//! Stopping a skipped build.

use crate::error::{BuildAbortError, StopError};
use crate::host::{BuildRun, RunResult, SKIPPED_DESCRIPTION};
use crate::obs;

/// Mark `run` aborted with the skip description, then ask the host to halt it.
///
/// The description and result are set before anything can fail, so a
/// caller observes an aborted run even when the halt request errors. A
/// failed save ends the stop before the run kind is checked. Only
/// [`StopError::Unrecognized`] is fatal; see [`StopError::is_fatal`].
pub async fn stop_build(run: &dyn BuildRun) -> Result<(), StopError> {
    let run_id = run.id();

    run.set_description(SKIPPED_DESCRIPTION);
    run.set_result(RunResult::Aborted);
    run.save().await.map_err(StopError::Persist)?;

    let Some(halter) = run.halter() else {
        return Err(BuildAbortError::default().into());
    };

    obs::emit_build_stopping(&run_id, halter.mechanism());
    halter.halt().await?;
    Ok(())
}
