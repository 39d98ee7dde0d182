//! Deletion tagging.

use crate::error::Result;
use crate::host::{BuildRun, DeletionMarker};
use crate::obs;

/// Record on `run` whether it should be deleted, replacing any earlier
/// marker, then persist the run.
pub async fn tag_for_deletion(run: &dyn BuildRun, should_delete: bool) -> Result<()> {
    obs::emit_run_tagged(&run.id(), should_delete);
    run.replace_deletion_marker(DeletionMarker::new(should_delete));
    run.save().await?;
    Ok(())
}

/// Whether `run` carries a marker asking for deletion.
pub fn is_marked_for_deletion(run: &dyn BuildRun) -> bool {
    run.deletion_marker().is_some_and(|m| m.delete_build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{MemoryJob, MemoryRun};

    #[tokio::test]
    async fn test_tag_then_retag_overwrites() {
        let run = MemoryRun::pipeline(MemoryJob::new("demo"), 3);
        assert!(!is_marked_for_deletion(&run));

        tag_for_deletion(&run, true).await.expect("tag");
        assert!(is_marked_for_deletion(&run));

        tag_for_deletion(&run, false).await.expect("retag");
        assert!(!is_marked_for_deletion(&run));
        assert_eq!(run.save_count(), 2);
    }

    #[tokio::test]
    async fn test_tag_failure_propagates() {
        let run = MemoryRun::pipeline(MemoryJob::new("demo"), 1);
        run.fail_saves("read-only workspace");

        let err = tag_for_deletion(&run, true).await.unwrap_err();
        assert!(err.to_string().contains("read-only workspace"));
    }
}
