//! In-memory host implementations (testing and dry runs)
//!
//! Provides `MemoryJob` and `MemoryRun` that satisfy the host trait contracts
//! without a build orchestrator. Failures can be injected per operation to
//! exercise the gate's error paths.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::changelog::ChangeSet;
use crate::error::{HaltRaceError, HostError};
use crate::host::{BuildJob, BuildRun, DeletionMarker, Halt, HostResult, RunResult};

// ---------------------------------------------------------------------------
// MemoryJob
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct JobState {
    next_build_number: u64,
    saves: usize,
}

/// In-memory job holding only its next-build counter.
#[derive(Debug)]
pub struct MemoryJob {
    name: String,
    state: Mutex<JobState>,
}

impl MemoryJob {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            state: Mutex::new(JobState {
                next_build_number: 1,
                saves: 0,
            }),
        })
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().unwrap().saves
    }
}

#[async_trait]
impl BuildJob for MemoryJob {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn next_build_number(&self) -> u64 {
        self.state.lock().unwrap().next_build_number
    }

    fn update_next_build_number(&self, number: u64) {
        self.state.lock().unwrap().next_build_number = number;
    }

    async fn save(&self) -> HostResult<()> {
        self.state.lock().unwrap().saves += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryRun
// ---------------------------------------------------------------------------

/// How a `MemoryRun` can be halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Scripted pipeline run
    Pipeline,
    /// Classic freestyle build
    Freestyle,
    /// A run with no halt mechanism
    Detached,
}

#[derive(Debug, Default)]
struct Failures {
    save: Option<String>,
    delete: Option<String>,
    halt: Option<String>,
}

#[derive(Debug, Default)]
struct RunState {
    description: Option<String>,
    result: Option<RunResult>,
    marker: Option<DeletionMarker>,
    saves: usize,
    deleted: bool,
    halts: Vec<&'static str>,
    failures: Failures,
}

/// In-memory build run.
#[derive(Debug)]
pub struct MemoryRun {
    job: Arc<MemoryJob>,
    number: u64,
    change_sets: Vec<ChangeSet>,
    halter: Option<MemoryHalter>,
    state: Arc<Mutex<RunState>>,
}

impl MemoryRun {
    pub fn new(job: Arc<MemoryJob>, number: u64, kind: RunKind) -> Self {
        let state = Arc::new(Mutex::new(RunState::default()));
        let halter = match kind {
            RunKind::Pipeline => Some(MemoryHalter::new("pipeline", state.clone())),
            RunKind::Freestyle => Some(MemoryHalter::new("freestyle", state.clone())),
            RunKind::Detached => None,
        };
        Self {
            job,
            number,
            change_sets: Vec::new(),
            halter,
            state,
        }
    }

    pub fn pipeline(job: Arc<MemoryJob>, number: u64) -> Self {
        Self::new(job, number, RunKind::Pipeline)
    }

    pub fn freestyle(job: Arc<MemoryJob>, number: u64) -> Self {
        Self::new(job, number, RunKind::Freestyle)
    }

    pub fn detached(job: Arc<MemoryJob>, number: u64) -> Self {
        Self::new(job, number, RunKind::Detached)
    }

    pub fn with_change_sets(mut self, change_sets: Vec<ChangeSet>) -> Self {
        self.change_sets = change_sets;
        self
    }

    /// Make every subsequent `save` fail with `reason`.
    pub fn fail_saves(&self, reason: &str) {
        self.state.lock().unwrap().failures.save = Some(reason.to_string());
    }

    /// Make every subsequent `delete` fail with `reason`.
    pub fn fail_deletes(&self, reason: &str) {
        self.state.lock().unwrap().failures.delete = Some(reason.to_string());
    }

    /// Make every subsequent halt request fail with `reason`.
    pub fn fail_halts(&self, reason: &str) {
        self.state.lock().unwrap().failures.halt = Some(reason.to_string());
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().unwrap().saves
    }

    pub fn is_deleted(&self) -> bool {
        self.state.lock().unwrap().deleted
    }

    /// Mechanisms of the halt requests accepted so far.
    pub fn halt_requests(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().halts.clone()
    }
}

#[async_trait]
impl BuildRun for MemoryRun {
    fn id(&self) -> String {
        format!("{}#{}", self.job.name, self.number)
    }

    fn number(&self) -> u64 {
        self.number
    }

    fn change_sets(&self) -> Vec<ChangeSet> {
        self.change_sets.clone()
    }

    fn description(&self) -> Option<String> {
        self.state.lock().unwrap().description.clone()
    }

    fn set_description(&self, description: &str) {
        self.state.lock().unwrap().description = Some(description.to_string());
    }

    fn result(&self) -> Option<RunResult> {
        self.state.lock().unwrap().result
    }

    fn set_result(&self, result: RunResult) {
        self.state.lock().unwrap().result = Some(result);
    }

    fn deletion_marker(&self) -> Option<DeletionMarker> {
        self.state.lock().unwrap().marker.clone()
    }

    fn replace_deletion_marker(&self, marker: DeletionMarker) {
        self.state.lock().unwrap().marker = Some(marker);
    }

    fn halter(&self) -> Option<&dyn Halt> {
        self.halter.as_ref().map(|h| h as &dyn Halt)
    }

    fn job(&self) -> Arc<dyn BuildJob> {
        self.job.clone()
    }

    async fn save(&self) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = &state.failures.save {
            return Err(HostError::Persist {
                entity: format!("run {}", self.id()),
                reason: reason.clone(),
            });
        }
        state.saves += 1;
        Ok(())
    }

    async fn delete(&self) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = &state.failures.delete {
            return Err(HostError::Delete {
                run_id: self.id(),
                reason: reason.clone(),
            });
        }
        state.deleted = true;
        Ok(())
    }
}

#[derive(Debug)]
struct MemoryHalter {
    mechanism: &'static str,
    state: Arc<Mutex<RunState>>,
}

impl MemoryHalter {
    fn new(mechanism: &'static str, state: Arc<Mutex<RunState>>) -> Self {
        Self { mechanism, state }
    }
}

#[async_trait]
impl Halt for MemoryHalter {
    fn mechanism(&self) -> &'static str {
        self.mechanism
    }

    async fn halt(&self) -> Result<(), HaltRaceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = &state.failures.halt {
            return Err(HaltRaceError {
                mechanism: self.mechanism.to_string(),
                reason: reason.clone(),
            });
        }
        state.halts.push(self.mechanism);
        Ok(())
    }
}
