//! Batch coordination - fan the per-file cascade out over many files.
//!
//! Files run under a bounded worker pool with a per-file deadline. A
//! file timing out or failing never blocks or cancels its siblings,
//! and the coordinator itself never fails as a whole: the batch
//! outcome lists every file's result.

use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::pipeline::orchestrate::Orchestrator;
use crate::traits::{Extractor, MetadataStore, TemplateRegistry};
use crate::types::config::BatchConfig;
use crate::types::file::FileRef;
use crate::types::outcome::{BatchOutcome, FileOutcome};

/// Runs the orchestrator over batches of files.
pub struct BatchCoordinator<E, S, R> {
    orchestrator: Orchestrator<E, S, R>,
    config: BatchConfig,
}

impl<E, S, R> BatchCoordinator<E, S, R>
where
    E: Extractor,
    S: MetadataStore,
    R: TemplateRegistry,
{
    /// Create a coordinator.
    pub fn new(orchestrator: Orchestrator<E, S, R>, config: BatchConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    /// The wrapped orchestrator, for single-file use.
    pub fn orchestrator(&self) -> &Orchestrator<E, S, R> {
        &self.orchestrator
    }

    /// Process a batch of files.
    ///
    /// Each file's pipeline runs independently; results are collected
    /// in completion order.
    pub async fn run(&self, files: Vec<FileRef>) -> BatchOutcome {
        let run_id = Uuid::new_v4();
        let total = files.len();
        let started = Instant::now();
        info!(%run_id, total, concurrency = self.config.concurrency, "starting batch");

        let outcomes: Vec<FileOutcome> = stream::iter(files)
            .map(|file| async move {
                match tokio::time::timeout(
                    self.config.file_timeout,
                    self.orchestrator.process_file(&file),
                )
                .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(file_id = %file.id, "file processing timed out");
                        FileOutcome::timed_out(&file.id, &file.name, self.config.file_timeout)
                    }
                }
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = total - succeeded;
        let elapsed = started.elapsed();
        info!(
            %run_id,
            total,
            succeeded,
            failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "batch complete"
        );

        BatchOutcome {
            run_id,
            outcomes,
            total,
            succeeded,
            failed,
            elapsed,
        }
    }
}
