//! Outcome types - structured results for apply, file, and batch
//! operations.
//!
//! Every orchestration and batch operation returns one of these instead
//! of an error, so callers can present partial success rather than an
//! opaque failure.

use std::time::Duration;

use uuid::Uuid;

use crate::pipeline::address::AddressComparison;
use crate::types::classification::DocumentClassification;
use crate::types::fields::FieldRejection;

/// How a (file, template) write terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// New instance created with the full field map
    Created,
    /// Instance existed; single batched patch succeeded
    Updated,
    /// Bulk update failed; phased retry applied a subset
    PartiallyApplied,
    /// Nothing was written
    Failed,
    /// No fields survived sanitization; no write attempted
    NothingToApply,
}

/// The ordered phases of a phased retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyPhase {
    /// Template-specific mandatory fields, applied together
    Critical,
    /// Remaining non-numeric fields, applied together
    Secondary,
    /// Each float field applied individually
    NumericIsolation,
}

/// Result of one phase of a phased retry.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseOutcome {
    /// Which phase ran
    pub phase: ApplyPhase,

    /// Field keys attempted in this phase
    pub keys: Vec<String>,

    /// Whether the phase's write(s) all succeeded
    pub succeeded: bool,

    /// Store error message when the phase (partially) failed
    pub error: Option<String>,
}

/// A field the store refused to accept during phased application.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFailure {
    /// Field key
    pub key: String,

    /// Store error message
    pub error: String,
}

/// Per file+template record of a metadata write.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationOutcome {
    /// File the write targeted
    pub file_id: String,

    /// Template the write targeted
    pub template_key: String,

    /// How the write terminated
    pub disposition: Disposition,

    /// Field keys accepted by the store
    pub applied: Vec<String>,

    /// Fields dropped by the sanitizer, with reasons
    pub rejected: Vec<FieldRejection>,

    /// Fields the store refused during phased application
    pub failed_fields: Vec<FieldFailure>,

    /// Phase-by-phase record; empty unless phased retry ran
    pub phases: Vec<PhaseOutcome>,

    /// Store error when the whole write failed
    pub error: Option<String>,
}

impl ApplicationOutcome {
    /// A write that never left the sanitizer (nothing valid to apply).
    pub fn nothing_to_apply(
        file_id: impl Into<String>,
        template_key: impl Into<String>,
        rejected: Vec<FieldRejection>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            template_key: template_key.into(),
            disposition: Disposition::NothingToApply,
            applied: Vec::new(),
            rejected,
            failed_fields: Vec::new(),
            phases: Vec::new(),
            error: None,
        }
    }

    /// Whether at least one field reached the store.
    pub fn any_applied(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Whether the write is a success from the caller's perspective.
    ///
    /// `NothingToApply` counts as success: there was nothing valid to
    /// write, and nothing was lost.
    pub fn is_success(&self) -> bool {
        !matches!(self.disposition, Disposition::Failed)
    }
}

/// Result of the full extraction cascade for one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// File that was processed
    pub file_id: String,

    /// Original filename
    pub file_name: String,

    /// Resolved document classification, when any stage produced one
    pub classification: Option<DocumentClassification>,

    /// Base template stage result
    pub base: Option<ApplicationOutcome>,

    /// Type-specific template stage result; absent when the stage was
    /// skipped (unmapped type, or cascade stopped after fallback)
    pub type_specific: Option<ApplicationOutcome>,

    /// Address validation stage result
    pub address: Option<ApplicationOutcome>,

    /// Address comparison signal; never persisted
    pub address_comparison: Option<AddressComparison>,

    /// Stage-level errors that did not abort the cascade
    pub errors: Vec<String>,
}

impl FileOutcome {
    /// A skeleton outcome for a file, before any stage has run.
    pub fn new(file_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: file_name.into(),
            classification: None,
            base: None,
            type_specific: None,
            address: None,
            address_comparison: None,
            errors: Vec::new(),
        }
    }

    /// An outcome for a file whose processing deadline expired.
    pub fn timed_out(
        file_id: impl Into<String>,
        file_name: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let mut outcome = Self::new(file_id, file_name);
        outcome
            .errors
            .push(format!("processing timed out after {}s", timeout.as_secs()));
        outcome
    }

    /// Whether the base stage wrote metadata.
    pub fn is_success(&self) -> bool {
        self.base.as_ref().is_some_and(|b| b.is_success())
    }
}

/// Aggregated result of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Identifier for this batch invocation
    pub run_id: Uuid,

    /// Per-file outcomes, in completion order
    pub outcomes: Vec<FileOutcome>,

    /// Files submitted
    pub total: usize,

    /// Files whose base stage succeeded
    pub succeeded: usize,

    /// Files that failed or timed out
    pub failed: usize,

    /// Wall-clock duration of the batch
    pub elapsed: Duration,
}
