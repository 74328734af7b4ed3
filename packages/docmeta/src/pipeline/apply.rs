//! Metadata application - the create-or-update writer with phased
//! degradation.
//!
//! The remote schema is strict: one malformed field can cause an
//! entire bulk write to be rejected. The applier therefore runs a
//! small state machine per (file, template) write:
//!
//! ```text
//! Start ──create ok──────────────▶ Created
//!   │ conflict
//!   ▼
//! Update ──bulk patch ok─────────▶ Updated
//!   │ rejected
//!   ▼
//! PhasedRetry (critical → secondary → numeric isolation)
//!   └──────────────────────────▶ PartiallyApplied | Failed
//! ```
//!
//! Each phase's failure is recorded but never aborts later phases, so
//! the maximum fraction of extracted metadata survives into the store.

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::pipeline::sanitize::SanitizeReport;
use crate::traits::store::{MetadataStore, PatchOp};
use crate::types::fields::SanitizedMetadata;
use crate::types::outcome::{
    ApplicationOutcome, ApplyPhase, Disposition, FieldFailure, PhaseOutcome,
};
use crate::types::template::MetadataTemplate;

/// Fields that must land for a file to be classifiable at all.
///
/// Only the base template has such a subset; other templates go
/// straight to the secondary phase.
fn critical_keys(template: &MetadataTemplate) -> Vec<&'static str> {
    match template.template_key.as_str() {
        "financialDocumentBase" => vec!["documentType", "isLegible"],
        _ => Vec::new(),
    }
}

/// Write states for one (file, template) application.
enum ApplyState {
    Start,
    Update,
    PhasedRetry,
    Done(Disposition),
}

/// Ensure a metadata instance exists for a file, creating an empty one
/// if absent. A conflict means it already exists and is not an error.
pub async fn ensure_instance<S: MetadataStore + ?Sized>(
    store: &S,
    file_id: &str,
    template: &MetadataTemplate,
) -> Result<(), StoreError> {
    let empty = indexmap::IndexMap::new();
    match store
        .create_instance(file_id, &template.scope, &template.template_key, &empty)
        .await
    {
        Ok(()) | Err(StoreError::Conflict) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Apply sanitized metadata to a file, creating or updating the
/// instance and degrading to phased application when the store rejects
/// the bulk write. Never returns an error: the outcome reports exactly
/// which fields landed.
pub async fn apply_metadata<S: MetadataStore + ?Sized>(
    store: &S,
    file_id: &str,
    template: &MetadataTemplate,
    report: SanitizeReport,
) -> ApplicationOutcome {
    let SanitizeReport { metadata, rejected } = report;

    if metadata.is_empty() {
        info!(
            file_id,
            template = %template.template_key,
            "no valid metadata to apply"
        );
        return ApplicationOutcome::nothing_to_apply(file_id, &template.template_key, rejected);
    }

    let mut outcome = ApplicationOutcome {
        file_id: file_id.to_string(),
        template_key: template.template_key.clone(),
        disposition: Disposition::Failed,
        applied: Vec::new(),
        rejected,
        failed_fields: Vec::new(),
        phases: Vec::new(),
        error: None,
    };

    let mut state = ApplyState::Start;
    loop {
        state = match state {
            ApplyState::Start => {
                match store
                    .create_instance(
                        file_id,
                        &template.scope,
                        &template.template_key,
                        &metadata.to_wire(),
                    )
                    .await
                {
                    Ok(()) => {
                        info!(
                            file_id,
                            template = %template.template_key,
                            fields = metadata.len(),
                            "created metadata instance"
                        );
                        outcome.applied = metadata.keys().map(String::from).collect();
                        ApplyState::Done(Disposition::Created)
                    }
                    Err(StoreError::Conflict) => {
                        info!(
                            file_id,
                            template = %template.template_key,
                            "instance already exists, updating"
                        );
                        ApplyState::Update
                    }
                    Err(e) => {
                        warn!(
                            file_id,
                            template = %template.template_key,
                            error = %e,
                            "metadata create failed"
                        );
                        outcome.error = Some(e.to_string());
                        ApplyState::Done(Disposition::Failed)
                    }
                }
            }

            ApplyState::Update => {
                let ops = patch_ops(&metadata);
                match store
                    .update_instance(file_id, &template.scope, &template.template_key, &ops)
                    .await
                {
                    Ok(()) => {
                        info!(
                            file_id,
                            template = %template.template_key,
                            fields = ops.len(),
                            "updated metadata instance"
                        );
                        outcome.applied = metadata.keys().map(String::from).collect();
                        ApplyState::Done(Disposition::Updated)
                    }
                    Err(e) => {
                        warn!(
                            file_id,
                            template = %template.template_key,
                            error = %e,
                            "bulk update rejected, retrying in phases"
                        );
                        ApplyState::PhasedRetry
                    }
                }
            }

            ApplyState::PhasedRetry => {
                apply_phased(store, file_id, template, &metadata, &mut outcome).await;
                let disposition = if outcome.applied.is_empty() {
                    Disposition::Failed
                } else {
                    Disposition::PartiallyApplied
                };
                ApplyState::Done(disposition)
            }

            ApplyState::Done(disposition) => {
                outcome.disposition = disposition;
                return outcome;
            }
        };
    }
}

/// Apply fields in three ordered phases against an existing instance.
async fn apply_phased<S: MetadataStore + ?Sized>(
    store: &S,
    file_id: &str,
    template: &MetadataTemplate,
    metadata: &SanitizedMetadata,
    outcome: &mut ApplicationOutcome,
) {
    let critical = critical_keys(template);
    let float_keys = template.float_keys();

    // Phase 1: the template's mandatory classification fields together.
    let critical_fields = metadata.subset(&critical);
    let critical_ok = if critical_fields.is_empty() {
        // Nothing critical present counts as success.
        true
    } else {
        let ops = patch_ops(&critical_fields);
        let keys: Vec<String> = critical_fields.keys().map(String::from).collect();
        match store
            .update_instance(file_id, &template.scope, &template.template_key, &ops)
            .await
        {
            Ok(()) => {
                outcome.applied.extend(keys.iter().cloned());
                outcome.phases.push(PhaseOutcome {
                    phase: ApplyPhase::Critical,
                    keys,
                    succeeded: true,
                    error: None,
                });
                true
            }
            Err(e) => {
                warn!(file_id, error = %e, "critical phase failed");
                outcome.phases.push(PhaseOutcome {
                    phase: ApplyPhase::Critical,
                    keys,
                    succeeded: false,
                    error: Some(e.to_string()),
                });
                false
            }
        }
    };

    // Phase 2: remaining non-numeric fields, only after phase 1 held.
    let mut excluded: Vec<&str> = critical.clone();
    excluded.extend(&float_keys);
    let secondary_fields = metadata.without(&excluded);
    if !secondary_fields.is_empty() {
        let keys: Vec<String> = secondary_fields.keys().map(String::from).collect();
        if critical_ok {
            let ops = patch_ops(&secondary_fields);
            match store
                .update_instance(file_id, &template.scope, &template.template_key, &ops)
                .await
            {
                Ok(()) => {
                    outcome.applied.extend(keys.iter().cloned());
                    outcome.phases.push(PhaseOutcome {
                        phase: ApplyPhase::Secondary,
                        keys,
                        succeeded: true,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(file_id, error = %e, "secondary phase failed");
                    outcome.phases.push(PhaseOutcome {
                        phase: ApplyPhase::Secondary,
                        keys,
                        succeeded: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        } else {
            outcome.phases.push(PhaseOutcome {
                phase: ApplyPhase::Secondary,
                keys,
                succeeded: false,
                error: Some("skipped: critical phase failed".to_string()),
            });
        }
    }

    // Phase 3: every float field individually, so one malformed amount
    // cannot block the rest.
    let numeric_fields = metadata.subset(&float_keys);
    if !numeric_fields.is_empty() {
        let mut keys = Vec::new();
        let mut first_error = None;
        for (key, value) in numeric_fields.iter() {
            keys.push(key.to_string());
            let ops = [PatchOp::add(key, value.wire_json())];
            match store
                .update_instance(file_id, &template.scope, &template.template_key, &ops)
                .await
            {
                Ok(()) => outcome.applied.push(key.to_string()),
                Err(e) => {
                    warn!(file_id, key, error = %e, "numeric field rejected");
                    if first_error.is_none() {
                        first_error = Some(e.to_string());
                    }
                    outcome.failed_fields.push(FieldFailure {
                        key: key.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        let succeeded = first_error.is_none();
        outcome.phases.push(PhaseOutcome {
            phase: ApplyPhase::NumericIsolation,
            keys,
            succeeded,
            error: first_error,
        });
    }
}

fn patch_ops(metadata: &SanitizedMetadata) -> Vec<PatchOp> {
    metadata
        .iter()
        .map(|(key, value)| PatchOp::add(key, value.wire_json()))
        .collect()
}

/// Idempotency key for one (file, template) application.
///
/// The pipeline itself is stateless between invocations; callers that
/// need cross-run dedup can ledger on this key.
pub fn idempotency_key(file_id: &str, template_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_id.as_bytes());
    hasher.update([0x1f]);
    hasher.update(template_key.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sanitize::sanitize;
    use crate::pipeline::templates::builtin_template;
    use crate::testing::MockStore;
    use serde_json::json;

    fn base_report() -> (MetadataTemplate, SanitizeReport) {
        let template = builtin_template("enterprise_1", "financialDocumentBase").unwrap();
        let raw = [
            ("documentType".to_string(), json!("W-2")),
            ("issuerName".to_string(), json!("Acme Payroll")),
            ("isLegible".to_string(), json!("Yes")),
        ]
        .into_iter()
        .collect();
        let report = sanitize(&template, &raw);
        (template, report)
    }

    #[tokio::test]
    async fn test_create_then_conflict_updates() {
        let store = MockStore::new();
        let (template, report) = base_report();

        let first = apply_metadata(&store, "f1", &template, report.clone()).await;
        assert_eq!(first.disposition, Disposition::Created);

        let second = apply_metadata(&store, "f1", &template, report).await;
        assert_eq!(second.disposition, Disposition::Updated);
        assert_eq!(second.applied.len(), 3);
    }

    #[tokio::test]
    async fn test_other_create_error_is_terminal() {
        let store = MockStore::new().failing_create("f1");
        let (template, report) = base_report();

        let outcome = apply_metadata(&store, "f1", &template, report).await;
        assert_eq!(outcome.disposition, Disposition::Failed);
        assert!(outcome.applied.is_empty());
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_empty_metadata_is_not_written() {
        let store = MockStore::new();
        let template = builtin_template("enterprise_1", "financialDocumentBase").unwrap();
        let raw = [("documentType".to_string(), json!("Maybe"))]
            .into_iter()
            .collect();
        let report = sanitize(&template, &raw);

        let outcome = apply_metadata(&store, "f1", &template, report).await;
        assert_eq!(outcome.disposition, Disposition::NothingToApply);
        assert!(store.instance("f1", "enterprise_1", "financialDocumentBase").is_none());
    }

    #[tokio::test]
    async fn test_phased_retry_isolates_numeric_failures() {
        let template = builtin_template("enterprise_1", "irsw2").unwrap();
        // Instance exists and the store rejects box1Wages, so the bulk
        // update fails and phased retry kicks in.
        let store = MockStore::new()
            .with_existing_instance("f1", "enterprise_1", "irsw2")
            .rejecting_field("box1Wages");

        let raw = [
            ("employerEinMasked".to_string(), json!("**-***1234")),
            ("box1Wages".to_string(), json!(85000.0)),
            ("box2FederalWithholding".to_string(), json!(9500.25)),
        ]
        .into_iter()
        .collect();
        let report = sanitize(&template, &raw);

        let outcome = apply_metadata(&store, "f1", &template, report).await;
        assert_eq!(outcome.disposition, Disposition::PartiallyApplied);
        assert!(outcome.applied.contains(&"employerEinMasked".to_string()));
        assert!(outcome.applied.contains(&"box2FederalWithholding".to_string()));
        assert_eq!(outcome.failed_fields.len(), 1);
        assert_eq!(outcome.failed_fields[0].key, "box1Wages");

        let numeric_phase = outcome
            .phases
            .iter()
            .find(|p| p.phase == ApplyPhase::NumericIsolation)
            .unwrap();
        assert!(!numeric_phase.succeeded);
    }

    #[tokio::test]
    async fn test_ensure_instance_is_idempotent() {
        let store = MockStore::new();
        let template = builtin_template("enterprise_1", "financialDocumentBase").unwrap();

        ensure_instance(&store, "f1", &template).await.unwrap();
        ensure_instance(&store, "f1", &template).await.unwrap();
        assert!(store.instance("f1", "enterprise_1", "financialDocumentBase").is_some());
    }

    #[test]
    fn test_idempotency_key_is_stable() {
        let a = idempotency_key("123", "irsw2");
        let b = idempotency_key("123", "irsw2");
        let c = idempotency_key("124", "irsw2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
