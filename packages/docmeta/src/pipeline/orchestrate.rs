//! Extraction orchestration - the per-file cascade.
//!
//! For each file the orchestrator runs three stages:
//! 1. Base template: classify the document and capture common fields.
//!    On provider failure the fallback classifier supplies a heuristic
//!    document type and only the classification-bearing fields are
//!    written; the cascade then stops for this file.
//! 2. Type-specific template, selected from the resolved document type.
//! 3. Address validation, independent of document type, with an
//!    optional comparison against the address of record.
//!
//! Stage failures are isolated: a later stage failing never invalidates
//! what an earlier stage already applied.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{info, warn};

use crate::classify::FilenameHeuristicClassifier;
use crate::error::{ProviderError, StoreError};
use crate::pipeline::address::{
    compare_addresses, has_address_components, stamp_extraction_date, synthesize_full_address,
};
use crate::pipeline::apply::{apply_metadata, ensure_instance};
use crate::pipeline::normalize::{resolve_response, ProviderResponse};
use crate::pipeline::sanitize::{sanitize, SanitizeReport};
use crate::traits::{DocumentClassifier, Extractor, MetadataStore, TemplateRegistry};
use crate::types::classification::{DocumentClassification, DocumentType};
use crate::types::config::OrchestratorConfig;
use crate::types::fields::{FieldValue, SanitizedMetadata};
use crate::types::file::FileRef;
use crate::types::outcome::FileOutcome;
use crate::types::template::MetadataTemplate;

/// Confidence assigned to provider-extracted classifications.
const AI_CONFIDENCE: f32 = 0.9;

/// Drives the extraction cascade for single files.
///
/// Holds the provider, store, and registry seams plus a per-run
/// template cache; safe to share across concurrent per-file tasks.
pub struct Orchestrator<E, S, R> {
    extractor: E,
    store: S,
    registry: R,
    fallback: Box<dyn DocumentClassifier>,
    config: OrchestratorConfig,
    template_cache: RwLock<HashMap<String, MetadataTemplate>>,
}

impl<E, S, R> Orchestrator<E, S, R>
where
    E: Extractor,
    S: MetadataStore,
    R: TemplateRegistry,
{
    /// Create an orchestrator with the filename heuristic as the
    /// fallback classification strategy.
    pub fn new(extractor: E, store: S, registry: R, config: OrchestratorConfig) -> Self {
        Self {
            extractor,
            store,
            registry,
            fallback: Box::new(FilenameHeuristicClassifier),
            config,
            template_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the fallback classification strategy.
    pub fn with_fallback_classifier(mut self, classifier: Box<dyn DocumentClassifier>) -> Self {
        self.fallback = classifier;
        self
    }

    /// Run the full cascade for one file. Never fails: the outcome
    /// records per-stage results and errors.
    pub async fn process_file(&self, file: &FileRef) -> FileOutcome {
        let mut outcome = FileOutcome::new(&file.id, &file.name);
        info!(file_id = %file.id, file_name = %file.name, "processing file");

        let base_template = match self.template(&self.config.base_template_key).await {
            Ok(template) => template,
            Err(e) => {
                // Without the base schema there is nothing to sanitize
                // against; give up on this file.
                outcome.errors.push(format!("base template unavailable: {e}"));
                return outcome;
            }
        };

        if let Err(e) = ensure_instance(&self.store, &file.id, &base_template).await {
            warn!(file_id = %file.id, error = %e, "base instance provisioning failed");
            outcome
                .errors
                .push(format!("instance provisioning failed: {e}"));
        }

        match self.extract_stage(&file.id, &base_template).await {
            Ok(report) => {
                if let Some(document_type) = report
                    .metadata
                    .get_str("documentType")
                    .and_then(DocumentType::from_label)
                {
                    outcome.classification =
                        Some(DocumentClassification::ai(document_type, AI_CONFIDENCE));
                }
                outcome.base =
                    Some(apply_metadata(&self.store, &file.id, &base_template, report).await);
            }
            Err(e) => {
                warn!(
                    file_id = %file.id,
                    error = %e,
                    "base extraction failed, using fallback classification"
                );
                outcome.errors.push(format!("base extraction failed: {e}"));
                self.apply_fallback_classification(file, &base_template, &mut outcome)
                    .await;
                // No usable extraction; later stages would only guess.
                return outcome;
            }
        }

        if let Some(template_key) = outcome
            .classification
            .and_then(|c| c.document_type.template_key())
        {
            self.run_type_stage(file, template_key, &mut outcome).await;
        }

        if !self.config.skip_address_stage {
            self.run_address_stage(file, &mut outcome).await;
        }

        outcome
    }

    /// Extract, resolve, and sanitize one stage.
    ///
    /// Template echoes and empty payloads are provider failures: there
    /// is nothing usable to apply.
    async fn extract_stage(
        &self,
        file_id: &str,
        template: &MetadataTemplate,
    ) -> Result<SanitizeReport, ProviderError> {
        let raw = self.extractor.extract_structured(file_id, template).await?;
        let response = resolve_response(&raw);
        match response {
            ProviderResponse::TemplateEcho => Err(ProviderError::TemplateEcho),
            ProviderResponse::Empty => Err(ProviderError::Malformed(
                "empty or unrecognized response".to_string(),
            )),
            usable => Ok(sanitize(template, &usable.into_field_map())),
        }
    }

    /// Classify heuristically and write only the classification-bearing
    /// fields.
    async fn apply_fallback_classification(
        &self,
        file: &FileRef,
        base_template: &MetadataTemplate,
        outcome: &mut FileOutcome,
    ) {
        let classification = match self.fallback.classify(&file.id, &file.name).await {
            Ok(classification) => classification,
            Err(e) => {
                outcome
                    .errors
                    .push(format!("fallback classification failed: {e}"));
                return;
            }
        };
        info!(
            file_id = %file.id,
            document_type = classification.document_type.label(),
            "fallback classified document"
        );
        outcome.classification = Some(classification);

        let mut metadata = SanitizedMetadata::new();
        metadata.insert(
            "documentType",
            FieldValue::Choice(classification.document_type.label().to_string()),
        );
        let report = SanitizeReport {
            metadata,
            rejected: Vec::new(),
        };
        outcome.base = Some(apply_metadata(&self.store, &file.id, base_template, report).await);
    }

    async fn run_type_stage(&self, file: &FileRef, template_key: &str, outcome: &mut FileOutcome) {
        let template = match self.template(template_key).await {
            Ok(template) => template,
            Err(e) => {
                outcome
                    .errors
                    .push(format!("template {template_key} unavailable: {e}"));
                return;
            }
        };
        match self.extract_stage(&file.id, &template).await {
            Ok(report) => {
                outcome.type_specific =
                    Some(apply_metadata(&self.store, &file.id, &template, report).await);
            }
            Err(e) => {
                warn!(file_id = %file.id, template_key, error = %e, "type-specific stage failed");
                outcome
                    .errors
                    .push(format!("{template_key} extraction failed: {e}"));
            }
        }
    }

    async fn run_address_stage(&self, file: &FileRef, outcome: &mut FileOutcome) {
        let template = match self.template(&self.config.address_template_key).await {
            Ok(template) => template,
            Err(e) => {
                outcome
                    .errors
                    .push(format!("address template unavailable: {e}"));
                return;
            }
        };
        match self.extract_stage(&file.id, &template).await {
            Ok(mut report) => {
                synthesize_full_address(&mut report.metadata);
                stamp_extraction_date(&mut report.metadata);

                if let Some(reference) = &file.reference_address {
                    if reference.has_any_component() && has_address_components(&report.metadata) {
                        let comparison = compare_addresses(reference, &report.metadata);
                        info!(
                            file_id = %file.id,
                            classification = ?comparison.classification,
                            "address comparison complete"
                        );
                        outcome.address_comparison = Some(comparison);
                    }
                }

                outcome.address =
                    Some(apply_metadata(&self.store, &file.id, &template, report).await);
            }
            Err(e) => {
                warn!(file_id = %file.id, error = %e, "address stage failed");
                outcome
                    .errors
                    .push(format!("address extraction failed: {e}"));
            }
        }
    }

    /// Fetch a template through the per-run cache.
    async fn template(&self, template_key: &str) -> Result<MetadataTemplate, StoreError> {
        if let Some(template) = self
            .template_cache
            .read()
            .expect("template cache poisoned")
            .get(template_key)
        {
            return Ok(template.clone());
        }
        let template = self
            .registry
            .template(&self.config.scope, template_key)
            .await?;
        self.template_cache
            .write()
            .expect("template cache poisoned")
            .insert(template_key.to_string(), template.clone());
        Ok(template)
    }
}
