//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline
//! without making real provider or store calls.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{ProviderError, StoreError};
use crate::traits::extractor::Extractor;
use crate::traits::store::{MetadataStore, PatchOp};
use crate::types::template::MetadataTemplate;

/// A mock extraction provider with scripted responses.
///
/// Responses are keyed by (file id, template key); asks by file id.
/// Unscripted calls fail as provider outages, which is what an
/// unreachable service looks like to the pipeline.
#[derive(Default, Clone)]
pub struct MockExtractor {
    responses: Arc<RwLock<HashMap<(String, String), Value>>>,
    answers: Arc<RwLock<HashMap<String, String>>>,
    failures: Arc<RwLock<HashSet<(String, String)>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    calls: Arc<RwLock<Vec<MockExtractorCall>>>,
}

/// Record of a call made to the mock extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockExtractorCall {
    Extract {
        file_id: String,
        template_key: String,
    },
    Ask {
        file_id: String,
    },
}

impl MockExtractor {
    /// Create a mock with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a structured-extraction response.
    pub fn with_response(
        self,
        file_id: impl Into<String>,
        template_key: impl Into<String>,
        payload: Value,
    ) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert((file_id.into(), template_key.into()), payload);
        self
    }

    /// Script an ask answer.
    pub fn with_answer(self, file_id: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers
            .write()
            .unwrap()
            .insert(file_id.into(), answer.into());
        self
    }

    /// Force a provider outage for one file+template.
    pub fn failing(self, file_id: impl Into<String>, template_key: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert((file_id.into(), template_key.into()));
        self
    }

    /// Add artificial latency to every call for a file.
    pub fn with_delay(self, file_id: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(file_id.into(), delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockExtractorCall> {
        self.calls.read().unwrap().clone()
    }

    async fn apply_delay(&self, file_id: &str) {
        let delay = self.delays.read().unwrap().get(file_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn outage() -> ProviderError {
        ProviderError::Unavailable(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "mock provider outage",
        )))
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract_structured(
        &self,
        file_id: &str,
        template: &MetadataTemplate,
    ) -> Result<Value, ProviderError> {
        self.calls.write().unwrap().push(MockExtractorCall::Extract {
            file_id: file_id.to_string(),
            template_key: template.template_key.clone(),
        });
        self.apply_delay(file_id).await;

        let key = (file_id.to_string(), template.template_key.clone());
        if self.failures.read().unwrap().contains(&key) {
            return Err(Self::outage());
        }
        self.responses
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(Self::outage)
    }

    async fn ask(&self, file_id: &str, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.write().unwrap().push(MockExtractorCall::Ask {
            file_id: file_id.to_string(),
        });
        self.apply_delay(file_id).await;

        self.answers
            .read()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(Self::outage)
    }
}

/// A mock metadata store with in-memory instances.
///
/// Mirrors the real store's semantics: create conflicts when an
/// instance exists, updates apply `add` operations to the stored map,
/// and configured field rejections fail any write that touches them.
#[derive(Default, Clone)]
pub struct MockStore {
    instances: Arc<RwLock<HashMap<(String, String, String), IndexMap<String, Value>>>>,
    rejected_fields: Arc<RwLock<HashSet<String>>>,
    failing_creates: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<MockStoreCall>>>,
}

/// Record of a call made to the mock store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockStoreCall {
    Create {
        file_id: String,
        template_key: String,
        keys: Vec<String>,
    },
    Update {
        file_id: String,
        template_key: String,
        keys: Vec<String>,
    },
}

impl MockStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create an empty instance, so the next create conflicts.
    pub fn with_existing_instance(
        self,
        file_id: impl Into<String>,
        scope: impl Into<String>,
        template_key: impl Into<String>,
    ) -> Self {
        self.instances.write().unwrap().insert(
            (file_id.into(), scope.into(), template_key.into()),
            IndexMap::new(),
        );
        self
    }

    /// Reject any write that touches this field.
    pub fn rejecting_field(self, key: impl Into<String>) -> Self {
        self.rejected_fields.write().unwrap().insert(key.into());
        self
    }

    /// Fail creates for a file with a non-conflict error.
    pub fn failing_create(self, file_id: impl Into<String>) -> Self {
        self.failing_creates.write().unwrap().insert(file_id.into());
        self
    }

    /// The stored field map for an instance, if it exists.
    pub fn instance(
        &self,
        file_id: &str,
        scope: &str,
        template_key: &str,
    ) -> Option<IndexMap<String, Value>> {
        self.instances
            .read()
            .unwrap()
            .get(&(
                file_id.to_string(),
                scope.to_string(),
                template_key.to_string(),
            ))
            .cloned()
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockStoreCall> {
        self.calls.read().unwrap().clone()
    }

    fn rejected_key<'a>(&self, keys: impl Iterator<Item = &'a str>) -> Option<String> {
        let rejected = self.rejected_fields.read().unwrap();
        for key in keys {
            if rejected.contains(key) {
                return Some(key.to_string());
            }
        }
        None
    }
}

#[async_trait]
impl MetadataStore for MockStore {
    async fn create_instance(
        &self,
        file_id: &str,
        scope: &str,
        template_key: &str,
        fields: &IndexMap<String, Value>,
    ) -> Result<(), StoreError> {
        self.calls.write().unwrap().push(MockStoreCall::Create {
            file_id: file_id.to_string(),
            template_key: template_key.to_string(),
            keys: fields.keys().cloned().collect(),
        });

        if self.failing_creates.read().unwrap().contains(file_id) {
            return Err(StoreError::Rejected {
                status: 500,
                body: "injected create failure".to_string(),
            });
        }

        let instance_key = (
            file_id.to_string(),
            scope.to_string(),
            template_key.to_string(),
        );
        let mut instances = self.instances.write().unwrap();
        if instances.contains_key(&instance_key) {
            return Err(StoreError::Conflict);
        }
        if let Some(key) = self.rejected_key(fields.keys().map(String::as_str)) {
            return Err(StoreError::Rejected {
                status: 400,
                body: format!("field {key} rejected"),
            });
        }
        instances.insert(instance_key, fields.clone());
        Ok(())
    }

    async fn update_instance(
        &self,
        file_id: &str,
        scope: &str,
        template_key: &str,
        ops: &[PatchOp],
    ) -> Result<(), StoreError> {
        self.calls.write().unwrap().push(MockStoreCall::Update {
            file_id: file_id.to_string(),
            template_key: template_key.to_string(),
            keys: ops.iter().map(|op| op.key().to_string()).collect(),
        });

        if let Some(key) = self.rejected_key(ops.iter().map(|op| op.key())) {
            return Err(StoreError::Rejected {
                status: 400,
                body: format!("field {key} rejected"),
            });
        }

        let instance_key = (
            file_id.to_string(),
            scope.to_string(),
            template_key.to_string(),
        );
        let mut instances = self.instances.write().unwrap();
        let Some(instance) = instances.get_mut(&instance_key) else {
            return Err(StoreError::Rejected {
                status: 404,
                body: "no such instance".to_string(),
            });
        };
        for op in ops {
            instance.insert(op.key().to_string(), op.value.clone());
        }
        Ok(())
    }
}
