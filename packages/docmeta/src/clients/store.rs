//! HTTP client for the remote metadata store.

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::StoreError;
use crate::traits::registry::TemplateRegistry;
use crate::traits::store::{MetadataStore, PatchOp};
use crate::types::config::StoreConfig;
use crate::types::template::{FieldDefinition, FieldType, MetadataTemplate};

/// Content type for batched patch updates.
const PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

/// Metadata store client over HTTP.
///
/// Creates and patches per-file metadata instances, and doubles as the
/// authoritative [`TemplateRegistry`] via the store's schema endpoint.
pub struct HttpMetadataStore {
    client: reqwest::Client,
    config: StoreConfig,
}

#[derive(Deserialize)]
struct SchemaOption {
    key: String,
}

#[derive(Deserialize)]
struct SchemaField {
    key: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    options: Vec<SchemaOption>,
}

#[derive(Deserialize)]
struct SchemaBody {
    #[serde(rename = "templateKey")]
    template_key: String,
    #[serde(default)]
    fields: Vec<SchemaField>,
}

impl HttpMetadataStore {
    /// Create a client for a store endpoint.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        Url::parse(&config.base_url).map_err(|e| StoreError::ClientBuild(Box::new(e)))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::ClientBuild(Box::new(e)))?;
        Ok(Self { client, config })
    }

    fn instance_url(&self, file_id: &str, scope: &str, template_key: &str) -> String {
        format!(
            "{}/files/{file_id}/metadata/{scope}/{template_key}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn schema_url(&self, scope: &str, template_key: &str) -> String {
        format!(
            "{}/metadata_templates/{scope}/{template_key}/schema",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Map the store's field type names onto the sanitizer's types.
    ///
    /// Unknown types sanitize as strings, which the store accepts for
    /// anything it does not validate more strictly.
    fn parse_field_type(name: &str) -> FieldType {
        match name {
            "float" | "number" | "int" => FieldType::Float,
            "date" => FieldType::Date,
            "enum" => FieldType::Enum,
            _ => FieldType::String,
        }
    }

    async fn read_failure(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        StoreError::Rejected { status, body }
    }
}

#[async_trait]
impl MetadataStore for HttpMetadataStore {
    async fn create_instance(
        &self,
        file_id: &str,
        scope: &str,
        template_key: &str,
        fields: &IndexMap<String, Value>,
    ) -> Result<(), StoreError> {
        let url = self.instance_url(file_id, scope, template_key);
        debug!(file_id, template_key, "creating metadata instance");
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.token.expose())
            .json(fields)
            .send()
            .await
            .map_err(|e| StoreError::Http(Box::new(e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::CONFLICT {
            Err(StoreError::Conflict)
        } else {
            Err(Self::read_failure(response).await)
        }
    }

    async fn update_instance(
        &self,
        file_id: &str,
        scope: &str,
        template_key: &str,
        ops: &[PatchOp],
    ) -> Result<(), StoreError> {
        let url = self.instance_url(file_id, scope, template_key);
        let body = serde_json::to_vec(ops).map_err(|e| StoreError::Http(Box::new(e)))?;
        debug!(file_id, template_key, ops = ops.len(), "patching metadata instance");
        let response = self
            .client
            .put(&url)
            .bearer_auth(self.config.token.expose())
            .header(CONTENT_TYPE, PATCH_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Http(Box::new(e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::read_failure(response).await)
        }
    }
}

#[async_trait]
impl TemplateRegistry for HttpMetadataStore {
    async fn template(
        &self,
        scope: &str,
        template_key: &str,
    ) -> Result<MetadataTemplate, StoreError> {
        let url = self.schema_url(scope, template_key);
        debug!(scope, template_key, "fetching template schema");
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.config.token.expose())
            .send()
            .await
            .map_err(|e| StoreError::Http(Box::new(e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::TemplateNotFound {
                scope: scope.to_string(),
                template_key: template_key.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Self::read_failure(response).await);
        }

        let schema: SchemaBody = response
            .json()
            .await
            .map_err(|e| StoreError::Http(Box::new(e)))?;

        let mut template = MetadataTemplate::new(scope, schema.template_key);
        for field in schema.fields {
            let definition = match Self::parse_field_type(&field.field_type) {
                FieldType::Enum => FieldDefinition::enumeration(
                    field.key,
                    field.options.into_iter().map(|o| o.key),
                ),
                FieldType::Float => FieldDefinition::float(field.key),
                FieldType::Date => FieldDefinition::date(field.key),
                FieldType::String => FieldDefinition::string(field.key),
            };
            template = template.with_field(definition);
        }
        Ok(template)
    }
}
