//! HTTP client for the AI extraction provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ProviderError;
use crate::traits::extractor::Extractor;
use crate::types::config::ProviderConfig;
use crate::types::template::{FieldType, MetadataTemplate};

/// Extraction provider client over HTTP.
///
/// Sends schema-driven extraction requests with either a template
/// reference (for templates the provider holds) or inline field
/// definitions (for templates it does not), and free-text asks for
/// prompt-driven classification.
pub struct HttpExtractor {
    client: reqwest::Client,
    config: ProviderConfig,
}

#[derive(Serialize)]
struct Item<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ModelSpec<'a> {
    model: &'a str,
}

#[derive(Serialize)]
struct ExtractAgent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    long_text: ModelSpec<'a>,
    basic_text: ModelSpec<'a>,
}

#[derive(Serialize)]
struct TemplateReference<'a> {
    template_key: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    scope: &'a str,
}

#[derive(Serialize)]
struct OptionKey<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct InlineField<'a> {
    key: &'a str,
    #[serde(rename = "type")]
    field_type: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<OptionKey<'a>>,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    items: Vec<Item<'a>>,
    ai_agent: ExtractAgent<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata_template: Option<TemplateReference<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<InlineField<'a>>>,
}

#[derive(Serialize)]
struct AskAgent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    mode: &'static str,
    items: Vec<Item<'a>>,
    prompt: &'a str,
    ai_agent: AskAgent<'a>,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

impl HttpExtractor {
    /// Create a client for a provider endpoint.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        Url::parse(&config.base_url).map_err(|e| ProviderError::ClientBuild(Box::new(e)))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::ClientBuild(Box::new(e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn wire_field_type(field_type: FieldType) -> &'static str {
        match field_type {
            FieldType::String => "string",
            FieldType::Float => "float",
            FieldType::Date => "date",
            FieldType::Enum => "enum",
        }
    }

    async fn post_json<T: Serialize>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.token.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(Box::new(e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(ProviderError::Unavailable(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP {status}: {body}"),
            ))))
        } else {
            Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract_structured(
        &self,
        file_id: &str,
        template: &MetadataTemplate,
    ) -> Result<Value, ProviderError> {
        let inline = self
            .config
            .inline_templates
            .iter()
            .any(|key| key == &template.template_key);

        let request = ExtractRequest {
            items: vec![Item {
                id: file_id,
                kind: "file",
            }],
            ai_agent: ExtractAgent {
                kind: "ai_agent_extract_structured",
                long_text: ModelSpec {
                    model: &self.config.model,
                },
                basic_text: ModelSpec {
                    model: &self.config.model,
                },
            },
            metadata_template: (!inline).then(|| TemplateReference {
                template_key: &template.template_key,
                kind: "metadata_template",
                scope: &template.scope,
            }),
            fields: inline.then(|| {
                template
                    .fields()
                    .map(|f| InlineField {
                        key: &f.key,
                        field_type: Self::wire_field_type(f.field_type),
                        options: f.options.iter().map(|o| OptionKey { key: o }).collect(),
                    })
                    .collect()
            }),
        };

        debug!(
            file_id,
            template_key = %template.template_key,
            inline,
            "sending extraction request"
        );
        let response = self
            .post_json(&self.endpoint("ai/extract_structured"), &request)
            .await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    async fn ask(&self, file_id: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = AskRequest {
            mode: "single_item_qa",
            items: vec![Item {
                id: file_id,
                kind: "file",
            }],
            prompt,
            ai_agent: AskAgent {
                id: self.config.agent_id.as_deref(),
                kind: if self.config.agent_id.is_some() {
                    "ai_agent_id"
                } else {
                    "ai_agent_ask"
                },
            },
        };

        debug!(file_id, "sending ask request");
        let response = self.post_json(&self.endpoint("ai/ask"), &request).await?;
        let ask: AskResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(ask.answer)
    }
}
