//! Configuration types for the pipeline, the extraction provider, and
//! the metadata store.

use std::time::Duration;

use crate::security::ApiToken;

/// Configuration for the extraction provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the extraction service, e.g. `https://api.example.com/2.0`
    pub base_url: String,

    /// Opaque bearer token; never logged
    pub token: ApiToken,

    /// Model selection passed in `ai_agent`
    pub model: String,

    /// Agent id for prompt-driven asks, when the deployment pins one
    pub agent_id: Option<String>,

    /// Template keys the provider does not hold; their extraction
    /// requests carry inline field definitions instead of a template
    /// reference
    pub inline_templates: Vec<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Create a config for a provider endpoint.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: ApiToken::new(token),
            model: "azure__openai__gpt_4o_mini".to_string(),
            agent_id: None,
            inline_templates: vec!["address_validation".to_string()],
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the extraction model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Pin an agent id for prompt-driven asks.
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Mark a template as provider-unknown (extraction sends inline
    /// field definitions for it).
    pub fn with_inline_template(mut self, template_key: impl Into<String>) -> Self {
        self.inline_templates.push(template_key.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for the metadata store client.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store, e.g. `https://api.example.com/2.0`
    pub base_url: String,

    /// Opaque bearer token; never logged
    pub token: ApiToken,

    /// Per-request timeout
    pub timeout: Duration,
}

impl StoreConfig {
    /// Create a config for a store endpoint.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: ApiToken::new(token),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for the extraction orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Enterprise scope all templates live in
    pub scope: String,

    /// Template every file starts with
    pub base_template_key: String,

    /// Template for the address stage
    pub address_template_key: String,

    /// Skip the address stage entirely
    pub skip_address_stage: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            scope: "enterprise".to_string(),
            base_template_key: "financialDocumentBase".to_string(),
            address_template_key: "address_validation".to_string(),
            skip_address_stage: false,
        }
    }
}

impl OrchestratorConfig {
    /// Create a config for an enterprise scope.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Default::default()
        }
    }

    /// Disable the address validation stage.
    pub fn without_address_stage(mut self) -> Self {
        self.skip_address_stage = true;
        self
    }
}

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum files in flight at once
    pub concurrency: usize,

    /// Per-file processing deadline
    pub file_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            file_timeout: Duration::from_secs(300),
        }
    }
}

impl BatchConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker pool size.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the per-file timeout.
    pub fn with_file_timeout(mut self, timeout: Duration) -> Self {
        self.file_timeout = timeout;
        self
    }
}
