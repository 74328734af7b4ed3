//! Response normalization - reconcile the provider's response shapes
//! into one canonical field map.
//!
//! The extraction service answers in one of three incompatible shapes
//! depending on template kind and model mood:
//! - a `fields` array of `{key, value}` records
//! - an `answer` property holding either an object or a JSON-ish string
//! - a flat object whose top-level keys are the fields, wrapped in
//!   envelope keys
//!
//! Each shape is a variant of [`ProviderResponse`], resolved by a single
//! discriminating match. Nothing in here errors: garbage in, empty map
//! out. The one condition reported distinctly is a template echo (the
//! provider returning the schema instead of values), which callers
//! treat as a provider failure.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::fields::CanonicalFieldMap;

/// Envelope keys stripped from flat responses.
const ENVELOPE_KEYS: [&str; 7] = [
    "ai_agent_info",
    "completion_reason",
    "created_at",
    "type",
    "id",
    "scope",
    "template",
];

/// Key for the synthetic field holding an unparseable answer string.
pub const EXTRACTED_TEXT_KEY: &str = "extracted_text";

/// A provider response, resolved to its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    /// Fields-array shape: extracted `{key, value}` records, in order
    Fields(Vec<(String, Value)>),

    /// Answer shape with an object payload
    AnswerObject(Map<String, Value>),

    /// Answer shape with a string payload, not yet parsed
    AnswerText(String),

    /// Flat shape: the payload itself is the field map (envelope
    /// already stripped)
    Flat(Map<String, Value>),

    /// The provider echoed the template definition instead of values
    TemplateEcho,

    /// Nothing usable in the payload
    Empty,
}

impl ProviderResponse {
    /// Fold this response into a canonical field map.
    ///
    /// Fields-array duplicates are folded with later entries
    /// overwriting earlier ones. An answer string is parsed as JSON
    /// (tolerating a fenced code block around it); on parse failure it
    /// becomes a single synthetic `extracted_text` field. Echo and
    /// empty responses yield an empty map.
    pub fn into_field_map(self) -> CanonicalFieldMap {
        match self {
            ProviderResponse::Fields(pairs) => {
                let mut map = CanonicalFieldMap::new();
                for (key, value) in pairs {
                    map.insert(key, value);
                }
                map
            }
            ProviderResponse::AnswerObject(obj) | ProviderResponse::Flat(obj) => {
                obj.into_iter().collect()
            }
            ProviderResponse::AnswerText(text) => parse_answer_text(&text),
            ProviderResponse::TemplateEcho | ProviderResponse::Empty => CanonicalFieldMap::new(),
        }
    }

    /// Whether this response carries no extracted values.
    pub fn is_unusable(&self) -> bool {
        matches!(
            self,
            ProviderResponse::TemplateEcho | ProviderResponse::Empty
        )
    }
}

/// Resolve a raw provider payload to its shape.
///
/// Shape priority: fields array, then answer, then flat. An `answer`
/// object that itself carries a `fields` array is folded like shape
/// one.
pub fn resolve_response(raw: &Value) -> ProviderResponse {
    let Some(obj) = raw.as_object() else {
        return ProviderResponse::Empty;
    };
    if obj.is_empty() {
        return ProviderResponse::Empty;
    }

    if let Some(Value::Array(entries)) = obj.get("fields") {
        return resolve_fields_array(entries);
    }

    match obj.get("answer") {
        Some(Value::Object(inner)) => {
            if let Some(Value::Array(entries)) = inner.get("fields") {
                return resolve_fields_array(entries);
            }
            return ProviderResponse::AnswerObject(inner.clone());
        }
        Some(Value::String(text)) => return ProviderResponse::AnswerText(text.clone()),
        _ => {}
    }

    // Flat shape: strip the envelope and reserved keys, then treat the
    // rest as the field map.
    if obj.contains_key("template_key") {
        // A bare schema reference, not extracted data.
        return ProviderResponse::TemplateEcho;
    }
    let stripped: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| !ENVELOPE_KEYS.contains(&k.as_str()) && !k.starts_with('$'))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    if stripped.is_empty() {
        return ProviderResponse::Empty;
    }
    if stripped.values().all(is_blank) {
        // A map of nothing but nulls and empties is the schema echoed
        // back with no values filled in.
        return ProviderResponse::TemplateEcho;
    }
    ProviderResponse::Flat(stripped)
}

/// Convenience: resolve and fold in one step.
pub fn normalize(raw: &Value) -> CanonicalFieldMap {
    resolve_response(raw).into_field_map()
}

fn resolve_fields_array(entries: &[Value]) -> ProviderResponse {
    let mut pairs = Vec::new();
    let mut definition_entries = 0usize;

    for entry in entries {
        let Some(obj) = entry.as_object() else {
            continue;
        };
        match (obj.get("key"), obj.get("value")) {
            (Some(Value::String(key)), Some(value)) => {
                pairs.push((key.clone(), value.clone()));
            }
            (Some(_), None) if obj.contains_key("prompt") || obj.contains_key("type") => {
                // A field definition: key + prompt/type but no value.
                definition_entries += 1;
            }
            _ => debug!("skipping field entry without key and value"),
        }
    }

    if pairs.is_empty() {
        if definition_entries > 0 {
            warn!(
                entries = definition_entries,
                "provider returned field definitions instead of values"
            );
            return ProviderResponse::TemplateEcho;
        }
        return ProviderResponse::Empty;
    }
    ProviderResponse::Fields(pairs)
}

/// Parse an answer string into a field map.
///
/// Accepts bare JSON or JSON wrapped in a fenced code block; anything
/// else becomes a single `extracted_text` field.
fn parse_answer_text(text: &str) -> CanonicalFieldMap {
    let candidate = extract_json_candidate(text);
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(candidate) {
        return obj.into_iter().collect();
    }

    debug!("answer string is not structured; keeping raw text");
    let mut map = CanonicalFieldMap::new();
    map.insert(
        EXTRACTED_TEXT_KEY.to_string(),
        Value::String(text.to_string()),
    );
    map
}

/// Pull the JSON-looking span out of an answer string.
///
/// Models habitually wrap structured answers in markdown fences; try a
/// ```json block first, then fall back to the outermost braces.
fn extract_json_candidate(text: &str) -> &str {
    let re = regex::Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap();
    if let Some(captures) = re.captures(text) {
        if let Some(block) = captures.get(1) {
            return block.as_str();
        }
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return &text[start..=end];
        }
    }
    text.trim()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}
