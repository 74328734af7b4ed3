//! Field sanitization - convert raw canonical values to their declared
//! types, or drop them.
//!
//! The template is the source of truth, not the provider's output:
//! undeclared keys are dropped silently, and anything that cannot be
//! converted to its declared type is dropped with a recorded reason.
//! Sanitization never fails as a whole.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::fields::{
    CanonicalFieldMap, FieldRejection, FieldValue, RejectReason, SanitizedMetadata,
};
use crate::types::template::{FieldDefinition, FieldType, MetadataTemplate};

/// Date formats the sanitizer accepts, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

/// Result of sanitizing one canonical field map against a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizeReport {
    /// The surviving, type-correct, non-empty subset
    pub metadata: SanitizedMetadata,

    /// Fields that were dropped, with reasons
    pub rejected: Vec<FieldRejection>,
}

/// Sanitize a canonical field map against its owning template.
pub fn sanitize(template: &MetadataTemplate, raw: &CanonicalFieldMap) -> SanitizeReport {
    let mut report = SanitizeReport::default();

    for (key, value) in raw {
        let Some(definition) = template.field(key) else {
            debug!(key = %key, template = %template.template_key, "dropping undeclared field");
            report.rejected.push(FieldRejection {
                key: key.clone(),
                raw: value.clone(),
                reason: RejectReason::Undeclared,
            });
            continue;
        };

        match sanitize_value(definition, value) {
            Ok(Some(field_value)) => {
                report.metadata.insert(key.clone(), field_value);
            }
            Ok(None) => {
                report.rejected.push(FieldRejection {
                    key: key.clone(),
                    raw: value.clone(),
                    reason: RejectReason::Empty,
                });
            }
            Err(reason) => {
                warn!(
                    key = %key,
                    template = %template.template_key,
                    reason = %reason,
                    "dropping field that failed validation"
                );
                report.rejected.push(FieldRejection {
                    key: key.clone(),
                    raw: value.clone(),
                    reason,
                });
            }
        }
    }

    report
}

/// Convert one raw value to its declared type.
///
/// `Ok(None)` means the value is absent (null or empty after trimming)
/// and should be dropped without a warning.
fn sanitize_value(
    definition: &FieldDefinition,
    value: &Value,
) -> Result<Option<FieldValue>, RejectReason> {
    if value.is_null() {
        return Ok(None);
    }

    match definition.field_type {
        FieldType::String => sanitize_string(value),
        FieldType::Float => sanitize_float(value),
        FieldType::Date => sanitize_date(value),
        FieldType::Enum => sanitize_enum(definition, value),
    }
}

fn sanitize_string(value: &Value) -> Result<Option<FieldValue>, RejectReason> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err(RejectReason::NotScalar),
    };
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(FieldValue::Text(text)))
}

fn sanitize_float(value: &Value) -> Result<Option<FieldValue>, RejectReason> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|f| Some(FieldValue::Number(f)))
            .ok_or(RejectReason::NotNumeric),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            // Amounts arrive currency-formatted: "$1,234.56".
            let cleaned: String = trimmed
                .chars()
                .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
                .collect();
            // "inf" and "NaN" parse as f64 but have no JSON encoding.
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| Some(FieldValue::Number(f)))
                .ok_or(RejectReason::NotNumeric)
        }
        _ => Err(RejectReason::NotNumeric),
    }
}

fn sanitize_date(value: &Value) -> Result<Option<FieldValue>, RejectReason> {
    let Value::String(s) = value else {
        return Err(RejectReason::UnrecognizedDate);
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_date(trimmed)
        .map(|d| Some(FieldValue::Date(d)))
        .ok_or(RejectReason::UnrecognizedDate)
}

fn sanitize_enum(
    definition: &FieldDefinition,
    value: &Value,
) -> Result<Option<FieldValue>, RejectReason> {
    let Value::String(s) = value else {
        return Err(RejectReason::NotAnOption);
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if definition.allows_option(trimmed) {
        Ok(Some(FieldValue::Choice(trimmed.to_string())))
    } else {
        Err(RejectReason::NotAnOption)
    }
}

/// Parse a date literal in any accepted format.
///
/// RFC 3339 timestamps (as read back from the store) are accepted by
/// taking their date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let candidate = match s.split_once('T') {
        Some((date_part, _)) => date_part,
        None => s,
    };
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::template::FieldDefinition;
    use serde_json::json;

    fn template() -> MetadataTemplate {
        MetadataTemplate::new("enterprise_1", "financialDocumentBase")
            .with_field(FieldDefinition::enumeration(
                "documentType",
                ["1099", "W-2", "Other"],
            ))
            .with_field(FieldDefinition::string("issuerName"))
            .with_field(FieldDefinition::date("documentDate"))
            .with_field(FieldDefinition::float("amount"))
    }

    #[test]
    fn test_string_trimmed_and_empty_dropped() {
        let raw: CanonicalFieldMap = [
            ("issuerName".to_string(), json!("  Acme Payroll  ")),
            ("documentType".to_string(), json!("   ")),
        ]
        .into_iter()
        .collect();

        let report = sanitize(&template(), &raw);
        assert_eq!(
            report.metadata.get("issuerName"),
            Some(&FieldValue::Text("Acme Payroll".to_string()))
        );
        assert!(!report.metadata.contains_key("documentType"));
    }

    #[test]
    fn test_long_form_date_normalized() {
        let raw: CanonicalFieldMap = [("documentDate".to_string(), json!("July 21, 2025"))]
            .into_iter()
            .collect();

        let report = sanitize(&template(), &raw);
        assert_eq!(
            report.metadata.get("documentDate").unwrap().as_json(),
            json!("2025-07-21")
        );
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(
            parse_date("2025-07-21"),
            NaiveDate::from_ymd_opt(2025, 7, 21)
        );
        assert_eq!(
            parse_date("07/21/2025"),
            NaiveDate::from_ymd_opt(2025, 7, 21)
        );
        assert_eq!(
            parse_date("Jul 21, 2025"),
            NaiveDate::from_ymd_opt(2025, 7, 21)
        );
        assert_eq!(
            parse_date("2025-07-21T00:00:00Z"),
            NaiveDate::from_ymd_opt(2025, 7, 21)
        );
        assert_eq!(parse_date("21.07.2025"), None);
    }

    #[test]
    fn test_enum_mismatch_dropped() {
        let raw: CanonicalFieldMap = [("documentType".to_string(), json!("Maybe"))]
            .into_iter()
            .collect();

        let report = sanitize(&template(), &raw);
        assert!(report.metadata.is_empty());
        assert_eq!(report.rejected[0].reason, RejectReason::NotAnOption);
    }

    #[test]
    fn test_enum_is_case_sensitive() {
        let raw: CanonicalFieldMap = [("documentType".to_string(), json!("w-2"))]
            .into_iter()
            .collect();

        let report = sanitize(&template(), &raw);
        assert!(report.metadata.is_empty());
    }

    #[test]
    fn test_float_accepts_numeric_and_currency_strings() {
        let raw: CanonicalFieldMap = [("amount".to_string(), json!("$1,234.56"))]
            .into_iter()
            .collect();
        let report = sanitize(&template(), &raw);
        assert_eq!(
            report.metadata.get("amount"),
            Some(&FieldValue::Number(1234.56))
        );

        let raw: CanonicalFieldMap = [("amount".to_string(), json!(42.5))].into_iter().collect();
        let report = sanitize(&template(), &raw);
        assert_eq!(
            report.metadata.get("amount"),
            Some(&FieldValue::Number(42.5))
        );
    }

    #[test]
    fn test_float_parse_failure_dropped() {
        let raw: CanonicalFieldMap = [("amount".to_string(), json!("about nine"))]
            .into_iter()
            .collect();
        let report = sanitize(&template(), &raw);
        assert!(report.metadata.is_empty());
        assert_eq!(report.rejected[0].reason, RejectReason::NotNumeric);
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        for literal in ["inf", "-inf", "NaN", "1e999"] {
            let raw: CanonicalFieldMap = [("amount".to_string(), json!(literal))]
                .into_iter()
                .collect();
            let report = sanitize(&template(), &raw);
            assert!(report.metadata.is_empty(), "{literal} survived");
        }
    }

    #[test]
    fn test_undeclared_keys_dropped() {
        let raw: CanonicalFieldMap = [("favoriteColor".to_string(), json!("blue"))]
            .into_iter()
            .collect();
        let report = sanitize(&template(), &raw);
        assert!(report.metadata.is_empty());
        assert_eq!(report.rejected[0].reason, RejectReason::Undeclared);
    }

    #[test]
    fn test_nulls_never_survive() {
        let raw: CanonicalFieldMap = [
            ("issuerName".to_string(), Value::Null),
            ("amount".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();
        let report = sanitize(&template(), &raw);
        assert!(report.metadata.is_empty());
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let raw: CanonicalFieldMap = [
            ("documentType".to_string(), json!("W-2")),
            ("issuerName".to_string(), json!("  Acme  ")),
            ("documentDate".to_string(), json!("07/21/2025")),
            ("amount".to_string(), json!("$10,000.00")),
        ]
        .into_iter()
        .collect();

        let first = sanitize(&template(), &raw);
        let second = sanitize(&template(), &first.metadata.to_canonical());
        assert_eq!(first.metadata, second.metadata);
        assert!(second.rejected.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_value() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<f64>().prop_filter("finite", |f| f.is_finite())
                    .prop_map(|f| json!(f)),
                "[ -~]{0,24}".prop_map(Value::String),
            ]
        }

        fn arb_map() -> impl Strategy<Value = CanonicalFieldMap> {
            proptest::collection::vec(("[a-zA-Z]{1,16}", arb_value()), 0..12)
                .prop_map(|pairs| pairs.into_iter().collect())
        }

        proptest! {
            #[test]
            fn schema_containment(raw in arb_map()) {
                let template = template();
                let report = sanitize(&template, &raw);
                for (key, value) in report.metadata.iter() {
                    prop_assert!(template.declares(key));
                    match value.as_json() {
                        Value::String(s) => prop_assert!(!s.is_empty()),
                        Value::Null => prop_assert!(false, "null survived sanitization"),
                        _ => {}
                    }
                }
            }

            #[test]
            fn sanitize_twice_is_identity(raw in arb_map()) {
                let template = template();
                let first = sanitize(&template, &raw);
                let second = sanitize(&template, &first.metadata.to_canonical());
                prop_assert_eq!(first.metadata, second.metadata);
                prop_assert!(second.rejected.is_empty());
            }
        }
    }
}
