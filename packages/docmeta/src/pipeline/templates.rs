//! Built-in template definitions.
//!
//! The remote store is the authoritative registry; this module carries
//! the enterprise template set in code so tests and offline runs have
//! schemas to sanitize against.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::traits::registry::TemplateRegistry;
use crate::types::template::{FieldDefinition, MetadataTemplate};

/// Template keys this module can materialize.
pub const BUILTIN_TEMPLATE_KEYS: [&str; 5] = [
    "financialDocumentBase",
    "address_validation",
    "irs1099",
    "irsw2",
    "accountStatement",
];

/// Build a built-in template for a scope, if the key is known.
pub fn builtin_template(scope: &str, template_key: &str) -> Option<MetadataTemplate> {
    let template = match template_key {
        "financialDocumentBase" => MetadataTemplate::new(scope, template_key)
            .with_field(FieldDefinition::enumeration(
                "documentType",
                [
                    "1099",
                    "W-2",
                    "Account Statement",
                    "Mortgage Statement",
                    "Trust Document",
                    "Asset List",
                    "1040",
                    "Personal Financial Statement",
                    "Life Insurance Document",
                    "Other",
                ],
            ))
            .with_field(FieldDefinition::date("taxYear"))
            .with_field(FieldDefinition::string("issuerName"))
            .with_field(FieldDefinition::string("recipientName"))
            .with_field(FieldDefinition::date("documentDate"))
            .with_field(FieldDefinition::string("accountOrPolicyNoMasked"))
            .with_field(FieldDefinition::enumeration("isLegible", ["Yes", "No"])),

        "address_validation" => MetadataTemplate::new(scope, template_key)
            .with_field(FieldDefinition::string("street_address"))
            .with_field(FieldDefinition::string("city"))
            .with_field(FieldDefinition::string("state_province"))
            .with_field(FieldDefinition::string("postal_code"))
            .with_field(FieldDefinition::string("country"))
            .with_field(FieldDefinition::string("full_address"))
            .with_field(FieldDefinition::enumeration(
                "validation_status",
                ["Match", "Mismatch", "Partial Match", "Not Validated"],
            ))
            .with_field(FieldDefinition::date("date_extracted")),

        "irs1099" => MetadataTemplate::new(scope, template_key)
            .with_field(FieldDefinition::enumeration(
                "formVariant",
                ["INT", "DIV", "B", "MISC", "NEC"],
            ))
            .with_field(FieldDefinition::string("payerTinMasked"))
            .with_field(FieldDefinition::string("recipientTinMasked"))
            .with_field(FieldDefinition::float("box1IncomeAmount"))
            .with_field(FieldDefinition::float("federalTaxWithheld")),

        "irsw2" => MetadataTemplate::new(scope, template_key)
            .with_field(FieldDefinition::string("employerEinMasked"))
            .with_field(FieldDefinition::string("employeeSsnMasked"))
            .with_field(FieldDefinition::float("box1Wages"))
            .with_field(FieldDefinition::float("box2FederalWithholding")),

        "accountStatement" => MetadataTemplate::new(scope, template_key)
            .with_field(FieldDefinition::string("institutionName"))
            .with_field(FieldDefinition::enumeration(
                "accountType",
                ["Checking", "Savings", "Brokerage"],
            )),

        _ => return None,
    };
    Some(template)
}

/// A registry serving the built-in template set.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry;

impl StaticRegistry {
    /// Create a static registry.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TemplateRegistry for StaticRegistry {
    async fn template(
        &self,
        scope: &str,
        template_key: &str,
    ) -> Result<MetadataTemplate, StoreError> {
        builtin_template(scope, template_key).ok_or_else(|| StoreError::TemplateNotFound {
            scope: scope.to_string(),
            template_key: template_key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::template::FieldType;

    #[tokio::test]
    async fn test_static_registry_serves_builtins() {
        let registry = StaticRegistry::new();
        for key in BUILTIN_TEMPLATE_KEYS {
            let template = registry.template("enterprise_1", key).await.unwrap();
            assert_eq!(template.template_key, key);
            assert!(!template.is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_template_errors() {
        let registry = StaticRegistry::new();
        let err = registry
            .template("enterprise_1", "mortgageStatement")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_base_template_field_types() {
        let template = builtin_template("e", "financialDocumentBase").unwrap();
        assert_eq!(template.field("documentType").unwrap().field_type, FieldType::Enum);
        assert_eq!(template.field("taxYear").unwrap().field_type, FieldType::Date);
        assert_eq!(template.field("issuerName").unwrap().field_type, FieldType::String);
        assert!(template.field("documentType").unwrap().allows_option("W-2"));
    }
}
