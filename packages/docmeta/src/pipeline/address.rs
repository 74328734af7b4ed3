//! Address comparison - match extracted addresses against the address
//! of record.
//!
//! Comparison is component-wise over street, city, state/province, and
//! postal code. Components are normalized (case, punctuation, unit
//! designators, whitespace) and scored with normalized Levenshtein
//! similarity; a component matches at 0.8 or better. The resulting
//! classification is an output signal only and is never persisted.

use serde::{Deserialize, Serialize};

use crate::types::fields::{FieldValue, SanitizedMetadata};

/// Similarity at or above which a component counts as matching.
const MATCH_THRESHOLD: f64 = 0.8;

/// The address components that participate in comparison.
const COMPONENTS: [&str; 4] = ["street_address", "city", "state_province", "postal_code"];

/// The address of record for a file's owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceAddress {
    /// Street number, name, and optional unit
    #[serde(default)]
    pub street_address: String,

    /// City
    #[serde(default)]
    pub city: String,

    /// State or province abbreviation
    #[serde(default)]
    pub state_province: String,

    /// ZIP or postal code
    #[serde(default)]
    pub postal_code: String,
}

impl ReferenceAddress {
    /// Create an address of record.
    pub fn new(
        street_address: impl Into<String>,
        city: impl Into<String>,
        state_province: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            street_address: street_address.into(),
            city: city.into(),
            state_province: state_province.into(),
            postal_code: postal_code.into(),
        }
    }

    /// Whether any component is populated.
    pub fn has_any_component(&self) -> bool {
        !(self.street_address.is_empty()
            && self.city.is_empty()
            && self.state_province.is_empty()
            && self.postal_code.is_empty())
    }

    fn component(&self, name: &str) -> &str {
        match name {
            "street_address" => &self.street_address,
            "city" => &self.city,
            "state_province" => &self.state_province,
            "postal_code" => &self.postal_code,
            _ => "",
        }
    }
}

/// How closely an extracted address matches the address of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressMatch {
    /// Every component matches
    Exact,
    /// Some components match, some do not
    Partial,
    /// No component matches
    FullMismatch,
}

/// Similarity detail for one address component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentComparison {
    /// Component name
    pub component: &'static str,

    /// Normalized value from the address of record
    pub reference: String,

    /// Normalized extracted value
    pub extracted: String,

    /// Normalized Levenshtein similarity, 0.0 to 1.0
    pub similarity: f64,

    /// Whether this component matches
    pub matched: bool,
}

/// Result of comparing one extracted address against the record.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressComparison {
    /// Per-component detail
    pub components: Vec<ComponentComparison>,

    /// Overall classification
    pub classification: AddressMatch,
}

/// Compare extracted address metadata against the address of record.
pub fn compare_addresses(
    reference: &ReferenceAddress,
    extracted: &SanitizedMetadata,
) -> AddressComparison {
    let components: Vec<ComponentComparison> = COMPONENTS
        .iter()
        .map(|name| {
            let reference_value = normalize_component(reference.component(name));
            let extracted_value =
                normalize_component(extracted.get_str(name).unwrap_or_default());
            let similarity = similarity(&reference_value, &extracted_value);
            ComponentComparison {
                component: name,
                reference: reference_value,
                extracted: extracted_value,
                similarity,
                matched: similarity >= MATCH_THRESHOLD,
            }
        })
        .collect();

    let matched = components.iter().filter(|c| c.matched).count();
    let classification = if matched == components.len() {
        AddressMatch::Exact
    } else if matched == 0 {
        AddressMatch::FullMismatch
    } else {
        AddressMatch::Partial
    };

    AddressComparison {
        components,
        classification,
    }
}

/// Normalize an address component for comparison.
pub fn normalize_component(component: &str) -> String {
    let lowered = component.to_lowercase();
    let lowered = lowered
        .replace(',', "")
        .replace('.', "")
        .replace('#', "apt ")
        .replace("apartment", "apt")
        .replace("unit", "apt")
        .replace("suite", "ste");
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized Levenshtein similarity between two strings.
///
/// Two empty strings are identical (1.0); one empty string matches
/// nothing (0.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let distance = levenshtein(a, b);
    let max_len = a.chars().count().max(b.chars().count());
    1.0 - distance as f64 / max_len as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut previous_diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous_diagonal + usize::from(ca != cb);
            previous_diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(previous_diagonal + 1);
        }
    }
    row[b.len()]
}

/// Whether any comparable address component was extracted.
pub fn has_address_components(metadata: &SanitizedMetadata) -> bool {
    COMPONENTS.iter().any(|name| metadata.get_str(name).is_some())
}

/// Build `full_address` from components when the provider did not
/// supply one.
pub fn synthesize_full_address(metadata: &mut SanitizedMetadata) {
    if metadata.contains_key("full_address") {
        return;
    }
    let parts: Vec<&str> = COMPONENTS
        .iter()
        .filter_map(|name| metadata.get_str(name))
        .collect();
    if !parts.is_empty() {
        metadata.insert("full_address", FieldValue::Text(parts.join(", ")));
    }
}

/// Stamp `date_extracted` with today's date when absent.
pub fn stamp_extraction_date(metadata: &mut SanitizedMetadata) {
    if !metadata.contains_key("date_extracted") {
        metadata.insert(
            "date_extracted",
            FieldValue::Date(chrono::Utc::now().date_naive()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(
        street: &str,
        city: &str,
        state: &str,
        postal: &str,
    ) -> SanitizedMetadata {
        let mut metadata = SanitizedMetadata::new();
        if !street.is_empty() {
            metadata.insert("street_address", FieldValue::Text(street.to_string()));
        }
        if !city.is_empty() {
            metadata.insert("city", FieldValue::Text(city.to_string()));
        }
        if !state.is_empty() {
            metadata.insert("state_province", FieldValue::Text(state.to_string()));
        }
        if !postal.is_empty() {
            metadata.insert("postal_code", FieldValue::Text(postal.to_string()));
        }
        metadata
    }

    #[test]
    fn test_normalize_component() {
        assert_eq!(
            normalize_component("123 Main St., Apartment 4B"),
            "123 main st apt 4b"
        );
        assert_eq!(normalize_component("Suite  200"), "ste 200");
        assert_eq!(normalize_component("#12"), "apt 12");
    }

    #[test]
    fn test_exact_match_despite_formatting() {
        let reference = ReferenceAddress::new("123 Main St.", "Springfield", "IL", "62704");
        let comparison =
            compare_addresses(&reference, &extracted("123 main st", "springfield", "il", "62704"));
        assert_eq!(comparison.classification, AddressMatch::Exact);
    }

    #[test]
    fn test_full_mismatch() {
        let reference = ReferenceAddress::new("123 Financial St", "New York", "NY", "10001");
        let comparison =
            compare_addresses(&reference, &extracted("100 Main St", "Boston", "MA", "02108"));
        assert_eq!(comparison.classification, AddressMatch::FullMismatch);
    }

    #[test]
    fn test_partial_match() {
        let reference = ReferenceAddress::new("123 Main St", "Springfield", "IL", "62704");
        let comparison =
            compare_addresses(&reference, &extracted("123 Main St", "Springfield", "MO", "65801"));
        assert_eq!(comparison.classification, AddressMatch::Partial);
        let matched: Vec<_> = comparison
            .components
            .iter()
            .filter(|c| c.matched)
            .map(|c| c.component)
            .collect();
        assert_eq!(matched, vec!["street_address", "city"]);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert!(similarity("springfield", "springfeld") > 0.8);
        assert!(similarity("ny", "ma") < 0.8);
    }

    #[test]
    fn test_synthesize_full_address() {
        let mut metadata = extracted("123 Main St", "Springfield", "IL", "62704");
        synthesize_full_address(&mut metadata);
        assert_eq!(
            metadata.get_str("full_address"),
            Some("123 Main St, Springfield, IL, 62704")
        );

        // An existing full_address is left alone.
        let mut metadata = extracted("1 Elm St", "", "", "");
        metadata.insert("full_address", FieldValue::Text("as provided".to_string()));
        synthesize_full_address(&mut metadata);
        assert_eq!(metadata.get_str("full_address"), Some("as provided"));
    }

    #[test]
    fn test_stamp_extraction_date_only_when_absent() {
        let mut metadata = SanitizedMetadata::new();
        stamp_extraction_date(&mut metadata);
        assert!(metadata.contains_key("date_extracted"));

        let pinned = FieldValue::Date(chrono::NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        let mut metadata = SanitizedMetadata::new();
        metadata.insert("date_extracted", pinned.clone());
        stamp_extraction_date(&mut metadata);
        assert_eq!(metadata.get("date_extracted"), Some(&pinned));
    }
}
