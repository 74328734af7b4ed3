//! Document classification types.

use serde::{Deserialize, Serialize};

/// The financial document types the base template distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    Irs1099,
    W2,
    AccountStatement,
    MortgageStatement,
    TrustDocument,
    AssetList,
    Irs1040,
    PersonalFinancialStatement,
    LifeInsuranceDocument,
    Other,
}

impl DocumentType {
    /// All known document types, in classification priority order.
    pub const ALL: [DocumentType; 10] = [
        DocumentType::Irs1099,
        DocumentType::W2,
        DocumentType::AccountStatement,
        DocumentType::MortgageStatement,
        DocumentType::TrustDocument,
        DocumentType::AssetList,
        DocumentType::Irs1040,
        DocumentType::PersonalFinancialStatement,
        DocumentType::LifeInsuranceDocument,
        DocumentType::Other,
    ];

    /// The literal stored in the base template's `documentType` enum field.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Irs1099 => "1099",
            DocumentType::W2 => "W-2",
            DocumentType::AccountStatement => "Account Statement",
            DocumentType::MortgageStatement => "Mortgage Statement",
            DocumentType::TrustDocument => "Trust Document",
            DocumentType::AssetList => "Asset List",
            DocumentType::Irs1040 => "1040",
            DocumentType::PersonalFinancialStatement => "Personal Financial Statement",
            DocumentType::LifeInsuranceDocument => "Life Insurance Document",
            DocumentType::Other => "Other",
        }
    }

    /// Parse the enum literal back into a document type.
    pub fn from_label(label: &str) -> Option<DocumentType> {
        Self::ALL.iter().copied().find(|t| t.label() == label)
    }

    /// The type-specific template this document type maps to.
    ///
    /// `Other` has no type-specific template; its stage is skipped.
    pub fn template_key(&self) -> Option<&'static str> {
        match self {
            DocumentType::Irs1099 => Some("irs1099"),
            DocumentType::W2 => Some("irsw2"),
            DocumentType::AccountStatement => Some("accountStatement"),
            DocumentType::MortgageStatement => Some("mortgageStatement"),
            DocumentType::TrustDocument => Some("trustDocument"),
            DocumentType::AssetList => Some("assetList"),
            DocumentType::Irs1040 => Some("irs1040"),
            DocumentType::PersonalFinancialStatement => Some("personalFinancialStatement"),
            DocumentType::LifeInsuranceDocument => Some("lifeInsuranceDocument"),
            DocumentType::Other => None,
        }
    }
}

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    /// Extracted or answered by the AI provider
    Ai,
    /// Guessed from the filename by the keyword heuristic
    Heuristic,
}

/// A document-type guess, consumed to pick the next template in the
/// extraction cascade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentClassification {
    /// The guessed type
    pub document_type: DocumentType,

    /// Confidence in the guess (0.0 to 1.0); fixed and low for
    /// heuristic classifications
    pub confidence: f32,

    /// How the guess was produced
    pub source: ClassificationSource,
}

impl DocumentClassification {
    /// A provider-derived classification.
    pub fn ai(document_type: DocumentType, confidence: f32) -> Self {
        Self {
            document_type,
            confidence,
            source: ClassificationSource::Ai,
        }
    }

    /// A filename-heuristic classification with fixed low confidence.
    pub fn heuristic(document_type: DocumentType) -> Self {
        Self {
            document_type,
            confidence: 0.3,
            source: ClassificationSource::Heuristic,
        }
    }
}
