//! Filename-based document classification.
//!
//! A provider-independent fallback: when the extraction service is
//! unreachable or returns nothing usable, the filename usually still
//! says what the document is.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::traits::classifier::DocumentClassifier;
use crate::types::classification::{DocumentClassification, DocumentType};

/// Guess a document type from its filename.
///
/// Ordered keyword matching, first rule wins. Case-insensitive.
pub fn classify_filename(file_name: &str) -> DocumentType {
    let name = file_name.to_lowercase();

    if name.contains("1099") {
        DocumentType::Irs1099
    } else if name.contains("w-2") || name.contains("w2") {
        DocumentType::W2
    } else if name.contains("statement")
        && (name.contains("account") || name.contains("bank") || name.contains("brokerage"))
    {
        DocumentType::AccountStatement
    } else if name.contains("mortgage") {
        DocumentType::MortgageStatement
    } else if name.contains("trust") {
        DocumentType::TrustDocument
    } else if name.contains("asset") && name.contains("list") {
        DocumentType::AssetList
    } else if name.contains("1040") {
        DocumentType::Irs1040
    } else if name.contains("financial") && name.contains("statement") {
        DocumentType::PersonalFinancialStatement
    } else if name.contains("insurance") {
        DocumentType::LifeInsuranceDocument
    } else {
        DocumentType::Other
    }
}

/// The filename heuristic as a classification strategy. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameHeuristicClassifier;

#[async_trait]
impl DocumentClassifier for FilenameHeuristicClassifier {
    async fn classify(
        &self,
        _file_id: &str,
        file_name: &str,
    ) -> Result<DocumentClassification, ProviderError> {
        Ok(DocumentClassification::heuristic(classify_filename(
            file_name,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::classification::ClassificationSource;

    #[test]
    fn test_keyword_table() {
        assert_eq!(
            classify_filename("2023_W2_JohnDoe.pdf"),
            DocumentType::W2
        );
        assert_eq!(classify_filename("acme-1099-NEC.pdf"), DocumentType::Irs1099);
        assert_eq!(
            classify_filename("Brokerage Statement Q3.pdf"),
            DocumentType::AccountStatement
        );
        assert_eq!(
            classify_filename("mortgage_jan.pdf"),
            DocumentType::MortgageStatement
        );
        assert_eq!(
            classify_filename("Family Trust Agreement.pdf"),
            DocumentType::TrustDocument
        );
        assert_eq!(classify_filename("asset_list_2024.xlsx"), DocumentType::AssetList);
        assert_eq!(classify_filename("Form 1040 2023.pdf"), DocumentType::Irs1040);
        assert_eq!(
            classify_filename("personal financial statement.pdf"),
            DocumentType::PersonalFinancialStatement
        );
        assert_eq!(
            classify_filename("life-insurance-policy.pdf"),
            DocumentType::LifeInsuranceDocument
        );
        assert_eq!(classify_filename("scan0001.pdf"), DocumentType::Other);
    }

    #[test]
    fn test_rule_order_wins() {
        // "1099" outranks "statement".
        assert_eq!(
            classify_filename("1099 account statement.pdf"),
            DocumentType::Irs1099
        );
    }

    #[tokio::test]
    async fn test_classifier_is_heuristic_source() {
        let classification = FilenameHeuristicClassifier
            .classify("f1", "2023_W2_JohnDoe.pdf")
            .await
            .unwrap();
        assert_eq!(classification.document_type, DocumentType::W2);
        assert_eq!(classification.source, ClassificationSource::Heuristic);
        assert!(classification.confidence < 0.5);
    }
}
