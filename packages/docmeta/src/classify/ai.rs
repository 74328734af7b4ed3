//! Prompt-driven document classification via the extraction provider.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProviderError;
use crate::traits::classifier::DocumentClassifier;
use crate::traits::extractor::Extractor;
use crate::types::classification::{DocumentClassification, DocumentType};

/// Confidence assigned to prompt-driven classifications.
const ASK_CONFIDENCE: f32 = 0.8;

const CLASSIFY_PROMPT: &str = "Classify this financial document as exactly one of the \
following types: 1099, W-2, Account Statement, Mortgage Statement, Trust Document, \
Asset List, 1040, Personal Financial Statement, Life Insurance Document, Other. \
Respond with only the type name.";

/// Classifies documents by asking the provider a free-text question.
///
/// Useful when a deployment wants classification without a metadata
/// template, or as an alternative fallback to the filename heuristic.
pub struct AiClassifier<E> {
    extractor: E,
}

impl<E: Extractor> AiClassifier<E> {
    /// Create a classifier over an extraction provider.
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    /// Map an answer string to a document type.
    ///
    /// Exact label match first, then a case-insensitive containment
    /// scan in priority order; anything unrecognized is `Other`.
    fn parse_answer(answer: &str) -> DocumentType {
        let trimmed = answer.trim();
        if let Some(document_type) = DocumentType::from_label(trimmed) {
            return document_type;
        }
        let lowered = trimmed.to_lowercase();
        DocumentType::ALL
            .into_iter()
            .find(|t| t != &DocumentType::Other && lowered.contains(&t.label().to_lowercase()))
            .unwrap_or(DocumentType::Other)
    }
}

#[async_trait]
impl<E: Extractor> DocumentClassifier for AiClassifier<E> {
    async fn classify(
        &self,
        file_id: &str,
        _file_name: &str,
    ) -> Result<DocumentClassification, ProviderError> {
        let answer = self.extractor.ask(file_id, CLASSIFY_PROMPT).await?;
        debug!(file_id, answer = %answer, "classification answer");
        Ok(DocumentClassification::ai(
            Self::parse_answer(&answer),
            ASK_CONFIDENCE,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockExtractor;
    use crate::types::classification::ClassificationSource;

    #[test]
    fn test_parse_answer_exact() {
        assert_eq!(
            AiClassifier::<MockExtractor>::parse_answer("W-2"),
            DocumentType::W2
        );
        assert_eq!(
            AiClassifier::<MockExtractor>::parse_answer("  Account Statement \n"),
            DocumentType::AccountStatement
        );
    }

    #[test]
    fn test_parse_answer_embedded() {
        assert_eq!(
            AiClassifier::<MockExtractor>::parse_answer("This document is a 1099 form."),
            DocumentType::Irs1099
        );
        assert_eq!(
            AiClassifier::<MockExtractor>::parse_answer("I cannot tell."),
            DocumentType::Other
        );
    }

    #[tokio::test]
    async fn test_classify_via_ask() {
        let extractor = MockExtractor::new().with_answer("f1", "Mortgage Statement");
        let classifier = AiClassifier::new(extractor);

        let classification = classifier.classify("f1", "scan.pdf").await.unwrap();
        assert_eq!(
            classification.document_type,
            DocumentType::MortgageStatement
        );
        assert_eq!(classification.source, ClassificationSource::Ai);
    }
}
