//! Document classifier trait - the classification strategy seam.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::classification::DocumentClassification;

/// A document-type classification strategy.
///
/// Two implementations ship with the crate:
/// - [`AiClassifier`](crate::classify::AiClassifier) asks the
///   extraction provider with a free-text prompt
/// - [`FilenameHeuristicClassifier`](crate::classify::FilenameHeuristicClassifier)
///   guesses from filename keywords and never fails
///
/// The orchestrator selects the heuristic strategy when the provider
/// is unavailable.
#[async_trait]
pub trait DocumentClassifier: Send + Sync {
    /// Classify one file.
    async fn classify(
        &self,
        file_id: &str,
        file_name: &str,
    ) -> Result<DocumentClassification, ProviderError>;
}
