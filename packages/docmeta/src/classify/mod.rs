//! Classification strategies.
//!
//! Both implement [`DocumentClassifier`](crate::traits::DocumentClassifier):
//! - [`AiClassifier`] asks the provider with a free-text prompt
//! - [`FilenameHeuristicClassifier`] guesses from filename keywords

pub mod ai;
pub mod heuristic;

pub use ai::AiClassifier;
pub use heuristic::{classify_filename, FilenameHeuristicClassifier};
