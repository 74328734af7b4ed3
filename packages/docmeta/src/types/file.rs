//! File references - the unit of work the pipeline processes.

use serde::{Deserialize, Serialize};

use crate::pipeline::address::ReferenceAddress;

/// A reference to a file held by the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    /// Store-assigned file id
    pub id: String,

    /// Original filename, used by the heuristic classifier
    pub name: String,

    /// Address of record to compare extracted addresses against
    #[serde(default)]
    pub reference_address: Option<ReferenceAddress>,
}

impl FileRef {
    /// Create a file reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            reference_address: None,
        }
    }

    /// Attach the address of record for this file's owner.
    pub fn with_reference_address(mut self, address: ReferenceAddress) -> Self {
        self.reference_address = Some(address);
        self
    }
}
