//! HTTP clients for the two remote services.
//!
//! Both authenticate with an opaque bearer token and never log it;
//! token minting is the caller's concern.

pub mod provider;
pub mod store;

pub use provider::HttpExtractor;
pub use store::HttpMetadataStore;
