//! Agent layer: link relevance classification and brochure orchestration.
//!
//! The binary is the primary entrypoint; this library surface exists so the
//! pipeline can be driven with any [`prospectus_core::InferenceProvider`] /
//! [`prospectus_core::PageFetcher`] pair (tests use scripted ones).

pub mod agent;
pub mod brochure;
pub mod classify;

#[cfg(test)]
pub(crate) mod testutil;

pub use agent::InferenceAgent;
pub use brochure::BrochureBuilder;
pub use classify::LinkClassifier;
