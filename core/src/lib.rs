//! Incident ingestion: classification, action derivation and persistence.
//!
//! The HTTP surface lives in `incident-server`; this crate holds everything
//! that can be exercised without a listener.

pub mod action;
pub mod classifier;
pub mod incident;
pub mod pipeline;
pub mod store;

pub use action::derive_action;
pub use classifier::Classifier;
pub use classifier::ClassifyError;
pub use classifier::HttpClassifier;
pub use incident::Classification;
pub use incident::Incident;
pub use incident::NewIncident;
pub use pipeline::IngestError;
pub use pipeline::IngestPipeline;
pub use pipeline::IngestRequest;
pub use store::IncidentStore;
pub use store::MemoryIncidentStore;
pub use store::PgIncidentStore;
pub use store::StoreError;
