//! Finsift engine crate
//!
//! The async pipeline orchestrator around the pure extractors: it owns
//! configuration, the injected capability seams (remote matching,
//! attachment fetching, page rendering, exception routing), the local
//! confidence-only fallback, and exception routing policy.
//!
//! This is a library boundary only: no wire format, CLI, or persistence.
//! The caller hands in a [`finsift_types::DocumentInput`] plus its
//! capability implementations and receives a [`pipeline::PipelineOutcome`].

pub mod capabilities;
pub mod config;
pub mod exception;
pub mod fallback;
pub mod pipeline;

// Re-export commonly used entry points
pub use capabilities::{
    AttachmentFetcher, CapabilityError, ExceptionRouter, PageRenderer, RemoteMatch, RemoteMatcher,
};
pub use config::{AttachmentBudget, EngineConfig};
pub use exception::route_exception;
pub use fallback::score_local_match;
pub use pipeline::{Capabilities, FinancialPipeline, PipelineOutcome};
