//! The credit-metered generation workflow.

pub mod error;
pub mod orchestrator;
pub mod validator;

pub use error::GenerationError;
pub use orchestrator::{CreditSummary, GenerationOutcome, Orchestrator, Stage};
pub use validator::{GenerationRequest, RequestValidator, ValidatedRequest, Workflow};
