pub mod content;
pub mod diff;
pub mod ingest;
pub mod models;
pub mod reward;
pub mod workflow;

pub use content::TranscriptContent;
pub use models::{Transcript, TranscriptStatus};
pub use workflow::{ClaimWorkflow, MergeOutcome};
