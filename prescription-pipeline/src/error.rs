use thiserror::Error;

use crate::llm::LlmError;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a whole patient case.
///
/// Degradable failures (a query that returned nothing, a page that would not
/// crawl, a chunk summary that errored) never surface here; they are recorded
/// as [`crate::models::Diagnostic`] entries on the case outcome instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("prescription generation failed: {0}")]
    Prescription(LlmError),

    #[error("prescription reformatting failed: {0}")]
    Reformat(LlmError),

    #[error("case processing exceeded the configured deadline")]
    DeadlineExceeded,
}
