//! Image generation: configuration, the backend seam and the request state machine.

mod backend;
mod config;
mod process;
mod prompt;
mod session;

pub use backend::{CancelToken, GenerationBackend, GenerationRequest};
pub use config::{GenerationConfig, GenerationField, Scheduler};
pub use process::{PIPELINE_INPUT_SIZE, ProcessBackend, prepare_input};
pub use prompt::{Perspective, PromptParts};
pub use session::{GenerationOutcome, GenerationSession, GenerationState, SharedBackend, Waker};
