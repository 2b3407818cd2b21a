//! Progress/Cancellation Controller
//!
//! - **abort**: shared cooperative cancellation flag
//! - **progress**: stage-weighted progress with optimistic creep
//! - **timing**: rolling run duration history for time estimates
//! - **controller**: the run state machine tying it together

pub mod abort;
pub mod controller;
pub mod error;
pub mod progress;
pub mod timing;

pub use abort::AbortSignal;
pub use controller::{AnalysisController, AnalysisState, PatternSet, RunOutcome, RunState};
pub use error::{AnalysisError, AnalysisResult};
pub use progress::{ProgressEvent, ProgressTracker, Stage};
pub use timing::DurationHistory;
