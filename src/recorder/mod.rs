//! Recorder Module
//!
//! Call accounting and replayable call history for traced operations.

mod call_recorder;
mod replay;

pub use call_recorder::CallRecorder;
pub use replay::{Replay, ReplayEngine, ReplayEntry};
