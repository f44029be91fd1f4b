//! Presentation-side effects module
//!
//! This module contains side effects the engine triggers but does not own,
//! such as the completion cue.

pub mod cue;

// Re-export main types
pub use cue::{CompletionCue, Note, TerminalBell, CHIME};
