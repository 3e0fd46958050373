//! Error types for Storyflow operations.
//!
//! This module provides the main error type [`StoryflowError`] which wraps
//! the error conditions a layout pass can surface.

use thiserror::Error;

/// The main error type for Storyflow operations.
///
/// Degraded inputs (missing dimensions, disconnected participants, zones with
/// nothing revealed) are absorbed by the pipeline and never reach this type.
#[derive(Debug, Error)]
pub enum StoryflowError {
    #[error("Step index {index} is out of range for a story with {len} steps")]
    StepOutOfRange { index: usize, len: usize },

    #[error("Layout error: {0}")]
    Layout(String),
}
