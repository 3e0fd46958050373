//! CLI error type with miette diagnostics.
//!
//! Story files that fail to parse carry their source text and the location
//! reported by `serde_json`, so the graphical report handler can point at the
//! offending line.

use std::io;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use storyflow::StoryflowError;

use crate::config::ConfigError;

/// Errors surfaced by [`crate::run`].
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Failed to read {path}")]
    #[diagnostic(code(storyflow::io))]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}")]
    #[diagnostic(code(storyflow::io))]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid story document: {message}")]
    #[diagnostic(
        code(storyflow::story),
        help("Stories are JSON documents with participants, edges and steps")
    )]
    InvalidStory {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error(transparent)]
    #[diagnostic(code(storyflow::config))]
    Config(#[from] ConfigError),

    #[error("Layout failed")]
    #[diagnostic(code(storyflow::layout))]
    Layout {
        #[source]
        source: StoryflowError,
        #[help]
        help: String,
    },

    #[error("Failed to serialize layout")]
    #[diagnostic(code(storyflow::output))]
    Serialize(#[source] serde_json::Error),
}

fn layout_help(err: &StoryflowError) -> String {
    match err {
        StoryflowError::StepOutOfRange { len: 0, .. } => "The story has no steps".to_string(),
        StoryflowError::StepOutOfRange { len, .. } => {
            format!("Choose a step between 0 and {}", len - 1)
        }
        StoryflowError::Layout(_) => "Try `engine = \"basic\"` in the [layout] section".to_string(),
    }
}

impl From<StoryflowError> for CliError {
    fn from(source: StoryflowError) -> Self {
        let help = layout_help(&source);
        Self::Layout { source, help }
    }
}

impl CliError {
    /// Builds an [`CliError::InvalidStory`] pointing at the location of a
    /// `serde_json` error.
    pub fn invalid_story(path: &str, source: String, err: &serde_json::Error) -> Self {
        let offset = byte_offset(&source, err.line(), err.column());
        Self::InvalidStory {
            message: err.to_string(),
            src: NamedSource::new(path, source),
            span: (offset, 0).into(),
        }
    }
}

/// Converts a 1-based line and column into a byte offset into `source`.
fn byte_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_offset() {
        let source = "{\n  \"a\": 1,\n  oops\n}";
        assert_eq!(byte_offset(source, 1, 1), 0);
        assert_eq!(byte_offset(source, 3, 3), 14);
        assert_eq!(byte_offset(source, 99, 99), source.len());
    }

    #[test]
    fn test_invalid_story_carries_location() {
        let source = "{\n  \"participants\": [,]\n}".to_string();
        let err = serde_json::from_str::<serde_json::Value>(&source).unwrap_err();
        let cli_error = CliError::invalid_story("story.json", source, &err);

        assert!(matches!(cli_error, CliError::InvalidStory { .. }));
        assert_eq!(
            cli_error.code().map(|code| code.to_string()),
            Some("storyflow::story".to_string())
        );
    }

    #[test]
    fn test_layout_help() {
        let err = StoryflowError::StepOutOfRange { index: 9, len: 4 };
        assert_eq!(layout_help(&err), "Choose a step between 0 and 3");

        let cli_error = CliError::from(StoryflowError::StepOutOfRange { index: 0, len: 0 });
        assert_eq!(cli_error.to_string(), "Layout failed");
        assert_eq!(
            std::error::Error::source(&cli_error).map(|source| source.to_string()),
            Some("Step index 0 is out of range for a story with 0 steps".to_string())
        );
        assert_eq!(
            cli_error.help().map(|help| help.to_string()),
            Some("The story has no steps".to_string())
        );
    }
}
