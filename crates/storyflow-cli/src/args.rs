//! Command-line argument definitions for the Storyflow CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the story file, the step to lay out, the
//! participants to expand, configuration and logging.

use clap::Parser;

use storyflow::story::Direction;

/// Command-line arguments for the Storyflow layout inspector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input story (JSON)
    #[arg(help = "Path to the story file")]
    pub input: String,

    /// Step index to lay out
    #[arg(short, long, default_value_t = 0)]
    pub step: usize,

    /// Participant to expand; may be repeated
    #[arg(short, long = "expand", value_name = "ID")]
    pub expand: Vec<String>,

    /// Path to the output JSON file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Default flow direction (TB, BT, LR, RL); scenes and stories that set
    /// their own direction keep it
    #[arg(short, long, value_name = "DIR")]
    pub direction: Option<Direction>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::parse_from([
            "storyflow",
            "story.json",
            "--step",
            "3",
            "--expand",
            "platform",
            "-e",
            "billing",
            "-o",
            "out.json",
            "--direction",
            "LR",
            "--log-level",
            "debug",
        ]);

        assert_eq!(args.input, "story.json");
        assert_eq!(args.step, 3);
        assert_eq!(args.expand, vec!["platform", "billing"]);
        assert_eq!(args.output.as_deref(), Some("out.json"));
        assert_eq!(args.direction, Some(Direction::LeftToRight));
        assert_eq!(args.config, None);
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["storyflow", "story.json"]);
        assert_eq!(args.step, 0);
        assert!(args.expand.is_empty());
        assert_eq!(args.output, None);
        assert_eq!(args.direction, None);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_rejects_unknown_direction() {
        let result = Args::try_parse_from(["storyflow", "story.json", "-d", "sideways"]);
        assert!(result.is_err());
    }
}
