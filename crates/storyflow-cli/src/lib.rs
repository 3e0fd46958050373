//! CLI logic for the Storyflow layout inspector.
//!
//! Reads a story document, lays out one step and writes the resulting
//! [`storyflow::layout::LayoutResult`] as JSON.

pub mod error;

mod args;
mod config;

pub use args::Args;
pub use error::CliError;

use std::{collections::HashSet, fs};

use log::{debug, info};

use storyflow::{LayoutBuilder, config::AppConfig, identifier::Id, story::Story};

/// Run the Storyflow CLI application
///
/// This function loads the story named by `args.input`, lays out the
/// requested step and writes the layout as pretty-printed JSON to the output
/// file, or to stdout when no output path is given.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Story documents that are not valid JSON stories
/// - Layout errors, including an out-of-range step
/// - Serialization errors
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        step = args.step;
        "Processing story"
    );

    // Load configuration
    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(direction) = args.direction {
        info!(direction = direction.to_string(); "Overriding default layout direction");
        app_config = AppConfig::new(
            app_config.layout().clone().with_direction(direction),
            app_config.zones().clone(),
        );
    }

    // Read input file
    let source = fs::read_to_string(&args.input).map_err(|source| CliError::Read {
        path: args.input.clone(),
        source,
    })?;

    let story: Story = match serde_json::from_str(&source) {
        Ok(story) => story,
        Err(err) => return Err(CliError::invalid_story(&args.input, source, &err)),
    };
    debug!(
        participants = story.participants().len(),
        edges = story.edges().len(),
        steps = story.step_count();
        "Story loaded"
    );

    let expanded: HashSet<Id> = args.expand.iter().map(|name| Id::new(name)).collect();

    // Lay out the requested step
    let builder = LayoutBuilder::new(app_config);
    let result = builder.layout_expanded(&story, args.step, &expanded)?;

    let json = serde_json::to_string_pretty(&result).map_err(CliError::Serialize)?;

    match &args.output {
        Some(path) => {
            fs::write(path, json).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            info!(output_file = path; "Layout exported successfully");
        }
        None => println!("{json}"),
    }

    Ok(())
}
