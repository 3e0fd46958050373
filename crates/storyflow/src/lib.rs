//! Storyflow - progressive multi-scene layout for architecture stories.
//!
//! A story is a graph of participants and edges plus an ordered list of
//! steps. Each step reveals a little more of the graph. This crate computes,
//! for any step, where every revealed participant sits, how every revealed
//! edge attaches, and where zone and scene backdrops go, while keeping each
//! participant at the same coordinates on every step where it is visible.

pub mod config;
pub mod dimensions;
pub mod layout;
pub mod nested;
pub mod partition;
pub mod projection;

mod error;

pub use storyflow_core::{geometry, identifier, story};

pub use error::StoryflowError;

use std::collections::HashSet;

use log::info;

use config::AppConfig;
use identifier::Id;
use layout::{
    LayoutResult,
    engines::{self, GraphLayouter},
};
use projection::Projection;
use story::Story;

/// Entry point for running layout passes.
///
/// # Examples
///
/// ```
/// use storyflow::{
///     LayoutBuilder,
///     config::AppConfig,
///     story::{Edge, Participant, Step, Story},
/// };
///
/// let story = Story::new(
///     vec![Participant::new("web", "Web"), Participant::new("api", "API")],
///     vec![Edge::new("call", "web", "api")],
///     vec![Step::default().with_revealed_nodes(["web"]), Step::new(["call"])],
/// );
///
/// let builder = LayoutBuilder::new(AppConfig::default());
/// let first = builder.layout(&story, 0).expect("Failed to lay out step 0");
/// let second = builder.layout(&story, 1).expect("Failed to lay out step 1");
///
/// assert_eq!(first.nodes().len(), 1);
/// assert_eq!(second.nodes().len(), 2);
/// assert_eq!(first.nodes()[0].center(), second.nodes()[0].center());
/// ```
pub struct LayoutBuilder {
    config: AppConfig,
    layouter: Box<dyn GraphLayouter>,
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl LayoutBuilder {
    /// Creates a builder using the engine selected in `config`.
    pub fn new(config: AppConfig) -> Self {
        let layouter = engines::build_engine(config.layout().engine());
        Self { config, layouter }
    }

    /// Replaces the graph layout collaborator.
    pub fn with_layouter(mut self, layouter: Box<dyn GraphLayouter>) -> Self {
        self.layouter = layouter;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Visibility sets of `story` at `step`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryflowError::StepOutOfRange`] for an invalid step.
    pub fn project(&self, story: &Story, step: usize) -> Result<Projection, StoryflowError> {
        Projection::project(story, step)
    }

    /// Lays out `story` at `step` with every participant collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`StoryflowError::StepOutOfRange`] for an invalid step and
    /// [`StoryflowError::Layout`] when the layout engine fails.
    pub fn layout(&self, story: &Story, step: usize) -> Result<LayoutResult, StoryflowError> {
        self.layout_expanded(story, step, &HashSet::new())
    }

    /// Lays out `story` at `step`, expanding the participants in `expanded`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::layout`].
    pub fn layout_expanded(
        &self,
        story: &Story,
        step: usize,
        expanded: &HashSet<Id>,
    ) -> Result<LayoutResult, StoryflowError> {
        info!(
            step = step,
            steps = story.step_count(),
            participants = story.participants().len(),
            expanded = expanded.len();
            "Laying out story"
        );

        layout::layout_story(story, step, &self.config, self.layouter.as_ref(), expanded)
    }
}
