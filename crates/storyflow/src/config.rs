//! Configuration types for Storyflow layout passes.
//!
//! All types implement [`serde::Deserialize`] with defaults for every field,
//! so a partial document (for example a TOML file with only `[zones]`) is a
//! valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and zone settings.
//! - [`LayoutConfig`] - Engine selection, default direction and spacing.
//! - [`ZoneConfig`] - Zone separation and decoration metrics.
//!
//! # Example
//!
//! ```
//! # use storyflow::config::{AppConfig, LayoutEngine};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().engine(), LayoutEngine::Sugiyama);
//! assert_eq!(config.zones().min_gap(), 24.0);
//! ```

use serde::Deserialize;

use storyflow_core::story::Direction;

/// Top-level configuration combining layout and zone settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Zone configuration section.
    #[serde(default)]
    zones: ZoneConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified sections.
    ///
    /// # Arguments
    ///
    /// * `layout` - Engine, direction and spacing settings.
    /// * `zones` - Zone separation and decoration settings.
    pub fn new(layout: LayoutConfig, zones: ZoneConfig) -> Self {
        Self { layout, zones }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the zone configuration.
    pub fn zones(&self) -> &ZoneConfig {
        &self.zones
    }
}

/// Which graph layout collaborator positions nodes inside scenes and scenes
/// inside the story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    /// Crossing-reducing layered layout backed by `rust-sugiyama`.
    #[default]
    Sugiyama,
    /// Deterministic longest-path layering.
    Basic,
}

/// Engine selection, default direction and spacing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    engine: LayoutEngine,
    direction: Direction,
    node_spacing: f32,
    rank_spacing: f32,
    scene_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            engine: LayoutEngine::default(),
            direction: Direction::default(),
            node_spacing: 50.0,
            rank_spacing: 80.0,
            scene_spacing: 120.0,
        }
    }
}

impl LayoutConfig {
    pub fn with_engine(mut self, engine: LayoutEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_node_spacing(mut self, spacing: f32) -> Self {
        self.node_spacing = spacing;
        self
    }

    pub fn with_rank_spacing(mut self, spacing: f32) -> Self {
        self.rank_spacing = spacing;
        self
    }

    pub fn with_scene_spacing(mut self, spacing: f32) -> Self {
        self.scene_spacing = spacing;
        self
    }

    /// Returns the configured [`LayoutEngine`].
    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    /// Direction used when neither the scene nor the story overrides it.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Gap between neighbouring participants within a rank.
    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    /// Gap between consecutive ranks.
    pub fn rank_spacing(&self) -> f32 {
        self.rank_spacing
    }

    /// Gap between scenes in the composed picture.
    pub fn scene_spacing(&self) -> f32 {
        self.scene_spacing
    }
}

/// Zone separation and decoration metrics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    min_gap: f32,
    padding: f32,
    label_height: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            min_gap: 24.0,
            padding: 16.0,
            label_height: 24.0,
        }
    }
}

impl ZoneConfig {
    pub fn with_min_gap(mut self, min_gap: f32) -> Self {
        self.min_gap = min_gap;
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_label_height(mut self, label_height: f32) -> Self {
        self.label_height = label_height;
        self
    }

    /// Minimum clearance between two members of the same zone.
    pub fn min_gap(&self) -> f32 {
        self.min_gap
    }

    /// Margin between the member rectangles and the zone outline.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Extra room above the members for the zone label.
    pub fn label_height(&self) -> f32 {
        self.label_height
    }
}
