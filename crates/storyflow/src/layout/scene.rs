//! Per-scene layout.
//!
//! Each scene is laid out on its own, always from its full declared
//! membership, and the result is expressed in scene-local coordinates whose
//! bounding box starts at the origin.

use std::collections::HashSet;

use log::debug;

use storyflow_core::{geometry::Bounds, identifier::Id, story::Story};

use crate::{
    config::LayoutConfig,
    dimensions::DimensionTable,
    error::StoryflowError,
    layout::{
        engines::{GraphLayouter, LayoutParams, LayoutRequest, Positions},
        normalize,
    },
    partition::SceneAssignment,
};

/// Local layout of one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    id: Id,
    positions: Positions,
    bounds: Bounds,
}

impl SceneLayout {
    pub fn id(&self) -> Id {
        self.id
    }

    /// Member centers in scene-local coordinates.
    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    /// Local bounding box; its minimum corner is the origin.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Builds the layout request for `scene`.
///
/// Only edges with both endpoints in the scene take part, minus self-loops.
/// Zones with at least two members in the scene become grouping hints.
pub fn scene_request(
    scene: &SceneAssignment,
    story: &Story,
    dimensions: &DimensionTable,
    config: &LayoutConfig,
) -> LayoutRequest {
    let spacing = scene.spacing();
    let params = LayoutParams::new(
        scene.direction(),
        spacing.node.unwrap_or(config.node_spacing()),
        spacing.rank.unwrap_or(config.rank_spacing()),
    );

    let mut request = LayoutRequest::new(params);
    for &member in scene.members() {
        request.add_node(member, dimensions.size_or_default(member));
    }

    let members: HashSet<Id> = scene.members().iter().copied().collect();
    for edge in story.edges() {
        if edge.is_self_loop() {
            continue;
        }
        if members.contains(&edge.source()) && members.contains(&edge.target()) {
            request.add_edge(edge.source(), edge.target());
        }
    }

    for zone in story.zones() {
        let inside: Vec<Id> = zone
            .members()
            .iter()
            .copied()
            .filter(|member| members.contains(member))
            .collect();
        request.add_group(inside);
    }

    request
}

/// Lays out `scene` with `layouter`.
///
/// # Errors
///
/// Propagates [`StoryflowError::Layout`] from the layouter.
pub fn layout_scene(
    scene: &SceneAssignment,
    story: &Story,
    dimensions: &DimensionTable,
    config: &LayoutConfig,
    layouter: &dyn GraphLayouter,
) -> Result<SceneLayout, StoryflowError> {
    let request = scene_request(scene, story, dimensions, config);
    let raw = layouter.layout(&request)?;
    let (positions, bounds) = normalize(&raw, |id| dimensions.size_or_default(id));

    debug!(
        scene = scene.id().to_string(),
        members = positions.len(),
        edges = request.edges().len(),
        width = bounds.width(),
        height = bounds.height();
        "Laid out scene"
    );

    Ok(SceneLayout {
        id: scene.id(),
        positions,
        bounds,
    })
}
