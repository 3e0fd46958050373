//! The layout pass.
//!
//! A pass turns a story and a step index into a [`LayoutResult`]:
//!
//! 1. project the step into visibility sets
//! 2. measure every participant
//! 3. partition participants into scenes
//! 4. lay out each scene locally with a [`GraphLayouter`]
//! 5. compose the scenes into global coordinates
//! 6. separate zone members
//! 7. keep only what is revealed, then pick connectors and draw boxes
//!
//! Steps 3 to 6 always work on the full story. Only step 7 looks at the
//! projection, which is what keeps a participant at the same coordinates on
//! every step where it is visible.

pub mod compose;
pub mod connector;
pub mod engines;
pub mod scene;
pub mod zone;

use std::collections::HashSet;

use log::{debug, info};
use serde::Serialize;

use storyflow_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    story::Story,
};

use crate::{
    config::AppConfig,
    dimensions::DimensionTable,
    error::StoryflowError,
    nested::{ChildGrid, ChildPlacement},
    partition::ScenePartition,
    projection::{Projection, Visibility},
};

use connector::{Bidirectional, Connector, RoutingIndex};
use engines::{GraphLayouter, Positions};
use zone::ZoneBox;

/// A revealed participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    id: Id,
    center: Point,
    size: Size,
    #[serde(flatten)]
    visibility: Visibility,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ChildPlacement>,
}

impl NodeLayout {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        self.center.to_bounds(self.size)
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Child placements; empty unless the participant is expanded.
    pub fn children(&self) -> &[ChildPlacement] {
        &self.children
    }
}

/// A revealed edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLayout {
    id: Id,
    source: Id,
    target: Id,
    connector: Connector,
    #[serde(skip_serializing_if = "Option::is_none")]
    bidirectional: Option<Bidirectional>,
    #[serde(flatten)]
    visibility: Visibility,
}

impl EdgeLayout {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn connector(&self) -> Connector {
        self.connector
    }

    pub fn bidirectional(&self) -> Option<Bidirectional> {
        self.bidirectional
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}

/// Global bounding box of a scene's revealed members.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneBox {
    id: Id,
    bounds: Bounds,
}

impl SceneBox {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Everything a renderer needs to draw one step.
///
/// All lists follow declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    step: usize,
    nodes: Vec<NodeLayout>,
    edges: Vec<EdgeLayout>,
    zones: Vec<ZoneBox>,
    scenes: Vec<SceneBox>,
}

impl LayoutResult {
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn nodes(&self) -> &[NodeLayout] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeLayout] {
        &self.edges
    }

    pub fn zones(&self) -> &[ZoneBox] {
        &self.zones
    }

    pub fn scenes(&self) -> &[SceneBox] {
        &self.scenes
    }

    pub fn node(&self, id: Id) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: Id) -> Option<&EdgeLayout> {
        self.edges.iter().find(|edge| edge.id == id)
    }
}

/// Translates `positions` so that the bounding box of their rectangles
/// starts at the origin. Returns the moved positions and that box.
pub(crate) fn normalize(
    positions: &Positions,
    size_of: impl Fn(Id) -> Size,
) -> (Positions, Bounds) {
    let Some(bounds) = positions
        .iter()
        .map(|(&id, &center)| center.to_bounds(size_of(id)))
        .reduce(|acc, rect| acc.merge(&rect))
    else {
        return (positions.clone(), Bounds::default());
    };

    let offset = Point::default().sub_point(bounds.min_point());
    let moved = positions
        .iter()
        .map(|(&id, &center)| (id, center.add_point(offset)))
        .collect();
    (moved, bounds.translate(offset))
}

/// Global positions of every participant, before any filtering.
///
/// Depends only on the story, the configuration and the expanded set, never
/// on a step.
///
/// # Errors
///
/// Propagates [`StoryflowError::Layout`] from the layouter.
pub fn position_story(
    story: &Story,
    dimensions: &DimensionTable,
    partition: &ScenePartition,
    config: &AppConfig,
    layouter: &dyn GraphLayouter,
) -> Result<Positions, StoryflowError> {
    let scenes = partition
        .scenes()
        .iter()
        .map(|scene| scene::layout_scene(scene, story, dimensions, config.layout(), layouter))
        .collect::<Result<Vec<_>, _>>()?;

    let mut positions = compose::compose(&scenes, partition, story, config.layout(), layouter)?;
    zone::separate_zones(story.zones(), &mut positions, dimensions, config.zones());
    Ok(positions)
}

/// Runs a full layout pass for `step`.
///
/// Participants in `expanded` that have children are laid out with their
/// child grid.
///
/// # Errors
///
/// Returns [`StoryflowError::StepOutOfRange`] for an invalid step and
/// propagates [`StoryflowError::Layout`] from the layouter.
pub fn layout_story(
    story: &Story,
    step: usize,
    config: &AppConfig,
    layouter: &dyn GraphLayouter,
    expanded: &HashSet<Id>,
) -> Result<LayoutResult, StoryflowError> {
    let projection = Projection::project(story, step)?;

    let dimensions = DimensionTable::build(story, expanded);
    let partition = ScenePartition::partition(story, config.layout().direction());
    let positions = position_story(story, &dimensions, &partition, config, layouter)?;

    let revealed = projection.nodes().revealed();
    let rect_of = |id: Id| {
        positions
            .get(&id)
            .map(|center| center.to_bounds(dimensions.size_or_default(id)))
    };

    let nodes: Vec<NodeLayout> = story
        .participants()
        .iter()
        .filter(|participant| revealed.contains(&participant.id()))
        .filter_map(|participant| {
            let id = participant.id();
            let center = *positions.get(&id)?;
            let size = dimensions.size_or_default(id);
            let children = if expanded.contains(&id) {
                ChildGrid::arrange(participant, crate::dimensions::dimensions(participant))
                    .into_placements()
            } else {
                Vec::new()
            };
            Some(NodeLayout {
                id,
                center,
                size,
                visibility: projection.nodes().visibility(id),
                children,
            })
        })
        .collect();

    let routing = RoutingIndex::build(story.edges());
    let edges: Vec<EdgeLayout> = story
        .edges()
        .iter()
        .filter(|edge| projection.is_edge_visible(edge.id()))
        .filter_map(|edge| {
            let connector = connector::connect(edge, rect_of, &routing)?;
            Some(EdgeLayout {
                id: edge.id(),
                source: edge.source(),
                target: edge.target(),
                connector,
                bidirectional: routing.bidirectional(edge.id()),
                visibility: projection.edges().visibility(edge.id()),
            })
        })
        .collect();

    let zones = zone::zone_boxes(story.zones(), &positions, revealed, &dimensions, config.zones());

    let scenes: Vec<SceneBox> = partition
        .scenes()
        .iter()
        .filter_map(|scene| {
            let bounds = scene
                .members()
                .iter()
                .filter(|id| revealed.contains(*id))
                .filter_map(|&id| rect_of(id))
                .reduce(|acc, rect| acc.merge(&rect))?;
            Some(SceneBox {
                id: scene.id(),
                bounds,
            })
        })
        .collect();

    debug!(
        scenes = partition.len(),
        positioned = positions.len();
        "Positioned story"
    );
    info!(
        step = step,
        nodes = nodes.len(),
        edges = edges.len(),
        zones = zones.len();
        "Layout pass complete"
    );

    Ok(LayoutResult {
        step,
        nodes,
        edges,
        zones,
        scenes,
    })
}
