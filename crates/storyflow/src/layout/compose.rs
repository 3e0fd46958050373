//! Scene composition.
//!
//! Scenes are treated as nodes of a meta-graph sized to their local bounding
//! boxes and connected by the cross-scene edges of the story. The meta-graph
//! is laid out top to bottom with the same [`GraphLayouter`], and each scene's
//! members are shifted by the offset between its meta position and its local
//! center.

use log::{debug, trace};

use storyflow_core::{
    geometry::{Point, Size},
    identifier::Id,
    story::{Direction, Story},
};

use crate::{
    config::LayoutConfig,
    error::StoryflowError,
    layout::{
        engines::{GraphLayouter, LayoutParams, LayoutRequest, Positions},
        normalize,
        scene::SceneLayout,
    },
    partition::ScenePartition,
};

/// Builds the meta-graph request for `scenes`.
///
/// Meta edges are the distinct `(source scene, target scene)` pairs of the
/// story's cross-scene edges, in first-seen order.
pub fn meta_request(
    scenes: &[SceneLayout],
    partition: &ScenePartition,
    story: &Story,
    config: &LayoutConfig,
) -> LayoutRequest {
    let params = LayoutParams::new(
        Direction::TopToBottom,
        config.node_spacing(),
        config.scene_spacing(),
    );
    let mut request = LayoutRequest::new(params);
    for scene in scenes {
        request.add_node(scene.id(), scene.bounds().to_size());
    }

    let scene_id = |participant: Id| {
        partition
            .scene_of(participant)
            .and_then(|index| scenes.get(index))
            .map(SceneLayout::id)
    };
    for edge in story.edges() {
        match (scene_id(edge.source()), scene_id(edge.target())) {
            (Some(source), Some(target)) if source != target => {
                request.add_edge(source, target);
            }
            _ => {}
        }
    }

    request
}

/// Places every scene and returns global centers for all participants.
///
/// `scenes` must be in partition order.
///
/// # Errors
///
/// Propagates [`StoryflowError::Layout`] from the layouter.
pub fn compose(
    scenes: &[SceneLayout],
    partition: &ScenePartition,
    story: &Story,
    config: &LayoutConfig,
    layouter: &dyn GraphLayouter,
) -> Result<Positions, StoryflowError> {
    let request = meta_request(scenes, partition, story, config);
    let raw = layouter.layout(&request)?;
    let size_of = |id: Id| request.size_of(id).unwrap_or(Size::default());
    let (meta, _) = normalize(&raw, size_of);

    let mut global = Positions::new();
    for scene in scenes {
        let center = meta.get(&scene.id()).copied().ok_or_else(|| {
            StoryflowError::Layout(format!("Scene `{}` missing from composition", scene.id()))
        })?;
        let offset = scene_offset(center, scene);
        trace!(
            scene = scene.id().to_string(),
            dx = offset.x(),
            dy = offset.y();
            "Scene offset"
        );

        for (&id, &local) in scene.positions() {
            global.insert(id, local.add_point(offset));
        }
    }

    // Keep participant declaration order regardless of scene order.
    let mut ordered = Positions::with_capacity(global.len());
    for participant in story.participants() {
        if let Some(point) = global.get(&participant.id()) {
            ordered.insert(participant.id(), *point);
        }
    }

    debug!(
        scenes = scenes.len(),
        meta_edges = request.edges().len(),
        participants = ordered.len();
        "Composed scenes"
    );

    Ok(ordered)
}

/// Translation moving a scene's local center onto its meta-graph center.
pub fn scene_offset(meta_center: Point, scene: &SceneLayout) -> Point {
    meta_center.sub_point(scene.bounds().center())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use storyflow_core::story::{Edge, Participant, Scene};

    use super::*;
    use crate::{
        dimensions::DimensionTable,
        layout::{engines::basic, scene::layout_scene},
    };

    fn story() -> Story {
        Story::new(
            vec![
                Participant::new("a", "A"),
                Participant::new("b", "B"),
                Participant::new("c", "C"),
                Participant::new("d", "D"),
            ],
            vec![
                Edge::new("ab", "a", "b"),
                Edge::new("bc", "b", "c"),
                Edge::new("ac", "a", "c"),
                Edge::new("cd", "c", "d"),
                Edge::new("db", "d", "b"),
            ],
            vec![],
        )
        .with_scenes(vec![Scene::new("s1", ["a", "b"]), Scene::new("s2", ["c", "d"])])
    }

    fn scene_layouts(story: &Story, partition: &ScenePartition) -> Vec<SceneLayout> {
        let dimensions = DimensionTable::build(story, &HashSet::new());
        partition
            .scenes()
            .iter()
            .map(|scene| {
                layout_scene(
                    scene,
                    story,
                    &dimensions,
                    &LayoutConfig::default(),
                    &basic::Engine::new(),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_meta_edges_are_distinct_and_ordered() {
        let story = story();
        let partition = ScenePartition::partition(&story, Direction::TopToBottom);
        let scenes = scene_layouts(&story, &partition);

        let request = meta_request(&scenes, &partition, &story, &LayoutConfig::default());
        assert_eq!(
            request.edges(),
            &[
                (Id::new("s1"), Id::new("s2")),
                (Id::new("s2"), Id::new("s1"))
            ]
        );
        assert_eq!(request.params().rank_spacing(), 120.0);
    }

    #[test]
    fn test_single_scene_has_zero_offset() {
        let story = Story::new(
            vec![Participant::new("a", "A"), Participant::new("b", "B")],
            vec![Edge::new("ab", "a", "b")],
            vec![],
        );
        let partition = ScenePartition::partition(&story, Direction::TopToBottom);
        let scenes = scene_layouts(&story, &partition);

        let global = compose(
            &scenes,
            &partition,
            &story,
            &LayoutConfig::default(),
            &basic::Engine::new(),
        )
        .unwrap();

        assert_eq!(&global, scenes[0].positions());
    }

    #[test]
    fn test_scenes_are_stacked_without_overlap() {
        let story = story();
        let partition = ScenePartition::partition(&story, Direction::TopToBottom);
        let scenes = scene_layouts(&story, &partition);

        let global = compose(
            &scenes,
            &partition,
            &story,
            &LayoutConfig::default(),
            &basic::Engine::new(),
        )
        .unwrap();

        let order: Vec<Id> = global.keys().copied().collect();
        assert_eq!(
            order,
            vec![Id::new("a"), Id::new("b"), Id::new("c"), Id::new("d")]
        );

        // Scene s1 sits above s2 with at least the scene spacing in between.
        let s1_bottom = global[&Id::new("b")].y() + 40.0;
        let s2_top = global[&Id::new("c")].y() - 40.0;
        assert!(s2_top - s1_bottom >= 120.0 - 0.001);
    }

    #[test]
    fn test_relative_positions_survive_composition() {
        let story = story();
        let partition = ScenePartition::partition(&story, Direction::TopToBottom);
        let scenes = scene_layouts(&story, &partition);
        let global = compose(
            &scenes,
            &partition,
            &story,
            &LayoutConfig::default(),
            &basic::Engine::new(),
        )
        .unwrap();

        let local = scenes[1].positions();
        let local_delta = local[&Id::new("d")].sub_point(local[&Id::new("c")]);
        let global_delta = global[&Id::new("d")].sub_point(global[&Id::new("c")]);
        assert_eq!(local_delta, global_delta);
    }

    #[test]
    fn test_scene_offset() {
        let story = story();
        let partition = ScenePartition::partition(&story, Direction::TopToBottom);
        let scenes = scene_layouts(&story, &partition);
        let center = scenes[0].bounds().center();
        assert_eq!(scene_offset(center, &scenes[0]), Point::default());
    }
}
