//! Step projection.
//!
//! Folds the ordered step list of a [`Story`] up to a target index into four
//! visibility sets for participants and for edges:
//!
//! - `revealed`: shown at or before the target step
//! - `completed`: touched by a step strictly before the target step
//! - `active`: touched by the target step itself
//! - `new`: revealed at the target step for the first time
//!
//! Node sets absorb the endpoints of every edge in the matching edge set, so
//! an edge can never be visible while one of its endpoints is hidden.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use serde::Serialize;

use storyflow_core::{identifier::Id, story::Story};

use crate::error::StoryflowError;

/// Per-entity flags handed to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub active: bool,
    pub completed: bool,
    pub new: bool,
}

/// The four visibility sets for one entity family (nodes or edges).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySets {
    revealed: HashSet<Id>,
    active: HashSet<Id>,
    completed: HashSet<Id>,
    new: HashSet<Id>,
}

impl VisibilitySets {
    pub fn revealed(&self) -> &HashSet<Id> {
        &self.revealed
    }

    pub fn active(&self) -> &HashSet<Id> {
        &self.active
    }

    pub fn completed(&self) -> &HashSet<Id> {
        &self.completed
    }

    pub fn new_ids(&self) -> &HashSet<Id> {
        &self.new
    }

    pub fn is_revealed(&self, id: Id) -> bool {
        self.revealed.contains(&id)
    }

    /// Flags for a single entity; all false when the entity is hidden.
    pub fn visibility(&self, id: Id) -> Visibility {
        Visibility {
            active: self.active.contains(&id),
            completed: self.completed.contains(&id),
            new: self.new.contains(&id),
        }
    }

    /// Records one touch of `id` by step `step` while projecting `target`.
    fn touch(&mut self, id: Id, step: usize, target: usize) {
        self.revealed.insert(id);
        if step < target {
            self.completed.insert(id);
        }
        if step == target {
            self.active.insert(id);
        }
    }
}

/// Visibility of every node and edge at one step index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    step: usize,
    nodes: VisibilitySets,
    edges: VisibilitySets,
}

impl Projection {
    /// Projects `story` at step `index`.
    ///
    /// This is a pure function of `(story, index)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryflowError::StepOutOfRange`] when `index` is not in
    /// `0..story.step_count()`.
    pub fn project(story: &Story, index: usize) -> Result<Self, StoryflowError> {
        let len = story.step_count();
        if index >= len {
            return Err(StoryflowError::StepOutOfRange { index, len });
        }

        let endpoints: HashMap<Id, (Id, Id)> = story
            .edges()
            .iter()
            .map(|edge| (edge.id(), (edge.source(), edge.target())))
            .collect();

        let mut nodes = VisibilitySets::default();
        let mut edges = VisibilitySets::default();
        let mut nodes_before = HashSet::new();
        let mut edges_before = HashSet::new();

        for (j, step) in story.steps()[..=index].iter().enumerate() {
            if j == index {
                nodes_before = nodes.revealed.clone();
                edges_before = edges.revealed.clone();
            }

            for &edge_id in step.active().iter().chain(step.reveal_edges()) {
                edges.touch(edge_id, j, index);
                match endpoints.get(&edge_id) {
                    Some(&(source, target)) => {
                        nodes.touch(source, j, index);
                        nodes.touch(target, j, index);
                    }
                    None => trace!(edge = edge_id.to_string(), step = j; "Step references unknown edge"),
                }
            }

            for &node_id in step.reveal_nodes() {
                nodes.touch(node_id, j, index);
            }
        }

        nodes.new = nodes.revealed.difference(&nodes_before).copied().collect();
        edges.new = edges.revealed.difference(&edges_before).copied().collect();

        debug!(
            step = index,
            revealed_nodes = nodes.revealed.len(),
            revealed_edges = edges.revealed.len(),
            new_nodes = nodes.new.len();
            "Projected story step"
        );

        Ok(Self {
            step: index,
            nodes,
            edges,
        })
    }

    /// The projected step index.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn nodes(&self) -> &VisibilitySets {
        &self.nodes
    }

    pub fn edges(&self) -> &VisibilitySets {
        &self.edges
    }

    pub fn is_node_visible(&self, id: Id) -> bool {
        self.nodes.is_revealed(id)
    }

    pub fn is_edge_visible(&self, id: Id) -> bool {
        self.edges.is_revealed(id)
    }
}

#[cfg(test)]
mod tests {
    use storyflow_core::story::{Edge, Participant, Step};

    use super::*;

    fn ids(names: &[&str]) -> HashSet<Id> {
        names.iter().map(|name| Id::new(name)).collect()
    }

    fn chain_story() -> Story {
        Story::new(
            vec![
                Participant::new("A", "A"),
                Participant::new("B", "B"),
                Participant::new("C", "C"),
            ],
            vec![Edge::new("ab", "A", "B"), Edge::new("bc", "B", "C")],
            vec![
                Step::default().with_revealed_nodes(["A"]),
                Step::new(["ab"]).with_revealed_nodes(["B", "C"]),
                Step::new(["bc"]),
            ],
        )
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let story = chain_story();
        let err = Projection::project(&story, 3).unwrap_err();
        assert!(matches!(
            err,
            StoryflowError::StepOutOfRange { index: 3, len: 3 }
        ));

        let empty = Story::default();
        assert!(Projection::project(&empty, 0).is_err());
    }

    #[test]
    fn test_first_step() {
        let story = chain_story();
        let projection = Projection::project(&story, 0).unwrap();

        assert_eq!(projection.nodes().revealed(), &ids(&["A"]));
        assert_eq!(projection.nodes().active(), &ids(&["A"]));
        assert!(projection.nodes().completed().is_empty());
        assert_eq!(projection.nodes().new_ids(), &ids(&["A"]));
        assert!(projection.edges().revealed().is_empty());
    }

    #[test]
    fn test_active_edge_reveals_endpoints() {
        let story = chain_story();
        let projection = Projection::project(&story, 1).unwrap();

        assert_eq!(projection.edges().active(), &ids(&["ab"]));
        assert_eq!(projection.edges().new_ids(), &ids(&["ab"]));
        assert_eq!(projection.nodes().revealed(), &ids(&["A", "B", "C"]));
        assert_eq!(projection.nodes().new_ids(), &ids(&["B", "C"]));
        assert_eq!(projection.nodes().completed(), &ids(&["A"]));
        assert!(projection.nodes().visibility(Id::new("A")).active);
    }

    #[test]
    fn test_late_step_marks_completed() {
        let story = chain_story();
        let projection = Projection::project(&story, 2).unwrap();

        assert!(projection.edges().completed().contains(&Id::new("ab")));
        assert_eq!(projection.edges().active(), &ids(&["bc"]));
        assert!(projection.nodes().new_ids().is_empty());
        assert_eq!(projection.edges().new_ids(), &ids(&["bc"]));

        let flags = projection.edges().visibility(Id::new("ab"));
        assert_eq!(
            flags,
            Visibility {
                active: false,
                completed: true,
                new: false
            }
        );
    }

    #[test]
    fn test_explicit_edge_reveal() {
        let story = Story::new(
            vec![Participant::new("A", "A"), Participant::new("B", "B")],
            vec![Edge::new("ab", "A", "B")],
            vec![Step::default().with_revealed_edges(["ab"]), Step::default()],
        );

        let projection = Projection::project(&story, 1).unwrap();
        assert!(projection.is_edge_visible(Id::new("ab")));
        assert!(projection.is_node_visible(Id::new("B")));
        assert!(projection.edges().active().is_empty());
        assert!(projection.edges().new_ids().is_empty());
    }

    #[test]
    fn test_projection_is_pure() {
        let story = chain_story();
        for index in 0..story.step_count() {
            let first = Projection::project(&story, index).unwrap();
            let second = Projection::project(&story, index).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.step(), index);
        }
    }
}
