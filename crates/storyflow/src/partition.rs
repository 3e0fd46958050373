//! Scene partitioning.
//!
//! Every participant of a story belongs to exactly one scene. Declared scenes
//! claim their members in declaration order; whatever is left over lands in
//! one implicit default scene. The partition is always computed over the
//! full participant set, never the revealed subset, so scene membership does
//! not change while stepping through a story.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use storyflow_core::{
    identifier::Id,
    story::{Direction, Spacing, Story},
};

/// Id of the implicit catch-all scene.
pub const DEFAULT_SCENE_ID: &str = "__default";

/// One scene with its resolved members and layout parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAssignment {
    id: Id,
    direction: Direction,
    spacing: Spacing,
    members: Vec<Id>,
    implicit: bool,
}

impl SceneAssignment {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Spacing overrides of the scene merged over the story-level ones.
    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[Id] {
        &self.members
    }

    /// True for the implicit default scene.
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }
}

/// A strict partition of a story's participants into scenes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenePartition {
    scenes: Vec<SceneAssignment>,
    owners: HashMap<Id, usize>,
}

impl ScenePartition {
    /// Partitions the participants of `story`.
    ///
    /// Members that are not participants of the story are ignored. A member
    /// listed by several scenes stays with the first scene that lists it.
    /// `default_direction` is used when neither the scene nor the story
    /// sets a direction.
    pub fn partition(story: &Story, default_direction: Direction) -> Self {
        let overrides = story.layout();
        let story_direction = overrides.direction.unwrap_or(default_direction);

        let known: HashSet<Id> = story.participants().iter().map(|p| p.id()).collect();
        let mut owners: HashMap<Id, usize> = HashMap::new();
        let mut scenes: Vec<SceneAssignment> = Vec::new();

        for scene in story.scenes() {
            let index = scenes.len();
            let mut members = Vec::new();

            for &member in scene.members() {
                if !known.contains(&member) {
                    debug!(scene = scene.id().to_string(), member = member.to_string(); "Ignoring unknown scene member");
                    continue;
                }
                if let Some(&owner) = owners.get(&member) {
                    if owner != index {
                        let owner_id = scenes
                            .get(owner)
                            .map(|s| s.id.to_string())
                            .unwrap_or_default();
                        warn!(
                            scene = scene.id().to_string(),
                            member = member.to_string(),
                            owner = owner_id;
                            "Participant already claimed by an earlier scene"
                        );
                    }
                    continue;
                }
                owners.insert(member, index);
                members.push(member);
            }

            if members.is_empty() {
                debug!(scene = scene.id().to_string(); "Skipping scene without members");
                continue;
            }

            scenes.push(SceneAssignment {
                id: scene.id(),
                direction: scene.direction().unwrap_or(story_direction),
                spacing: merge_spacing(scene.spacing(), overrides.spacing),
                members,
                implicit: false,
            });
        }

        let unclaimed: Vec<Id> = story
            .participants()
            .iter()
            .map(|p| p.id())
            .filter(|id| !owners.contains_key(id))
            .collect();

        if !unclaimed.is_empty() {
            let index = scenes.len();
            for &id in &unclaimed {
                owners.insert(id, index);
            }
            scenes.push(SceneAssignment {
                id: Id::new(DEFAULT_SCENE_ID),
                direction: story_direction,
                spacing: overrides.spacing,
                members: unclaimed,
                implicit: true,
            });
        }

        debug!(
            scenes = scenes.len(),
            participants = owners.len();
            "Partitioned story into scenes"
        );

        Self { scenes, owners }
    }

    pub fn scenes(&self) -> &[SceneAssignment] {
        &self.scenes
    }

    /// Index into [`Self::scenes`] of the scene owning `participant`.
    pub fn scene_of(&self, participant: Id) -> Option<usize> {
        self.owners.get(&participant).copied()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

fn merge_spacing(scene: Spacing, story: Spacing) -> Spacing {
    Spacing {
        node: scene.node.or(story.node),
        rank: scene.rank.or(story.rank),
    }
}
