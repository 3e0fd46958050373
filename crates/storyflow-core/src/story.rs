//! The story document model.
//!
//! A [`Story`] is the already-validated input of the layout pipeline:
//! participants, the directed edges between them, an ordered list of
//! [`Step`]s, and optional [`Scene`] partitions and decorative [`Zone`]s.
//!
//! Every type derives [`serde::Deserialize`] so an outer loader can build a
//! story from any serde format. The model performs no semantic validation;
//! dangling edge endpoints and similar mistakes are the loader's
//! responsibility.
//!
//! # Example
//!
//! ```
//! # use storyflow_core::story::{Edge, Participant, Step, Story};
//! let story = Story::new(
//!     vec![Participant::new("web", "Web App"), Participant::new("api", "API")],
//!     vec![Edge::new("web-api", "web", "api")],
//!     vec![Step::new(["web-api"])],
//! );
//!
//! assert_eq!(story.step_count(), 1);
//! assert!(story.participant("api".into()).is_some());
//! ```

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifier::Id;

/// Coarse participant kind.
///
/// Queue-like participants (queues, topics, streams) are measured with a
/// distinct rule from primary participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    #[default]
    Primary,
    Queue,
}

/// Semantic type tag of a participant; drives its default size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantType {
    Actor,
    Client,
    Gateway,
    Service,
    Function,
    Database,
    Cache,
    Storage,
    External,
    State,
    Queue,
    Topic,
    Stream,
    #[default]
    #[serde(other)]
    Generic,
}

/// A node of the story graph.
#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    id: Id,
    name: String,
    #[serde(default)]
    kind: ParticipantKind,
    #[serde(default, rename = "type")]
    participant_type: ParticipantType,
    #[serde(default)]
    technology: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    #[serde(default)]
    children: Vec<Participant>,
}

impl Participant {
    /// Creates a primary participant of generic type.
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ParticipantKind::default(),
            participant_type: ParticipantType::default(),
            technology: None,
            tags: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ParticipantKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_type(mut self, participant_type: ParticipantType) -> Self {
        self.participant_type = participant_type;
        self
    }

    /// Sets the technology label (or broker name for queue-like participants).
    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Participant>) -> Self {
        self.children = children;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParticipantKind {
        self.kind
    }

    pub fn participant_type(&self) -> ParticipantType {
        self.participant_type
    }

    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Nested participants shown when this participant is expanded.
    pub fn children(&self) -> &[Participant] {
        &self.children
    }
}

/// Semantic subtype of an edge.
///
/// Calls are `sync`, `async`, `publish` or `subscribe`; state transitions are
/// `trigger`, `guard` or `action`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Sync,
    Async,
    Publish,
    Subscribe,
    Trigger,
    Guard,
    Action,
}

/// A directed call or transition between two participants.
///
/// `source == target` is allowed and denotes a self-loop.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge {
    id: Id,
    source: Id,
    target: Id,
    #[serde(default)]
    kind: EdgeKind,
    #[serde(default)]
    label: Option<String>,
}

impl Edge {
    /// Creates a synchronous call edge.
    pub fn new(id: impl Into<Id>, source: impl Into<Id>, target: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::default(),
            label: None,
        }
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// One element of the ordered step list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Step {
    #[serde(default)]
    active: Vec<Id>,
    #[serde(default)]
    reveal_nodes: Vec<Id>,
    #[serde(default)]
    reveal_edges: Vec<Id>,
}

impl Step {
    /// Creates a step activating the given edge ids.
    pub fn new<I, T>(active: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Id>,
    {
        Self {
            active: active.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Explicitly reveals participants that have no active edge yet.
    pub fn with_revealed_nodes<I, T>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Id>,
    {
        self.reveal_nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    /// Explicitly reveals edges without activating them.
    pub fn with_revealed_edges<I, T>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Id>,
    {
        self.reveal_edges = edges.into_iter().map(Into::into).collect();
        self
    }

    pub fn active(&self) -> &[Id] {
        &self.active
    }

    pub fn reveal_nodes(&self) -> &[Id] {
        &self.reveal_nodes
    }

    pub fn reveal_edges(&self) -> &[Id] {
        &self.reveal_edges
    }
}

/// Error returned when a layout direction string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid layout direction `{0}`, expected one of TB, BT, LR, RL")]
pub struct ParseDirectionError(String);

/// Flow direction of a layered layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Direction {
    /// Top to bottom
    #[default]
    #[serde(rename = "TB", alias = "TD")]
    TopToBottom,
    /// Bottom to top
    #[serde(rename = "BT")]
    BottomToTop,
    /// Left to right
    #[serde(rename = "LR")]
    LeftToRight,
    /// Right to left
    #[serde(rename = "RL")]
    RightToLeft,
}

impl Direction {
    /// Returns true when ranks advance along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    /// Returns true when ranks advance towards negative coordinates.
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::BottomToTop | Self::RightToLeft)
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TB" | "TD" => Ok(Self::TopToBottom),
            "BT" => Ok(Self::BottomToTop),
            "LR" => Ok(Self::LeftToRight),
            "RL" => Ok(Self::RightToLeft),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TopToBottom => "TB",
            Self::BottomToTop => "BT",
            Self::LeftToRight => "LR",
            Self::RightToLeft => "RL",
        };
        f.write_str(s)
    }
}

/// Optional spacing overrides; unset values fall back to the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Spacing {
    /// Gap between neighbours within a rank.
    #[serde(default)]
    pub node: Option<f32>,
    /// Gap between consecutive ranks.
    #[serde(default)]
    pub rank: Option<f32>,
}

/// A named layout partition.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    id: Id,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default)]
    spacing: Spacing,
    #[serde(default)]
    members: Vec<Id>,
}

impl Scene {
    pub fn new<I, T>(id: impl Into<Id>, members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Id>,
    {
        Self {
            id: id.into(),
            direction: None,
            spacing: Spacing::default(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Declared members, in declaration order.
    pub fn members(&self) -> &[Id] {
        &self.members
    }
}

/// A purely decorative grouping of participants.
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    id: Id,
    #[serde(default)]
    label: String,
    #[serde(default)]
    members: Vec<Id>,
}

impl Zone {
    pub fn new<I, T>(id: impl Into<Id>, label: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Id>,
    {
        Self {
            id: id.into(),
            label: label.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn members(&self) -> &[Id] {
        &self.members
    }
}

/// Story-wide layout overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct LayoutOverrides {
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub spacing: Spacing,
}

/// A validated story document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Story {
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default)]
    edges: Vec<Edge>,
    #[serde(default)]
    steps: Vec<Step>,
    #[serde(default)]
    scenes: Vec<Scene>,
    #[serde(default)]
    zones: Vec<Zone>,
    #[serde(default)]
    layout: LayoutOverrides,
}

impl Story {
    pub fn new(participants: Vec<Participant>, edges: Vec<Edge>, steps: Vec<Step>) -> Self {
        Self {
            participants,
            edges,
            steps,
            ..Self::default()
        }
    }

    pub fn with_scenes(mut self, scenes: Vec<Scene>) -> Self {
        self.scenes = scenes;
        self
    }

    pub fn with_zones(mut self, zones: Vec<Zone>) -> Self {
        self.zones = zones;
        self
    }

    pub fn with_layout(mut self, layout: LayoutOverrides) -> Self {
        self.layout = layout;
        self
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Looks up a top-level participant by id.
    pub fn participant(&self, id: Id) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn layout(&self) -> LayoutOverrides {
        self.layout
    }
}
