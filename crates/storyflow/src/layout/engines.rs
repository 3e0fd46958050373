//! Graph layout engines.
//!
//! Both the per-scene pass and the scene composition pass talk to a layered
//! graph layout algorithm through one narrow interface, [`GraphLayouter`]:
//! nodes with sizes, directed edges, a direction and spacing go in; node
//! centers come out. Two implementations ship with the crate:
//!
//! - [`sugiyama::Engine`]: crossing-reducing layout backed by `rust-sugiyama`
//! - [`basic::Engine`]: deterministic longest-path layering on `petgraph`
//!
//! Engines only decide *ranks* and the *order within each rank*; turning
//! that ranking into sized coordinates is shared by [`place_ranks`], so both
//! engines respect participant dimensions the same way.

pub mod basic;
pub mod sugiyama;

use std::collections::HashMap;

use indexmap::IndexMap;
use log::trace;

use storyflow_core::{
    geometry::{Point, Size},
    identifier::Id,
    story::Direction,
};

use crate::{config::LayoutEngine, error::StoryflowError};

/// Node centers returned by a [`GraphLayouter`], in request node order.
pub type Positions = IndexMap<Id, Point>;

/// A node submitted to a layout engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutNode {
    id: Id,
    size: Size,
}

impl LayoutNode {
    pub fn new(id: Id, size: Size) -> Self {
        Self { id, size }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Direction and spacing of one layout request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    direction: Direction,
    node_spacing: f32,
    rank_spacing: f32,
}

impl LayoutParams {
    pub fn new(direction: Direction, node_spacing: f32, rank_spacing: f32) -> Self {
        Self {
            direction,
            node_spacing,
            rank_spacing,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn rank_spacing(&self) -> f32 {
        self.rank_spacing
    }
}

/// Input of a [`GraphLayouter`].
///
/// Edges never contain self-loops or duplicates: [`LayoutRequest::add_edge`]
/// drops both.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    params: LayoutParams,
    nodes: Vec<LayoutNode>,
    edges: Vec<(Id, Id)>,
    groups: Vec<Vec<Id>>,
    index: HashMap<Id, usize>,
}

impl LayoutRequest {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            params,
            nodes: Vec::new(),
            edges: Vec::new(),
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds a node; a second node with the same id is ignored.
    pub fn add_node(&mut self, id: Id, size: Size) {
        if self.index.contains_key(&id) {
            return;
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(LayoutNode::new(id, size));
    }

    /// Adds a directed edge between two nodes of the request.
    ///
    /// Self-loops, duplicates and edges touching unknown nodes are dropped.
    /// Returns whether the edge was added.
    pub fn add_edge(&mut self, source: Id, target: Id) -> bool {
        if source == target
            || !self.index.contains_key(&source)
            || !self.index.contains_key(&target)
            || self.edges.contains(&(source, target))
        {
            return false;
        }
        self.edges.push((source, target));
        true
    }

    /// Adds a grouping hint: engines that support it keep these nodes
    /// adjacent within a rank.
    pub fn add_group(&mut self, members: Vec<Id>) {
        let members: Vec<Id> = members
            .into_iter()
            .filter(|id| self.index.contains_key(id))
            .collect();
        if members.len() >= 2 {
            self.groups.push(members);
        }
    }

    pub fn params(&self) -> LayoutParams {
        self.params
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(Id, Id)] {
        &self.edges
    }

    pub fn groups(&self) -> &[Vec<Id>] {
        &self.groups
    }

    /// Position of `id` in [`Self::nodes`].
    pub fn index_of(&self, id: Id) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn size_of(&self, id: Id) -> Option<Size> {
        self.index_of(id).map(|i| self.nodes[i].size)
    }

    /// Edges as pairs of node indices.
    pub(crate) fn indexed_edges(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter_map(|(s, t)| Some((self.index_of(*s)?, self.index_of(*t)?)))
            .collect()
    }
}

/// A layered graph layout algorithm.
///
/// Implementations must be deterministic: the same request always yields
/// the same positions.
pub trait GraphLayouter {
    /// Computes node centers for `request`.
    ///
    /// The returned map contains every node of the request.
    ///
    /// # Errors
    ///
    /// Returns [`StoryflowError::Layout`] when the algorithm fails.
    fn layout(&self, request: &LayoutRequest) -> Result<Positions, StoryflowError>;
}

/// Creates the engine selected by `engine`.
pub fn build_engine(engine: LayoutEngine) -> Box<dyn GraphLayouter> {
    match engine {
        LayoutEngine::Sugiyama => Box::new(sugiyama::Engine::new()),
        LayoutEngine::Basic => Box::new(basic::Engine::new()),
    }
}

/// Converts a ranking into sized coordinates.
///
/// `ranks[r]` lists node indices of rank `r` in their cross-axis order. Each
/// rank is as thick as its largest node along the flow axis and is centered
/// on the cross axis; ranks are separated by the rank spacing and nodes by
/// the node spacing.
pub(crate) fn place_ranks(
    request: &LayoutRequest,
    ranks: &[Vec<usize>],
) -> Result<Positions, StoryflowError> {
    let params = request.params();
    let horizontal = params.direction().is_horizontal();
    let sign = if params.direction().is_reversed() {
        -1.0
    } else {
        1.0
    };

    let flow_extent = |size: Size| if horizontal { size.width() } else { size.height() };
    let cross_extent = |size: Size| if horizontal { size.height() } else { size.width() };

    let mut placed: HashMap<usize, Point> = HashMap::new();
    let mut flow_cursor = 0.0_f32;

    for rank in ranks {
        if rank.is_empty() {
            continue;
        }
        let sizes: Vec<Size> = rank.iter().map(|&i| request.nodes()[i].size()).collect();

        let thickness = sizes.iter().copied().map(flow_extent).fold(0.0, f32::max);
        let span = sizes.iter().copied().map(cross_extent).sum::<f32>()
            + (rank.len() - 1) as f32 * params.node_spacing();

        let flow = sign * (flow_cursor + thickness / 2.0);
        let mut cross_cursor = -span / 2.0;

        for (&node, size) in rank.iter().zip(sizes) {
            let cross = cross_cursor + cross_extent(size) / 2.0;
            cross_cursor += cross_extent(size) + params.node_spacing();

            let point = if horizontal {
                Point::new(flow, cross)
            } else {
                Point::new(cross, flow)
            };
            placed.insert(node, point);
        }

        flow_cursor += thickness + params.rank_spacing();
    }

    request
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let point = placed.get(&i).copied().ok_or_else(|| {
                StoryflowError::Layout(format!("Node `{}` was not assigned a rank", node.id()))
            })?;
            trace!(node = node.id().to_string(), x = point.x(), y = point.y(); "Placed node");
            Ok((node.id(), point))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(direction: Direction) -> LayoutRequest {
        let mut request = LayoutRequest::new(LayoutParams::new(direction, 10.0, 20.0));
        request.add_node(Id::new("a"), Size::new(100.0, 40.0));
        request.add_node(Id::new("b"), Size::new(60.0, 60.0));
        request.add_node(Id::new("c"), Size::new(80.0, 20.0));
        request
    }

    #[test]
    fn test_request_drops_self_loops_and_duplicates() {
        let mut request = request(Direction::TopToBottom);
        let (a, b) = (Id::new("a"), Id::new("b"));

        assert!(request.add_edge(a, b));
        assert!(!request.add_edge(a, b));
        assert!(!request.add_edge(a, a));
        assert!(!request.add_edge(a, Id::new("ghost")));
        assert_eq!(request.edges(), &[(a, b)]);
        assert_eq!(request.indexed_edges(), vec![(0, 1)]);
    }

    #[test]
    fn test_request_groups_need_two_known_members() {
        let mut request = request(Direction::TopToBottom);
        request.add_group(vec![Id::new("a"), Id::new("ghost")]);
        request.add_group(vec![Id::new("a"), Id::new("c")]);
        assert_eq!(request.groups(), &[vec![Id::new("a"), Id::new("c")]]);
    }

    #[test]
    fn test_place_ranks_top_to_bottom() {
        let request = request(Direction::TopToBottom);
        let positions = place_ranks(&request, &[vec![0], vec![1, 2]]).unwrap();

        // Rank 0 is 40 tall; rank 1 is 60 tall and starts after 20 spacing.
        assert_eq!(positions[&Id::new("a")], Point::new(0.0, 20.0));
        // Rank 1 spans 60 + 10 + 80 = 150 centered on x = 0.
        assert_eq!(positions[&Id::new("b")], Point::new(-45.0, 90.0));
        assert_eq!(positions[&Id::new("c")], Point::new(35.0, 90.0));
    }

    #[test]
    fn test_place_ranks_left_to_right() {
        let request = request(Direction::LeftToRight);
        let positions = place_ranks(&request, &[vec![0], vec![1, 2]]).unwrap();
        let (a, b) = (positions[&Id::new("a")], positions[&Id::new("b")]);

        // Rank 0 is 100 wide; rank 1 is 80 wide and starts after 20 spacing.
        assert_eq!(a, Point::new(50.0, 0.0));
        assert_eq!(b.x(), 160.0);
        assert!(b.y() < positions[&Id::new("c")].y());
    }

    #[test]
    fn test_place_ranks_reversed() {
        let request = request(Direction::BottomToTop);
        let positions = place_ranks(&request, &[vec![0], vec![1, 2]]).unwrap();
        assert_eq!(positions[&Id::new("a")].y(), -20.0);
        assert_eq!(positions[&Id::new("b")].y(), -90.0);
    }

    #[test]
    fn test_place_ranks_requires_every_node() {
        let request = request(Direction::TopToBottom);
        assert!(place_ranks(&request, &[vec![0, 1]]).is_err());
    }

    #[test]
    fn test_positions_follow_request_order() {
        let request = request(Direction::TopToBottom);
        let positions = place_ranks(&request, &[vec![2, 1, 0]]).unwrap();
        let order: Vec<Id> = positions.keys().copied().collect();
        assert_eq!(order, vec![Id::new("a"), Id::new("b"), Id::new("c")]);
    }
}
