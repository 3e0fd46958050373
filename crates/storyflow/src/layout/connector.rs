//! Connector anchors and edge routing hints.
//!
//! An edge leaves and enters its participants at side midpoints. For a plain
//! edge the pair of midpoints with the smallest Euclidean distance wins. A
//! self-loop leaves and re-enters at the right side along a cubic arc. An
//! edge whose reverse is also declared is marked as bidirectional so the
//! renderer can bend the two directions apart.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde::Serialize;

use storyflow_core::{
    geometry::{Bounds, Point},
    identifier::Id,
    story::Edge,
};

/// Horizontal reach of the smallest self-loop arc.
const LOOP_BASE_EXTENT: f32 = 40.0;
/// Extra reach per stacked self-loop on the same participant.
const LOOP_STACK_STEP: f32 = 24.0;

/// Side of a rectangle, in tie-breaking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Midpoint of this side of `bounds`.
    pub fn midpoint(self, bounds: Bounds) -> Point {
        let center = bounds.center();
        match self {
            Side::Top => center.with_y(bounds.min_y()),
            Side::Right => center.with_x(bounds.max_x()),
            Side::Bottom => center.with_y(bounds.max_y()),
            Side::Left => center.with_x(bounds.min_x()),
        }
    }
}

/// A connection point on a participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    side: Side,
    point: Point,
}

impl Anchor {
    pub fn new(side: Side, bounds: Bounds) -> Self {
        Self {
            side,
            point: side.midpoint(bounds),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn point(&self) -> Point {
        self.point
    }
}

/// Picks the closest pair of side midpoints between two rectangles.
///
/// Pure function of the two rectangles. Ties go to the earlier side in
/// [`Side::ALL`], source side first.
///
/// # Examples
///
/// ```
/// # use storyflow::layout::connector::{select_handles, Side};
/// # use storyflow_core::geometry::{Point, Size};
/// let upper = Point::new(0.0, 0.0).to_bounds(Size::new(100.0, 50.0));
/// let lower = Point::new(0.0, 200.0).to_bounds(Size::new(100.0, 50.0));
/// let (source, target) = select_handles(upper, lower);
/// assert_eq!(source.side(), Side::Bottom);
/// assert_eq!(target.side(), Side::Top);
/// ```
pub fn select_handles(source: Bounds, target: Bounds) -> (Anchor, Anchor) {
    let mut best = (Anchor::new(Side::Top, source), Anchor::new(Side::Top, target));
    let mut best_distance = f32::INFINITY;

    for source_side in Side::ALL {
        for target_side in Side::ALL {
            let from = Anchor::new(source_side, source);
            let to = Anchor::new(target_side, target);
            let distance = from.point().distance(to.point());
            if distance < best_distance {
                best_distance = distance;
                best = (from, to);
            }
        }
    }

    best
}

/// Cubic arc of a self-loop, starting and ending at the right anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelfLoop {
    anchor: Point,
    control1: Point,
    control2: Point,
    index: usize,
}

impl SelfLoop {
    /// Builds the arc for the `index`-th self-loop of a participant.
    pub fn new(bounds: Bounds, index: usize) -> Self {
        let anchor = Side::Right.midpoint(bounds);
        let extent =
            LOOP_BASE_EXTENT.max(bounds.width() / 4.0) + index as f32 * LOOP_STACK_STEP;
        let rise = bounds.height() / 2.0 + index as f32 * LOOP_STACK_STEP / 2.0;

        Self {
            anchor,
            control1: Point::new(anchor.x() + extent, anchor.y() - rise),
            control2: Point::new(anchor.x() + extent, anchor.y() + rise),
            index,
        }
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn controls(&self) -> (Point, Point) {
        (self.control1, self.control2)
    }

    /// Stacking index among the participant's self-loops.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Geometry hint for drawing one edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Connector {
    Straight { source: Anchor, target: Anchor },
    SelfLoop(SelfLoop),
}

/// Classification of an edge whose reverse is also declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bidirectional {
    /// `1` for the first-seen direction, `-1` for the reverse one.
    curvature: i8,
    /// Position of the edge among all edges of the pair, in declaration
    /// order.
    index: usize,
}

impl Bidirectional {
    pub fn curvature(&self) -> i8 {
        self.curvature
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Per-edge routing facts that depend only on the declared edge list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingIndex {
    bidirectional: HashMap<Id, Bidirectional>,
    loop_index: HashMap<Id, usize>,
}

impl RoutingIndex {
    /// Detects bidirectional pairs and numbers self-loops per participant.
    pub fn build(edges: &[Edge]) -> Self {
        let keys: HashSet<(Id, Id)> = edges
            .iter()
            .map(|edge| (edge.source(), edge.target()))
            .collect();

        let mut first_direction: HashMap<(Id, Id), (Id, Id)> = HashMap::new();
        let mut pair_counter: HashMap<(Id, Id), usize> = HashMap::new();
        let mut loop_counter: HashMap<Id, usize> = HashMap::new();
        let mut bidirectional = HashMap::new();
        let mut loop_index = HashMap::new();

        for edge in edges {
            let (source, target) = (edge.source(), edge.target());
            if source == target {
                let counter = loop_counter.entry(source).or_default();
                loop_index.insert(edge.id(), *counter);
                *counter += 1;
                continue;
            }
            if !keys.contains(&(target, source)) {
                continue;
            }

            let pair = unordered(source, target);
            let first = *first_direction.entry(pair).or_insert((source, target));
            let counter = pair_counter.entry(pair).or_default();
            bidirectional.insert(
                edge.id(),
                Bidirectional {
                    curvature: if first == (source, target) { 1 } else { -1 },
                    index: *counter,
                },
            );
            *counter += 1;
        }

        debug!(
            bidirectional = bidirectional.len(),
            self_loops = loop_index.len();
            "Indexed edges"
        );

        Self {
            bidirectional,
            loop_index,
        }
    }

    pub fn bidirectional(&self, edge: Id) -> Option<Bidirectional> {
        self.bidirectional.get(&edge).copied()
    }

    pub fn loop_index(&self, edge: Id) -> Option<usize> {
        self.loop_index.get(&edge).copied()
    }
}

fn unordered(a: Id, b: Id) -> (Id, Id) {
    if a.to_string() <= b.to_string() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Computes the connector of `edge` from the endpoint rectangles.
///
/// Returns `None` when an endpoint has no rectangle.
pub fn connect(
    edge: &Edge,
    rect_of: impl Fn(Id) -> Option<Bounds>,
    index: &RoutingIndex,
) -> Option<Connector> {
    let Some(source) = rect_of(edge.source()) else {
        warn!(edge = edge.id().to_string(), participant = edge.source().to_string(); "Edge endpoint has no position");
        return None;
    };
    if edge.is_self_loop() {
        let stack = index.loop_index(edge.id()).unwrap_or(0);
        return Some(Connector::SelfLoop(SelfLoop::new(source, stack)));
    }
    let Some(target) = rect_of(edge.target()) else {
        warn!(edge = edge.id().to_string(), participant = edge.target().to_string(); "Edge endpoint has no position");
        return None;
    };

    let (source, target) = select_handles(source, target);
    Some(Connector::Straight { source, target })
}

#[cfg(test)]
mod tests {
    use storyflow_core::geometry::Size;

    use super::*;

    fn rect(x: f32, y: f32) -> Bounds {
        Point::new(x, y).to_bounds(Size::new(100.0, 50.0))
    }

    #[test]
    fn test_side_midpoints() {
        let bounds = rect(0.0, 0.0);
        assert_eq!(Side::Top.midpoint(bounds), Point::new(0.0, -25.0));
        assert_eq!(Side::Right.midpoint(bounds), Point::new(50.0, 0.0));
        assert_eq!(Side::Bottom.midpoint(bounds), Point::new(0.0, 25.0));
        assert_eq!(Side::Left.midpoint(bounds), Point::new(-50.0, 0.0));
    }

    #[test]
    fn test_horizontal_neighbours() {
        let (source, target) = select_handles(rect(0.0, 0.0), rect(300.0, 0.0));
        assert_eq!(source.side(), Side::Right);
        assert_eq!(target.side(), Side::Left);

        let (source, target) = select_handles(rect(300.0, 0.0), rect(0.0, 0.0));
        assert_eq!(source.side(), Side::Left);
        assert_eq!(target.side(), Side::Right);
    }

    #[test]
    fn test_vertical_neighbours() {
        let (source, target) = select_handles(rect(0.0, 300.0), rect(0.0, 0.0));
        assert_eq!(source.side(), Side::Top);
        assert_eq!(target.side(), Side::Bottom);
    }

    #[test]
    fn test_ties_prefer_earlier_sides() {
        // Identical rectangles: every same-side pair has distance zero.
        let (source, target) = select_handles(rect(0.0, 0.0), rect(0.0, 0.0));
        assert_eq!(source.side(), Side::Top);
        assert_eq!(target.side(), Side::Top);
    }

    #[test]
    fn test_selection_is_pure() {
        let (a, b) = (rect(10.0, 20.0), rect(240.0, 180.0));
        assert_eq!(select_handles(a, b), select_handles(a, b));
    }

    #[test]
    fn test_self_loops_stack() {
        let bounds = rect(0.0, 0.0);
        let first = SelfLoop::new(bounds, 0);
        let second = SelfLoop::new(bounds, 1);

        assert_eq!(first.anchor(), Point::new(50.0, 0.0));
        assert_eq!(first.anchor(), second.anchor());
        assert!(second.controls().0.x() > first.controls().0.x());
        assert!(second.controls().0.y() < first.controls().0.y());
        assert_eq!(second.index(), 1);
    }

    #[test]
    fn test_edge_index() {
        let edges = vec![
            Edge::new("ab", "a", "b"),
            Edge::new("loop1", "a", "a"),
            Edge::new("ba", "b", "a"),
            Edge::new("ab2", "a", "b"),
            Edge::new("bc", "b", "c"),
            Edge::new("loop2", "a", "a"),
        ];
        let index = RoutingIndex::build(&edges);

        let ab = index.bidirectional(Id::new("ab")).unwrap();
        let ba = index.bidirectional(Id::new("ba")).unwrap();
        let ab2 = index.bidirectional(Id::new("ab2")).unwrap();
        assert_eq!((ab.curvature(), ab.index()), (1, 0));
        assert_eq!((ba.curvature(), ba.index()), (-1, 1));
        assert_eq!((ab2.curvature(), ab2.index()), (1, 2));
        assert_eq!(ab.curvature(), -ba.curvature());

        assert_eq!(index.bidirectional(Id::new("bc")), None);
        assert_eq!(index.bidirectional(Id::new("loop1")), None);
        assert_eq!(index.loop_index(Id::new("loop1")), Some(0));
        assert_eq!(index.loop_index(Id::new("loop2")), Some(1));
    }

    #[test]
    fn test_connect_missing_endpoint() {
        let edge = Edge::new("ab", "a", "b");
        let index = RoutingIndex::build(std::slice::from_ref(&edge));
        let rect_of = |id: Id| (id == "a").then(|| rect(0.0, 0.0));
        assert_eq!(connect(&edge, rect_of, &index), None);
    }

    #[test]
    fn test_connect_self_loop() {
        let edge = Edge::new("aa", "a", "a");
        let index = RoutingIndex::build(std::slice::from_ref(&edge));
        let connector = connect(&edge, |_| Some(rect(0.0, 0.0)), &index).unwrap();
        assert!(matches!(connector, Connector::SelfLoop(arc) if arc.index() == 0));
    }
}
