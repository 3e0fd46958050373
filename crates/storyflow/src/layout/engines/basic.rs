//! Basic layout engine.
//!
//! A small, fully predictable layered layout:
//!
//! 1. Cycles are broken by ignoring the back edges of a depth-first search
//!    started from nodes in declaration order.
//! 2. Each node's rank is the length of the longest path reaching it.
//! 3. Within a rank, nodes are ordered by the barycenter of their
//!    predecessors. Members of a group share the group's key so they stay
//!    adjacent.

use std::collections::{HashMap, HashSet};

use log::debug;
use petgraph::{
    Direction as EdgeDirection,
    algo::toposort,
    graph::{DiGraph, NodeIndex},
    visit::{DfsEvent, depth_first_search},
};

use crate::{
    error::StoryflowError,
    layout::engines::{GraphLayouter, LayoutRequest, Positions, place_ranks},
};

/// Longest-path layered layout on `petgraph`.
#[derive(Debug, Default)]
pub struct Engine {}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    fn acyclic_graph(request: &LayoutRequest) -> DiGraph<usize, ()> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let indices: Vec<NodeIndex> = (0..request.nodes().len())
            .map(|i| graph.add_node(i))
            .collect();
        let edges = request.indexed_edges();
        for &(source, target) in &edges {
            graph.add_edge(indices[source], indices[target], ());
        }

        let mut back_edges: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        depth_first_search(&graph, indices.iter().copied(), |event| {
            if let DfsEvent::BackEdge(u, v) = event {
                back_edges.insert((u, v));
            }
        });

        let mut acyclic: DiGraph<usize, ()> = DiGraph::new();
        for i in 0..request.nodes().len() {
            acyclic.add_node(i);
        }
        for &(source, target) in &edges {
            let (u, v) = (indices[source], indices[target]);
            if !back_edges.contains(&(u, v)) {
                acyclic.add_edge(u, v, ());
            }
        }
        acyclic
    }

    fn rank_nodes(graph: &DiGraph<usize, ()>) -> Result<Vec<usize>, StoryflowError> {
        let order = toposort(graph, None).map_err(|cycle| {
            StoryflowError::Layout(format!(
                "Cycle remained at node {} after removing back edges",
                cycle.node_id().index()
            ))
        })?;

        let mut ranks = vec![0_usize; graph.node_count()];
        for node in order {
            let rank = graph
                .neighbors_directed(node, EdgeDirection::Incoming)
                .map(|pred| ranks[pred.index()] + 1)
                .max()
                .unwrap_or(0);
            ranks[node.index()] = rank;
        }
        Ok(ranks)
    }

    fn order_ranks(
        request: &LayoutRequest,
        graph: &DiGraph<usize, ()>,
        node_ranks: &[usize],
    ) -> Vec<Vec<usize>> {
        let rank_count = node_ranks.iter().max().map_or(0, |max| max + 1);
        let mut ranks: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
        for (node, &rank) in node_ranks.iter().enumerate() {
            ranks[rank].push(node);
        }

        // First group listing a node wins.
        let mut group_of: HashMap<usize, usize> = HashMap::new();
        for (group, members) in request.groups().iter().enumerate() {
            for &member in members {
                if let Some(node) = request.index_of(member) {
                    group_of.entry(node).or_insert(group);
                }
            }
        }

        let mut slot: HashMap<usize, f32> = HashMap::new();
        for rank in &mut ranks {
            let own_key: HashMap<usize, f32> = rank
                .iter()
                .map(|&node| {
                    let slots: Vec<f32> = graph
                        .neighbors_directed(NodeIndex::new(node), EdgeDirection::Incoming)
                        .filter_map(|pred| slot.get(&pred.index()).copied())
                        .collect();
                    let key = if slots.is_empty() {
                        node as f32
                    } else {
                        slots.iter().sum::<f32>() / slots.len() as f32
                    };
                    (node, key)
                })
                .collect();

            let mut group_key: HashMap<usize, f32> = HashMap::new();
            for &node in rank.iter() {
                if let Some(&group) = group_of.get(&node) {
                    let key = own_key[&node];
                    group_key
                        .entry(group)
                        .and_modify(|k| *k = k.min(key))
                        .or_insert(key);
                }
            }

            let sort_key = |node: usize| {
                let own = own_key[&node];
                match group_of.get(&node) {
                    Some(group) => (group_key[group], *group, own, node),
                    None => (own, usize::MAX, own, node),
                }
            };
            rank.sort_by(|&a, &b| {
                let (ka, kb) = (sort_key(a), sort_key(b));
                ka.0.total_cmp(&kb.0)
                    .then(ka.1.cmp(&kb.1))
                    .then(ka.2.total_cmp(&kb.2))
                    .then(ka.3.cmp(&kb.3))
            });

            for (position, &node) in rank.iter().enumerate() {
                slot.insert(node, position as f32);
            }
        }

        ranks
    }
}

impl GraphLayouter for Engine {
    fn layout(&self, request: &LayoutRequest) -> Result<Positions, StoryflowError> {
        let graph = Self::acyclic_graph(request);
        let node_ranks = Self::rank_nodes(&graph)?;
        let ranks = Self::order_ranks(request, &graph, &node_ranks);

        debug!(
            nodes = request.nodes().len(),
            edges = graph.edge_count(),
            ranks = ranks.len();
            "Basic layout"
        );

        place_ranks(request, &ranks)
    }
}
