//! Sugiyama layout engine.
//!
//! Uses the `rust-sugiyama` crate for layer assignment and crossing
//! reduction. Its raw coordinates ignore node sizes, so only the ranking is
//! kept: distinct `y` values become ranks and `x` values give the order
//! inside a rank. [`place_ranks`] then turns that ranking into sized
//! coordinates.

use std::{
    collections::{BTreeMap, HashSet},
    panic,
};

use log::{debug, trace};
use rust_sugiyama::configure::Config;

use crate::{
    error::StoryflowError,
    layout::engines::{GraphLayouter, LayoutRequest, Positions, place_ranks},
};

/// Raw `y` coordinates are bucketed at this resolution before ranking.
const RANK_RESOLUTION: f64 = 1000.0;

/// Layered layout backed by `rust-sugiyama`.
#[derive(Debug, Default)]
pub struct Engine {}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranks of one connected component, top rank first.
    fn component_ranks(
        coords: &[(usize, (f64, f64))],
        edges: &[(usize, usize)],
    ) -> Vec<Vec<usize>> {
        let mut buckets: BTreeMap<i64, Vec<(f64, usize)>> = BTreeMap::new();
        for &(node, (x, y)) in coords {
            let key = (y * RANK_RESOLUTION).round() as i64;
            buckets.entry(key).or_default().push((x, node));
        }

        let mut ranks: Vec<Vec<usize>> = buckets
            .into_values()
            .map(|mut rank| {
                rank.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                rank.into_iter().map(|(_, node)| node).collect()
            })
            .collect();

        // The crate's y axis may grow either way; orient ranks so that most
        // edges point from a lower to a higher rank.
        let rank_of = |node: usize| ranks.iter().position(|rank| rank.contains(&node));
        let (mut forward, mut backward) = (0_usize, 0_usize);
        for &(source, target) in edges {
            match (rank_of(source), rank_of(target)) {
                (Some(s), Some(t)) if s < t => forward += 1,
                (Some(s), Some(t)) if s > t => backward += 1,
                _ => {}
            }
        }
        if backward > forward {
            ranks.reverse();
        }

        ranks
    }
}

impl GraphLayouter for Engine {
    fn layout(&self, request: &LayoutRequest) -> Result<Positions, StoryflowError> {
        let indexed = request.indexed_edges();

        let mut ranks: Vec<Vec<usize>> = Vec::new();
        let mut ranked: HashSet<usize> = HashSet::new();

        if !indexed.is_empty() {
            let edges: Vec<(u32, u32)> = indexed
                .iter()
                .map(|&(s, t)| (s as u32, t as u32))
                .collect();

            let layouts = panic::catch_unwind(move || {
                let config = Config {
                    minimum_length: 1,
                    vertex_spacing: 3.0,
                    ..Default::default()
                };
                rust_sugiyama::from_edges(&edges, &config)
            })
            .map_err(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                StoryflowError::Layout(format!("rust-sugiyama failed: {reason}"))
            })?;

            // Components are merged rank by rank, ordered by their first
            // declared node so the result does not depend on the crate's
            // component order.
            let mut components: Vec<Vec<Vec<usize>>> = layouts
                .iter()
                .map(|(coords, _, _)| Self::component_ranks(coords, &indexed))
                .filter(|component| !component.is_empty())
                .collect();
            components.sort_by_key(|component| component.iter().flatten().min().copied());

            trace!(components = components.len(); "Sugiyama components");

            for component in components {
                for (depth, rank) in component.into_iter().enumerate() {
                    if ranks.len() <= depth {
                        ranks.resize_with(depth + 1, Vec::new);
                    }
                    for node in rank {
                        if ranked.insert(node) {
                            ranks[depth].push(node);
                        }
                    }
                }
            }
        }

        // Disconnected nodes join the first rank after the connected ones.
        let isolated: Vec<usize> = (0..request.nodes().len())
            .filter(|node| !ranked.contains(node))
            .collect();
        if !isolated.is_empty() {
            if ranks.is_empty() {
                ranks.push(Vec::new());
            }
            ranks[0].extend(isolated);
        }

        debug!(
            nodes = request.nodes().len(),
            edges = indexed.len(),
            ranks = ranks.len();
            "Sugiyama layout"
        );

        place_ranks(request, &ranks)
    }
}
