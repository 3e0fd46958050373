//! Zone separation and zone boxes.
//!
//! Members of a zone are nudged apart so that no two of them are closer than
//! the configured minimum gap, then each zone gets a padded bounding box with
//! room for its label on top.
//!
//! Separation runs on the full positioned set so that a participant's
//! coordinates never depend on which step is being shown; boxes are drawn
//! around the revealed members only.

use std::collections::HashSet;

use log::{debug, trace};
use serde::Serialize;

use storyflow_core::{
    geometry::{Bounds, Insets},
    identifier::Id,
    story::Zone,
};

use crate::{config::ZoneConfig, dimensions::DimensionTable, layout::engines::Positions};

/// Decorated bounding box of one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneBox {
    id: Id,
    label: String,
    bounds: Bounds,
}

impl ZoneBox {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Pushes zone members apart so that neighbouring rectangles keep `min_gap`.
///
/// Every unordered pair of positioned members is visited once, in
/// declaration order. A single pass settles two-member zones exactly; with
/// three or more members a later pair may push a member back towards one it
/// was already separated from. The vertical check comes first; the horizontal check
/// then sees the updated rectangles. Each member of an offending pair moves
/// by half the deficit, the upper (or left) one up (or left); on a tie the
/// first member of the pair takes that role.
pub fn separate_zones(
    zones: &[Zone],
    positions: &mut Positions,
    dimensions: &DimensionTable,
    config: &ZoneConfig,
) {
    let min_gap = config.min_gap();
    let mut moves = 0_usize;

    for zone in zones {
        let members: Vec<Id> = zone
            .members()
            .iter()
            .copied()
            .filter(|id| positions.contains_key(id))
            .collect();
        if members.len() < 2 {
            continue;
        }

        for (i, &first) in members.iter().enumerate() {
            for &second in &members[i + 1..] {
                if first == second {
                    continue;
                }
                let rect = |positions: &Positions, id: Id| {
                    positions[&id].to_bounds(dimensions.size_or_default(id))
                };

                let (a, b) = (rect(positions, first), rect(positions, second));
                let gap = a.vertical_gap(&b);
                if a.overlaps_horizontally(&b) && gap < min_gap {
                    let half = (min_gap - gap) / 2.0;
                    let (upper, lower) = if a.center().y() <= b.center().y() {
                        (first, second)
                    } else {
                        (second, first)
                    };
                    shift(positions, upper, 0.0, -half);
                    shift(positions, lower, 0.0, half);
                    moves += 1;
                    trace!(
                        zone = zone.id().to_string(),
                        upper = upper.to_string(),
                        lower = lower.to_string(),
                        shift = half;
                        "Separated zone members vertically"
                    );
                }

                let (a, b) = (rect(positions, first), rect(positions, second));
                let gap = a.horizontal_gap(&b);
                if a.overlaps_vertically(&b) && gap < min_gap {
                    let half = (min_gap - gap) / 2.0;
                    let (left, right) = if a.center().x() <= b.center().x() {
                        (first, second)
                    } else {
                        (second, first)
                    };
                    shift(positions, left, -half, 0.0);
                    shift(positions, right, half, 0.0);
                    moves += 1;
                    trace!(
                        zone = zone.id().to_string(),
                        left = left.to_string(),
                        right = right.to_string(),
                        shift = half;
                        "Separated zone members horizontally"
                    );
                }
            }
        }
    }

    debug!(zones = zones.len(), moves = moves; "Resolved zone separation");
}

fn shift(positions: &mut Positions, id: Id, dx: f32, dy: f32) {
    if let Some(point) = positions.get_mut(&id) {
        *point = point.with_x(point.x() + dx).with_y(point.y() + dy);
    }
}

/// Padded boxes around the revealed members of each zone.
///
/// Zones without a revealed, positioned member are skipped.
pub fn zone_boxes(
    zones: &[Zone],
    positions: &Positions,
    revealed: &HashSet<Id>,
    dimensions: &DimensionTable,
    config: &ZoneConfig,
) -> Vec<ZoneBox> {
    let insets =
        Insets::uniform(config.padding()).with_top(config.padding() + config.label_height());

    zones
        .iter()
        .filter_map(|zone| {
            let bounds = zone
                .members()
                .iter()
                .filter(|id| revealed.contains(*id))
                .filter_map(|&id| {
                    positions
                        .get(&id)
                        .map(|center| center.to_bounds(dimensions.size_or_default(id)))
                })
                .reduce(|acc, rect| acc.merge(&rect))?;

            Some(ZoneBox {
                id: zone.id(),
                label: zone.label().to_string(),
                bounds: bounds.add_padding(insets),
            })
        })
        .collect()
}
