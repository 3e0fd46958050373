//! Expanded nested participants.
//!
//! An expanded participant shows its children in a near-square grid below a
//! header band carrying the parent's own label. The parent box grows to fit
//! the grid; each child is reported as an offset from the parent center so
//! it moves with the parent.

use serde::Serialize;

use storyflow_core::{
    geometry::{Insets, Point, Size},
    identifier::Id,
    story::Participant,
};

use crate::dimensions::dimensions;

const CHILD_GAP: f32 = 16.0;
const CHILD_PADDING: f32 = 20.0;
const HEADER_HEIGHT: f32 = 44.0;

/// Position of one child inside its expanded parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChildPlacement {
    id: Id,
    offset: Point,
    size: Size,
}

impl ChildPlacement {
    pub fn id(&self) -> Id {
        self.id
    }

    /// Offset of the child center from the parent center.
    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Grid arrangement of a participant's children.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildGrid {
    size: Size,
    placements: Vec<ChildPlacement>,
}

impl ChildGrid {
    /// Arranges the children of `parent`, whose collapsed size is `collapsed`.
    pub fn arrange(parent: &Participant, collapsed: Size) -> Self {
        let children = parent.children();
        if children.is_empty() {
            return Self {
                size: collapsed,
                placements: Vec::new(),
            };
        }

        let count = children.len();
        let columns = (count as f32).sqrt().ceil() as usize;
        let rows = count.div_ceil(columns);

        let cell = children
            .iter()
            .map(dimensions)
            .fold(Size::default(), Size::max);

        let content = Size::new(
            columns as f32 * cell.width() + (columns - 1) as f32 * CHILD_GAP,
            rows as f32 * cell.height() + (rows - 1) as f32 * CHILD_GAP,
        );
        let insets = Insets::uniform(CHILD_PADDING).with_top(HEADER_HEIGHT);
        let size = content.add_padding(insets).max(collapsed);

        let content_left = -size.width() / 2.0 + (size.width() - content.width()) / 2.0;
        let content_top = -size.height() / 2.0 + insets.top();

        let placements = children
            .iter()
            .enumerate()
            .map(|(index, child)| {
                let row = index / columns;
                let column = index % columns;
                let offset = Point::new(
                    content_left
                        + column as f32 * (cell.width() + CHILD_GAP)
                        + cell.width() / 2.0,
                    content_top + row as f32 * (cell.height() + CHILD_GAP) + cell.height() / 2.0,
                );
                ChildPlacement {
                    id: child.id(),
                    offset,
                    size: dimensions(child),
                }
            })
            .collect();

        Self { size, placements }
    }

    /// Size of the expanded parent.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn placements(&self) -> &[ChildPlacement] {
        &self.placements
    }

    pub fn into_placements(self) -> Vec<ChildPlacement> {
        self.placements
    }
}

/// Size of `parent` when expanded.
pub fn expanded_size(parent: &Participant, collapsed: Size) -> Size {
    ChildGrid::arrange(parent, collapsed).size()
}
