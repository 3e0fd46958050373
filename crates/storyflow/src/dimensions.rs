//! Participant dimension resolution.
//!
//! Sizes are derived, never stored on the story: a per-type base table gives
//! the minimum box, the label text widens it, and tag pills add rows.
//! Text is measured with a display-width estimate (`unicode-width` columns ×
//! an average glyph width), which keeps the result independent of installed
//! fonts and therefore deterministic.
//!
//! A [`DimensionTable`] is built once at the start of a layout pass and
//! passed by reference to every later stage.

use std::collections::{HashMap, HashSet};

use log::{trace, warn};
use unicode_width::UnicodeWidthStr;

use storyflow_core::{
    geometry::Size,
    identifier::Id,
    story::{Participant, ParticipantKind, ParticipantType, Story},
};

use crate::nested;

/// Fallback rectangle for ids that have no entry in the table.
pub const DEFAULT_SIZE: Size = Size::new(160.0, 80.0);

const NAME_GLYPH_WIDTH: f32 = 8.0;
const TECHNOLOGY_GLYPH_WIDTH: f32 = 6.5;
const LABEL_PADDING: f32 = 32.0;
const ICON_ALLOWANCE: f32 = 28.0;

const PILL_WIDTH: f32 = 64.0;
const PILL_ROW_HEIGHT: f32 = 26.0;
const MAX_VISIBLE_TAGS: usize = 6;

const QUEUE_BADGE_ALLOWANCE: f32 = 56.0;

fn primary_base(participant_type: ParticipantType) -> (f32, f32) {
    match participant_type {
        ParticipantType::Actor => (120.0, 100.0),
        ParticipantType::Client => (160.0, 80.0),
        ParticipantType::Gateway | ParticipantType::Service => (180.0, 80.0),
        ParticipantType::Function => (160.0, 72.0),
        ParticipantType::Database => (160.0, 96.0),
        ParticipantType::Cache => (150.0, 80.0),
        ParticipantType::Storage => (160.0, 90.0),
        ParticipantType::External => (170.0, 80.0),
        ParticipantType::State => (140.0, 56.0),
        ParticipantType::Queue | ParticipantType::Topic | ParticipantType::Stream => (180.0, 64.0),
        ParticipantType::Generic => (160.0, 80.0),
    }
}

fn queue_base(participant_type: ParticipantType) -> (f32, f32) {
    match participant_type {
        ParticipantType::Stream => (220.0, 56.0),
        _ => (200.0, 56.0),
    }
}

fn text_width(text: &str, glyph_width: f32) -> f32 {
    text.width() as f32 * glyph_width
}

/// Number of pill rows needed to show `tag_count` tags in `available` width.
fn pill_rows(tag_count: usize, available: f32) -> usize {
    let visible = tag_count.min(MAX_VISIBLE_TAGS);
    if visible == 0 {
        return 0;
    }
    let per_row = ((available / PILL_WIDTH).floor() as usize).max(1);
    visible.div_ceil(per_row)
}

fn primary_dimensions(participant: &Participant) -> Size {
    let (base_width, base_height) = primary_base(participant.participant_type());

    let name_width = text_width(participant.name(), NAME_GLYPH_WIDTH);
    let technology_width = participant
        .technology()
        .map(|tech| text_width(tech, TECHNOLOGY_GLYPH_WIDTH))
        .unwrap_or_default();
    let width = base_width.max(name_width.max(technology_width) + LABEL_PADDING + ICON_ALLOWANCE);

    let rows = pill_rows(participant.tags().len(), width - LABEL_PADDING);
    Size::new(width, base_height + rows as f32 * PILL_ROW_HEIGHT)
}

/// Queue-like participants render name, broker and tags on one line.
fn queue_dimensions(participant: &Participant) -> Size {
    let (base_width, base_height) = queue_base(participant.participant_type());

    let name_width = text_width(participant.name(), NAME_GLYPH_WIDTH);
    let broker_width = participant
        .technology()
        .map(|broker| text_width(broker, TECHNOLOGY_GLYPH_WIDTH) + QUEUE_BADGE_ALLOWANCE)
        .unwrap_or_default();

    Size::new(
        base_width.max(name_width + broker_width + LABEL_PADDING),
        base_height,
    )
}

/// Rendered size of a collapsed participant.
///
/// # Examples
///
/// ```
/// # use storyflow::dimensions::dimensions;
/// # use storyflow_core::story::{Participant, ParticipantType};
/// let db = Participant::new("db", "Orders DB").with_type(ParticipantType::Database);
/// let size = dimensions(&db);
/// assert_eq!(size.width(), 160.0);
/// assert_eq!(size.height(), 96.0);
/// ```
pub fn dimensions(participant: &Participant) -> Size {
    match participant.kind() {
        ParticipantKind::Primary => primary_dimensions(participant),
        ParticipantKind::Queue => queue_dimensions(participant),
    }
}

/// Per-pass lookup table of participant sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionTable {
    sizes: HashMap<Id, Size>,
}

impl DimensionTable {
    /// Measures every top-level participant of `story`.
    ///
    /// Participants listed in `expanded` that have children are grown to
    /// fit their child grid.
    pub fn build(story: &Story, expanded: &HashSet<Id>) -> Self {
        let sizes = story
            .participants()
            .iter()
            .map(|participant| {
                let mut size = dimensions(participant);
                if expanded.contains(&participant.id()) && !participant.children().is_empty() {
                    size = nested::expanded_size(participant, size);
                }
                trace!(
                    participant = participant.id().to_string(),
                    width = size.width(),
                    height = size.height();
                    "Resolved participant dimensions"
                );
                (participant.id(), size)
            })
            .collect();

        Self { sizes }
    }

    /// Creates a table from explicit sizes.
    pub fn from_sizes(sizes: impl IntoIterator<Item = (Id, Size)>) -> Self {
        Self {
            sizes: sizes.into_iter().collect(),
        }
    }

    pub fn get(&self, id: Id) -> Option<Size> {
        self.sizes.get(&id).copied()
    }

    /// Size of `id`, or [`DEFAULT_SIZE`] when the id was never measured.
    pub fn size_or_default(&self, id: Id) -> Size {
        self.get(id).unwrap_or_else(|| {
            warn!(participant = id.to_string(); "Missing dimensions, using default rectangle");
            DEFAULT_SIZE
        })
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
