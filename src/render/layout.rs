//! Geometry of a rendered bracket.
//!
//! Only round 0 gets a drawn cell. Later rounds are points where connector lines meet;
//! match `j` of round `r + 1` sits at the vertical midpoint of its feeders `2j` and
//! `2j + 1`. Each feeder contributes a horizontal segment (carrying the winner label)
//! that ends on a riser placed [`RISER_OFFSET`] before the child.

use crate::models::TournamentBracket;

pub const CELL_WIDTH: f32 = 260.0;
/// Two stacked player rows.
pub const CELL_HEIGHT: f32 = 72.0;
pub const CELL_GAP: f32 = 24.0;
pub const AVATAR_SIZE: u32 = 28;
/// Horizontal distance between consecutive rounds.
pub const ROUND_SPACING: f32 = 180.0;
pub const RISER_OFFSET: f32 = 24.0;
/// Segment right of the final that carries the champion's label.
pub const FINAL_TAIL: f32 = 170.0;

pub const MARGIN: f32 = 32.0;
pub const TITLE_HEIGHT: f32 = 72.0;
/// Horizontal gap between the main draw and the placement column.
pub const PLACEMENT_GAP: f32 = 64.0;
pub const PLACEMENT_CAPTION: f32 = 34.0;
/// Vertical gap between stacked placement draws.
pub const PLACEMENT_SPACING: f32 = 28.0;
/// Added below 4-player placement draws.
pub const FOUR_PLAYER_EXTRA_GAP: f32 = 24.0;

pub const THUMB_SIZE: f32 = 120.0;
pub const THUMB_GAP: f32 = 16.0;
pub const STRIP_PADDING: f32 = 24.0;
pub const STRIP_CAPTION: f32 = 28.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Position of one match. `left == right` for rounds without a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotPosition {
    pub round: usize,
    pub match_number: usize,
    pub left: f32,
    pub right: f32,
    pub center_y: f32,
    pub has_cell: bool,
}

impl SlotPosition {
    /// Where outgoing connector lines start.
    pub fn exit(&self) -> Point {
        Point::new(self.right, self.center_y)
    }

    pub fn top(&self) -> f32 {
        self.center_y - CELL_HEIGHT / 2.0
    }
}

/// Horizontal segment above which a match winner's name and score are drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WinnerLabel {
    pub round: usize,
    pub match_number: usize,
    pub start: Point,
    pub end: Point,
}

impl WinnerLabel {
    pub fn width(&self) -> f32 {
        self.end.x - self.start.x
    }
}

/// Lines joining the feeders of one match to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    pub child_round: usize,
    pub child_match: usize,
    pub feeders: Vec<Point>,
    pub riser_x: f32,
    pub child: Point,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BracketLayout {
    pub origin: Point,
    pub width: f32,
    pub height: f32,
    pub rounds: Vec<Vec<SlotPosition>>,
    pub connectors: Vec<Connector>,
    pub labels: Vec<WinnerLabel>,
}

fn round_exit_x(origin: Point, round: usize) -> f32 {
    origin.x + CELL_WIDTH + round as f32 * ROUND_SPACING
}

fn evenly(origin: Point, extent: f32, index: usize, count: usize) -> f32 {
    origin.y + (index as f32 + 0.5) * extent / count.max(1) as f32
}

impl BracketLayout {
    /// Lay `bracket` out with its top-left corner at `origin`.
    pub fn compute(bracket: &TournamentBracket, origin: Point) -> Self {
        let Some(first) = bracket.rounds.first() else {
            return Self {
                origin,
                ..Self::default()
            };
        };
        let n0 = first.len().max(1);
        let extent = n0 as f32 * CELL_HEIGHT + (n0 - 1) as f32 * CELL_GAP;

        let mut rounds: Vec<Vec<SlotPosition>> = Vec::with_capacity(bracket.rounds.len());
        rounds.push(
            (0..first.len())
                .map(|i| SlotPosition {
                    round: 0,
                    match_number: i,
                    left: origin.x,
                    right: origin.x + CELL_WIDTH,
                    center_y: evenly(origin, extent, i, n0),
                    has_cell: true,
                })
                .collect(),
        );
        for (r, round) in bracket.rounds.iter().enumerate().skip(1) {
            let x = round_exit_x(origin, r);
            let prev = &rounds[r - 1];
            let slots = (0..round.len())
                .map(|j| {
                    let center_y = match (prev.get(2 * j), prev.get(2 * j + 1)) {
                        (Some(a), Some(b)) => (a.center_y + b.center_y) / 2.0,
                        _ => evenly(origin, extent, j, round.len()),
                    };
                    SlotPosition {
                        round: r,
                        match_number: j,
                        left: x,
                        right: x,
                        center_y,
                        has_cell: false,
                    }
                })
                .collect();
            rounds.push(slots);
        }

        let mut connectors = Vec::new();
        let mut labels = Vec::new();
        for r in 1..rounds.len() {
            for child in &rounds[r] {
                let riser_x = child.left - RISER_OFFSET;
                let feeder_slots: Vec<&SlotPosition> = [2 * child.match_number, 2 * child.match_number + 1]
                    .iter()
                    .filter_map(|i| rounds[r - 1].get(*i))
                    .collect();
                for feeder in &feeder_slots {
                    labels.push(WinnerLabel {
                        round: r - 1,
                        match_number: feeder.match_number,
                        start: feeder.exit(),
                        end: Point::new(riser_x, feeder.center_y),
                    });
                }
                connectors.push(Connector {
                    child_round: r,
                    child_match: child.match_number,
                    feeders: feeder_slots.iter().map(|f| f.exit()).collect(),
                    riser_x,
                    child: Point::new(child.left, child.center_y),
                });
            }
        }

        // The final keeps a trailing segment for the champion.
        let last = rounds.len() - 1;
        if let Some(final_slot) = rounds[last].first() {
            let start = final_slot.exit();
            labels.push(WinnerLabel {
                round: last,
                match_number: final_slot.match_number,
                start,
                end: Point::new(start.x + FINAL_TAIL, start.y),
            });
        }

        Self {
            origin,
            width: CELL_WIDTH + last as f32 * ROUND_SPACING + FINAL_TAIL,
            height: extent,
            rounds,
            connectors,
            labels,
        }
    }

    pub fn slot(&self, round: usize, match_number: usize) -> Option<&SlotPosition> {
        self.rounds.get(round)?.get(match_number)
    }
}

fn thumb_row_width(count: usize) -> f32 {
    count as f32 * THUMB_SIZE + count.saturating_sub(1) as f32 * THUMB_GAP
}

/// A placement draw placed on the canvas, with its caption position.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBracket {
    /// Index into `additional_tournaments`.
    pub index: usize,
    pub caption: Point,
    pub layout: BracketLayout,
}

/// Bottom strip of completed-game thumbnails.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoStrip {
    pub top: f32,
    pub height: f32,
    /// Top-left corner of each thumbnail.
    pub thumbs: Vec<Point>,
    /// Center of the caption shown when there is nothing to display.
    pub caption: Point,
}

/// Everything positioned on the final canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasLayout {
    pub width: u32,
    pub height: u32,
    pub title: Point,
    pub main: BracketLayout,
    pub placements: Vec<PlacedBracket>,
    pub strip: Option<PhotoStrip>,
}

impl CanvasLayout {
    /// Position the main draw, the placement column to its right and, when `photos` is
    /// Some, a photo strip with up to `max_photos` thumbnails.
    pub fn compose(bracket: &TournamentBracket, photos: Option<usize>, max_photos: usize) -> Self {
        let content_top = MARGIN + TITLE_HEIGHT;
        let main = BracketLayout::compute(bracket, Point::new(MARGIN, content_top));

        let column_x = MARGIN + main.width + PLACEMENT_GAP;
        let mut y = content_top;
        let mut column_width: f32 = 0.0;
        let mut placements = Vec::new();
        for (index, sub) in bracket.additional_tournaments.iter().enumerate() {
            let caption = Point::new(column_x, y);
            let layout = BracketLayout::compute(sub, Point::new(column_x, y + PLACEMENT_CAPTION));
            y += PLACEMENT_CAPTION + layout.height + PLACEMENT_SPACING;
            if sub.placement.as_ref().is_some_and(|k| k.is_four_player_draw()) {
                y += FOUR_PLAYER_EXTRA_GAP;
            }
            column_width = column_width.max(layout.width);
            placements.push(PlacedBracket { index, caption, layout });
        }
        let column_height = if placements.is_empty() { 0.0 } else { y - PLACEMENT_SPACING - content_top };

        let mut width = MARGIN + main.width + MARGIN;
        if !placements.is_empty() {
            width += PLACEMENT_GAP + column_width;
        }
        let mut bottom = content_top + main.height.max(column_height) + MARGIN;

        let strip_count = photos.map(|count| count.min(max_photos));
        if let Some(count) = strip_count {
            width = width.max(thumb_row_width(count) + 2.0 * MARGIN);
        }
        let width = width.ceil() as u32;
        let strip = strip_count.map(|count| {
            let height = if count == 0 {
                STRIP_CAPTION + 2.0 * STRIP_PADDING
            } else {
                THUMB_SIZE + 2.0 * STRIP_PADDING
            };
            let top = bottom;
            bottom += height;
            let start_x = (width as f32 - thumb_row_width(count)) / 2.0;
            PhotoStrip {
                top,
                height,
                thumbs: (0..count)
                    .map(|i| Point::new(start_x + i as f32 * (THUMB_SIZE + THUMB_GAP), top + STRIP_PADDING))
                    .collect(),
                caption: Point::new(width as f32 / 2.0, top + height / 2.0),
            }
        });

        Self {
            width,
            height: (bottom + MARGIN).ceil() as u32,
            title: Point::new(width as f32 / 2.0, MARGIN),
            main,
            placements,
            strip,
        }
    }
}
