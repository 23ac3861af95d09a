/// Gallery layout engine
///
/// Pure geometry, no rendering:
/// - `template.rs` - slot templates and column counts per breakpoint
/// - `plan.rs` - key normalization and slot assignment for an item list
/// - `grid.rs` - auto-placement of planned cells into pixel rectangles

pub mod grid;
pub mod plan;
pub mod template;

use serde::{Deserialize, Serialize};

use crate::state::data::AspectRatio;

pub use grid::{place, GridPlacement};
pub use plan::{plan, CellKey, PlannedCell};
pub use template::{columns_for_width, slot_for, HIGHLIGHT_TEMPLATE};

/// How a gallery arranges its items
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Uniform grid, 2/3/4 columns per breakpoint
    #[default]
    Simple,
    /// Repeating 12-column mosaic
    Highlight,
}

impl LayoutMode {
    pub fn toggled(self) -> Self {
        match self {
            LayoutMode::Simple => LayoutMode::Highlight,
            LayoutMode::Highlight => LayoutMode::Simple,
        }
    }
}

/// Geometry of one slot: spans on the column grid plus the default ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGeometry {
    pub column_span: usize,
    pub row_span: usize,
    pub aspect_ratio: AspectRatio,
}

impl SlotGeometry {
    pub const fn new(column_span: usize, row_span: usize, aspect_ratio: AspectRatio) -> Self {
        Self {
            column_span,
            row_span,
            aspect_ratio,
        }
    }
}

/// Axis-aligned rectangle in gallery coordinates (origin at the grid's top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Overlapping region, if any (touching edges count as a zero-size overlap)
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < x || bottom < y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }
}
