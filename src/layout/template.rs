/// Slot templates
///
/// Slot geometry is a pure function of `(index, mode)`. The Highlight
/// template is cyclic: item `i` takes `HIGHLIGHT_TEMPLATE[i % N]`, so long
/// lists repeat the mosaic.

use super::{LayoutMode, SlotGeometry};
use crate::state::config::Breakpoints;
use crate::state::data::AspectRatio;

/// Column count of the Highlight mosaic at and above the medium breakpoint
pub const HIGHLIGHT_COLUMNS: usize = 12;

/// Simple grid columns below medium / from medium / from large
const SIMPLE_COLUMNS: [usize; 3] = [2, 3, 4];

const SIMPLE_SLOT: SlotGeometry = SlotGeometry::new(1, 1, AspectRatio::LANDSCAPE);

/// Alternating pairs of rows: narrow tiles beside wide double-height tiles,
/// closed by two half-width squares
pub const HIGHLIGHT_TEMPLATE: [SlotGeometry; 8] = [
    SlotGeometry::new(4, 1, AspectRatio::LANDSCAPE),
    SlotGeometry::new(8, 2, AspectRatio::LANDSCAPE),
    SlotGeometry::new(4, 1, AspectRatio::LANDSCAPE),
    SlotGeometry::new(8, 2, AspectRatio::LANDSCAPE),
    SlotGeometry::new(4, 1, AspectRatio::LANDSCAPE),
    SlotGeometry::new(4, 1, AspectRatio::LANDSCAPE),
    // Square by default, unlike every other slot (4:3); an item's own ratio still wins
    SlotGeometry::new(6, 2, AspectRatio::SQUARE),
    SlotGeometry::new(6, 2, AspectRatio::SQUARE),
];

/// Slot geometry for the item at `index`
pub fn slot_for(index: usize, mode: LayoutMode) -> SlotGeometry {
    match mode {
        LayoutMode::Simple => SIMPLE_SLOT,
        LayoutMode::Highlight => HIGHLIGHT_TEMPLATE[index % HIGHLIGHT_TEMPLATE.len()],
    }
}

/// Number of grid columns for a container width
pub fn columns_for_width(mode: LayoutMode, width: f32, breakpoints: &Breakpoints) -> usize {
    match mode {
        LayoutMode::Simple => {
            if width >= breakpoints.large {
                SIMPLE_COLUMNS[2]
            } else if width >= breakpoints.medium {
                SIMPLE_COLUMNS[1]
            } else {
                SIMPLE_COLUMNS[0]
            }
        }
        LayoutMode::Highlight => {
            if width >= breakpoints.medium {
                HIGHLIGHT_COLUMNS
            } else {
                1
            }
        }
    }
}

/// Column span of the narrowest slot; sets the height of rows holding only tall cells
pub(crate) fn base_span(mode: LayoutMode, columns: usize) -> usize {
    match mode {
        LayoutMode::Simple => 1,
        LayoutMode::Highlight => HIGHLIGHT_TEMPLATE
            .iter()
            .map(|slot| slot.column_span)
            .min()
            .unwrap_or(1)
            .min(columns),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_template_is_cyclic() {
        let k = HIGHLIGHT_TEMPLATE.len();
        for i in 0..3 * k {
            assert_eq!(
                slot_for(i, LayoutMode::Highlight),
                slot_for(i + k, LayoutMode::Highlight),
                "slot {} differs from slot {}",
                i,
                i + k
            );
        }
    }

    #[test]
    fn test_template_rows_fill_the_mosaic() {
        // Each pair of rows in the mosaic covers 12 columns twice
        let cells: usize = HIGHLIGHT_TEMPLATE
            .iter()
            .map(|slot| slot.column_span * slot.row_span)
            .sum();
        assert_eq!(cells % (HIGHLIGHT_COLUMNS * 2), 0);
    }

    #[test]
    fn test_only_half_width_slots_default_to_square() {
        for slot in &HIGHLIGHT_TEMPLATE {
            let expected = if slot.column_span == HIGHLIGHT_COLUMNS / 2 {
                AspectRatio::SQUARE
            } else {
                AspectRatio::LANDSCAPE
            };
            assert_eq!(slot.aspect_ratio, expected, "{:?}", slot);
        }
    }

    #[test]
    fn test_simple_slots_are_uniform() {
        for i in 0..20 {
            let slot = slot_for(i, LayoutMode::Simple);
            assert_eq!((slot.column_span, slot.row_span), (1, 1));
            assert_eq!(slot.aspect_ratio, AspectRatio::LANDSCAPE);
        }
    }

    #[test]
    fn test_columns_per_breakpoint() {
        let bp = Breakpoints::default();

        assert_eq!(columns_for_width(LayoutMode::Simple, 375.0, &bp), 2);
        assert_eq!(columns_for_width(LayoutMode::Simple, 768.0, &bp), 3);
        assert_eq!(columns_for_width(LayoutMode::Simple, 1440.0, &bp), 4);
        assert_eq!(columns_for_width(LayoutMode::Highlight, 375.0, &bp), 1);
        assert_eq!(columns_for_width(LayoutMode::Highlight, 1024.0, &bp), HIGHLIGHT_COLUMNS);
    }
}
