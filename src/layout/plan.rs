/// Slot assignment
///
/// Turns the caller's ordered item list into planned cells: a render key,
/// the slot geometry, the effective aspect ratio and the priority flag.

use log::warn;
use std::collections::HashMap;
use std::fmt;

use super::{slot_for, LayoutMode, SlotGeometry};
use crate::state::data::{AspectRatio, MediaId, MediaItem};

/// Render identity of a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    /// The item's own id, present and unique in the list
    Id(MediaId),
    /// Synthesized from the item's index in the input list
    Position(usize),
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKey::Id(id) => write!(f, "id:{}", id),
            CellKey::Position(index) => write!(f, "pos:{}", index),
        }
    }
}

/// One cell of the gallery before pixel placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCell {
    pub key: CellKey,
    pub item: MediaItem,
    pub slot: SlotGeometry,
    /// Item ratio if given, else the slot default
    pub aspect_ratio: AspectRatio,
    /// Fetch at mount instead of waiting for visibility
    pub priority: bool,
}

/// Plan the cells for `items` in `mode`
///
/// Items without a source are skipped. Items whose id is missing or shared
/// with another item get a positional key. Slots are assigned by position
/// among the rendered cells, so skipped items leave no hole in the mosaic.
pub fn plan(items: &[MediaItem], mode: LayoutMode) -> Vec<PlannedCell> {
    let mut id_counts: HashMap<&MediaId, usize> = HashMap::new();
    for id in items.iter().filter_map(|item| item.id.as_ref()) {
        *id_counts.entry(id).or_insert(0) += 1;
    }

    let mut cells = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        if item.source.trim().is_empty() {
            warn!("⚠️  Skipping gallery item {} without a source", index);
            continue;
        }

        let key = match &item.id {
            Some(id) if id_counts.get(id) == Some(&1) => CellKey::Id(id.clone()),
            Some(id) => {
                warn!("⚠️  Duplicate gallery id {:?}, keying item {} by position", id, index);
                CellKey::Position(index)
            }
            None => CellKey::Position(index),
        };

        let slot = slot_for(cells.len(), mode);
        let priority = mode == LayoutMode::Simple && cells.is_empty();

        cells.push(PlannedCell {
            key,
            aspect_ratio: item.aspect_ratio.unwrap_or(slot.aspect_ratio),
            item: item.clone(),
            slot,
            priority,
        });
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::HIGHLIGHT_TEMPLATE;
    use std::collections::HashSet;

    fn items(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| MediaItem::new(i as i64, format!("img/{}.jpg", i), format!("Image {}", i)))
            .collect()
    }

    #[test]
    fn test_empty_list_plans_nothing() {
        assert!(plan(&[], LayoutMode::Simple).is_empty());
        assert!(plan(&[], LayoutMode::Highlight).is_empty());
    }

    #[test]
    fn test_only_first_simple_cell_is_priority() {
        let cells = plan(&items(3), LayoutMode::Simple);
        let priorities: Vec<bool> = cells.iter().map(|c| c.priority).collect();
        assert_eq!(priorities, vec![true, false, false]);
    }

    #[test]
    fn test_highlight_has_no_priority_cell() {
        assert!(plan(&items(4), LayoutMode::Highlight).iter().all(|c| !c.priority));
    }

    #[test]
    fn test_simple_falls_back_to_landscape_ratio() {
        let cells = plan(&items(1), LayoutMode::Simple);
        assert_eq!(cells[0].aspect_ratio, AspectRatio::LANDSCAPE);
    }

    #[test]
    fn test_item_ratio_overrides_only_its_cell() {
        let mut list = items(3);
        list[1] = list[1].clone().with_aspect_ratio(AspectRatio::parse("3/4").unwrap());

        let cells = plan(&list, LayoutMode::Highlight);
        assert_eq!(cells[0].aspect_ratio, HIGHLIGHT_TEMPLATE[0].aspect_ratio);
        assert_eq!(cells[1].aspect_ratio.value(), 0.75);
        assert_eq!(cells[1].slot, HIGHLIGHT_TEMPLATE[1]);
        assert_eq!(cells[2].aspect_ratio, HIGHLIGHT_TEMPLATE[2].aspect_ratio);
    }

    #[test]
    fn test_highlight_slots_repeat_after_template() {
        let k = HIGHLIGHT_TEMPLATE.len();
        let cells = plan(&items(2 * k + 3), LayoutMode::Highlight);
        for i in 0..cells.len() - k {
            assert_eq!(cells[i].slot, cells[i + k].slot);
        }
    }

    #[test]
    fn test_duplicate_ids_get_distinct_positional_keys() {
        let list = vec![
            MediaItem::new("a", "1.jpg", "One"),
            MediaItem::new("dup", "2.jpg", "Two"),
            MediaItem::new("dup", "3.jpg", "Three"),
        ];

        let cells = plan(&list, LayoutMode::Simple);
        let keys: Vec<&CellKey> = cells.iter().map(|c| &c.key).collect();

        assert_eq!(
            keys,
            vec![&CellKey::Id("a".into()), &CellKey::Position(1), &CellKey::Position(2)]
        );
        assert_eq!(keys.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn test_missing_ids_are_keyed_by_position() {
        let mut list = items(2);
        list[1].id = None;

        let cells = plan(&list, LayoutMode::Simple);
        assert_eq!(cells[0].key, CellKey::Id(MediaId::Number(0)));
        assert_eq!(cells[1].key, CellKey::Position(1));
    }

    #[test]
    fn test_items_without_source_are_skipped() {
        let mut list = items(4);
        list[0].source = String::new();
        list[2].source = "  ".into();

        let cells = plan(&list, LayoutMode::Simple);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].key, CellKey::Id(MediaId::Number(1)));
        assert!(cells[0].priority);
        assert_eq!(cells[1].key, CellKey::Id(MediaId::Number(3)));
    }

    #[test]
    fn test_mode_change_rederives_slots() {
        let list = items(3);
        let simple = plan(&list, LayoutMode::Simple);
        let highlight = plan(&list, LayoutMode::Highlight);

        assert_eq!(simple[1].slot.column_span, 1);
        assert_eq!(highlight[1].slot, HIGHLIGHT_TEMPLATE[1]);
    }
}
