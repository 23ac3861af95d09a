/// Grid placement
///
/// Places planned cells on a column grid for a given container width.
/// Cells are auto-placed row-major with a cursor that never moves backwards
/// (sparse packing), then row tracks are sized from the cells' ratios:
/// 1. single-row cells size their track to the tallest of them
/// 2. tracks holding only multi-row cells take the base track height
/// 3. multi-row cells grow their last track by any remaining deficit

use super::template::base_span;
use super::{columns_for_width, LayoutMode, PlannedCell, Rect};
use crate::state::config::GalleryConfig;
use crate::state::data::AspectRatio;

/// Result of placing a gallery
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridPlacement {
    /// One rectangle per planned cell, same order
    pub rects: Vec<Rect>,
    pub columns: usize,
    pub content_width: f32,
    pub content_height: f32,
}

/// Grid position of one cell in track units
#[derive(Debug, Clone, Copy)]
struct Area {
    row: usize,
    column: usize,
    row_span: usize,
    column_span: usize,
}

pub fn place(cells: &[PlannedCell], mode: LayoutMode, width: f32, config: &GalleryConfig) -> GridPlacement {
    let width = width.max(0.0);
    let gap = config.gap.max(0.0);
    let columns = columns_for_width(mode, width, &config.breakpoints);

    if cells.is_empty() {
        return GridPlacement {
            rects: Vec::new(),
            columns,
            content_width: width,
            content_height: 0.0,
        };
    }

    let column_width = ((width - gap * (columns - 1) as f32) / columns as f32).max(0.0);
    let span_width = |span: usize| column_width * span as f32 + gap * span.saturating_sub(1) as f32;

    // Template spans only apply on the full grid; the collapsed grid stacks 1x1
    let spans_active = mode == LayoutMode::Simple || columns >= super::template::HIGHLIGHT_COLUMNS;
    let areas = auto_place(cells, columns, spans_active);

    let row_count = areas.iter().map(|a| a.row + a.row_span).max().unwrap_or(0);
    let mut tracks = vec![0.0_f32; row_count];

    for (cell, area) in cells.iter().zip(&areas) {
        if area.row_span == 1 {
            let height = cell.aspect_ratio.height_for(span_width(area.column_span));
            tracks[area.row] = tracks[area.row].max(height);
        }
    }

    let base = AspectRatio::LANDSCAPE.height_for(span_width(base_span(mode, columns)));
    for track in tracks.iter_mut().filter(|t| **t == 0.0) {
        *track = base;
    }

    for (cell, area) in cells.iter().zip(&areas) {
        if area.row_span > 1 {
            let rows = area.row..area.row + area.row_span;
            let available = tracks[rows.clone()].iter().sum::<f32>() + gap * (area.row_span - 1) as f32;
            let wanted = cell.aspect_ratio.height_for(span_width(area.column_span));
            if wanted > available {
                tracks[rows.end - 1] += wanted - available;
            }
        }
    }

    let mut offsets = Vec::with_capacity(row_count);
    let mut y = 0.0;
    for track in &tracks {
        offsets.push(y);
        y += track + gap;
    }
    let content_height = (y - gap).max(0.0);

    let rects = areas
        .iter()
        .map(|area| {
            let x = area.column as f32 * (column_width + gap);
            let height = tracks[area.row..area.row + area.row_span].iter().sum::<f32>()
                + gap * (area.row_span - 1) as f32;
            Rect::new(x, offsets[area.row], span_width(area.column_span), height)
        })
        .collect();

    GridPlacement {
        rects,
        columns,
        content_width: width,
        content_height,
    }
}

fn auto_place(cells: &[PlannedCell], columns: usize, spans_active: bool) -> Vec<Area> {
    let mut occupied: Vec<Vec<bool>> = Vec::new();
    let mut cursor = (0usize, 0usize);
    let mut areas = Vec::with_capacity(cells.len());

    for cell in cells {
        let (column_span, row_span) = if spans_active {
            (cell.slot.column_span.clamp(1, columns), cell.slot.row_span.max(1))
        } else {
            (1, 1)
        };

        let (mut row, mut column) = cursor;
        loop {
            if column + column_span > columns {
                row += 1;
                column = 0;
                continue;
            }
            if is_free(&occupied, row, column, row_span, column_span) {
                break;
            }
            column += 1;
        }

        for r in row..row + row_span {
            if occupied.len() <= r {
                occupied.resize_with(r + 1, || vec![false; columns]);
            }
            for c in column..column + column_span {
                occupied[r][c] = true;
            }
        }

        areas.push(Area {
            row,
            column,
            row_span,
            column_span,
        });
        cursor = (row, column + column_span);
    }

    areas
}

fn is_free(occupied: &[Vec<bool>], row: usize, column: usize, row_span: usize, column_span: usize) -> bool {
    (row..row + row_span).all(|r| {
        occupied
            .get(r)
            .map_or(true, |cells| cells[column..column + column_span].iter().all(|taken| !taken))
    })
}
