//! Pixel geometry and neighbour topology of the column-offset hex layout.
//!
//! Tiles are pointy-top hexagons stored row-major. Columns sit half a tile
//! apart horizontally and every odd column is pushed down by half a row pitch,
//! so two tiles in the same row but adjacent columns touch along a diagonal
//! edge while tiles two columns apart touch along a vertical edge.

use loaf_core::{HexLayout, Neighbors, PixelPoint, TileIndex};

/// Pixel center of the tile at the provided column and row, before any draw offset.
pub(crate) fn tile_center(layout: &HexLayout, column: u32, row: u32) -> PixelPoint {
    let odd_offset = if column & 1 == 1 {
        layout.odd_column_offset()
    } else {
        0.0
    };
    let left = column as f32 * layout.column_spacing();
    let top = row as f32 * layout.row_pitch() + odd_offset;

    PixelPoint::new(
        left + layout.tile_width as f32 * 0.5,
        top + layout.tile_height as f32 * 0.5,
    )
}

/// Neighbour indices of the tile at the provided column and row.
///
/// Slots run clockwise from the top-left. Even columns reach up into the
/// previous row for their upper diagonals, odd columns reach down into the
/// next row for their lower diagonals.
pub(crate) fn neighbors_of(layout: &HexLayout, column: u32, row: u32) -> Neighbors {
    let x = i64::from(column);
    let y = i64::from(row);

    let offsets: [(i64, i64); 6] = if column & 1 == 0 {
        [(-1, -1), (1, -1), (2, 0), (1, 0), (-1, 0), (-2, 0)]
    } else {
        [(-1, 0), (1, 0), (2, 0), (1, 1), (-1, 1), (-2, 0)]
    };

    offsets.map(|(dx, dy)| index_at(layout, x + dx, y + dy))
}

fn index_at(layout: &HexLayout, column: i64, row: i64) -> Option<TileIndex> {
    let width = i64::from(layout.width);
    let height = i64::from(layout.height);
    if column < 0 || row < 0 || column >= width || row >= height {
        return None;
    }

    u32::try_from(row * width + column).ok().map(TileIndex::new)
}
