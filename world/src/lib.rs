#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative overworld state for LOAF.
//!
//! The [`HexGrid`] owns every tile of the overworld map. Adapters and systems
//! mutate it exclusively through [`apply`] and observe it through [`query`].

mod layout;
mod road_network;
mod snapshot;

use loaf_core::{
    BuildError, Command, Event, HexLayout, MoveError, Neighbors, PixelPoint, RoadNetworkReport,
    SpriteIndex, Terrain, TileIndex,
};
use thiserror::Error;
use tracing::debug;

pub use snapshot::SnapshotError;

/// Reasons a grid cannot be constructed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The raw tile list does not cover the layout exactly.
    #[error("map of {width}x{height} tiles needs {expected} indices, found {actual}")]
    TileCountMismatch {
        /// Columns declared by the layout.
        width: u32,
        /// Rows declared by the layout.
        height: u32,
        /// Number of indices the layout requires.
        expected: usize,
        /// Number of indices supplied.
        actual: usize,
    },
    /// The start tile lies outside the grid.
    #[error("start tile {start} is outside a grid of {tile_count} tiles")]
    StartTileOutOfBounds {
        /// Requested start index.
        start: u32,
        /// Number of tiles in the grid.
        tile_count: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Tile {
    terrain: Terrain,
    sprite: SpriteIndex,
    center: PixelPoint,
    neighbors: Neighbors,
    walkable: bool,
    has_player: bool,
    has_road: bool,
    has_building: bool,
}

/// Indexed hex map holding terrain, player position, buildings and roads.
#[derive(Clone, Debug)]
pub struct HexGrid {
    layout: HexLayout,
    tiles: Vec<Tile>,
    highlighted: Option<TileIndex>,
}

impl HexGrid {
    /// Builds a grid from raw 1-based tileset indices stored row-major and
    /// places the player on `start`.
    pub fn new(layout: HexLayout, raw_indices: &[u32], start: TileIndex) -> Result<Self, GridError> {
        let expected = layout.tile_count();
        if raw_indices.len() != expected {
            return Err(GridError::TileCountMismatch {
                width: layout.width,
                height: layout.height,
                expected,
                actual: raw_indices.len(),
            });
        }
        if start.slot() >= expected {
            return Err(GridError::StartTileOutOfBounds {
                start: start.get(),
                tile_count: expected,
            });
        }

        let mut tiles = Vec::with_capacity(expected);
        for row in 0..layout.height {
            for column in 0..layout.width {
                let slot = (row as usize) * (layout.width as usize) + column as usize;
                let raw = raw_indices[slot];
                tiles.push(Tile {
                    terrain: Terrain::from_raw_index(raw),
                    sprite: SpriteIndex::new(raw),
                    center: layout::tile_center(&layout, column, row),
                    neighbors: layout::neighbors_of(&layout, column, row),
                    walkable: false,
                    has_player: false,
                    has_road: false,
                    has_building: false,
                });
            }
        }

        let mut grid = Self {
            layout,
            tiles,
            highlighted: Some(start),
        };
        grid.place_player(start);
        debug!(
            width = layout.width,
            height = layout.height,
            start = start.get(),
            "grid_created"
        );
        Ok(grid)
    }

    /// Number of tiles in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the grid holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Re-targets the highlight to the tile whose drawn center is nearest the
    /// pointer. Ties resolve to the lowest index.
    pub fn update_highlight(&mut self, pointer: PixelPoint, offset: PixelPoint) -> Option<TileIndex> {
        let mut best: Option<(usize, f32)> = None;
        for (slot, tile) in self.tiles.iter().enumerate() {
            let distance = pointer.distance_squared(tile.center + offset);
            match best {
                Some((_, closest)) if distance >= closest => {}
                _ => best = Some((slot, distance)),
            }
        }

        self.highlighted = best.and_then(|(slot, _)| TileIndex::from_slot(slot));
        self.highlighted
    }

    /// Tile currently highlighted by the pointer.
    #[must_use]
    pub fn highlighted(&self) -> Option<TileIndex> {
        self.highlighted
    }

    /// Center of the highlighted tile, without any draw offset.
    #[must_use]
    pub fn highlighted_center(&self) -> Option<PixelPoint> {
        self.highlighted
            .and_then(|index| self.tile(index))
            .map(|tile| tile.center)
    }

    /// Moves the player onto the highlighted tile when it is walkable.
    ///
    /// A rejected move leaves every tile untouched.
    pub fn try_move_player(&mut self) -> Result<TileIndex, MoveError> {
        let target = self.highlighted.ok_or(MoveError::NoHighlight)?;
        let walkable = self.tile(target).is_some_and(|tile| tile.walkable);
        if !walkable {
            return Err(MoveError::NotWalkable);
        }

        self.place_player(target);
        debug!(to = target.get(), "player_moved");
        Ok(target)
    }

    fn place_player(&mut self, target: TileIndex) {
        for tile in &mut self.tiles {
            tile.has_player = false;
            tile.walkable = false;
        }

        let Some(neighbors) = self.tile(target).map(|tile| tile.neighbors) else {
            return;
        };
        if let Some(tile) = self.tiles.get_mut(target.slot()) {
            tile.has_player = true;
        }
        for neighbor in neighbors.into_iter().flatten() {
            if let Some(tile) = self.tiles.get_mut(neighbor.slot()) {
                tile.walkable = true;
            }
        }
    }

    /// Tile occupied by the player.
    #[must_use]
    pub fn player_index(&self) -> Option<TileIndex> {
        self.tiles
            .iter()
            .position(|tile| tile.has_player)
            .and_then(TileIndex::from_slot)
    }

    /// Terrain of the tile, if the index names one.
    #[must_use]
    pub fn terrain(&self, index: TileIndex) -> Option<Terrain> {
        self.tile(index).map(|tile| tile.terrain)
    }

    /// Whether a building stands on the tile. Unknown tiles report `false`.
    #[must_use]
    pub fn has_building(&self, index: TileIndex) -> bool {
        self.tile(index).is_some_and(|tile| tile.has_building)
    }

    /// Whether a road runs through the tile. Unknown tiles report `false`.
    #[must_use]
    pub fn has_road(&self, index: TileIndex) -> bool {
        self.tile(index).is_some_and(|tile| tile.has_road)
    }

    /// Places a building on the tile and returns the sprite it now shows.
    pub fn build_at(&mut self, index: TileIndex) -> Result<SpriteIndex, BuildError> {
        let tile = self
            .tiles
            .get_mut(index.slot())
            .ok_or(BuildError::NoTile)?;
        if tile.has_building {
            return Err(BuildError::AlreadyBuilt);
        }

        tile.sprite = tile.terrain.building_sprite(tile.has_road);
        tile.has_building = true;
        debug!(tile = index.get(), sprite = tile.sprite.get(), "building_placed");
        Ok(tile.sprite)
    }

    /// Lays a road on the tile, joining an existing building to it.
    pub fn build_road_at(&mut self, index: TileIndex) -> Result<(), BuildError> {
        let tile = self
            .tiles
            .get_mut(index.slot())
            .ok_or(BuildError::NoTile)?;
        if tile.has_road {
            return Err(BuildError::AlreadyHasRoad);
        }

        if tile.has_building {
            tile.sprite = tile.terrain.building_sprite(true);
        }
        tile.has_road = true;
        debug!(tile = index.get(), "road_placed");
        Ok(())
    }

    /// Checks whether one connected road network reaches a building of every terrain.
    #[must_use]
    pub fn road_network(&self) -> RoadNetworkReport {
        road_network::survey(&self.tiles)
    }

    fn tile(&self, index: TileIndex) -> Option<&Tile> {
        self.tiles.get(index.slot())
    }

    fn tile_snapshot(&self, slot: usize, tile: &Tile) -> Option<loaf_core::TileSnapshot> {
        let index = TileIndex::from_slot(slot)?;
        Some(loaf_core::TileSnapshot {
            index,
            terrain: tile.terrain,
            sprite: tile.sprite,
            center: tile.center,
            neighbors: tile.neighbors,
            highlighted: self.highlighted == Some(index),
            walkable: tile.walkable,
            has_player: tile.has_player,
            has_road: tile.has_road,
            has_building: tile.has_building,
        })
    }
}

/// Applies the provided command to the grid, emitting resulting events.
pub fn apply(grid: &mut HexGrid, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::UpdateHighlight { pointer, offset } => {
            let previous = grid.highlighted;
            let current = grid.update_highlight(pointer, offset);
            if current != previous {
                out_events.push(Event::HighlightChanged { tile: current });
            }
        }
        Command::MovePlayer => {
            let from = grid.player_index();
            match grid.try_move_player() {
                Ok(to) => out_events.push(Event::PlayerMoved { from, to }),
                Err(reason) => out_events.push(Event::MoveRejected {
                    target: grid.highlighted,
                    reason,
                }),
            }
        }
        Command::Build { tile } => match grid.build_at(tile) {
            Ok(sprite) => {
                if let Some(terrain) = grid.terrain(tile) {
                    out_events.push(Event::BuildingPlaced {
                        tile,
                        terrain,
                        sprite,
                    });
                }
            }
            Err(reason) => out_events.push(Event::BuildRejected { tile, reason }),
        },
        Command::BuildRoad { tile } => match grid.build_road_at(tile) {
            Ok(()) => out_events.push(Event::RoadPlaced { tile }),
            Err(reason) => out_events.push(Event::RoadRejected { tile, reason }),
        },
    }
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use loaf_core::{HexLayout, RoadNetworkReport, TileIndex, TileSnapshot};

    use super::HexGrid;

    /// Geometry of the grid.
    #[must_use]
    pub fn layout(grid: &HexGrid) -> HexLayout {
        grid.layout
    }

    /// Copy of a single tile's state, if the index names one.
    #[must_use]
    pub fn tile(grid: &HexGrid, index: TileIndex) -> Option<TileSnapshot> {
        let tile = grid.tile(index)?;
        grid.tile_snapshot(index.slot(), tile)
    }

    /// Copies of every tile in index order.
    #[must_use]
    pub fn tiles(grid: &HexGrid) -> Vec<TileSnapshot> {
        grid.tiles
            .iter()
            .enumerate()
            .filter_map(|(slot, tile)| grid.tile_snapshot(slot, tile))
            .collect()
    }

    /// Tile occupied by the player.
    #[must_use]
    pub fn player_tile(grid: &HexGrid) -> Option<TileSnapshot> {
        grid.player_index().and_then(|index| tile(grid, index))
    }

    /// Tile currently highlighted by the pointer.
    #[must_use]
    pub fn highlighted_tile(grid: &HexGrid) -> Option<TileSnapshot> {
        grid.highlighted.and_then(|index| tile(grid, index))
    }

    /// Result of the road-network win check.
    #[must_use]
    pub fn road_network(grid: &HexGrid) -> RoadNetworkReport {
        grid.road_network()
    }
}
