//! Capture and restore of the full grid state.

use loaf_core::{GridSnapshot, HexLayout, ScoreBoard, TileIndex};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{HexGrid, Tile};

/// Reasons a snapshot cannot be applied to a grid.
///
/// A rejected snapshot leaves the grid untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The snapshot was captured from a grid with different geometry.
    #[error("snapshot layout {found:?} does not match grid layout {expected:?}")]
    LayoutMismatch {
        /// Layout of the grid being restored.
        expected: HexLayout,
        /// Layout recorded in the snapshot.
        found: HexLayout,
    },
    /// A per-tile field does not hold one entry per tile.
    #[error("snapshot field `{field}` holds {actual} entries, expected {expected}")]
    FieldLength {
        /// Name of the offending field.
        field: &'static str,
        /// Number of tiles in the grid.
        expected: usize,
        /// Number of entries present in the snapshot.
        actual: usize,
    },
    /// The snapshot does not place exactly one player.
    #[error("snapshot places {count} players, expected exactly one")]
    PlayerCount {
        /// Number of tiles flagged as holding the player.
        count: usize,
    },
}

impl HexGrid {
    /// Captures a deep copy of every tile plus the provided scores.
    #[must_use]
    pub fn to_snapshot(&self, scores: ScoreBoard) -> GridSnapshot {
        let highlighted = self.highlighted.map(|index| index.slot());

        GridSnapshot {
            layout: self.layout,
            terrain: self.tiles.iter().map(|tile| tile.terrain).collect(),
            sprite: self.tiles.iter().map(|tile| tile.sprite).collect(),
            center: self.tiles.iter().map(|tile| tile.center).collect(),
            neighbors: self.tiles.iter().map(|tile| tile.neighbors).collect(),
            highlighted: (0..self.tiles.len())
                .map(|slot| highlighted == Some(slot))
                .collect(),
            walkable: self.tiles.iter().map(|tile| tile.walkable).collect(),
            has_player: self.tiles.iter().map(|tile| tile.has_player).collect(),
            has_building: self.tiles.iter().map(|tile| tile.has_building).collect(),
            has_road: self.tiles.iter().map(|tile| tile.has_road).collect(),
            scores: scores.to_array(),
        }
    }

    /// Replaces every tile with the state recorded in the snapshot and returns
    /// the scores carried alongside it.
    ///
    /// When several tiles are flagged as highlighted the lowest index wins;
    /// when none is flagged the grid ends up without a highlight.
    pub fn restore(&mut self, snapshot: &GridSnapshot) -> Result<ScoreBoard, SnapshotError> {
        if snapshot.layout != self.layout {
            return Err(SnapshotError::LayoutMismatch {
                expected: self.layout,
                found: snapshot.layout,
            });
        }

        let expected = self.tiles.len();
        let lengths = [
            ("terrain", snapshot.terrain.len()),
            ("sprite", snapshot.sprite.len()),
            ("center", snapshot.center.len()),
            ("neighbors", snapshot.neighbors.len()),
            ("highlighted", snapshot.highlighted.len()),
            ("walkable", snapshot.walkable.len()),
            ("has_player", snapshot.has_player.len()),
            ("has_building", snapshot.has_building.len()),
            ("has_road", snapshot.has_road.len()),
        ];
        for (field, actual) in lengths {
            if actual != expected {
                return Err(SnapshotError::FieldLength {
                    field,
                    expected,
                    actual,
                });
            }
        }

        let players = snapshot.has_player.iter().filter(|flag| **flag).count();
        if players != 1 {
            return Err(SnapshotError::PlayerCount { count: players });
        }

        let flagged: Vec<usize> = snapshot
            .highlighted
            .iter()
            .enumerate()
            .filter_map(|(slot, flag)| flag.then_some(slot))
            .collect();
        if flagged.len() > 1 {
            warn!(flagged = flagged.len(), "snapshot_multiple_highlights");
        }

        self.tiles = (0..expected)
            .map(|slot| Tile {
                terrain: snapshot.terrain[slot],
                sprite: snapshot.sprite[slot],
                center: snapshot.center[slot],
                neighbors: snapshot.neighbors[slot],
                walkable: snapshot.walkable[slot],
                has_player: snapshot.has_player[slot],
                has_road: snapshot.has_road[slot],
                has_building: snapshot.has_building[slot],
            })
            .collect();
        self.highlighted = flagged.first().copied().and_then(TileIndex::from_slot);

        debug!(tiles = expected, "snapshot_restored");
        Ok(ScoreBoard::from_array(snapshot.scores))
    }
}
