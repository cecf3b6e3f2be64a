#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the LOAF game.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative overworld grid, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what actually changed. Read-only data crosses the boundary as
//! plain value snapshots such as [`TileSnapshot`] and [`GridSnapshot`].

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Title shown by adapters when the game boots.
pub const GAME_TITLE: &str = "LOAF";

/// Commands that express all permissible overworld mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Re-targets the highlight to the tile whose center is nearest the pointer.
    UpdateHighlight {
        /// Pointer position expressed in grid pixel space.
        pointer: PixelPoint,
        /// Offset applied to every tile center when the grid is drawn.
        offset: PixelPoint,
    },
    /// Requests that the player step onto the highlighted tile.
    MovePlayer,
    /// Requests a building on the provided tile.
    Build {
        /// Tile receiving the building.
        tile: TileIndex,
    },
    /// Requests a road on the provided tile.
    BuildRoad {
        /// Tile receiving the road.
        tile: TileIndex,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The highlighted tile changed.
    HighlightChanged {
        /// Newly highlighted tile, if any.
        tile: Option<TileIndex>,
    },
    /// The player moved between two tiles.
    PlayerMoved {
        /// Tile the player occupied before moving.
        from: Option<TileIndex>,
        /// Tile the player occupies after the move.
        to: TileIndex,
    },
    /// A move request was refused.
    MoveRejected {
        /// Tile that was highlighted when the request arrived.
        target: Option<TileIndex>,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// A building was placed.
    BuildingPlaced {
        /// Tile that received the building.
        tile: TileIndex,
        /// Terrain of the tile.
        terrain: Terrain,
        /// Sprite selected for the tile after construction.
        sprite: SpriteIndex,
    },
    /// A road was placed.
    RoadPlaced {
        /// Tile that received the road.
        tile: TileIndex,
    },
    /// A building request was refused.
    BuildRejected {
        /// Tile named in the request.
        tile: TileIndex,
        /// Specific reason the request failed.
        reason: BuildError,
    },
    /// A road request was refused.
    RoadRejected {
        /// Tile named in the request.
        tile: TileIndex,
        /// Specific reason the request failed.
        reason: BuildError,
    },
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveError {
    /// No tile is currently highlighted.
    NoHighlight,
    /// The highlighted tile is not adjacent to the player.
    NotWalkable,
}

/// Reasons a build or road request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildError {
    /// The index does not name a tile of the grid.
    NoTile,
    /// The tile already carries a building.
    AlreadyBuilt,
    /// The tile already carries a road.
    AlreadyHasRoad,
}

/// Flat index of a tile within the grid (`y * width + x`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex(u32);

impl TileIndex {
    /// Creates a new tile index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index usable for slice access.
    #[must_use]
    pub fn slot(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }

    /// Converts a slice position back into a tile index, if it fits.
    #[must_use]
    pub fn from_slot(slot: usize) -> Option<Self> {
        u32::try_from(slot).ok().map(Self)
    }
}

/// Point expressed in grid pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl PixelPoint {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: PixelPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl Add for PixelPoint {
    type Output = PixelPoint;

    fn add(self, rhs: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Geometry of the hex grid: tile counts and tile pixel extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexLayout {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
    /// Width of a single tile sprite in pixels.
    pub tile_width: u32,
    /// Height of a single tile sprite in pixels.
    pub tile_height: u32,
}

impl HexLayout {
    /// Creates a new layout descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            width,
            height,
            tile_width,
            tile_height,
        }
    }

    /// Number of tiles contained in the grid.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(0)
    }

    /// Horizontal distance between adjacent columns.
    #[must_use]
    pub fn column_spacing(&self) -> f32 {
        self.tile_width as f32 * 0.5 - 1.0
    }

    /// Vertical distance between two rows of the same column.
    #[must_use]
    pub fn row_pitch(&self) -> f32 {
        let side = self.tile_height as f32 / 2.0;
        self.tile_height as f32 + side - 2.0
    }

    /// Extra vertical offset applied to odd columns; half of [`Self::row_pitch`].
    #[must_use]
    pub fn odd_column_offset(&self) -> f32 {
        let side = self.tile_height as f32 / 2.0;
        side * 1.5 - 1.0
    }

    /// Pixel extents of the full map, used by adapters to center the grid.
    #[must_use]
    pub fn pixel_size(&self) -> PixelPoint {
        let width = self.tile_width as f32 * self.width as f32 / 2.0;
        let height = self.tile_height as f32 * self.height as f32 * 1.5
            + self.tile_height as f32 * 0.25;
        PixelPoint::new(width, height)
    }
}

/// Terrain type of a tile, fixed once the grid is initialised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terrain {
    /// Open grass.
    Grassland,
    /// Rocky badland.
    Badland,
    /// Sandy desert.
    Desert,
    /// Woodland.
    Forest,
}

impl Terrain {
    /// Every terrain in declaration order.
    pub const ALL: [Terrain; 4] = [
        Terrain::Grassland,
        Terrain::Badland,
        Terrain::Desert,
        Terrain::Forest,
    ];

    /// Maps a raw 1-based tileset index from the map file to its terrain.
    #[must_use]
    pub const fn from_raw_index(raw: u32) -> Self {
        match raw {
            1 => Self::Grassland,
            3 => Self::Badland,
            5 => Self::Desert,
            _ => Self::Forest,
        }
    }

    /// Sprite shown once a building stands on this terrain.
    #[must_use]
    pub const fn building_sprite(self, has_road: bool) -> SpriteIndex {
        match (self, has_road) {
            (Self::Grassland, false) => SpriteIndex::GRASSLAND_BUILDING,
            (Self::Badland, false) => SpriteIndex::BADLAND_BUILDING,
            (Self::Desert, false) => SpriteIndex::DESERT_BUILDING,
            (Self::Forest, false) => SpriteIndex::FOREST_BUILDING,
            (Self::Grassland, true) => SpriteIndex::GRASSLAND_BUILDING_ROAD,
            (Self::Badland, true) => SpriteIndex::BADLAND_BUILDING_ROAD,
            (Self::Desert, true) => SpriteIndex::DESERT_BUILDING_ROAD,
            (Self::Forest, true) => SpriteIndex::FOREST_BUILDING_ROAD,
        }
    }

    /// Minigame played to earn a building on this terrain.
    #[must_use]
    pub const fn game_kind(self) -> GameKind {
        match self {
            Self::Forest => GameKind::Carpentry,
            Self::Badland => GameKind::Mining,
            Self::Desert => GameKind::Cactus,
            Self::Grassland => GameKind::Wheat,
        }
    }
}

/// 1-based index into the tileset; zero means "do not draw".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteIndex(u32);

impl SpriteIndex {
    /// Sentinel for tiles that are skipped when drawing.
    pub const EMPTY: Self = Self(0);
    /// Grassland with a building.
    pub const GRASSLAND_BUILDING: Self = Self(9);
    /// Badland with a building.
    pub const BADLAND_BUILDING: Self = Self(10);
    /// Desert with a building.
    pub const DESERT_BUILDING: Self = Self(11);
    /// Forest with a building.
    pub const FOREST_BUILDING: Self = Self(12);
    /// Grassland with a building joined to a road.
    pub const GRASSLAND_BUILDING_ROAD: Self = Self(13);
    /// Badland with a building joined to a road.
    pub const BADLAND_BUILDING_ROAD: Self = Self(14);
    /// Desert with a building joined to a road.
    pub const DESERT_BUILDING_ROAD: Self = Self(15);
    /// Forest with a building joined to a road.
    pub const FOREST_BUILDING_ROAD: Self = Self(16);

    /// The building-on-road variants that a winning road network must reach.
    pub const NETWORK_TARGETS: [SpriteIndex; 4] = [
        Self::GRASSLAND_BUILDING_ROAD,
        Self::BADLAND_BUILDING_ROAD,
        Self::DESERT_BUILDING_ROAD,
        Self::FOREST_BUILDING_ROAD,
    ];

    /// Creates a sprite index from its 1-based value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the 1-based value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Zero-based region inside the tileset, or `None` for [`Self::EMPTY`].
    #[must_use]
    pub const fn tileset_region(&self) -> Option<u32> {
        self.0.checked_sub(1)
    }
}

/// The six neighbour slots of a tile, clockwise from the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    /// Upper-left neighbour.
    UpLeft,
    /// Upper-right neighbour.
    UpRight,
    /// Neighbour to the right, two columns over.
    Right,
    /// Lower-right neighbour.
    DownRight,
    /// Lower-left neighbour.
    DownLeft,
    /// Neighbour to the left, two columns over.
    Left,
}

impl HexDirection {
    /// All directions in clockwise neighbour-slot order.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::UpLeft,
        HexDirection::UpRight,
        HexDirection::Right,
        HexDirection::DownRight,
        HexDirection::DownLeft,
        HexDirection::Left,
    ];

    /// Position of the direction inside a neighbour array.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::UpLeft => 0,
            Self::UpRight => 1,
            Self::Right => 2,
            Self::DownRight => 3,
            Self::DownLeft => 4,
            Self::Left => 5,
        }
    }
}

/// Neighbour indices of a tile in [`HexDirection::ALL`] order.
pub type Neighbors = [Option<TileIndex>; 6];

/// Immutable copy of a single tile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    /// Flat index of the tile.
    pub index: TileIndex,
    /// Terrain assigned at initialization.
    pub terrain: Terrain,
    /// Current sprite.
    pub sprite: SpriteIndex,
    /// Pixel center without any draw offset.
    pub center: PixelPoint,
    /// Neighbour indices, clockwise from the top-left.
    pub neighbors: Neighbors,
    /// Whether the pointer currently highlights the tile.
    pub highlighted: bool,
    /// Whether the player may step onto the tile next.
    pub walkable: bool,
    /// Whether the player stands on the tile.
    pub has_player: bool,
    /// Whether a road runs through the tile.
    pub has_road: bool,
    /// Whether a building stands on the tile.
    pub has_building: bool,
}

/// Outcome of the road-network win check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RoadNetworkReport {
    /// Whether one connected road network reaches a building of every terrain.
    pub covers_all_building_types: bool,
    /// Road tiles processed in the winning component before it completed.
    pub visited: usize,
}

/// Minigames that award building rights for a terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    /// Hammer nails into planks.
    Carpentry,
    /// Swing a pickaxe at ore.
    Mining,
    /// Harvest cactus.
    Cactus,
    /// Harvest wheat.
    Wheat,
}

impl GameKind {
    /// Every minigame in declaration order.
    pub const ALL: [GameKind; 4] = [
        GameKind::Carpentry,
        GameKind::Mining,
        GameKind::Cactus,
        GameKind::Wheat,
    ];

    /// Completion times in seconds for three, two and one point.
    #[must_use]
    pub const fn time_limits(self) -> [f32; 3] {
        match self {
            Self::Mining => [20.0, 35.0, 45.0],
            Self::Carpentry | Self::Cactus | Self::Wheat => [30.0, 45.0, 60.0],
        }
    }

    /// Terrain whose building this minigame unlocks.
    #[must_use]
    pub const fn terrain(self) -> Terrain {
        match self {
            Self::Carpentry => Terrain::Forest,
            Self::Mining => Terrain::Badland,
            Self::Cactus => Terrain::Desert,
            Self::Wheat => Terrain::Grassland,
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Carpentry => "Carpentry",
            Self::Mining => "Mining",
            Self::Cactus => "Cactus",
            Self::Wheat => "Wheat",
        }
    }
}

/// Minigame points earned per terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreBoard {
    /// Points earned in carpentry (forest).
    pub forest: u32,
    /// Points earned in wheat harvesting (grassland).
    pub grassland: u32,
    /// Points earned in cactus harvesting (desert).
    pub desert: u32,
    /// Points earned in mining (badland).
    pub badland: u32,
}

impl ScoreBoard {
    /// Creates an empty score board.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forest: 0,
            grassland: 0,
            desert: 0,
            badland: 0,
        }
    }

    /// Adds points to the tally of the provided terrain.
    pub fn award(&mut self, terrain: Terrain, points: u32) {
        let slot = match terrain {
            Terrain::Forest => &mut self.forest,
            Terrain::Grassland => &mut self.grassland,
            Terrain::Desert => &mut self.desert,
            Terrain::Badland => &mut self.badland,
        };
        *slot = slot.saturating_add(points);
    }

    /// Points recorded for the provided terrain.
    #[must_use]
    pub const fn points(&self, terrain: Terrain) -> u32 {
        match terrain {
            Terrain::Forest => self.forest,
            Terrain::Grassland => self.grassland,
            Terrain::Desert => self.desert,
            Terrain::Badland => self.badland,
        }
    }

    /// Whether every terrain has earned at least one point.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.forest >= 1 && self.grassland >= 1 && self.desert >= 1 && self.badland >= 1
    }

    /// Sum of all points.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.forest
            .saturating_add(self.grassland)
            .saturating_add(self.desert)
            .saturating_add(self.badland)
    }

    /// Points ordered forest, grassland, desert, badland.
    #[must_use]
    pub const fn to_array(&self) -> [u32; 4] {
        [self.forest, self.grassland, self.desert, self.badland]
    }

    /// Rebuilds a score board from points ordered forest, grassland, desert, badland.
    #[must_use]
    pub const fn from_array(scores: [u32; 4]) -> Self {
        Self {
            forest: scores[0],
            grassland: scores[1],
            desert: scores[2],
            badland: scores[3],
        }
    }
}

/// Flat, serialisable copy of the whole grid plus the pass-through scores.
///
/// Every per-tile vector is indexed by flat tile index and has
/// `layout.width * layout.height` entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Geometry of the grid the snapshot was captured from.
    pub layout: HexLayout,
    /// Terrain per tile.
    pub terrain: Vec<Terrain>,
    /// Sprite per tile.
    pub sprite: Vec<SpriteIndex>,
    /// Pixel center per tile.
    pub center: Vec<PixelPoint>,
    /// Neighbour indices per tile.
    pub neighbors: Vec<Neighbors>,
    /// Highlight flag per tile; at most one is set.
    pub highlighted: Vec<bool>,
    /// Walkable flag per tile.
    pub walkable: Vec<bool>,
    /// Player flag per tile.
    pub has_player: Vec<bool>,
    /// Building flag per tile.
    pub has_building: Vec<bool>,
    /// Road flag per tile.
    pub has_road: Vec<bool>,
    /// Minigame scores carried alongside the grid, ordered F, G, D, B.
    pub scores: [u32; 4],
}
