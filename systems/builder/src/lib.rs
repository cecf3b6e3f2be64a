#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure overworld system that turns per-frame player input into grid commands
//! and decides how construction requests are fulfilled.

use loaf_core::{Command, GameKind, PixelPoint, Terrain, TileIndex, TileSnapshot};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuilderInput {
    /// Pointer position in grid space, present only while it hovers the map area.
    pub pointer: Option<PixelPoint>,
    /// Offset at which the grid is drawn.
    pub offset: PixelPoint,
    /// Player confirmed a move onto the highlighted tile.
    pub confirm_move: bool,
    /// Player requested a building on their tile.
    pub build: bool,
    /// Player requested a road on their tile.
    pub road: bool,
    /// Debug modifier held while requesting a building.
    pub debug: bool,
}

/// Outcome of a construction request that the caller must act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderFeedback {
    /// The request cannot be honoured on the player's tile.
    Denied {
        /// Tile the player stood on, if any.
        tile: Option<TileIndex>,
    },
    /// The building must be earned by playing a minigame first.
    LaunchMinigame {
        /// Minigame matching the tile terrain.
        kind: GameKind,
        /// Tile that receives the building once the minigame is won.
        tile: TileIndex,
    },
    /// The building was granted immediately through the debug shortcut.
    InstantBuild {
        /// Tile receiving the building.
        tile: TileIndex,
        /// Terrain of the tile, used to award the matching point.
        terrain: Terrain,
    },
}

/// Overworld system that translates input into commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Builder {
    allow_instant_build: bool,
}

impl Builder {
    /// Creates a builder; `allow_instant_build` enables the debug shortcut.
    #[must_use]
    pub const fn new(allow_instant_build: bool) -> Self {
        Self {
            allow_instant_build,
        }
    }

    /// Processes one frame of overworld input.
    ///
    /// `player` must mirror the world's `query::player_tile` for the current
    /// frame. Commands are appended to `out` in the order the world should
    /// apply them. Construction requests read `player` as given, so a move
    /// confirmed in the same call is not reflected; apply movement first when
    /// both can happen in one frame.
    pub fn handle(
        &self,
        input: BuilderInput,
        player: Option<&TileSnapshot>,
        out: &mut Vec<Command>,
    ) -> Option<BuilderFeedback> {
        if let Some(pointer) = input.pointer {
            out.push(Command::UpdateHighlight {
                pointer,
                offset: input.offset,
            });
            if input.confirm_move {
                out.push(Command::MovePlayer);
            }
        }

        if input.build {
            return Some(self.request_building(input.debug, player, out));
        }

        if input.road {
            return match player {
                Some(tile) if !tile.has_road => {
                    out.push(Command::BuildRoad { tile: tile.index });
                    None
                }
                _ => Some(BuilderFeedback::Denied {
                    tile: player.map(|tile| tile.index),
                }),
            };
        }

        None
    }

    fn request_building(
        &self,
        debug: bool,
        player: Option<&TileSnapshot>,
        out: &mut Vec<Command>,
    ) -> BuilderFeedback {
        let Some(tile) = player.filter(|tile| !tile.has_building) else {
            return BuilderFeedback::Denied {
                tile: player.map(|tile| tile.index),
            };
        };

        if debug && self.allow_instant_build {
            out.push(Command::Build { tile: tile.index });
            return BuilderFeedback::InstantBuild {
                tile: tile.index,
                terrain: tile.terrain,
            };
        }

        BuilderFeedback::LaunchMinigame {
            kind: tile.terrain.game_kind(),
            tile: tile.index,
        }
    }
}
