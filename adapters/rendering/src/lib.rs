#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for LOAF adapters.
//!
//! Everything here is plain data. The session layer fills a [`Scene`] once per
//! frame and a [`RenderingBackend`] turns it into pixels while reporting the
//! player's input back as a [`FrameInput`].

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use loaf_core::{HexDirection, HexLayout, TileIndex, TileSnapshot};
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white; leaves sprites untinted.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Yellow used for all overlay text.
    pub const YELLOW: Self = Self::from_rgb_u8(255, 255, 0);
    /// Dark slate gray background of the overworld.
    pub const DARK_SLATE_GRAY: Self = Self::from_rgb_u8(47, 79, 79);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Component-wise product, used to apply a tint to a base color.
    #[must_use]
    pub fn multiply(self, other: Color) -> Self {
        Self {
            red: self.red * other.red,
            green: self.green * other.green,
            blue: self.blue * other.blue,
            alpha: self.alpha * other.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
///
/// Pressed flags are edge-triggered for the current frame; held flags stay set
/// for as long as the button is down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Cursor position in logical scene units, absent when it left the window.
    pub cursor: Option<Vec2>,
    /// Left button went down this frame.
    pub primary_pressed: bool,
    /// Right button went down this frame.
    pub secondary_pressed: bool,
    /// Left button is held.
    pub primary_held: bool,
    /// Right button is held.
    pub secondary_held: bool,
    /// `Escape` went down this frame.
    pub back_pressed: bool,
    /// `B` went down this frame.
    pub build_pressed: bool,
    /// `R` went down this frame.
    pub road_pressed: bool,
    /// `S` went down this frame.
    pub save_pressed: bool,
    /// `Space` is held; enables debug overlays and shortcuts.
    pub debug_held: bool,
}

/// Whether the frame loop should keep running after an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Present the scene and continue with the next frame.
    Continue,
    /// Close the window.
    Exit,
}

/// Axis-aligned rectangle in logical scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl ScreenRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Whether the point lies inside the rectangle; the far edges are exclusive.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let end = self.origin + self.size;
        point.x >= self.origin.x && point.y >= self.origin.y && point.x < end.x && point.y < end.y
    }

    /// Center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }
}

/// Clickable labelled button.
#[derive(Clone, Debug, PartialEq)]
pub struct ButtonView {
    /// Text drawn inside the button.
    pub label: String,
    /// Clickable area.
    pub rect: ScreenRect,
    /// Whether the cursor currently hovers the button.
    pub hovered: bool,
}

impl ButtonView {
    /// Creates an unhovered button.
    #[must_use]
    pub fn new<T>(label: T, rect: ScreenRect) -> Self
    where
        T: Into<String>,
    {
        Self {
            label: label.into(),
            rect,
            hovered: false,
        }
    }
}

/// Line of text anchored at its top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    /// Text content.
    pub text: String,
    /// Top-left position in logical units.
    pub position: Vec2,
    /// Font size in logical units.
    pub size: f32,
    /// Text color.
    pub color: Color,
}

impl TextLine {
    /// Creates a yellow line of text.
    #[must_use]
    pub fn new<T>(text: T, position: Vec2, size: f32) -> Self
    where
        T: Into<String>,
    {
        Self {
            text: text.into(),
            position,
            size,
            color: Color::YELLOW,
        }
    }
}

/// Visual emphasis applied to a tile. Exactly one class applies per tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TintClass {
    /// No emphasis.
    Default,
    /// The pointer hovers the tile.
    Highlighted,
    /// The player may step onto the tile.
    Walkable,
    /// The player stands on the tile.
    Player,
}

impl TintClass {
    /// Picks the class for a tile: player beats walkable beats highlighted.
    #[must_use]
    pub const fn for_tile(tile: &TileSnapshot) -> Self {
        if tile.has_player {
            Self::Player
        } else if tile.walkable {
            Self::Walkable
        } else if tile.highlighted {
            Self::Highlighted
        } else {
            Self::Default
        }
    }

    /// Color multiplied into the tile when drawn.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Default => Color::WHITE,
            Self::Highlighted => Color::from_rgb_u8(144, 238, 144),
            Self::Walkable => Color::from_rgb_u8(255, 236, 160),
            Self::Player => Color::from_rgb_u8(255, 160, 160),
        }
    }
}

/// One overworld tile ready to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileDrawable {
    /// Tile the drawable represents.
    pub index: TileIndex,
    /// Top-left corner of the sprite (center minus half the tile extents).
    pub position: Vec2,
    /// Sprite center including the draw offset.
    pub center: Vec2,
    /// Zero-based region inside the tileset.
    pub region: u32,
    /// Emphasis applied to the sprite.
    pub tint: TintClass,
}

/// Segment of road leading from a tile center towards one neighbour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadEdge {
    /// Neighbour slot the segment points at.
    pub direction: HexDirection,
    /// Midpoint of the segment relative to the tile center.
    pub offset: Vec2,
    /// Rotation of the segment in radians, zero pointing right.
    pub rotation: f32,
}

/// Road drawn over a tile that carries a road but no building.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadOverlay {
    /// Tile the overlay belongs to.
    pub tile: TileIndex,
    /// Center of the tile including the draw offset; the center piece sits here.
    pub center: Vec2,
    /// One edge per neighbour that also carries a road.
    pub edges: Vec<RoadEdge>,
}

/// Offset and rotation of a road edge for every neighbour direction.
///
/// Each offset is half the vector between two neighbouring tile centers, so an
/// edge drawn from the center to `2 * offset` meets its neighbour's edge.
#[must_use]
pub fn road_edge_table(layout: &HexLayout) -> [RoadEdge; 6] {
    let column = layout.column_spacing();
    let half_pitch = layout.odd_column_offset();

    HexDirection::ALL.map(|direction| {
        let towards = match direction {
            HexDirection::UpLeft => Vec2::new(-column, -half_pitch),
            HexDirection::UpRight => Vec2::new(column, -half_pitch),
            HexDirection::Right => Vec2::new(column * 2.0, 0.0),
            HexDirection::DownRight => Vec2::new(column, half_pitch),
            HexDirection::DownLeft => Vec2::new(-column, half_pitch),
            HexDirection::Left => Vec2::new(-column * 2.0, 0.0),
        };
        RoadEdge {
            direction,
            offset: towards * 0.5,
            rotation: towards.y.atan2(towards.x),
        }
    })
}

/// Converts tile snapshots into drawables, skipping tiles whose sprite is empty.
#[must_use]
pub fn tile_drawables(tiles: &[TileSnapshot], layout: &HexLayout, offset: Vec2) -> Vec<TileDrawable> {
    let half_extent = Vec2::new(layout.tile_width as f32, layout.tile_height as f32) * 0.5;

    tiles
        .iter()
        .filter_map(|tile| {
            let region = tile.sprite.tileset_region()?;
            let center = Vec2::new(tile.center.x, tile.center.y) + offset;
            Some(TileDrawable {
                index: tile.index,
                position: center - half_extent,
                center,
                region,
                tint: TintClass::for_tile(tile),
            })
        })
        .collect()
}

/// Builds road overlays for tiles that carry a road without a building.
#[must_use]
pub fn road_overlays(tiles: &[TileSnapshot], layout: &HexLayout, offset: Vec2) -> Vec<RoadOverlay> {
    let table = road_edge_table(layout);
    let has_road = |index: TileIndex| tiles.get(index.slot()).is_some_and(|tile| tile.has_road);

    tiles
        .iter()
        .filter(|tile| tile.has_road && !tile.has_building)
        .map(|tile| RoadOverlay {
            tile: tile.index,
            center: Vec2::new(tile.center.x, tile.center.y) + offset,
            edges: table
                .iter()
                .zip(tile.neighbors)
                .filter(|(_, neighbor)| neighbor.is_some_and(has_road))
                .map(|(edge, _)| *edge)
                .collect(),
        })
        .collect()
}

/// Fallback flat color for a tileset region when no tileset texture is loaded.
#[must_use]
pub const fn region_color(region: u32) -> Color {
    match region.saturating_add(1) {
        1..=2 => Color::from_rgb_u8(104, 168, 72),
        3..=4 => Color::from_rgb_u8(150, 110, 80),
        5..=6 => Color::from_rgb_u8(222, 196, 120),
        7..=8 => Color::from_rgb_u8(40, 110, 60),
        9 | 13 => Color::from_rgb_u8(130, 190, 96),
        10 | 14 => Color::from_rgb_u8(176, 132, 100),
        11 | 15 => Color::from_rgb_u8(236, 212, 146),
        _ => Color::from_rgb_u8(64, 136, 84),
    }
}

/// Overworld map plus its toolbar and overlay text.
#[derive(Clone, Debug, PartialEq)]
pub struct OverworldView {
    /// Geometry of the map.
    pub layout: HexLayout,
    /// Tiles in draw order.
    pub tiles: Vec<TileDrawable>,
    /// Road overlays drawn above the tiles.
    pub roads: Vec<RoadOverlay>,
    /// Center of the player marker.
    pub player: Option<Vec2>,
    /// Build, road and save buttons.
    pub toolbar: Vec<ButtonView>,
    /// Text drawn above everything else.
    pub text: Vec<TextLine>,
}

/// Single swinging tool plus minigame progress.
#[derive(Clone, Debug, PartialEq)]
pub struct MinigameView {
    /// Anchor of the tool (the cursor).
    pub anchor: Vec2,
    /// Center of the tool head.
    pub head: Vec2,
    /// Radius of the head circle.
    pub head_radius: f32,
    /// Speed stage, from one to three; brighter when faster.
    pub stage: u32,
    /// Horizontal band the head must sweep through to strike.
    pub target: ScreenRect,
    /// Text drawn above everything else.
    pub text: Vec<TextLine>,
}

/// Title, selector, tutorial and credits screens.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuView {
    /// Large heading.
    pub title: TextLine,
    /// Body text.
    pub text: Vec<TextLine>,
    /// Clickable buttons.
    pub buttons: Vec<ButtonView>,
}

/// Scene description handed to the backend each frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Scene {
    /// A menu-like screen.
    Menu(MenuView),
    /// The overworld map.
    Overworld(OverworldView),
    /// A minigame in progress.
    Minigame(MinigameView),
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Size of the logical canvas; backends scale it uniformly to the window.
    pub logical_size: Vec2,
    /// Scene content that should be displayed first.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    pub fn new<T>(
        window_title: T,
        clear_color: Color,
        logical_size: Vec2,
        scene: Scene,
    ) -> Result<Self, RenderingError>
    where
        T: Into<String>,
    {
        if !(logical_size.x > 0.0 && logical_size.y > 0.0) {
            return Err(RenderingError::InvalidLogicalSize {
                width: logical_size.x,
                height: logical_size.y,
            });
        }

        Ok(Self {
            window_title: window_title.into(),
            clear_color,
            logical_size,
            scene,
        })
    }
}

/// Rendering backend capable of presenting LOAF scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the window closes or the update
    /// closure asks to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and replaces or mutates the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The logical canvas must have a positive area.
    #[error("logical size must be positive (received {width}x{height})")]
    InvalidLogicalSize {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}
