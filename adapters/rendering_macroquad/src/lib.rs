#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for LOAF.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries. The game has no sound, so the dependency is declared without
//! the default `audio` feature.
//!
//! Scenes are authored on a fixed logical canvas. The backend scales that
//! canvas uniformly to fit the window, letterboxing the remainder, and maps
//! the cursor back into logical units before handing it to the session.

mod draw;

use anyhow::Result;
use glam::Vec2;
use loaf_rendering::{FrameControl, FrameInput, Presentation, RenderingBackend, Scene};
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_down, is_mouse_button_pressed, mouse_position,
    KeyCode, MouseButton,
};
use std::time::Duration;

const DEFAULT_WINDOW_WIDTH: i32 = 1280;
const DEFAULT_WINDOW_HEIGHT: i32 = 720;

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    window_width: i32,
    window_height: i32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures the initial window size in physical pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = i32::try_from(width).unwrap_or(DEFAULT_WINDOW_WIDTH);
        self.window_height = i32::try_from(height).unwrap_or(DEFAULT_WINDOW_HEIGHT);
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Self {
            swap_interval,
            window_width,
            window_height,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            logical_size,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = draw::to_macroquad_color(clear_color);

            loop {
                let metrics = CanvasMetrics::new(
                    logical_size,
                    Vec2::new(
                        macroquad::window::screen_width(),
                        macroquad::window::screen_height(),
                    ),
                );

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(&metrics);

                if update_scene(frame_dt, frame_input, &mut scene) == FrameControl::Exit {
                    break;
                }

                macroquad::window::clear_background(background);
                draw::draw_scene(&scene, &metrics);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Uniform scale and letterbox offset mapping the logical canvas to the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CanvasMetrics {
    pub(crate) scale: f32,
    pub(crate) offset: Vec2,
    pub(crate) logical_size: Vec2,
}

impl CanvasMetrics {
    pub(crate) fn new(logical_size: Vec2, screen_size: Vec2) -> Self {
        let scale = if logical_size.x <= f32::EPSILON || logical_size.y <= f32::EPSILON {
            1.0
        } else {
            (screen_size.x / logical_size.x).min(screen_size.y / logical_size.y)
        };
        let offset = ((screen_size - logical_size * scale) * 0.5).max(Vec2::ZERO);

        Self {
            scale,
            offset,
            logical_size,
        }
    }

    pub(crate) fn to_screen(&self, logical: Vec2) -> Vec2 {
        self.offset + logical * self.scale
    }

    fn to_logical(&self, screen: Vec2) -> Option<Vec2> {
        if self.scale <= f32::EPSILON {
            return None;
        }
        let logical = (screen - self.offset) / self.scale;
        let inside = logical.x >= 0.0
            && logical.y >= 0.0
            && logical.x <= self.logical_size.x
            && logical.y <= self.logical_size.y;
        inside.then_some(logical)
    }
}

/// Raw device state observed during one frame.
#[derive(Clone, Copy, Debug, Default)]
struct DeviceObservations {
    cursor: Vec2,
    primary_pressed: bool,
    secondary_pressed: bool,
    primary_held: bool,
    secondary_held: bool,
    escape_pressed: bool,
    build_pressed: bool,
    road_pressed: bool,
    save_pressed: bool,
    space_held: bool,
}

impl DeviceObservations {
    fn poll() -> Self {
        let (cursor_x, cursor_y) = mouse_position();
        Self {
            cursor: Vec2::new(cursor_x, cursor_y),
            primary_pressed: is_mouse_button_pressed(MouseButton::Left),
            secondary_pressed: is_mouse_button_pressed(MouseButton::Right),
            primary_held: is_mouse_button_down(MouseButton::Left),
            secondary_held: is_mouse_button_down(MouseButton::Right),
            escape_pressed: is_key_pressed(KeyCode::Escape),
            build_pressed: is_key_pressed(KeyCode::B),
            road_pressed: is_key_pressed(KeyCode::R),
            save_pressed: is_key_pressed(KeyCode::S),
            space_held: is_key_down(KeyCode::Space),
        }
    }
}

fn gather_frame_input(metrics: &CanvasMetrics) -> FrameInput {
    gather_frame_input_from_observations(metrics, DeviceObservations::poll())
}

fn gather_frame_input_from_observations(
    metrics: &CanvasMetrics,
    observed: DeviceObservations,
) -> FrameInput {
    FrameInput {
        cursor: metrics.to_logical(observed.cursor),
        primary_pressed: observed.primary_pressed,
        secondary_pressed: observed.secondary_pressed,
        primary_held: observed.primary_held,
        secondary_held: observed.secondary_held,
        back_pressed: observed.escape_pressed,
        build_pressed: observed.build_pressed,
        road_pressed: observed.road_pressed,
        save_pressed: observed.save_pressed,
        debug_held: observed.space_held,
    }
}
