//! Immediate-mode drawing of LOAF scenes with macroquad's shape and text APIs.
//!
//! No tileset texture ships with the game, so tiles are drawn as flat
//! hexagons colored by their tileset region and tinted by emphasis.

use glam::Vec2;
use loaf_rendering::{
    region_color, ButtonView, Color, MenuView, MinigameView, OverworldView, Scene, TextLine,
};
use macroquad::color::{BLACK, WHITE};

use crate::CanvasMetrics;

const BUTTON_FILL: Color = Color::new(0.16, 0.18, 0.22, 0.9);
const BUTTON_HOVER_LIGHTEN: f32 = 0.25;
const ROAD_COLOR: Color = Color::new(0.55, 0.45, 0.33, 1.0);
const ROAD_WIDTH: f32 = 4.0;
const PLAYER_COLOR: Color = Color::new(0.85, 0.1, 0.1, 1.0);
const TOOL_HANDLE_WIDTH: f32 = 3.0;
const TILE_BORDER: f32 = 1.0;

pub(crate) fn draw_scene(scene: &Scene, metrics: &CanvasMetrics) {
    match scene {
        Scene::Menu(menu) => draw_menu(menu, metrics),
        Scene::Overworld(overworld) => draw_overworld(overworld, metrics),
        Scene::Minigame(minigame) => draw_minigame(minigame, metrics),
    }
}

fn draw_menu(menu: &MenuView, metrics: &CanvasMetrics) {
    draw_text_line(&menu.title, metrics);
    for line in &menu.text {
        draw_text_line(line, metrics);
    }
    for button in &menu.buttons {
        draw_button(button, metrics);
    }
}

fn draw_overworld(view: &OverworldView, metrics: &CanvasMetrics) {
    // Pointy-top hexagon touching its horizontal neighbours.
    let radius = view.layout.tile_width as f32 * 0.5 * metrics.scale;

    for tile in &view.tiles {
        let center = metrics.to_screen(tile.center);
        let fill = region_color(tile.region).multiply(tile.tint.color());
        macroquad::shapes::draw_hexagon(
            center.x,
            center.y,
            radius,
            TILE_BORDER,
            true,
            BLACK,
            to_macroquad_color(fill),
        );
    }

    let road_color = to_macroquad_color(ROAD_COLOR);
    let road_width = ROAD_WIDTH * metrics.scale;
    for road in &view.roads {
        let center = metrics.to_screen(road.center);
        for edge in &road.edges {
            let end = metrics.to_screen(road.center + edge.offset);
            macroquad::shapes::draw_line(center.x, center.y, end.x, end.y, road_width, road_color);
        }
        macroquad::shapes::draw_circle(center.x, center.y, road_width, road_color);
    }

    if let Some(player) = view.player {
        let center = metrics.to_screen(player);
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            radius * 0.35,
            to_macroquad_color(PLAYER_COLOR),
        );
        macroquad::shapes::draw_circle_lines(center.x, center.y, radius * 0.35, 1.5, BLACK);
    }

    for button in &view.toolbar {
        draw_button(button, metrics);
    }
    for line in &view.text {
        draw_text_line(line, metrics);
    }
}

fn draw_minigame(view: &MinigameView, metrics: &CanvasMetrics) {
    let target_origin = metrics.to_screen(view.target.origin);
    let target_size = view.target.size * metrics.scale;
    macroquad::shapes::draw_rectangle_lines(
        target_origin.x,
        target_origin.y,
        target_size.x,
        target_size.y,
        2.0,
        to_macroquad_color(Color::YELLOW),
    );

    let anchor = metrics.to_screen(view.anchor);
    let head = metrics.to_screen(view.head);
    macroquad::shapes::draw_line(
        anchor.x,
        anchor.y,
        head.x,
        head.y,
        TOOL_HANDLE_WIDTH * metrics.scale,
        WHITE,
    );

    let head_color = stage_color(view.stage);
    macroquad::shapes::draw_circle(
        head.x,
        head.y,
        view.head_radius * metrics.scale,
        to_macroquad_color(head_color),
    );

    for line in &view.text {
        draw_text_line(line, metrics);
    }
}

fn stage_color(stage: u32) -> Color {
    let base = Color::from_rgb_u8(120, 120, 130);
    base.lighten(0.25 * stage.saturating_sub(1) as f32)
}

fn draw_button(button: &ButtonView, metrics: &CanvasMetrics) {
    let origin = metrics.to_screen(button.rect.origin);
    let size = button.rect.size * metrics.scale;
    let fill = if button.hovered {
        BUTTON_FILL.lighten(BUTTON_HOVER_LIGHTEN)
    } else {
        BUTTON_FILL
    };

    macroquad::shapes::draw_rectangle(origin.x, origin.y, size.x, size.y, to_macroquad_color(fill));
    macroquad::shapes::draw_rectangle_lines(origin.x, origin.y, size.x, size.y, 1.5, WHITE);

    let label_size = (size.y * 0.5).max(8.0);
    let label = macroquad::text::measure_text(&button.label, None, label_size as u16, 1.0);
    let center = metrics.to_screen(button.rect.center());
    let _ = macroquad::text::draw_text(
        &button.label,
        center.x - label.width * 0.5,
        center.y + label.height * 0.5,
        label_size,
        WHITE,
    );
}

fn draw_text_line(line: &TextLine, metrics: &CanvasMetrics) {
    let size = line.size * metrics.scale;
    // Text lines are anchored at the top-left; macroquad draws from the baseline.
    let anchor = metrics.to_screen(line.position) + Vec2::new(0.0, size);
    let _ = macroquad::text::draw_text(
        &line.text,
        anchor.x,
        anchor.y,
        size,
        to_macroquad_color(line.color),
    );
}

pub(crate) fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
