//! Scene flow of the game.
//!
//! The session owns every piece of mutable game state. Scenes never switch
//! mid-frame: a handler requests a [`SceneTransition`], and the session
//! consumes it exactly once at the start of the following frame.

use std::{path::PathBuf, time::Duration};

use glam::Vec2;
use loaf_core::{Command, Event, GameKind, HexLayout, PixelPoint, ScoreBoard, TileIndex};
use loaf_rendering::{
    road_overlays, tile_drawables, ButtonView, Color, FrameControl, FrameInput, MenuView,
    MinigameView, OverworldView, Scene, ScreenRect, TextLine,
};
use loaf_system_builder::{Builder, BuilderFeedback, BuilderInput};
use loaf_system_rotator::{Rotator, RotatorInput};
use loaf_system_scoring::ScoreTimer;
use loaf_world::{query, GridError, HexGrid};
use tracing::{debug, info, warn};

use crate::{map_format::MapDescription, persistence};

/// Size of the logical canvas every scene is laid out on.
pub(crate) const LOGICAL_SIZE: Vec2 = Vec2::new(960.0, 720.0);

const TOOLBAR_HEIGHT: f32 = LOGICAL_SIZE.y * 0.1;
const FOOTER_LINE: f32 = 40.0;
const BUTTON_SIZE: Vec2 = Vec2::new(240.0, 44.0);
const BUTTON_SPACING: f32 = 60.0;
const MENU_TOP: f32 = 250.0;

const TOOLBAR_BUILD: usize = 0;
const TOOLBAR_ROAD: usize = 1;
const TOOLBAR_SAVE: usize = 2;

const TOOL_LENGTH: f32 = 56.0;
const HEAD_RADIUS: f32 = 10.0;
const TARGET_SIZE: Vec2 = Vec2::new(48.0, 20.0);

const HELP_TEXT: &str = "ESC to return, Left mouse to move to adjacent tiles, Spacebar for debug";
const HINT_TEXT: &str = "Build on at least 1 of each terrain and connect with roads";

/// Rules the session is started with.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SessionSettings {
    pub(crate) save_path: PathBuf,
    pub(crate) start_tile: TileIndex,
    pub(crate) strikes_required: u32,
    pub(crate) debug_build: bool,
}

/// Where a minigame returns to once it ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MinigameOrigin {
    /// Started from the practice selector.
    Practice,
    /// Started by building on an overworld tile.
    Overworld(TileIndex),
}

/// Points earned by a finished minigame, carried back to the overworld.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Reward {
    kind: GameKind,
    tile: TileIndex,
    score: u32,
}

/// Scene change requested during one frame and applied at the start of the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SceneTransition {
    Title,
    MinigameSelector,
    Credits,
    NewGame,
    ContinueGame,
    StartMinigame {
        kind: GameKind,
        origin: MinigameOrigin,
    },
    ReturnToOverworld {
        reward: Option<Reward>,
    },
    Quit,
}

#[derive(Debug)]
enum ActiveScene {
    Title,
    MinigameSelector,
    Overworld,
    Minigame(MinigameState),
    Credits,
}

/// Owner of all game state; driven once per frame by the rendering backend.
#[derive(Debug)]
pub(crate) struct Session {
    settings: SessionSettings,
    fresh_grid: HexGrid,
    scene: ActiveScene,
    pending: Option<SceneTransition>,
    overworld: Option<OverworldState>,
    cursor: Option<Vec2>,
}

impl Session {
    /// Creates a session on the title screen. Fails when the map cannot host
    /// the configured start tile.
    pub(crate) fn new(settings: SessionSettings, map: &MapDescription) -> Result<Self, GridError> {
        let fresh_grid = HexGrid::new(map.layout, &map.indices, settings.start_tile)?;

        Ok(Self {
            settings,
            fresh_grid,
            scene: ActiveScene::Title,
            pending: None,
            overworld: None,
            cursor: None,
        })
    }

    /// Queues a scene change for the next frame, replacing any earlier request.
    pub(crate) fn request(&mut self, transition: SceneTransition) {
        self.pending = Some(transition);
    }

    /// Advances the active scene by one frame.
    pub(crate) fn frame(&mut self, dt: Duration, input: FrameInput) -> FrameControl {
        if let Some(transition) = self.pending.take() {
            if self.enter(transition) == FrameControl::Exit {
                return FrameControl::Exit;
            }
        }

        self.cursor = input.cursor;
        let requested = match &mut self.scene {
            ActiveScene::Title => title_update(&input),
            ActiveScene::MinigameSelector => selector_update(&input),
            ActiveScene::Credits => credits_update(&input),
            ActiveScene::Minigame(minigame) => minigame.update(dt, &input),
            ActiveScene::Overworld => match self.overworld.as_mut() {
                Some(overworld) => overworld.update(&input, &self.settings.save_path),
                None => Some(SceneTransition::Title),
            },
        };

        if let Some(transition) = requested {
            self.request(transition);
        }
        FrameControl::Continue
    }

    fn enter(&mut self, transition: SceneTransition) -> FrameControl {
        info!(?transition, "scene_transition");

        self.scene = match transition {
            SceneTransition::Title => ActiveScene::Title,
            SceneTransition::MinigameSelector => ActiveScene::MinigameSelector,
            SceneTransition::Credits => ActiveScene::Credits,
            SceneTransition::NewGame => {
                self.overworld = Some(OverworldState::new(
                    self.fresh_grid.clone(),
                    ScoreBoard::new(),
                    self.builder(),
                ));
                ActiveScene::Overworld
            }
            SceneTransition::ContinueGame => {
                self.overworld = Some(self.resume_from_save());
                ActiveScene::Overworld
            }
            SceneTransition::StartMinigame { kind, origin } => ActiveScene::Minigame(
                MinigameState::new(kind, origin, self.settings.strikes_required),
            ),
            SceneTransition::ReturnToOverworld { reward } => match self.overworld.as_mut() {
                Some(overworld) => {
                    if let Some(reward) = reward {
                        overworld.apply_reward(reward);
                    }
                    ActiveScene::Overworld
                }
                None => {
                    warn!("overworld_missing_on_return");
                    ActiveScene::Title
                }
            },
            SceneTransition::Quit => return FrameControl::Exit,
        };

        FrameControl::Continue
    }

    fn builder(&self) -> Builder {
        Builder::new(self.settings.debug_build)
    }

    fn resume_from_save(&self) -> OverworldState {
        let mut grid = self.fresh_grid.clone();
        let mut scores = ScoreBoard::new();

        if let Some(snapshot) = persistence::load(&self.settings.save_path) {
            match grid.restore(&snapshot) {
                Ok(restored) => scores = restored,
                Err(error) => warn!(%error, "save_rejected_starting_fresh"),
            }
        }

        OverworldState::new(grid, scores, self.builder())
    }

    /// Describes the active scene for the renderer.
    pub(crate) fn view(&self) -> Scene {
        match &self.scene {
            ActiveScene::Title => Scene::Menu(title_view(self.cursor)),
            ActiveScene::MinigameSelector => Scene::Menu(selector_view(self.cursor)),
            ActiveScene::Credits => Scene::Menu(credits_view(self.cursor)),
            ActiveScene::Minigame(minigame) => Scene::Minigame(minigame.view()),
            ActiveScene::Overworld => match &self.overworld {
                Some(overworld) => Scene::Overworld(overworld.view(self.cursor)),
                None => Scene::Menu(title_view(self.cursor)),
            },
        }
    }
}

const TITLE_BUTTONS: [&str; 5] = ["New game", "Continue", "Practice", "Credits", "Quit"];

fn title_update(input: &FrameInput) -> Option<SceneTransition> {
    if input.back_pressed {
        return Some(SceneTransition::Quit);
    }

    match clicked_button(&button_column(TITLE_BUTTONS, None), input)? {
        0 => Some(SceneTransition::NewGame),
        1 => Some(SceneTransition::ContinueGame),
        2 => Some(SceneTransition::MinigameSelector),
        3 => Some(SceneTransition::Credits),
        _ => Some(SceneTransition::Quit),
    }
}

fn title_view(cursor: Option<Vec2>) -> MenuView {
    MenuView {
        title: heading("LOAF"),
        text: vec![TextLine::new(
            "Earn your buildings, then connect them with roads",
            Vec2::new(LOGICAL_SIZE.x * 0.5 - 230.0, 170.0),
            22.0,
        )],
        buttons: button_column(TITLE_BUTTONS, cursor),
    }
}

fn selector_labels() -> impl Iterator<Item = &'static str> {
    GameKind::ALL
        .into_iter()
        .map(GameKind::label)
        .chain(std::iter::once("Back"))
}

fn selector_update(input: &FrameInput) -> Option<SceneTransition> {
    if input.back_pressed {
        return Some(SceneTransition::Title);
    }

    let clicked = clicked_button(&button_column(selector_labels(), None), input)?;
    match GameKind::ALL.get(clicked) {
        Some(&kind) => Some(SceneTransition::StartMinigame {
            kind,
            origin: MinigameOrigin::Practice,
        }),
        None => Some(SceneTransition::Title),
    }
}

fn selector_view(cursor: Option<Vec2>) -> MenuView {
    MenuView {
        title: heading("Practice"),
        text: vec![TextLine::new(
            "Pick a minigame. Practice runs award no points.",
            Vec2::new(LOGICAL_SIZE.x * 0.5 - 230.0, 170.0),
            22.0,
        )],
        buttons: button_column(selector_labels(), cursor),
    }
}

const CREDITS: [&str; 3] = [
    "Design and programming: the LOAF team",
    "Built with macroquad",
    "Thanks for playing!",
];

fn credits_update(input: &FrameInput) -> Option<SceneTransition> {
    let back = clicked_button(&button_column(["Back"], None), input).is_some();
    (back || input.back_pressed).then_some(SceneTransition::Title)
}

fn credits_view(cursor: Option<Vec2>) -> MenuView {
    MenuView {
        title: heading("Credits"),
        text: CREDITS
            .iter()
            .enumerate()
            .map(|(line, text)| {
                TextLine::new(
                    *text,
                    Vec2::new(LOGICAL_SIZE.x * 0.5 - 220.0, 150.0 + line as f32 * 30.0),
                    22.0,
                )
            })
            .collect(),
        buttons: button_column(["Back"], cursor)
            .into_iter()
            .map(|mut button| {
                button.rect.origin.y += BUTTON_SPACING * 2.0;
                button
            })
            .collect(),
    }
}

fn heading(text: &str) -> TextLine {
    TextLine {
        color: Color::WHITE,
        ..TextLine::new(text, Vec2::new(LOGICAL_SIZE.x * 0.5 - 90.0, 60.0), 64.0)
    }
}

fn button_column<'a, I>(labels: I, cursor: Option<Vec2>) -> Vec<ButtonView>
where
    I: IntoIterator<Item = &'a str>,
{
    labels
        .into_iter()
        .enumerate()
        .map(|(row, label)| {
            let origin = Vec2::new(
                (LOGICAL_SIZE.x - BUTTON_SIZE.x) * 0.5,
                MENU_TOP + row as f32 * BUTTON_SPACING,
            );
            hoverable(ButtonView::new(label, ScreenRect::new(origin, BUTTON_SIZE)), cursor)
        })
        .collect()
}

fn toolbar_buttons(cursor: Option<Vec2>) -> Vec<ButtonView> {
    let size = Vec2::new(LOGICAL_SIZE.x * 0.12, LOGICAL_SIZE.y * 0.06);
    [("Build", 0.55), ("Road", 0.7), ("Save", 0.85)]
        .into_iter()
        .map(|(label, x)| {
            let origin = Vec2::new(LOGICAL_SIZE.x * x, LOGICAL_SIZE.y * 0.02);
            hoverable(ButtonView::new(label, ScreenRect::new(origin, size)), cursor)
        })
        .collect()
}

fn hoverable(mut button: ButtonView, cursor: Option<Vec2>) -> ButtonView {
    button.hovered = cursor.is_some_and(|cursor| button.rect.contains(cursor));
    button
}

fn clicked_button(buttons: &[ButtonView], input: &FrameInput) -> Option<usize> {
    if !input.primary_pressed {
        return None;
    }
    let cursor = input.cursor?;
    buttons.iter().position(|button| button.rect.contains(cursor))
}

fn to_pixel(point: Vec2) -> PixelPoint {
    PixelPoint::new(point.x, point.y)
}

fn to_vec2(point: PixelPoint) -> Vec2 {
    Vec2::new(point.x, point.y)
}

/// Centers the map horizontally and below the toolbar.
fn map_offset(layout: &HexLayout) -> Vec2 {
    let size = to_vec2(layout.pixel_size());
    Vec2::new(
        ((LOGICAL_SIZE.x - size.x) * 0.5).max(0.0),
        ((LOGICAL_SIZE.y - size.y) * 0.5).max(TOOLBAR_HEIGHT),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Victory {
    minigame_score: u32,
    road_score: usize,
}

#[derive(Debug)]
struct OverworldState {
    grid: HexGrid,
    scores: ScoreBoard,
    builder: Builder,
    offset: Vec2,
    victory: Option<Victory>,
    status: Option<String>,
    show_hint: bool,
    debug: bool,
}

impl OverworldState {
    fn new(grid: HexGrid, scores: ScoreBoard, builder: Builder) -> Self {
        let offset = map_offset(&query::layout(&grid));
        let mut state = Self {
            grid,
            scores,
            builder,
            offset,
            victory: None,
            status: None,
            show_hint: true,
            debug: false,
        };
        state.check_victory();
        state
    }

    fn update(&mut self, input: &FrameInput, save_path: &std::path::Path) -> Option<SceneTransition> {
        self.debug = input.debug_held;
        if input.back_pressed {
            return Some(SceneTransition::Title);
        }

        let in_toolbar = input.cursor.is_some_and(|cursor| cursor.y < TOOLBAR_HEIGHT);
        let clicked = clicked_button(&toolbar_buttons(None), input);

        if input.save_pressed || clicked == Some(TOOLBAR_SAVE) {
            self.save(save_path);
        }

        let pointing = BuilderInput {
            pointer: input.cursor.filter(|_| !in_toolbar).map(to_pixel),
            offset: to_pixel(self.offset),
            confirm_move: input.primary_pressed && !in_toolbar,
            ..BuilderInput::default()
        };
        let constructing = BuilderInput {
            build: input.build_pressed || clicked == Some(TOOLBAR_BUILD),
            road: input.road_pressed || clicked == Some(TOOLBAR_ROAD),
            debug: input.debug_held,
            ..BuilderInput::default()
        };

        // Construction targets the tile the player stands on after this frame's move.
        let _ = self.run_builder(pointing);
        let feedback = self.run_builder(constructing);

        match feedback? {
            BuilderFeedback::Denied { tile } => {
                debug!(tile = ?tile.map(|tile| tile.get()), "construction_denied");
                self.status = Some("Nothing to build here".to_owned());
                None
            }
            BuilderFeedback::LaunchMinigame { kind, tile } => {
                info!(game = kind.label(), tile = tile.get(), "minigame_launched");
                Some(SceneTransition::StartMinigame {
                    kind,
                    origin: MinigameOrigin::Overworld(tile),
                })
            }
            BuilderFeedback::InstantBuild { tile, terrain } => {
                self.scores.award(terrain, 1);
                info!(tile = tile.get(), ?terrain, "instant_build");
                self.check_victory();
                None
            }
        }
    }

    fn run_builder(&mut self, input: BuilderInput) -> Option<BuilderFeedback> {
        let player = query::player_tile(&self.grid);
        let mut commands = Vec::new();
        let feedback = self.builder.handle(input, player.as_ref(), &mut commands);
        self.execute(commands);
        feedback
    }

    fn execute(&mut self, commands: Vec<Command>) {
        let mut events = Vec::new();
        for command in commands {
            loaf_world::apply(&mut self.grid, command, &mut events);
        }

        let mut constructed = false;
        for event in events {
            match event {
                Event::HighlightChanged { .. } => {}
                Event::PlayerMoved { from, to } => {
                    self.show_hint = false;
                    debug!(from = ?from.map(|tile| tile.get()), to = to.get(), "player_moved");
                }
                Event::MoveRejected { target, reason } => {
                    debug!(target = ?target.map(|tile| tile.get()), ?reason, "move_rejected");
                }
                Event::BuildingPlaced { tile, terrain, .. } => {
                    info!(tile = tile.get(), ?terrain, "building_placed");
                    constructed = true;
                }
                Event::RoadPlaced { tile } => {
                    info!(tile = tile.get(), "road_placed");
                    constructed = true;
                }
                Event::BuildRejected { tile, reason } | Event::RoadRejected { tile, reason } => {
                    debug!(tile = tile.get(), ?reason, "construction_rejected");
                }
            }
        }

        if constructed {
            self.check_victory();
        }
    }

    fn apply_reward(&mut self, reward: Reward) {
        let Reward { kind, tile, score } = reward;
        self.scores.award(kind.terrain(), score);
        info!(game = kind.label(), score, "minigame_scored");

        if score > 0 {
            self.execute(vec![Command::Build { tile }]);
        }
        self.check_victory();
    }

    fn check_victory(&mut self) {
        if self.victory.is_some() || !self.scores.is_complete() {
            return;
        }

        let report = query::road_network(&self.grid);
        if report.covers_all_building_types {
            let victory = Victory {
                minigame_score: self.scores.total(),
                road_score: report.visited / 4,
            };
            info!(
                minigame_score = victory.minigame_score,
                road_score = victory.road_score,
                "victory"
            );
            self.victory = Some(victory);
        }
    }

    fn save(&mut self, path: &std::path::Path) {
        let snapshot = self.grid.to_snapshot(self.scores);
        let message = if persistence::save(path, &snapshot) {
            "Game saved"
        } else {
            "Save failed"
        };
        self.status = Some(message.to_owned());
    }

    fn view(&self, cursor: Option<Vec2>) -> OverworldView {
        let layout = query::layout(&self.grid);
        let tiles = query::tiles(&self.grid);
        let left = LOGICAL_SIZE.x * 0.01;
        let footer = Vec2::new(left, LOGICAL_SIZE.y - FOOTER_LINE);
        let above_footer = Vec2::new(left, LOGICAL_SIZE.y - FOOTER_LINE * 2.0);

        let mut text = vec![TextLine::new(
            HELP_TEXT,
            Vec2::new(left, TOOLBAR_HEIGHT * 0.35),
            14.0,
        )];
        if let Some(victory) = self.victory {
            text.push(TextLine::new(
                format!(
                    "Victory! Minigame Score: {} Road Score: {}",
                    victory.minigame_score, victory.road_score
                ),
                footer,
                24.0,
            ));
        } else if self.show_hint {
            text.push(TextLine::new(HINT_TEXT, footer, 24.0));
        }
        if let Some(status) = &self.status {
            text.push(TextLine::new(status.clone(), above_footer, 18.0));
        }
        if self.debug {
            let scores = self.scores.to_array().map(|points| points.to_string()).join(", ");
            text.push(TextLine::new(
                format!("ScoresFGDB: {scores}"),
                Vec2::new(LOGICAL_SIZE.x * 0.75, above_footer.y),
                18.0,
            ));
            if let Some(highlighted) = query::highlighted_tile(&self.grid) {
                let neighbors: Vec<String> = highlighted
                    .neighbors
                    .iter()
                    .map(|neighbor| neighbor.map_or("-".to_owned(), |tile| tile.get().to_string()))
                    .collect();
                text.push(TextLine::new(
                    format!(
                        "Tile {} neighbours: {}",
                        highlighted.index.get(),
                        neighbors.join(", ")
                    ),
                    Vec2::new(LOGICAL_SIZE.x * 0.5, footer.y),
                    18.0,
                ));
            }
        }

        OverworldView {
            layout,
            tiles: tile_drawables(&tiles, &layout, self.offset),
            roads: road_overlays(&tiles, &layout, self.offset),
            player: query::player_tile(&self.grid).map(|tile| to_vec2(tile.center) + self.offset),
            toolbar: toolbar_buttons(cursor),
            text,
        }
    }
}

#[derive(Debug)]
struct MinigameState {
    origin: MinigameOrigin,
    rotator: Rotator,
    timer: ScoreTimer,
    strikes: u32,
    strikes_required: u32,
    anchor: Vec2,
}

impl MinigameState {
    fn new(kind: GameKind, origin: MinigameOrigin, strikes_required: u32) -> Self {
        Self {
            origin,
            rotator: Rotator::default(),
            timer: ScoreTimer::new(kind),
            strikes: 0,
            strikes_required: strikes_required.max(1),
            anchor: LOGICAL_SIZE * Vec2::new(0.5, 0.35),
        }
    }

    fn kind(&self) -> GameKind {
        self.timer.kind()
    }

    fn update(&mut self, dt: Duration, input: &FrameInput) -> Option<SceneTransition> {
        if let Some(score) = self.timer.last_score() {
            let dismissed = input.primary_pressed || input.secondary_pressed || input.back_pressed;
            return dismissed.then(|| self.exit(Some(score)));
        }

        if input.back_pressed {
            self.timer.stop();
            info!(
                game = self.kind().label(),
                strikes = self.strikes,
                elapsed_ms = self.timer.elapsed().as_millis(),
                "minigame_abandoned"
            );
            return Some(self.exit(None));
        }

        if let Some(cursor) = input.cursor {
            self.anchor = cursor;
        }
        self.timer.advance(dt);

        let push = RotatorInput {
            push_positive: input.primary_held,
            push_negative: input.secondary_held,
        };
        if let Some(strike) = self.rotator.step(dt.as_secs_f32(), push) {
            self.strikes = self.strikes.saturating_add(1);
            debug!(power = strike.power(), strikes = self.strikes, "strike");

            // Pickaxe strikes bounce off the ore.
            if self.kind() == GameKind::Mining {
                self.rotator.rebound();
            }

            if self.strikes >= self.strikes_required {
                let score = self.timer.finish();
                info!(
                    game = self.kind().label(),
                    score,
                    elapsed_ms = self.timer.elapsed().as_millis(),
                    "minigame_complete"
                );
            }
        }

        None
    }

    fn exit(&self, score: Option<u32>) -> SceneTransition {
        match self.origin {
            MinigameOrigin::Practice => SceneTransition::MinigameSelector,
            MinigameOrigin::Overworld(tile) => SceneTransition::ReturnToOverworld {
                reward: score.map(|score| Reward {
                    kind: self.kind(),
                    tile,
                    score,
                }),
            },
        }
    }

    fn view(&self) -> MinigameView {
        let head = self.anchor + self.rotator.head_direction() * TOOL_LENGTH;
        let bottom = self.anchor + Vec2::new(0.0, TOOL_LENGTH);
        let left = LOGICAL_SIZE.x * 0.02;

        let mut text = vec![
            TextLine::new(
                format!(
                    "{}: {}/{} strikes",
                    self.kind().label(),
                    self.strikes,
                    self.strikes_required
                ),
                Vec2::new(left, 20.0),
                24.0,
            ),
            TextLine::new(
                format!("Time {:.1}s", self.timer.elapsed().as_secs_f32()),
                Vec2::new(left, 50.0),
                20.0,
            ),
            TextLine::new(
                "Hold the left or right mouse button to swing, ESC to give up",
                Vec2::new(left, LOGICAL_SIZE.y - FOOTER_LINE),
                18.0,
            ),
        ];
        if let Some(score) = self.timer.last_score() {
            text.push(TextLine::new(
                format!("Finished! Score: {score}. Click to continue"),
                Vec2::new(LOGICAL_SIZE.x * 0.5 - 200.0, LOGICAL_SIZE.y * 0.75),
                28.0,
            ));
        }

        MinigameView {
            anchor: self.anchor,
            head,
            head_radius: HEAD_RADIUS,
            stage: self.rotator.stage().number(),
            target: ScreenRect::new(bottom - TARGET_SIZE * 0.5, TARGET_SIZE),
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loaf_core::Terrain;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn settings(save_name: &str) -> SessionSettings {
        SessionSettings {
            save_path: std::env::temp_dir()
                .join(format!("loaf-session-{}", std::process::id()))
                .join(save_name),
            start_tile: TileIndex::new(0),
            strikes_required: 3,
            debug_build: true,
        }
    }

    /// A single row of four tiles, one per terrain, each adjacent to the next.
    fn strip_map() -> MapDescription {
        MapDescription::parse("tiles.png\n32,32\n4,1\n1,3,5,7\n").expect("valid map")
    }

    fn session(save_name: &str) -> Session {
        Session::new(settings(save_name), &strip_map()).expect("valid session")
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn click(at: Vec2) -> FrameInput {
        FrameInput {
            cursor: Some(at),
            primary_pressed: true,
            primary_held: true,
            ..FrameInput::default()
        }
    }

    fn press_title_button(session: &mut Session, label: &str) {
        let buttons = button_column(TITLE_BUTTONS, None);
        let button = buttons
            .iter()
            .find(|button| button.label == label)
            .expect("title button exists");
        let _ = session.frame(FRAME, click(button.rect.center()));
        let _ = session.frame(FRAME, idle());
    }

    fn overworld(session: &Session) -> &OverworldState {
        session.overworld.as_ref().expect("overworld running")
    }

    fn tile_position(session: &Session, index: u32) -> Vec2 {
        let state = overworld(session);
        let tile = query::tile(&state.grid, TileIndex::new(index)).expect("tile exists");
        to_vec2(tile.center) + state.offset
    }

    fn debug_key(build: bool, road: bool) -> FrameInput {
        FrameInput {
            build_pressed: build,
            road_pressed: road,
            debug_held: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn transitions_apply_on_the_following_frame() {
        let mut session = session("unused.json");
        let buttons = button_column(TITLE_BUTTONS, None);

        let _ = session.frame(FRAME, click(buttons[0].rect.center()));
        assert!(matches!(session.scene, ActiveScene::Title));
        assert_eq!(session.pending, Some(SceneTransition::NewGame));

        let _ = session.frame(FRAME, idle());
        assert!(matches!(session.scene, ActiveScene::Overworld));
        assert_eq!(session.pending, None);
        assert!(matches!(session.view(), Scene::Overworld(_)));
    }

    #[test]
    fn quit_closes_the_window() {
        let mut session = session("unused.json");
        let quit = button_column(TITLE_BUTTONS, None)[4].rect.center();

        assert_eq!(session.frame(FRAME, click(quit)), FrameControl::Continue);
        assert_eq!(session.frame(FRAME, idle()), FrameControl::Exit);
    }

    #[test]
    fn escape_keeps_the_overworld_for_later() {
        let mut session = session("unused.json");
        press_title_button(&mut session, "New game");
        let target = tile_position(&session, 1);
        let _ = session.frame(FRAME, click(target));
        assert_eq!(overworld(&session).grid.player_index(), Some(TileIndex::new(1)));

        let _ = session.frame(
            FRAME,
            FrameInput {
                back_pressed: true,
                ..FrameInput::default()
            },
        );
        let _ = session.frame(FRAME, idle());

        assert!(matches!(session.scene, ActiveScene::Title));
        assert_eq!(overworld(&session).grid.player_index(), Some(TileIndex::new(1)));
    }

    #[test]
    fn toolbar_clicks_do_not_move_the_player() {
        let mut session = session("unused.json");
        press_title_button(&mut session, "New game");
        let road = toolbar_buttons(None)[TOOLBAR_ROAD].rect.center();

        let _ = session.frame(FRAME, click(road));

        let state = overworld(&session);
        assert_eq!(state.grid.player_index(), Some(TileIndex::new(0)));
        assert!(state.grid.has_road(TileIndex::new(0)));
        assert_eq!(state.grid.highlighted(), Some(TileIndex::new(0)));
    }

    #[test]
    fn building_launches_the_terrain_minigame() {
        let mut session = Session::new(
            SessionSettings {
                debug_build: false,
                ..settings("unused.json")
            },
            &strip_map(),
        )
        .expect("valid session");
        press_title_button(&mut session, "New game");

        let _ = session.frame(FRAME, debug_key(true, false));

        assert_eq!(
            session.pending,
            Some(SceneTransition::StartMinigame {
                kind: GameKind::Wheat,
                origin: MinigameOrigin::Overworld(TileIndex::new(0)),
            })
        );
    }

    #[test]
    fn building_in_the_same_frame_as_a_move_targets_the_new_tile() {
        let mut session = Session::new(
            SessionSettings {
                debug_build: false,
                ..settings("unused.json")
            },
            &strip_map(),
        )
        .expect("valid session");
        press_title_button(&mut session, "New game");
        let target = tile_position(&session, 1);

        let _ = session.frame(
            FRAME,
            FrameInput {
                build_pressed: true,
                ..click(target)
            },
        );

        let state = overworld(&session);
        assert_eq!(state.grid.player_index(), Some(TileIndex::new(1)));
        let terrain = query::tile(&state.grid, TileIndex::new(1))
            .expect("tile exists")
            .terrain;
        assert_eq!(
            session.pending,
            Some(SceneTransition::StartMinigame {
                kind: terrain.game_kind(),
                origin: MinigameOrigin::Overworld(TileIndex::new(1)),
            })
        );
    }

    #[test]
    fn finished_minigame_builds_on_the_origin_tile() {
        let mut session = session("unused.json");
        press_title_button(&mut session, "New game");
        session.request(SceneTransition::StartMinigame {
            kind: GameKind::Wheat,
            origin: MinigameOrigin::Overworld(TileIndex::new(0)),
        });

        let swing = FrameInput {
            cursor: Some(Vec2::new(480.0, 300.0)),
            primary_held: true,
            ..FrameInput::default()
        };
        let mut frames = 0;
        loop {
            let _ = session.frame(FRAME, swing);
            frames += 1;
            if let ActiveScene::Minigame(minigame) = &session.scene {
                if minigame.timer.last_score().is_some() {
                    break;
                }
            }
            assert!(frames < 2400, "minigame never completed");
        }

        let _ = session.frame(FRAME, click(Vec2::new(480.0, 300.0)));
        let _ = session.frame(FRAME, idle());

        assert!(matches!(session.scene, ActiveScene::Overworld));
        let state = overworld(&session);
        assert_eq!(state.scores.points(Terrain::Grassland), 3);
        assert!(state.grid.has_building(TileIndex::new(0)));
    }

    fn swing_until_first_strike(minigame: &mut MinigameState) {
        let swing = FrameInput {
            primary_held: true,
            ..FrameInput::default()
        };
        for _ in 0..2400 {
            let _ = minigame.update(FRAME, &swing);
            if minigame.strikes > 0 {
                return;
            }
        }
        panic!("no strike landed");
    }

    #[test]
    fn mining_strikes_rebound_the_pickaxe() {
        let mut mining = MinigameState::new(GameKind::Mining, MinigameOrigin::Practice, 9);
        swing_until_first_strike(&mut mining);
        assert!(mining.rotator.angular_velocity() < 0.0);

        let mut wheat = MinigameState::new(GameKind::Wheat, MinigameOrigin::Practice, 9);
        swing_until_first_strike(&mut wheat);
        assert!(wheat.rotator.angular_velocity() > 0.0);
    }

    #[test]
    fn abandoning_stops_the_timer() {
        let mut minigame = MinigameState::new(GameKind::Cactus, MinigameOrigin::Practice, 9);
        let _ = minigame.update(FRAME, &idle());
        let transition = minigame.update(
            FRAME,
            &FrameInput {
                back_pressed: true,
                ..FrameInput::default()
            },
        );

        assert_eq!(transition, Some(SceneTransition::MinigameSelector));
        assert!(!minigame.timer.is_running());
        assert_eq!(minigame.timer.last_score(), None);
    }

    #[test]
    fn abandoned_practice_returns_to_the_selector() {
        let mut session = session("unused.json");
        session.request(SceneTransition::StartMinigame {
            kind: GameKind::Mining,
            origin: MinigameOrigin::Practice,
        });
        let _ = session.frame(FRAME, idle());
        assert!(matches!(session.view(), Scene::Minigame(_)));

        let _ = session.frame(
            FRAME,
            FrameInput {
                back_pressed: true,
                ..FrameInput::default()
            },
        );
        let _ = session.frame(FRAME, idle());

        assert!(matches!(session.scene, ActiveScene::MinigameSelector));
        assert!(session.overworld.is_none());
    }

    #[test]
    fn connected_buildings_of_every_terrain_win() {
        let mut session = session("unused.json");
        press_title_button(&mut session, "New game");

        for index in 0..4 {
            if index > 0 {
                let target = tile_position(&session, index);
                let _ = session.frame(FRAME, click(target));
            }
            let _ = session.frame(FRAME, debug_key(true, false));
            let _ = session.frame(FRAME, debug_key(false, true));
        }

        let state = overworld(&session);
        assert!(state.scores.is_complete());
        assert_eq!(
            state.victory,
            Some(Victory {
                minigame_score: 4,
                road_score: 1,
            })
        );
        let Scene::Overworld(view) = session.view() else {
            panic!("overworld view expected");
        };
        assert!(view
            .text
            .iter()
            .any(|line| line.text == "Victory! Minigame Score: 4 Road Score: 1"));
    }

    #[test]
    fn saved_progress_can_be_continued() {
        let save_name = "continue.json";
        let mut first = session(save_name);
        press_title_button(&mut first, "New game");
        let _ = first.frame(FRAME, debug_key(true, false));
        let _ = first.frame(
            FRAME,
            FrameInput {
                save_pressed: true,
                ..FrameInput::default()
            },
        );
        assert_eq!(overworld(&first).status.as_deref(), Some("Game saved"));

        let mut second = session(save_name);
        second.request(SceneTransition::ContinueGame);
        let _ = second.frame(FRAME, idle());

        let state = overworld(&second);
        assert!(state.grid.has_building(TileIndex::new(0)));
        assert_eq!(state.scores.points(Terrain::Grassland), 1);
        let _ = std::fs::remove_file(&settings(save_name).save_path);
    }

    #[test]
    fn continue_without_save_starts_fresh() {
        let mut session = session("never-written.json");
        session.request(SceneTransition::ContinueGame);
        let _ = session.frame(FRAME, idle());

        let state = overworld(&session);
        assert_eq!(state.grid.player_index(), Some(TileIndex::new(0)));
        assert_eq!(state.scores, ScoreBoard::new());
    }

    #[test]
    fn start_tile_outside_the_map_is_rejected() {
        let result = Session::new(
            SessionSettings {
                start_tile: TileIndex::new(4),
                ..settings("unused.json")
            },
            &strip_map(),
        );
        assert!(matches!(
            result,
            Err(GridError::StartTileOutOfBounds { .. })
        ));
    }
}
