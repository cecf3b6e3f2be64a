#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots LOAF in a macroquad window.

mod config;
mod map_format;
mod persistence;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use loaf_core::{TileIndex, GAME_TITLE};
use loaf_rendering::{Color, Presentation, RenderingBackend};
use loaf_rendering_macroquad::MacroquadBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, Overrides},
    map_format::MapDescription,
    session::{SceneTransition, Session, SessionSettings, LOGICAL_SIZE},
};

/// Hex-tile overworld builder with physics minigames.
#[derive(Debug, Parser)]
#[command(name = "loaf", version, about)]
struct Args {
    /// Configuration file; missing files fall back to built-in defaults.
    #[arg(long, default_value = "loaf.toml")]
    config: PathBuf,
    /// Map description to load instead of the configured one.
    #[arg(long)]
    map: Option<PathBuf>,
    /// Save file to write and continue from.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Skip the title screen and continue from the save file.
    #[arg(long = "continue")]
    resume: bool,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Render as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    no_vsync: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        let vsync = if self.vsync {
            Some(true)
        } else if self.no_vsync {
            Some(false)
        } else {
            None
        };

        Overrides {
            map_path: self.map.clone(),
            save_path: self.save.clone(),
            vsync,
        }
    }
}

/// Entry point for the LOAF command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::load(&args.config)?.with_overrides(args.overrides());
    info!(
        config = %args.config.display(),
        map = %config.map_path.display(),
        save = %config.save_path.display(),
        "config_loaded"
    );

    let map = MapDescription::load(&config.map_path)?;
    info!(
        tileset = %map.tileset,
        width = map.layout.width,
        height = map.layout.height,
        "map_loaded"
    );

    let settings = SessionSettings {
        save_path: config.save_path.clone(),
        start_tile: TileIndex::new(config.overworld.start_tile),
        strikes_required: config.minigame.strikes_required,
        debug_build: config.overworld.debug_build,
    };
    let mut session = Session::new(settings, &map)
        .with_context(|| format!("map {} cannot host the overworld", config.map_path.display()))?;
    if args.resume {
        session.request(SceneTransition::ContinueGame);
    }

    let presentation = Presentation::new(
        GAME_TITLE,
        Color::DARK_SLATE_GRAY,
        LOGICAL_SIZE,
        session.view(),
    )?;
    let backend = MacroquadBackend::new()
        .with_vsync(config.window.vsync)
        .with_window_size(config.window.width, config.window.height);

    backend.run(presentation, move |dt, input, scene| {
        let control = session.frame(dt, input);
        *scene = session.view();
        control
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
