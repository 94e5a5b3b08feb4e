#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Demo binary for the tessera framework: a small maze game.
//!
//! Arrow keys move the player, P or Escape pauses, Q quits. `--headless`
//! runs a fixed number of frames without opening a window.

mod maze;
mod pause;

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use tessera_engine::{Engine, EngineSettings, ManualClock};
use tessera_rendering::{HeadlessBackend, HeadlessTarget, RenderingBackend, WindowConfig};
use tessera_rendering_macroquad::{MacroquadBackend, MacroquadTarget};

use crate::maze::{Maze, TILE_SIZE};

/// Command-line arguments accepted by the demo.
#[derive(Debug, Parser)]
#[command(name = "tessera-demo", version, about = "Maze demo built on tessera")]
struct Cli {
    /// Engine settings: a `.toml` document or a `KEY:TYPE=VALUE` preference file.
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Runs without a window.
    #[arg(long)]
    headless: bool,

    /// Number of frames simulated by a headless run.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Seed of the wandering monsters.
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;
    let window = settings.window_config();

    let mut engine = Engine::new()?;
    if cli.headless {
        let size = Vec2::new(window.width as f32, window.height as f32);
        engine.initialize(settings, Box::new(HeadlessTarget::new(size)))?;
        engine.set_clock(Box::new(ManualClock::new(1.0 / 60.0)));
    } else {
        engine.initialize(settings, Box::new(MacroquadTarget::from_config(&window)))?;
    }

    let maze = Maze::new(cli.seed);
    let progress = maze.progress();
    engine.push_scene(maze.into_scene());
    engine.start()?;

    if cli.headless {
        drive(HeadlessBackend::new().with_max_frames(cli.frames), window, engine)?;
    } else {
        drive(MacroquadBackend::new(), window, engine)?;
    }

    log::info!(
        "final score {} with {} lives left",
        progress.score.get(),
        progress.lives.get()
    );
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<EngineSettings> {
    let Some(path) = path else {
        return Ok(EngineSettings {
            window_title: "tessera maze".to_owned(),
            window_width: (15.0 * TILE_SIZE) as u32,
            window_height: (11.0 * TILE_SIZE) as u32,
            ..EngineSettings::default()
        });
    };

    if path.extension().is_some_and(|extension| extension == "toml") {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        EngineSettings::from_toml_str(&text)
            .with_context(|| format!("invalid settings in {}", path.display()))
    } else {
        EngineSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))
    }
}

fn drive<B: RenderingBackend>(backend: B, window: WindowConfig, engine: Engine) -> Result<()> {
    let engine = Rc::new(RefCell::new(engine));
    let looped = Rc::clone(&engine);
    backend.run(window, move || Ok(looped.borrow_mut().frame()?))?;

    let mut engine = engine.borrow_mut();
    engine.shutdown()?;
    log::info!(
        "ran {} frames in {:.1}s",
        engine.frame_count(),
        engine.elapsed_time()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_settings_files_are_recognised() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("demo.toml");
        fs::write(&path, "window_title = \"from toml\"\nwindow_width = 320\n").expect("write");

        let settings = load_settings(Some(&path)).expect("settings");

        assert_eq!(settings.window_title, "from toml");
        assert_eq!(settings.window_width, 320);
    }

    #[test]
    fn preference_files_are_recognised() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("demo.txt");
        fs::write(&path, "WINDOW_HEIGHT:INT=200\n").expect("write");

        let settings = load_settings(Some(&path)).expect("settings");

        assert_eq!(settings.window_height, 200);
    }

    #[test]
    fn defaults_fit_the_maze() {
        let settings = load_settings(None).expect("settings");

        assert_eq!((settings.window_width, settings.window_height), (480, 352));
    }

    #[test]
    fn arguments_parse() {
        let cli = Cli::parse_from(["tessera-demo", "--headless", "--frames", "5"]);

        assert!(cli.headless);
        assert_eq!(cli.frames, 5);
        assert_eq!(cli.seed, 7);
        assert!(cli.settings.is_none());
    }
}
