//! The maze level: a keyboard-driven player collecting coins while wanderers
//! roam the corridors and a chaser hunts the player down.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
};

use glam::Vec2;
use tessera_core::{names, Colour, Error, Event, Index, Key, ObjectId, Result, SystemEvent};
use tessera_rendering::{DrawCommand, RenderTarget};
use tessera_scene::{Scene, SceneBehaviour, SceneState, Shared};
use tessera_system_movement::{
    Destination, KeyBindings, KeyboardGridMover, MoveTrigger, RandomGridMover, TargetGridMover,
};
use tessera_world::{GridHandle, GridObject, GridParser, ObjectHandle, World};

use crate::pause::PauseMenu;

pub(crate) const TILE_SIZE: f32 = 32.0;

const LEVEL: &str = "\
# # # # # # # # # # # # # # #
# P . . . # * . . . . . . * #
# . # # . # . # # # . # # . #
# . # * . . . . W # . . # . #
# . # # # . # # . # # . # . #
# . . . . . # * . . . . . . #
# # # . # . # # # . # # # . #
# * . . # . . . . . . W # . #
# . # # # # # . # # # . # . #
# . . . . . . . . * . . . C #
# # # # # # # # # # # # # # #
";

const WALL: char = '#';
const PLAYER: char = 'P';
const WANDERER: char = 'W';
const CHASER: char = 'C';
const COIN: char = '*';

const PLAYER_TAG: &str = "player";
const CHASER_TAG: &str = "chaser";
const COIN_TAG: &str = "coin";
const ITEM_GROUP: &str = "item";

const CHASER_RELEASE: Duration = Duration::from_secs(3);
const LIVES: u32 = 3;

/// Progress of a run, shared with the HUD and the pause menu.
#[derive(Debug, Default)]
pub(crate) struct Progress {
    pub(crate) score: Cell<u32>,
    pub(crate) coins_left: Cell<u32>,
    pub(crate) lives: Cell<u32>,
}

/// Behaviour of the maze scene.
pub(crate) struct Maze {
    seed: u64,
    progress: Rc<Progress>,
    overlaps: Rc<RefCell<Vec<ObjectId>>>,
    chaser: Option<Shared<TargetGridMover>>,
}

impl Maze {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            progress: Rc::new(Progress {
                lives: Cell::new(LIVES),
                ..Progress::default()
            }),
            overlaps: Rc::default(),
            chaser: None,
        }
    }

    pub(crate) fn progress(&self) -> Rc<Progress> {
        Rc::clone(&self.progress)
    }

    pub(crate) fn into_scene(self) -> Scene {
        Scene::new("maze", self)
    }

    fn spawn_player(&mut self, scene: &mut SceneState, grid: GridHandle, index: Index) -> Result<ObjectHandle> {
        let player = GridObject::new(Vec2::splat(TILE_SIZE * 0.75))
            .with_tag(PLAYER_TAG)
            .with_colour(Colour::YELLOW)
            .with_speed(Vec2::splat(128.0));
        let player = place(scene.world_mut(), grid, index, player)?;

        let mover = KeyboardGridMover::new(scene.world_mut(), player)
            .with_bindings(KeyBindings::ARROWS)
            .with_trigger(MoveTrigger::OnKeyHeld);
        let mover = Rc::new(RefCell::new(mover));
        let _ = scene.add_updatable(mover.clone());
        let _ = scene.add_system_event_handler(mover);
        let _ = scene.add_collidable(player);

        let overlaps = Rc::clone(&self.overlaps);
        if let Some(object) = scene.world().object(player) {
            let _ = object
                .events()
                .add_listener(names::COLLIDABLE_OVERLAP_START, move |event| {
                    if let Event::OverlapStarted { other, .. } = event {
                        overlaps.borrow_mut().push(*other);
                    }
                });
        }
        Ok(player)
    }

    fn spawn_chaser(
        &mut self,
        scene: &mut SceneState,
        grid: GridHandle,
        index: Index,
        player: ObjectHandle,
    ) -> Result<()> {
        let mut chaser = GridObject::new(Vec2::splat(TILE_SIZE * 0.75))
            .with_tag(CHASER_TAG)
            .with_colour(Colour::RED)
            .with_speed(Vec2::splat(80.0));
        chaser.exclude_collisions_with(ITEM_GROUP);
        let chaser = place(scene.world_mut(), grid, index, chaser)?;

        let mut mover = TargetGridMover::new(scene.world_mut(), chaser);
        mover.set_destination(Destination::Object(player));
        mover.mover_mut().freeze();
        let mover = Rc::new(RefCell::new(mover));
        let _ = scene.add_updatable(mover.clone());
        let _ = scene.add_collidable(chaser);

        let released = Rc::clone(&mover);
        let _ = scene.timers_mut()?.set_timeout(CHASER_RELEASE, move |_| {
            log::info!("the chaser is loose");
            released.borrow_mut().mover_mut().unfreeze();
        });
        self.chaser = Some(mover);
        Ok(())
    }

    fn collect(&mut self, scene: &mut SceneState, other: ObjectId) -> Result<()> {
        let Some(handle) = scene.world().find(other) else {
            return Ok(());
        };
        let tag = scene
            .world()
            .object(handle)
            .map(|object| object.tag().to_owned())
            .unwrap_or_default();
        match tag.as_str() {
            COIN_TAG => {
                let _ = scene.remove_collidable(handle);
                let _ = scene.world_mut().destroy(handle);
                let progress = &self.progress;
                progress.score.set(progress.score.get() + 10);
                progress.coins_left.set(progress.coins_left.get().saturating_sub(1));
                scene.audio()?.play_sound_effect("coin.wav")?;
                if progress.coins_left.get() == 0 {
                    log::info!("every coin collected, final score {}", progress.score.get());
                    scene.engine()?.quit();
                }
            }
            CHASER_TAG => {
                let lives = self.progress.lives.get().saturating_sub(1);
                self.progress.lives.set(lives);
                log::info!("caught by the chaser, {lives} lives left");
                if lives == 0 {
                    scene.engine()?.quit();
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl SceneBehaviour for Maze {
    fn on_ready(&mut self, scene: &mut SceneState) -> Result<()> {
        let mut grid = GridParser::with_separator(' ')
            .parse_grid(LEVEL, Vec2::splat(TILE_SIZE))?
            .with_colours(Colour::rgb(24, 24, 32), Colour::rgb(70, 80, 120));
        grid.set_collidable_by_id(WALL, true);
        let mut spawns = Vec::new();
        grid.for_each_tile(|tile| {
            if matches!(tile.id, PLAYER | WANDERER | CHASER | COIN) {
                spawns.push((tile.index, tile.id));
            }
        });
        let centre = grid.size() / 2.0;
        let grid = scene.world_mut().add_grid(grid);

        let player = spawns
            .iter()
            .find(|(_, id)| *id == PLAYER)
            .map(|(index, _)| *index)
            .ok_or_else(|| Error::invalid_argument("level has no player start"))?;
        let player = self.spawn_player(scene, grid, player)?;

        let mut wanderers = 0;
        for (index, id) in spawns {
            match id {
                WANDERER => {
                    let wanderer = GridObject::new(Vec2::splat(TILE_SIZE * 0.75))
                        .with_tag("wanderer")
                        .with_colour(Colour::BLUE)
                        .with_obstacle(true)
                        .with_speed(Vec2::splat(64.0));
                    let wanderer = place(scene.world_mut(), grid, index, wanderer)?;
                    let seed = self.seed.wrapping_add(wanderers);
                    let mover = RandomGridMover::new(scene.world_mut(), wanderer, seed);
                    let _ = scene.add_updatable(Rc::new(RefCell::new(mover)));
                    wanderers += 1;
                }
                CHASER => self.spawn_chaser(scene, grid, index, player)?,
                COIN => {
                    let coin = GridObject::new(Vec2::splat(TILE_SIZE * 0.4))
                        .with_tag(COIN_TAG)
                        .with_collision_group(ITEM_GROUP)
                        .with_colour(Colour::GREEN);
                    let coin = place(scene.world_mut(), grid, index, coin)?;
                    let _ = scene.add_collidable(coin);
                    self.progress
                        .coins_left
                        .set(self.progress.coins_left.get() + 1);
                }
                _ => {}
            }
        }
        log::info!(
            "maze ready: {} coins, {wanderers} wanderers",
            self.progress.coins_left.get()
        );

        scene.camera_mut()?.set_centre(centre);
        let progress = Rc::clone(&self.progress);
        let _ = scene
            .render_layers_mut()?
            .add("hud", 0, move |target: &mut dyn RenderTarget| {
                target.draw(&DrawCommand::Text {
                    text: format!(
                        "score {}  lives {}",
                        progress.score.get(),
                        progress.lives.get()
                    ),
                    position: Vec2::new(4.0, 4.0),
                    size: 16.0,
                    colour: Colour::WHITE,
                });
            });
        Ok(())
    }

    fn on_handle_event(&mut self, scene: &mut SceneState, event: &SystemEvent) -> Result<()> {
        match event {
            SystemEvent::KeyPressed {
                key: Key::P | Key::Escape,
            } => {
                let menu = PauseMenu::new(Rc::clone(&self.progress));
                scene.engine()?.push_scene(Scene::new("pause", menu));
            }
            SystemEvent::KeyPressed { key: Key::Q } => scene.engine()?.quit(),
            _ => {}
        }
        Ok(())
    }

    fn on_update(&mut self, scene: &mut SceneState, _dt: f32) -> Result<()> {
        let overlaps: Vec<ObjectId> = self.overlaps.borrow_mut().drain(..).collect();
        for other in overlaps {
            self.collect(scene, other)?;
        }
        Ok(())
    }

    fn on_resume(&mut self, _scene: &mut SceneState, _from_cache: bool) -> Result<()> {
        log::debug!("back in the maze");
        Ok(())
    }

    fn on_stop(&mut self, _scene: &mut SceneState) -> Result<()> {
        if let Some(chaser) = &self.chaser {
            log::debug!(
                "chaser stopped {} steps from the player",
                chaser.borrow().path().len()
            );
        }
        Ok(())
    }
}

fn place(world: &mut World, grid: GridHandle, index: Index, object: GridObject) -> Result<ObjectHandle> {
    let handle = world.spawn(object);
    if world.add_child(grid, handle, index) {
        Ok(handle)
    } else {
        Err(Error::invalid_argument(format!(
            "cannot place an object on tile {index:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use tessera_engine::{Engine, EngineSettings, ManualClock};
    use tessera_rendering::HeadlessTarget;

    use super::*;

    static ENGINES: Mutex<()> = Mutex::new(());

    fn serial() -> MutexGuard<'static, ()> {
        ENGINES.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn engine_with_maze(seed: u64) -> (Engine, Rc<Progress>) {
        let maze = Maze::new(seed);
        let progress = maze.progress();
        let mut engine = Engine::new().expect("engine");
        engine
            .initialize(
                EngineSettings::default(),
                Box::new(HeadlessTarget::new(Vec2::new(480.0, 352.0))),
            )
            .expect("initialize");
        engine.set_clock(Box::new(ManualClock::new(1.0 / 60.0)));
        engine.push_scene(maze.into_scene());
        engine.start().expect("start");
        (engine, progress)
    }

    #[test]
    fn level_is_a_rectangular_map() {
        let map = GridParser::with_separator(' ')
            .parse(LEVEL)
            .expect("level parses");

        assert_eq!(map.len(), 11);
        assert!(map.iter().all(|row| row.len() == 15));
        assert_eq!(map.iter().flatten().filter(|id| **id == PLAYER).count(), 1);
    }

    #[test]
    fn maze_populates_the_world() {
        let _serial = serial();
        let (engine, progress) = engine_with_maze(7);

        let scene = engine.scenes().active_scene().expect("maze scene");
        let world = scene.state().world();
        assert_eq!(world.grids().count(), 1);
        // player, chaser, two wanderers and six coins
        assert_eq!(world.object_count(), 10);
        assert_eq!(progress.coins_left.get(), 6);
        assert_eq!(scene.state().collidable_count(), 8);
        assert_eq!(scene.state().updatable_count(), 4);
    }

    #[test]
    fn pause_key_pushes_the_menu_and_resumes() {
        let _serial = serial();
        let (mut engine, _progress) = engine_with_maze(7);
        let press = |key| SystemEvent::KeyPressed { key };

        engine
            .scenes_mut()
            .handle_event(&press(Key::P))
            .expect("pause key");
        assert!(engine.frame().expect("frame"));
        assert_eq!(
            engine.scenes().scene_names().collect::<Vec<_>>(),
            vec!["maze", "pause"]
        );

        engine
            .scenes_mut()
            .handle_event(&press(Key::Escape))
            .expect("resume key");
        assert!(engine.frame().expect("frame"));
        assert_eq!(
            engine.scenes().scene_names().collect::<Vec<_>>(),
            vec!["maze"]
        );
    }

    #[test]
    fn headless_runs_draw_the_world() {
        let _serial = serial();
        let (mut engine, progress) = engine_with_maze(3);

        for _ in 0..240 {
            if !engine.frame().expect("frame") {
                break;
            }
        }

        assert!(progress.lives.get() <= LIVES);
        assert!(engine.frame_count() > 0);
        engine.shutdown().expect("shutdown");
        assert!(engine.scenes().is_empty());
    }
}
