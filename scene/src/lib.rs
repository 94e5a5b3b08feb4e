#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scenes, the scene stack and the engine services scenes reach through.
//!
//! A [`Scene`] pairs a [`SceneState`] (world, participants, timers, input,
//! camera, layers) with a user-supplied [`SceneBehaviour`] whose hooks the
//! scene runs at fixed points of its lifecycle and of every frame:
//!
//! ```text
//! init ─▶ on_ready
//! enter ─▶ on_start | on_resume(from_cache = true)
//! pause ─▶ on_pause        resume ─▶ on_resume(from_cache = false)
//! stop ─▶ on_stop          destroy ─▶ on_destroy
//! ```
//!
//! The [`SceneManager`] owns the stack of scenes, the cache of popped scenes
//! and the engine overlay scene.

mod audio;
mod context;
mod draw;
mod manager;
mod registry;
mod state;

pub use audio::{AudioBackend, AudioKind, AudioManager, AudioRequest, NullAudioBackend};
pub use context::EngineHandle;
pub use draw::{draw_grid, draw_object, draw_world};
pub use manager::SceneManager;
pub use registry::Shared;
pub use state::SceneState;

use tessera_core::{Error, ObjectId, Result, SystemEvent, SystemEventHandler};
use tessera_rendering::RenderTarget;

use crate::state::Services;

/// User hooks of a scene. Every hook defaults to doing nothing.
///
/// Errors returned by a hook abort the frame and propagate to whoever drives
/// the engine.
pub trait SceneBehaviour {
    /// The scene was initialized; engine services are available.
    fn on_ready(&mut self, scene: &mut SceneState) -> Result<()> {
        let _ = scene;
        Ok(())
    }

    /// The scene became the active scene for the first time.
    fn on_start(&mut self, scene: &mut SceneState) -> Result<()> {
        let _ = scene;
        Ok(())
    }

    /// A system event reached the scene, after its registered handlers.
    fn on_handle_event(&mut self, scene: &mut SceneState, event: &SystemEvent) -> Result<()> {
        let _ = (scene, event);
        Ok(())
    }

    /// Variable-rate update, after timers and updatables.
    fn on_update(&mut self, scene: &mut SceneState, dt: f32) -> Result<()> {
        let _ = (scene, dt);
        Ok(())
    }

    /// Fixed-rate update, after updatables.
    fn on_fixed_update(&mut self, scene: &mut SceneState, dt: f32) -> Result<()> {
        let _ = (scene, dt);
        Ok(())
    }

    /// Called before anything of the scene is drawn.
    fn on_pre_render(&mut self, scene: &mut SceneState, target: &mut dyn RenderTarget) -> Result<()> {
        let _ = (scene, target);
        Ok(())
    }

    /// Called after everything of the scene was drawn.
    fn on_post_render(
        &mut self,
        scene: &mut SceneState,
        target: &mut dyn RenderTarget,
    ) -> Result<()> {
        let _ = (scene, target);
        Ok(())
    }

    /// Another scene was pushed on top of this one.
    fn on_pause(&mut self, scene: &mut SceneState) -> Result<()> {
        let _ = scene;
        Ok(())
    }

    /// The scene became active again, either from below on the stack or
    /// from the scene cache.
    fn on_resume(&mut self, scene: &mut SceneState, from_cache: bool) -> Result<()> {
        let _ = (scene, from_cache);
        Ok(())
    }

    /// The scene was popped or the engine is shutting down.
    fn on_stop(&mut self, scene: &mut SceneState) -> Result<()> {
        let _ = scene;
        Ok(())
    }

    /// The scene is about to be dropped.
    fn on_destroy(&mut self, scene: &mut SceneState) -> Result<()> {
        let _ = scene;
        Ok(())
    }

    /// A frame is starting.
    fn on_frame_begin(&mut self, scene: &mut SceneState) -> Result<()> {
        let _ = scene;
        Ok(())
    }

    /// A frame ended.
    fn on_frame_end(&mut self, scene: &mut SceneState) -> Result<()> {
        let _ = scene;
        Ok(())
    }
}

impl SceneBehaviour for () {}

/// A scene: owned state driven through the hooks of its behaviour.
pub struct Scene {
    state: SceneState,
    behaviour: Box<dyn SceneBehaviour>,
    started: bool,
    paused: bool,
    cached: bool,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("state", &self.state)
            .field("started", &self.started)
            .field("paused", &self.paused)
            .field("cached", &self.cached)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Creates an uninitialized scene.
    #[must_use]
    pub fn new<B: SceneBehaviour + 'static>(name: &str, behaviour: B) -> Self {
        Self {
            state: SceneState::new(name),
            behaviour: Box::new(behaviour),
            started: false,
            paused: false,
            cached: false,
        }
    }

    /// Name of the scene.
    #[must_use]
    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// Identity of the scene.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.state.id()
    }

    /// Owned state of the scene.
    #[must_use]
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Owned state of the scene.
    pub fn state_mut(&mut self) -> &mut SceneState {
        &mut self.state
    }

    /// Reports whether the scene was initialized.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    /// Reports whether the scene was entered and not stopped since.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Reports whether the scene is paused below another scene.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether the scene was stopped into the scene cache and not
    /// entered since.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    pub(crate) fn mark_cached(&mut self) {
        self.cached = true;
    }

    /// Hands the engine services to the scene and runs `on_ready`.
    ///
    /// Calling it again is a no-op. A background scene attached before
    /// initialization is initialized and entered afterwards.
    pub fn init(&mut self, engine: &EngineHandle) -> Result<()> {
        if self.state.is_initialized() {
            return Ok(());
        }
        log::debug!("initializing scene '{}'", self.name());
        self.state.services = Some(Services::new(engine));
        self.behaviour.on_ready(&mut self.state)?;
        if let Some(background) = &mut self.state.background {
            background.scene.init(engine)?;
            background.scene.enter()?;
        }
        Ok(())
    }

    /// Makes the scene the active one: `on_start` the first time,
    /// `on_resume(true)` when it comes out of the cache and `on_resume(false)`
    /// when it was paused.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessViolation`] when the scene is not initialized.
    pub fn enter(&mut self) -> Result<()> {
        if !self.state.is_initialized() {
            return Err(Error::access_violation(format!(
                "scene '{}' must be initialized before it is entered",
                self.name()
            )));
        }
        if self.cached {
            self.cached = false;
            self.started = true;
            self.paused = false;
            log::debug!("resuming scene '{}' from cache", self.name());
            return self.behaviour.on_resume(&mut self.state, true);
        }
        if self.started {
            return self.resume();
        }
        self.started = true;
        self.paused = false;
        log::debug!("starting scene '{}'", self.name());
        self.behaviour.on_start(&mut self.state)
    }

    /// Runs `on_pause` if the scene is running.
    pub fn pause(&mut self) -> Result<()> {
        if !self.started || self.paused {
            return Ok(());
        }
        self.paused = true;
        log::debug!("pausing scene '{}'", self.name());
        self.behaviour.on_pause(&mut self.state)
    }

    /// Runs `on_resume(false)` if the scene is paused.
    pub fn resume(&mut self) -> Result<()> {
        if !self.paused {
            return Ok(());
        }
        self.paused = false;
        log::debug!("resuming scene '{}'", self.name());
        self.behaviour.on_resume(&mut self.state, false)
    }

    /// Runs `on_stop` if the scene was entered. The background stops too.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(background) = &mut self.state.background {
            background.scene.stop()?;
        }
        if !self.started {
            return Ok(());
        }
        self.started = false;
        self.paused = false;
        log::debug!("stopping scene '{}'", self.name());
        self.behaviour.on_stop(&mut self.state)
    }

    /// Runs `on_destroy`, destroys the background and broadcasts the
    /// destruction of the scene.
    pub fn destroy(&mut self) -> Result<()> {
        log::debug!("destroying scene '{}'", self.name());
        self.behaviour.on_destroy(&mut self.state)?;
        let _ = self.state.remove_background_scene()?;
        self.state.updatables.clear();
        self.state.handlers.clear();
        self.state.collidables.clear();
        self.state.removed_collidables.clear();
        self.state.object.emit_destruction();
        Ok(())
    }

    /// Routes a system event through the scene.
    ///
    /// The GUI sees the event first and may consume it. Otherwise the input
    /// manager, then the registered handlers in insertion order, then
    /// `on_handle_event` receive it, followed by the background scene when
    /// its events are enabled.
    pub fn handle_event(&mut self, event: &SystemEvent) -> Result<()> {
        let Some(services) = self.state.services.as_mut() else {
            return Ok(());
        };
        if let Some(gui) = services.gui.as_mut() {
            if gui.handle_event(event) {
                return Ok(());
            }
        }
        services.input.handle_event(event);
        for handler in self.state.handlers.active() {
            handler.borrow_mut().handle_event(event);
        }
        self.behaviour.on_handle_event(&mut self.state, event)?;
        if let Some(background) = &mut self.state.background {
            if background.events_enabled {
                background.scene.handle_event(event)?;
            }
        }
        Ok(())
    }

    /// Advances the scene by `dt` seconds, scaled by the timescale.
    ///
    /// A variable update advances timers, held-input callbacks and the GUI
    /// before the updatables and `on_update`. A fixed update only runs the
    /// updatables' fixed step and `on_fixed_update`. The background scene
    /// goes first when its updates are enabled.
    pub fn update(&mut self, dt: f32, fixed: bool) -> Result<()> {
        if !self.state.is_initialized() {
            return Ok(());
        }
        if let Some(background) = &mut self.state.background {
            if background.update_enabled {
                background.scene.update(dt, fixed)?;
            }
        }
        let dt = dt * self.state.timescale();
        if !fixed {
            if let Some(services) = self.state.services.as_mut() {
                services.timers.update_secs(dt);
                services.input.update();
                if let Some(gui) = services.gui.as_mut() {
                    gui.update(dt);
                }
            }
        }
        for updatable in self.state.updatables.active() {
            let mut updatable = updatable.borrow_mut();
            if fixed {
                updatable.fixed_update(dt, &mut self.state.world);
            } else {
                updatable.update(dt, &mut self.state.world);
            }
        }
        if fixed {
            self.behaviour.on_fixed_update(&mut self.state, dt)
        } else {
            self.behaviour.on_update(&mut self.state, dt)
        }
    }

    /// Dispatches collisions, sweeps stopped timers and flushes pending
    /// participant removals.
    pub fn post_update(&mut self) -> Result<()> {
        if let Some(background) = &mut self.state.background {
            if background.update_enabled {
                background.scene.post_update()?;
            }
        }
        let collidables = self.state.active_collidables();
        self.state
            .dispatcher
            .dispatch(&mut self.state.world, &collidables);
        if let Some(services) = self.state.services.as_mut() {
            services.timers.sweep_stopped();
        }
        self.state.flush_removals();
        Ok(())
    }

    /// Draws the background scene if drawable, then the world, the render
    /// layers and the GUI.
    pub fn render(&mut self, target: &mut dyn RenderTarget) -> Result<()> {
        let Some(view) = self.state.services.as_ref().map(|s| s.camera.view()) else {
            return Ok(());
        };
        self.behaviour.on_pre_render(&mut self.state, target)?;
        if let Some(background) = &mut self.state.background {
            if background.drawable {
                background.scene.render(target)?;
            }
        }
        target.set_view(view);
        draw_world(&self.state.world, target);
        if let Some(services) = &self.state.services {
            services.layers.draw(target);
            if let Some(gui) = &services.gui {
                gui.draw(target);
            }
        }
        self.behaviour.on_post_render(&mut self.state, target)
    }

    /// Runs `on_frame_begin`.
    pub fn frame_begin(&mut self) -> Result<()> {
        self.behaviour.on_frame_begin(&mut self.state)
    }

    /// Runs `on_frame_end`.
    pub fn frame_end(&mut self) -> Result<()> {
        self.behaviour.on_frame_end(&mut self.state)
    }
}
