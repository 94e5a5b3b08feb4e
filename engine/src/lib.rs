#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! The engine: owner of the render target, the scene stack and the frame
//! loop.
//!
//! One frame runs in a fixed order:
//!
//! ```text
//! frameStart ─▶ platform events ─▶ 0..N fixed updates ─▶ variable update
//!            ─▶ post update ─▶ render ─▶ display ─▶ scene changes ─▶ frameEnd
//! ```
//!
//! Scene pushes and pops requested through the [`EngineHandle`] during a
//! frame are applied at its end: pops first, then pushes, and only the last
//! pushed scene is entered.

mod clock;
mod fps;
mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use settings::EngineSettings;

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use tessera_core::{names, Colour, Error, Event, ListenerId, Result, SystemEvent, Vec2};
use tessera_rendering::RenderTarget;
use tessera_scene::{EngineHandle, Scene, SceneManager};

use crate::fps::FpsCounter;

/// Longest frame time fed into the fixed-step accumulator, in seconds.
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Default rate of fixed updates per second.
pub const DEFAULT_PHYSICS_FPS: u32 = 60;

static ENGINE_ALIVE: AtomicBool = AtomicBool::new(false);

/// Runs scenes on a render target.
///
/// At most one engine may be alive in the process. Dropping the engine frees
/// the slot.
pub struct Engine {
    settings: EngineSettings,
    handle: EngineHandle,
    scenes: SceneManager,
    target: Option<Box<dyn RenderTarget>>,
    clock: Box<dyn Clock>,
    running: bool,
    physics_fps: u32,
    accumulator: f32,
    elapsed: f64,
    frame_count: u64,
    fps: FpsCounter,
    on_shutdown_complete: Option<Box<dyn FnOnce()>>,
}

impl Engine {
    /// Creates the engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MultipleEngineInstance`] while another engine is
    /// alive anywhere in the process.
    pub fn new() -> Result<Self> {
        if ENGINE_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::MultipleEngineInstance);
        }
        let handle = EngineHandle::new();
        Ok(Self {
            settings: EngineSettings::default(),
            scenes: SceneManager::new(handle.clone()),
            handle,
            target: None,
            clock: Box::new(SystemClock::new()),
            running: false,
            physics_fps: DEFAULT_PHYSICS_FPS,
            accumulator: 0.0,
            elapsed: 0.0,
            frame_count: 0,
            fps: FpsCounter::default(),
            on_shutdown_complete: None,
        })
    }

    /// Applies `settings`, takes ownership of the render target and creates
    /// the overlay scene. Calling it again is a no-op.
    pub fn initialize(
        &mut self,
        settings: EngineSettings,
        target: Box<dyn RenderTarget>,
    ) -> Result<()> {
        if self.is_initialized() {
            log::warn!("engine already initialized");
            return Ok(());
        }
        log::info!(
            "initializing engine '{}' ({}x{})",
            settings.window_title,
            settings.window_width,
            settings.window_height
        );
        let size = target.size();
        self.handle.set_window_size(if size == Vec2::ZERO {
            Vec2::new(settings.window_width as f32, settings.window_height as f32)
        } else {
            size
        });
        self.handle
            .audio()
            .set_directories(&settings.sound_effects_dir, &settings.music_dir);
        self.settings = settings;
        self.target = Some(target);
        self.scenes.create_overlay()?;
        self.handle.events().emit(names::INITIALIZE, &Event::Initialized);
        Ok(())
    }

    /// Reports whether [`Engine::initialize`] ran.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.target.is_some()
    }

    /// Reports whether the frame loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Settings applied at initialization.
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Handle shared with scenes.
    #[must_use]
    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    /// Scene stack.
    #[must_use]
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    /// Scene stack.
    pub fn scenes_mut(&mut self) -> &mut SceneManager {
        &mut self.scenes
    }

    /// Render target, once initialized.
    #[must_use]
    pub fn target(&self) -> Option<&dyn RenderTarget> {
        self.target.as_deref()
    }

    /// Render target, once initialized.
    pub fn target_mut(&mut self) -> Option<&mut (dyn RenderTarget + 'static)> {
        self.target.as_deref_mut()
    }

    /// Replaces the frame time source.
    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// Queues `scene` to be pushed at the end of the frame.
    pub fn push_scene(&self, scene: Scene) {
        self.handle.push_scene(scene);
    }

    /// Queues a pop of the active scene at the end of the frame.
    pub fn pop_scene(&self) {
        self.handle.pop_scene();
    }

    /// Asks the loop to stop after the current frame.
    pub fn quit(&self) {
        self.handle.quit();
    }

    /// Suspends updates; frames keep rendering.
    pub fn pause(&self) -> bool {
        self.handle.pause()
    }

    /// Resumes updates.
    pub fn resume(&self) -> bool {
        self.handle.resume()
    }

    /// Reports whether updates are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.handle.is_paused()
    }

    /// Sets how many fixed updates run per second of frame time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for zero.
    pub fn set_physics_update_frame_rate(&mut self, fps: u32) -> Result<()> {
        if fps == 0 {
            return Err(Error::invalid_argument(
                "physics update frame rate must be positive",
            ));
        }
        self.physics_fps = fps;
        Ok(())
    }

    /// Fixed updates per second.
    #[must_use]
    pub fn physics_update_frame_rate(&self) -> u32 {
        self.physics_fps
    }

    /// Frame time not yet consumed by fixed updates, in seconds.
    #[must_use]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Sum of all frame deltas since start, in seconds.
    #[must_use]
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed
    }

    /// Number of completed frames.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second measured over the last full second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Subscribes to the start of every frame.
    pub fn on_frame_start<F>(&self, mut callback: F) -> ListenerId
    where
        F: FnMut(u64) + 'static,
    {
        self.handle.on(names::FRAME_START, move |event| {
            if let Event::FrameStarted { frame } = event {
                callback(*frame);
            }
        })
    }

    /// Subscribes to the end of every frame.
    pub fn on_frame_end<F>(&self, mut callback: F) -> ListenerId
    where
        F: FnMut(u64) + 'static,
    {
        self.handle.on(names::FRAME_END, move |event| {
            if let Event::FrameEnded { frame } = event {
                callback(*frame);
            }
        })
    }

    /// Sets the callback run once shutdown finished, replacing any previous
    /// one.
    pub fn on_shutdown_complete<F>(&mut self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.on_shutdown_complete = Some(Box::new(callback));
    }

    /// Applies queued scene pushes and enters the frame loop state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessViolation`] when the engine is not initialized
    /// or when no scene was pushed.
    pub fn start(&mut self) -> Result<()> {
        if !self.is_initialized() {
            return Err(Error::access_violation(
                "engine must be initialized before it runs",
            ));
        }
        self.apply_scene_changes()?;
        if self.scenes.is_empty() {
            return Err(Error::access_violation(
                "engine cannot run without a scene",
            ));
        }
        self.running = true;
        let _ = self.clock.restart();
        log::info!("engine started");
        self.handle.events().emit(names::START, &Event::Started);
        Ok(())
    }

    /// Runs one frame. Returns `false` once the loop should stop: quit was
    /// requested, the scene stack emptied or the render target closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessViolation`] when the engine is not running, and
    /// propagates errors raised by scene hooks.
    pub fn frame(&mut self) -> Result<bool> {
        if !self.running {
            return Err(Error::access_violation("engine is not running"));
        }
        let frame = self.frame_count;
        self.handle
            .events()
            .emit(names::FRAME_START, &Event::FrameStarted { frame });
        self.scenes.frame_begin()?;

        let dt = self.clock.restart();
        self.process_events()?;
        self.update(dt)?;
        self.render()?;
        self.apply_scene_changes()?;

        self.elapsed += f64::from(dt);
        self.frame_count += 1;
        let frame_time = Duration::try_from_secs_f32(dt).unwrap_or(Duration::ZERO);
        if let Some(fps) = self.fps.record_frame(frame_time) {
            log::trace!("{fps:.1} fps");
        }
        self.scenes.frame_end()?;
        self.handle
            .events()
            .emit(names::FRAME_END, &Event::FrameEnded { frame });

        let open = self.target.as_ref().is_some_and(|target| target.is_open());
        if self.handle.is_quit_requested() || self.scenes.is_empty() || !open {
            self.running = false;
        }
        Ok(self.running)
    }

    /// Starts the engine, runs frames until it stops, then shuts down.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;
        while self.frame()? {}
        self.shutdown()
    }

    /// Stops and destroys every scene, tears down the overlay, clears the
    /// caches and the event bus, then runs the shutdown callback.
    pub fn shutdown(&mut self) -> Result<()> {
        log::info!("engine shutting down after {} frames", self.frame_count);
        self.running = false;
        self.scenes.clear()?;
        self.scenes.clear_cached_scenes();
        self.scenes.destroy_overlay()?;
        if let Some(target) = &mut self.target {
            target.close();
        }
        self.handle.events().emit(names::SHUTDOWN, &Event::Shutdown);
        self.handle.reset();
        if let Some(callback) = self.on_shutdown_complete.take() {
            callback();
        }
        Ok(())
    }

    fn process_events(&mut self) -> Result<()> {
        let Some(target) = self.target.as_mut() else {
            return Ok(());
        };
        while let Some(event) = target.poll_event() {
            let Some(event) = event.normalize() else {
                continue;
            };
            match event {
                SystemEvent::Closed => {
                    log::info!("window closed");
                    self.handle.quit();
                }
                SystemEvent::Resized { width, height } => {
                    self.handle
                        .set_window_size(Vec2::new(width as f32, height as f32));
                    self.scenes.handle_event(&event)?;
                }
                _ => self.scenes.handle_event(&event)?,
            }
        }
        Ok(())
    }

    fn update(&mut self, dt: f32) -> Result<()> {
        if self.handle.is_paused() {
            return Ok(());
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        let step = 1.0 / self.physics_fps as f32;
        self.accumulator += dt;
        while self.accumulator >= step {
            self.scenes.update(step, true)?;
            self.accumulator -= step;
        }
        self.scenes.update(dt, false)?;
        self.scenes.post_update()
    }

    fn render(&mut self) -> Result<()> {
        let Some(target) = self.target.as_mut() else {
            return Ok(());
        };
        target.clear(Colour::BLACK);
        self.scenes.render(&mut **target)?;
        target.display();
        Ok(())
    }

    fn apply_scene_changes(&mut self) -> Result<()> {
        let (pops, pushes) = self.handle.take_pending();
        if pops == 0 && pushes.is_empty() {
            return Ok(());
        }
        for popped in 1..=pops {
            let resume = popped == pops && pushes.is_empty();
            let _ = self.scenes.pop_scene(resume)?;
        }
        let last = pushes.len();
        for (position, scene) in pushes.into_iter().enumerate() {
            if position + 1 == last {
                self.scenes.push_scene(scene, true)?;
            } else {
                self.scenes.push_scene(scene, false)?;
                if let Some(top) = self.scenes.active_scene_mut() {
                    top.init(&self.handle)?;
                }
            }
        }
        if let Some(active) = self.scenes.active_scene() {
            let scene = active.id();
            log::debug!("scene '{}' is active", active.name());
            self.handle
                .events()
                .emit(names::SCENE_ACTIVATE, &Event::SceneActivated { scene });
        }
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        ENGINE_ALIVE.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Mutex, MutexGuard, PoisonError},
        thread,
    };

    use tessera_rendering::HeadlessTarget;

    use super::*;

    static ENGINES: Mutex<()> = Mutex::new(());

    fn serial() -> MutexGuard<'static, ()> {
        ENGINES.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn headless() -> Box<dyn RenderTarget> {
        Box::new(HeadlessTarget::new(Vec2::new(320.0, 240.0)))
    }

    #[test]
    fn only_one_engine_lives_at_a_time() {
        let _serial = serial();
        let engine = Engine::new().expect("first engine");
        assert!(matches!(Engine::new(), Err(Error::MultipleEngineInstance)));

        drop(engine);
        assert!(Engine::new().is_ok());
    }

    #[test]
    fn other_threads_cannot_build_a_second_engine() {
        let _serial = serial();
        let engine = Engine::new().expect("first engine");

        let rejected = thread::spawn(|| {
            matches!(Engine::new(), Err(Error::MultipleEngineInstance))
        })
        .join()
        .expect("thread");
        assert!(rejected);

        drop(engine);
        let built = thread::spawn(|| Engine::new().is_ok()).join().expect("thread");
        assert!(built);
    }

    #[test]
    fn running_needs_initialization_and_a_scene() {
        let _serial = serial();
        let mut engine = Engine::new().expect("engine");
        assert!(matches!(engine.run(), Err(Error::AccessViolation(_))));

        engine
            .initialize(EngineSettings::default(), headless())
            .expect("initialize");
        assert!(matches!(engine.run(), Err(Error::AccessViolation(_))));
        assert!(matches!(engine.frame(), Err(Error::AccessViolation(_))));
    }

    #[test]
    fn zero_physics_rate_is_rejected() {
        let _serial = serial();
        let mut engine = Engine::new().expect("engine");

        assert!(matches!(
            engine.set_physics_update_frame_rate(0),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(engine.physics_update_frame_rate(), DEFAULT_PHYSICS_FPS);
    }

    #[test]
    fn second_initialization_keeps_the_first_settings() {
        let _serial = serial();
        let mut engine = Engine::new().expect("engine");
        let first = EngineSettings {
            window_title: "first".to_owned(),
            ..EngineSettings::default()
        };
        let second = EngineSettings {
            window_title: "second".to_owned(),
            ..EngineSettings::default()
        };

        engine.initialize(first, headless()).expect("initialize");
        engine.initialize(second, headless()).expect("no-op");

        assert_eq!(engine.settings().window_title, "first");
        assert_eq!(engine.handle().window_size(), Vec2::new(320.0, 240.0));
        assert!(engine.scenes().overlay().is_some());
    }
}
