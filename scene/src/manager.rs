//! Scene stack, scene cache and the engine overlay scene.

use std::collections::BTreeMap;

use tessera_core::{Result, SystemEvent};
use tessera_rendering::RenderTarget;

use crate::{EngineHandle, Scene};

const OVERLAY_NAME: &str = "EngineOverlay";

/// LIFO stack of scenes plus a cache of popped scenes keyed by alias.
///
/// Only the top of the stack is active. Frame calls go to the active scene
/// and to the engine overlay scene, which is never part of the stack.
#[derive(Debug)]
pub struct SceneManager {
    engine: EngineHandle,
    stack: Vec<Scene>,
    cache: BTreeMap<String, Scene>,
    overlay: Option<Scene>,
}

impl SceneManager {
    /// Creates an empty manager whose scenes are initialized with `engine`.
    #[must_use]
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            stack: Vec::new(),
            cache: BTreeMap::new(),
            overlay: None,
        }
    }

    /// Engine handle scenes are initialized with.
    #[must_use]
    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// Creates, initializes and enters the overlay scene. No-op if it exists.
    pub fn create_overlay(&mut self) -> Result<()> {
        if self.overlay.is_some() {
            return Ok(());
        }
        let mut overlay = Scene::new(OVERLAY_NAME, ());
        overlay.init(&self.engine)?;
        overlay.enter()?;
        self.overlay = Some(overlay);
        Ok(())
    }

    /// Stops and destroys the overlay scene.
    pub fn destroy_overlay(&mut self) -> Result<()> {
        if let Some(mut overlay) = self.overlay.take() {
            overlay.stop()?;
            overlay.destroy()?;
        }
        Ok(())
    }

    /// Engine-level scene carrying engine-lifetime input, timers and GUI.
    #[must_use]
    pub fn overlay(&self) -> Option<&Scene> {
        self.overlay.as_ref()
    }

    /// Engine-level scene carrying engine-lifetime input, timers and GUI.
    pub fn overlay_mut(&mut self) -> Option<&mut Scene> {
        self.overlay.as_mut()
    }

    /// Pushes `scene`, pausing the previous top if it was running.
    ///
    /// With `enter`, the new top is initialized (once) and entered; a scene
    /// that comes out of the cache is resumed instead of started.
    pub fn push_scene(&mut self, scene: Scene, enter: bool) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            if top.is_started() {
                top.pause()?;
            }
        }
        log::debug!("pushing scene '{}'", scene.name());
        self.stack.push(scene);
        if enter {
            if let Some(top) = self.stack.last_mut() {
                top.init(&self.engine)?;
                top.enter()?;
            }
        }
        Ok(())
    }

    /// Pops the active scene.
    ///
    /// The popped scene is stopped, then either moved into the cache under
    /// its alias when it asked to be cached on exit, or destroyed. With
    /// `resume_previous`, the new top is resumed or started. Returns `false`
    /// when the stack was empty.
    pub fn pop_scene(&mut self, resume_previous: bool) -> Result<bool> {
        let Some(mut scene) = self.stack.pop() else {
            log::warn!("pop requested on an empty scene stack");
            return Ok(false);
        };
        log::debug!("popping scene '{}'", scene.name());
        scene.stop()?;
        let (cache, alias) = scene.state().cache_on_exit();
        if cache {
            let alias = alias.to_owned();
            scene.mark_cached();
            log::debug!("caching scene '{}' as '{alias}'", scene.name());
            let _ = self.cache.insert(alias, scene);
        } else {
            scene.destroy()?;
        }
        if resume_previous {
            if let Some(top) = self.stack.last_mut() {
                top.init(&self.engine)?;
                top.enter()?;
            }
        }
        Ok(true)
    }

    /// Takes a cached scene out of the cache.
    pub fn pop_cached(&mut self, alias: &str) -> Option<Scene> {
        self.cache.remove(alias)
    }

    /// Stores `scene` in the cache under `alias` and marks it to be cached
    /// again whenever it is popped.
    pub fn cache(&mut self, alias: &str, mut scene: Scene) {
        scene.state_mut().set_cache_on_exit(true, alias);
        let _ = self.cache.insert(alias.to_owned(), scene);
    }

    /// Reports whether a scene is cached under `alias`.
    #[must_use]
    pub fn has_cached_scene(&self, alias: &str) -> bool {
        self.cache.contains_key(alias)
    }

    /// Number of cached scenes.
    #[must_use]
    pub fn cached_scene_count(&self) -> usize {
        self.cache.len()
    }

    /// Stops and destroys every scene on the stack, top first.
    pub fn clear(&mut self) -> Result<()> {
        while let Some(mut scene) = self.stack.pop() {
            scene.stop()?;
            scene.destroy()?;
        }
        Ok(())
    }

    /// Stops and destroys every stacked scene below the active one.
    pub fn clear_all_except_active(&mut self) -> Result<()> {
        let Some(active) = self.stack.pop() else {
            return Ok(());
        };
        self.clear()?;
        self.stack.push(active);
        Ok(())
    }

    /// Drops every cached scene. Cached scenes were stopped when they were
    /// popped; they are not destroyed again.
    pub fn clear_cached_scenes(&mut self) {
        self.cache.clear();
    }

    /// Active scene.
    #[must_use]
    pub fn active_scene(&self) -> Option<&Scene> {
        self.stack.last()
    }

    /// Active scene.
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.stack.last_mut()
    }

    /// Names of the stacked scenes, bottom first.
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.stack.iter().map(Scene::name)
    }

    /// Number of stacked scenes.
    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.stack.len()
    }

    /// Reports whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Routes an event to the overlay, then to the active scene.
    pub fn handle_event(&mut self, event: &SystemEvent) -> Result<()> {
        if let Some(overlay) = &mut self.overlay {
            overlay.handle_event(event)?;
        }
        if let Some(top) = self.stack.last_mut() {
            top.handle_event(event)?;
        }
        Ok(())
    }

    /// Updates the active scene, then the overlay.
    pub fn update(&mut self, dt: f32, fixed: bool) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            top.update(dt, fixed)?;
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.update(dt, fixed)?;
        }
        Ok(())
    }

    /// Post-updates the active scene, then the overlay.
    pub fn post_update(&mut self) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            top.post_update()?;
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.post_update()?;
        }
        Ok(())
    }

    /// Renders the active scene, then the overlay on top of it.
    pub fn render(&mut self, target: &mut dyn RenderTarget) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            top.render(target)?;
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.render(target)?;
        }
        Ok(())
    }

    /// Runs the frame-begin hooks of the active scene and the overlay.
    pub fn frame_begin(&mut self) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            top.frame_begin()?;
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.frame_begin()?;
        }
        Ok(())
    }

    /// Runs the frame-end hooks of the active scene and the overlay.
    pub fn frame_end(&mut self) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            top.frame_end()?;
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.frame_end()?;
        }
        Ok(())
    }
}
