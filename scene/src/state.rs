//! Data owned by a scene.

use std::cell::RefMut;

use tessera_core::{
    Error, Object, ObjectId, PrefContainer, Property, PropertyContainer, Result, SystemEventHandler,
    Vec2,
};
use tessera_rendering::{Camera, GuiContainer, RenderLayerContainer};
use tessera_system_collision::CollisionDispatcher;
use tessera_system_input::InputManager;
use tessera_system_timer::TimerManager;
use tessera_world::{ObjectHandle, Updatable, World};

use crate::{
    registry::{Registry, Shared},
    AudioManager, EngineHandle, Scene,
};

/// Services a scene receives when it is initialized.
pub(crate) struct Services {
    pub(crate) engine: EngineHandle,
    pub(crate) input: InputManager,
    pub(crate) timers: TimerManager,
    pub(crate) camera: Camera,
    pub(crate) layers: RenderLayerContainer,
    pub(crate) gui: Option<Box<dyn GuiContainer>>,
}

impl Services {
    pub(crate) fn new(engine: &EngineHandle) -> Self {
        Self {
            camera: Camera::new(engine.window_size()),
            engine: engine.clone(),
            input: InputManager::new(),
            timers: TimerManager::new(),
            layers: RenderLayerContainer::new(),
            gui: None,
        }
    }
}

pub(crate) struct Background {
    pub(crate) scene: Box<Scene>,
    pub(crate) drawable: bool,
    pub(crate) update_enabled: bool,
    pub(crate) events_enabled: bool,
}

/// Everything a scene owns apart from its behaviour.
///
/// The world and the participant registries exist from construction. The
/// engine handle, input, timers, camera, render layers and GUI only exist
/// once the scene was initialized; their accessors fail with
/// [`Error::AccessViolation`] before that.
pub struct SceneState {
    pub(crate) object: Object,
    pub(crate) world: World,
    pub(crate) updatables: Registry<dyn Updatable>,
    pub(crate) handlers: Registry<dyn SystemEventHandler>,
    pub(crate) collidables: Vec<ObjectHandle>,
    pub(crate) removed_collidables: Vec<ObjectHandle>,
    pub(crate) dispatcher: CollisionDispatcher,
    timescale: f32,
    cache_on_exit: bool,
    cache_alias: String,
    pub(crate) background: Option<Background>,
    pub(crate) is_background: bool,
    pub(crate) services: Option<Services>,
}

impl std::fmt::Debug for SceneState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneState")
            .field("name", &self.name())
            .field("timescale", &self.timescale)
            .field("updatables", &self.updatables)
            .field("handlers", &self.handlers)
            .field("collidables", &self.collidables.len())
            .field("initialized", &self.services.is_some())
            .finish_non_exhaustive()
    }
}

impl SceneState {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            object: Object::with_tag(name),
            world: World::new(),
            updatables: Registry::default(),
            handlers: Registry::default(),
            collidables: Vec::new(),
            removed_collidables: Vec::new(),
            dispatcher: CollisionDispatcher::new(),
            timescale: 1.0,
            cache_on_exit: false,
            cache_alias: String::new(),
            background: None,
            is_background: false,
            services: None,
        }
    }

    /// Name of the scene.
    #[must_use]
    pub fn name(&self) -> &str {
        self.object.tag()
    }

    /// Identity of the scene.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    /// Addressable part of the scene; carries the `timescale` property
    /// broadcasts.
    #[must_use]
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// Objects and grids of the scene.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Objects and grids of the scene.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Reports whether the scene was initialized.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.services.is_some()
    }

    /// Registers a participant updated every frame. Returns `false` if it
    /// is already registered.
    pub fn add_updatable(&mut self, updatable: Shared<dyn Updatable>) -> bool {
        self.updatables.add(updatable)
    }

    /// Stops updating a participant; it is dropped from the list after the
    /// frame's post-update.
    pub fn remove_updatable(&mut self, updatable: &Shared<dyn Updatable>) -> bool {
        self.updatables.remove(updatable)
    }

    /// Reports whether a participant is being updated.
    #[must_use]
    pub fn has_updatable(&self, updatable: &Shared<dyn Updatable>) -> bool {
        self.updatables.contains(updatable)
    }

    /// Number of participants being updated.
    #[must_use]
    pub fn updatable_count(&self) -> usize {
        self.updatables.len()
    }

    /// Registers a participant that receives every system event routed to
    /// the scene. Returns `false` if it is already registered.
    pub fn add_system_event_handler(&mut self, handler: Shared<dyn SystemEventHandler>) -> bool {
        self.handlers.add(handler)
    }

    /// Stops routing events to a participant.
    pub fn remove_system_event_handler(&mut self, handler: &Shared<dyn SystemEventHandler>) -> bool {
        self.handlers.remove(handler)
    }

    /// Number of registered event handlers.
    #[must_use]
    pub fn system_event_handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Registers an object with the collision dispatcher. Returns `false` if
    /// it is already registered or does not exist.
    pub fn add_collidable(&mut self, object: ObjectHandle) -> bool {
        if let Some(position) = self.removed_collidables.iter().position(|h| *h == object) {
            let _ = self.removed_collidables.swap_remove(position);
            return true;
        }
        if !self.world.contains(object) || self.collidables.contains(&object) {
            return false;
        }
        self.collidables.push(object);
        true
    }

    /// Unregisters an object from the collision dispatcher after the
    /// current pass.
    pub fn remove_collidable(&mut self, object: ObjectHandle) -> bool {
        if !self.is_collidable(object) {
            return false;
        }
        self.removed_collidables.push(object);
        true
    }

    /// Reports whether an object takes part in collision dispatch.
    #[must_use]
    pub fn is_collidable(&self, object: ObjectHandle) -> bool {
        self.collidables.contains(&object) && !self.removed_collidables.contains(&object)
    }

    /// Number of objects taking part in collision dispatch.
    #[must_use]
    pub fn collidable_count(&self) -> usize {
        self.collidables.len() - self.removed_collidables.len()
    }

    pub(crate) fn active_collidables(&self) -> Vec<ObjectHandle> {
        self.collidables
            .iter()
            .copied()
            .filter(|handle| !self.removed_collidables.contains(handle))
            .collect()
    }

    pub(crate) fn flush_removals(&mut self) {
        self.updatables.flush();
        self.handlers.flush();
        let removed = std::mem::take(&mut self.removed_collidables);
        let world = &self.world;
        self.collidables
            .retain(|handle| !removed.contains(handle) && world.contains(*handle));
    }

    /// Multiplier applied to every delta the scene hands out.
    #[must_use]
    pub fn timescale(&self) -> f32 {
        self.timescale
    }

    /// Sets the timescale, clamping negatives to zero, and broadcasts a
    /// `timescale` property change.
    pub fn set_timescale(&mut self, timescale: f32) {
        let timescale = if timescale.is_nan() { 0.0 } else { timescale.max(0.0) };
        self.timescale = timescale;
        self.object
            .emit_change(Property::with_value("timescale", timescale));
    }

    /// Asks the scene manager to keep the scene under `alias` instead of
    /// destroying it when it is popped.
    pub fn set_cache_on_exit(&mut self, cache: bool, alias: &str) {
        self.cache_on_exit = cache;
        self.cache_alias = alias.to_owned();
    }

    /// Whether the scene is cached on pop, and under which alias.
    #[must_use]
    pub fn cache_on_exit(&self) -> (bool, &str) {
        (self.cache_on_exit, &self.cache_alias)
    }

    /// Reports whether this scene is the background of another scene.
    #[must_use]
    pub fn is_background_scene(&self) -> bool {
        self.is_background
    }

    /// Attaches a scene behind this one, replacing and stopping the previous
    /// background.
    ///
    /// The background is initialized with this scene's engine handle and
    /// entered right away, or as soon as this scene is initialized. It is
    /// drawn behind this scene by default, but neither updated nor fed
    /// events until enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when called on a background scene,
    /// and propagates errors from the lifecycle hooks.
    pub fn set_background_scene(&mut self, mut scene: Scene) -> Result<()> {
        if self.is_background {
            return Err(Error::invalid_argument(format!(
                "background scene '{}' cannot have a background scene",
                self.name()
            )));
        }
        let _ = self.remove_background_scene()?;
        scene.state_mut().is_background = true;
        if let Some(services) = &self.services {
            let engine = services.engine.clone();
            scene.init(&engine)?;
            scene.enter()?;
        }
        log::debug!("scene '{}' now draws '{}' behind it", self.name(), scene.name());
        self.background = Some(Background {
            scene: Box::new(scene),
            drawable: true,
            update_enabled: false,
            events_enabled: false,
        });
        Ok(())
    }

    /// Detaches the background scene after stopping and destroying it.
    pub fn remove_background_scene(&mut self) -> Result<bool> {
        match self.background.take() {
            Some(mut background) => {
                background.scene.stop()?;
                background.scene.destroy()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Background scene, if any.
    #[must_use]
    pub fn background_scene(&self) -> Option<&Scene> {
        self.background.as_ref().map(|background| &*background.scene)
    }

    /// Background scene, if any.
    pub fn background_scene_mut(&mut self) -> Option<&mut Scene> {
        self.background
            .as_mut()
            .map(|background| &mut *background.scene)
    }

    /// Sets whether the background is drawn.
    pub fn set_background_scene_drawable(&mut self, drawable: bool) {
        if let Some(background) = &mut self.background {
            background.drawable = drawable;
        }
    }

    /// Reports whether the background is drawn.
    #[must_use]
    pub fn is_background_scene_drawable(&self) -> bool {
        self.background.as_ref().map_or(false, |b| b.drawable)
    }

    /// Sets whether the background is updated.
    pub fn set_background_scene_update_enabled(&mut self, enabled: bool) {
        if let Some(background) = &mut self.background {
            background.update_enabled = enabled;
        }
    }

    /// Reports whether the background is updated.
    #[must_use]
    pub fn is_background_scene_update_enabled(&self) -> bool {
        self.background.as_ref().map_or(false, |b| b.update_enabled)
    }

    /// Sets whether the background receives system events.
    pub fn set_background_scene_events_enabled(&mut self, enabled: bool) {
        if let Some(background) = &mut self.background {
            background.events_enabled = enabled;
        }
    }

    /// Reports whether the background receives system events.
    #[must_use]
    pub fn is_background_scene_events_enabled(&self) -> bool {
        self.background.as_ref().map_or(false, |b| b.events_enabled)
    }

    fn services(&self) -> Result<&Services> {
        self.services.as_ref().ok_or_else(|| self.not_initialized())
    }

    fn services_mut(&mut self) -> Result<&mut Services> {
        match self.services.as_mut() {
            Some(services) => Ok(services),
            None => Err(Error::access_violation(format!(
                "scene '{}' is not initialized",
                self.object.tag()
            ))),
        }
    }

    fn not_initialized(&self) -> Error {
        Error::access_violation(format!("scene '{}' is not initialized", self.name()))
    }

    /// Engine the scene belongs to.
    pub fn engine(&self) -> Result<&EngineHandle> {
        Ok(&self.services()?.engine)
    }

    /// Size of the render surface in pixels.
    pub fn window_size(&self) -> Result<Vec2> {
        Ok(self.services()?.engine.window_size())
    }

    /// Keyboard, mouse and joystick of the scene.
    pub fn input(&self) -> Result<&InputManager> {
        Ok(&self.services()?.input)
    }

    /// Keyboard, mouse and joystick of the scene.
    pub fn input_mut(&mut self) -> Result<&mut InputManager> {
        Ok(&mut self.services_mut()?.input)
    }

    /// Timers of the scene.
    pub fn timers(&self) -> Result<&TimerManager> {
        Ok(&self.services()?.timers)
    }

    /// Timers of the scene.
    pub fn timers_mut(&mut self) -> Result<&mut TimerManager> {
        Ok(&mut self.services_mut()?.timers)
    }

    /// Camera of the scene.
    pub fn camera(&self) -> Result<&Camera> {
        Ok(&self.services()?.camera)
    }

    /// Camera of the scene.
    pub fn camera_mut(&mut self) -> Result<&mut Camera> {
        Ok(&mut self.services_mut()?.camera)
    }

    /// Render layers drawn over the world.
    pub fn render_layers(&self) -> Result<&RenderLayerContainer> {
        Ok(&self.services()?.layers)
    }

    /// Render layers drawn over the world.
    pub fn render_layers_mut(&mut self) -> Result<&mut RenderLayerContainer> {
        Ok(&mut self.services_mut()?.layers)
    }

    /// Widgets drawn on top of the scene, if any were attached.
    pub fn gui(&self) -> Result<Option<&dyn GuiContainer>> {
        Ok(self.services()?.gui.as_deref())
    }

    /// Attaches the widget container of the scene.
    pub fn set_gui(&mut self, gui: Box<dyn GuiContainer>) -> Result<()> {
        self.services_mut()?.gui = Some(gui);
        Ok(())
    }

    /// Engine-lifetime property cache.
    pub fn cache(&self) -> Result<RefMut<'_, PropertyContainer>> {
        Ok(self.services()?.engine.cache())
    }

    /// Engine-lifetime cache meant to be saved as a preference file.
    pub fn savable_cache(&self) -> Result<RefMut<'_, PrefContainer>> {
        Ok(self.services()?.engine.savable_cache())
    }

    /// Engine-lifetime audio facade.
    pub fn audio(&self) -> Result<RefMut<'_, AudioManager>> {
        Ok(self.services()?.engine.audio())
    }
}
