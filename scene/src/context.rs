//! Engine services shared with every scene.

use std::{
    cell::{Cell, RefCell, RefMut},
    fmt,
    rc::Rc,
};

use tessera_core::{names, Event, EventEmitter, ListenerId, PrefContainer, PropertyContainer, Vec2};

use crate::{AudioManager, Scene};

struct Shared {
    events: EventEmitter<Event>,
    pushes: RefCell<Vec<Scene>>,
    pops: Cell<usize>,
    quit: Cell<bool>,
    paused: Cell<bool>,
    cache: RefCell<PropertyContainer>,
    savable_cache: RefCell<PrefContainer>,
    audio: RefCell<AudioManager>,
    window_size: Cell<Vec2>,
}

/// Cheap, cloneable view of the engine handed to scenes during
/// initialization.
///
/// Scene stack changes requested through the handle are deferred: the
/// engine applies queued pops first, then queued pushes, at the end of the
/// frame in which they were requested.
#[derive(Clone)]
pub struct EngineHandle {
    shared: Rc<Shared>,
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("pending_pushes", &self.pending_push_count())
            .field("pending_pops", &self.pending_pops())
            .field("quit", &self.shared.quit.get())
            .field("paused", &self.shared.paused.get())
            .finish_non_exhaustive()
    }
}

impl Default for EngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineHandle {
    /// Creates a handle with empty caches and the default audio facade.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                events: EventEmitter::new(),
                pushes: RefCell::new(Vec::new()),
                pops: Cell::new(0),
                quit: Cell::new(false),
                paused: Cell::new(false),
                cache: RefCell::new(PropertyContainer::new()),
                savable_cache: RefCell::new(PrefContainer::new()),
                audio: RefCell::new(AudioManager::default()),
                window_size: Cell::new(Vec2::ZERO),
            }),
        }
    }

    /// Engine-wide event bus (`initialize`, `start`, `sceneActivate`,
    /// `frameStart`, `frameEnd`, `pause`, `resume`, `shutdown`).
    #[must_use]
    pub fn events(&self) -> &EventEmitter<Event> {
        &self.shared.events
    }

    /// Subscribes to an engine event.
    pub fn on<F>(&self, event: &str, callback: F) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        self.shared.events.add_listener(event, callback)
    }

    /// Queues `scene` to be pushed at the end of the frame.
    pub fn push_scene(&self, scene: Scene) {
        log::debug!("queued push of scene '{}'", scene.name());
        self.shared.pushes.borrow_mut().push(scene);
    }

    /// Queues a pop of the active scene at the end of the frame.
    pub fn pop_scene(&self) {
        self.shared.pops.set(self.shared.pops.get() + 1);
    }

    /// Number of queued pops.
    #[must_use]
    pub fn pending_pops(&self) -> usize {
        self.shared.pops.get()
    }

    /// Number of queued pushes.
    #[must_use]
    pub fn pending_push_count(&self) -> usize {
        self.shared.pushes.borrow().len()
    }

    /// Hands the queued pop count and pushes to the caller and empties the
    /// queues.
    pub fn take_pending(&self) -> (usize, Vec<Scene>) {
        let pops = self.shared.pops.replace(0);
        let pushes = std::mem::take(&mut *self.shared.pushes.borrow_mut());
        (pops, pushes)
    }

    /// Asks the engine to stop after the current frame.
    pub fn quit(&self) {
        if !self.shared.quit.replace(true) {
            log::info!("engine quit requested");
        }
    }

    /// Reports whether [`EngineHandle::quit`] was called.
    #[must_use]
    pub fn is_quit_requested(&self) -> bool {
        self.shared.quit.get()
    }

    /// Suspends scene updates; rendering continues. Returns `false` if the
    /// engine was already paused.
    pub fn pause(&self) -> bool {
        if self.shared.paused.replace(true) {
            return false;
        }
        log::debug!("engine paused");
        self.shared.events.emit(names::PAUSE, &Event::Paused);
        true
    }

    /// Resumes scene updates. Returns `false` if the engine was not paused.
    pub fn resume(&self) -> bool {
        if !self.shared.paused.replace(false) {
            return false;
        }
        log::debug!("engine resumed");
        self.shared.events.emit(names::RESUME, &Event::Resumed);
        true
    }

    /// Reports whether scene updates are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.paused.get()
    }

    /// Engine-lifetime property cache.
    #[must_use]
    pub fn cache(&self) -> RefMut<'_, PropertyContainer> {
        self.shared.cache.borrow_mut()
    }

    /// Engine-lifetime cache meant to be saved as a preference file.
    #[must_use]
    pub fn savable_cache(&self) -> RefMut<'_, PrefContainer> {
        self.shared.savable_cache.borrow_mut()
    }

    /// Engine-lifetime audio facade.
    #[must_use]
    pub fn audio(&self) -> RefMut<'_, AudioManager> {
        self.shared.audio.borrow_mut()
    }

    /// Size of the render surface in pixels.
    #[must_use]
    pub fn window_size(&self) -> Vec2 {
        self.shared.window_size.get()
    }

    /// Records the size of the render surface.
    pub fn set_window_size(&self, size: Vec2) {
        self.shared.window_size.set(size);
    }

    /// Drops queued scene changes, caches and engine listeners, and clears
    /// the quit and pause flags.
    pub fn reset(&self) {
        let _ = self.take_pending();
        self.shared.cache.borrow_mut().clear();
        self.shared.savable_cache.borrow_mut().clear();
        self.shared.events.clear();
        self.shared.quit.set(false);
        self.shared.paused.set(false);
    }
}
