//! Named-event callback registry.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

/// Identifier returned when a listener is registered.
///
/// Identifiers are non-zero and increase monotonically per emitter.
pub type ListenerId = u64;

type Callback<E> = Box<dyn FnMut(&E)>;

struct Listener<E> {
    id: ListenerId,
    event: Option<String>,
    once: bool,
    suspended: Cell<bool>,
    removed: Cell<bool>,
    callback: RefCell<Callback<E>>,
}

/// Registry of callbacks keyed by event name.
///
/// Emission walks a snapshot of the registry taken when `emit` starts, so
/// listeners registered from inside a callback first fire on the next
/// emission, and listeners removed from inside a callback (including the one
/// currently running) are skipped for the rest of the pass without disturbing
/// the others.
///
/// Callbacks run on the caller's stack. A panicking callback unwinds out of
/// [`EventEmitter::emit`]; the emitter never catches it. Emitting from inside
/// a callback dispatches recursively to every other listener, but a callback
/// that is still running is not re-entered.
pub struct EventEmitter<E: 'static> {
    listeners: RefCell<Vec<Rc<Listener<E>>>>,
    next_id: Cell<ListenerId>,
}

impl<E: 'static> EventEmitter<E> {
    /// Creates an emitter without listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Registers `callback` for every emission of `event`.
    pub fn add_listener<F>(&self, event: &str, callback: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        self.insert(Some(event), false, Box::new(callback))
    }

    /// Registers `callback` for the next emission of `event` only.
    ///
    /// The listener is removed after it has been invoked.
    pub fn add_once_listener<F>(&self, event: &str, callback: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        self.insert(Some(event), true, Box::new(callback))
    }

    /// Registers `callback` for every emission regardless of the event name.
    ///
    /// Wildcard listeners run after the listeners of the emitted event.
    pub fn add_wildcard_listener<F>(&self, callback: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        self.insert(None, false, Box::new(callback))
    }

    fn insert(&self, event: Option<&str>, once: bool, callback: Callback<E>) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push(Rc::new(Listener {
            id,
            event: event.map(str::to_owned),
            once,
            suspended: Cell::new(false),
            removed: Cell::new(false),
            callback: RefCell::new(callback),
        }));
        id
    }

    /// Suspends or reinstates a listener without removing it.
    ///
    /// Returns `false` when no listener with `id` exists.
    pub fn suspend(&self, id: ListenerId, suspend: bool) -> bool {
        match self.find(id) {
            Some(listener) => {
                listener.suspended.set(suspend);
                true
            }
            None => false,
        }
    }

    /// Reports whether the listener exists and is suspended.
    #[must_use]
    pub fn is_suspended(&self, id: ListenerId) -> bool {
        self.find(id)
            .map(|listener| listener.suspended.get())
            .unwrap_or(false)
    }

    /// Reports whether a listener with `id` is registered.
    #[must_use]
    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.find(id).is_some()
    }

    /// Removes a single listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(position) = listeners.iter().position(|listener| listener.id == id) else {
            return false;
        };
        let listener = listeners.remove(position);
        listener.removed.set(true);
        true
    }

    /// Removes every listener registered for `event`.
    ///
    /// Returns `false` if there were none.
    pub fn remove_all(&self, event: &str) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|listener| {
            let matches = listener.event.as_deref() == Some(event);
            if matches {
                listener.removed.set(true);
            }
            !matches
        });
        before != listeners.len()
    }

    /// Removes every listener, named and wildcard alike.
    pub fn clear(&self) {
        for listener in self.listeners.borrow_mut().drain(..) {
            listener.removed.set(true);
        }
    }

    /// Number of listeners registered for `event`, excluding wildcards.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|listener| listener.event.as_deref() == Some(event))
            .count()
    }

    /// Number of listeners of any kind.
    #[must_use]
    pub fn total_listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Invokes the listeners of `event` in registration order, then the
    /// wildcard listeners.
    ///
    /// A nested `emit` from inside a callback skips the callbacks further up
    /// the stack.
    pub fn emit(&self, event: &str, payload: &E) {
        let snapshot: Vec<Rc<Listener<E>>> = {
            let listeners = self.listeners.borrow();
            let named = listeners
                .iter()
                .filter(|listener| listener.event.as_deref() == Some(event));
            let wildcard = listeners.iter().filter(|listener| listener.event.is_none());
            named.chain(wildcard).cloned().collect()
        };

        let mut expired = false;
        for listener in snapshot {
            if listener.removed.get() || listener.suspended.get() {
                continue;
            }

            {
                let Ok(mut callback) = listener.callback.try_borrow_mut() else {
                    log::trace!("listener {} is already running, skipped", listener.id);
                    continue;
                };
                (*callback)(payload);
            }

            if listener.once {
                listener.removed.set(true);
                expired = true;
            }
        }

        if expired {
            self.listeners
                .borrow_mut()
                .retain(|listener| !listener.removed.get());
        }
    }

    /// Creates a new emitter sharing the callbacks of the listeners whose
    /// event name satisfies `keep`. Wildcard listeners are always kept.
    ///
    /// Shared callbacks are the same closures: state captured by a callback
    /// is observed by both emitters.
    #[must_use]
    pub fn clone_where<P>(&self, keep: P) -> Self
    where
        P: Fn(&str) -> bool,
    {
        let kept: Vec<Rc<Listener<E>>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.event.as_deref().map_or(true, |event| keep(event)))
            .cloned()
            .collect();

        Self {
            listeners: RefCell::new(kept),
            next_id: Cell::new(self.next_id.get()),
        }
    }

    fn find(&self, id: ListenerId) -> Option<Rc<Listener<E>>> {
        self.listeners
            .borrow()
            .iter()
            .find(|listener| listener.id == id)
            .cloned()
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.total_listener_count())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}
