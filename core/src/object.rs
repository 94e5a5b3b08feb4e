//! Identity, tag and lifetime broadcasts shared by every framework entity.

use std::cell::Cell;

use crate::{names, Event, EventEmitter, ListenerId, ObjectId, Property};

/// Addressable entity: a process-unique id, a free-form tag and an event bus.
///
/// Cloning produces a new identity. The clone keeps every listener of the
/// source except the destruction listeners, which stay bound to the original.
/// Moving a value keeps its identity.
///
/// The destruction broadcast fires exactly once: either when
/// [`Object::emit_destruction`] is called by an owner that needs to notify
/// observers before tearing down its own state, or when the object is dropped.
#[derive(Debug)]
pub struct Object {
    id: ObjectId,
    tag: String,
    events: EventEmitter<Event>,
    destruction_emitted: Cell<bool>,
}

impl Object {
    /// Creates an untagged object with a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tag("")
    }

    /// Creates an object with a fresh identity and the provided tag.
    #[must_use]
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            tag: tag.into(),
            events: EventEmitter::new(),
            destruction_emitted: Cell::new(false),
        }
    }

    /// Identity of the object.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Current tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Replaces the tag, broadcasting the change only when the value differs.
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if tag == self.tag {
            return;
        }
        self.tag = tag;
        self.emit_change(Property::with_value("tag", self.tag.clone()));
    }

    /// Event bus owned by the object.
    #[must_use]
    pub fn events(&self) -> &EventEmitter<Event> {
        &self.events
    }

    /// Broadcasts `property` as `Object_<name>Change`, then as the wildcard
    /// `Object_propertyChange`.
    pub fn emit_change(&self, property: Property) {
        let specific = names::property_change(property.name());
        let event = Event::PropertyChanged(property);
        self.events.emit(&specific, &event);
        self.events.emit(names::PROPERTY_CHANGE, &event);
    }

    /// Subscribes to changes of the property called `name`.
    pub fn on_property_change<F>(&self, name: &str, mut callback: F) -> ListenerId
    where
        F: FnMut(&Property) + 'static,
    {
        self.events
            .add_listener(&names::property_change(name), move |event| {
                if let Event::PropertyChanged(property) = event {
                    callback(property);
                }
            })
    }

    /// Subscribes to changes of any property.
    pub fn on_any_property_change<F>(&self, mut callback: F) -> ListenerId
    where
        F: FnMut(&Property) + 'static,
    {
        self.events.add_listener(names::PROPERTY_CHANGE, move |event| {
            if let Event::PropertyChanged(property) = event {
                callback(property);
            }
        })
    }

    /// Subscribes to the destruction broadcast.
    pub fn on_destruction<F>(&self, mut callback: F) -> ListenerId
    where
        F: FnMut(ObjectId) + 'static,
    {
        self.events.add_listener(names::DESTRUCTION, move |event| {
            if let Event::Destroyed { id } = event {
                callback(*id);
            }
        })
    }

    /// Removes a listener previously registered on this object.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.events.remove_listener(id)
    }

    /// Broadcasts `Object_destruction` unless it was already broadcast.
    pub fn emit_destruction(&self) {
        if self.destruction_emitted.replace(true) {
            return;
        }
        log::trace!("object {} destroyed", self.id);
        self.events
            .emit(names::DESTRUCTION, &Event::Destroyed { id: self.id });
    }

    /// Reports whether the destruction broadcast already happened.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destruction_emitted.get()
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Object {
    fn clone(&self) -> Self {
        Self {
            id: ObjectId::next(),
            tag: self.tag.clone(),
            events: self.events.clone_where(|event| event != names::DESTRUCTION),
            destruction_emitted: Cell::new(false),
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        self.emit_destruction();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn set_tag_broadcasts_once_per_distinct_value() {
        let mut object = Object::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _ = object.on_property_change("tag", move |property| {
            sink.borrow_mut()
                .push(property.value::<String>().unwrap_or_default());
        });

        object.set_tag("player");
        object.set_tag("player");
        object.set_tag("enemy");

        assert_eq!(*seen.borrow(), vec!["player", "enemy"]);
    }

    #[test]
    fn named_change_precedes_the_wildcard_change() {
        let object = Object::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let named = Rc::clone(&order);
        let any = Rc::clone(&order);
        let _ = object.on_any_property_change(move |_| any.borrow_mut().push("any"));
        let _ = object.on_property_change("speed", move |_| named.borrow_mut().push("speed"));

        object.emit_change(Property::with_value("speed", 3.0_f32));

        assert_eq!(*order.borrow(), vec!["speed", "any"]);
    }

    #[test]
    fn destruction_is_broadcast_exactly_once() {
        let count = Rc::new(Cell::new(0));
        {
            let object = Object::new();
            let counter = Rc::clone(&count);
            let _ = object.on_destruction(move |_| counter.set(counter.get() + 1));
            object.emit_destruction();
            object.emit_destruction();
            assert!(object.is_destroyed());
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn clones_get_a_fresh_id_and_no_destruction_listeners() {
        let destroyed = Rc::new(Cell::new(0));
        let changes = Rc::new(Cell::new(0));
        let original = Object::with_tag("crate");
        let on_destroy = Rc::clone(&destroyed);
        let on_change = Rc::clone(&changes);
        let _ = original.on_destruction(move |_| on_destroy.set(on_destroy.get() + 1));
        let _ = original.on_any_property_change(move |_| on_change.set(on_change.get() + 1));

        let copy = original.clone();
        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.tag(), "crate");

        copy.emit_change(Property::with_value("visible", false));
        assert_eq!(changes.get(), 1);

        drop(copy);
        assert_eq!(destroyed.get(), 0);
        drop(original);
        assert_eq!(destroyed.get(), 1);
    }
}
