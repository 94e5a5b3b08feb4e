#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tessera framework.
//!
//! This crate defines the vocabulary every other crate speaks: stable object
//! identities, the named-event [`EventEmitter`], the closed set of [`Event`]
//! payloads broadcast by framework objects, typed [`Property`] values, the
//! preference file format, platform-neutral [`SystemEvent`]s and the small
//! geometric types used by grids and collision checks. Nothing in here knows
//! about scenes, grids or rendering backends.

pub mod colour;
pub mod direction;
pub mod emitter;
pub mod error;
pub mod event;
pub mod geometry;
pub mod id;
pub mod input;
pub mod object;
pub mod pref;
pub mod property;

pub use colour::Colour;
pub use direction::{Direction, Index, MoveRestriction};
pub use emitter::{EventEmitter, ListenerId};
pub use error::{Error, Result};
pub use event::{names, Event};
pub use geometry::Rect;
pub use glam::{IVec2, Vec2};
pub use id::ObjectId;
pub use input::{
    JoystickIdentification, Key, MouseButton, MouseWheel, SystemEvent, SystemEventHandler,
    SystemEventKind,
};
pub use object::Object;
pub use pref::{PrefContainer, PrefType, Preference};
pub use property::{FromPropertyValue, Property, PropertyContainer, PropertyValue};
