//! Grid-bound, collidable game objects.

use std::{
    collections::HashSet,
    rc::{Rc, Weak},
};

use tessera_core::{Colour, Direction, Event, EventEmitter, Object, ObjectId, Property, Rect, Vec2};

use crate::{GridHandle, ObjectHandle};

/// Collision data attached to every [`GridObject`].
///
/// Two collidables may interact only when they share a collision id and
/// neither excludes the group of the other. The peer list holds the
/// collidables currently overlapping this one and is kept symmetric by the
/// collision dispatcher.
#[derive(Clone, Debug, Default)]
pub struct Collidable {
    group: String,
    id: i32,
    exclude_list: HashSet<String>,
    peers: Vec<ObjectHandle>,
    enabled: bool,
}

impl Collidable {
    fn new() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Collision group name.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Collision id; only collidables with equal ids interact.
    #[must_use]
    pub fn collision_id(&self) -> i32 {
        self.id
    }

    /// Reports whether collisions with `group` are ignored.
    #[must_use]
    pub fn excludes(&self, group: &str) -> bool {
        self.exclude_list.contains(group)
    }

    /// Groups whose members are ignored.
    pub fn exclude_list(&self) -> impl Iterator<Item = &str> {
        self.exclude_list.iter().map(String::as_str)
    }

    /// Reports whether collision checks consider this collidable at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Collidables currently overlapping this one.
    #[must_use]
    pub fn peers(&self) -> &[ObjectHandle] {
        &self.peers
    }

    /// Reports whether `other` is currently in the peer list.
    #[must_use]
    pub fn is_overlapping(&self, other: ObjectHandle) -> bool {
        self.peers.contains(&other)
    }

    /// Records `other` as overlapping. Returns `false` if it already was.
    pub fn add_peer(&mut self, other: ObjectHandle) -> bool {
        if self.peers.contains(&other) {
            return false;
        }
        self.peers.push(other);
        true
    }

    /// Forgets `other` as overlapping. Returns `false` if it was not.
    pub fn remove_peer(&mut self, other: ObjectHandle) -> bool {
        let before = self.peers.len();
        self.peers.retain(|peer| *peer != other);
        before != self.peers.len()
    }

    pub(crate) fn clear_peers(&mut self) -> Vec<ObjectHandle> {
        std::mem::take(&mut self.peers)
    }
}

#[derive(Clone, Debug)]
struct MoverLink {
    id: ObjectId,
    alive: Weak<()>,
}

/// Object living in the world: a transform, collision data and optional grid
/// membership.
///
/// The position is the centre of the object's bounding box. Setters broadcast
/// an `Object_<name>Change` event followed by `Object_propertyChange`.
///
/// A clone is a new identity outside of any grid, with no overlapping peers
/// and no controlling mover.
#[derive(Debug)]
pub struct GridObject {
    object: Object,
    position: Vec2,
    size: Vec2,
    active: bool,
    visible: bool,
    colour: Colour,
    collidable: Collidable,
    grid: Option<GridHandle>,
    obstacle: bool,
    direction: Direction,
    speed: Vec2,
    obstacle_collision_filter: HashSet<String>,
    mover: Option<MoverLink>,
}

impl GridObject {
    /// Creates an active, visible object of `size` at the origin.
    #[must_use]
    pub fn new(size: Vec2) -> Self {
        Self {
            object: Object::new(),
            position: Vec2::ZERO,
            size,
            active: true,
            visible: true,
            colour: Colour::WHITE,
            collidable: Collidable::new(),
            grid: None,
            obstacle: false,
            direction: Direction::Unknown,
            speed: Vec2::ZERO,
            obstacle_collision_filter: HashSet::new(),
            mover: None,
        }
    }

    /// Builder variant of [`GridObject::set_tag`].
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.object.set_tag(tag);
        self
    }

    /// Builder variant of [`GridObject::set_collision_group`].
    #[must_use]
    pub fn with_collision_group(mut self, group: &str) -> Self {
        self.collidable.group = group.to_owned();
        self
    }

    /// Builder variant of [`GridObject::set_speed`].
    #[must_use]
    pub fn with_speed(mut self, speed: Vec2) -> Self {
        self.speed = speed.max(Vec2::ZERO);
        self
    }

    /// Builder variant of [`GridObject::set_obstacle`].
    #[must_use]
    pub fn with_obstacle(mut self, obstacle: bool) -> Self {
        self.obstacle = obstacle;
        self
    }

    /// Builder variant of [`GridObject::set_colour`].
    #[must_use]
    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    /// Underlying addressable object.
    #[must_use]
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// Mutable access to the underlying addressable object.
    pub fn object_mut(&mut self) -> &mut Object {
        &mut self.object
    }

    /// Identity of the object.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    /// Tag of the object.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.object.tag()
    }

    /// Replaces the tag.
    pub fn set_tag(&mut self, tag: &str) {
        self.object.set_tag(tag);
    }

    /// Event bus of the object.
    #[must_use]
    pub fn events(&self) -> &EventEmitter<Event> {
        self.object.events()
    }

    /// Centre of the object in world units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the centre of the object.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.object
            .emit_change(Property::with_value("position", position));
    }

    /// Moves the object by `offset`.
    pub fn translate(&mut self, offset: Vec2) {
        self.set_position(self.position + offset);
    }

    /// Width and height of the bounding box.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Resizes the bounding box around the current centre.
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size.max(Vec2::ZERO);
        self.object.emit_change(Property::with_value("size", self.size));
    }

    /// Axis-aligned bounding box centred on the position.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        Rect::from_centre(self.position, self.size)
    }

    /// Reports whether the object takes part in updates and collisions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activates or deactivates the object.
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        self.object.emit_change(Property::with_value("active", active));
    }

    /// Reports whether the object is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the object.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.object
            .emit_change(Property::with_value("visible", visible));
    }

    /// Fill colour used when drawing the object.
    #[must_use]
    pub fn colour(&self) -> Colour {
        self.colour
    }

    /// Changes the fill colour.
    pub fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
        self.object.emit_change(Property::with_value("colour", colour));
    }

    /// Collision data.
    #[must_use]
    pub fn collidable(&self) -> &Collidable {
        &self.collidable
    }

    /// Mutable collision data, used by the collision dispatcher to maintain
    /// peer lists.
    pub fn collidable_mut(&mut self) -> &mut Collidable {
        &mut self.collidable
    }

    /// Changes the collision group.
    pub fn set_collision_group(&mut self, group: &str) {
        self.collidable.group = group.to_owned();
        self.object
            .emit_change(Property::with_value("collisionGroup", group));
    }

    /// Changes the collision id.
    pub fn set_collision_id(&mut self, id: i32) {
        self.collidable.id = id;
        self.object
            .emit_change(Property::with_value("collisionId", i64::from(id)));
    }

    /// Ignores collisions with members of `group`.
    pub fn exclude_collisions_with(&mut self, group: &str) {
        let _ = self.collidable.exclude_list.insert(group.to_owned());
    }

    /// Stops ignoring collisions with members of `group`.
    pub fn include_collisions_with(&mut self, group: &str) -> bool {
        self.collidable.exclude_list.remove(group)
    }

    /// Enables or disables collision checks for this object.
    pub fn set_collidable_enabled(&mut self, enabled: bool) {
        self.collidable.enabled = enabled;
    }

    /// Grid the object currently belongs to.
    #[must_use]
    pub fn grid(&self) -> Option<GridHandle> {
        self.grid
    }

    pub(crate) fn set_grid(&mut self, grid: Option<GridHandle>) {
        self.grid = grid;
    }

    /// Reports whether the object blocks grid movers.
    #[must_use]
    pub fn is_obstacle(&self) -> bool {
        self.obstacle
    }

    /// Marks the object as an obstacle for grid movers.
    pub fn set_obstacle(&mut self, obstacle: bool) {
        self.obstacle = obstacle;
        self.object
            .emit_change(Property::with_value("obstacle", obstacle));
    }

    /// Direction the object is facing.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Changes the facing direction.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.object
            .emit_change(Property::with_value("direction", direction));
    }

    /// Movement speed in world units per second along each axis.
    #[must_use]
    pub fn speed(&self) -> Vec2 {
        self.speed
    }

    /// Changes the movement speed. Negative components are clamped to zero.
    pub fn set_speed(&mut self, speed: Vec2) {
        self.speed = speed.max(Vec2::ZERO);
        self.object.emit_change(Property::with_value("speed", self.speed));
    }

    /// Lets this object move onto obstacles of `group` without being blocked.
    pub fn add_obstacle_collision_filter(&mut self, group: &str) {
        let _ = self.obstacle_collision_filter.insert(group.to_owned());
    }

    /// Removes `group` from the obstacle collision filter.
    pub fn remove_obstacle_collision_filter(&mut self, group: &str) -> bool {
        self.obstacle_collision_filter.remove(group)
    }

    /// Reports whether obstacles of `group` are passable for this object.
    #[must_use]
    pub fn passes_obstacle_group(&self, group: &str) -> bool {
        self.obstacle_collision_filter.contains(group)
    }

    /// Identity of the grid mover controlling this object, if it is alive.
    #[must_use]
    pub fn mover(&self) -> Option<ObjectId> {
        self.mover
            .as_ref()
            .filter(|link| link.alive.strong_count() > 0)
            .map(|link| link.id)
    }

    /// Records the mover `id` as the controller of this object.
    ///
    /// The link expires on its own once every clone of `token` is dropped.
    /// Returns `false` when another live mover already controls the object.
    pub fn attach_mover(&mut self, id: ObjectId, token: &Rc<()>) -> bool {
        if let Some(current) = self.mover() {
            if current != id {
                return false;
            }
        }
        self.mover = Some(MoverLink {
            id,
            alive: Rc::downgrade(token),
        });
        true
    }

    /// Forgets the controlling mover if it is `id`.
    pub fn detach_mover(&mut self, id: ObjectId) -> bool {
        if self.mover.as_ref().map(|link| link.id) != Some(id) {
            return false;
        }
        self.mover = None;
        true
    }
}

impl Clone for GridObject {
    fn clone(&self) -> Self {
        let mut collidable = self.collidable.clone();
        collidable.peers.clear();
        Self {
            object: self.object.clone(),
            collidable,
            grid: None,
            mover: None,
            obstacle_collision_filter: self.obstacle_collision_filter.clone(),
            ..*self
        }
    }
}
