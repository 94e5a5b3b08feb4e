#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative object and grid state for a tessera scene.
//!
//! A [`World`] owns every [`GridObject`] and [`Grid`] of a scene in
//! generational arenas. Other subsystems refer to them through
//! [`ObjectHandle`] and [`GridHandle`]; a handle to something that has been
//! destroyed simply stops resolving, so nobody holds a dangling reference.

pub mod arena;
pub mod grid;
pub mod object;
pub mod parser;

pub use arena::{Arena, Handle};
pub use grid::{Grid, Tile};
pub use object::{Collidable, GridObject};
pub use parser::GridParser;

use tessera_core::{names, Event, Index, ObjectId, Vec2};

/// Handle to a [`GridObject`] stored in a [`World`].
pub type ObjectHandle = Handle<GridObject>;

/// Handle to a [`Grid`] stored in a [`World`].
pub type GridHandle = Handle<Grid>;

/// Participant advanced by its scene every frame.
pub trait Updatable {
    /// Variable-rate update, `dt` already scaled by the scene timescale.
    fn update(&mut self, dt: f32, world: &mut World);

    /// Fixed-rate update, `dt` already scaled by the scene timescale.
    fn fixed_update(&mut self, dt: f32, world: &mut World) {
        let _ = (dt, world);
    }
}

/// Reports whether two objects may interact under the collision rules.
///
/// Both must be active with collisions enabled, share a collision id, and
/// neither may exclude the group of the other.
#[must_use]
pub fn can_collide(a: &GridObject, b: &GridObject) -> bool {
    let (first, second) = (a.collidable(), b.collidable());
    a.is_active()
        && b.is_active()
        && first.is_enabled()
        && second.is_enabled()
        && first.collision_id() == second.collision_id()
        && !first.excludes(second.group())
        && !second.excludes(first.group())
}

/// Object and grid registry of a scene.
#[derive(Debug, Default)]
pub struct World {
    objects: Arena<GridObject>,
    grids: Arena<Grid>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `object` and returns its handle.
    pub fn spawn(&mut self, object: GridObject) -> ObjectHandle {
        let handle = self.objects.insert(object);
        log::trace!("spawned object {handle:?}");
        handle
    }

    /// Object behind `handle`.
    #[must_use]
    pub fn object(&self, handle: ObjectHandle) -> Option<&GridObject> {
        self.objects.get(handle)
    }

    /// Mutable object behind `handle`.
    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut GridObject> {
        self.objects.get_mut(handle)
    }

    /// Mutable access to two distinct objects at once.
    pub fn objects_mut(
        &mut self,
        first: ObjectHandle,
        second: ObjectHandle,
    ) -> Option<(&mut GridObject, &mut GridObject)> {
        self.objects.get2_mut(first, second)
    }

    /// Reports whether `handle` still resolves.
    #[must_use]
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.objects.contains(handle)
    }

    /// Iterates over every live object.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &GridObject)> {
        self.objects.iter()
    }

    /// Number of live objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Handle of the object whose identity is `id`.
    #[must_use]
    pub fn find(&self, id: ObjectId) -> Option<ObjectHandle> {
        self.objects
            .iter()
            .find(|(_, object)| object.id() == id)
            .map(|(handle, _)| handle)
    }

    /// Destroys an object.
    ///
    /// The destruction broadcast fires first, while the object is still
    /// reachable; afterwards the object leaves its grid and every peer list,
    /// and its handle stops resolving.
    pub fn destroy(&mut self, handle: ObjectHandle) -> bool {
        let Some(object) = self.objects.get(handle) else {
            return false;
        };
        object.object().emit_destruction();

        if let Some(grid) = object.grid() {
            if let Some(grid) = self.grids.get_mut(grid) {
                let _ = grid.remove_child(handle);
            }
        }
        self.detach_peers(handle);

        let _ = self.objects.remove(handle);
        true
    }

    /// Removes `handle` from the peer lists of every object it overlaps, and
    /// clears its own peer list.
    pub fn detach_peers(&mut self, handle: ObjectHandle) {
        let Some(object) = self.objects.get_mut(handle) else {
            return;
        };
        for peer in object.collidable_mut().clear_peers() {
            if let Some(peer) = self.objects.get_mut(peer) {
                let _ = peer.collidable_mut().remove_peer(handle);
            }
        }
    }

    /// Takes ownership of `grid` and returns its handle.
    pub fn add_grid(&mut self, grid: Grid) -> GridHandle {
        self.grids.insert(grid)
    }

    /// Grid behind `handle`.
    #[must_use]
    pub fn grid(&self, handle: GridHandle) -> Option<&Grid> {
        self.grids.get(handle)
    }

    /// Mutable grid behind `handle`.
    pub fn grid_mut(&mut self, handle: GridHandle) -> Option<&mut Grid> {
        self.grids.get_mut(handle)
    }

    /// Iterates over every live grid.
    pub fn grids(&self) -> impl Iterator<Item = (GridHandle, &Grid)> {
        self.grids.iter()
    }

    /// Removes a grid. Its children stay in the world, outside of any grid.
    pub fn remove_grid(&mut self, handle: GridHandle) -> bool {
        let Some(grid) = self.grids.get_mut(handle) else {
            return false;
        };
        let grid_id = grid.id();
        let children = grid.take_children();
        for (child, _) in children {
            self.leave_grid(child, grid_id);
        }
        self.grids.remove(handle).is_some()
    }

    /// Moves a grid together with its children.
    pub fn set_grid_position(&mut self, handle: GridHandle, position: Vec2) -> bool {
        let Some(grid) = self.grids.get_mut(handle) else {
            return false;
        };
        let offset = position - grid.position();
        grid.set_position(position);
        let children: Vec<ObjectHandle> = grid.children().iter().map(|(child, _)| *child).collect();
        for child in children {
            if let Some(object) = self.objects.get_mut(child) {
                object.translate(offset);
            }
        }
        true
    }

    /// Places `child` on the tile at `index`, centred on the tile.
    ///
    /// An object belonging to another grid is moved over. Returns `false` if
    /// either handle is stale, the index is outside the grid, or the object
    /// already belongs to this grid.
    pub fn add_child(&mut self, grid: GridHandle, child: ObjectHandle, index: Index) -> bool {
        let Some(target) = self.grids.get(grid) else {
            return false;
        };
        if !target.is_index_valid(index) || target.has_child(child) {
            return false;
        }
        let Some(previous) = self.objects.get(child).map(GridObject::grid) else {
            return false;
        };
        if let Some(previous) = previous {
            let _ = self.remove_child(previous, child);
        }

        let Some(target) = self.grids.get_mut(grid) else {
            return false;
        };
        let _ = target.insert_child(child, index);
        let centre = target.tile(index).centre();
        let grid_id = target.id();

        let Some(object) = self.objects.get_mut(child) else {
            return false;
        };
        object.set_grid(Some(grid));
        object.set_position(centre);
        object.events().emit(
            names::GRID_OBJECT_GRID_ENTER,
            &Event::GridEntered {
                grid: grid_id,
                index,
            },
        );
        true
    }

    /// Removes `child` from `grid` without destroying it.
    pub fn remove_child(&mut self, grid: GridHandle, child: ObjectHandle) -> bool {
        let Some(target) = self.grids.get_mut(grid) else {
            return false;
        };
        if !target.remove_child(child) {
            return false;
        }
        let grid_id = target.id();
        self.leave_grid(child, grid_id);
        true
    }

    /// Removes every child of `grid`.
    pub fn remove_all_children(&mut self, grid: GridHandle) {
        let Some(target) = self.grids.get_mut(grid) else {
            return;
        };
        let grid_id = target.id();
        for (child, _) in target.take_children() {
            self.leave_grid(child, grid_id);
        }
    }

    fn leave_grid(&mut self, child: ObjectHandle, grid_id: ObjectId) {
        if let Some(object) = self.objects.get_mut(child) {
            object.set_grid(None);
            object
                .events()
                .emit(names::GRID_OBJECT_GRID_EXIT, &Event::GridExited { grid: grid_id });
        }
    }

    /// Records `child` as occupying the tile at `index` and centres it there.
    ///
    /// Returns `false` when the object is not in a grid or the index is
    /// outside of it.
    pub fn change_child_tile(&mut self, child: ObjectHandle, index: Index) -> bool {
        let Some(grid) = self.objects.get(child).and_then(GridObject::grid) else {
            return false;
        };
        let Some(target) = self.grids.get_mut(grid) else {
            return false;
        };
        if !target.is_index_valid(index) || !target.move_child(child, index) {
            return false;
        }
        let centre = target.tile(index).centre();
        if let Some(object) = self.objects.get_mut(child) {
            object.set_position(centre);
        }
        true
    }

    /// Tile index recorded for `child` in its grid.
    #[must_use]
    pub fn child_tile(&self, child: ObjectHandle) -> Option<Index> {
        let grid = self.objects.get(child)?.grid()?;
        self.grids.get(grid)?.child_tile(child)
    }

    /// Tile occupied by `child`.
    #[must_use]
    pub fn tile_occupied_by(&self, child: ObjectHandle) -> Option<&Tile> {
        let grid = self.objects.get(child)?.grid()?;
        let grid = self.grids.get(grid)?;
        let index = grid.child_tile(child)?;
        Some(grid.tile(index))
    }

    /// Live children recorded in the tile at `index` of `grid`.
    #[must_use]
    pub fn children_in_tile(&self, grid: GridHandle, index: Index) -> Vec<ObjectHandle> {
        self.grids
            .get(grid)
            .map(|grid| grid.children_in_tile(index))
            .unwrap_or_default()
            .into_iter()
            .filter(|child| self.objects.contains(*child))
            .collect()
    }

    /// Children of `grid` whose tag is `tag`.
    #[must_use]
    pub fn children_with_tag(&self, grid: GridHandle, tag: &str) -> Vec<ObjectHandle> {
        let Some(grid) = self.grids.get(grid) else {
            return Vec::new();
        };
        grid.children()
            .iter()
            .map(|(child, _)| *child)
            .filter(|child| self.objects.get(*child).is_some_and(|object| object.tag() == tag))
            .collect()
    }

    /// Child of `grid` whose identity is `id`.
    #[must_use]
    pub fn find_child_by_id(&self, grid: GridHandle, id: ObjectId) -> Option<ObjectHandle> {
        self.grids
            .get(grid)?
            .children()
            .iter()
            .map(|(child, _)| *child)
            .find(|child| self.objects.get(*child).is_some_and(|object| object.id() == id))
    }

    /// Destroys every object and grid.
    pub fn clear(&mut self) {
        for handle in self.objects.handles() {
            let _ = self.destroy(handle);
        }
        self.grids.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use tessera_core::Event;

    use super::*;

    fn world_with_grid() -> (World, GridHandle) {
        let mut world = World::new();
        let grid = world.add_grid(Grid::new(3, 3, Vec2::splat(32.0), '.'));
        (world, grid)
    }

    #[test]
    fn add_child_centres_the_object_and_is_not_repeatable() {
        let (mut world, grid) = world_with_grid();
        let child = world.spawn(GridObject::new(Vec2::splat(16.0)));
        let entered = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&entered);
        let _ = world
            .object(child)
            .expect("spawned")
            .events()
            .add_listener(names::GRID_OBJECT_GRID_ENTER, move |event| {
                if let Event::GridEntered { index, .. } = event {
                    sink.borrow_mut().push(*index);
                }
            });

        assert!(world.add_child(grid, child, Index::new(1, 2)));
        assert!(!world.add_child(grid, child, Index::new(1, 2)));

        let object = world.object(child).expect("spawned");
        assert_eq!(object.position(), Vec2::new(80.0, 48.0));
        assert_eq!(object.grid(), Some(grid));
        assert_eq!(*entered.borrow(), vec![Index::new(1, 2)]);
        let tile = world.tile_occupied_by(child).expect("placed");
        assert!(tile.contains(object.position()));
    }

    #[test]
    fn destroyed_children_leave_the_grid_and_stop_resolving() {
        let (mut world, grid) = world_with_grid();
        let child = world.spawn(GridObject::new(Vec2::ONE));
        let destroyed = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&destroyed);
        let _ = world
            .object(child)
            .expect("spawned")
            .object()
            .on_destruction(move |id| *sink.borrow_mut() = Some(id));
        let id = world.object(child).expect("spawned").id();
        assert!(world.add_child(grid, child, Index::new(0, 0)));

        assert!(world.destroy(child));

        assert_eq!(*destroyed.borrow(), Some(id));
        assert!(world.object(child).is_none());
        assert_eq!(world.grid(grid).expect("grid").child_count(), 0);
        assert!(!world.destroy(child));
    }

    #[test]
    fn moving_the_grid_moves_its_children() {
        let (mut world, grid) = world_with_grid();
        let child = world.spawn(GridObject::new(Vec2::ONE));
        assert!(world.add_child(grid, child, Index::new(0, 0)));

        assert!(world.set_grid_position(grid, Vec2::new(100.0, 10.0)));

        let object = world.object(child).expect("spawned");
        assert_eq!(object.position(), Vec2::new(116.0, 26.0));
        assert!(world
            .tile_occupied_by(child)
            .expect("placed")
            .contains(object.position()));
    }

    #[test]
    fn children_can_be_found_by_tag_and_id() {
        let (mut world, grid) = world_with_grid();
        let coin = world.spawn(GridObject::new(Vec2::ONE).with_tag("coin"));
        let wall = world.spawn(GridObject::new(Vec2::ONE).with_tag("wall"));
        assert!(world.add_child(grid, coin, Index::new(0, 1)));
        assert!(world.add_child(grid, wall, Index::new(0, 1)));

        assert_eq!(world.children_with_tag(grid, "coin"), vec![coin]);
        let wall_id = world.object(wall).expect("spawned").id();
        assert_eq!(world.find_child_by_id(grid, wall_id), Some(wall));
        assert_eq!(world.children_in_tile(grid, Index::new(0, 1)), vec![coin, wall]);

        world.remove_all_children(grid);
        assert!(world.object(coin).expect("spawned").grid().is_none());
    }

    #[test]
    fn collision_rules_respect_ids_and_exclusions() {
        let mut a = GridObject::new(Vec2::ONE).with_collision_group("player");
        let b = GridObject::new(Vec2::ONE).with_collision_group("enemy");
        assert!(can_collide(&a, &b));

        a.exclude_collisions_with("enemy");
        assert!(!can_collide(&a, &b));
        assert!(!can_collide(&b, &a));

        let _ = a.include_collisions_with("enemy");
        a.set_collision_id(2);
        assert!(!can_collide(&a, &b));

        a.set_collision_id(0);
        a.set_active(false);
        assert!(!can_collide(&a, &b));
    }
}
