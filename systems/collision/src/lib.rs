#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Axis-aligned overlap detection with enter, stay and exit notifications.

use tessera_core::{names, Event};
use tessera_world::{can_collide, ObjectHandle, World};

/// Change in the overlap state of a pair of collidables during a pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    /// The pair started overlapping.
    Started {
        /// Intersection-over-union of the two boxes.
        iou: f32,
    },
    /// The pair kept overlapping.
    Stayed {
        /// Intersection-over-union of the two boxes.
        iou: f32,
    },
    /// The pair stopped overlapping.
    Ended,
}

/// Pair-wise overlap dispatcher for the collidables of a scene.
///
/// Pairs are visited once per pass, `(i, j)` with `i < j` in the order the
/// collidables were registered. Each pair moves through the table
///
/// | was | is  | effect |
/// |-----|-----|--------|
/// | no  | no  | nothing |
/// | no  | yes | peers linked, `Collidable_overlapStart` on both |
/// | yes | yes | `Collidable_overlapStay` on both |
/// | yes | no  | peers unlinked, `Collidable_overlapEnd` on both |
///
/// Pairs that may not collide (inactive, excluded group, different collision
/// id) are skipped entirely and keep whatever peer state they had.
#[derive(Debug, Default)]
pub struct CollisionDispatcher {
    snapshot: Vec<ObjectHandle>,
}

impl CollisionDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one pass over `collidables`.
    ///
    /// The list is copied before the pass, and stale handles are skipped, so
    /// listeners may ask their scene to remove or destroy participants.
    pub fn dispatch(&mut self, world: &mut World, collidables: &[ObjectHandle]) {
        self.snapshot.clear();
        self.snapshot.extend_from_slice(collidables);

        for i in 0..self.snapshot.len() {
            for j in (i + 1)..self.snapshot.len() {
                let (first, second) = (self.snapshot[i], self.snapshot[j]);
                if first == second {
                    continue;
                }
                if let Some(transition) = step(world, first, second) {
                    notify(world, first, second, transition);
                }
            }
        }
    }
}

fn step(world: &mut World, first: ObjectHandle, second: ObjectHandle) -> Option<Transition> {
    let (a, b) = world.objects_mut(first, second)?;
    if !can_collide(a, b) {
        return None;
    }

    let was_overlapping = a.collidable().is_overlapping(second);
    let (box_a, box_b) = (a.bounding_box(), b.bounding_box());
    let is_overlapping = box_a.intersects(&box_b);

    match (was_overlapping, is_overlapping) {
        (false, false) => None,
        (false, true) => {
            let _ = a.collidable_mut().add_peer(second);
            let _ = b.collidable_mut().add_peer(first);
            Some(Transition::Started {
                iou: box_a.iou(&box_b),
            })
        }
        (true, true) => Some(Transition::Stayed {
            iou: box_a.iou(&box_b),
        }),
        (true, false) => {
            let _ = a.collidable_mut().remove_peer(second);
            let _ = b.collidable_mut().remove_peer(first);
            Some(Transition::Ended)
        }
    }
}

fn notify(world: &World, first: ObjectHandle, second: ObjectHandle, transition: Transition) {
    let (Some(a), Some(b)) = (world.object(first), world.object(second)) else {
        return;
    };
    log::trace!("collision {:?} between {} and {}", transition, a.id(), b.id());

    for (target, other) in [(a, b.id()), (b, a.id())] {
        let (name, event) = match transition {
            Transition::Started { iou } => (
                names::COLLIDABLE_OVERLAP_START,
                Event::OverlapStarted { other, iou },
            ),
            Transition::Stayed { iou } => (
                names::COLLIDABLE_OVERLAP_STAY,
                Event::OverlapStayed { other, iou },
            ),
            Transition::Ended => (names::COLLIDABLE_OVERLAP_END, Event::OverlapEnded { other }),
        };
        target.events().emit(name, &event);
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::Vec2;
    use tessera_world::GridObject;

    use super::*;

    fn boxed(world: &mut World, centre: Vec2) -> ObjectHandle {
        let mut object = GridObject::new(Vec2::splat(10.0));
        object.set_position(centre);
        world.spawn(object)
    }

    #[test]
    fn excluded_groups_never_link() {
        let mut world = World::new();
        let a = boxed(&mut world, Vec2::new(5.0, 5.0));
        let b = boxed(&mut world, Vec2::new(6.0, 5.0));
        world
            .object_mut(a)
            .expect("spawned")
            .set_collision_group("ghost");
        world
            .object_mut(b)
            .expect("spawned")
            .exclude_collisions_with("ghost");

        CollisionDispatcher::new().dispatch(&mut world, &[a, b]);

        assert!(world.object(a).expect("spawned").collidable().peers().is_empty());
    }

    #[test]
    fn stale_handles_are_skipped() {
        let mut world = World::new();
        let a = boxed(&mut world, Vec2::new(5.0, 5.0));
        let b = boxed(&mut world, Vec2::new(6.0, 5.0));
        let c = boxed(&mut world, Vec2::new(7.0, 5.0));
        assert!(world.destroy(b));

        CollisionDispatcher::new().dispatch(&mut world, &[a, b, c]);

        assert_eq!(world.object(a).expect("spawned").collidable().peers(), &[c]);
        assert_eq!(world.object(c).expect("spawned").collidable().peers(), &[a]);
    }
}
