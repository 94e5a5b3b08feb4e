//! Payloads broadcast by framework objects.

use glam::Vec2;

use crate::{Direction, Index, ObjectId, Property};

/// Closed set of payloads carried by framework events.
///
/// The event *name* selects the listeners, the payload carries the data. The
/// [`names`] module lists every name the framework emits.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A property of the emitting object changed.
    PropertyChanged(Property),
    /// The emitting object is being destroyed.
    Destroyed {
        /// Identifier of the object being destroyed.
        id: ObjectId,
    },
    /// An object was placed into a grid.
    GridEntered {
        /// Identifier of the grid.
        grid: ObjectId,
        /// Tile the object was placed on.
        index: Index,
    },
    /// An object was removed from a grid.
    GridExited {
        /// Identifier of the grid.
        grid: ObjectId,
    },
    /// A grid mover accepted a new direction.
    DirectionChanged {
        /// The requested direction.
        direction: Direction,
    },
    /// A grid mover started moving its target between two tiles.
    MoveBegan {
        /// Tile the target is leaving.
        from: Index,
        /// Tile the target is heading to.
        to: Index,
    },
    /// A grid mover finished moving its target onto a tile.
    MoveEnded {
        /// Tile the target arrived at.
        index: Index,
    },
    /// Emitted right before a moving target is translated.
    PreMove {
        /// Position before the translation.
        position: Vec2,
    },
    /// Emitted right after a moving target was translated.
    PostMove {
        /// Position after the translation.
        position: Vec2,
    },
    /// A move was blocked by a collidable tile.
    TileCollision {
        /// Blocking tile.
        index: Index,
    },
    /// A move was blocked by the edge of the grid.
    BorderCollision {
        /// Index outside the grid the target attempted to enter.
        index: Index,
    },
    /// A moving object met another object on the grid.
    ObjectCollision {
        /// Object that was moving.
        mover: ObjectId,
        /// Object that was met.
        obstacle: ObjectId,
    },
    /// A grid mover rolled its target tile back to the current tile.
    TargetTileReset {
        /// Tile the target tile was reset to.
        index: Index,
    },
    /// A grid mover was attached to a different target.
    TargetChanged {
        /// Previously controlled object.
        previous: Option<ObjectId>,
        /// Newly controlled object.
        current: Option<ObjectId>,
    },
    /// A path-following mover reached its destination.
    DestinationReached {
        /// Tile that was reached.
        index: Index,
    },
    /// A path-following mover computed a new path.
    PathChanged {
        /// Number of tiles on the new path.
        length: usize,
    },
    /// Two collidables started overlapping.
    OverlapStarted {
        /// The other collidable.
        other: ObjectId,
        /// Intersection-over-union of the two bounding boxes.
        iou: f32,
    },
    /// Two collidables kept overlapping.
    OverlapStayed {
        /// The other collidable.
        other: ObjectId,
        /// Intersection-over-union of the two bounding boxes.
        iou: f32,
    },
    /// Two collidables stopped overlapping.
    OverlapEnded {
        /// The other collidable.
        other: ObjectId,
    },
    /// The engine finished initialization.
    Initialized,
    /// The engine entered its main loop.
    Started,
    /// A scene became the active scene.
    SceneActivated {
        /// Identifier of the scene.
        scene: ObjectId,
    },
    /// A frame started.
    FrameStarted {
        /// Zero-based frame counter.
        frame: u64,
    },
    /// A frame ended.
    FrameEnded {
        /// Zero-based frame counter.
        frame: u64,
    },
    /// The engine paused its updates.
    Paused,
    /// The engine resumed its updates.
    Resumed,
    /// The engine shut down.
    Shutdown,
}

/// Names of the events emitted by the framework.
pub mod names {
    /// Any property of an object changed.
    pub const PROPERTY_CHANGE: &str = "Object_propertyChange";
    /// An object is being destroyed.
    pub const DESTRUCTION: &str = "Object_destruction";

    /// The engine finished initialization.
    pub const INITIALIZE: &str = "initialize";
    /// The engine entered its main loop.
    pub const START: &str = "start";
    /// A scene became active.
    pub const SCENE_ACTIVATE: &str = "sceneActivate";
    /// A frame started.
    pub const FRAME_START: &str = "frameStart";
    /// A frame ended.
    pub const FRAME_END: &str = "frameEnd";
    /// The engine paused.
    pub const PAUSE: &str = "pause";
    /// The engine resumed.
    pub const RESUME: &str = "resume";
    /// The engine shut down.
    pub const SHUTDOWN: &str = "shutdown";

    /// Grid mover accepted a direction.
    pub const GRID_MOVER_DIRECTION_CHANGE: &str = "GridMover_directionChange";
    /// Grid mover started a move.
    pub const GRID_MOVER_MOVE_BEGIN: &str = "GridMover_moveBegin";
    /// Grid mover finished a move.
    pub const GRID_MOVER_MOVE_END: &str = "GridMover_moveEnd";
    /// Grid mover was blocked by a tile.
    pub const GRID_MOVER_TILE_COLLISION: &str = "GridMover_tileCollision";
    /// Grid mover was blocked by the grid border.
    pub const GRID_MOVER_BORDER_COLLISION: &str = "GridMover_borderCollision";
    /// Grid mover met another object.
    pub const GRID_MOVER_OBJECT_COLLISION: &str = "GridMover_objectCollision";
    /// Grid mover reset its target tile.
    pub const GRID_MOVER_TARGET_TILE_RESET: &str = "GridMover_targetTileReset";
    /// Grid mover changed target.
    pub const GRID_MOVER_TARGET_CHANGE: &str = "GridMover_targetChange";

    /// Object entered a grid.
    pub const GRID_OBJECT_GRID_ENTER: &str = "GridObject_gridEnter";
    /// Object left a grid.
    pub const GRID_OBJECT_GRID_EXIT: &str = "GridObject_gridExit";
    /// Object started a move.
    pub const GRID_OBJECT_MOVE_BEGIN: &str = "GridObject_moveBegin";
    /// Object finished a move.
    pub const GRID_OBJECT_MOVE_END: &str = "GridObject_moveEnd";
    /// Object is about to be translated.
    pub const GRID_OBJECT_PRE_MOVE: &str = "GridObject_preMove";
    /// Object was translated.
    pub const GRID_OBJECT_POST_MOVE: &str = "GridObject_postMove";
    /// Object was blocked by a tile.
    pub const GRID_OBJECT_TILE_COLLISION: &str = "GridObject_tileCollision";
    /// Object was blocked by the grid border.
    pub const GRID_OBJECT_BORDER_COLLISION: &str = "GridObject_borderCollision";
    /// Object met another object.
    pub const GRID_OBJECT_OBJECT_COLLISION: &str = "GridObject_objectCollision";

    /// Collidable started overlapping another one.
    pub const COLLIDABLE_OVERLAP_START: &str = "Collidable_overlapStart";
    /// Collidable kept overlapping another one.
    pub const COLLIDABLE_OVERLAP_STAY: &str = "Collidable_overlapStay";
    /// Collidable stopped overlapping another one.
    pub const COLLIDABLE_OVERLAP_END: &str = "Collidable_overlapEnd";

    /// Path-following mover reached its destination.
    pub const TARGET_GRID_MOVER_DESTINATION_REACHED: &str = "TargetGridMover_destinationReached";
    /// Path-following mover computed a new path.
    pub const TARGET_GRID_MOVER_PATH_CHANGE: &str = "TargetGridMover_pathChange";

    /// Name of the event emitted when the property `property` changes.
    #[must_use]
    pub fn property_change(property: &str) -> String {
        format!("Object_{property}Change")
    }
}
