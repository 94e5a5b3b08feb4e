#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile graphs and path searches over grids.
//!
//! An [`AdjacencyList`] snapshots which tiles of a grid are walkable and how
//! they connect. Path finders run over that snapshot and return the tiles to
//! visit in order, excluding the starting tile.

use std::collections::{HashMap, HashSet, VecDeque};

use tessera_core::{Direction, Index};
use tessera_world::{GridHandle, ObjectHandle, World};

/// Options controlling which tiles and edges enter an [`AdjacencyList`].
#[derive(Clone, Debug, Default)]
pub struct AdjacencyOptions {
    /// Connects tiles diagonally as well as orthogonally.
    pub diagonal: bool,
    /// Treats tiles holding an active obstacle as unwalkable.
    pub avoid_obstacles: bool,
    /// Obstacles that never block, typically the object the path is
    /// computed for and the object it is chasing.
    pub ignore: Vec<ObjectHandle>,
}

/// Walkable tiles of a grid and their walkable neighbours.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyList {
    neighbours: HashMap<Index, Vec<Index>>,
}

impl AdjacencyList {
    /// Builds the graph of `grid` under `options`.
    ///
    /// Collidable tiles never enter the graph. Diagonal edges are only added
    /// when both orthogonal tiles they cut across are walkable, so paths never
    /// squeeze between two blocked corners.
    #[must_use]
    pub fn from_grid(world: &World, grid: GridHandle, options: &AdjacencyOptions) -> Self {
        let Some(tiles) = world.grid(grid) else {
            return Self::default();
        };

        let mut blocked: HashSet<Index> = HashSet::new();
        tiles.for_each_tile(|tile| {
            if tile.collidable {
                let _ = blocked.insert(tile.index);
            }
        });
        if options.avoid_obstacles {
            tiles.for_each_child(|child, index| {
                if options.ignore.contains(&child) {
                    return;
                }
                if world
                    .object(child)
                    .is_some_and(|object| object.is_obstacle() && object.is_active())
                {
                    let _ = blocked.insert(index);
                }
            });
        }

        let walkable = |index: Index| tiles.is_index_valid(index) && !blocked.contains(&index);
        let directions: &[Direction] = if options.diagonal {
            &Direction::ALL
        } else {
            &Direction::CARDINAL
        };

        let mut neighbours = HashMap::new();
        tiles.for_each_tile(|tile| {
            if !walkable(tile.index) {
                return;
            }
            let edges = directions
                .iter()
                .filter(|direction| {
                    let next = tile.index.neighbour(**direction);
                    if !walkable(next) {
                        return false;
                    }
                    if direction.is_diagonal() {
                        let delta = direction.delta();
                        let across_row = Index::new(tile.index.row, tile.index.col + delta.x);
                        let across_col = Index::new(tile.index.row + delta.y, tile.index.col);
                        return walkable(across_row) && walkable(across_col);
                    }
                    true
                })
                .map(|direction| tile.index.neighbour(*direction))
                .collect();
            let _ = neighbours.insert(tile.index, edges);
        });

        Self { neighbours }
    }

    /// Builds a graph from explicit edges. Edges are directed.
    #[must_use]
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (Index, Index)>,
    {
        let mut neighbours: HashMap<Index, Vec<Index>> = HashMap::new();
        for (from, to) in edges {
            neighbours.entry(from).or_default().push(to);
            let _ = neighbours.entry(to).or_default();
        }
        Self { neighbours }
    }

    /// Reports whether `index` is a walkable node.
    #[must_use]
    pub fn contains(&self, index: Index) -> bool {
        self.neighbours.contains_key(&index)
    }

    /// Walkable neighbours of `index`, in direction order.
    #[must_use]
    pub fn neighbours(&self, index: Index) -> &[Index] {
        self.neighbours.get(&index).map_or(&[], Vec::as_slice)
    }

    /// Number of walkable nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.neighbours.len()
    }
}

/// Search strategy producing a tile path through an [`AdjacencyList`].
pub trait PathFinderStrategy {
    /// Path from `source` to `destination`, excluding `source`.
    ///
    /// The path is empty when the destination is unreachable or equal to the
    /// source.
    fn find_path(&self, graph: &AdjacencyList, source: Index, destination: Index) -> Vec<Index>;
}

/// Breadth-first search; finds a path with the fewest steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct BfsPathFinder;

impl PathFinderStrategy for BfsPathFinder {
    fn find_path(&self, graph: &AdjacencyList, source: Index, destination: Index) -> Vec<Index> {
        if source == destination || !graph.contains(source) || !graph.contains(destination) {
            return Vec::new();
        }

        let mut parents: HashMap<Index, Index> = HashMap::new();
        let mut queue = VecDeque::new();
        let _ = parents.insert(source, source);
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            if current == destination {
                return backtrack(&parents, source, destination);
            }
            for next in graph.neighbours(current) {
                if parents.contains_key(next) {
                    continue;
                }
                let _ = parents.insert(*next, current);
                queue.push_back(*next);
            }
        }
        Vec::new()
    }
}

/// Depth-first search; finds some path, not necessarily a short one.
#[derive(Clone, Copy, Debug, Default)]
pub struct DfsPathFinder;

impl PathFinderStrategy for DfsPathFinder {
    fn find_path(&self, graph: &AdjacencyList, source: Index, destination: Index) -> Vec<Index> {
        if source == destination || !graph.contains(source) || !graph.contains(destination) {
            return Vec::new();
        }

        let mut parents: HashMap<Index, Index> = HashMap::new();
        let mut stack = vec![source];
        let _ = parents.insert(source, source);

        while let Some(current) = stack.pop() {
            if current == destination {
                return backtrack(&parents, source, destination);
            }
            for next in graph.neighbours(current).iter().rev() {
                if parents.contains_key(next) {
                    continue;
                }
                let _ = parents.insert(*next, current);
                stack.push(*next);
            }
        }
        Vec::new()
    }
}

fn backtrack(parents: &HashMap<Index, Index>, source: Index, destination: Index) -> Vec<Index> {
    let mut path = vec![destination];
    let mut current = destination;
    while let Some(parent) = parents.get(&current) {
        if *parent == source {
            break;
        }
        path.push(*parent);
        current = *parent;
    }
    path.reverse();
    path
}
