//! Tile matrices that host grid objects.

use tessera_core::{Colour, Direction, Error, Index, Object, ObjectId, Rect, Result, Vec2};

use crate::ObjectHandle;

/// Single cell of a [`Grid`].
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    /// Row/column of the tile, `(-1, -1)` for the sentinel tile.
    pub index: Index,
    /// Top-left corner in world units.
    pub position: Vec2,
    /// Width and height in world units.
    pub size: Vec2,
    /// Character the tile was created from.
    pub id: char,
    /// Collidable tiles block grid movers.
    pub collidable: bool,
    /// Colour used when drawing the tile.
    pub fill_colour: Colour,
    /// Hidden tiles are not drawn.
    pub visible: bool,
}

impl Tile {
    fn sentinel() -> Self {
        Self {
            index: Index::INVALID,
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            id: '\0',
            collidable: false,
            fill_colour: Colour::TRANSPARENT,
            visible: false,
        }
    }

    /// Reports whether this is the "no tile" sentinel.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.index.is_invalid()
    }

    /// World-space centre of the tile.
    #[must_use]
    pub fn centre(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    /// World-space bounds of the tile.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    /// Reports whether `point` lies inside the tile.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        !self.is_sentinel() && self.bounds().contains(point)
    }
}

/// Rectangular matrix of tiles plus the objects placed on it.
///
/// Tile `(row, col)` sits at
/// `position + (col * (width + spacing) + spacing, row * (height + spacing) + spacing)`.
/// Children are tracked together with the tile they occupy; objects are
/// placed and removed through [`crate::World`] so both sides of the
/// membership stay in sync.
#[derive(Debug)]
pub struct Grid {
    object: Object,
    rows: i32,
    cols: i32,
    position: Vec2,
    tile_size: Vec2,
    spacing: f32,
    tiles: Vec<Tile>,
    sentinel: Tile,
    children: Vec<(ObjectHandle, Index)>,
    visible: bool,
    walkable_colour: Colour,
    collidable_colour: Colour,
}

impl Grid {
    /// Creates a `rows` by `cols` grid where every tile carries `fill_id`.
    #[must_use]
    pub fn new(rows: usize, cols: usize, tile_size: Vec2, fill_id: char) -> Self {
        let map = vec![vec![fill_id; cols]; rows];
        Self::build(&map, tile_size)
    }

    /// Creates a grid from a character matrix, one tile per character.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the rows differ in length.
    pub fn from_map(map: &[Vec<char>], tile_size: Vec2) -> Result<Self> {
        if let Some(first) = map.first() {
            if let Some((row, _)) = map
                .iter()
                .enumerate()
                .find(|(_, line)| line.len() != first.len())
            {
                return Err(Error::invalid_argument(format!(
                    "grid row {row} has {} tiles, expected {}",
                    map[row].len(),
                    first.len()
                )));
            }
        }
        Ok(Self::build(map, tile_size))
    }

    fn build(map: &[Vec<char>], tile_size: Vec2) -> Self {
        let rows = i32::try_from(map.len()).unwrap_or(i32::MAX);
        let cols = map
            .first()
            .map_or(0, |row| i32::try_from(row.len()).unwrap_or(i32::MAX));
        let walkable_colour = Colour::GREY;
        let tiles = map
            .iter()
            .enumerate()
            .flat_map(|(row, line)| {
                line.iter().enumerate().map(move |(col, id)| {
                    (
                        Index::new(
                            i32::try_from(row).unwrap_or(i32::MAX),
                            i32::try_from(col).unwrap_or(i32::MAX),
                        ),
                        *id,
                    )
                })
            })
            .map(|(index, id)| Tile {
                index,
                position: Vec2::ZERO,
                size: tile_size,
                id,
                collidable: false,
                fill_colour: walkable_colour,
                visible: true,
            })
            .collect();

        let mut grid = Self {
            object: Object::with_tag("Grid"),
            rows,
            cols,
            position: Vec2::ZERO,
            tile_size,
            spacing: 0.0,
            tiles,
            sentinel: Tile::sentinel(),
            children: Vec::new(),
            visible: true,
            walkable_colour,
            collidable_colour: Colour::DARK_GREY,
        };
        grid.layout();
        grid
    }

    /// Builder setting the gap between adjacent tiles.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing.max(0.0);
        self.layout();
        self
    }

    /// Builder setting the world position of the top-left corner.
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self.layout();
        self
    }

    /// Builder setting the colours of walkable and collidable tiles.
    #[must_use]
    pub fn with_colours(mut self, walkable: Colour, collidable: Colour) -> Self {
        self.walkable_colour = walkable;
        self.collidable_colour = collidable;
        for tile in &mut self.tiles {
            tile.fill_colour = if tile.collidable { collidable } else { walkable };
        }
        self
    }

    fn layout(&mut self) {
        let step = self.tile_size + Vec2::splat(self.spacing);
        for tile in &mut self.tiles {
            tile.position = self.position
                + Vec2::new(
                    tile.index.col as f32 * step.x + self.spacing,
                    tile.index.row as f32 * step.y + self.spacing,
                );
        }
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.layout();
    }

    /// Underlying addressable object.
    #[must_use]
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// Identity of the grid.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        usize::try_from(self.rows).unwrap_or(0)
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        usize::try_from(self.cols).unwrap_or(0)
    }

    /// World position of the top-left corner.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Size of a single tile.
    #[must_use]
    pub fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    /// Gap between adjacent tiles.
    #[must_use]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Extent of the whole grid including spacing.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        let step = self.tile_size + Vec2::splat(self.spacing);
        Vec2::new(
            self.cols as f32 * step.x + self.spacing,
            self.rows as f32 * step.y + self.spacing,
        )
    }

    /// Reports whether the grid is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the grid.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Reports whether `index` addresses a tile of this grid.
    #[must_use]
    pub fn is_index_valid(&self, index: Index) -> bool {
        (0..self.rows).contains(&index.row) && (0..self.cols).contains(&index.col)
    }

    fn offset(&self, index: Index) -> Option<usize> {
        if !self.is_index_valid(index) {
            return None;
        }
        usize::try_from(index.row * self.cols + index.col).ok()
    }

    /// Tile at `index`, or the sentinel tile when out of range.
    #[must_use]
    pub fn tile(&self, index: Index) -> &Tile {
        self.offset(index)
            .and_then(|offset| self.tiles.get(offset))
            .unwrap_or(&self.sentinel)
    }

    /// Mutable tile at `index`.
    pub fn tile_mut(&mut self, index: Index) -> Option<&mut Tile> {
        let offset = self.offset(index)?;
        self.tiles.get_mut(offset)
    }

    /// Tile containing the world-space `point`, or the sentinel tile.
    #[must_use]
    pub fn tile_at(&self, point: Vec2) -> &Tile {
        let step = self.tile_size + Vec2::splat(self.spacing);
        if step.x <= 0.0 || step.y <= 0.0 {
            return &self.sentinel;
        }
        let local = point - self.position - Vec2::splat(self.spacing);
        let candidate = Index::new(
            (local.y / step.y).floor() as i32,
            (local.x / step.x).floor() as i32,
        );
        let tile = self.tile(candidate);
        if tile.contains(point) {
            tile
        } else {
            &self.sentinel
        }
    }

    /// Tile one step away from `index` in `direction`.
    #[must_use]
    pub fn neighbour(&self, index: Index, direction: Direction) -> &Tile {
        self.tile(index.neighbour(direction))
    }

    /// Tile above `index`.
    #[must_use]
    pub fn tile_above(&self, index: Index) -> &Tile {
        self.neighbour(index, Direction::Up)
    }

    /// Tile below `index`.
    #[must_use]
    pub fn tile_below(&self, index: Index) -> &Tile {
        self.neighbour(index, Direction::Down)
    }

    /// Tile left of `index`.
    #[must_use]
    pub fn tile_left(&self, index: Index) -> &Tile {
        self.neighbour(index, Direction::Left)
    }

    /// Tile right of `index`.
    #[must_use]
    pub fn tile_right(&self, index: Index) -> &Tile {
        self.neighbour(index, Direction::Right)
    }

    /// In-range tiles around `index`, cardinal neighbours first.
    #[must_use]
    pub fn adjacent_tiles(&self, index: Index, include_diagonals: bool) -> Vec<&Tile> {
        let directions: &[Direction] = if include_diagonals {
            &Direction::ALL
        } else {
            &Direction::CARDINAL
        };
        directions
            .iter()
            .map(|direction| self.neighbour(index, *direction))
            .filter(|tile| !tile.is_sentinel())
            .collect()
    }

    /// Marks a single tile as collidable or walkable.
    pub fn set_collidable(&mut self, index: Index, collidable: bool) -> bool {
        let (walkable, blocked) = (self.walkable_colour, self.collidable_colour);
        match self.tile_mut(index) {
            Some(tile) => {
                apply_collidable(tile, collidable, walkable, blocked);
                true
            }
            None => false,
        }
    }

    /// Marks every tile whose id is `id`.
    pub fn set_collidable_by_id(&mut self, id: char, collidable: bool) {
        self.set_collidable_where(|tile| tile.id == id, collidable);
    }

    /// Marks every tile whose id is not `id`.
    pub fn set_collidable_except_id(&mut self, id: char, collidable: bool) {
        self.set_collidable_where(|tile| tile.id != id, collidable);
    }

    /// Marks every tile in the inclusive rectangle spanned by `start` and `end`.
    pub fn set_collidable_range(&mut self, start: Index, end: Index, collidable: bool) {
        let (low, high) = ordered(start, end);
        self.set_collidable_where(
            |tile| {
                (low.row..=high.row).contains(&tile.index.row)
                    && (low.col..=high.col).contains(&tile.index.col)
            },
            collidable,
        );
    }

    fn set_collidable_where<P: Fn(&Tile) -> bool>(&mut self, predicate: P, collidable: bool) {
        let (walkable, blocked) = (self.walkable_colour, self.collidable_colour);
        for tile in self.tiles.iter_mut().filter(|tile| predicate(tile)) {
            apply_collidable(tile, collidable, walkable, blocked);
        }
    }

    /// Visits every tile in row-major order.
    pub fn for_each_tile<F: FnMut(&Tile)>(&self, mut visit: F) {
        for tile in &self.tiles {
            visit(tile);
        }
    }

    /// Visits the tiles of the inclusive rectangle spanned by `start` and
    /// `end`, in row-major order.
    pub fn for_each_tile_in_range<F: FnMut(&Tile)>(&self, start: Index, end: Index, mut visit: F) {
        let (low, high) = ordered(start, end);
        for row in low.row..=high.row {
            for col in low.col..=high.col {
                let tile = self.tile(Index::new(row, col));
                if !tile.is_sentinel() {
                    visit(tile);
                }
            }
        }
    }

    /// Children and the tiles they occupy, in insertion order.
    #[must_use]
    pub fn children(&self) -> &[(ObjectHandle, Index)] {
        &self.children
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Reports whether `child` belongs to the grid.
    #[must_use]
    pub fn has_child(&self, child: ObjectHandle) -> bool {
        self.child_tile(child).is_some()
    }

    /// Tile index recorded for `child`.
    #[must_use]
    pub fn child_tile(&self, child: ObjectHandle) -> Option<Index> {
        self.children
            .iter()
            .find(|(handle, _)| *handle == child)
            .map(|(_, index)| *index)
    }

    /// Children recorded in the tile at `index`, in insertion order.
    #[must_use]
    pub fn children_in_tile(&self, index: Index) -> Vec<ObjectHandle> {
        self.children
            .iter()
            .filter(|(_, tile)| *tile == index)
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// Visits every child with its tile.
    pub fn for_each_child<F: FnMut(ObjectHandle, Index)>(&self, mut visit: F) {
        for (handle, index) in &self.children {
            visit(*handle, *index);
        }
    }

    /// Visits the children of the tile at `index`.
    pub fn for_each_child_in_tile<F: FnMut(ObjectHandle)>(&self, index: Index, mut visit: F) {
        for (handle, tile) in &self.children {
            if *tile == index {
                visit(*handle);
            }
        }
    }

    pub(crate) fn insert_child(&mut self, child: ObjectHandle, index: Index) -> bool {
        if self.has_child(child) {
            return false;
        }
        self.children.push((child, index));
        true
    }

    pub(crate) fn remove_child(&mut self, child: ObjectHandle) -> bool {
        let before = self.children.len();
        self.children.retain(|(handle, _)| *handle != child);
        before != self.children.len()
    }

    pub(crate) fn move_child(&mut self, child: ObjectHandle, index: Index) -> bool {
        match self
            .children
            .iter_mut()
            .find(|(handle, _)| *handle == child)
        {
            Some(entry) => {
                entry.1 = index;
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_children(&mut self) -> Vec<(ObjectHandle, Index)> {
        std::mem::take(&mut self.children)
    }
}

fn apply_collidable(tile: &mut Tile, collidable: bool, walkable: Colour, blocked: Colour) {
    tile.collidable = collidable;
    tile.fill_colour = if collidable { blocked } else { walkable };
}

fn ordered(start: Index, end: Index) -> (Index, Index) {
    (
        Index::new(start.row.min(end.row), start.col.min(end.col)),
        Index::new(start.row.max(end.row), start.col.max(end.col)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_positions_account_for_spacing() {
        let grid = Grid::new(2, 3, Vec2::new(32.0, 16.0), '.')
            .with_spacing(2.0)
            .with_position(Vec2::new(100.0, 50.0));

        let tile = grid.tile(Index::new(1, 2));
        assert_eq!(tile.position, Vec2::new(100.0 + 2.0 * 34.0 + 2.0, 50.0 + 18.0 + 2.0));
        assert_eq!(grid.tile_at(tile.centre()).index, Index::new(1, 2));
        assert!(grid.tile_at(Vec2::new(100.5, 50.5)).is_sentinel());
    }

    #[test]
    fn out_of_range_lookups_return_the_sentinel() {
        let grid = Grid::new(3, 3, Vec2::splat(32.0), '.');
        assert!(grid.tile(Index::new(3, 0)).is_sentinel());
        assert!(grid.tile(Index::new(0, -1)).is_sentinel());
        assert!(grid.tile_above(Index::new(0, 0)).is_sentinel());
        assert_eq!(grid.tile_right(Index::new(0, 0)).index, Index::new(0, 1));
        assert_eq!(grid.adjacent_tiles(Index::new(0, 0), true).len(), 3);
        assert_eq!(grid.adjacent_tiles(Index::new(1, 1), false).len(), 4);
    }

    #[test]
    fn collidable_helpers_select_tiles() {
        let map = vec![vec!['#', '.', '#'], vec!['.', '.', '.']];
        let mut grid = Grid::from_map(&map, Vec2::splat(10.0)).expect("rectangular map");

        grid.set_collidable_by_id('#', true);
        assert!(grid.tile(Index::new(0, 0)).collidable);
        assert!(!grid.tile(Index::new(0, 1)).collidable);
        assert_eq!(grid.tile(Index::new(0, 2)).fill_colour, Colour::DARK_GREY);

        grid.set_collidable_except_id('#', true);
        grid.set_collidable_range(Index::new(1, 2), Index::new(0, 1), false);
        assert!(grid.tile(Index::new(1, 0)).collidable);
        assert!(!grid.tile(Index::new(1, 1)).collidable);
        assert!(!grid.tile(Index::new(0, 2)).collidable);
    }

    #[test]
    fn ragged_maps_are_rejected() {
        let map = vec![vec!['.', '.'], vec!['.']];
        assert!(matches!(
            Grid::from_map(&map, Vec2::ONE),
            Err(Error::InvalidArgument(_))
        ));
    }
}
