//! Drawing of grids and objects.

use tessera_core::Colour;
use tessera_rendering::{DrawCommand, RenderTarget};
use tessera_world::{Grid, GridObject, World};

const TILE_OUTLINE: Colour = Colour::DARK_GREY;

/// Draws every visible grid, then every visible active object.
pub fn draw_world(world: &World, target: &mut dyn RenderTarget) {
    for (_, grid) in world.grids() {
        draw_grid(grid, target);
    }
    for (_, object) in world.objects() {
        draw_object(object, target);
    }
}

/// Draws the visible tiles of a grid.
pub fn draw_grid(grid: &Grid, target: &mut dyn RenderTarget) {
    if !grid.is_visible() {
        return;
    }
    grid.for_each_tile(|tile| {
        if tile.visible {
            target.draw(&DrawCommand::Rect {
                bounds: tile.bounds(),
                fill: tile.fill_colour,
                outline: Some((TILE_OUTLINE, 1.0)),
            });
        }
    });
}

/// Draws an object as a filled rectangle over its bounding box.
pub fn draw_object(object: &GridObject, target: &mut dyn RenderTarget) {
    if !object.is_visible() || !object.is_active() {
        return;
    }
    target.draw(&DrawCommand::Rect {
        bounds: object.bounding_box(),
        fill: object.colour(),
        outline: None,
    });
}
