//! World-space view selection.

use glam::Vec2;
use tessera_core::{Error, Rect, Result};

/// Rectangle of the world shown on screen.
///
/// The camera stores a centre and the unzoomed view size. Zooming in by a
/// factor of two halves the visible width and height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    centre: Vec2,
    size: Vec2,
    zoom: f32,
}

impl Camera {
    /// Creates a camera showing `size` world units with the top-left corner
    /// at the origin.
    #[must_use]
    pub fn new(size: Vec2) -> Self {
        Self {
            centre: size / 2.0,
            size,
            zoom: 1.0,
        }
    }

    /// Centre of the view.
    #[must_use]
    pub fn centre(&self) -> Vec2 {
        self.centre
    }

    /// Moves the view so it is centred on `centre`.
    pub fn set_centre(&mut self, centre: Vec2) {
        self.centre = centre;
    }

    /// Moves the view by `offset`.
    pub fn move_by(&mut self, offset: Vec2) {
        self.centre += offset;
    }

    /// Current zoom factor; above one magnifies.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Sets the zoom factor.
    pub fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(Error::invalid_argument(format!(
                "camera zoom must be positive, got {zoom}"
            )));
        }
        self.zoom = zoom;
        Ok(())
    }

    /// Multiplies the zoom factor by `factor`.
    pub fn zoom_by(&mut self, factor: f32) -> Result<()> {
        self.set_zoom(self.zoom * factor)
    }

    /// Restores the unzoomed view of `size` world units at the origin.
    pub fn reset(&mut self, size: Vec2) {
        *self = Self::new(size);
    }

    /// Visible world rectangle.
    #[must_use]
    pub fn view(&self) -> Rect {
        Rect::from_centre(self.centre, self.size / self.zoom)
    }

    /// Converts a pixel position on a surface of `surface` pixels into
    /// world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, point: Vec2, surface: Vec2) -> Vec2 {
        let view = self.view();
        if surface.x <= 0.0 || surface.y <= 0.0 {
            return view.position();
        }
        view.position() + point / surface * view.size()
    }
}
