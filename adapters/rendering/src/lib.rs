#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for tessera adapters.
//!
//! The framework never rasterizes anything itself. Scenes describe a frame as
//! a sequence of [`DrawCommand`]s sent to a [`RenderTarget`], ordered through
//! [`RenderLayerContainer`]s. Adapters implement the target on top of a real
//! windowing library and drive frames through [`RenderingBackend`].

mod camera;
mod headless;
mod layer;

pub use camera::Camera;
pub use headless::{HeadlessBackend, HeadlessTarget};
pub use layer::{DrawableId, RenderLayer, RenderLayerContainer};

use anyhow::Result as AnyResult;
use glam::Vec2;
use tessera_core::{Colour, Rect, SystemEvent};

/// Primitive drawing request understood by every render target.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Axis-aligned rectangle.
    Rect {
        /// Rectangle in world coordinates.
        bounds: Rect,
        /// Fill colour.
        fill: Colour,
        /// Optional outline colour and thickness.
        outline: Option<(Colour, f32)>,
    },
    /// Filled circle.
    Circle {
        /// Centre in world coordinates.
        centre: Vec2,
        /// Radius in world units.
        radius: f32,
        /// Fill colour.
        fill: Colour,
    },
    /// Straight line segment.
    Line {
        /// Start point.
        from: Vec2,
        /// End point.
        to: Vec2,
        /// Thickness in world units.
        thickness: f32,
        /// Line colour.
        colour: Colour,
    },
    /// Single line of text whose top-left corner is at `position`.
    Text {
        /// Text to draw.
        text: String,
        /// Top-left corner in world coordinates.
        position: Vec2,
        /// Character height in world units.
        size: f32,
        /// Text colour.
        colour: Colour,
    },
}

/// Surface frames are composed on.
///
/// Mirrors the handful of primitives the engine needs from a window: clear,
/// draw, present, pull platform events and set the visible region.
pub trait RenderTarget {
    /// Fills the whole surface with `colour`.
    fn clear(&mut self, colour: Colour);

    /// Queues a drawing request for the current frame.
    fn draw(&mut self, command: &DrawCommand);

    /// Presents the current frame.
    fn display(&mut self);

    /// Next pending platform event, if any.
    fn poll_event(&mut self) -> Option<SystemEvent>;

    /// Selects the world rectangle mapped onto the surface.
    fn set_view(&mut self, view: Rect);

    /// Surface size in pixels.
    fn size(&self) -> Vec2;

    /// Reports whether the surface can still present frames.
    fn is_open(&self) -> bool;

    /// Closes the surface.
    fn close(&mut self);
}

/// Anything that can describe itself to a [`RenderTarget`].
pub trait Drawable {
    /// Issues the draw commands for this drawable.
    fn draw(&self, target: &mut dyn RenderTarget);

    /// Reports whether the drawable should be drawn at all.
    fn is_visible(&self) -> bool {
        true
    }
}

impl<F> Drawable for F
where
    F: Fn(&mut dyn RenderTarget),
{
    fn draw(&self, target: &mut dyn RenderTarget) {
        self(target);
    }
}

impl Drawable for DrawCommand {
    fn draw(&self, target: &mut dyn RenderTarget) {
        target.draw(self);
    }
}

/// Black-box widget layer drawn on top of a scene.
pub trait GuiContainer {
    /// Offers an event to the widgets. Returns `true` when a widget consumed
    /// it.
    fn handle_event(&mut self, event: &SystemEvent) -> bool;

    /// Advances widget animations.
    fn update(&mut self, dt: f32);

    /// Draws the widgets.
    fn draw(&self, target: &mut dyn RenderTarget);
}

/// Window parameters handed to a backend before its first frame.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    /// Title of the window.
    pub title: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Whether the window covers the whole screen.
    pub fullscreen: bool,
    /// Whether presentation waits for the display refresh.
    pub vsync: bool,
    /// Frame rate cap; zero disables it.
    pub fps_limit: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Untitled".to_owned(),
            width: 600,
            height: 600,
            fullscreen: false,
            vsync: false,
            fps_limit: 60,
        }
    }
}

/// Rendering backend owning the platform window and its frame pacing.
pub trait RenderingBackend {
    /// Runs the backend until `frame` returns `Ok(false)` or an error, or the
    /// window is closed.
    ///
    /// `frame` is invoked once per presented frame and is expected to run one
    /// full engine iteration.
    fn run<F>(self, window: WindowConfig, frame: F) -> AnyResult<()>
    where
        F: FnMut() -> AnyResult<bool> + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_and_commands_are_drawables() {
        let mut target = HeadlessTarget::new(Vec2::new(100.0, 100.0));
        let command = DrawCommand::Circle {
            centre: Vec2::ZERO,
            radius: 2.0,
            fill: Colour::RED,
        };
        let closure = |target: &mut dyn RenderTarget| {
            target.draw(&DrawCommand::Line {
                from: Vec2::ZERO,
                to: Vec2::ONE,
                thickness: 1.0,
                colour: Colour::WHITE,
            });
        };

        command.draw(&mut target);
        closure.draw(&mut target);
        target.display();

        assert_eq!(target.last_frame().len(), 2);
        assert_eq!(target.last_frame()[0], command);
    }

    #[test]
    fn default_window_matches_engine_defaults() {
        let window = WindowConfig::default();

        assert_eq!(window.title, "Untitled");
        assert_eq!((window.width, window.height), (600, 600));
        assert_eq!(window.fps_limit, 60);
    }
}
