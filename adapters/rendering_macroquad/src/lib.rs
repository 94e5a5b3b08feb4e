#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for tessera.
//!
//! Macroquad's audio stack needs native ALSA development libraries, so the
//! dependency is declared without default features. Sound stays behind the
//! framework's audio facade.
//!
//! Macroquad owns the event loop: [`MacroquadBackend::run`] opens the window
//! and calls the frame closure once per presented frame, while
//! [`MacroquadTarget`] turns macroquad's global drawing and input state into
//! the [`RenderTarget`] contract the engine consumes.

mod input;

use std::{
    collections::VecDeque,
    sync::mpsc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use glam::Vec2;
use macroquad::{
    camera::{set_camera, Camera2D},
    input::{
        get_char_pressed, is_key_pressed, is_key_released, is_mouse_button_pressed,
        is_mouse_button_released, is_quit_requested, mouse_position, mouse_wheel, prevent_quit,
    },
    math::vec2,
    window::{clear_background, next_frame, screen_height, screen_width},
};
use tessera_core::{Colour, Rect, SystemEvent};
use tessera_rendering::{DrawCommand, RenderTarget, RenderingBackend, WindowConfig};

use crate::input::{pixel, wheel_events, BUTTON_MAP, KEY_MAP};

/// Render target drawing through macroquad's immediate-mode API.
///
/// Must only be drawn to or polled from inside the closure run by
/// [`MacroquadBackend`]; macroquad has no graphics context before that.
#[derive(Debug)]
pub struct MacroquadTarget {
    size: Vec2,
    open: bool,
    sampled: bool,
    cursor: Option<(i32, i32)>,
    events: VecDeque<SystemEvent>,
}

impl MacroquadTarget {
    /// Creates a target for a window of the given size in pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Vec2::new(width as f32, height as f32),
            open: true,
            sampled: false,
            cursor: None,
            events: VecDeque::new(),
        }
    }

    /// Creates a target matching `window`.
    #[must_use]
    pub fn from_config(window: &WindowConfig) -> Self {
        Self::new(window.width, window.height)
    }

    fn sample_input(&mut self) {
        if is_quit_requested() {
            self.events.push_back(SystemEvent::Closed);
        }

        let (width, height) = (screen_width(), screen_height());
        if (width, height) != (self.size.x, self.size.y) {
            self.size = Vec2::new(width, height);
            self.events.push_back(SystemEvent::Resized {
                width: width.max(0.0) as u32,
                height: height.max(0.0) as u32,
            });
        }

        while let Some(character) = get_char_pressed() {
            self.events.push_back(SystemEvent::TextEntered { character });
        }

        for (code, key) in KEY_MAP {
            if is_key_pressed(code) {
                self.events.push_back(SystemEvent::KeyPressed { key });
            }
            if is_key_released(code) {
                self.events.push_back(SystemEvent::KeyReleased { key });
            }
        }

        let (x, y) = pixel(mouse_position());
        match self.cursor {
            None => self.events.push_back(SystemEvent::MouseEntered),
            Some(previous) if previous != (x, y) => {
                self.events.push_back(SystemEvent::MouseMoved { x, y });
            }
            Some(_) => {}
        }
        self.cursor = Some((x, y));

        for (code, button) in BUTTON_MAP {
            if is_mouse_button_pressed(code) {
                self.events
                    .push_back(SystemEvent::MouseButtonPressed { button, x, y });
            }
            if is_mouse_button_released(code) {
                self.events
                    .push_back(SystemEvent::MouseButtonReleased { button, x, y });
            }
        }
        self.events.extend(wheel_events(mouse_wheel(), (x, y)));
    }
}

impl RenderTarget for MacroquadTarget {
    fn clear(&mut self, colour: Colour) {
        clear_background(to_macroquad_color(colour));
    }

    fn draw(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Rect {
                bounds,
                fill,
                outline,
            } => {
                macroquad::shapes::draw_rectangle(
                    bounds.left,
                    bounds.top,
                    bounds.width,
                    bounds.height,
                    to_macroquad_color(*fill),
                );
                if let Some((colour, thickness)) = outline {
                    macroquad::shapes::draw_rectangle_lines(
                        bounds.left,
                        bounds.top,
                        bounds.width,
                        bounds.height,
                        *thickness,
                        to_macroquad_color(*colour),
                    );
                }
            }
            DrawCommand::Circle {
                centre,
                radius,
                fill,
            } => {
                macroquad::shapes::draw_circle(centre.x, centre.y, *radius, to_macroquad_color(*fill));
            }
            DrawCommand::Line {
                from,
                to,
                thickness,
                colour,
            } => {
                macroquad::shapes::draw_line(
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    *thickness,
                    to_macroquad_color(*colour),
                );
            }
            DrawCommand::Text {
                text,
                position,
                size,
                colour,
            } => {
                // macroquad places text on its baseline
                let _ = macroquad::text::draw_text(
                    text,
                    position.x,
                    position.y + size,
                    *size,
                    to_macroquad_color(*colour),
                );
            }
        }
    }

    fn display(&mut self) {
        self.sampled = false;
    }

    fn poll_event(&mut self) -> Option<SystemEvent> {
        if !self.sampled {
            self.sampled = true;
            self.sample_input();
        }
        self.events.pop_front()
    }

    fn set_view(&mut self, view: Rect) {
        set_camera(&view_camera(view));
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// Camera showing `view` across the whole window, y pointing down.
fn view_camera(view: Rect) -> Camera2D {
    let centre = view.centre();
    let width = view.width.max(f32::EPSILON);
    let height = view.height.max(f32::EPSILON);
    Camera2D {
        target: vec2(centre.x, centre.y),
        zoom: vec2(2.0 / width, -2.0 / height),
        ..Camera2D::default()
    }
}

fn to_macroquad_color(colour: Colour) -> macroquad::color::Color {
    macroquad::color::Color::from_rgba(colour.red, colour.green, colour.blue, colour.alpha)
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that derives the swap interval from the window
    /// configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the
    /// platform, overriding the window's v-sync flag.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, window: WindowConfig, mut frame: F) -> Result<()>
    where
        F: FnMut() -> Result<bool> + 'static,
    {
        let mut config = macroquad::window::Conf {
            window_title: window.title.clone(),
            window_width: i32::try_from(window.width).context("window width out of range")?,
            window_height: i32::try_from(window.height).context("window height out of range")?,
            fullscreen: window.fullscreen,
            ..macroquad::window::Conf::default()
        };
        config.platform.swap_interval = self
            .swap_interval
            .or(Some(if window.vsync { 1 } else { 0 }));

        let pacing = (!window.vsync && window.fps_limit > 0)
            .then(|| Duration::from_secs_f64(1.0 / f64::from(window.fps_limit)));
        let (failure_sender, failure_receiver) = mpsc::channel::<anyhow::Error>();
        log::info!(
            "opening {}x{} window '{}'",
            window.width,
            window.height,
            window.title
        );

        macroquad::Window::from_config(config, async move {
            prevent_quit();
            loop {
                let started = Instant::now();
                match frame() {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(error) => {
                        let _ = failure_sender.send(error);
                        break;
                    }
                }
                if let Some(budget) = pacing {
                    if let Some(remaining) = budget.checked_sub(started.elapsed()) {
                        std::thread::sleep(remaining);
                    }
                }
                next_frame().await;
            }
        });

        match failure_receiver.try_recv() {
            Ok(error) => Err(error.context("frame failed")),
            Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colours_keep_their_channels() {
        let colour = to_macroquad_color(Colour::rgba(255, 0, 51, 0));

        assert_eq!(colour.r, 1.0);
        assert_eq!(colour.g, 0.0);
        assert!((colour.b - 0.2).abs() < 1e-6);
        assert_eq!(colour.a, 0.0);
    }

    #[test]
    fn view_camera_centres_on_the_view() {
        let camera = view_camera(Rect::new(10.0, 20.0, 200.0, 100.0));

        assert_eq!(camera.target, vec2(110.0, 70.0));
        assert_eq!(camera.zoom, vec2(0.01, -0.02));
    }

    #[test]
    fn targets_start_open_with_the_configured_size() {
        let mut target = MacroquadTarget::from_config(&WindowConfig {
            width: 320,
            height: 200,
            ..WindowConfig::default()
        });

        assert_eq!(target.size(), Vec2::new(320.0, 200.0));
        assert!(target.is_open());
        target.close();
        assert!(!target.is_open());
    }
}
