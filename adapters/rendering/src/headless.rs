//! Window-less render target used by tests and batch runs.

use std::collections::VecDeque;

use anyhow::Result as AnyResult;
use glam::Vec2;
use tessera_core::{Colour, Rect, SystemEvent};

use crate::{DrawCommand, RenderTarget, RenderingBackend, WindowConfig};

/// Render target that records frames instead of presenting them.
///
/// Events pushed with [`HeadlessTarget::push_event`] are handed out by
/// [`RenderTarget::poll_event`] in FIFO order.
#[derive(Debug)]
pub struct HeadlessTarget {
    size: Vec2,
    view: Rect,
    clear_colour: Colour,
    pending: Vec<DrawCommand>,
    last_frame: Vec<DrawCommand>,
    frames: u64,
    events: VecDeque<SystemEvent>,
    open: bool,
}

impl HeadlessTarget {
    /// Creates an open target of `size` pixels.
    #[must_use]
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            view: Rect::new(0.0, 0.0, size.x, size.y),
            clear_colour: Colour::BLACK,
            pending: Vec::new(),
            last_frame: Vec::new(),
            frames: 0,
            events: VecDeque::new(),
            open: true,
        }
    }

    /// Queues a platform event.
    pub fn push_event(&mut self, event: SystemEvent) {
        self.events.push_back(event);
    }

    /// Commands of the last presented frame.
    #[must_use]
    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    /// Number of presented frames.
    #[must_use]
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Colour of the last clear.
    #[must_use]
    pub fn clear_colour(&self) -> Colour {
        self.clear_colour
    }

    /// Current view rectangle.
    #[must_use]
    pub fn view(&self) -> Rect {
        self.view
    }
}

impl RenderTarget for HeadlessTarget {
    fn clear(&mut self, colour: Colour) {
        self.clear_colour = colour;
        self.pending.clear();
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.pending.push(command.clone());
    }

    fn display(&mut self) {
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames += 1;
    }

    fn poll_event(&mut self) -> Option<SystemEvent> {
        self.events.pop_front()
    }

    fn set_view(&mut self, view: Rect) {
        self.view = view;
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

/// Backend that calls the frame closure in a tight loop.
///
/// A frame limit stops runaway loops in batch runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessBackend {
    max_frames: Option<u64>,
}

impl HeadlessBackend {
    /// Creates a backend without a frame limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops after `frames` frames even if the closure wants to continue.
    #[must_use]
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, window: WindowConfig, mut frame: F) -> AnyResult<()>
    where
        F: FnMut() -> AnyResult<bool> + 'static,
    {
        log::info!("running '{}' without a window", window.title);
        let mut count = 0_u64;
        while self.max_frames.map_or(true, |limit| count < limit) {
            count += 1;
            if !frame()? {
                break;
            }
        }
        log::debug!("headless backend stopped after {count} frames");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use tessera_core::Key;

    use super::*;

    #[test]
    fn events_come_out_in_push_order() {
        let mut target = HeadlessTarget::new(Vec2::splat(8.0));
        target.push_event(SystemEvent::KeyPressed { key: Key::A });
        target.push_event(SystemEvent::Closed);

        assert_eq!(target.poll_event(), Some(SystemEvent::KeyPressed { key: Key::A }));
        assert_eq!(target.poll_event(), Some(SystemEvent::Closed));
        assert_eq!(target.poll_event(), None);
    }

    #[test]
    fn backend_stops_when_the_frame_declines_or_the_limit_hits() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        HeadlessBackend::new()
            .run(WindowConfig::default(), move || {
                counter.set(counter.get() + 1);
                Ok(counter.get() < 3)
            })
            .expect("frames succeed");
        assert_eq!(calls.get(), 3);

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        HeadlessBackend::new()
            .with_max_frames(5)
            .run(WindowConfig::default(), move || {
                counter.set(counter.get() + 1);
                Ok(true)
            })
            .expect("frames succeed");
        assert_eq!(calls.get(), 5);
    }
}
