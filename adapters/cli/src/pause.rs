//! Pause menu pushed over the maze.

use std::rc::Rc;

use glam::Vec2;
use tessera_core::{Colour, Key, Rect, Result, SystemEvent};
use tessera_rendering::{DrawCommand, RenderTarget};
use tessera_scene::{SceneBehaviour, SceneState};

use crate::maze::Progress;

/// Shows the score until P or Escape is pressed again.
pub(crate) struct PauseMenu {
    progress: Rc<Progress>,
}

impl PauseMenu {
    pub(crate) fn new(progress: Rc<Progress>) -> Self {
        Self { progress }
    }
}

impl SceneBehaviour for PauseMenu {
    fn on_start(&mut self, _scene: &mut SceneState) -> Result<()> {
        log::info!("paused at score {}", self.progress.score.get());
        Ok(())
    }

    fn on_handle_event(&mut self, scene: &mut SceneState, event: &SystemEvent) -> Result<()> {
        match event {
            SystemEvent::KeyPressed {
                key: Key::P | Key::Escape,
            } => scene.engine()?.pop_scene(),
            SystemEvent::KeyPressed { key: Key::Q } => scene.engine()?.quit(),
            _ => {}
        }
        Ok(())
    }

    fn on_post_render(
        &mut self,
        scene: &mut SceneState,
        target: &mut dyn RenderTarget,
    ) -> Result<()> {
        let size = scene.window_size()?;
        target.set_view(Rect::new(0.0, 0.0, size.x, size.y));
        target.draw(&DrawCommand::Rect {
            bounds: Rect::new(0.0, 0.0, size.x, size.y),
            fill: Colour::rgba(0, 0, 0, 160),
            outline: None,
        });
        let centre = size / 2.0;
        target.draw(&DrawCommand::Text {
            text: "paused".to_owned(),
            position: centre - Vec2::new(48.0, 32.0),
            size: 32.0,
            colour: Colour::WHITE,
        });
        target.draw(&DrawCommand::Text {
            text: format!(
                "score {}  coins left {}",
                self.progress.score.get(),
                self.progress.coins_left.get()
            ),
            position: centre + Vec2::new(-96.0, 8.0),
            size: 16.0,
            colour: Colour::GREY,
        });
        Ok(())
    }
}
