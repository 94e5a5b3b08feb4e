//! Ordered drawing layers.

use std::fmt;

use crate::{Drawable, RenderTarget};

/// Identifier returned when a drawable joins a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(u64);

struct Entry {
    id: DrawableId,
    order: i32,
    drawable: Box<dyn Drawable>,
}

/// Named group of drawables rendered together.
///
/// Drawables with a lower render order are drawn first. Drawables sharing a
/// render order keep the order in which they were added.
pub struct RenderLayer {
    name: String,
    index: i32,
    visible: bool,
    entries: Vec<Entry>,
}

impl fmt::Debug for RenderLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderLayer")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("visible", &self.visible)
            .field("drawables", &self.entries.len())
            .finish()
    }
}

impl RenderLayer {
    fn new(name: &str, index: i32) -> Self {
        Self {
            name: name.to_owned(),
            index,
            visible: true,
            entries: Vec::new(),
        }
    }

    /// Layer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the layer relative to its siblings.
    #[must_use]
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Reports whether the layer is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the whole layer.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Number of drawables on the layer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the layer has no drawables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, id: DrawableId, order: i32, drawable: Box<dyn Drawable>) {
        let position = self.entries.partition_point(|entry| entry.order <= order);
        self.entries.insert(
            position,
            Entry {
                id,
                order,
                drawable,
            },
        );
    }

    fn remove(&mut self, id: DrawableId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    fn draw(&self, target: &mut dyn RenderTarget) {
        if !self.visible {
            return;
        }
        for entry in &self.entries {
            if entry.drawable.is_visible() {
                entry.drawable.draw(target);
            }
        }
    }
}

/// Set of render layers drawn in ascending index order.
#[derive(Debug, Default)]
pub struct RenderLayerContainer {
    layers: Vec<RenderLayer>,
    next_id: u64,
}

impl RenderLayerContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a layer unless one with the same name exists.
    ///
    /// Returns `false` when the name is taken.
    pub fn create_layer(&mut self, name: &str, index: i32) -> bool {
        if self.layer(name).is_some() {
            return false;
        }
        let position = self.layers.partition_point(|layer| layer.index <= index);
        self.layers.insert(position, RenderLayer::new(name, index));
        true
    }

    /// Removes a layer and everything on it.
    pub fn remove_layer(&mut self, name: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.name != name);
        self.layers.len() != before
    }

    /// Looks up a layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&RenderLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Looks up a layer by name for modification.
    pub fn layer_mut(&mut self, name: &str) -> Option<&mut RenderLayer> {
        self.layers.iter_mut().find(|layer| layer.name == name)
    }

    /// Layers in draw order.
    pub fn layers(&self) -> impl Iterator<Item = &RenderLayer> {
        self.layers.iter()
    }

    /// Shows or hides a layer. Returns `false` when the layer is unknown.
    pub fn set_layer_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.layer_mut(name) {
            Some(layer) => {
                layer.set_visible(visible);
                true
            }
            None => false,
        }
    }

    /// Adds a drawable to the named layer, creating the layer at the end of
    /// the stack if it does not exist yet.
    pub fn add<D>(&mut self, layer: &str, order: i32, drawable: D) -> DrawableId
    where
        D: Drawable + 'static,
    {
        if self.layer(layer).is_none() {
            let index = self.layers.last().map_or(0, |last| last.index + 1);
            let _ = self.create_layer(layer, index);
        }
        self.next_id += 1;
        let id = DrawableId(self.next_id);
        if let Some(target) = self.layer_mut(layer) {
            target.insert(id, order, Box::new(drawable));
        }
        id
    }

    /// Removes a drawable from whichever layer holds it.
    pub fn remove(&mut self, id: DrawableId) -> bool {
        self.layers.iter_mut().any(|layer| layer.remove(id))
    }

    /// Removes every layer.
    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Draws every visible layer, lowest index first.
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        for layer in &self.layers {
            layer.draw(target);
        }
    }
}
