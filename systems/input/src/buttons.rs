//! Edge detection shared by the input devices.

/// Set of buttons currently down, in the order they went down.
#[derive(Clone, Debug)]
pub(crate) struct Buttons<B> {
    down: Vec<B>,
}

impl<B> Default for Buttons<B> {
    fn default() -> Self {
        Self { down: Vec::new() }
    }
}

impl<B: Copy + PartialEq> Buttons<B> {
    /// Records a down edge. Returns `false` for a button that was already
    /// down, which is how platform key repeat is filtered out.
    pub(crate) fn press(&mut self, button: B) -> bool {
        if self.down.contains(&button) {
            return false;
        }
        self.down.push(button);
        true
    }

    /// Records an up edge. Returns `false` for a button that was not down.
    pub(crate) fn release(&mut self, button: B) -> bool {
        match self.down.iter().position(|down| *down == button) {
            Some(position) => {
                let _ = self.down.remove(position);
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_down(&self, button: B) -> bool {
        self.down.contains(&button)
    }

    pub(crate) fn down(&self) -> &[B] {
        &self.down
    }

    pub(crate) fn release_where<P: FnMut(&B) -> bool>(&mut self, mut released: P) {
        self.down.retain(|button| !released(button));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_edges_are_ignored() {
        let mut buttons = Buttons::default();

        assert!(buttons.press(3));
        assert!(!buttons.press(3));
        assert!(buttons.is_down(3));
        assert!(buttons.release(3));
        assert!(!buttons.release(3));
        assert!(buttons.down().is_empty());
    }
}
