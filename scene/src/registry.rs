//! Participant lists with deferred removal.

use std::{cell::RefCell, fmt, rc::Rc};

/// Shared, interior-mutable participant.
pub type Shared<T> = Rc<RefCell<T>>;

fn same<T: ?Sized>(a: &Shared<T>, b: &Shared<T>) -> bool {
    std::ptr::eq(Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>())
}

/// Insertion-ordered list of participants compared by pointer identity.
///
/// Removal is deferred: a removed participant stops being visited at once
/// but stays in storage until [`Registry::flush`], so a participant may
/// remove itself, or a sibling, while the list is being walked.
pub(crate) struct Registry<T: ?Sized> {
    entries: Vec<Shared<T>>,
    removed: Vec<Shared<T>>,
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .field("removed", &self.removed.len())
            .finish()
    }
}

impl<T: ?Sized> Registry<T> {
    /// Adds `item` unless it is already registered. Re-adding an item whose
    /// removal is pending cancels the removal.
    pub(crate) fn add(&mut self, item: Shared<T>) -> bool {
        if let Some(position) = self.removed.iter().position(|entry| same(entry, &item)) {
            let _ = self.removed.swap_remove(position);
            return true;
        }
        if self.entries.iter().any(|entry| same(entry, &item)) {
            return false;
        }
        self.entries.push(item);
        true
    }

    /// Schedules `item` for removal.
    pub(crate) fn remove(&mut self, item: &Shared<T>) -> bool {
        if !self.contains(item) {
            return false;
        }
        self.removed.push(Rc::clone(item));
        true
    }

    /// Reports whether `item` is registered and not pending removal.
    pub(crate) fn contains(&self, item: &Shared<T>) -> bool {
        self.entries.iter().any(|entry| same(entry, item))
            && !self.removed.iter().any(|entry| same(entry, item))
    }

    /// Participants to visit this pass, in insertion order.
    pub(crate) fn active(&self) -> Vec<Shared<T>> {
        self.entries
            .iter()
            .filter(|entry| !self.removed.iter().any(|removed| same(removed, entry)))
            .cloned()
            .collect()
    }

    /// Drops participants whose removal is pending.
    pub(crate) fn flush(&mut self) {
        if self.removed.is_empty() {
            return;
        }
        let removed = std::mem::take(&mut self.removed);
        self.entries
            .retain(|entry| !removed.iter().any(|gone| same(gone, entry)));
    }

    /// Number of participants still being visited.
    pub(crate) fn len(&self) -> usize {
        self.entries.len() - self.removed.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.removed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named {
        fn name(&self) -> &str;
    }

    struct Label(&'static str);

    impl Named for Label {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn names(registry: &Registry<dyn Named>) -> Vec<String> {
        registry
            .active()
            .iter()
            .map(|entry| entry.borrow().name().to_owned())
            .collect()
    }

    #[test]
    fn adds_are_idempotent_and_removal_waits_for_flush() {
        let mut registry: Registry<dyn Named> = Registry::default();
        let first: Shared<dyn Named> = Rc::new(RefCell::new(Label("first")));
        let second: Shared<dyn Named> = Rc::new(RefCell::new(Label("second")));

        assert!(registry.add(Rc::clone(&first)));
        assert!(!registry.add(Rc::clone(&first)));
        assert!(registry.add(Rc::clone(&second)));

        assert!(registry.remove(&first));
        assert!(!registry.remove(&first));
        assert_eq!(names(&registry), vec!["second"]);
        assert_eq!(registry.len(), 1);

        registry.flush();
        assert_eq!(registry.len(), 1);
        assert!(registry.add(Rc::clone(&first)));
        assert_eq!(names(&registry), vec!["second", "first"]);
    }

    #[test]
    fn re_adding_cancels_a_pending_removal() {
        let mut registry: Registry<dyn Named> = Registry::default();
        let item: Shared<dyn Named> = Rc::new(RefCell::new(Label("item")));
        let _ = registry.add(Rc::clone(&item));
        let _ = registry.remove(&item);

        assert!(registry.add(Rc::clone(&item)));
        registry.flush();

        assert!(registry.contains(&item));
    }
}
