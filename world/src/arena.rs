//! Generational storage handing out stable, typed handles.
//!
//! Every slot carries a generation counter that advances whenever its value is
//! removed. A handle remembers the generation it was issued with, so a handle
//! to a removed value never resolves to whatever later reuses the slot.

use std::{fmt, hash, marker::PhantomData};

/// Stable reference to a value stored in an [`Arena`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            marker: PhantomData,
        }
    }

    /// Slot index of the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation the handle was issued with.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> hash::Hash for Handle<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with generation-checked access.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value`, reusing a freed slot when one is available.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle::new(index, 0)
    }

    /// Removes and returns the value behind `handle`.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Reports whether `handle` still resolves to a value.
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Value behind `handle`, or `None` for stale handles.
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Mutable value behind `handle`, or `None` for stale handles.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Mutable access to two distinct values at once.
    ///
    /// Returns `None` when either handle is stale or both name the same slot.
    pub fn get2_mut(&mut self, first: Handle<T>, second: Handle<T>) -> Option<(&mut T, &mut T)> {
        if first.index == second.index || !self.contains(first) || !self.contains(second) {
            return None;
        }

        let (low, high, swapped) = if first.index < second.index {
            (first.index as usize, second.index as usize, false)
        } else {
            (second.index as usize, first.index as usize, true)
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let low_value = head[low].value.as_mut()?;
        let high_value = tail[0].value.as_mut()?;

        if swapped {
            Some((high_value, low_value))
        } else {
            Some((low_value, high_value))
        }
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the arena holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over live values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let index = u32::try_from(index).ok()?;
            slot.value
                .as_ref()
                .map(|value| (Handle::new(index, slot.generation), value))
        })
    }

    /// Iterates mutably over live values in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let index = u32::try_from(index).ok()?;
                let generation = slot.generation;
                slot.value
                    .as_mut()
                    .map(|value| (Handle::new(index, generation), value))
            })
    }

    /// Handles of every live value, in slot order.
    #[must_use]
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Removes every value and invalidates every outstanding handle.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            if let Ok(index) = u32::try_from(index) {
                self.free.push(index);
            }
        }
        self.len = 0;
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_handles_do_not_resolve_to_reused_slots() {
        let mut arena = Arena::new();
        let first = arena.insert("first");
        assert_eq!(arena.remove(first), Some("first"));

        let second = arena.insert("second");
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.get(second), Some(&"second"));
        assert_eq!(arena.remove(first), None);
    }

    #[test]
    fn get2_mut_returns_values_in_argument_order() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);

        let (second, first) = arena.get2_mut(b, a).expect("distinct handles");
        *second += 10;
        *first += 20;

        assert_eq!(arena.get(a), Some(&21));
        assert_eq!(arena.get(b), Some(&12));
        assert!(arena.get2_mut(a, a).is_none());
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut arena = Arena::new();
        let handle = arena.insert(5);
        let _ = arena.insert(6);
        arena.clear();

        assert!(arena.is_empty());
        assert!(!arena.contains(handle));
        let _ = arena.insert(7);
        assert_eq!(arena.len(), 1);
    }
}
