// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Owning placement slot for objects that must not live on the heap.
//!
//! A [`Slot`] reserves storage for exactly one `T` inline in its owner.
//! [`Slot::emplace`] destroys the current occupant (if any) before the new
//! value is moved in, so at most one `T` is ever alive in the slot and its
//! destructor always runs.

/// Fixed storage for at most one `T`, constructed in place.
///
/// # Example
/// ```
/// use memory_manager::Slot;
///
/// let mut slot: Slot<String> = Slot::new();
/// assert!(!slot.is_occupied());
///
/// slot.emplace("method".to_string()).push_str("_arena");
/// assert_eq!(slot.get().map(String::as_str), Some("method_arena"));
///
/// slot.clear();
/// assert!(slot.get().is_none());
/// ```
pub struct Slot<T> {
    value: Option<T>,
}

impl<T> Slot<T> {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Destroys the current occupant, then stores `value` and returns it.
    pub fn emplace(&mut self, value: T) -> &mut T {
        drop(self.value.take());
        self.value.insert(value)
    }

    /// Returns the occupant, if any.
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Returns the occupant mutably, if any.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    /// Moves the occupant out, leaving the slot empty.
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    /// Destroys the occupant, if any.
    pub fn clear(&mut self) {
        drop(self.value.take());
    }

    /// Returns `true` if the slot holds a value.
    pub fn is_occupied(&self) -> bool {
        self.value.is_some()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(v) => f.debug_tuple("Slot").field(v).finish(),
            None => f.write_str("Slot(<empty>)"),
        }
    }
}
