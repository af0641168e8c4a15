//! Slot arena holding the requests registered for the current step.
//!
//! Slots are recycled through a free list, so once the arena has grown to a
//! step's peak request count, later steps register into existing slots.
//! Handles carry a generation so a handle from an earlier step never reaches
//! a request that reused its slot.

use crate::scanner::{Dispatch, Visit};

/// Boxed per-voxel callback of a request.
pub(crate) type Callback<'a> = Box<dyn for<'v> FnMut(&mut Visit<'v, 'a>) -> Dispatch + 'a>;

/// Handle to a registered request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId {
    index: u32,
    generation: u32,
}

/// One consumer's radius query for the current step.
pub(crate) struct Request<'a> {
    pub(crate) horizontal_radius: u32,
    pub(crate) vertical_radius: u32,
    pub(crate) callback: Callback<'a>,
}

struct Slot<'a> {
    generation: u32,
    request: Option<Request<'a>>,
}

/// Fixed-slot storage with a free list, indexed by [`RequestId`].
pub(crate) struct RequestArena<'a> {
    slots: Vec<Slot<'a>>,
    free: Vec<u32>,
    len: usize,
}

impl<'a> RequestArena<'a> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores a request in a free slot, growing the arena only when none is free.
    pub(crate) fn insert(&mut self, request: Request<'a>) -> RequestId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.request = Some(request);
            return RequestId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            request: Some(request),
        });
        RequestId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn get(&self, id: RequestId) -> Option<&Request<'a>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.request.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: RequestId) -> Option<&mut Request<'a>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.request.as_mut())
    }

    /// Frees the slot behind `id` and returns its request.
    pub(crate) fn remove(&mut self, id: RequestId) -> Option<Request<'a>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let request = slot.request.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(request)
    }

    /// Frees every occupied slot, keeping the slots themselves for reuse.
    pub(crate) fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.request.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.len = 0;
    }

    /// Number of live requests.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of slots ever allocated.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keep_going(_: &mut Visit<'_, '_>) -> Dispatch {
        Dispatch::Continue
    }

    fn request(radius: u32) -> Request<'static> {
        Request {
            horizontal_radius: radius,
            vertical_radius: radius,
            callback: Box::new(keep_going),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut arena = RequestArena::new();
        let a = arena.insert(request(1));
        let b = arena.insert(request(2));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a).map(|r| r.horizontal_radius), Some(1));
        assert_eq!(arena.get(b).map(|r| r.horizontal_radius), Some(2));
    }

    #[test]
    fn test_removed_slot_is_reused() {
        let mut arena = RequestArena::new();
        let a = arena.insert(request(1));
        arena.insert(request(2));
        assert!(arena.remove(a).is_some());
        let c = arena.insert(request(3));
        assert_eq!(arena.capacity(), 2);
        assert_eq!(arena.get(c).map(|r| r.horizontal_radius), Some(3));
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut arena = RequestArena::new();
        let a = arena.insert(request(1));
        arena.remove(a);
        let b = arena.insert(request(2));
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert!(arena.get_mut(b).is_some());
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut arena = RequestArena::new();
        let ids: Vec<_> = (0..5).map(|r| arena.insert(request(r))).collect();
        arena.clear();
        assert_eq!(arena.len(), 0);
        assert!(ids.iter().all(|&id| arena.get(id).is_none()));

        for r in 0..5 {
            arena.insert(request(r));
        }
        assert_eq!(arena.capacity(), 5);
    }
}
