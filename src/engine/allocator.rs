use super::VoiceHandle;

/*
Generational Slot Arena
=======================

Engine voices live in a Vec of slots. A handle is (slot index, generation).
Removing a value bumps the slot's generation, so any handle minted before the
removal stops matching:

  insert A   → slot 0, gen 0   handle (0,0) valid
  remove A   → slot 0, gen 1   handle (0,0) stale
  insert B   → slot 0, gen 1   handle (0,1) valid, (0,0) still stale

Freed slots are recycled LIFO. Nothing is deallocated while running, so once
the arena has grown to the peak polyphony it stops allocating.
*/

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> VoiceHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return VoiceHandle::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        VoiceHandle::new(index, 0)
    }

    fn slot(&self, handle: VoiceHandle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
    }

    pub fn contains(&self, handle: VoiceHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: VoiceHandle) -> Option<&T> {
        self.slot(handle).and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: VoiceHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn remove(&mut self, handle: VoiceHandle) -> Option<T> {
        let index = handle.index();
        let slot = self
            .slots
            .get_mut(index as usize)
            .filter(|slot| slot.generation == handle.generation())?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(value)
    }

    /// Remove every value matching `pred`, handing each one to `on_removed`.
    pub fn remove_where(
        &mut self,
        mut pred: impl FnMut(&T) -> bool,
        mut on_removed: impl FnMut(VoiceHandle, T),
    ) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.value.as_ref().is_some_and(&mut pred) {
                continue;
            }
            if let Some(value) = slot.value.take() {
                let handle = VoiceHandle::new(index as u32, slot.generation);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                self.len -= 1;
                on_removed(handle, value);
            }
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (VoiceHandle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (VoiceHandle::new(index as u32, generation), value))
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
