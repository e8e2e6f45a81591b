// crates/engine_ecs/src/storage.rs
use crate::entity::EntityId;

struct Slot<T> {
    generation: u32,
    occupied: bool,
    // None while the value is checked out for an update.
    value: Option<T>,
}

/// Generational arena that also remembers insertion order.
///
/// Values can be checked out (moved out while keeping their slot) so that a
/// value can be handed `&mut` access to the arena's owner during its own
/// update. Removing a checked-out entry frees the slot immediately and makes
/// the later [`EntityArena::restore`] hand the value back to the caller.
pub struct EntityArena<T> {
    slots: Vec<Slot<T>>,
    free_indices: Vec<u32>,
    order: Vec<EntityId>,
}

impl<T> Default for EntityArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_indices: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn insert(&mut self, value: T) -> EntityId {
        let index = if let Some(idx) = self.free_indices.pop() {
            idx
        } else {
            self.slots.push(Slot { generation: 0, occupied: false, value: None });
            (self.slots.len() - 1) as u32
        };

        let slot = &mut self.slots[index as usize];
        slot.occupied = true;
        slot.value = Some(value);

        let entity = EntityId::new(index, slot.generation);
        self.order.push(entity);
        entity
    }

    fn slot(&self, id: EntityId) -> Option<&Slot<T>> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.occupied && slot.generation == id.generation())
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.occupied && slot.generation == id.generation())
    }

    /// Live entry, including one that is currently checked out.
    pub fn contains(&self, id: EntityId) -> bool {
        self.slot(id).is_some()
    }

    pub fn is_checked_out(&self, id: EntityId) -> bool {
        self.slot(id).is_some_and(|slot| slot.value.is_none())
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slot(id).and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slot_mut(id).and_then(|slot| slot.value.as_mut())
    }

    /// Frees the slot. Returns the value unless it is checked out.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self.slot_mut(id)?;
        slot.occupied = false;
        slot.generation = slot.generation.wrapping_add(1);
        let value = slot.value.take();

        self.free_indices.push(id.slot() as u32);
        self.order.retain(|e| *e != id);
        value
    }

    pub fn checkout(&mut self, id: EntityId) -> Option<T> {
        self.slot_mut(id).and_then(|slot| slot.value.take())
    }

    /// Puts a checked-out value back. Fails (returning the value) when the
    /// entry was removed in the meantime.
    pub fn restore(&mut self, id: EntityId, value: T) -> Result<(), T> {
        match self.slot_mut(id) {
            Some(slot) if slot.value.is_none() => {
                slot.value = Some(value);
                Ok(())
            }
            _ => Err(value),
        }
    }

    /// Live ids in insertion order.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Insertion-ordered iteration, skipping checked-out entries.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.order
            .iter()
            .filter_map(move |id| self.get(*id).map(|value| (*id, value)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
