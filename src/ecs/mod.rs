use crate::animation::Animation;
use crate::components::{Sprite, Transform};

// ---------------------------------------------------------------------------
// Entity — generational index
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    id: u32,
    generation: u32,
}

impl Entity {
    pub fn id(self) -> u32 {
        self.id
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

// ---------------------------------------------------------------------------
// SparseSet<T> — per-component storage
// ---------------------------------------------------------------------------

struct SparseSet<T> {
    sparse: Vec<u32>,
    dense: Vec<u32>,
    data: Vec<T>,
}

const EMPTY: u32 = u32::MAX;

impl<T> SparseSet<T> {
    fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            data: Vec::new(),
        }
    }

    fn insert(&mut self, id: u32, value: T) {
        let idx = id as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, EMPTY);
        }
        if self.sparse[idx] != EMPTY {
            // Overwrite existing component.
            let dense_idx = self.sparse[idx] as usize;
            self.data[dense_idx] = value;
        } else {
            self.sparse[idx] = self.dense.len() as u32;
            self.dense.push(id);
            self.data.push(value);
        }
    }

    fn remove(&mut self, id: u32) -> Option<T> {
        let idx = id as usize;
        if idx >= self.sparse.len() || self.sparse[idx] == EMPTY {
            return None;
        }
        let dense_idx = self.sparse[idx] as usize;
        self.sparse[idx] = EMPTY;

        // Swap-remove to keep arrays packed.
        let last = self.dense.len() - 1;
        if dense_idx != last {
            let moved_id = self.dense[last] as usize;
            self.sparse[moved_id] = dense_idx as u32;
        }
        self.dense.swap_remove(dense_idx);
        Some(self.data.swap_remove(dense_idx))
    }

    fn get(&self, id: u32) -> Option<&T> {
        let idx = id as usize;
        if idx >= self.sparse.len() || self.sparse[idx] == EMPTY {
            return None;
        }
        Some(&self.data[self.sparse[idx] as usize])
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        let idx = id as usize;
        if idx >= self.sparse.len() || self.sparse[idx] == EMPTY {
            return None;
        }
        Some(&mut self.data[self.sparse[idx] as usize])
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn iter(&self) -> SparseSetIter<'_, T> {
        SparseSetIter {
            dense: &self.dense,
            data: &self.data,
            index: 0,
        }
    }

    fn iter_mut(&mut self) -> SparseSetIterMut<'_, T> {
        SparseSetIterMut {
            dense: &self.dense,
            data: self.data.as_mut_ptr(),
            len: self.data.len(),
            index: 0,
            _marker: std::marker::PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

struct SparseSetIter<'a, T> {
    dense: &'a [u32],
    data: &'a [T],
    index: usize,
}

impl<'a, T> Iterator for SparseSetIter<'a, T> {
    type Item = (u32, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.dense.len() {
            return None;
        }
        let i = self.index;
        self.index += 1;
        Some((self.dense[i], &self.data[i]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dense.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for SparseSetIter<'_, T> {}

struct SparseSetIterMut<'a, T> {
    dense: &'a [u32],
    data: *mut T,
    len: usize,
    index: usize,
    _marker: std::marker::PhantomData<&'a mut T>,
}

impl<'a, T> Iterator for SparseSetIterMut<'a, T> {
    type Item = (u32, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        let i = self.index;
        self.index += 1;
        // SAFETY: each index is visited exactly once, and `len` equals data length.
        let val = unsafe { &mut *self.data.add(i) };
        Some((self.dense[i], val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for SparseSetIterMut<'_, T> {}

/// Iterator over `(Entity, &T)` pairs from a component table.
pub struct ComponentIter<'a, T> {
    inner: SparseSetIter<'a, T>,
    generations: &'a [u32],
}

impl<'a, T> Iterator for ComponentIter<'a, T> {
    type Item = (Entity, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, data) = self.inner.next()?;
        let entity = Entity {
            id,
            generation: self.generations[id as usize],
        };
        Some((entity, data))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for ComponentIter<'_, T> {}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

struct EntityAllocator {
    generations: Vec<u32>,
    free: Vec<u32>,
    next_id: u32,
}

impl EntityAllocator {
    fn new() -> Self {
        Self {
            generations: Vec::new(),
            free: Vec::new(),
            next_id: 0,
        }
    }

    fn allocate(&mut self) -> Entity {
        if let Some(id) = self.free.pop() {
            Entity {
                id,
                generation: self.generations[id as usize],
            }
        } else {
            let id = self.next_id;
            self.next_id += 1;
            self.generations.push(0);
            Entity { id, generation: 0 }
        }
    }

    fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.id as usize] += 1;
        self.free.push(entity.id);
        true
    }

    fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.id as usize;
        idx < self.generations.len() && self.generations[idx] == entity.generation
    }
}

// ---------------------------------------------------------------------------
// World — fixed component tables
// ---------------------------------------------------------------------------

/// Entity store with one statically-typed sparse set per component kind.
///
/// There is no runtime type lookup: the component set is fixed (name,
/// transform, sprite, animation), each kind stored struct-of-arrays keyed by
/// entity id so bulk per-tick passes walk packed arrays. Absence of a
/// component is an explicit `None`, never a default.
pub struct World {
    allocator: EntityAllocator,
    names: SparseSet<String>,
    transforms: SparseSet<Transform>,
    sprites: SparseSet<Sprite>,
    animations: SparseSet<Animation>,
}

impl World {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            names: SparseSet::new(),
            transforms: SparseSet::new(),
            sprites: SparseSet::new(),
            animations: SparseSet::new(),
        }
    }

    // -- Entity lifecycle ---------------------------------------------------

    pub fn spawn(&mut self) -> Entity {
        self.allocator.allocate()
    }

    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.allocator.deallocate(entity) {
            return false;
        }
        self.names.remove(entity.id);
        self.transforms.remove(entity.id);
        self.sprites.remove(entity.id);
        self.animations.remove(entity.id);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    // -- Name ---------------------------------------------------------------

    pub fn set_name(&mut self, entity: Entity, name: impl Into<String>) {
        self.assert_alive(entity);
        self.names.insert(entity.id, name.into());
    }

    pub fn name(&self, entity: Entity) -> Option<&str> {
        if !self.is_alive(entity) {
            return None;
        }
        self.names.get(entity.id).map(String::as_str)
    }

    // -- Transform ------------------------------------------------------------

    pub fn insert_transform(&mut self, entity: Entity, transform: Transform) {
        self.assert_alive(entity);
        self.transforms.insert(entity.id, transform);
    }

    pub fn transform(&self, entity: Entity) -> Option<&Transform> {
        if !self.is_alive(entity) {
            return None;
        }
        self.transforms.get(entity.id)
    }

    pub fn transform_mut(&mut self, entity: Entity) -> Option<&mut Transform> {
        if !self.is_alive(entity) {
            return None;
        }
        self.transforms.get_mut(entity.id)
    }

    pub fn remove_transform(&mut self, entity: Entity) -> Option<Transform> {
        if !self.is_alive(entity) {
            return None;
        }
        self.transforms.remove(entity.id)
    }

    // -- Sprite ---------------------------------------------------------------

    pub fn insert_sprite(&mut self, entity: Entity, sprite: Sprite) {
        self.assert_alive(entity);
        self.sprites.insert(entity.id, sprite);
    }

    pub fn sprite(&self, entity: Entity) -> Option<&Sprite> {
        if !self.is_alive(entity) {
            return None;
        }
        self.sprites.get(entity.id)
    }

    pub fn sprite_mut(&mut self, entity: Entity) -> Option<&mut Sprite> {
        if !self.is_alive(entity) {
            return None;
        }
        self.sprites.get_mut(entity.id)
    }

    pub fn remove_sprite(&mut self, entity: Entity) -> Option<Sprite> {
        if !self.is_alive(entity) {
            return None;
        }
        self.sprites.remove(entity.id)
    }

    /// Iterate all sprites in packed storage order.
    pub fn sprites(&self) -> ComponentIter<'_, Sprite> {
        ComponentIter {
            inner: self.sprites.iter(),
            generations: &self.allocator.generations,
        }
    }

    // -- Animation ------------------------------------------------------------

    pub fn insert_animation(&mut self, entity: Entity, animation: Animation) {
        self.assert_alive(entity);
        self.animations.insert(entity.id, animation);
    }

    pub fn animation(&self, entity: Entity) -> Option<&Animation> {
        if !self.is_alive(entity) {
            return None;
        }
        self.animations.get(entity.id)
    }

    pub fn animation_mut(&mut self, entity: Entity) -> Option<&mut Animation> {
        if !self.is_alive(entity) {
            return None;
        }
        self.animations.get_mut(entity.id)
    }

    pub fn remove_animation(&mut self, entity: Entity) -> Option<Animation> {
        if !self.is_alive(entity) {
            return None;
        }
        self.animations.remove(entity.id)
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    // -- Animation clock ------------------------------------------------------

    /// Advance every animation by `dt` seconds and sync each owning entity's
    /// sprite source rect to the active frame.
    ///
    /// One packed pass over the animation table; every instance holds its own
    /// frame index and elapsed time, so tens of thousands of entities advance
    /// without sharing any mutable state.
    pub fn advance_animations(&mut self, dt: f32) {
        let sprites = &mut self.sprites;
        for (id, animation) in self.animations.iter_mut() {
            animation.advance(dt);
            if let (Some(frame), Some(sprite)) = (animation.current_frame(), sprites.get_mut(id)) {
                sprite.source_rect = frame.source_rect;
            }
        }
    }

    // -- Internal helpers -----------------------------------------------------

    fn assert_alive(&self, entity: Entity) {
        assert!(
            self.is_alive(entity),
            "cannot insert component on dead entity"
        );
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
