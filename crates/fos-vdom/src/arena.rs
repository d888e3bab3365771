//! Virtual element storage
//!
//! Generational slot map: parents and children refer to each other by
//! [`ElementId`], so the parent back-reference never forms an ownership
//! cycle. A removed slot bumps its generation, so an old id can never
//! resolve to whatever reuses the slot.

/// Generational index of a virtual element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    pub index: u32,
    pub generation: u32,
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}", self.index, self.generation)
    }
}

/// Generational arena (slot map)
#[derive(Debug)]
pub struct ElementArena<T> {
    items: Vec<Option<(T, u32)>>,
    free_list: Vec<u32>,
    generations: Vec<u32>,
    len: usize,
}

impl<T> ElementArena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            free_list: Vec::new(),
            generations: Vec::new(),
            len: 0,
        }
    }

    /// Insert item
    pub fn insert(&mut self, value: T) -> ElementId {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let generation = self.generations[index as usize];
            self.items[index as usize] = Some((value, generation));
            ElementId { index, generation }
        } else {
            let index = self.items.len() as u32;
            self.items.push(Some((value, 0)));
            self.generations.push(0);
            ElementId { index, generation: 0 }
        }
    }

    /// Get item
    pub fn get(&self, id: ElementId) -> Option<&T> {
        self.items.get(id.index as usize)
            .and_then(|opt| opt.as_ref())
            .filter(|(_, g)| *g == id.generation)
            .map(|(val, _)| val)
    }

    /// Get item mutably
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut T> {
        self.items.get_mut(id.index as usize)
            .and_then(|opt| opt.as_mut())
            .filter(|(_, g)| *g == id.generation)
            .map(|(val, _)| val)
    }

    /// Remove item
    pub fn remove(&mut self, id: ElementId) -> Option<T> {
        let slot = self.items.get_mut(id.index as usize)?;
        if !matches!(slot, Some((_, g)) if *g == id.generation) {
            return None;
        }
        let (val, _) = slot.take()?;
        self.generations[id.index as usize] = id.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.len -= 1;
        Some(val)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for ElementArena<T> {
    fn default() -> Self { Self::new() }
}
