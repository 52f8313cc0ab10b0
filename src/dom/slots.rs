//! Generational slot table
//!
//! Backs node and listener storage. Freed slots go on a free list and are
//! handed out again with a bumped generation, so the table stays as large as
//! the peak number of live entries while a stale key never resolves to the
//! entry that took its slot.

/// Index plus generation; only valid for the table that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    index: u32,
    generation: u32,
}

impl SlotKey {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

pub(crate) struct Slots<T> {
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Slots<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> SlotKey {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.value = Some(value);
                SlotKey {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(Entry {
                    generation: 0,
                    value: Some(value),
                });
                SlotKey { index, generation: 0 }
            }
        }
    }

    pub fn get(&self, key: SlotKey) -> Option<&T> {
        self.entries
            .get(key.index())
            .filter(|e| e.generation == key.generation)
            .and_then(|e| e.value.as_ref())
    }

    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        self.entries
            .get_mut(key.index())
            .filter(|e| e.generation == key.generation)
            .and_then(|e| e.value.as_mut())
    }

    pub fn remove(&mut self, key: SlotKey) -> Option<T> {
        let entry = self
            .entries
            .get_mut(key.index())
            .filter(|e| e.generation == key.generation)?;
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(key.index);
        self.len -= 1;
        Some(value)
    }

    /// Remove every entry for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(SlotKey, &T) -> bool) {
        let doomed: Vec<SlotKey> = self
            .iter()
            .filter(|(key, value)| !keep(*key, value))
            .map(|(key, _)| key)
            .collect();
        for key in doomed {
            self.remove(key);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &T)> {
        self.entries.iter().enumerate().filter_map(|(index, e)| {
            e.value.as_ref().map(|v| {
                (
                    SlotKey {
                        index: index as u32,
                        generation: e.generation,
                    },
                    v,
                )
            })
        })
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|e| e.value.as_ref())
    }

    /// Live entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Slots allocated so far, live or free
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
}
