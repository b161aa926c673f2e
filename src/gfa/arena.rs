//! Generation-checked slot storage owning every line of a graph

use std::fmt;

use crate::line::Line;

/// Stable handle to a line stored in a [`crate::Gfa`].
///
/// A handle becomes stale when its line is disconnected or replaced; stale
/// handles never alias a newer line because the slot generation changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId {
    index: u32,
    generation: u32,
}

impl LineId {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    line: Option<Line>,
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Arena {
    pub fn insert(&mut self, mut line: Line) -> LineId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                LineId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    line: None,
                });
                LineId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        line.set_handle(Some(id));
        self.slots[id.index()].line = Some(line);
        self.len += 1;
        id
    }

    pub fn get(&self, id: LineId) -> Option<&Line> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.line.as_ref())
    }

    pub fn get_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.line.as_mut())
    }

    pub fn remove(&mut self, id: LineId) -> Option<Line> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let mut line = slot.line.take()?;
        self.free.push(id.index);
        self.len -= 1;
        line.set_handle(None);
        Some(line)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn ids(&self) -> impl Iterator<Item = LineId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.line.as_ref().map(|_| LineId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut arena = Arena::default();
        let a = arena.insert("S\t1\t*".parse().unwrap());
        assert!(arena.get(a).is_some());
        let removed = arena.remove(a).unwrap();
        assert!(removed.handle().is_none());
        let b = arena.insert("S\t2\t*".parse().unwrap());
        assert_eq!(a.index(), b.index());
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b).unwrap().name(), Some("2"));
        assert_eq!(arena.len(), 1);
    }
}
