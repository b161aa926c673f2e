//! Backreference tables

use std::collections::BTreeMap;

use crate::gfa::LineId;

/// Relation keys under which lines register on the lines they reference.
pub mod keys {
    pub const DOVETAILS_L: &str = "dovetails_L";
    pub const DOVETAILS_R: &str = "dovetails_R";
    pub const EDGES_TO_CONTAINED: &str = "edges_to_contained";
    pub const EDGES_TO_CONTAINERS: &str = "edges_to_containers";
    pub const INTERNALS: &str = "internals";
    pub const GAPS_L: &str = "gaps_L";
    pub const GAPS_R: &str = "gaps_R";
    pub const FRAGMENTS: &str = "fragments";
    pub const PATHS: &str = "paths";
    pub const SETS: &str = "sets";
}

/// Lines referencing a line, grouped by relation key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backrefs(BTreeMap<String, Vec<LineId>>);

impl Backrefs {
    pub fn get(&self, key: &str) -> &[LineId] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add(&mut self, key: &str, id: LineId) {
        let list = self.0.entry(key.to_string()).or_default();
        if !list.contains(&id) {
            list.push(id);
        }
    }

    /// Remove `id` from `key`; returns whether it was present.
    pub fn remove(&mut self, key: &str, id: LineId) -> bool {
        let Some(list) = self.0.get_mut(key) else {
            return false;
        };
        let before = list.len();
        list.retain(|other| *other != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.0.remove(key);
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LineId])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every referencing line, each once.
    pub fn all(&self) -> Vec<LineId> {
        let mut ids: Vec<LineId> = Vec::new();
        for list in self.0.values() {
            for id in list {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
        }
        ids
    }

    /// Add every entry of `other`.
    pub fn merge(&mut self, other: Backrefs) {
        for (key, list) in other.0 {
            for id in list {
                self.add(&key, id);
            }
        }
    }

    pub fn replace_id(&mut self, old: LineId, new: LineId) {
        for list in self.0.values_mut() {
            for id in list.iter_mut() {
                if *id == old {
                    *id = new;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfa::Gfa;

    #[test]
    fn test_add_remove() {
        let mut gfa = Gfa::new();
        let a = gfa.add_line("S\ta\t*").unwrap();
        let b = gfa.add_line("S\tb\t*").unwrap();
        let mut backrefs = Backrefs::default();
        backrefs.add(keys::PATHS, a);
        backrefs.add(keys::PATHS, a);
        backrefs.add(keys::SETS, b);
        assert_eq!(backrefs.get(keys::PATHS), &[a]);
        assert_eq!(backrefs.len(), 2);
        assert_eq!(backrefs.all(), vec![a, b]);
        assert!(backrefs.remove(keys::PATHS, a));
        assert!(!backrefs.remove(keys::PATHS, a));
        assert_eq!(backrefs.keys().collect::<Vec<_>>(), vec![keys::SETS]);
        backrefs.replace_id(b, a);
        assert_eq!(backrefs.get(keys::SETS), &[a]);
    }
}
