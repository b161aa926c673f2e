//! Removal of lines from a graph

use tracing::debug;

use crate::error::{GfaError, Result};
use crate::gfa::{Gfa, LineId};
use crate::line::Line;

impl Gfa {
    /// Remove a line and every line depending on it.
    ///
    /// Returns the removed lines, the requested one first, detached and
    /// with their references downgraded to names. Removing a GFA2 segment
    /// drops it from the groups listing it instead of removing the groups.
    pub fn disconnect(&mut self, id: LineId) -> Result<Vec<Line>> {
        let line = self.try_line(id)?;
        if id == self.header_id() {
            return Err(GfaError::Argument(
                "the header cannot be disconnected; delete its tags instead".to_string(),
            ));
        }
        if line.is_virtual() {
            return Err(GfaError::Runtime(format!(
                "virtual line {} is removed with the lines referencing it",
                line.name().unwrap_or("?")
            )));
        }
        let mut removed = Vec::new();
        self.disconnect_cascade(id, &mut removed)?;
        removed.rotate_right(1);
        debug!(line = %id, removed = removed.len(), "disconnected");
        Ok(removed)
    }

    fn disconnect_cascade(&mut self, id: LineId, removed: &mut Vec<Line>) -> Result<()> {
        let Some(line) = self.arena.get_mut(id) else {
            return Ok(());
        };
        let backrefs = std::mem::take(&mut line.backrefs);
        let mut dependents = Vec::new();
        let mut groups = Vec::new();
        for (key, referrers) in backrefs.iter() {
            if line.spec().is_dependent_key(key) {
                dependents.extend_from_slice(referrers);
            } else {
                groups.extend_from_slice(referrers);
            }
        }
        for dependent in dependents {
            self.disconnect_cascade(dependent, removed)?;
        }
        for group in groups {
            if let Some(group) = self.arena.get_mut(group) {
                group.remove_list_item(id);
            }
        }

        let mut line = self.unindex_line(id)?;
        let outgoing = std::mem::take(&mut line.outgoing);
        line.downgrade_references(self)?;
        for (target, key) in outgoing {
            self.drop_backref(target, &key, id)?;
        }
        if !line.is_virtual() {
            removed.push(line);
        }
        Ok(())
    }

    /// Remove one backreference; virtual lines left without referrers go too.
    fn drop_backref(&mut self, target: LineId, key: &str, source: LineId) -> Result<()> {
        let Some(line) = self.arena.get_mut(target) else {
            return Ok(());
        };
        line.backrefs.remove(key, source);
        if !line.is_virtual() || !line.backrefs.is_empty() {
            return Ok(());
        }
        let orphan = self.unindex_line(target)?;
        debug!(line = %target, "orphaned virtual line removed");
        for (next, key) in &orphan.outgoing {
            self.drop_backref(*next, key, target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::gfa::Gfa;
    use crate::value::Value;

    #[test]
    fn test_disconnect_cascades_to_links_and_paths() {
        let mut gfa = Gfa::new();
        let s1 = gfa.add_line("S\t1\tACGT").unwrap();
        let s2 = gfa.add_line("S\t2\tACGT").unwrap();
        let link = gfa.add_line("L\t1\t+\t2\t+\t*").unwrap();
        let path = gfa.add_line("P\tp1\t1+,2+\t*").unwrap();
        let removed = gfa.disconnect(s1).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0].name(), Some("1"));
        assert!(gfa.get(link).is_none());
        assert!(gfa.get(path).is_none());
        assert!(gfa.segment("2").unwrap().dovetails().is_empty());
        assert!(gfa.try_line(s2).unwrap().paths().is_empty());
        let detached_path = removed.iter().find(|l| l.name() == Some("p1")).unwrap();
        assert!(!detached_path.is_connected());
        assert!(!detached_path.try_get("segment_names").unwrap().has_line_ids());
        assert_eq!(detached_path.to_string(), "P\tp1\t1+,2+\t*");
        assert_eq!(gfa.captured_path(path).unwrap_err().kind(), ErrorKind::Runtime);
    }

    #[test]
    fn test_disconnect_link_keeps_segments() {
        let mut gfa = Gfa::new();
        let s1 = gfa.add_line("S\t1\t*").unwrap();
        let link = gfa.add_line("L\t1\t+\t2\t+\t*").unwrap();
        let removed = gfa.disconnect(link).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].try_get("from_segment").unwrap(), &Value::from("1"));
        assert!(gfa.get(s1).is_some());
        assert!(gfa.segment("2").is_none());
        assert!(gfa.virtual_lines().is_empty());
    }

    #[test]
    fn test_gfa2_segment_leaves_groups() {
        let mut gfa = Gfa::new();
        let s1 = gfa.add_line("S\t1\t10\t*").unwrap();
        gfa.add_line("S\t2\t10\t*").unwrap();
        let group = gfa.add_line("U\tu\t1 2").unwrap();
        gfa.disconnect(s1).unwrap();
        assert!(gfa.get(group).is_some());
        assert_eq!(gfa.line_to_string(group).unwrap(), "U\tu\t2");
    }

    #[test]
    fn test_stale_and_virtual_handles() {
        let mut gfa = Gfa::new();
        let link = gfa.add_line("L\t1\t+\t2\t+\t*").unwrap();
        let virtual_segment = gfa.segment_id("1").unwrap();
        assert_eq!(gfa.disconnect(virtual_segment).unwrap_err().kind(), ErrorKind::Runtime);
        gfa.disconnect(link).unwrap();
        assert_eq!(gfa.disconnect(link).unwrap_err().kind(), ErrorKind::Runtime);
        let header = gfa.add_line("H\tVN:Z:1.0").unwrap();
        assert_eq!(gfa.disconnect(header).unwrap_err().kind(), ErrorKind::Argument);
    }
}
