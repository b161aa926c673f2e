//! Replacement of virtual placeholders by the lines they stand for

use tracing::debug;

use crate::error::Result;
use crate::gfa::{Gfa, LineId};
use crate::line::{Line, LineKind};
use crate::value::{LineRef, NameResolver};

impl Gfa {
    /// Put `line` in place of the virtual line `old`.
    ///
    /// The new line takes over the backreferences of the placeholder and
    /// every referrer is pointed at it; then its own references are
    /// resolved.
    pub(crate) fn substitute(&mut self, old: LineId, mut line: Line) -> Result<LineId> {
        let reversed = self.replaces_complement(old, &line)?;
        let mut placeholder = self.unindex_line(old)?;
        for (target, key) in placeholder.outgoing.drain(..) {
            if let Some(target) = self.arena.get_mut(target) {
                target.backrefs.remove(&key, old);
            }
        }
        line.backrefs = std::mem::take(&mut placeholder.backrefs);
        let referrers = line.backrefs.all();
        let new = self.store(line)?;
        for referrer in referrers {
            if let Some(referrer) = self.arena.get_mut(referrer) {
                referrer.replace_line_id(old, new, reversed);
            }
        }
        debug!(%old, %new, reversed, "virtual line replaced");
        self.link_references(new)?;
        Ok(new)
    }

    /// Whether a link replacing the virtual link `old` is its complement.
    fn replaces_complement(&self, old: LineId, line: &Line) -> Result<bool> {
        let placeholder = self.try_line(old)?;
        if line.kind() != LineKind::Link || placeholder.kind() != LineKind::Link {
            return Ok(false);
        }
        let from = placeholder.oriented_from()?;
        let from_name = match &from.line {
            LineRef::Line(id) => self.line_name(*id),
            LineRef::Name(name) => Some(name.clone()),
        };
        let new_from = line.oriented_from()?;
        Ok(from_name.as_deref() != new_from.name() || from.orient != new_from.orient)
    }
}

#[cfg(test)]
mod tests {
    use crate::gfa::Gfa;
    use crate::value::{EndType, Orientation, Value};

    #[test]
    fn test_link_parsed_before_its_segments() {
        let mut gfa = Gfa::new();
        let link = gfa.add_line("L\t1\t+\t2\t-\t10M").unwrap();
        assert!(gfa.segment("1").unwrap().is_virtual());
        let s1 = gfa.add_line("S\t1\t*").unwrap();
        assert!(!gfa.segment("1").unwrap().is_virtual());
        assert!(gfa.segment("2").unwrap().is_virtual());
        let from = gfa.try_line(link).unwrap().try_get("from_segment").unwrap().clone();
        assert_eq!(from, Value::Line(s1));
        let s2 = gfa.add_line("S\t2\t*").unwrap();
        assert_eq!(gfa.try_line(link).unwrap().try_get("to_segment").unwrap(), &Value::Line(s2));
        assert_eq!(gfa.segment("2").unwrap().dovetails_of_end(EndType::R), &[link]);
        assert!(gfa.virtual_lines().is_empty());
    }

    #[test]
    fn test_virtual_link_replaced_by_complement() {
        let mut gfa = Gfa::new();
        gfa.add_line("S\t1\t*").unwrap();
        gfa.add_line("S\t2\t*").unwrap();
        let path = gfa.add_line("P\tp\t1+,2+\t4M").unwrap();
        let links = gfa.virtual_lines();
        assert_eq!(links.len(), 1);
        let link = gfa.add_line("L\t2\t-\t1\t-\t4M").unwrap();
        assert!(gfa.virtual_lines().is_empty());
        let steps = gfa.try_line(path).unwrap().path_links.clone();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].id(), Some(link));
        assert_eq!(steps[0].orient, Orientation::Reverse);
        assert_eq!(gfa.try_line(link).unwrap().paths(), &[path]);
    }
}
