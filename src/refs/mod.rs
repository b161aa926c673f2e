//! References between the lines of a graph
//!
//! Connected lines hold [`crate::gfa::LineId`] handles in their reference
//! fields, and every referenced line lists its referrers in a
//! [`Backrefs`] table keyed by relation. This module keeps both sides in
//! step when lines are connected, substituted for virtual placeholders,
//! renamed or disconnected.

mod backrefs;
mod connect;
mod disconnect;
mod substitute;

pub use backrefs::{keys, Backrefs};

use tracing::debug;

use crate::error::{GfaError, Result};
use crate::gfa::{Gfa, LineId};
use crate::value::Value;

impl Gfa {
    /// Give a line a new name.
    ///
    /// Referencing lines hold the handle of the line, so their text
    /// follows the new name.
    pub fn rename(&mut self, id: LineId, new_name: &str) -> Result<()> {
        let line = self.try_line(id)?;
        let field = line.spec().name_field.clone().ok_or_else(|| {
            GfaError::Argument(format!("{} lines have no name", line.record_type()))
        })?;
        if line.is_virtual() {
            return Err(GfaError::Runtime(format!(
                "virtual line {} cannot be renamed",
                line.name().unwrap_or("?")
            )));
        }
        if let Some(&other) = self.names.get(new_name) {
            if other == id {
                return Ok(());
            }
            return Err(GfaError::NotUnique(format!(
                "name {} is already used by a {} line",
                new_name,
                self.try_line(other)?.record_type()
            )));
        }
        let old_name = line.name().map(str::to_string);
        self.arena
            .get_mut(id)
            .ok_or_else(|| crate::gfa::stale(id))?
            .set_internal(&field, Value::String(new_name.to_string()))?;
        if let Some(old_name) = &old_name {
            self.names.remove(old_name);
        }
        self.names.insert(new_name.to_string(), id);
        debug!(line = %id, old = ?old_name, new = new_name, "renamed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_rename_rewrites_references() {
        let mut gfa = Gfa::new();
        let s1 = gfa.add_line("S\t1\tACGT").unwrap();
        gfa.add_line("S\t2\tACGT").unwrap();
        let link = gfa.add_line("L\t1\t+\t2\t-\t*").unwrap();
        let path = gfa.add_line("P\tp1\t1+,2-\t*").unwrap();
        gfa.rename(s1, "first").unwrap();
        assert!(gfa.segment("1").is_none());
        assert_eq!(gfa.segment_id("first"), Some(s1));
        assert_eq!(gfa.line_to_string(link).unwrap(), "L\tfirst\t+\t2\t-\t*");
        assert_eq!(gfa.line_to_string(path).unwrap(), "P\tp1\tfirst+,2-\t*");
    }

    #[test]
    fn test_rename_collision() {
        let mut gfa = Gfa::new();
        let s1 = gfa.add_line("S\t1\t*").unwrap();
        gfa.add_line("S\t2\t*").unwrap();
        assert_eq!(gfa.rename(s1, "2").unwrap_err().kind(), ErrorKind::NotUnique);
        gfa.rename(s1, "1").unwrap();
        let link = gfa.add_line("L\t1\t+\t2\t-\t*").unwrap();
        assert_eq!(gfa.rename(link, "x").unwrap_err().kind(), ErrorKind::Argument);
    }

    #[test]
    fn test_name_field_is_linked_while_connected() {
        let mut gfa = Gfa::new();
        let s1 = gfa.add_line("S\t1\t*").unwrap();
        let line = gfa.get_mut(s1).unwrap();
        assert_eq!(line.set("name", "x").unwrap_err().kind(), ErrorKind::Runtime);
        line.set("LN", 10i64).unwrap();
    }
}
