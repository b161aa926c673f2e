//! The graph header

use super::Gfa;
use crate::error::{GfaError, Result};
use crate::line::Line;
use crate::version::Version;

impl Gfa {
    /// The header line, holding the tags of every merged `H` line.
    pub fn header(&self) -> Result<&Line> {
        self.arena
            .get(self.header_id())
            .ok_or_else(|| GfaError::Assertion("graph has no header line".to_string()))
    }

    pub fn header_mut(&mut self) -> Result<&mut Line> {
        let id = self.header_id();
        self.arena
            .get_mut(id)
            .ok_or_else(|| GfaError::Assertion("graph has no header line".to_string()))
    }

    /// Merge the tags of a header line into the graph header.
    ///
    /// `VN` fixes the graph version; `VN` and `TS` may repeat only with
    /// the same value.
    pub(crate) fn merge_header(&mut self, line: Line) -> Result<()> {
        for (name, datatype, value) in line.tag_entries()? {
            let version = match (name.as_str(), value.as_str()) {
                ("VN", Some(vn)) => Some(Version::from_header_value(vn)?),
                _ => None,
            };
            self.header_mut()?.merge_header_tag(&name, datatype, value)?;
            if let Some(version) = version {
                self.set_version(version)?;
            }
        }
        Ok(())
    }

    /// GFA text of the header: one `H` line with every tag, then one
    /// more `H` line per extra value of a multi-valued tag.
    pub fn headers(&self) -> Result<Vec<String>> {
        let header = self.header()?;
        let mut first = vec!["H".to_string()];
        let mut extra = Vec::new();
        for name in header.tag_names() {
            let text = header.field_to_s_in(name, self, true)?;
            let mut parts = text.split('\t');
            first.extend(parts.next().map(str::to_string));
            extra.extend(parts.map(|p| format!("H\t{}", p)));
        }
        if first.len() == 1 {
            return Ok(extra);
        }
        let mut lines = vec![first.join("\t")];
        lines.extend(extra);
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value::Value;

    #[test]
    fn test_header_merging() {
        let mut gfa = Gfa::new();
        gfa.add_line("H\tVN:Z:1.0\txx:i:1").unwrap();
        gfa.add_line("H\txx:i:2\tyy:Z:a").unwrap();
        gfa.add_line("H\tVN:Z:1.0").unwrap();
        assert_eq!(gfa.version(), Some(Version::Gfa1));
        let header = gfa.header().unwrap();
        assert!(matches!(header.get("xx").unwrap(), Some(Value::FieldArray(a)) if a.len() == 2));
        assert_eq!(
            gfa.headers().unwrap(),
            vec!["H\tVN:Z:1.0\txx:i:1\tyy:Z:a", "H\txx:i:2"]
        );
    }

    #[test]
    fn test_conflicting_single_definition_tags() {
        let mut gfa = Gfa::new();
        gfa.add_line("H\tVN:Z:1.0").unwrap();
        assert_eq!(
            gfa.add_line("H\tVN:Z:2.0").unwrap_err().kind(),
            ErrorKind::Inconsistency
        );
        gfa.add_line("H\tTS:i:100").unwrap();
        assert_eq!(
            gfa.add_line("H\tTS:i:50").unwrap_err().kind(),
            ErrorKind::Inconsistency
        );
    }

    #[test]
    fn test_header_version_against_lines() {
        let mut gfa = Gfa::new();
        gfa.add_line("S\t1\t*").unwrap();
        assert_eq!(gfa.add_line("H\tVN:Z:2.0").unwrap_err().kind(), ErrorKind::Version);
    }

    #[test]
    fn test_empty_header_is_not_written() {
        let gfa = Gfa::new();
        assert!(gfa.headers().unwrap().is_empty());
    }
}
