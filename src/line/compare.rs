//! Line equality, differences and edit scripts

use super::kind::RecordType;
use super::Line;
use crate::error::{GfaError, Result};
use crate::field::Datatype;
use crate::value::{IdLabels, Value};
use crate::version::Version;

/// Which of two compared lines holds something
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// One difference between two lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diff {
    IncompatibleRecordType {
        left: RecordType,
        right: RecordType,
    },
    IncompatibleVersion {
        left: Option<Version>,
        right: Option<Version>,
    },
    DifferentPositional {
        field: String,
        left: String,
        right: String,
    },
    DifferentTag {
        tag: String,
        left_datatype: Datatype,
        left: String,
        right_datatype: Datatype,
        right: String,
    },
    /// Tag present on one side only
    ExclusiveTag {
        tag: String,
        side: Side,
        datatype: Datatype,
        value: String,
    },
}

/// One step of an edit script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    SetField { field: String, value: String },
    SetTag { tag: String, datatype: Datatype, value: String },
    DeleteTag { tag: String },
    SetDatatype { tag: String, datatype: Datatype },
}

impl Line {
    fn text_of(&self, name: &str) -> Result<String> {
        self.field_to_s_in(name, &IdLabels, false)
    }

    /// Differences between `self` (left) and `other` (right).
    pub fn diff(&self, other: &Line) -> Result<Vec<Diff>> {
        if self.record_type != other.record_type {
            return Ok(vec![Diff::IncompatibleRecordType {
                left: self.record_type.clone(),
                right: other.record_type.clone(),
            }]);
        }
        if self.version() != other.version() {
            return Ok(vec![Diff::IncompatibleVersion {
                left: self.version(),
                right: other.version(),
            }]);
        }
        let mut diffs = Vec::new();
        let left_names = self.positional_names();
        if left_names != other.positional_names() {
            return Ok(vec![Diff::IncompatibleRecordType {
                left: self.record_type.clone(),
                right: other.record_type.clone(),
            }]);
        }
        for name in &left_names {
            let left = self.text_of(name)?;
            let right = other.text_of(name)?;
            if left != right {
                diffs.push(Diff::DifferentPositional {
                    field: name.clone(),
                    left,
                    right,
                });
            }
        }
        for tag in &self.tags {
            let left = self.text_of(&tag.name)?;
            match other.field_datatype(&tag.name) {
                Some(right_datatype) => {
                    let right = other.text_of(&tag.name)?;
                    if left != right || tag.datatype != *right_datatype {
                        diffs.push(Diff::DifferentTag {
                            tag: tag.name.clone(),
                            left_datatype: tag.datatype.clone(),
                            left,
                            right_datatype: right_datatype.clone(),
                            right,
                        });
                    }
                }
                None => diffs.push(Diff::ExclusiveTag {
                    tag: tag.name.clone(),
                    side: Side::Left,
                    datatype: tag.datatype.clone(),
                    value: left,
                }),
            }
        }
        for tag in &other.tags {
            if self.field_datatype(&tag.name).is_none() {
                diffs.push(Diff::ExclusiveTag {
                    tag: tag.name.clone(),
                    side: Side::Right,
                    datatype: tag.datatype.clone(),
                    value: other.text_of(&tag.name)?,
                });
            }
        }
        Ok(diffs)
    }

    /// Edits turning `self` into `other`.
    ///
    /// Fails with an argument error if the lines have different record
    /// types or versions.
    pub fn diffscript(&self, other: &Line) -> Result<Vec<Edit>> {
        let mut edits = Vec::new();
        for diff in self.diff(other)? {
            match diff {
                Diff::IncompatibleRecordType { left, right } => {
                    return Err(GfaError::Argument(format!(
                        "a {} line cannot be edited into a {} line",
                        left, right
                    )))
                }
                Diff::IncompatibleVersion { left, right } => {
                    return Err(GfaError::Argument(format!(
                        "lines of versions {:?} and {:?} cannot be edited into each other",
                        left, right
                    )))
                }
                Diff::DifferentPositional { field, right, .. } => {
                    edits.push(Edit::SetField { field, value: right })
                }
                Diff::DifferentTag {
                    tag,
                    left,
                    right_datatype,
                    right,
                    ..
                } if left == right => edits.push(Edit::SetDatatype {
                    tag,
                    datatype: right_datatype,
                }),
                Diff::DifferentTag {
                    tag,
                    right_datatype,
                    right,
                    ..
                } => edits.push(Edit::SetTag {
                    tag,
                    datatype: right_datatype,
                    value: right,
                }),
                Diff::ExclusiveTag {
                    tag,
                    side: Side::Left,
                    ..
                } => edits.push(Edit::DeleteTag { tag }),
                Diff::ExclusiveTag {
                    tag,
                    side: Side::Right,
                    datatype,
                    value,
                } => edits.push(Edit::SetTag {
                    tag,
                    datatype,
                    value,
                }),
            }
        }
        Ok(edits)
    }

    pub fn apply_edits(&mut self, edits: &[Edit]) -> Result<()> {
        for edit in edits {
            match edit {
                Edit::SetField { field, value } => self.set(field, Value::String(value.clone()))?,
                Edit::SetTag {
                    tag,
                    datatype,
                    value,
                } => self.set_with_datatype(tag, Value::String(value.clone()), datatype.clone())?,
                Edit::DeleteTag { tag } => {
                    self.delete(tag)?;
                }
                Edit::SetDatatype { tag, datatype } => self.set_datatype(tag, datatype.clone())?,
            }
        }
        Ok(())
    }
}

impl PartialEq for Line {
    /// Same record type, same fields and the same text for every field.
    fn eq(&self, other: &Line) -> bool {
        if self.record_type != other.record_type || self.is_virtual != other.is_virtual {
            return false;
        }
        let mut left = self.field_names();
        let mut right = other.field_names();
        left.sort();
        right.sort();
        if left != right {
            return false;
        }
        left.iter()
            .all(|name| match (self.text_of(name), other.text_of(name)) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_uses_text() {
        let a: Line = "S\t1\tACGT\tLN:i:4".parse().unwrap();
        let mut b: Line = "S\t1\t*\tLN:i:4".parse().unwrap();
        assert_ne!(a, b);
        b.set("sequence", "ACGT").unwrap();
        assert_eq!(a, b);
        let c: Line = "S\t1\tACGT".parse().unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_diff_entries() {
        let a: Line = "S\t1\tACGT\txx:i:1\tyy:Z:a".parse().unwrap();
        let b: Line = "S\t1\tACGA\txx:Z:1\tzz:i:2".parse().unwrap();
        let diffs = a.diff(&b).unwrap();
        assert!(diffs.contains(&Diff::DifferentPositional {
            field: "sequence".to_string(),
            left: "ACGT".to_string(),
            right: "ACGA".to_string(),
        }));
        assert!(diffs
            .iter()
            .any(|d| matches!(d, Diff::ExclusiveTag { tag, side: Side::Left, .. } if tag == "yy")));
        assert!(diffs
            .iter()
            .any(|d| matches!(d, Diff::ExclusiveTag { tag, side: Side::Right, .. } if tag == "zz")));
        let link: Line = "L\t1\t+\t2\t+\t*".parse().unwrap();
        assert!(matches!(
            a.diff(&link).unwrap()[0],
            Diff::IncompatibleRecordType { .. }
        ));
    }

    #[test]
    fn test_diffscript_replays() {
        let mut a: Line = "S\t1\tACGT\txx:i:1\tyy:Z:a".parse().unwrap();
        let b: Line = "S\t1\tACGA\txx:Z:1\tzz:i:2".parse().unwrap();
        let script = a.diffscript(&b).unwrap();
        assert!(script.contains(&Edit::SetDatatype {
            tag: "xx".to_string(),
            datatype: Datatype::Z
        }));
        a.apply_edits(&script).unwrap();
        assert_eq!(a, b);
        assert!(a.diff(&b).unwrap().is_empty());
    }

    #[test]
    fn test_incompatible_diffscript() {
        let s1: Line = "S\t1\t*".parse().unwrap();
        let s2: Line = "S\t1\t0\t*".parse().unwrap();
        assert!(s1.diffscript(&s2).is_err());
    }
}
