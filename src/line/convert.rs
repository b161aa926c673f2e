//! Conversion of single lines between GFA1 and GFA2

use super::alignment_type::{AlignmentType, SubstringType};
use super::kind::LineKind;
use super::Line;
use crate::error::{GfaError, Result};
use crate::value::{Alignment, Detached, LastPos, LineRef, NameResolver, OrientedLine, Value};
use crate::version::Version;

/// Graph information needed by conversions: names of referenced lines and
/// lengths of referenced segments.
pub trait ConversionContext: NameResolver {
    fn segment_length(&self, segment: &LineRef) -> Result<u64>;

    fn as_resolver(&self) -> &dyn NameResolver;
}

impl ConversionContext for Detached {
    fn as_resolver(&self) -> &dyn NameResolver {
        self
    }

    fn segment_length(&self, segment: &LineRef) -> Result<u64> {
        Err(GfaError::Runtime(format!(
            "the length of segment {} is needed but the line is not connected to a graph",
            segment.name().unwrap_or("?")
        )))
    }
}

fn ref_name(ctx: &dyn ConversionContext, line: &LineRef) -> Result<String> {
    match line {
        LineRef::Name(name) => Ok(name.clone()),
        LineRef::Line(id) => ctx.line_name(*id).ok_or_else(|| {
            GfaError::Runtime(format!("referenced line {} has no name in this graph", id))
        }),
    }
}

fn oriented_name(ctx: &dyn ConversionContext, ol: &OrientedLine) -> Result<String> {
    Ok(format!("{}{}", ref_name(ctx, &ol.line)?, ol.orient))
}

/// `value`, with `$` if it is the segment length.
fn position(value: u64, length: u64) -> String {
    LastPos::new(value, value == length).to_string()
}

impl Line {
    /// GFA1 form of a detached line.
    pub fn to_gfa1(&self) -> Result<Line> {
        self.to_version_in(Version::Gfa1, &Detached)
    }

    /// GFA2 form of a detached line.
    pub fn to_gfa2(&self) -> Result<Line> {
        self.to_version_in(Version::Gfa2, &Detached)
    }

    /// Detached copy of the line in `version`, with references by name.
    pub fn to_version_in(&self, version: Version, ctx: &dyn ConversionContext) -> Result<Line> {
        let fields = self.converted_fields(version, ctx)?;
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        Line::from_fields(&fields, Some(version), self.vlevel)
    }

    fn tag_strings(&self, ctx: &dyn ConversionContext, skip: &[&str]) -> Result<Vec<String>> {
        self.tags
            .iter()
            .filter(|t| !skip.contains(&t.name.as_str()))
            .map(|t| self.field_to_s_in(&t.name, ctx.as_resolver(), true))
            .collect()
    }

    fn converted_fields(&self, version: Version, ctx: &dyn ConversionContext) -> Result<Vec<String>> {
        match (self.kind(), version) {
            (LineKind::Header, _) => Ok(self
                .to_list_in(ctx.as_resolver())?
                .into_iter()
                .map(|f| {
                    if f.starts_with("VN:Z:") {
                        format!("VN:Z:{}", version.header_value())
                    } else {
                        f
                    }
                })
                .collect()),
            (LineKind::Comment, _) => self.to_list_in(ctx.as_resolver()),
            _ if self.version() == Some(version) => self.to_list_in(ctx.as_resolver()),
            (LineKind::SegmentGfa1, Version::Gfa2) => self.segment_to_gfa2(ctx),
            (LineKind::Link, Version::Gfa2) => self.link_to_edge(ctx),
            (LineKind::Containment, Version::Gfa2) => self.containment_to_edge(ctx),
            (LineKind::Path, Version::Gfa2) => self.path_to_group(ctx),
            (LineKind::SegmentGfa2, Version::Gfa1) => self.segment_to_gfa1(ctx),
            (LineKind::Edge, Version::Gfa1) => self.edge_to_gfa1(ctx),
            (LineKind::OrderedGroup, Version::Gfa1) => Err(GfaError::Runtime(
                "ordered groups are converted to paths through their graph".to_string(),
            )),
            _ => Err(GfaError::Value(format!(
                "{} lines have no {} equivalent: {}",
                self.record_type,
                version,
                self.to_string_in(ctx.as_resolver()).unwrap_or_else(|_| self.to_string())
            ))),
        }
    }

    fn segment_to_gfa2(&self, ctx: &dyn ConversionContext) -> Result<Vec<String>> {
        let length = self.length()?.ok_or_else(|| {
            GfaError::Value(format!(
                "segment {} has neither a sequence nor an LN tag; its length is unknown",
                self.name().unwrap_or("?")
            ))
        })?;
        let mut fields = vec![
            "S".to_string(),
            self.field_to_s_in("name", ctx.as_resolver(), false)?,
            length.to_string(),
            self.field_to_s_in("sequence", ctx.as_resolver(), false)?,
        ];
        fields.extend(self.tag_strings(ctx, &["LN"])?);
        Ok(fields)
    }

    fn segment_to_gfa1(&self, ctx: &dyn ConversionContext) -> Result<Vec<String>> {
        let mut fields = vec![
            "S".to_string(),
            self.field_to_s_in("sid", ctx.as_resolver(), false)?,
            self.field_to_s_in("sequence", ctx.as_resolver(), false)?,
        ];
        fields.extend(self.tag_strings(ctx, &["LN"])?);
        fields.push(format!("LN:i:{}", self.field_to_s_in("slen", ctx.as_resolver(), false)?));
        Ok(fields)
    }

    fn edge_id(&self) -> Result<String> {
        Ok(match self.get("ID")? {
            Some(Value::String(id)) => id.clone(),
            _ => "*".to_string(),
        })
    }

    fn link_to_edge(&self, ctx: &dyn ConversionContext) -> Result<Vec<String>> {
        let from = self.oriented_from()?;
        let to = self.oriented_to()?;
        let len1 = ctx.segment_length(&from.line)?;
        let len2 = ctx.segment_length(&to.line)?;
        let alignment = self.alignment()?;
        let (ref_len, query_len) = match &alignment {
            Alignment::Cigar(cigar) => (cigar.length_on_reference(), cigar.length_on_query()),
            _ => (0, 0),
        };
        if ref_len > len1 || query_len > len2 {
            return Err(GfaError::Inconsistency(format!(
                "overlap {} is longer than the linked segments ({} and {})",
                alignment, len1, len2
            )));
        }
        let (beg1, end1) = if from.orient.is_forward() {
            (len1 - ref_len, len1)
        } else {
            (0, ref_len)
        };
        let (beg2, end2) = if to.orient.is_forward() {
            (0, query_len)
        } else {
            (len2 - query_len, len2)
        };
        let mut fields = vec![
            "E".to_string(),
            self.edge_id()?,
            oriented_name(ctx, &from)?,
            oriented_name(ctx, &to)?,
            position(beg1, len1),
            position(end1, len1),
            position(beg2, len2),
            position(end2, len2),
            alignment.to_string(),
        ];
        fields.extend(self.tag_strings(ctx, &["ID"])?);
        Ok(fields)
    }

    fn containment_to_edge(&self, ctx: &dyn ConversionContext) -> Result<Vec<String>> {
        let container = self.oriented_from()?;
        let contained = self.oriented_to()?;
        let len1 = ctx.segment_length(&container.line)?;
        let len2 = ctx.segment_length(&contained.line)?;
        let pos = match self.try_get("pos")? {
            Value::Int(pos) if *pos >= 0 => *pos as u64,
            other => {
                return Err(GfaError::Type(format!(
                    "containment position {} is not a non-negative integer",
                    other
                )))
            }
        };
        let alignment = self.alignment()?;
        let ref_len = match &alignment {
            Alignment::Cigar(cigar) => cigar.length_on_reference(),
            _ => len2,
        };
        let mut fields = vec![
            "E".to_string(),
            self.edge_id()?,
            oriented_name(ctx, &container)?,
            oriented_name(ctx, &contained)?,
            position(pos, len1),
            position(pos + ref_len, len1),
            position(0, len2),
            position(len2, len2),
            alignment.to_string(),
        ];
        fields.extend(self.tag_strings(ctx, &["ID"])?);
        Ok(fields)
    }

    fn path_to_group(&self, ctx: &dyn ConversionContext) -> Result<Vec<String>> {
        let segments = self.try_get("segment_names")?.resolved(ctx.as_resolver())?;
        let items: Vec<String> = segments
            .as_list()
            .ok_or_else(|| GfaError::Type("path segment names are not a list".to_string()))?
            .iter()
            .map(Value::to_string)
            .collect();
        let mut fields = vec![
            "O".to_string(),
            self.field_to_s_in("path_name", ctx.as_resolver(), false)?,
            items.join(" "),
        ];
        fields.extend(self.tag_strings(ctx, &[])?);
        Ok(fields)
    }

    fn edge_to_gfa1(&self, ctx: &dyn ConversionContext) -> Result<Vec<String>> {
        let (st1, st2) = self.edge_side_types()?;
        let sid1 = self.sid1()?;
        let sid2 = self.sid2()?;
        let alignment = match self.alignment()? {
            Alignment::Cigar(cigar) => Alignment::Cigar(cigar),
            _ => Alignment::Placeholder,
        };
        let mut fields = match AlignmentType::classify(st1, sid1.orient, st2, sid2.orient) {
            AlignmentType::Internal => {
                return Err(GfaError::Value(format!(
                    "internal alignments cannot be expressed in GFA1: {}",
                    self.to_string_in(ctx.as_resolver()).unwrap_or_else(|_| self.to_string())
                )))
            }
            AlignmentType::Dovetail => {
                let (o1, o2, alignment) = if (st1 == SubstringType::Sfx) == sid1.orient.is_forward() {
                    (sid1.orient, sid2.orient, alignment)
                } else {
                    (sid1.orient.invert(), sid2.orient.invert(), alignment.complement())
                };
                vec![
                    "L".to_string(),
                    ref_name(ctx, &sid1.line)?,
                    o1.to_string(),
                    ref_name(ctx, &sid2.line)?,
                    o2.to_string(),
                    alignment.to_string(),
                ]
            }
            AlignmentType::Containment => {
                let [beg1, _, beg2, _] = self.edge_positions()?;
                let (container, contained, pos, alignment) = if st1 == SubstringType::Whole {
                    let swapped = match alignment {
                        Alignment::Cigar(cigar) => Alignment::Cigar(cigar.swap_roles()),
                        other => other,
                    };
                    (sid2, sid1, beg2, swapped)
                } else {
                    (sid1, sid2, beg1, alignment)
                };
                vec![
                    "C".to_string(),
                    ref_name(ctx, &container.line)?,
                    container.orient.to_string(),
                    ref_name(ctx, &contained.line)?,
                    contained.orient.to_string(),
                    pos.value.to_string(),
                    alignment.to_string(),
                ]
            }
        };
        if let Some(Value::String(eid)) = self.get("eid")? {
            if self.get("ID")?.is_none() {
                fields.push(format!("ID:Z:{}", eid));
            }
        }
        fields.extend(self.tag_strings(ctx, &[])?);
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Lengths(Vec<(&'static str, u64)>);

    impl NameResolver for Lengths {
        fn line_name(&self, _id: crate::gfa::LineId) -> Option<String> {
            None
        }
    }

    impl ConversionContext for Lengths {
        fn as_resolver(&self) -> &dyn NameResolver {
            self
        }

        fn segment_length(&self, segment: &LineRef) -> Result<u64> {
            self.0
                .iter()
                .find(|(name, _)| Some(*name) == segment.name())
                .map(|(_, len)| *len)
                .ok_or_else(|| GfaError::NotFound("segment".to_string()))
        }
    }

    #[test]
    fn test_edge_to_link() {
        let edge: Line = "E\t*\t1+\t2+\t90\t100$\t0\t10\t10M".parse().unwrap();
        assert_eq!(edge.to_gfa1().unwrap().to_string(), "L\t1\t+\t2\t+\t10M");
    }

    #[test]
    fn test_reversed_edge_to_link() {
        let edge: Line = "E\te\t1+\t2+\t0\t10\t90\t100$\t2M1D8M".parse().unwrap();
        assert_eq!(
            edge.to_gfa1().unwrap().to_string(),
            "L\t1\t-\t2\t-\t8M1I2M\tID:Z:e"
        );
    }

    #[test]
    fn test_edge_to_containment() {
        let edge: Line = "E\t*\t1+\t2-\t10\t20\t0\t10$\t10M".parse().unwrap();
        assert_eq!(edge.to_gfa1().unwrap().to_string(), "C\t1\t+\t2\t-\t10\t10M");
    }

    #[test]
    fn test_internal_edge_has_no_gfa1_form() {
        let edge: Line = "E\t*\t1+\t2+\t10\t20\t10\t20\t10M".parse().unwrap();
        assert_eq!(edge.to_gfa1().unwrap_err().kind(), ErrorKind::Value);
    }

    #[test]
    fn test_link_needs_graph_context() {
        let link: Line = "L\t1\t+\t2\t-\t10M".parse().unwrap();
        assert_eq!(link.to_gfa2().unwrap_err().kind(), ErrorKind::Runtime);
        let ctx = Lengths(vec![("1", 100), ("2", 50)]);
        let edge = link.to_version_in(Version::Gfa2, &ctx).unwrap();
        assert_eq!(edge.to_string(), "E\t*\t1+\t2-\t90\t100$\t40\t50$\t10M");
    }

    #[test]
    fn test_containment_to_edge() {
        let c: Line = "C\t1\t+\t2\t+\t10\t5M".parse().unwrap();
        let ctx = Lengths(vec![("1", 100), ("2", 5)]);
        let edge = c.to_version_in(Version::Gfa2, &ctx).unwrap();
        assert_eq!(edge.to_string(), "E\t*\t1+\t2+\t10\t15\t0\t5$\t5M");
    }

    #[test]
    fn test_segment_conversions() {
        let s1: Line = "S\t1\tACGT\tRC:i:3".parse().unwrap();
        assert_eq!(s1.to_gfa2().unwrap().to_string(), "S\t1\t4\tACGT\tRC:i:3");
        let s2: Line = "S\t1\t4\t*".parse().unwrap();
        assert_eq!(s2.to_gfa1().unwrap().to_string(), "S\t1\t*\tLN:i:4");
        let unknown: Line = "S\t1\t*".parse().unwrap();
        assert_eq!(unknown.to_gfa2().unwrap_err().kind(), ErrorKind::Value);
    }

    #[test]
    fn test_path_to_group() {
        let p: Line = "P\tp1\t1+,2-\t*".parse().unwrap();
        assert_eq!(p.to_gfa2().unwrap().to_string(), "O\tp1\t1+ 2-");
    }

    #[test]
    fn test_gfa2_only_kinds() {
        let gap: Line = "G\t*\t1+\t2+\t10\t*".parse().unwrap();
        assert_eq!(gap.to_gfa1().unwrap_err().kind(), ErrorKind::Value);
    }
}
