//! Classification of edges by the part of each segment they cover

use std::fmt;

use crate::refs::keys;
use crate::value::{EndType, LastPos, Orientation};

/// Part of a segment covered by one side of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstringType {
    Whole,
    /// Prefix: starts at the first position
    Pfx,
    /// Suffix: ends at the last position
    Sfx,
    Internal,
}

impl SubstringType {
    pub fn of(beg: LastPos, end: LastPos) -> Self {
        match (beg.is_first(), end.is_last()) {
            (true, true) => SubstringType::Whole,
            (true, false) => SubstringType::Pfx,
            (false, true) => SubstringType::Sfx,
            (false, false) => SubstringType::Internal,
        }
    }

    /// Segment end touched by a prefix or suffix alignment.
    pub fn end_type(&self) -> Option<EndType> {
        match self {
            SubstringType::Pfx => Some(EndType::L),
            SubstringType::Sfx => Some(EndType::R),
            _ => None,
        }
    }
}

impl fmt::Display for SubstringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubstringType::Whole => "whole",
            SubstringType::Pfx => "pfx",
            SubstringType::Sfx => "sfx",
            SubstringType::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignmentType {
    Dovetail,
    Containment,
    Internal,
}

impl AlignmentType {
    pub fn classify(
        st1: SubstringType,
        o1: Orientation,
        st2: SubstringType,
        o2: Orientation,
    ) -> Self {
        use SubstringType::*;
        match (st1, st2) {
            (Whole, _) | (_, Whole) => AlignmentType::Containment,
            (Pfx, Sfx) | (Sfx, Pfx) if o1 == o2 => AlignmentType::Dovetail,
            (Pfx, Pfx) | (Sfx, Sfx) if o1 != o2 => AlignmentType::Dovetail,
            _ => AlignmentType::Internal,
        }
    }
}

impl fmt::Display for AlignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlignmentType::Dovetail => "dovetail",
            AlignmentType::Containment => "containment",
            AlignmentType::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Backreference keys of the two segments of an edge.
pub(crate) fn edge_keys(
    st1: SubstringType,
    o1: Orientation,
    st2: SubstringType,
    o2: Orientation,
) -> (&'static str, &'static str) {
    let dovetail_key = |st: SubstringType| match st.end_type() {
        Some(EndType::L) => keys::DOVETAILS_L,
        _ => keys::DOVETAILS_R,
    };
    match AlignmentType::classify(st1, o1, st2, o2) {
        AlignmentType::Containment if st1 == SubstringType::Whole => {
            (keys::EDGES_TO_CONTAINERS, keys::EDGES_TO_CONTAINED)
        }
        AlignmentType::Containment => (keys::EDGES_TO_CONTAINED, keys::EDGES_TO_CONTAINERS),
        AlignmentType::Dovetail => (dovetail_key(st1), dovetail_key(st2)),
        AlignmentType::Internal => (keys::INTERNALS, keys::INTERNALS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Orientation::{Forward as F, Reverse as R};

    fn pos(value: u64, last: bool) -> LastPos {
        LastPos::new(value, last)
    }

    #[test]
    fn test_substring_types() {
        assert_eq!(SubstringType::of(pos(0, false), pos(100, true)), SubstringType::Whole);
        assert_eq!(SubstringType::of(pos(0, false), pos(10, false)), SubstringType::Pfx);
        assert_eq!(SubstringType::of(pos(90, false), pos(100, true)), SubstringType::Sfx);
        assert_eq!(SubstringType::of(pos(5, false), pos(10, false)), SubstringType::Internal);
    }

    #[test]
    fn test_classification() {
        use SubstringType::*;
        assert_eq!(AlignmentType::classify(Sfx, F, Pfx, F), AlignmentType::Dovetail);
        assert_eq!(AlignmentType::classify(Sfx, F, Sfx, R), AlignmentType::Dovetail);
        assert_eq!(AlignmentType::classify(Sfx, F, Sfx, F), AlignmentType::Internal);
        assert_eq!(AlignmentType::classify(Pfx, F, Whole, R), AlignmentType::Containment);
        assert_eq!(AlignmentType::classify(Internal, F, Pfx, F), AlignmentType::Internal);
    }

    #[test]
    fn test_edge_keys() {
        use SubstringType::*;
        assert_eq!(edge_keys(Sfx, F, Pfx, F), (keys::DOVETAILS_R, keys::DOVETAILS_L));
        assert_eq!(
            edge_keys(Internal, F, Whole, F),
            (keys::EDGES_TO_CONTAINED, keys::EDGES_TO_CONTAINERS)
        );
        assert_eq!(
            edge_keys(Whole, F, Whole, F),
            (keys::EDGES_TO_CONTAINERS, keys::EDGES_TO_CONTAINED)
        );
        assert_eq!(edge_keys(Pfx, F, Pfx, F), (keys::INTERNALS, keys::INTERNALS));
    }
}
