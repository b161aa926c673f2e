//! GFA graph: owner of every line and of the indices over them
//!
//! A [`Gfa`] stores its lines in an arena and hands out [`LineId`]
//! handles. Adding a line resolves its references (creating virtual
//! placeholders for names not declared yet) and registers the line on
//! every line it references.
//!
//! ```
//! use gfakit::Gfa;
//!
//! let mut gfa = Gfa::new();
//! gfa.add_line("L\t1\t+\t2\t-\t10M").unwrap();
//! assert!(gfa.segment("2").unwrap().is_virtual());
//! gfa.add_line("S\t2\tACGT").unwrap();
//! assert!(!gfa.segment("2").unwrap().is_virtual());
//! ```

mod arena;
mod convert;
mod groups;
mod header;
mod io;
mod lookup;
mod validate;

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

pub use arena::LineId;
pub(crate) use arena::Arena;
pub use lookup::Selector;

use crate::config::GfaConfig;
use crate::error::{GfaError, Result};
use crate::line::convert::ConversionContext;
use crate::line::{Line, LineKind, RecordType};
use crate::value::{LineRef, NameResolver};
use crate::version::{ValidationLevel, Version};

/// A GFA1 or GFA2 graph
#[derive(Debug)]
pub struct Gfa {
    config: GfaConfig,
    version: Option<Version>,
    pub(crate) arena: Arena,
    header: LineId,
    /// Name index shared by every name-bearing record kind
    pub(crate) names: HashMap<String, LineId>,
    /// Lines by record type, in insertion order
    pub(crate) by_type: BTreeMap<RecordType, Vec<LineId>>,
}

impl Default for Gfa {
    fn default() -> Self {
        Self::new()
    }
}

impl Gfa {
    pub fn new() -> Self {
        Self::with_config(GfaConfig::default())
    }

    pub fn with_config(config: GfaConfig) -> Self {
        let mut arena = Arena::default();
        let header = arena.insert(Line::empty_header(config.vlevel));
        Self {
            version: config.version,
            config,
            arena,
            header,
            names: HashMap::new(),
            by_type: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &GfaConfig {
        &self.config
    }

    /// Version of the graph; `None` until fixed by the configuration, the
    /// header or the first version-specific line.
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    pub fn vlevel(&self) -> ValidationLevel {
        self.config.vlevel
    }

    pub(crate) fn set_version(&mut self, version: Version) -> Result<()> {
        match self.version {
            Some(current) if current != version => Err(GfaError::Version(format!(
                "a {} line or header cannot be added to a {} graph",
                version, current
            ))),
            Some(_) => Ok(()),
            None => {
                debug!(%version, "graph version fixed");
                self.version = Some(version);
                Ok(())
            }
        }
    }

    /// Parse one line of GFA text and add it to the graph.
    ///
    /// Header lines are merged into the single graph header, whose handle
    /// is returned.
    pub fn add_line(&mut self, text: &str) -> Result<LineId> {
        let line = Line::parse(text, self.version, self.config.vlevel)?;
        self.add(line)
    }

    /// Add a detached line to the graph.
    pub fn add(&mut self, line: Line) -> Result<LineId> {
        if line.is_connected() {
            return Err(GfaError::Runtime(format!(
                "{} line is already connected to a graph",
                line.record_type()
            )));
        }
        match line.kind() {
            LineKind::Header => {
                self.merge_header(line)?;
                return Ok(self.header);
            }
            LineKind::Comment => {}
            _ => {
                if let Some(version) = line.version() {
                    self.set_version(version)?;
                }
            }
        }
        self.connect(line)
    }

    /// Number of lines, the header and virtual lines included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 1 && self.by_type.values().all(Vec::is_empty)
    }

    pub(crate) fn header_id(&self) -> LineId {
        self.header
    }

    /// Put a newly stored line in the name and record type indices.
    pub(crate) fn index_line(&mut self, id: LineId) -> Result<()> {
        let line = self.try_line(id)?;
        let name = line.name().map(str::to_string);
        let record_type = line.record_type().clone();
        if let Some(name) = name {
            self.names.insert(name, id);
        }
        self.by_type.entry(record_type).or_default().push(id);
        Ok(())
    }

    /// Remove a line from the indices and the arena.
    pub(crate) fn unindex_line(&mut self, id: LineId) -> Result<Line> {
        let line = self.arena.remove(id).ok_or_else(|| stale(id))?;
        if let Some(name) = line.name() {
            if self.names.get(name) == Some(&id) {
                self.names.remove(name);
            }
        }
        if let Some(ids) = self.by_type.get_mut(line.record_type()) {
            ids.retain(|other| *other != id);
        }
        Ok(line)
    }
}

/// Error for a handle whose line is no longer in the graph.
pub(crate) fn stale(id: LineId) -> GfaError {
    GfaError::Runtime(format!(
        "line {} is not connected to this graph (disconnected or replaced)",
        id
    ))
}

impl NameResolver for Gfa {
    fn line_name(&self, id: LineId) -> Option<String> {
        self.arena.get(id)?.name().map(str::to_string)
    }
}

impl ConversionContext for Gfa {
    fn segment_length(&self, segment: &LineRef) -> Result<u64> {
        let line = match segment {
            LineRef::Line(id) => self.try_line(*id)?,
            LineRef::Name(name) => self.try_get_segment(name)?,
        };
        line.length()?.ok_or_else(|| {
            GfaError::Value(format!(
                "the length of segment {} is unknown",
                line.name().unwrap_or("?")
            ))
        })
    }

    fn as_resolver(&self) -> &dyn NameResolver {
        self
    }
}
