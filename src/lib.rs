//! gfakit - GFA graph toolkit
//!
//! A library for reading, validating, editing and converting GFA1 and GFA2
//! (Graphical Fragment Assembly) files.
//!
//! # Features
//!
//! - Typed parsing and formatting of every GFA1/GFA2 record and tag datatype
//! - Lines connected into a graph with references and backreferences kept
//!   consistent on every edit, including virtual placeholders for lines
//!   referenced before their definition
//! - Whole-graph validation and GFA1 <-> GFA2 conversion
//! - Topology queries, linear path merging and graph statistics
//!
//! # Example
//!
//! ```no_run
//! use gfakit::{Gfa, GfaStats, Version};
//!
//! // Parse a GFA file
//! let mut gfa = Gfa::from_file("example.gfa").unwrap();
//! gfa.validate().unwrap();
//!
//! // Edit it
//! gfa.add_line("S\tnew\tACGT").unwrap();
//! gfa.merge_linear_paths().unwrap();
//!
//! // Compute statistics
//! let stats = GfaStats::from_graph(&gfa).unwrap();
//! println!("{}", stats.format_summary());
//!
//! // Convert and write
//! gfa.to_version(Version::Gfa2).unwrap().to_file("example.gfa2").unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod field;
pub mod gfa;
pub mod line;
pub mod ops;
pub mod refs;
pub mod stats;
pub mod value;
pub mod version;

pub use config::GfaConfig;
pub use error::{ErrorKind, GfaError, Result};
pub use gfa::{Gfa, LineId, Selector};
pub use line::Line;
pub use stats::GfaStats;
pub use version::{ValidationLevel, Version};
