//! Graph operations built on the reference manager: connectivity
//! queries and linear path merging.

mod linear_paths;
mod topology;

pub use linear_paths::reverse_complement;
