//! Reading and writing GFA text

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use super::Gfa;
use crate::config::GfaConfig;
use crate::error::{GfaError, Result};
use crate::line::Line;

fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Buffered reader over a GFA file, decompressing `.gz` files.
pub fn open_gfa_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GfaError::NotFound(format!(
            "file {} does not exist",
            path.display()
        )));
    }
    let file = File::open(path)?;
    if is_gz(path) {
        return Ok(Box::new(BufReader::new(GzDecoder::new(file))));
    }
    Ok(Box::new(BufReader::new(file)))
}

impl Gfa {
    /// Parse GFA from a buffered reader
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        Self::parse_with_config(reader, GfaConfig::default())
    }

    pub fn parse_with_config<R: BufRead>(reader: R, config: GfaConfig) -> Result<Self> {
        let mut gfa = Gfa::with_config(config);
        gfa.read_from(reader)?;
        Ok(gfa)
    }

    /// Add every line of `reader` to the graph; errors carry the line number.
    pub fn read_from<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let mut added = 0usize;
        for (line_num, line_result) in reader.lines().enumerate() {
            let text = line_result.map_err(|e| GfaError::from(e).at_line(line_num + 1))?;
            if text.trim().is_empty() {
                continue;
            }
            self.add_line(&text).map_err(|e| e.at_line(line_num + 1))?;
            added += 1;
        }
        debug!(
            lines = added,
            segments = self.segments().len(),
            virtual_lines = self.virtual_lines().len(),
            "GFA read"
        );
        Ok(())
    }

    /// Parse a GFA file, gzipped or not
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_config(path, GfaConfig::default())
    }

    pub fn from_file_with_config<P: AsRef<Path>>(path: P, config: GfaConfig) -> Result<Self> {
        let reader = open_gfa_reader(path)?;
        Self::parse_with_config(reader, config)
    }

    /// Lines following the header in output order; virtual lines are not
    /// written.
    fn body_lines(&self) -> Vec<&Line> {
        let mut lines = self.segments();
        lines.extend(self.edges());
        lines.extend(self.fragments());
        lines.extend(self.gaps());
        lines.extend(self.paths());
        lines.extend(self.ordered_groups());
        lines.extend(self.sets());
        lines.extend(self.custom_records());
        lines
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for line in self.comments() {
            writeln!(writer, "{}", line.to_string_in(self)?)?;
        }
        for header in self.headers()? {
            writeln!(writer, "{}", header)?;
        }
        for line in self.body_lines() {
            writeln!(writer, "{}", line.to_string_in(self)?)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the graph to a file, gzip-compressed for a `.gz` path.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        if is_gz(path) {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            self.write_to(&mut encoder)?;
            encoder.finish()?.flush()?;
        } else {
            self.write_to(BufWriter::new(file))?;
        }
        debug!(path = %path.display(), "GFA written");
        Ok(())
    }

    pub fn to_gfa_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| GfaError::Assertion(format!("GFA output is not UTF-8: {}", e)))
    }
}

impl fmt::Display for Gfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_gfa_string().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Gfa {
    type Err = GfaError;

    fn from_str(s: &str) -> Result<Self> {
        Gfa::parse(Cursor::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::version::Version;
    use std::io::Read;
    use tempfile::tempdir;

    const GFA1: &str = "# assembly
H\tVN:Z:1.0
S\t1\tACGT
S\t2\tCGTA
P\tp1\t1+,2+\t2M
L\t1\t+\t2\t+\t2M
";

    #[test]
    fn test_parse_simple_gfa() {
        let gfa = Gfa::parse(Cursor::new(GFA1)).unwrap();
        assert_eq!(gfa.version(), Some(Version::Gfa1));
        assert_eq!(gfa.segments().len(), 2);
        assert_eq!(gfa.links().len(), 1);
        assert_eq!(gfa.paths().len(), 1);
        assert!(gfa.virtual_lines().is_empty());
    }

    #[test]
    fn test_output_order() {
        let gfa: Gfa = GFA1.parse().unwrap();
        assert_eq!(
            gfa.to_string(),
            "# assembly\nH\tVN:Z:1.0\nS\t1\tACGT\nS\t2\tCGTA\nL\t1\t+\t2\t+\t2M\nP\tp1\t1+,2+\t2M\n"
        );
    }

    #[test]
    fn test_virtual_lines_not_written() {
        let gfa: Gfa = "S\t1\t*\nL\t1\t+\t2\t-\t*\n".parse().unwrap();
        assert_eq!(gfa.to_string(), "S\t1\t*\nL\t1\t+\t2\t-\t*\n");
    }

    #[test]
    fn test_errors_carry_line_number() {
        let err = Gfa::parse(Cursor::new("S\t1\t*\n\nS\t1\t*\n")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotUnique);
        assert!(matches!(err, GfaError::AtLine { line: 3, .. }));
    }

    #[test]
    fn test_multivalued_header_written_on_several_lines() {
        let gfa: Gfa = "H\txx:i:1\nH\txx:i:2\tVN:Z:2.0\n".parse().unwrap();
        assert_eq!(gfa.to_string(), "H\txx:i:1\tVN:Z:2.0\nH\txx:i:2\n");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.gfa");
        let gfa: Gfa = GFA1.parse().unwrap();
        gfa.to_file(&path).unwrap();
        let reread = Gfa::from_file(&path).unwrap();
        assert_eq!(reread.to_string(), gfa.to_string());
    }

    #[test]
    fn test_gzip_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.gfa.gz");
        let gfa: Gfa = GFA1.parse().unwrap();
        gfa.to_file(&path).unwrap();
        let mut raw = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut raw).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        let reread = Gfa::from_file(&path).unwrap();
        assert_eq!(reread.to_string(), gfa.to_string());
    }

    #[test]
    fn test_missing_file() {
        let err = Gfa::from_file("/nonexistent/graph.gfa").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
