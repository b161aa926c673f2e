//! Command-line interface for gfakit

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::GfaConfig;
use crate::gfa::Gfa;
use crate::stats::GfaStats;
use crate::version::{ValidationLevel, Version};

/// gfakit - parse, validate, edit and convert GFA1/GFA2 graphs
#[derive(Parser)]
#[command(name = "gfakit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: GraphOptions,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Settings used when reading the input graph
#[derive(Args, Debug, Default)]
pub struct GraphOptions {
    /// JSON configuration file; explicit flags take precedence
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Validation level (0-3)
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub vlevel: Option<u8>,

    /// Expected GFA version (gfa1 or gfa2) instead of inferring it
    #[arg(long, global = true)]
    pub gfa_version: Option<Version>,

    /// Reject references to segments not defined yet
    #[arg(long, global = true)]
    pub segments_first: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Display statistics about a GFA file
    Stats {
        /// Path to the GFA file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a GFA file
    Validate {
        /// Path to the GFA file
        #[arg(short, long)]
        input: PathBuf,

        /// Show every invalid line instead of the first few
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert a GFA file to the other version
    Convert {
        /// Path to the GFA file
        #[arg(short, long)]
        input: PathBuf,

        /// Target version (gfa1 or gfa2)
        #[arg(long)]
        to: Version,

        /// Output file, gzip-compressed for `.gz` (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge every linear path into a single segment
    MergeLinear {
        /// Path to the GFA file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file, gzip-compressed for `.gz` (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl GraphOptions {
    /// Configuration from the `--config` file, overridden by explicit flags.
    pub fn resolve(&self) -> anyhow::Result<GfaConfig> {
        let mut config = match &self.config {
            Some(path) => GfaConfig::from_json_file(path)
                .with_context(|| format!("cannot load configuration {}", path.display()))?,
            None => GfaConfig::default(),
        };
        if let Some(level) = self.vlevel {
            config.vlevel = ValidationLevel::try_from(level)?;
        }
        if let Some(version) = self.gfa_version {
            config.version = Some(version);
        }
        if self.segments_first {
            config.segments_first = true;
        }
        Ok(config)
    }
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.options.resolve()?;

    match cli.command {
        Commands::Stats {
            input,
            format,
            output,
        } => cmd_stats(&input, config, &format, output.as_deref()),
        Commands::Validate { input, verbose } => cmd_validate(&input, config, verbose),
        Commands::Convert { input, to, output } => {
            cmd_convert(&input, config, to, output.as_deref())
        }
        Commands::MergeLinear { input, output } => {
            cmd_merge_linear(&input, config, output.as_deref())
        }
    }
}

fn create_spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn load_graph(input: &Path, config: GfaConfig, spinner: &ProgressBar) -> anyhow::Result<Gfa> {
    let start = Instant::now();
    let result = Gfa::from_file_with_config(input, config);
    if result.is_err() {
        spinner.finish_and_clear();
    }
    let graph = result.with_context(|| format!("cannot read {}", input.display()))?;
    info!(
        path = %input.display(),
        lines = graph.len(),
        elapsed = ?start.elapsed(),
        "graph loaded"
    );
    Ok(graph)
}

fn write_graph(graph: &Gfa, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            graph
                .to_file(path)
                .with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!("Graph written to: {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            graph.write_to(stdout.lock())?;
        }
    }
    Ok(())
}

fn cmd_stats(
    input: &Path,
    config: GfaConfig,
    format: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let spinner = create_spinner("Reading GFA file...")?;
    let start = Instant::now();

    let graph = load_graph(input, config, &spinner)?;
    spinner.set_message("Computing statistics...");

    let stats = GfaStats::from_graph(&graph);
    spinner.finish_with_message(format!("Done in {:.2?}", start.elapsed()));
    let stats = stats?;

    let output_text = match format.to_lowercase().as_str() {
        "json" => stats.to_json()?,
        "text" => stats.format_summary(),
        other => bail!("unknown output format {}, expected text or json", other),
    };

    if let Some(output_path) = output {
        std::fs::write(output_path, &output_text)?;
        println!("Statistics written to: {}", output_path.display());
    } else {
        println!("{}", output_text);
    }

    Ok(())
}

fn cmd_validate(input: &Path, config: GfaConfig, verbose: bool) -> anyhow::Result<()> {
    let spinner = create_spinner("Validating GFA file...")?;
    let start = Instant::now();

    let graph = load_graph(input, config, &spinner)?;
    let invalid = graph.invalid_lines();
    spinner.finish_with_message(format!("File checked in {:.2?}", start.elapsed()));

    let mut out = std::io::stdout().lock();
    writeln!(out, "\n=== Validation Results ===\n")?;
    writeln!(out, "Segments: {}", graph.segments().len())?;
    writeln!(out, "Edges: {}", graph.edges().len())?;
    writeln!(out, "Paths: {}", graph.paths().len() + graph.ordered_groups().len())?;
    writeln!(out)?;

    if invalid.is_empty() {
        writeln!(out, "✓ Validation passed")?;
        return Ok(());
    }

    let shown = if verbose { invalid.len() } else { invalid.len().min(5) };
    writeln!(out, "Errors ({}):", invalid.len())?;
    for (_, err) in invalid.iter().take(shown) {
        writeln!(out, "  ✗ {}", err)?;
    }
    if invalid.len() > shown {
        writeln!(out, "  ... and {} more errors", invalid.len() - shown)?;
    }
    bail!("validation failed with {} errors", invalid.len())
}

fn cmd_convert(
    input: &Path,
    config: GfaConfig,
    to: Version,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let spinner = create_spinner("Reading GFA file...")?;
    let start = Instant::now();

    let graph = load_graph(input, config, &spinner)?;
    spinner.set_message(format!("Converting to {}...", to));
    let converted = graph.to_version(to);
    spinner.finish_with_message(format!("Converted in {:.2?}", start.elapsed()));

    write_graph(&converted?, output)
}

fn cmd_merge_linear(input: &Path, config: GfaConfig, output: Option<&Path>) -> anyhow::Result<()> {
    let spinner = create_spinner("Reading GFA file...")?;
    let start = Instant::now();

    let mut graph = load_graph(input, config, &spinner)?;
    spinner.set_message("Merging linear paths...");
    let merged = graph.merge_linear_paths();
    spinner.finish_with_message(format!("Done in {:.2?}", start.elapsed()));

    let merged = merged?;
    eprintln!("Merged {} linear paths", merged.len());
    write_graph(&graph, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parse_stats() {
        let cli = Cli::try_parse_from(["gfakit", "stats", "-i", "test.gfa"]).unwrap();
        match cli.command {
            Commands::Stats { input, format, .. } => {
                assert_eq!(input, PathBuf::from("test.gfa"));
                assert_eq!(format, "text");
            }
            _ => panic!("Expected Stats command"),
        }
    }

    #[test]
    fn test_cli_parse_convert() {
        let cli = Cli::try_parse_from([
            "gfakit", "convert", "-i", "test.gfa", "--to", "gfa2", "-o", "out.gfa",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert { input, to, output } => {
                assert_eq!(input, PathBuf::from("test.gfa"));
                assert_eq!(to, Version::Gfa2);
                assert_eq!(output, Some(PathBuf::from("out.gfa")));
            }
            _ => panic!("Expected Convert command"),
        }
        assert!(Cli::try_parse_from(["gfakit", "convert", "-i", "x", "--to", "gfa3"]).is_err());
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "gfakit",
            "merge-linear",
            "-i",
            "test.gfa",
            "--vlevel",
            "3",
            "--gfa-version",
            "gfa1",
            "--segments-first",
        ])
        .unwrap();
        let config = cli.options.resolve().unwrap();
        assert_eq!(config.vlevel, ValidationLevel::Always);
        assert_eq!(config.version, Some(Version::Gfa1));
        assert!(config.segments_first);
        assert!(Cli::try_parse_from(["gfakit", "validate", "-i", "x", "--vlevel", "4"]).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gfakit.json");
        std::fs::write(&path, r#"{"vlevel": 0, "version": "gfa2"}"#).unwrap();
        let options = GraphOptions {
            config: Some(path),
            vlevel: Some(2),
            ..Default::default()
        };
        let config = options.resolve().unwrap();
        assert_eq!(config.vlevel, ValidationLevel::OnOutput);
        assert_eq!(config.version, Some(Version::Gfa2));
        assert!(!config.segments_first);
    }

    #[test]
    fn test_missing_config_file() {
        let options = GraphOptions {
            config: Some(PathBuf::from("/nonexistent/gfakit.json")),
            ..Default::default()
        };
        assert!(options.resolve().is_err());
    }
}
