//! Statistics computation for GFA graphs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::gfa::Gfa;
use crate::line::{AlignmentType, LineKind};
use crate::value::EndType;

/// Statistics about a GFA graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GfaStats {
    /// Total number of segments (nodes)
    pub segment_count: usize,
    /// Dovetail overlaps: GFA1 links and GFA2 dovetail edges
    pub dovetail_count: usize,
    /// Containments: GFA1 containments and GFA2 containment edges
    pub containment_count: usize,
    /// GFA2 edges that are neither dovetails nor containments
    pub internal_edge_count: usize,
    /// Paths and ordered groups
    pub path_count: usize,
    pub fragment_count: usize,
    pub gap_count: usize,
    pub set_count: usize,
    /// Total sequence length across all segments
    pub total_sequence_length: u64,
    /// Segments whose length is neither given nor derivable
    pub segments_without_length: usize,
    pub average_segment_length: f64,
    pub min_segment_length: u64,
    pub max_segment_length: u64,
    /// N50 of segment lengths
    pub n50: u64,
    /// GC content percentage
    pub gc_content: f64,
    /// Number of connected components
    pub connected_components: usize,
    /// Average path length (in segments)
    pub average_path_length: f64,
    /// Total path length (sum of sequence lengths)
    pub total_path_sequence_length: u64,
    /// Segment length histogram (binned)
    pub segment_length_histogram: Vec<(String, usize)>,
    /// Number of segments per count of dovetails on their two ends
    pub dovetail_degree_distribution: BTreeMap<usize, usize>,
    /// Segment ends without any dovetail
    pub dead_ends: usize,
}

impl GfaStats {
    /// Compute statistics from a GFA graph
    pub fn from_graph(graph: &Gfa) -> Result<Self> {
        let segments = graph.segments();
        let mut segment_lengths = Vec::with_capacity(segments.len());
        let mut segments_without_length = 0;
        for segment in &segments {
            match segment.length()? {
                Some(length) => segment_lengths.push(length),
                None => segments_without_length += 1,
            }
        }
        let total_sequence_length = segment_lengths.iter().sum();

        let (min_segment_length, max_segment_length, average_segment_length) =
            match (segment_lengths.iter().min(), segment_lengths.iter().max()) {
                (Some(&min), Some(&max)) => {
                    let avg = total_sequence_length as f64 / segment_lengths.len() as f64;
                    (min, max, avg)
                }
                _ => (0, 0, 0.0),
            };

        let edges = graph.edges();
        let mut dovetail_count = 0;
        let mut containment_count = 0;
        let mut internal_edge_count = 0;
        for edge in &edges {
            match edge.alignment_type()? {
                AlignmentType::Dovetail => dovetail_count += 1,
                AlignmentType::Containment => containment_count += 1,
                AlignmentType::Internal => internal_edge_count += 1,
            }
        }

        let (average_path_length, total_path_sequence_length) = compute_path_stats(graph)?;
        let (dovetail_degree_distribution, dead_ends) = compute_degree_distribution(graph);

        Ok(GfaStats {
            segment_count: segments.len(),
            dovetail_count,
            containment_count,
            internal_edge_count,
            path_count: graph.paths().len() + graph.ordered_groups().len(),
            fragment_count: graph.fragments().len(),
            gap_count: graph.gaps().len(),
            set_count: graph.sets().len(),
            total_sequence_length,
            segments_without_length,
            average_segment_length,
            min_segment_length,
            max_segment_length,
            n50: compute_n50(&segment_lengths),
            gc_content: compute_gc_content(graph)?,
            connected_components: graph.connected_components()?.len(),
            average_path_length,
            total_path_sequence_length,
            segment_length_histogram: compute_length_histogram(&segment_lengths),
            dovetail_degree_distribution,
            dead_ends,
        })
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut output = String::new();
        output.push_str("=== GFA Graph Statistics ===\n\n");

        output.push_str(&format!(
            "Segments (nodes):        {:>12}\n",
            self.segment_count
        ));
        output.push_str(&format!(
            "Dovetails:               {:>12}\n",
            self.dovetail_count
        ));
        output.push_str(&format!(
            "Containments:            {:>12}\n",
            self.containment_count
        ));
        if self.internal_edge_count > 0 {
            output.push_str(&format!(
                "Internal edges:          {:>12}\n",
                self.internal_edge_count
            ));
        }
        output.push_str(&format!(
            "Paths:                   {:>12}\n",
            self.path_count
        ));
        for (label, count) in [
            ("Fragments:", self.fragment_count),
            ("Gaps:", self.gap_count),
            ("Sets:", self.set_count),
        ] {
            if count > 0 {
                output.push_str(&format!("{:<25}{:>12}\n", label, count));
            }
        }
        output.push_str(&format!(
            "Connected components:    {:>12}\n",
            self.connected_components
        ));
        output.push_str(&format!("Dead ends:               {:>12}\n", self.dead_ends));
        output.push('\n');

        output.push_str("--- Sequence Statistics ---\n");
        output.push_str(&format!(
            "Total sequence length:   {:>12} bp\n",
            self.total_sequence_length
        ));
        output.push_str(&format!(
            "Average segment length:  {:>12.2} bp\n",
            self.average_segment_length
        ));
        output.push_str(&format!(
            "Min segment length:      {:>12} bp\n",
            self.min_segment_length
        ));
        output.push_str(&format!(
            "Max segment length:      {:>12} bp\n",
            self.max_segment_length
        ));
        output.push_str(&format!("N50:                     {:>12} bp\n", self.n50));
        output.push_str(&format!(
            "GC content:              {:>12.2}%\n",
            self.gc_content
        ));
        if self.segments_without_length > 0 {
            output.push_str(&format!(
                "Segments without length: {:>12}\n",
                self.segments_without_length
            ));
        }
        output.push('\n');

        if self.path_count > 0 {
            output.push_str("--- Path Statistics ---\n");
            output.push_str(&format!(
                "Average path length:     {:>12.2} segments\n",
                self.average_path_length
            ));
            output.push_str(&format!(
                "Total path seq length:   {:>12} bp\n",
                self.total_path_sequence_length
            ));
            output.push('\n');
        }

        output.push_str("--- Segment Length Distribution ---\n");
        for (bin, count) in &self.segment_length_histogram {
            if *count > 0 {
                output.push_str(&format!("{:>15}: {:>8}\n", bin, count));
            }
        }

        if !self.dovetail_degree_distribution.is_empty() {
            output.push_str("\n--- Dovetail Degree Distribution ---\n");
            for (degree, count) in &self.dovetail_degree_distribution {
                output.push_str(&format!("{:>15}: {:>8}\n", degree, count));
            }
        }

        output
    }

    /// Export statistics as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn compute_n50(lengths: &[u64]) -> u64 {
    if lengths.is_empty() {
        return 0;
    }

    let mut sorted: Vec<u64> = lengths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let total: u64 = sorted.iter().sum();
    let half = total / 2;

    let mut cumsum = 0;
    for len in sorted {
        cumsum += len;
        if cumsum >= half {
            return len;
        }
    }

    0
}

fn compute_gc_content(graph: &Gfa) -> Result<f64> {
    let mut gc_count: u64 = 0;
    let mut total_count: u64 = 0;

    for segment in graph.segments() {
        let Some(sequence) = segment.sequence()? else {
            continue;
        };
        for c in sequence.chars() {
            match c.to_ascii_uppercase() {
                'G' | 'C' | 'S' => {
                    gc_count += 1;
                    total_count += 1;
                }
                'A' | 'T' | 'U' | 'W' => {
                    total_count += 1;
                }
                _ => {} // N and ambiguous codes
            }
        }
    }

    if total_count == 0 {
        Ok(0.0)
    } else {
        Ok((gc_count as f64 / total_count as f64) * 100.0)
    }
}

/// Average number of segments and summed segment length over the paths
/// and ordered groups; groups referencing undefined lines are skipped.
fn compute_path_stats(graph: &Gfa) -> Result<(f64, u64)> {
    let mut path_lengths = Vec::new();
    let mut total_seq_len: u64 = 0;

    for path in graph.paths().into_iter().chain(graph.ordered_groups()) {
        let Some(id) = path.handle() else {
            continue;
        };
        let steps = match graph.captured_path(id) {
            Ok(steps) => steps,
            Err(e) => {
                warn!(path = path.name().unwrap_or("*"), error = %e, "path skipped in statistics");
                continue;
            }
        };
        let mut segments = 0usize;
        for step in &steps {
            let Some(line) = step.id().and_then(|id| graph.get(id)) else {
                continue;
            };
            if matches!(line.kind(), LineKind::SegmentGfa1 | LineKind::SegmentGfa2) {
                segments += 1;
                total_seq_len += line.length()?.unwrap_or(0);
            }
        }
        path_lengths.push(segments);
    }

    if path_lengths.is_empty() {
        return Ok((0.0, 0));
    }
    let average = path_lengths.iter().sum::<usize>() as f64 / path_lengths.len() as f64;
    Ok((average, total_seq_len))
}

fn compute_length_histogram(lengths: &[u64]) -> Vec<(String, usize)> {
    let bins = [
        (0, 100, "0-100"),
        (100, 500, "100-500"),
        (500, 1000, "500-1K"),
        (1000, 5000, "1K-5K"),
        (5000, 10000, "5K-10K"),
        (10000, 50000, "10K-50K"),
        (50000, 100000, "50K-100K"),
        (100000, 500000, "100K-500K"),
        (500000, 1000000, "500K-1M"),
        (1000000, u64::MAX, ">1M"),
    ];

    let mut histogram: Vec<(String, usize)> = bins
        .iter()
        .map(|(_, _, label)| (label.to_string(), 0))
        .collect();

    for &len in lengths {
        if let Some(i) = bins.iter().position(|(min, max, _)| len >= *min && len < *max) {
            histogram[i].1 += 1;
        }
    }

    histogram
}

/// Distribution of dovetail counts per segment, and the number of segment
/// ends without dovetails.
fn compute_degree_distribution(graph: &Gfa) -> (BTreeMap<usize, usize>, usize) {
    let mut distribution = BTreeMap::new();
    let mut dead_ends = 0;
    for segment in graph.segments() {
        let degree = |end| {
            segment
                .dovetails_of_end(end)
                .iter()
                .filter(|id| graph.get(**id).is_some_and(|l| !l.is_virtual()))
                .count()
        };
        let (left, right) = (degree(EndType::L), degree(EndType::R));
        dead_ends += usize::from(left == 0) + usize::from(right == 0);
        *distribution.entry(left + right).or_insert(0) += 1;
    }
    (distribution, dead_ends)
}
