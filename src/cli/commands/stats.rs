use crate::bio::alphabet::{AminoAcid, N_AMINO_ACIDS};
use crate::bio::fasta::parse_fasta;
use crate::bio::sequence::SequenceRecord;
use crate::cli::output::*;
use crate::cli::OutputFormat;
use crate::error::ProtlocResult;
use crate::features::composition::composition;
use crate::features::physicochemical::hydrophobicity;
use anyhow::Context;
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Input FASTA file
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Show the full residue composition
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceStats {
    pub total_sequences: usize,
    pub total_residues: usize,
    pub empty_sequences: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub mean_length: f64,
    pub median_length: usize,
    pub mean_hydrophobicity: f64,
    /// Percent of all residues, alphabet order
    pub composition: Vec<(String, f64)>,
    /// Percent of residues that are `X` or ambiguous
    pub unknown: f64,
}

impl SequenceStats {
    pub fn calculate(records: &[SequenceRecord]) -> ProtlocResult<Self> {
        let comps = records
            .par_iter()
            .map(|r| composition(r.residues()).map_err(|e| e.in_record(&r.id)))
            .collect::<ProtlocResult<Vec<_>>>()?;

        let mut lengths: Vec<usize> = records.iter().map(|r| r.len()).collect();
        lengths.sort_unstable();
        let total_residues: usize = lengths.iter().sum();

        let mut counts = [0usize; N_AMINO_ACIDS];
        let mut unknown = 0;
        for comp in &comps {
            for (total, c) in counts.iter_mut().zip(comp.counts) {
                *total += c;
            }
            unknown += comp.unknown;
        }
        let percent = |n: usize| {
            if total_residues == 0 {
                0.0
            } else {
                100.0 * n as f64 / total_residues as f64
            }
        };

        let n = records.len();
        Ok(Self {
            total_sequences: n,
            total_residues,
            empty_sequences: lengths.iter().filter(|&&l| l == 0).count(),
            min_length: lengths.first().copied().unwrap_or(0),
            max_length: lengths.last().copied().unwrap_or(0),
            mean_length: if n == 0 {
                0.0
            } else {
                total_residues as f64 / n as f64
            },
            median_length: lengths.get(n / 2).copied().unwrap_or(0),
            mean_hydrophobicity: if n == 0 {
                0.0
            } else {
                records.iter().map(|r| hydrophobicity(r.residues())).sum::<f64>() / n as f64
            },
            composition: AminoAcid::ALL
                .iter()
                .map(|aa| (aa.to_string(), percent(counts[aa.index()])))
                .collect(),
            unknown: percent(unknown),
        })
    }
}

pub fn run(args: StatsArgs, _config: &crate::config::Config) -> anyhow::Result<()> {
    let pb = spinner(
        format!("Loading {}...", args.input.display()),
        args.format == OutputFormat::Json,
    );
    let parsed = parse_fasta(&args.input, None)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    pb.finish_and_clear();

    let stats = SequenceStats::calculate(&parsed.records)?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => print_text_stats(&stats, args.detailed),
    }
    Ok(())
}

fn print_text_stats(stats: &SequenceStats, detailed: bool) {
    report_header("FASTA Statistics Report");

    subsection_header("Sequence Metrics");
    tree_item(false, "Total Sequences", Some(&format_count(stats.total_sequences)));
    tree_item(false, "Total Residues", Some(&format_count(stats.total_residues)));
    tree_item(false, "Empty Sequences", Some(&format_count(stats.empty_sequences)));
    let length_items = vec![
        ("Average", format!("{:.1} aa", stats.mean_length)),
        ("Median", format!("{} aa", format_count(stats.median_length))),
        (
            "Min/Max",
            format!(
                "{} / {} aa",
                format_count(stats.min_length),
                format_count(stats.max_length)
            ),
        ),
    ];
    tree_section("Length Statistics", &length_items, true);

    subsection_header("Composition Analysis");
    tree_item(
        false,
        "Mean Hydrophobicity",
        Some(&format!("{:.3}", stats.mean_hydrophobicity)),
    );
    tree_item(
        !detailed,
        "Unknown/Ambiguous",
        Some(&format!("{:.2}%", stats.unknown)),
    );

    if detailed {
        let mut table = report_table(&["Residue", "Percent"]);
        for (aa, pct) in &stats.composition {
            table.add_row(vec![
                comfy_table::Cell::new(aa),
                value_cell(format!("{:.2}%", pct)),
            ]);
        }
        println!("{}", table);
    } else {
        let mut top: Vec<_> = stats.composition.iter().collect();
        top.sort_by(|a, b| b.1.total_cmp(&a.1));
        let items: Vec<(&str, String)> = top
            .iter()
            .take(5)
            .map(|(aa, pct)| (aa.as_str(), format!("{:.1}%", pct)))
            .collect();
        tree_section("Top Amino Acids", &items, true);
    }
}
