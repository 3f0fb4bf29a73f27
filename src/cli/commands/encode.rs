use crate::cli::output::*;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::encoding::EncodedSequences;
use crate::pipeline;
use anyhow::Context;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Pad or truncate every sequence to this length (0 keeps native lengths)
    #[arg(long, value_name = "N")]
    pub pad: Option<usize>,

    /// Emit residue indices instead of one-hot rows
    #[arg(long)]
    pub index: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct EncodeReport {
    pub encoding: &'static str,
    pub vocabulary: String,
    pub max_len: usize,
    /// `None` when lengths differ and the sequences cannot be stacked
    pub train_shape: Option<Vec<usize>>,
    pub test_shape: Option<Vec<usize>>,
    pub label_shape: Vec<usize>,
}

fn stacked_shape(encoded: &EncodedSequences, vocabulary: usize) -> Option<Vec<usize>> {
    let lengths = encoded.lengths();
    let length = lengths.first().copied().unwrap_or(0);
    if lengths.iter().any(|&l| l != length) {
        return None;
    }
    Some(match encoded {
        EncodedSequences::Indices(_) => vec![lengths.len(), length],
        EncodedSequences::OneHot(_) => vec![lengths.len(), length, vocabulary],
    })
}

pub fn run(args: EncodeArgs, config: &Config) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(pad) = args.pad {
        config.encoding.pad_length = pad;
    }
    if args.index {
        config.encoding.one_hot_sequences = false;
    }

    let pb = spinner(
        "Encoding sequences...".to_string(),
        args.format == OutputFormat::Json,
    );
    let data = pipeline::sequences(&config).context("Failed to encode sequences")?;
    pb.finish_and_clear();

    let vocabulary = data.vocabulary.len();
    let report = EncodeReport {
        encoding: if config.encoding.one_hot_sequences {
            "one-hot"
        } else {
            "index"
        },
        vocabulary: String::from_utf8_lossy(data.vocabulary.symbols()).into_owned(),
        max_len: data.max_len,
        train_shape: stacked_shape(&data.x_train, vocabulary),
        test_shape: stacked_shape(&data.x_test, vocabulary),
        label_shape: data.y_train.shape(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            let shape = |s: &Option<Vec<usize>>| {
                s.as_deref()
                    .map(format_shape)
                    .unwrap_or_else(|| "ragged".to_string())
            };
            report_header("Sequence Encoding");
            tree_item(false, "Encoding", Some(report.encoding));
            tree_item(
                false,
                "Vocabulary",
                Some(&format!("{} ({} symbols)", report.vocabulary, vocabulary)),
            );
            tree_item(false, "Longest sequence", Some(&format_count(report.max_len)));
            tree_item(false, "Train", Some(&shape(&report.train_shape)));
            tree_item(false, "Test", Some(&shape(&report.test_shape)));
            tree_item(true, "Labels", Some(&format_shape(&report.label_shape)));
            println!();
            success("Sequences encoded");
        }
    }
    Ok(())
}
