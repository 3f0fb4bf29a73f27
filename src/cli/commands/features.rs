use crate::bio::sequence::Dataset;
use crate::cli::output::*;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::encoding::LabelEncoding;
use crate::pipeline::{self, HandcraftedData, RawData};
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Args, Debug)]
pub struct FeaturesArgs {
    /// Report the unnormalized tables with every dipeptide pair instead
    #[arg(long)]
    pub raw: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// List every column
    #[arg(long)]
    pub detailed: bool,
}

/// What a run produced; the matrices themselves are never printed
#[derive(Debug, Serialize)]
pub struct FeatureReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub columns: usize,
    pub classes: Vec<String>,
    pub class_balance: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub column_names: Vec<String>,
}

fn balance(labels: &LabelEncoding, classes: &[String]) -> BTreeMap<String, usize> {
    let mut counts = vec![0usize; classes.len()];
    match labels {
        LabelEncoding::Indices(codes) => {
            for &c in codes {
                counts[c] += 1;
            }
        }
        LabelEncoding::OneHot(rows) => {
            for (c, column) in rows.columns().into_iter().enumerate() {
                counts[c] = column.sum() as usize;
            }
        }
    }
    classes.iter().cloned().zip(counts).collect()
}

impl FeatureReport {
    pub fn from_handcrafted(data: &HandcraftedData, detailed: bool) -> Self {
        Self {
            train_rows: data.x_train.nrows(),
            test_rows: data.x_test.nrows(),
            columns: data.x_train.ncols(),
            classes: data.class_dict.classes().to_vec(),
            class_balance: balance(&data.y_train, data.class_dict.classes()),
            column_names: if detailed {
                data.columns.clone()
            } else {
                Vec::new()
            },
        }
    }

    pub fn from_raw(data: &RawData, detailed: bool) -> Self {
        let names = |dataset: &Dataset| -> Vec<String> {
            dataset.features.ids().map(|id| id.to_string()).collect()
        };
        Self {
            train_rows: data.train.len(),
            test_rows: data.test.len(),
            columns: data.train.features.len(),
            classes: data.class_dict.classes().to_vec(),
            class_balance: balance(&data.y_train, data.class_dict.classes()),
            column_names: if detailed {
                names(&data.train)
            } else {
                Vec::new()
            },
        }
    }
}

pub fn run(args: FeaturesArgs, config: &Config) -> anyhow::Result<()> {
    let quiet = args.format == OutputFormat::Json;
    let pb = spinner(
        format!("Extracting features from {}...", config.data.data_dir.display()),
        quiet,
    );

    let report = if args.raw {
        let data = pipeline::handcrafted_raw(config).context("Failed to build raw feature tables")?;
        FeatureReport::from_raw(&data, args.detailed)
    } else {
        let data = pipeline::handcrafted(config).context("Failed to build feature matrices")?;
        FeatureReport::from_handcrafted(&data, args.detailed)
    };
    pb.finish_and_clear();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text_report(&report, args.raw),
    }
    Ok(())
}

fn print_text_report(report: &FeatureReport, raw: bool) {
    let title = if raw {
        "Raw Feature Tables"
    } else {
        "Handcrafted Feature Matrices"
    };
    report_header(title);

    let unit = if raw { "features" } else { "columns" };
    tree_item(
        false,
        "Train",
        Some(&format!(
            "{} rows x {} {}",
            format_count(report.train_rows),
            report.columns,
            unit
        )),
    );
    tree_item(
        false,
        "Test",
        Some(&format!(
            "{} rows x {} {}",
            format_count(report.test_rows),
            report.columns,
            unit
        )),
    );
    let balance: Vec<(&str, String)> = report
        .class_balance
        .iter()
        .map(|(class, n)| (class.as_str(), format_count(*n)))
        .collect();
    tree_section("Class balance", &balance, true);

    if !report.column_names.is_empty() {
        subsection_header("Column Layout");
        let mut table = report_table(&["#", "Name"]);
        for (i, name) in report.column_names.iter().enumerate() {
            table.add_row(vec![value_cell(i), comfy_table::Cell::new(name)]);
        }
        println!("{}", table);
    }
    println!();
    success(&format!("{} ready", title.to_lowercase()));
}
