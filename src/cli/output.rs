//! Terminal rendering for command reports
use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Report title, underlined to its width
pub fn report_header(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

pub fn subsection_header(title: &str) {
    println!("\n{} {}", "◆".cyan(), title.bold());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

fn tree_line(indent: &str, is_last: bool, label: &str, value: Option<&str>) -> String {
    let branch = if is_last { "└─" } else { "├─" };
    let prefix = format!("{}{}", indent, branch);
    match value {
        Some(value) => format!("{} {}: {}", prefix.dimmed(), label, value),
        None => format!("{} {}", prefix.dimmed(), label),
    }
}

pub fn tree_item(is_last: bool, label: &str, value: Option<&str>) {
    println!("{}", tree_line("", is_last, label, value));
}

/// Titled group of `label: value` lines nested one level under the report
pub fn tree_section<L: AsRef<str>>(title: &str, items: &[(L, String)], is_last: bool) {
    tree_item(is_last, title, None);
    let indent = if is_last { "   " } else { "│  " };
    for (i, (label, value)) in items.iter().enumerate() {
        let line = tree_line(indent, i + 1 == items.len(), label.as_ref(), Some(value.as_str()));
        println!("{}", line);
    }
}

/// Rounded table with a bold header row
pub fn report_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| {
            Cell::new(h)
                .add_attribute(Attribute::Bold)
                .fg(TableColor::Cyan)
        }));
    table
}

pub fn value_cell(text: impl ToString) -> Cell {
    Cell::new(text).fg(TableColor::Green)
}

/// Spinner for a step of unknown length; hidden when `quiet`
pub fn spinner(message: String, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Count with comma thousands separators
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Render an array shape as `a x b x c`
pub fn format_shape(shape: &[usize]) -> String {
    shape
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" x ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_shape() {
        assert_eq!(format_shape(&[10, 2000, 21]), "10 x 2000 x 21");
        assert_eq!(format_shape(&[]), "");
    }

    #[test]
    fn test_tree_line_branches() {
        colored::control::set_override(false);
        assert_eq!(tree_line("", false, "Train", Some("4 rows")), "├─ Train: 4 rows");
        assert_eq!(tree_line("│  ", true, "cyto", Some("2")), "│  └─ cyto: 2");
        assert_eq!(tree_line("", true, "Class balance", None), "└─ Class balance");
    }

    #[test]
    fn test_report_table_header() {
        let mut table = report_table(&["Residue", "Percent"]);
        table.add_row(vec![Cell::new("A"), value_cell("5.00%")]);
        let rendered = table.to_string();
        assert!(rendered.contains("Residue"));
        assert!(rendered.contains("5.00%"));
    }
}
