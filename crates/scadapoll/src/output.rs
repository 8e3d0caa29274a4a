//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one `name=value` per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use scadapoll_core::{Item, QualityTier, WriteResult};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

fn paint_tier(tier: QualityTier, color: bool) -> String {
    let label = tier.to_string();
    if !color {
        return label;
    }
    match tier {
        QualityTier::Good => label.green().to_string(),
        QualityTier::Uncertain => label.yellow().to_string(),
        QualityTier::Bad => label.red().to_string(),
        QualityTier::Unknown => label.dimmed().to_string(),
    }
}

// ── Item rows ────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct ItemRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Limit")]
    limit: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
}

impl ItemRow {
    pub fn new(item: &Item, color: bool) -> Self {
        let mut value = item.effective_value().to_string();
        if item.is_editing() {
            value.push_str(" (pending)");
        }
        Self {
            name: item.name.clone(),
            value,
            quality: paint_tier(item.quality.tier, color),
            status: item
                .quality
                .status
                .map_or_else(|| "-".into(), |s| s.to_string()),
            limit: item.quality.limit.to_string(),
            timestamp: item.timestamp.map_or_else(
                || "-".into(),
                |t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            ),
        }
    }
}

/// `name=value`, the plain-format line for one item.
pub fn item_line(item: &Item) -> String {
    format!("{}={}", item.name, item.effective_value())
}

/// Render the item list in the selected format.
pub fn render_items(
    format: &OutputFormat,
    items: &[Item],
    color: bool,
) -> Result<String, CliError> {
    render_list(format, items, |i| ItemRow::new(i, color), item_line)
}

// ── Write results ────────────────────────────────────────────────────

#[derive(Tabled)]
struct WriteErrorRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Code")]
    code: i64,
}

/// Render a write outcome. Table and plain show only the summary and
/// the per-item failures.
pub fn render_write_result(
    format: &OutputFormat,
    result: &WriteResult,
) -> Result<String, CliError> {
    render_single(
        format,
        result,
        |r| {
            let mut out = format!("{} written", r.written_count);
            if !r.errors.is_empty() {
                let rows: Vec<_> = r
                    .errors
                    .iter()
                    .map(|e| WriteErrorRow {
                        item: e.item_name.clone(),
                        code: e.code,
                    })
                    .collect();
                out.push('\n');
                out.push_str(&render_table(&rows));
            }
            out
        },
        |r| {
            r.errors
                .iter()
                .map(|e| format!("{}={}", e.item_name, e.code))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: builds rows with `to_row`
/// - `json` / `json-compact` / `yaml`: serializes the data itself
/// - `plain`: calls `line_fn` on each item, one line per item
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    line_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&line_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable value in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views don't use the
/// `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    line_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(line_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    out.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use scadapoll_core::{ItemError, ItemValue, Quality};

    fn item(name: &str, value: i64, quality: u8) -> Item {
        Item {
            name: name.into(),
            quality: Quality::from_bits(quality),
            timestamp: None,
            value: ItemValue::from(value),
            write_permission: true,
            pending_edit: None,
        }
    }

    #[test]
    fn plain_lists_name_value_pairs_in_order() {
        let items = [item("B", 2, 0xC0), item("A", 1, 0x18)];
        let out = render_items(&OutputFormat::Plain, &items, false).unwrap();
        assert_eq!(out, "B=2\nA=1");
    }

    #[test]
    fn plain_shows_pending_edit() {
        let mut it = item("Setpoint", 10, 0xC0);
        it.pending_edit = Some(ItemValue::from(12_i64));
        assert_eq!(item_line(&it), "Setpoint=12");
    }

    #[test]
    fn table_has_decoded_quality_columns() {
        let items = [item("Pump1", 3, 0x1B)];
        let out = render_items(&OutputFormat::Table, &items, false).unwrap();
        assert!(out.contains("Pump1"));
        assert!(out.contains("BAD"));
        assert!(out.contains("COMM_FAILURE"));
        assert!(out.contains("CONST"));
    }

    #[test]
    fn json_keeps_integer_values() {
        let items = [item("Level", 50, 0xC0)];
        let out = render_items(&OutputFormat::JsonCompact, &items, false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["name"], "Level");
        assert_eq!(parsed[0]["value"], 50);
        assert_eq!(parsed[0]["quality"]["tier"], "GOOD");
    }

    #[test]
    fn write_result_table_lists_failures() {
        let result = WriteResult {
            errors: vec![ItemError {
                code: 5,
                item_name: "Locked".into(),
            }],
            written_count: 1,
        };
        let out = render_write_result(&OutputFormat::Table, &result).unwrap();
        assert!(out.starts_with("1 written"));
        assert!(out.contains("Locked"));

        let plain = render_write_result(&OutputFormat::Plain, &result).unwrap();
        assert_eq!(plain, "Locked=5");
    }
}
