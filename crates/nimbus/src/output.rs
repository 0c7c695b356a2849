//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use nimbus_core::{Alert, AlertLevel, Resource};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Rows ─────────────────────────────────────────────────────────────

/// Summary row shared by every resource kind.
#[derive(Tabled)]
pub struct ResourceRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "TYPE")]
    pub kind: String,
    #[tabled(rename = "STATE")]
    pub state: String,
}

impl ResourceRow {
    pub fn from_resource<R: Resource>(resource: &R) -> Self {
        let value = serde_json::to_value(resource).unwrap_or(Value::Null);
        Self {
            id: resource.id().to_owned(),
            name: resource.label().to_owned(),
            kind: text_field(&value, &["type"]),
            state: text_field(&value, &["state", "status"]),
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// First non-empty scalar among `keys`, or `-`.
fn text_field(value: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .map(scalar)
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| "-".into())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list in the chosen format.
///
/// - `table`: one [`ResourceRow`] per item
/// - `json` / `json-compact` / `yaml`: the records as the console sent them
/// - `plain`: one id per line
pub fn render_list<R: Resource>(format: &OutputFormat, data: &[R]) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<ResourceRow> = data.iter().map(ResourceRow::from_resource).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data
            .iter()
            .map(|item| item.id().to_owned())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render one record or document. Tables list its top-level fields.
pub fn render_single<T: Serialize>(
    format: &OutputFormat,
    data: &T,
    id: &str,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<FieldRow> = match serde_json::to_value(data)? {
                Value::Object(fields) => fields
                    .iter()
                    .map(|(field, value)| FieldRow {
                        field: field.clone(),
                        value: scalar(value),
                    })
                    .collect(),
                other => vec![FieldRow {
                    field: "value".into(),
                    value: scalar(&other),
                }],
            };
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id.to_owned()),
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

/// One-line alert for stderr.
pub fn alert_line(alert: &Alert, color: bool) -> String {
    let (mark, text) = match alert.level {
        AlertLevel::Error => ("✗", alert.message.as_str()),
        AlertLevel::Warning => ("!", alert.message.as_str()),
        AlertLevel::Success => ("✓", alert.message.as_str()),
        AlertLevel::Info => ("·", alert.message.as_str()),
    };
    if !color {
        return format!("{mark} {text}");
    }
    match alert.level {
        AlertLevel::Error => format!("{} {}", mark.red().bold(), text.red()),
        AlertLevel::Warning => format!("{} {text}", mark.yellow().bold()),
        AlertLevel::Success => format!("{} {text}", mark.green().bold()),
        AlertLevel::Info => format!("{} {text}", mark.dimmed()),
    }
}

/// `page 2/5 (93 total)` footer under a table.
pub fn page_footer(page: u64, pages: u64, count: u64, color: bool) -> String {
    let footer = format!("page {}/{} ({count} total)", page + 1, pages.max(1));
    if color {
        footer.dimmed().to_string()
    } else {
        footer
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Internal(format!("YAML output: {e}")))
}
