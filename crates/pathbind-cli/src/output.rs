//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), schema listings
//! and progress indicators.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pathbind_core::{RecordSchema, SchemaSet};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, IsTerminal, Write};
use tracing::{debug, trace};

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a compiled schema listing
    fn format_schema_summary(&self, summary: &SchemaSummary) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_schema_summary(&self, summary: &SchemaSummary) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_schema_summary_human(summary)),
            _ => self.format(summary),
        }
    }
}

/// Serializable description of a compiled schema file
#[derive(Debug, Clone, Serialize)]
pub struct SchemaSummary {
    pub root: Option<String>,
    pub records: Vec<RecordSummary>,
}

/// One record of a [`SchemaSummary`]
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub name: String,
    pub fields: Vec<FieldSummary>,
}

/// One field of a [`RecordSummary`]
#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub kind: String,
    pub path: String,
    pub required: bool,
    pub exclude: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serializer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl SchemaSummary {
    /// Describe every record of a compiled schema set
    pub fn from_set(set: &SchemaSet) -> Self {
        Self {
            root: set.root().map(|schema| schema.name().to_string()),
            records: set.iter().map(|schema| RecordSummary::from_schema(schema)).collect(),
        }
    }
}

impl RecordSummary {
    pub fn from_schema(schema: &RecordSchema) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|field| FieldSummary {
                name: field.name().to_string(),
                kind: field.kind().label(),
                path: if field.is_computed() {
                    String::new()
                } else {
                    field.alias().as_str().to_string()
                },
                required: field.is_required(),
                exclude: field.is_excluded(),
                serializer: field.serializer().map(|s| s.name().to_string()),
                default: field.default_value().cloned(),
            })
            .collect();

        Self {
            name: schema.name().to_string(),
            fields,
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stderr().is_terminal(),
            quiet,
            verbose,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            verbose,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Get verbosity level
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!("Outputting {} bytes", formatted.len());

        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write a schema listing
    pub fn schema_summary(&mut self, summary: &SchemaSummary) -> Result<()> {
        let formatted = self.format.format_schema_summary(summary)?;
        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

fn field_flags(field: &FieldSummary) -> String {
    let mut flags = Vec::new();
    if field.required {
        flags.push("required".to_string());
    }
    if field.exclude {
        flags.push("excluded".to_string());
    }
    if let Some(serializer) = &field.serializer {
        flags.push(format!("serializer={}", serializer));
    }
    if let Some(default) = &field.default {
        flags.push(format!("default={}", format_value_compact(default)));
    }
    flags.join(", ")
}

fn format_schema_summary_human(summary: &SchemaSummary) -> String {
    let mut output = String::new();
    for record in &summary.records {
        let marker = if summary.root.as_deref() == Some(record.name.as_str()) {
            " (root)"
        } else {
            ""
        };
        output.push_str(&format!("{}{}\n", record.name, marker));
        for field in &record.fields {
            output.push_str(&format!("  {}: {}", field.name, field.kind));
            if !field.path.is_empty() && field.path != field.name {
                output.push_str(&format!(" <- {}", field.path));
            }
            let flags = field_flags(field);
            if !flags.is_empty() {
                output.push_str(&format!(" [{}]", flags));
            }
            output.push('\n');
        }
    }
    output
}

/// Format a JSON value in a compact, human-readable way
fn format_value_compact(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            if arr.len() <= 3 {
                format!(
                    "[{}]",
                    arr.iter().map(format_value_compact).collect::<Vec<_>>().join(", ")
                )
            } else {
                format!("[{} items]", arr.len())
            }
        }
        Value::Object(obj) => {
            if obj.len() <= 2 {
                let items: Vec<String> = obj
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, format_value_compact(v)))
                    .collect();
                format!("{{{}}}", items.join(", "))
            } else {
                format!("{{{} fields}}", obj.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
