// Tests for output formatting and the output writer

use super::*;
use pathbind_core::serializer::built_in;
use pathbind_core::{FieldBuilder, ValueType};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Writer that keeps everything written to it for inspection
#[derive(Clone, Default)]
struct Captured(Rc<RefCell<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, Captured) {
    let captured = Captured::default();
    let writer = OutputWriter::with_writer(format, false, quiet, 0, Box::new(captured.clone()));
    (writer, captured)
}

fn sample_summary() -> SchemaSummary {
    let address = RecordSchema::builder("Address")
        .field(FieldBuilder::scalar("city", ValueType::String).serializer(built_in::uppercase()))
        .build()
        .unwrap();
    let customer = RecordSchema::builder("Customer")
        .field(FieldBuilder::scalar("id", ValueType::Integer).alias("customer.id").required())
        .field(FieldBuilder::record("address", &address))
        .field(FieldBuilder::scalar("tier", ValueType::String).default_value(json!("basic")))
        .field(FieldBuilder::scalar("secret", ValueType::Any).exclude())
        .build()
        .unwrap();

    SchemaSummary {
        root: Some("Customer".to_string()),
        records: vec![
            RecordSummary::from_schema(&address),
            RecordSummary::from_schema(&customer),
        ],
    }
}

#[test]
fn test_format_value_compact() {
    assert_eq!(format_value_compact(&json!("hello")), "\"hello\"");
    assert_eq!(format_value_compact(&json!(42)), "42");
    assert_eq!(format_value_compact(&json!(true)), "true");
    assert_eq!(format_value_compact(&json!(null)), "null");
    assert_eq!(format_value_compact(&json!([1, 2, 3])), "[1, 2, 3]");
    assert_eq!(format_value_compact(&json!([1, 2, 3, 4, 5])), "[5 items]");
    assert_eq!(format_value_compact(&json!({"a": 1, "b": 2})), "{a: 1, b: 2}");
    assert_eq!(format_value_compact(&json!({"a": 1, "b": 2, "c": 3})), "{3 fields}");
}

#[test]
fn test_output_writer_creation() {
    let writer = OutputWriter::new(OutputFormat::Human, true, false, 1);
    assert_eq!(writer.format(), OutputFormat::Human);
    assert_eq!(writer.verbosity(), 1);
}

#[test]
fn test_data_in_each_format() {
    let value = json!({"name": "ada", "tags": ["x"]});

    let (mut out, captured) = writer(OutputFormat::Json, false);
    out.data(&value).unwrap();
    assert_eq!(captured.text(), "{\"name\":\"ada\",\"tags\":[\"x\"]}\n");

    let (mut out, captured) = writer(OutputFormat::Yaml, false);
    out.data(&value).unwrap();
    assert_eq!(captured.text(), "name: ada\ntags:\n- x\n");

    let (mut out, captured) = writer(OutputFormat::Human, false);
    out.data(&value).unwrap();
    assert!(captured.text().starts_with("{\n  \"name\": \"ada\""));
}

#[test]
fn test_messages_respect_quiet_and_format() {
    let (mut out, captured) = writer(OutputFormat::Human, true);
    out.info("hidden").unwrap();
    out.success("hidden").unwrap();
    out.warning("shown").unwrap();
    assert_eq!(captured.text(), "WARNING: shown\n");

    let (mut out, captured) = writer(OutputFormat::Json, false);
    out.info("hidden").unwrap();
    out.section("hidden").unwrap();
    out.warning("hidden").unwrap();
    assert_eq!(captured.text(), "");

    let (mut out, captured) = writer(OutputFormat::Human, false);
    out.info("bound").unwrap();
    out.section("Records").unwrap();
    assert_eq!(captured.text(), "INFO: bound\n\n=== Records ===\n");
}

#[test]
fn test_schema_summary_human() {
    let formatted = OutputFormat::Human
        .format_schema_summary(&sample_summary())
        .unwrap();

    assert!(formatted.starts_with("Address\n  city: string [serializer=uppercase]\n"));
    assert!(formatted.contains("Customer (root)\n"));
    assert!(formatted.contains("  id: integer <- customer.id [required]\n"));
    assert!(formatted.contains("  address: Address\n"));
    assert!(formatted.contains("  tier: string [default=\"basic\"]\n"));
    assert!(formatted.contains("  secret: any [excluded]\n"));
}

#[test]
fn test_schema_summary_machine_formats() {
    let (mut out, captured) = writer(OutputFormat::Json, false);
    out.schema_summary(&sample_summary()).unwrap();

    let parsed: Value = serde_json::from_str(captured.text().trim_end()).unwrap();
    assert_eq!(parsed["root"], json!("Customer"));
    assert_eq!(parsed["records"][1]["fields"][0]["path"], json!("customer.id"));
    assert_eq!(parsed["records"][1]["fields"][0]["required"], json!(true));
    assert!(parsed["records"][1]["fields"][0].get("serializer").is_none());
}

#[test]
fn test_no_progress_with_custom_writer() {
    let (out, _) = writer(OutputFormat::Human, false);
    assert!(out.progress_bar(10, "binding").is_none());
}
