//! Shared helpers for command handlers

use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};
use pathbind_core::{retry_async, RecordSchema, RetryPolicy, SchemaDocument, SchemaSet};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Load and compile a schema file (YAML or JSON)
///
/// Bare names are looked up under the configured schemas directory.
pub fn load_schema_set(schema: &Path, config: &Config) -> Result<SchemaSet> {
    let path = config.schema_path(schema);
    if !path.is_file() {
        return Err(Error::FileNotFound { path });
    }

    debug!(path = %path.display(), "Loading schema file");
    let content = std::fs::read_to_string(&path)?;

    let document: SchemaDocument = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        _ => {
            return Err(Error::InvalidFormat {
                path,
                expected: "YAML or JSON".to_string(),
            })
        }
    };

    Ok(document.compile()?)
}

/// Pick the named record, or the root record when no name is given
pub fn select_schema(set: &SchemaSet, record: Option<&str>) -> Result<Arc<RecordSchema>> {
    let schema = match record {
        Some(name) => set.get(name).ok_or_else(|| {
            let available: Vec<&str> = set.iter().map(|s| s.name()).collect();
            Error::invalid_args(format!(
                "unknown record '{}' (available: {})",
                name,
                available.join(", ")
            ))
        })?,
        None => set
            .root()
            .ok_or_else(|| Error::other("schema file declares no records"))?,
    };
    Ok(Arc::clone(schema))
}

/// Read a JSON document from a file, or from stdin when no file is given
///
/// File reads are retried on transient I/O errors.
pub async fn read_input(input: Option<&Path>, policy: &RetryPolicy) -> Result<Value> {
    let (text, source) = match input {
        Some(path) => {
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let text = retry_async(policy, Error::is_transient, || async move {
                Ok::<_, Error>(tokio::fs::read_to_string(path).await?)
            })
            .await?;
            (text, path.display().to_string())
        }
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            (text, "stdin".to_string())
        }
    };

    debug!(source = %source, bytes = text.len(), "Read input document");
    parse_document(&text).with_context(|| format!("Invalid JSON in {}", source))
}

/// Parse a JSON document
pub fn parse_document(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Write rendered output to a file, creating parent directories
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    const SCHEMA_YAML: &str = r#"
records:
  - name: Line
    fields:
      - { name: sku, type: string }
  - name: Order
    fields:
      - { name: id, type: integer, required: true }
      - { name: lines, kind: sequence, record: Line }
"#;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(2).with_initial_delay(Duration::from_millis(1))
    }

    #[test]
    fn test_load_yaml_schema_and_select_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.yaml");
        std::fs::write(&path, SCHEMA_YAML).unwrap();

        let set = load_schema_set(&path, &Config::default()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(select_schema(&set, None).unwrap().name(), "Order");
        assert_eq!(select_schema(&set, Some("Line")).unwrap().name(), "Line");

        let err = select_schema(&set, Some("Nope")).unwrap_err();
        assert!(err.should_show_help());
        assert!(err.to_string().contains("available: Line, Order"));
    }

    #[test]
    fn test_load_by_bare_name_from_schemas_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("orders.yml"), SCHEMA_YAML).unwrap();

        let mut config = Config::default();
        config.paths.schemas_dir = Some(dir.path().to_path_buf());

        let set = load_schema_set(Path::new("orders"), &config).unwrap();
        assert!(set.get("Line").is_some());
    }

    #[test]
    fn test_load_json_schema_and_errors() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("s.json");
        std::fs::write(&json, r#"{"records": [{"name": "A", "fields": [{"name": "x"}]}]}"#)
            .unwrap();
        assert_eq!(load_schema_set(&json, &Config::default()).unwrap().len(), 1);

        let bad = dir.path().join("s.txt");
        std::fs::write(&bad, "records: []").unwrap();
        assert!(matches!(
            load_schema_set(&bad, &Config::default()),
            Err(Error::InvalidFormat { .. })
        ));

        let unknown_ref = dir.path().join("ref.yaml");
        std::fs::write(
            &unknown_ref,
            "records:\n  - name: A\n    fields:\n      - { name: b, kind: record, record: Missing }\n",
        )
        .unwrap();
        assert!(matches!(
            load_schema_set(&unknown_ref, &Config::default()),
            Err(Error::Core(_))
        ));

        assert!(matches!(
            load_schema_set(&dir.path().join("missing.yaml"), &Config::default()),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_input_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"id": 1}"#).unwrap();

        let value = read_input(Some(path.as_path()), &fast_policy()).await.unwrap();
        assert_eq!(value, serde_json::json!({"id": 1}));

        std::fs::write(&path, "{not json").unwrap();
        let err = read_input(Some(path.as_path()), &fast_policy()).await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON in "));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            read_input(Some(missing.as_path()), &fast_policy()).await,
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_write_output_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("record.json");

        write_output(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
