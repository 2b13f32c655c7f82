//! Resolve command handler

use super::utils::{parse_document, read_input};
use crate::cli::ResolveArgs;
use crate::config::Config;
use crate::error::{ErrorContext, Result};
use crate::output::OutputWriter;
use pathbind_core::PathExpression;
use tracing::{debug, instrument};

/// Handle the resolve command
#[instrument(skip(config, output), fields(path = %args.path))]
pub async fn handle_resolve(
    args: ResolveArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let expression = PathExpression::parse(&args.path).map_err(pathbind_core::Error::from)?;
    let default = parse_document(&args.default)
        .with_context(|| format!("Invalid --default value '{}'", args.default))?;
    let document = read_input(args.input.as_deref(), &config.input.retry_policy()).await?;

    let value = expression.resolve(&document, default);
    debug!(path = %expression.as_str(), "Resolved path");
    output.data(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use tempfile::TempDir;

    fn sink() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Json, false, true, 0, Box::new(std::io::sink()))
    }

    #[tokio::test]
    async fn test_handle_resolve_rejects_bad_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("doc.json");
        std::fs::write(&input, r#"{"a": 1}"#).unwrap();

        let args = |path: &str, default: &str| ResolveArgs {
            path: path.to_string(),
            input: Some(input.clone()),
            default: default.to_string(),
        };

        let config = Config::default();
        assert!(handle_resolve(args("a", "null"), &config, &mut sink()).await.is_ok());

        let bad_path = handle_resolve(args("a..b", "null"), &config, &mut sink()).await;
        assert_eq!(bad_path.unwrap_err().exit_code(), 2);

        let bad_default = handle_resolve(args("a", "{oops"), &config, &mut sink()).await;
        assert!(bad_default
            .unwrap_err()
            .to_string()
            .starts_with("Invalid --default value '{oops'"));
    }
}
