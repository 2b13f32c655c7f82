//! Bind command handler

use super::utils::{load_schema_set, read_input, select_schema, write_output};
use crate::cli::{BindArgs, DumpForm, OutputFormat};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputFormatter, OutputWriter};
use pathbind_core::error::kind_name;
use pathbind_core::serializer::display_mapping;
use pathbind_core::{Binder, DumpOptions, TypeCoercion};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Handle the bind command
#[instrument(skip(config, output), fields(schema = %args.schema.display()))]
pub async fn handle_bind(args: BindArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("bind_command", &format!("schema: {}", args.schema.display()));

    let set = load_schema_set(&args.schema, config)?;
    let schema = select_schema(&set, args.record.as_deref())?;
    let document = read_input(args.input.as_deref(), &config.input.retry_policy()).await?;

    let strict = args.strict || config.binding.strict;
    let coercer = if strict {
        TypeCoercion::strict()
    } else {
        TypeCoercion::lax()
    };
    let binder = Binder::with_coercer(Arc::new(coercer));
    let options = DumpOptions::new().exclude_none(args.exclude_none || config.binding.exclude_none);
    let form = args.form.unwrap_or(config.binding.form);

    let documents = if args.each {
        match document {
            Value::Array(items) => items,
            other => {
                return Err(Error::invalid_args(format!(
                    "--each expects a top-level JSON array, found {}",
                    kind_name(&other)
                )))
            }
        }
    } else {
        vec![document]
    };
    info!(record = %schema.name(), documents = documents.len(), strict, "Binding documents");

    let progress = if args.each {
        output.progress_bar(documents.len() as u64, "Binding")
    } else {
        None
    };

    let mut mappings = Vec::with_capacity(documents.len());
    for (index, document) in documents.iter().enumerate() {
        let record = binder.bind(document, &schema).map_err(|e| {
            if args.each {
                pathbind_core::Error::binding(format!("[{}]", index), e)
            } else {
                e
            }
        })?;
        mappings.push(record.dump_with(&options)?);

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let rendered = render(&mappings, form, args.each, output.format())?;
    match &args.output_file {
        Some(path) => {
            write_output(path, &rendered)?;
            output.success(&format!(
                "✓ Bound {} record(s) to {}",
                mappings.len(),
                path.display()
            ))?;
        }
        None => output.write(&rendered)?,
    }

    Ok(())
}

/// Render dumped records in the requested form
///
/// Mappings follow the output format; JSON and display text are written one
/// record per line regardless of it.
fn render(
    mappings: &[Map<String, Value>],
    form: DumpForm,
    each: bool,
    format: OutputFormat,
) -> Result<String> {
    let mut rendered = match form {
        DumpForm::Mapping => {
            let value = match mappings {
                [single] if !each => Value::Object(single.clone()),
                _ => Value::Array(mappings.iter().cloned().map(Value::Object).collect()),
            };
            format.format(&value)?
        }
        DumpForm::Json => mappings
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?
            .join("\n"),
        DumpForm::Display => mappings
            .iter()
            .map(display_mapping)
            .collect::<Vec<_>>()
            .join("\n"),
    };

    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}
