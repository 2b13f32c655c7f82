//! Check command handler

use super::utils::load_schema_set;
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{OutputWriter, SchemaSummary};
use tracing::{info, instrument};

/// Handle the check command
#[instrument(skip(config, output), fields(schema = %args.schema.display()))]
pub async fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let set = load_schema_set(&args.schema, config)?;
    info!(records = set.len(), "Schema compiled");

    output.success(&format!(
        "✓ {} compiled ({} record(s))",
        args.schema.display(),
        set.len()
    ))?;
    output.schema_summary(&SchemaSummary::from_set(&set))
}
