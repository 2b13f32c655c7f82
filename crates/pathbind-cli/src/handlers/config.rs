//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigInitArgs, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::{Path, PathBuf};

/// Handle the config command
pub async fn handle_config(
    args: ConfigArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => {
            let target = if init_args.project {
                PathBuf::from(".pathbind.toml")
            } else {
                Config::user_config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .ok_or_else(|| Error::config("Unable to determine user config directory"))?
            };
            handle_config_init(&init_args, &target, output)
        }
        ConfigAction::Show(show_args) => handle_config_show(&show_args, config, output),
        ConfigAction::Path => handle_config_path(output),
    }
}

/// Write a default configuration file to `target`
fn handle_config_init(args: &ConfigInitArgs, target: &Path, output: &mut OutputWriter) -> Result<()> {
    if target.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            target.display()
        ))?;
        return Ok(());
    }

    Config::default().save(target)?;
    output.success(&format!("✓ Created config at {}", target.display()))?;
    output.info("Edit it to customize settings for your environment.")
}

fn handle_config_show(args: &ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = config.render(args.format)?;
    output.write(&content)?;
    if !content.ends_with('\n') {
        output.writeln("")?;
    }
    Ok(())
}

fn handle_config_path(output: &mut OutputWriter) -> Result<()> {
    let paths = Config::default_config_paths();
    let active = paths.iter().find(|p| p.exists()).cloned();

    output.section("Configuration search order")?;
    for path in &paths {
        let marker = if Some(path) == active.as_ref() {
            "  (active)"
        } else {
            ""
        };
        output.writeln(&format!("{}{}", path.display(), marker))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ConfigFormat, OutputFormat};
    use tempfile::TempDir;

    fn sink() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Human, false, true, 0, Box::new(std::io::sink()))
    }

    #[test]
    fn test_init_writes_defaults_and_respects_force() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("pathbind").join("config.toml");

        let args = ConfigInitArgs { project: false, force: false };
        handle_config_init(&args, &target, &mut sink()).unwrap();
        assert_eq!(Config::from_file(&target).unwrap(), Config::default());

        std::fs::write(&target, "[binding]\nstrict = true\n").unwrap();
        handle_config_init(&args, &target, &mut sink()).unwrap();
        assert!(Config::from_file(&target).unwrap().binding.strict);

        let force = ConfigInitArgs { project: false, force: true };
        handle_config_init(&force, &target, &mut sink()).unwrap();
        assert!(!Config::from_file(&target).unwrap().binding.strict);
    }

    #[test]
    fn test_show_in_every_format() {
        let config = Config::default();
        for format in [ConfigFormat::Toml, ConfigFormat::Json, ConfigFormat::Yaml] {
            let args = ConfigShowArgs { format };
            handle_config_show(&args, &config, &mut sink()).unwrap();
        }
    }
}
