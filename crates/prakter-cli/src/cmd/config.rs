use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use prakter_core::config::Config;
use prakter_core::paths;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Write the default configuration if none exists
    Init,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Init => init(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load .prakter/config.yaml")?;
    if json {
        print_json(&config)
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
        Ok(())
    }
}

fn init(root: &Path, json: bool) -> anyhow::Result<()> {
    paths::require_workspace(root)?;
    let path = paths::config_path(root);
    let created = !path.exists();
    if created {
        Config::default()
            .save(root)
            .context("failed to write .prakter/config.yaml")?;
    }

    if json {
        print_json(&serde_json::json!({ "path": path, "created": created }))
    } else {
        let verb = if created { "created" } else { "exists: " };
        println!("  {verb} {}", paths::CONFIG_FILE);
        Ok(())
    }
}
