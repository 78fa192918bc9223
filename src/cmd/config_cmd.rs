//! Configuration introspection command.
//!
//! Provides `blogdesk config` subcommands:
//! - show: Display resolved configuration
//! - env: List environment variables
//! - schema: Output JSON schema
//! - init: Create template manifest

use std::fs;
use std::path::Path;

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::config::{
    self, CONFIG_DIR, ENV_VARS, LoadedConfig, MANIFEST_FILE, template_manifest, user_config_path,
};
use crate::store;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show resolved configuration
    Show(ShowArgs),

    /// List environment variables
    Env,

    /// Output JSON schema for manifest validation
    Schema,

    /// Create template manifest file
    Init(InitArgs),
}

#[derive(Args)]
struct ShowArgs {
    /// Show where values came from
    #[arg(long)]
    effective: bool,
}

#[derive(Args)]
struct InitArgs {
    /// Directory to create the manifest in (default: current directory)
    #[arg(default_value = ".")]
    path: String,

    /// Write the user global config instead
    #[arg(long, conflicts_with = "path")]
    global: bool,

    /// Overwrite existing manifest
    #[arg(long)]
    force: bool,
}

/// `loaded` is the configuration this invocation runs with, CLI flags included.
pub fn run(args: ConfigArgs, loaded: &LoadedConfig) -> Result<(), String> {
    let cwd = std::env::current_dir().map_err(|e| format!("cannot get cwd: {}", e))?;

    match args.command {
        ConfigCommand::Show(show_args) => run_show(loaded, show_args.effective),
        ConfigCommand::Env => run_env(),
        ConfigCommand::Schema => run_schema(),
        ConfigCommand::Init(init_args) => run_init(&cwd, init_args),
    }
}

fn run_show(loaded: &LoadedConfig, effective: bool) -> Result<(), String> {
    let yaml = serde_yaml::to_string(&loaded.config)
        .map_err(|e| format!("failed to serialize config: {}", e))?;

    if effective {
        println!("# Resolved configuration");
        println!("# Sources (in order of precedence):");
        for source in &loaded.sources {
            println!("#   - {}", source);
        }
        if let Some(dir) = store::data_dir() {
            println!("# Data directory: {}", dir.display());
        }
        println!();
    }
    println!("{}", yaml.trim());

    Ok(())
}

fn run_env() -> Result<(), String> {
    println!("Environment Variables:");
    println!();

    for var in ENV_VARS {
        let marker = if config::env_is_set(var.name) {
            " (set)".green().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", var.name.bold(), marker);
        println!("    {}", var.description);
        if let Some(values) = var.values {
            println!("    Values: {}", values);
        }
        println!("    Default: {}", var.default);
        println!("    Config path: {}", var.config_path);
        println!();
    }

    Ok(())
}

fn run_schema() -> Result<(), String> {
    println!("{}", config::json_schema());
    Ok(())
}

fn run_init(cwd: &Path, args: InitArgs) -> Result<(), String> {
    let manifest_path = if args.global {
        user_config_path().ok_or("cannot determine user config directory")?
    } else {
        let target_dir = if args.path == "." {
            cwd.to_path_buf()
        } else {
            cwd.join(&args.path)
        };
        target_dir.join(CONFIG_DIR).join(MANIFEST_FILE)
    };

    if manifest_path.exists() && !args.force {
        return Err(format!(
            "manifest already exists: {}\nUse --force to overwrite",
            manifest_path.display()
        ));
    }

    if let Some(parent) = manifest_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
    }

    fs::write(&manifest_path, template_manifest())
        .map_err(|e| format!("failed to write {}: {}", manifest_path.display(), e))?;

    println!("Created: {}", manifest_path.display());

    if !args.global
        && let Some(user_path) = user_config_path()
        && !user_path.exists()
    {
        println!(
            "Hint: User global config can be placed at: {}",
            user_path.display()
        );
    }

    Ok(())
}
