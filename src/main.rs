use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use vaultgen::config;
use vaultgen::data_vault::{DataVaultLoad, DataVaultModelConfig};
use vaultgen::sql_generator::init_template_registry;

/// Vaultgen - SQL generation for Data Vault loads
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Generator configuration file (YAML); environment variables otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory whose SQL files override the built-in templates
    #[arg(long, global = true)]
    template_dir: Option<PathBuf>,

    /// Write the generated SQL to this file instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the staging statement followed by the load script
    Script {
        /// Data Vault model (YAML)
        #[arg(long)]
        model: PathBuf,
    },
    /// Print the staging statement only
    Staging {
        /// Data Vault model (YAML)
        #[arg(long)]
        model: PathBuf,
    },
    /// Print the placeholders of one table as JSON
    Placeholders {
        /// Data Vault model (YAML)
        #[arg(long)]
        model: PathBuf,

        /// Table name
        #[arg(long)]
        table: String,
    },
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            template_dir: cli.template_dir.clone(),
            output: cli.output.clone(),
            statement_separator: None,
        }
    }
}

fn load_model(path: &Path) -> anyhow::Result<DataVaultLoad> {
    let model = DataVaultModelConfig::from_yaml_file(path)
        .with_context(|| format!("failed to load model {}", path.display()))?;
    model
        .into_load()
        .with_context(|| format!("invalid Data Vault model {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => config::GeneratorConfig::from_yaml_file(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?,
        None => config::GeneratorConfig::from_env().context("invalid environment configuration")?,
    };
    config.merge((&cli).into()).context("invalid command line configuration")?;

    if let Some(dir) = &config.template_dir {
        log::info!("Using SQL templates from {}", dir.display());
    }
    init_template_registry(config.template_dir.clone());

    let output = match cli.command {
        Command::Script { model } => {
            let load = load_model(&model)?;
            let mut statements = vec![load.staging_create_sql_statement()?];
            statements.extend(load.sql_load_script()?);
            config.join_statements(&statements)
        }
        Command::Staging { model } => {
            let load = load_model(&model)?;
            config.join_statements(&[load.staging_create_sql_statement()?])
        }
        Command::Placeholders { model, table } => {
            let load = load_model(&model)?;
            let target = load
                .table(&table)
                .ok_or_else(|| anyhow!("table '{}' is not part of the model", table))?;
            let placeholders = target.as_entity().sql_placeholders()?;
            let mut json = serde_json::to_string_pretty(&placeholders)?;
            json.push('\n');
            json
        }
    };

    match &config.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout().write_all(output.as_bytes())?,
    }
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();

    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
