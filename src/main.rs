//! ccrepl - Index replication task parameter tool
//!
//! Builds, persists and inspects the parameters that identify a
//! cross-cluster index replication task.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ccrepl::config::ReplConfig;
use ccrepl::error::Result;
use ccrepl::index::Index;
use ccrepl::params::{ReplicationTaskParams, MINIMUM_SUPPORTED_VERSION, TASK_NAME};
use ccrepl::persist::TaskEnvelope;
use ccrepl::registry::TaskParamsRegistry;

/// ccrepl - Index replication task parameters
#[derive(Parser)]
#[command(name = "ccrepl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "ccrepl.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error), overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ParamsArgs {
    /// Remote cluster connection alias
    #[arg(long)]
    leader_alias: String,

    /// Leader index name
    #[arg(long)]
    leader_index: String,

    /// Leader index uuid
    #[arg(long)]
    leader_index_uuid: String,

    /// Local follower index name
    #[arg(long)]
    follower_index: String,
}

impl ParamsArgs {
    fn build(self) -> Result<ReplicationTaskParams> {
        ReplicationTaskParams::new(
            self.leader_alias,
            Index::new(self.leader_index, self.leader_index_uuid),
            self.follower_index,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Persist task parameters to a state file
    Encode {
        #[command(flatten)]
        params: ParamsArgs,

        /// Output path (defaults to <data_dir>/tasks/<follower_index>.state)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Read a state file and print its parameters
    Decode {
        /// State file to read
        input: PathBuf,

        /// Pretty-print the document
        #[arg(long)]
        pretty: bool,
    },

    /// Print the structured document for task parameters
    Render {
        #[command(flatten)]
        params: ParamsArgs,

        /// Pretty-print the document
        #[arg(long)]
        pretty: bool,
    },

    /// Show task type registration and node version
    Info,

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level, &config.logging.format);

    match cli.command {
        Commands::Encode { params, output } => run_encode(&config, params, output),
        Commands::Decode { input, pretty } => run_decode(&config, input, pretty),
        Commands::Render { params, pretty } => run_render(params, pretty),
        Commands::Info => run_info(&config),
        Commands::Validate => run_validate(cli.config),
    }
}

/// Missing config file falls back to defaults
fn load_config(path: &Path) -> Result<ReplConfig> {
    if path.exists() {
        ReplConfig::from_file(path)
    } else {
        Ok(ReplConfig::default())
    }
}

fn init_logging(level: &str, format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn run_encode(config: &ReplConfig, args: ParamsArgs, output: Option<PathBuf>) -> Result<()> {
    let params = args.build()?;
    let path = output.unwrap_or_else(|| config.task_state_path(params.follower_index_name()));

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!("Failed to create directory {:?}: {}", parent, e);
            return Err(e.into());
        }
    }

    let envelope = TaskEnvelope::seal(&params)?;
    envelope.write_file(&path)?;

    tracing::info!(
        "Persisted replication of {} {} into {} at {:?}",
        params.leader_alias(),
        params.leader_index(),
        params.follower_index_name(),
        path
    );
    println!("{}", path.display());
    Ok(())
}

fn run_decode(config: &ReplConfig, input: PathBuf, pretty: bool) -> Result<()> {
    let registry = TaskParamsRegistry::with_defaults(config.node.version)?;
    let envelope = TaskEnvelope::read_file(&input)?;

    let params = match envelope.open(&registry) {
        Ok(p) => p,
        Err(e) => {
            match e.field() {
                Some(field) => tracing::error!(
                    "Task {} failed to start: {} (field {})",
                    envelope.task_name,
                    e,
                    field
                ),
                None => tracing::error!("Task {} failed to start: {}", envelope.task_name, e),
            }
            return Err(e);
        }
    };

    let doc = params.render()?;
    if pretty {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{}", doc);
    }
    Ok(())
}

fn run_render(args: ParamsArgs, pretty: bool) -> Result<()> {
    let params = args.build()?;
    if pretty {
        println!("{}", params.to_json_pretty()?);
    } else {
        println!("{}", params);
    }
    Ok(())
}

fn run_info(config: &ReplConfig) -> Result<()> {
    let registry = TaskParamsRegistry::with_defaults(config.node.version)?;

    println!("ccrepl Task Parameters");
    println!("======================");
    println!();
    println!("Task Type:        {}", TASK_NAME);
    println!("Minimum Version:  {}", MINIMUM_SUPPORTED_VERSION);
    println!("Node Version:     {}", registry.node_version());
    println!("Data Directory:   {}", config.node.data_dir.display());
    match registry.check(TASK_NAME) {
        Ok(_) => println!("Decodable:        yes"),
        Err(e) => println!("Decodable:        no ({})", e),
    }

    Ok(())
}

fn run_validate(config_path: PathBuf) -> Result<()> {
    match ReplConfig::from_file(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!("  Node Version: {}", config.node.version);
            println!("  Data Directory: {}", config.node.data_dir.display());
            println!("  Logging: {} ({})", config.logging.level, config.logging.format);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            Err(e)
        }
    }
}
