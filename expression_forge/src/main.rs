//! `expression-forge` - regenerate expressions, costs, signatures and
//! acquisition profiles from a power catalog database.
//!
//! ```bash
//! expression-forge run --db Superpower_list.db
//! expression-forge signatures --db Superpower_list.db
//! expression-forge bind-persona --db Superpower_list.db --persona hero --mastery 10
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use expression_forge::{parse_modifiers, ContentStore, Forge, ForgeConfig, PersonaBinding};

#[derive(Parser)]
#[command(
    name = "expression-forge",
    version,
    about = "Deterministic batch compiler for power expressions"
)]
struct Cli {
    /// TOML config file; command-line flags override it
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate every derived table
    Run(RunArgs),
    /// Regenerate only expression signatures
    Signatures(DbArgs),
    /// Report coverage without writing
    Validate(DbArgs),
    /// Bind a persona to stored expressions
    BindPersona(BindPersonaArgs),
}

#[derive(Parser)]
struct DbArgs {
    /// Path to the SQLite content database
    #[arg(long, value_name = "PATH")]
    db: PathBuf,
}

#[derive(Parser)]
struct RunArgs {
    #[command(flatten)]
    db: DbArgs,
    /// Maximum expressions per power
    #[arg(long)]
    max_expressions: Option<usize>,
    /// Maximum acquisition profiles per power
    #[arg(long)]
    max_profiles: Option<usize>,
    /// Create missing derived tables before running
    #[arg(long)]
    init_schema: bool,
}

#[derive(Parser)]
struct BindPersonaArgs {
    #[command(flatten)]
    db: DbArgs,
    /// Persona id to bind
    #[arg(long)]
    persona: String,
    /// Expressions bound per power
    #[arg(long, default_value_t = 1)]
    take_per_power: usize,
    /// Mastery level, 1..=100
    #[arg(long, default_value_t = 1)]
    mastery: u8,
    /// JSON object stored in the modifiers column
    #[arg(long, default_value = "{}")]
    modifiers: String,
    /// Replace the persona's existing bindings
    #[arg(long)]
    replace: bool,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ForgeConfig> {
    match path {
        Some(path) => ForgeConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ForgeConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => {
            if let Some(max) = args.max_expressions {
                config.max_expressions_per_power = max;
            }
            if let Some(max) = args.max_profiles {
                config.max_profiles_per_power = max;
            }
            config.validate()?;

            let store = ContentStore::open(&args.db.db)?;
            if args.init_schema {
                store.ensure_output_schema()?;
            }
            let mut forge = Forge::new(store, config);
            let report = forge.run().context("forge run failed")?;
            println!("{}", report);
        }
        Commands::Signatures(args) => {
            let mut forge = Forge::open(&args.db, config)?;
            let written = forge.refresh_signatures()?;
            println!("Expression signatures refreshed: {}", written);
        }
        Commands::Validate(args) => {
            let forge = Forge::open(&args.db, config)?;
            println!("{}", forge.validate()?);
        }
        Commands::BindPersona(args) => {
            let binding = PersonaBinding::new(args.persona)
                .with_take_per_power(args.take_per_power)
                .with_mastery(args.mastery)
                .with_modifiers(parse_modifiers(&args.modifiers)?);
            let binding = if args.replace { binding.replacing() } else { binding };
            binding.validate()?;

            let mut store = ContentStore::open(&args.db.db)?;
            store.ensure_persona_schema()?;
            let bound = store.bind_persona(&binding)?;
            println!("Persona '{}' bindings created/updated: {}", binding.persona_id, bound);
        }
    }

    Ok(())
}
