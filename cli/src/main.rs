use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use schema_sync_core::Config;
use schema_sync_sqlite::{SchemaStore, load_schema};

#[derive(Debug, Parser)]
#[command(name = "schema-sync")]
#[command(about = "Apply, seed and extract an idempotent SQLite schema")]
struct Cli {
    /// Database file path (overrides config file and DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create every table, index, trigger and view that does not exist yet.
    Apply(ApplyArgs),
    /// Insert (or remove) the synthetic test dataset.
    Seed(SeedArgs),
    /// Save the live schema as a canonical, re-appliable document.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ApplyArgs {
    /// Schema document to apply.
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SeedArgs {
    /// Delete the seeded rows instead of inserting them.
    #[arg(long)]
    clear: bool,
    /// Random seed for task states and captions (default: random).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Output path (default: the configured schema path).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = resolve_config(&cli).and_then(|config| match cli.command {
        Command::Apply(args) => run_apply(config, args),
        Command::Seed(args) => run_seed(config, args),
        Command::Extract(args) => run_extract(config, args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

/// Defaults, then the config file, then `DB_PATH`, then `--db`.
fn resolve_config(cli: &Cli) -> Result<Config, String> {
    let base = match &cli.config {
        Some(path) => Config::load(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };
    let mut config = base.with_env(|key| std::env::var(key).ok());
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    Ok(config)
}

fn open_store(config: &Config) -> Result<SchemaStore, String> {
    SchemaStore::open(&config.db_path).map_err(|e| {
        format!(
            "Failed to open database '{}': {e}",
            config.db_path.display()
        )
    })
}

fn run_apply(config: Config, args: ApplyArgs) -> Result<(), String> {
    let schema_path = args.schema.unwrap_or(config.schema_path.clone());
    // Read before opening so a missing schema leaves no database file behind.
    let schema_text = load_schema(&schema_path).map_err(|e| e.to_string())?;
    let mut store = open_store(&config)?;
    store.apply(&schema_text).map_err(|e| e.to_string())?;
    println!(
        "OK: database initialized at {} using {}",
        config.db_path.display(),
        schema_path.display()
    );
    Ok(())
}

fn run_seed(config: Config, args: SeedArgs) -> Result<(), String> {
    let mut store = open_store(&config)?;
    if args.clear {
        store.clear().map_err(|e| e.to_string())?;
        println!("OK: test data cleared from {}", config.db_path.display());
        return Ok(());
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    store
        .seed(&mut rng, chrono::Utc::now())
        .map_err(|e| e.to_string())?;
    println!("OK: test data inserted into {}", config.db_path.display());
    Ok(())
}

fn run_extract(config: Config, args: ExtractArgs) -> Result<(), String> {
    let out = args.out.unwrap_or(config.schema_path.clone());
    let store = open_store(&config)?;
    store
        .extract_to(&out, chrono::Utc::now())
        .map_err(|e| e.to_string())?;
    println!("OK: schema saved to {}", out.display());
    Ok(())
}
