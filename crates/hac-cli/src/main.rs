mod server;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hac_core::{EngineConfig, HarmonicSystem, HarmonicVector, unix_to_iso8601};
use hac_store::{DataDir, SpacePersistence, Store};

#[derive(Parser)]
#[command(name = "hac", about = "Harmonic algebra core CLI and HTTP server")]
struct Cli {
    /// Named vector space to operate on
    #[arg(long, global = true, default_value = "default")]
    space: String,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:7878")]
        addr: SocketAddr,
    },

    /// Add a vector to the space
    Add {
        /// Comma-separated coordinates, e.g. 1,0,0.5
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        coords: Vec<f64>,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        tag: f64,
    },

    /// Compose the members at two positions
    Compose { left: usize, right: usize },

    /// Print the composition log as JSON
    History,

    /// Print attractor basins as JSON
    Basins,

    /// Look for an attractor in the recent trajectory
    Identify,

    /// Advance the consciousness state one step
    Step {
        /// Comma-separated input vector
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        input: Vec<f64>,
    },

    /// Show system statistics
    Stats,

    /// Export the full system to a JSON file
    Export { path: PathBuf },

    /// Import the full system from a JSON file
    Import { path: PathBuf },

    /// Write the space members to a JSON file
    Persist { path: PathBuf },

    /// Replace the space members from a JSON file
    Restore { path: PathBuf },
}

/// Everything a command needs: config, store, and the loaded system.
struct Session {
    config: EngineConfig,
    store: Store,
    system: HarmonicSystem,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let base_dir = std::env::var("HAC_DATA_DIR").ok().map(PathBuf::from);
        let data = DataDir::open(base_dir.as_deref()).context("failed to open data directory")?;
        let config = data.load_config().context("failed to load config")?;
        let store = data
            .open_store(&cli.space)
            .with_context(|| format!("failed to open space '{}'", cli.space))?;
        let system = store
            .load_system(config.clone())
            .context("failed to load system")?;
        Ok(Self {
            config,
            store,
            system,
        })
    }

    fn save(&self) -> Result<()> {
        self.store
            .save_system(&self.system)
            .context("failed to save system")
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve { addr } => cmd_serve(&cli, *addr).await,
        Commands::Add { coords, tag } => cmd_add(&cli, coords, *tag),
        Commands::Compose { left, right } => cmd_compose(&cli, *left, *right),
        Commands::History => cmd_history(&cli),
        Commands::Basins => cmd_basins(&cli),
        Commands::Identify => cmd_identify(&cli),
        Commands::Step { input } => cmd_step(&cli, input),
        Commands::Stats => cmd_stats(&cli),
        Commands::Export { path } => cmd_export(&cli, path),
        Commands::Import { path } => cmd_import(&cli, path),
        Commands::Persist { path } => cmd_persist(&cli, path),
        Commands::Restore { path } => cmd_restore(&cli, path),
    }
}

async fn cmd_serve(cli: &Cli, addr: SocketAddr) -> Result<()> {
    let session = Session::open(cli)?;
    tracing::info!(
        "serving space '{}' ({} vectors)",
        cli.space,
        session.system.space.len()
    );
    server::serve(addr, session.system, session.store)
        .await
        .context("HTTP server failed")
}

fn cmd_add(cli: &Cli, coords: &[f64], tag: f64) -> Result<()> {
    let mut session = Session::open(cli)?;
    let v = HarmonicVector::new(coords.to_vec(), tag).context("invalid vector")?;
    let added = session.system.add_vector(v).context("failed to add vector")?;
    if added {
        session.save()?;
    }
    println!("added: {added}, size: {}", session.system.space.len());
    Ok(())
}

fn cmd_compose(cli: &Cli, left: usize, right: usize) -> Result<()> {
    let mut session = Session::open(cli)?;
    let result = session
        .system
        .compose_by_index(left, right)
        .context("composition failed")?;
    session.save()?;
    match result {
        Some(v) => println!("result: {v}"),
        None => println!("(no result)"),
    }
    println!("size: {}", session.system.space.len());
    Ok(())
}

fn cmd_history(cli: &Cli) -> Result<()> {
    let session = Session::open(cli)?;
    let json = serde_json::to_string_pretty(session.system.stream.history())
        .context("failed to serialize history")?;
    println!("{json}");
    Ok(())
}

fn cmd_basins(cli: &Cli) -> Result<()> {
    let session = Session::open(cli)?;
    let json = serde_json::to_string_pretty(&session.system.tracker.basin_export())
        .context("failed to serialize basins")?;
    println!("{json}");
    Ok(())
}

fn cmd_identify(cli: &Cli) -> Result<()> {
    let mut session = Session::open(cli)?;
    match session.system.identify_attractor() {
        Some(v) => {
            session.save()?;
            println!("attractor: {v}");
        }
        None => println!("(no attractor)"),
    }
    Ok(())
}

fn cmd_step(cli: &Cli, input: &[f64]) -> Result<()> {
    let mut session = Session::open(cli)?;
    let state = session
        .system
        .step_state(input)
        .context("state update failed")?;
    session.save()?;
    println!("state: {state:?}");
    println!("steps: {}", session.system.state.steps());
    Ok(())
}

fn cmd_stats(cli: &Cli) -> Result<()> {
    let session = Session::open(cli)?;
    let stats = session.system.stats();
    let dimension = stats
        .dimension
        .map_or_else(|| "-".to_string(), |d| d.to_string());

    println!("space:      {}", cli.space);
    println!("size:       {}", stats.size);
    println!("dimension:  {dimension}");
    println!("history:    {}", stats.history);
    println!("trajectory: {}", stats.trajectory);
    println!("basins:     {}", stats.basins);
    println!("steps:      {}", stats.state_steps);
    if let Some(last) = session.system.stream.history().back() {
        println!("last:       {}", unix_to_iso8601(last.timestamp));
    }
    Ok(())
}

fn cmd_export(cli: &Cli, path: &Path) -> Result<()> {
    let session = Session::open(cli)?;
    session
        .store
        .export_json_file(path, session.config.clone())
        .with_context(|| format!("failed to export to {}", path.display()))?;
    println!("exported to {}", path.display());
    Ok(())
}

fn cmd_import(cli: &Cli, path: &Path) -> Result<()> {
    let session = Session::open(cli)?;
    session
        .store
        .import_json_file(path, session.config.clone())
        .context("failed to import JSON")?;
    let system = session
        .store
        .load_system(session.config)
        .context("failed to load system after import")?;
    println!(
        "imported from {}. size={}, history={}",
        path.display(),
        system.space.len(),
        system.stream.history().len()
    );
    Ok(())
}

fn cmd_persist(cli: &Cli, path: &Path) -> Result<()> {
    let session = Session::open(cli)?;
    session
        .system
        .space
        .persist(path)
        .context("failed to persist space")?;
    println!(
        "persisted {} vectors to {}",
        session.system.space.len(),
        path.display()
    );
    Ok(())
}

fn cmd_restore(cli: &Cli, path: &Path) -> Result<()> {
    let mut session = Session::open(cli)?;
    session
        .system
        .space
        .restore(path)
        .context("failed to restore space")?;
    session.save()?;
    println!(
        "restored {} vectors from {}",
        session.system.space.len(),
        path.display()
    );
    Ok(())
}
