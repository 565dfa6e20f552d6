//! binder - keep projects pinned to installed runtime versions
//!
//! Commands:
//! - list, add, remove projects
//! - bind a project to a version (`use`)
//! - reorder the list (`move`)
//! - reload the registry against the installed versions

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::Result;
use binder::util::{self, absolute_path};
use binder::{App, Config, RebindOutcome, Registry, RegistryError};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "binder")]
#[command(about = "Bind project folders to installed runtime versions", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory (defaults to ~/.binder)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show registered projects
    #[command(alias = "ls")]
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Register project folders
    Add {
        /// Project folders
        paths: Vec<PathBuf>,
        /// Version for folders without a version file
        #[arg(long)]
        version: Option<String>,
    },

    /// Unregister a project
    #[command(alias = "rm")]
    Remove { path: PathBuf },

    /// Bind a project to a version (empty string unbinds)
    Use { path: PathBuf, version: String },

    /// Move the project at FROM to position TO (zero-based)
    Move { from: usize, to: usize },

    /// Reload projects and installed versions
    Reload {
        /// Rescan installed versions
        #[arg(long)]
        force: bool,
    },

    /// List installed versions
    Versions {
        /// Rescan installed versions
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir.clone());

    // Initialize logging to file (~/.binder/logs/binder.log)
    fs::create_dir_all(util::logs_dir())?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let config = Config::load();
    let app = App::open(config).await?;
    let gateway = app.gateway();

    match cli.command {
        Commands::List { json } => {
            let registry = gateway.registry();
            if json {
                println!("{}", serde_json::to_string_pretty(&*registry)?);
            } else {
                print_registry(&registry);
            }
        }
        Commands::Add { paths, version } => {
            let picker = app.args_picker(paths, version);
            let Some(report) = gateway
                .add_from_picker(&picker, &App::project_picker_options())
                .await?
            else {
                println!("No folders selected");
                return Ok(());
            };
            for rejected in &report.rejected {
                eprintln!("{}", rejected);
            }
            for binding in &report.added {
                println!("Added {} ({})", binding.name, display_version(&binding.version));
            }
        }
        Commands::Remove { path } => {
            let path = absolute_path(&path)?;
            match gateway.remove_project(&path).await? {
                Some(binding) => println!("Removed {}", binding.name),
                None => println!("{} is not registered", path.display()),
            }
        }
        Commands::Use { path, version } => {
            let path = absolute_path(&path)?;
            match gateway.rebind_version(&path, &version).await {
                Ok(RebindOutcome::Bound(binding)) => println!(
                    "{} now uses {}, restart your terminal to pick it up",
                    binding.name,
                    display_version(&binding.version)
                ),
                Ok(RebindOutcome::Degraded(binding)) => eprintln!(
                    "Project not found, please check it: {} (recorded {} as inactive)",
                    binding.path.display(),
                    display_version(&binding.version)
                ),
                Err(e @ RegistryError::SyncFailed(_)) => {
                    eprintln!("{}, please try again", e);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Move { from, to } => {
            gateway.reorder(from, to).await?;
            print_registry(&gateway.registry());
        }
        Commands::Reload { force } => {
            let report = gateway.reload(force).await?;
            print_registry(&report.registry);
            println!("Refresh successful");
        }
        Commands::Versions { force } => {
            let installed = if force {
                gateway.reload(true).await?.installed
            } else {
                gateway.installed_versions()
            };
            if installed.is_empty() {
                println!(
                    "No versions installed in {}",
                    app.config().versions_dir.display()
                );
            }
            for version in installed.iter() {
                println!("v{}", version);
            }
        }
    }

    Ok(())
}

fn display_version(version: &str) -> String {
    if version.is_empty() {
        "no version".to_string()
    } else {
        format!("v{}", version.trim_start_matches('v'))
    }
}

fn print_registry(registry: &Registry) {
    if registry.is_empty() {
        println!("No projects registered");
        return;
    }

    let name_width = registry
        .iter()
        .map(|binding| binding.name.len())
        .max()
        .unwrap_or(0)
        .max(4);

    for (index, binding) in registry.iter().enumerate() {
        let state = if binding.active { "active" } else { "inactive" };
        println!(
            "{:>3}  {:<name_width$}  {:<12}  {:<8}  {:<9}  {}",
            index,
            binding.name,
            display_version(&binding.version),
            state,
            binding.availability,
            binding.path.display(),
        );
    }
}
