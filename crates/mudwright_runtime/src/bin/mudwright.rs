//! Mudwright server entry point.
//!
//! Runs the world on a local console session. Network transports hook into
//! the same engine; see `mudwright_session::Transport`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use mudwright_foundation::Value;
use mudwright_runtime::{Console, persist};
use mudwright_session::{InteractionEngine, commands};
use mudwright_world::library::{self, fields};
use mudwright_world::{TraitRegistry, World};

/// CLI configuration parsed from arguments.
struct CliConfig {
    snapshot_path: PathBuf,
    accounts_path: PathBuf,
    show_help: bool,
    show_version: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("world.json"),
            accounts_path: PathBuf::from("accounts.json"),
            show_help: false,
            show_version: false,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run(std::env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<CliConfig, String> {
    let mut config = CliConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-w" | "--world" => {
                i += 1;
                let value = args.get(i).ok_or("--world requires a path")?;
                config.snapshot_path = PathBuf::from(value);
            }
            "-a" | "--accounts" => {
                i += 1;
                let value = args.get(i).ok_or("--accounts requires a path")?;
                config.accounts_path = PathBuf::from(value);
            }
            other => return Err(format!("unknown option: {other}")),
        }
        i += 1;
    }
    Ok(config)
}

fn print_help() {
    println!("mudwright - a persistent multi-user world server");
    println!();
    println!("Usage: mudwright [options]");
    println!();
    println!("Options:");
    println!("  -w, --world <path>     World snapshot file (default: world.json)");
    println!("  -a, --accounts <path>  Accounts file (default: accounts.json)");
    println!("  -h, --help             Show this help");
    println!("  -V, --version          Show the version");
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(&args)?;
    if config.show_help {
        print_help();
        return Ok(());
    }
    if config.show_version {
        println!("mudwright {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut registry = TraitRegistry::new();
    library::install(&mut registry)?;
    let mut world = World::new(Arc::new(registry));

    if config.snapshot_path.exists() {
        let snapshot = persist::load_snapshot(&config.snapshot_path)?;
        world.restore(&snapshot)?;
        tracing::info!(
            path = %config.snapshot_path.display(),
            objects = world.len(),
            "loaded world"
        );
    } else {
        seed(&mut world)?;
        tracing::info!("seeded a fresh world");
    }

    let mut engine = InteractionEngine::new(world, commands::default_sets()?);
    if config.accounts_path.exists() {
        persist::load_accounts(engine.accounts_mut(), &config.accounts_path)?;
        tracing::info!(
            path = %config.accounts_path.display(),
            accounts = engine.accounts().len(),
            "loaded accounts"
        );
    }

    Console::new(engine, config.snapshot_path, config.accounts_path)?.run()?;
    Ok(())
}

/// Creates the minimal furniture a fresh world needs: one zone, one room.
fn seed(world: &mut World) -> mudwright_foundation::Result<()> {
    let zone_arch = world.define_archetype("Zone", &["base", "zone"])?;
    let room_arch = world.define_archetype("Room", &["base", "room"])?;
    let zone = world.create(&zone_arch, &[(fields::NAME, Value::from("Limbo"))])?;
    world.create(
        &room_arch,
        &[
            (fields::NAME, Value::from("The First Room")),
            (
                fields::DESCRIPTION,
                Value::from("A featureless room, waiting to be described."),
            ),
            (fields::ZONE, Value::Ref(zone)),
        ],
    )?;
    Ok(())
}
