//! Inspect and edit persisted remixer snapshots
//!
//! ```bash
//! # List every stored variable
//! remixer show
//!
//! # Change one, validated against its stored constraints
//! remixer set ./remixer_snapshot.json vol 10
//!
//! # Resolve a declaration file against a snapshot
//! remixer declare controls.yaml --snapshot ./remixer_snapshot.json
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{debug, info};
use remixer::prelude::*;
use remixer::runtime::storage::{
    default_storage_dir, load_settings_if_exists, load_snapshot, save_snapshot,
};

#[derive(Parser, Debug)]
#[command(name = "remixer")]
#[command(about = "Inspect and edit remixer variable snapshots", long_about = None)]
struct Args {
    /// Directory holding settings.json (defaults to the platform config dir)
    #[arg(long, global = true)]
    settings_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every stored variable
    Show {
        /// Snapshot file (defaults to the one named in settings)
        snapshot: Option<PathBuf>,
    },
    /// Set a stored variable's value
    Set {
        snapshot: PathBuf,
        key: String,
        value: String,
    },
    /// Build every item in a YAML declaration file and print its value
    Declare {
        file: PathBuf,

        /// Converge to, and persist into, this snapshot file
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

fn main() {
    init_logger();

    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("remixer: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let settings = settings(args.settings_dir)?;

    match args.command {
        Commands::Show { snapshot } => {
            let path = snapshot.unwrap_or_else(|| settings.snapshot_path());
            show(&path)
        }
        Commands::Set {
            snapshot,
            key,
            value,
        } => set(&snapshot, &key, &value),
        Commands::Declare { file, snapshot } => declare(&file, snapshot),
    }
}

fn settings(settings_dir: Option<String>) -> Result<RemixerSettings> {
    let dir = settings_dir.unwrap_or_else(default_storage_dir);
    match load_settings_if_exists(&dir)? {
        Some(settings) => {
            debug!("Loaded settings from {}", dir);
            Ok(settings)
        }
        None => Ok(RemixerSettings {
            storage_dir: dir,
            ..RemixerSettings::default()
        }),
    }
}

fn show(path: &Path) -> Result<()> {
    let Some(snapshot) = load_snapshot(path)? else {
        println!("No snapshot at {}", path.display());
        return Ok(());
    };

    for stored in snapshot.iter() {
        println!(
            "{:<20} {:<10} {:<24} {}",
            stored.key,
            stored.data_type,
            display(&stored.selected_value),
            describe(&stored.constraint)
        );
        if stored.title != stored.key {
            println!("{:<20} {}", "", stored.title);
        }
    }

    Ok(())
}

fn set(path: &Path, key: &str, text: &str) -> Result<()> {
    let mut snapshot = load_snapshot(path)?.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no snapshot at {}", path.display()),
        )
    })?;

    let stored = snapshot
        .get_mut(key)
        .ok_or_else(|| RemixerError::UnknownKey(key.to_string()))?;

    let value =
        data_types::converter_named(&stored.data_type)?.parse(key, text)?;
    stored.validate(&value)?;
    info!("{}: {} -> {}", key, display(&stored.selected_value), value);
    stored.selected_value = Some(value);

    save_snapshot(path, &snapshot)
}

fn declare(file: &Path, snapshot: Option<PathBuf>) -> Result<()> {
    let declarations = load_declarations(file)?;

    let mut remixer = match snapshot {
        Some(path) => Remixer::with_mechanism(LocalMechanism::with_store(
            JsonFileStore::new(path),
        )?),
        None => Remixer::new(),
    };

    let context = remixer.create_context(&file.to_string_lossy());
    let handles = remixer.add_declarations(context, declarations)?;

    for handle in handles {
        let Some(item) = remixer.item(handle) else {
            continue;
        };
        println!(
            "{:<20} {:<10} {}",
            item.key(),
            item.data_type().name(),
            display(&item.selected_value().cloned())
        );
    }

    Ok(())
}

fn display(value: &Option<RemixValue>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

fn describe(constraint: &Constraint) -> String {
    match constraint {
        Constraint::Unconstrained => String::new(),
        Constraint::Range {
            min,
            max,
            increment,
        } => format!("{}..={} step {}", min, max, increment),
        Constraint::Options(options) => {
            let options: Vec<String> =
                options.iter().map(ToString::to_string).collect();
            format!("[{}]", options.join(", "))
        }
    }
}
