//! Talent calculator CLI.
//!
//! Usage:
//!   talent-cli list                              # Trees found in the configured directory
//!   talent-cli inspect 64                        # Nodes, edges and limits of spec 64
//!   talent-cli inspect tree.json -l BEAA...      # Node states under a loadout
//!   talent-cli apply 64 -t 101 -t 102            # Toggle nodes, print the new loadout
//!   talent-cli decode 64 BEAA...                 # Validate and list a loadout
//!
//! A TREE argument is either a path to a tree JSON file or a spec id looked up
//! in the tree directory (`--dir`, or `trees_dir` from the config file).

mod apply;
mod inspect;
mod list;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use talent_calc::config::CalcConfig;
use talent_calc::library::TreeLibrary;
use talent_calc::TalentTree;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "talent-cli")]
#[command(about = "Talent tree calculator")]
struct Cli {
    /// Config file (defaults to the per-user data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tree directory, overriding the config
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered tree files
    List,

    /// Show a tree's nodes, optionally with their state under a loadout
    Inspect {
        /// Tree file path or spec id
        tree: String,

        /// Loadout string to evaluate node states against
        #[arg(short, long)]
        loadout: Option<String>,
    },

    /// Apply toggles/decrements and print the resulting loadout
    Apply {
        /// Tree file path or spec id
        tree: String,

        /// Starting loadout (defaults to an empty selection)
        #[arg(short, long)]
        loadout: Option<String>,

        /// Toggle a node (repeatable, applied in order)
        #[arg(short, long = "toggle", value_name = "NODE")]
        toggle: Vec<u32>,

        /// Remove one rank from a node (repeatable, applied after toggles)
        #[arg(short, long = "decrement", value_name = "NODE")]
        decrement: Vec<u32>,
    },

    /// Validate a loadout string and list its selections
    Decode {
        /// Tree file path or spec id
        tree: String,

        /// Loadout string
        loadout: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => CalcConfig::load_from(path),
        None => CalcConfig::load(),
    };
    if let Some(dir) = cli.dir {
        config.trees_dir = dir;
    }

    match cli.command {
        Commands::List => list::run(&config),
        Commands::Inspect { tree, loadout } => {
            let tree = resolve_tree(&tree, &config)?;
            inspect::run(tree, &config, loadout.as_deref())?;
        }
        Commands::Apply {
            tree,
            loadout,
            toggle,
            decrement,
        } => {
            let tree = resolve_tree(&tree, &config)?;
            apply::apply(tree, &config, loadout.as_deref(), &toggle, &decrement)?;
        }
        Commands::Decode { tree, loadout } => {
            let tree = resolve_tree(&tree, &config)?;
            apply::decode(tree, &loadout)?;
        }
    }
    Ok(())
}

/// A path to a tree file, or a spec id from the tree directory.
fn resolve_tree(arg: &str, config: &CalcConfig) -> talent_calc::Result<TalentTree> {
    let path = Path::new(arg);
    if path.is_file() {
        return TalentTree::load(path, &config.default_point_limits);
    }
    match arg.parse::<u32>() {
        Ok(spec_id) => {
            TreeLibrary::discover(&config.trees_dir, config.default_point_limits).load(spec_id)
        }
        Err(_) => Err(talent_calc::Error::Other(format!(
            "{arg} is neither a tree file nor a spec id"
        ))),
    }
}
