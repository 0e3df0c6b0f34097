//! Chitti Udi CLI - terminal front end for shared bowls.

mod app;
mod view;

use chitti_core::domain::BowlType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Chitti Udi - put chits in a bowl, then juggle them
#[derive(Parser, Debug)]
#[command(name = "chitti-udi")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding the database, config and logs
    #[arg(long, env = "CHITTI_DATA_DIR", default_value = ".chitti-udi")]
    pub data_dir: PathBuf,

    /// Base URL for shared bowl links (overrides app_config.json)
    #[arg(long, env = "CHITTI_SHARE_BASE_URL")]
    pub share_base_url: Option<String>,

    /// Keep everything in memory for this run (pair with --name)
    #[arg(long, env = "CHITTI_EPHEMERAL", default_value = "false")]
    pub ephemeral: bool,

    /// Display name to store before running the command
    #[arg(long, env = "CHITTI_USER_NAME")]
    pub name: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or set your display name
    Name {
        /// New name (omit to show the current one)
        name: Option<String>,
    },

    /// Create a bowl you own
    Create {
        /// Bowl name
        name: String,

        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Maximum members (0 = no limit; not enforced)
        #[arg(long, default_value = "0")]
        member_limit: String,

        /// Entries each member may add (0 = no limit; owner exempt)
        #[arg(short, long, default_value = "0")]
        input_count: String,

        /// PICK_ONE_DISCARD, PICK_ONE_KEEP, SHUFFLE_MEMBERS, MAKE_PAIRS, SECRET_SANTA or SHUFFLE_ENTRIES
        #[arg(short = 't', long = "type", default_value = "PICK_ONE_DISCARD")]
        bowl_type: BowlType,
    },

    /// List bowls on this device
    List,

    /// Show one bowl with its members and entries
    Show {
        bowl_id: String,
    },

    /// Add an entry to a bowl
    Add {
        bowl_id: String,

        /// Entry text
        text: String,
    },

    /// Juggle the bowl according to its type
    Juggle {
        bowl_id: String,
    },

    /// Remove one entry (owner only)
    RemoveEntry {
        bowl_id: String,
        entry_id: String,
    },

    /// Remove all entries (owner only)
    Clear {
        bowl_id: String,
    },

    /// Delete the bowl (owner only)
    Delete {
        bowl_id: String,
    },

    /// Print a link others can open to join
    Share {
        bowl_id: String,
    },

    /// Open a shared bowl link
    Open {
        url: String,
    },

    /// Follow changes to your bowls until interrupted
    Watch,

    /// Print the most recent log lines
    Logs {
        /// Number of lines (the logger keeps the latest 500)
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match app::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let args = Args::try_parse_from([
            "chitti-udi", "--ephemeral", "--name", "Asha", "create", "Trip", "-t", "make-pairs", "-i", "2",
        ])
        .unwrap();

        assert!(args.ephemeral);
        assert_eq!(args.name.as_deref(), Some("Asha"));
        match args.command {
            Commands::Create { name, bowl_type, input_count, .. } => {
                assert_eq!(name, "Trip");
                assert_eq!(bowl_type, BowlType::MakePairs);
                assert_eq!(input_count, "2");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(Args::try_parse_from(["chitti-udi", "create", "Trip", "-t", "lottery"]).is_err());
    }
}
