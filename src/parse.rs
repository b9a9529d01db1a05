use crate::gateway::DEFAULT_BASE_URL;
use crate::record::{ObservationId, Rarity};
use crate::table::{SortColumn, SortDirection, SortState};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "birdwatch")]
#[command(about = "A CLI client for recording and browsing bird observations")]
#[command(version = "1.0")]
pub(crate) struct Args {
    /// Observation endpoint of the API
    #[arg(short, long, env = "BIRDWATCH_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "10")]
    pub timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show the observation table
    List {
        #[command(flatten)]
        order: Order,
    },

    /// Record a new observation
    Add {
        /// Name of the bird
        #[arg(short, long)]
        name: String,

        /// common, rare or extremely rare
        #[arg(short, long, default_value = "common")]
        rarity: Rarity,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Delete observations by id
    Delete {
        #[arg(required = true)]
        ids: Vec<ObservationId>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Write every observation to a CSV file
    Export {
        /// Output CSV filename
        #[arg(short, long, default_value = "observations.csv")]
        output: String,

        #[command(flatten)]
        order: Order,
    },

    /// Print totals per rarity and the date range
    Summary,

    /// Interactive session
    Shell,
}

#[derive(clap::Args)]
pub(crate) struct Order {
    /// Column to sort by: name, rarity, notes or timestamp
    #[arg(short, long)]
    pub sort: Option<SortColumn>,

    /// Sort descending
    #[arg(short, long, requires = "sort")]
    pub desc: bool,
}

impl Order {
    pub fn sort_state(&self) -> SortState {
        match self.sort {
            Some(column) if self.desc => SortState::by(column, SortDirection::Descending),
            Some(column) => SortState::by(column, SortDirection::Ascending),
            None => SortState::default(),
        }
    }
}
