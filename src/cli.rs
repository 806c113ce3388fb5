use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Manage a small dealership inventory of owners and vehicles",
    long_about = "A SQLite-backed inventory manager for a vehicle dealership.\n\nEnvironment:\n  DEALERDB_PATH       SQLite database file (default dealerdb.sqlite)\n  DEALERDB_LOG_FILE   Append logs to this file as well as stderr\n"
)]
pub struct Cli {
    #[arg(
        long = "db",
        env = "DEALERDB_PATH",
        default_value = "dealerdb.sqlite",
        value_name = "PATH",
        help = "SQLite database file"
    )]
    pub db_path: PathBuf,

    #[arg(
        long,
        env = "DEALERDB_LOG_FILE",
        value_name = "PATH",
        help = "Append logs to this file as well as stderr"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = false,
        help = "Delete the database file before starting"
    )]
    pub reset: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Owner operations
    #[command(subcommand)]
    Owner(OwnerCommand),
    /// Vehicle operations
    #[command(subcommand)]
    Vehicle(VehicleCommand),
    /// Inventory reports
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
pub enum OwnerCommand {
    /// Register a new owner
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        document: String,
    },
    /// Delete an owner by document; prints the number of rows removed
    Rm {
        #[arg(long)]
        document: String,
    },
    /// List the vehicles of one owner
    Vehicles {
        #[arg(long)]
        document: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List all owners with their ids
    Ls {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum VehicleCommand {
    /// Register a new vehicle under an existing owner
    Add {
        #[arg(long)]
        plate: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        km: u32,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        owner_id: i64,
    },
    /// Delete a vehicle by plate
    Rm {
        #[arg(long)]
        plate: String,
    },
    /// Re-point a vehicle at another owner
    SetOwner {
        #[arg(long)]
        plate: String,
        #[arg(long)]
        owner_id: i64,
    },
    /// Rewrite brand, km and price of a vehicle
    Update {
        #[arg(long)]
        plate: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        km: u32,
        #[arg(long)]
        price: f64,
    },
    /// List vehicles, joined with the owner name unless --basic
    Ls {
        #[arg(long, help = "Only vehicles of this brand")]
        brand: Option<String>,
        #[arg(long, default_value_t = false, help = "Skip the owner join")]
        basic: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Print the full inventory to stdout
    Show,
    /// Write the inventory to a uniquely-named text file
    Export {
        #[arg(long, help = "Base file name without extension; prompted when absent")]
        name: Option<String>,
        #[arg(long, help = "Destination directory (defaults to the Desktop)")]
        dir: Option<PathBuf>,
    },
    /// Print vehicles grouped by brand
    ByBrand {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print vehicles with min <= price <= max
    PriceRange {
        #[arg(long)]
        min: f64,
        #[arg(long)]
        max: f64,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
