use std::io::BufRead;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::cli::{self, Command, OwnerCommand, ReportCommand, VehicleCommand};
use crate::configuration::Configuration;
use crate::db::{OwnerStore, SqliteInventory, VehicleStore};
use crate::report::{self, ReportMode};

/// Parse the CLI, open the store, dispatch one command, close the store.
pub fn run() -> Result<()> {
    dotenv().ok();
    let cli = cli::parse();
    let _log_guard = crate::tracing::init(cli.log_file.as_deref())?;

    let config = Configuration::from_cli(&cli);
    log_startup(&config);

    if config.reset {
        SqliteInventory::reset(&config.db_path).context("resetting database")?;
    }

    let db = SqliteInventory::open(&config)?;
    let result = dispatch(&db, &cli.command);
    let closed = db.close();

    result?;
    closed?;
    Ok(())
}

fn log_startup(config: &Configuration) {
    tracing::info!("🚀 Starting dealerdb");
    tracing::info!("📂 Database: {}", config.db_path.display());
    if let Some(path) = config.log_file.as_deref() {
        tracing::info!("📝 Log file: {}", path.display());
    }
}

fn dispatch(db: &SqliteInventory, command: &Command) -> Result<()> {
    match command {
        Command::Owner(cmd) => run_owner(db, cmd),
        Command::Vehicle(cmd) => run_vehicle(db, cmd),
        Command::Report(cmd) => run_report(db, cmd),
    }
}

fn run_owner(db: &SqliteInventory, cmd: &OwnerCommand) -> Result<()> {
    match cmd {
        OwnerCommand::Add { name, document } => {
            db.insert_owner(name, document).context("inserting owner")?;
            let owner = db
                .find_owner(document)?
                .context("owner vanished after insert")?;
            println!("owner added with id {}", owner.id);
        }
        OwnerCommand::Rm { document } => {
            let rows = db.delete_owner(document).context("deleting owner")?;
            println!("{rows} owner(s) removed");
        }
        OwnerCommand::Vehicles { document, json } => {
            let vehicles = db.vehicles_of_owner(document)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&vehicles)?);
            } else {
                for vehicle in &vehicles {
                    println!("{vehicle}");
                }
            }
        }
        OwnerCommand::Ls { json } => {
            let owners = db.list_owners()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&owners)?);
            } else {
                for owner in &owners {
                    println!("{owner}");
                }
            }
        }
    }
    Ok(())
}

fn run_vehicle(db: &SqliteInventory, cmd: &VehicleCommand) -> Result<()> {
    match cmd {
        VehicleCommand::Add {
            plate,
            brand,
            km,
            price,
            owner_id,
        } => {
            db.insert_vehicle(plate, brand, *km, *price, *owner_id)
                .context("inserting vehicle")?;
            println!("vehicle {plate} added");
        }
        VehicleCommand::Rm { plate } => {
            db.delete_vehicle(plate).context("deleting vehicle")?;
            println!("vehicle {plate} removed");
        }
        VehicleCommand::SetOwner { plate, owner_id } => {
            db.update_owner(plate, *owner_id)
                .context("updating vehicle owner")?;
            println!("vehicle {plate} now belongs to owner {owner_id}");
        }
        VehicleCommand::Update {
            plate,
            brand,
            km,
            price,
        } => {
            report::update_vehicle_fields(db, plate, brand, *km, *price)
                .context("updating vehicle")?;
            println!("vehicle {plate} updated");
        }
        VehicleCommand::Ls { brand, basic, json } => {
            if *basic {
                let vehicles = db.list_basic()?;
                print_list(&vehicles, *json)?;
            } else {
                let vehicles = match brand {
                    Some(brand) => db.list_by_brand(brand)?,
                    None => db.list_all()?,
                };
                print_list(&vehicles, *json)?;
            }
        }
    }
    Ok(())
}

fn run_report(db: &SqliteInventory, cmd: &ReportCommand) -> Result<()> {
    let outcome = match cmd {
        ReportCommand::Show => {
            report::render_inventory_report(db, ReportMode::Display).map(|_| ())
        }
        ReportCommand::Export { name, dir } => export_report(db, name.as_deref(), dir.as_deref()),
        ReportCommand::ByBrand { json } => report::group_by_brand(db).map(|groups| {
            if *json {
                match serde_json::to_string_pretty(&groups) {
                    Ok(s) => println!("{s}"),
                    Err(e) => log::error!("serializing groups: {e}"),
                }
            } else {
                for group in &groups {
                    println!("-- {} --", group[0].brand);
                    for vehicle in group {
                        println!("{vehicle}");
                    }
                }
            }
        }),
        ReportCommand::PriceRange { min, max, json } => {
            report::search_by_price_range(db, *min, *max).map(|vehicles| {
                if let Err(e) = print_list(&vehicles, *json) {
                    log::error!("printing vehicles: {e}");
                }
            })
        }
    };

    // A failed inventory read is non-fatal for reports: say so and stop.
    // A failed export write is a different thing and keeps its diagnostic.
    match outcome {
        Err(err @ crate::error::StoreError::Io(_)) => {
            Err(err).context("writing the inventory report")
        }
        Err(err) => {
            log::warn!("inventory unavailable: {err}");
            println!("inventory unavailable");
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}

fn export_report(
    db: &SqliteInventory,
    name: Option<&str>,
    dir: Option<&std::path::Path>,
) -> Result<(), crate::error::StoreError> {
    let base_name = match name {
        Some(name) => name.to_string(),
        None => {
            println!("Report file name (without extension):");
            read_base_name(std::io::stdin().lock())?
        }
    };
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => report::desktop_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot determine the Desktop directory; pass --dir",
            )
        })?,
    };

    let written = report::render_inventory_report(
        db,
        ReportMode::Export {
            dir: &dir,
            base_name: &base_name,
        },
    )?;
    if let Some(path) = written {
        println!("report written to {}", path.display());
    }
    Ok(())
}

/// Read and trim the base file name from the driver's input; empty input
/// falls back to "inventory".
fn read_base_name(mut input: impl BufRead) -> std::io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Ok("inventory".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn print_list<T: std::fmt::Display + serde::Serialize>(items: &[T], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        for item in items {
            println!("{item}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_base_name_trims_whitespace() {
        let name = read_base_name(Cursor::new("  monthly report \n")).unwrap();
        assert_eq!(name, "monthly report");
    }

    #[test]
    fn read_base_name_defaults_when_empty() {
        let name = read_base_name(Cursor::new("\n")).unwrap();
        assert_eq!(name, "inventory");
    }

    #[test]
    fn startup_logging_works_without_an_installed_subscriber() {
        let config = Configuration {
            db_path: std::path::PathBuf::from("dealer.sqlite"),
            log_file: Some(std::path::PathBuf::from("dealer.log")),
            reset: false,
        };
        log_startup(&config);
    }

    #[test]
    fn export_to_a_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Configuration {
            db_path: dir.path().join("dealer.sqlite"),
            log_file: None,
            reset: false,
        };
        let db = SqliteInventory::open(&config).unwrap();

        let missing = dir.path().join("no_such_dir");
        let err = export_report(&db, Some("report"), Some(&missing)).unwrap_err();
        assert!(matches!(err, crate::error::StoreError::Io(_)));
    }
}
