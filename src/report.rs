//! Derived views over the vehicle store: brand grouping, price search and
//! the inventory report in its display and file-export forms.

use std::path::{Path, PathBuf};

use crate::db::VehicleStore;
use crate::error::StoreError;
use crate::types::Vehicle;

/// Fixed attribution line appended to every exported report.
pub const REPORT_FOOTER: &str = "Thank you for using the dealership inventory tool.";

/// Where a rendered inventory report goes. The export base name and
/// directory are parameters: gathering them (prompts, defaults) is the
/// driver's job, never this module's.
pub enum ReportMode<'a> {
    Display,
    Export { dir: &'a Path, base_name: &'a str },
}

/// Inclusive price filter, `min <= price <= max`.
pub fn search_by_price_range<S: VehicleStore + ?Sized>(
    store: &S,
    min: f64,
    max: f64,
) -> Result<Vec<Vehicle>, StoreError> {
    store.search_by_price_range(min, max)
}

/// Rewrite brand, km and price of one vehicle in a single statement.
pub fn update_vehicle_fields<S: VehicleStore + ?Sized>(
    store: &S,
    plate: &str,
    brand: &str,
    km: u32,
    price: f64,
) -> Result<(), StoreError> {
    store.update_vehicle_fields(plate, brand, km, price)
}

/// Partition all vehicles into contiguous same-brand groups.
///
/// The single forward pass is only correct over a brand-sorted read, so this
/// goes through [`VehicleStore::list_basic_by_brand`] and nothing else.
pub fn group_by_brand<S: VehicleStore + ?Sized>(
    store: &S,
) -> Result<Vec<Vec<Vehicle>>, StoreError> {
    let vehicles = store.list_basic_by_brand()?;

    let mut groups: Vec<Vec<Vehicle>> = Vec::new();
    for vehicle in vehicles {
        match groups.last_mut() {
            Some(group) if group[0].brand == vehicle.brand => group.push(vehicle),
            _ => groups.push(vec![vehicle]),
        }
    }
    Ok(groups)
}

/// One formatted line per vehicle, the shared input of both render modes.
pub fn inventory_lines<S: VehicleStore + ?Sized>(store: &S) -> Result<Vec<String>, StoreError> {
    let vehicles = store.list_basic()?;
    Ok(vehicles.iter().map(Vehicle::to_string).collect())
}

/// Render the inventory to stdout or to a uniquely-named text file.
/// Returns the written path in export mode.
pub fn render_inventory_report<S: VehicleStore + ?Sized>(
    store: &S,
    mode: ReportMode<'_>,
) -> Result<Option<PathBuf>, StoreError> {
    let lines = inventory_lines(store)?;

    match mode {
        ReportMode::Display => {
            println!("Vehicle inventory report:");
            for line in &lines {
                println!("{line}");
            }
            Ok(None)
        }
        ReportMode::Export { dir, base_name } => {
            let path = unique_report_path(dir, base_name);
            let mut contents = String::new();
            for line in &lines {
                contents.push_str(line);
                contents.push('\n');
            }
            contents.push('\n');
            contents.push_str(REPORT_FOOTER);
            contents.push('\n');
            std::fs::write(&path, contents)?;
            log::info!("report written to {}", path.display());
            Ok(Some(path))
        }
    }
}

/// `<dir>/<base>.txt`, or `<base>_N.txt` for the smallest N that does not
/// collide with an existing file. Not safe against concurrent writers; the
/// session is single-process.
fn unique_report_path(dir: &Path, base_name: &str) -> PathBuf {
    let mut path = dir.join(format!("{base_name}.txt"));
    let mut n = 1u32;
    while path.exists() {
        path = dir.join(format!("{base_name}_{n}.txt"));
        n += 1;
    }
    path
}

/// Platform Desktop directory under the user's home, if a home is set.
pub fn desktop_dir() -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(var).map(|home| PathBuf::from(home).join("Desktop"))
}
