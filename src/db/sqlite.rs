// SQLite-backed inventory store.
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::configuration::Configuration;
use crate::error::StoreError;
use crate::types::{Owner, Vehicle, VehicleWithOwner};

use super::traits::{OwnerStore, VehicleStore};

/// Owns the single connection for the session. Callers open it once at
/// startup, run their statements against it, and close it once at the end;
/// there is no pooling and no retry.
#[derive(Debug)]
pub struct SqliteInventory {
    conn: Connection,
    path: PathBuf,
}

impl SqliteInventory {
    /// Open the database named in the configuration, enforce foreign keys
    /// and install the schema. Any failure on that path is logged and
    /// returned as [`StoreError::Connection`], never a panic.
    pub fn open(config: &Configuration) -> Result<Self, StoreError> {
        let conn = Self::establish(&config.db_path).map_err(|source| {
            log::error!(
                "cannot open database {}: {}",
                config.db_path.display(),
                source
            );
            StoreError::Connection {
                path: config.db_path.clone(),
                source,
            }
        })?;
        Ok(Self {
            conn,
            path: config.db_path.clone(),
        })
    }

    /// Open the connection, apply the session pragmas and install the
    /// schema. The pragmas and the schema are part of establishing a
    /// usable connection, so their failures count as open failures.
    fn establish(path: &Path) -> rusqlite::Result<Connection> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    /// Release the connection. The handle is consumed, so a second close is
    /// unrepresentable; failures are logged and reported upward.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_conn, err)| {
            log::error!("error closing database {}: {}", self.path.display(), err);
            StoreError::from(err)
        })
    }

    /// Remove the backing database file to force a clean start.
    pub fn reset<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(());
        }
        std::fs::remove_file(path)
    }

    /// Create missing tables and indexes.
    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS owners (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                document TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS vehicles (
                plate TEXT PRIMARY KEY,
                brand TEXT NOT NULL,
                km INTEGER NOT NULL CHECK (km >= 0),
                price REAL NOT NULL CHECK (price >= 0),
                owner_id INTEGER NOT NULL REFERENCES owners(id)
            );

            CREATE INDEX IF NOT EXISTS idx_vehicles_brand ON vehicles(brand);
            CREATE INDEX IF NOT EXISTS idx_vehicles_owner ON vehicles(owner_id);
            "#,
        )
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn validate_price(price: f64) -> Result<(), StoreError> {
    if !price.is_finite() || price < 0.0 {
        return Err(StoreError::InvalidPrice(price));
    }
    Ok(())
}

/// One affected row is success; zero is `NotFound`; anything else means the
/// statement was not keyed on a unique column and is reported as such.
fn ensure_single(rows: usize) -> Result<(), StoreError> {
    match rows {
        1 => Ok(()),
        0 => Err(StoreError::NotFound),
        n => Err(StoreError::RowCount(n)),
    }
}

/// Log a failed repository call before handing the error upward.
fn logged<T>(op: &str, res: Result<T, StoreError>) -> Result<T, StoreError> {
    if let Err(err) = &res {
        log::error!("{op}: {err}");
    }
    res
}

fn map_owner_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Owner> {
    Ok(Owner {
        id: row.get(0)?,
        name: row.get(1)?,
        document: row.get(2)?,
    })
}

fn map_vehicle_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vehicle> {
    let km: i64 = row.get(2)?;
    let km: u32 = km.try_into().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Integer, Box::new(err))
    })?;
    Ok(Vehicle {
        plate: row.get(0)?,
        brand: row.get(1)?,
        km,
        price: row.get(3)?,
    })
}

fn map_vehicle_with_owner_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VehicleWithOwner> {
    let km: i64 = row.get(2)?;
    let km: u32 = km.try_into().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Integer, Box::new(err))
    })?;
    Ok(VehicleWithOwner {
        plate: row.get(0)?,
        brand: row.get(1)?,
        km,
        price: row.get(3)?,
        owner_name: row.get(4)?,
    })
}

fn db_list_owners(conn: &Connection) -> rusqlite::Result<Vec<Owner>> {
    let mut stmt = conn.prepare("SELECT id, name, document FROM owners ORDER BY document")?;
    let rows = stmt.query_map([], map_owner_row)?.collect();
    rows
}

fn db_vehicles_of_owner(conn: &Connection, document: &str) -> rusqlite::Result<Vec<Vehicle>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT v.plate, v.brand, v.km, v.price
        FROM vehicles v
        JOIN owners o ON v.owner_id = o.id
        WHERE o.document = ?1
        ORDER BY v.plate
        "#,
    )?;
    let rows = stmt.query_map(params![document], map_vehicle_row)?.collect();
    rows
}

fn db_list_all(conn: &Connection) -> rusqlite::Result<Vec<VehicleWithOwner>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT v.plate, v.brand, v.km, v.price, o.name
        FROM vehicles v
        JOIN owners o ON v.owner_id = o.id
        ORDER BY v.plate
        "#,
    )?;
    let rows = stmt.query_map([], map_vehicle_with_owner_row)?.collect();
    rows
}

fn db_list_by_brand(conn: &Connection, brand: &str) -> rusqlite::Result<Vec<VehicleWithOwner>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT v.plate, v.brand, v.km, v.price, o.name
        FROM vehicles v
        JOIN owners o ON v.owner_id = o.id
        WHERE v.brand = ?1
        ORDER BY v.plate
        "#,
    )?;
    let rows = stmt
        .query_map(params![brand], map_vehicle_with_owner_row)?
        .collect();
    rows
}

fn db_list_basic(conn: &Connection, order: &str) -> rusqlite::Result<Vec<Vehicle>> {
    let sql = format!("SELECT plate, brand, km, price FROM vehicles ORDER BY {order}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_vehicle_row)?.collect();
    rows
}

fn db_search_price_range(conn: &Connection, min: f64, max: f64) -> rusqlite::Result<Vec<Vehicle>> {
    let mut stmt = conn.prepare(
        "SELECT plate, brand, km, price FROM vehicles
         WHERE price BETWEEN ?1 AND ?2
         ORDER BY plate",
    )?;
    let rows = stmt.query_map(params![min, max], map_vehicle_row)?.collect();
    rows
}

impl OwnerStore for SqliteInventory {
    fn insert_owner(&self, name: &str, document: &str) -> Result<(), StoreError> {
        let res = self
            .conn()
            .execute(
                "INSERT INTO owners (name, document) VALUES (?1, ?2)",
                params![name, document],
            )
            .map_err(StoreError::from)
            .and_then(ensure_single);
        logged("insert owner", res)
    }

    fn delete_owner(&self, document: &str) -> Result<usize, StoreError> {
        logged(
            "delete owner",
            self.conn()
                .execute("DELETE FROM owners WHERE document = ?1", params![document])
                .map_err(StoreError::from),
        )
    }

    fn vehicles_of_owner(&self, document: &str) -> Result<Vec<Vehicle>, StoreError> {
        logged(
            "list vehicles of owner",
            db_vehicles_of_owner(self.conn(), document).map_err(StoreError::from),
        )
    }

    fn list_owners(&self) -> Result<Vec<Owner>, StoreError> {
        logged(
            "list owners",
            db_list_owners(self.conn()).map_err(StoreError::from),
        )
    }

    fn find_owner(&self, document: &str) -> Result<Option<Owner>, StoreError> {
        logged(
            "find owner",
            self.conn()
                .query_row(
                    "SELECT id, name, document FROM owners WHERE document = ?1",
                    params![document],
                    map_owner_row,
                )
                .optional()
                .map_err(StoreError::from),
        )
    }
}

impl VehicleStore for SqliteInventory {
    fn insert_vehicle(
        &self,
        plate: &str,
        brand: &str,
        km: u32,
        price: f64,
        owner_id: i64,
    ) -> Result<(), StoreError> {
        let res = validate_price(price)
            .and_then(|()| {
                self.conn()
                    .execute(
                        "INSERT INTO vehicles (plate, brand, km, price, owner_id)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![plate, brand, km as i64, price, owner_id],
                    )
                    .map_err(StoreError::from)
            })
            .and_then(ensure_single);
        logged("insert vehicle", res)
    }

    fn delete_vehicle(&self, plate: &str) -> Result<(), StoreError> {
        let res = self
            .conn()
            .execute("DELETE FROM vehicles WHERE plate = ?1", params![plate])
            .map_err(StoreError::from)
            .and_then(ensure_single);
        logged("delete vehicle", res)
    }

    fn update_owner(&self, plate: &str, owner_id: i64) -> Result<(), StoreError> {
        let res = self
            .conn()
            .execute(
                "UPDATE vehicles SET owner_id = ?1 WHERE plate = ?2",
                params![owner_id, plate],
            )
            .map_err(StoreError::from)
            .and_then(ensure_single);
        logged("update vehicle owner", res)
    }

    fn update_vehicle_fields(
        &self,
        plate: &str,
        brand: &str,
        km: u32,
        price: f64,
    ) -> Result<(), StoreError> {
        let res = validate_price(price)
            .and_then(|()| {
                self.conn()
                    .execute(
                        "UPDATE vehicles SET brand = ?1, km = ?2, price = ?3 WHERE plate = ?4",
                        params![brand, km as i64, price, plate],
                    )
                    .map_err(StoreError::from)
            })
            .and_then(ensure_single);
        logged("update vehicle fields", res)
    }

    fn list_all(&self) -> Result<Vec<VehicleWithOwner>, StoreError> {
        logged(
            "list all vehicles",
            db_list_all(self.conn()).map_err(StoreError::from),
        )
    }

    fn list_by_brand(&self, brand: &str) -> Result<Vec<VehicleWithOwner>, StoreError> {
        logged(
            "list vehicles by brand",
            db_list_by_brand(self.conn(), brand).map_err(StoreError::from),
        )
    }

    fn list_basic(&self) -> Result<Vec<Vehicle>, StoreError> {
        logged(
            "list vehicles",
            db_list_basic(self.conn(), "plate").map_err(StoreError::from),
        )
    }

    fn list_basic_by_brand(&self) -> Result<Vec<Vehicle>, StoreError> {
        logged(
            "list vehicles by brand order",
            db_list_basic(self.conn(), "brand, plate").map_err(StoreError::from),
        )
    }

    fn search_by_price_range(&self, min: f64, max: f64) -> Result<Vec<Vehicle>, StoreError> {
        logged(
            "search vehicles by price range",
            db_search_price_range(self.conn(), min, max).map_err(StoreError::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(prefix: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("{}_{}.db", prefix, nanos));
        p
    }

    fn open_temp(prefix: &str) -> SqliteInventory {
        let config = Configuration {
            db_path: unique_temp_file(prefix),
            log_file: None,
            reset: false,
        };
        SqliteInventory::open(&config).unwrap()
    }

    fn seed_owner(db: &SqliteInventory, name: &str, document: &str) -> i64 {
        db.insert_owner(name, document).unwrap();
        db.find_owner(document).unwrap().unwrap().id
    }

    #[test]
    fn open_installs_schema() {
        let path = unique_temp_file("dealerdb_schema");
        let config = Configuration {
            db_path: path.clone(),
            log_file: None,
            reset: false,
        };
        let db = SqliteInventory::open(&config).unwrap();
        db.close().unwrap();

        let conn = Connection::open(&path).unwrap();
        let table: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='vehicles'",
                [],
                |row| row.get(0),
            )
            .optional()
            .unwrap();
        assert_eq!(table.as_deref(), Some("vehicles"));
    }

    #[test]
    fn open_on_a_non_database_file_is_a_connection_error() {
        let path = unique_temp_file("dealerdb_not_a_db");
        std::fs::write(&path, b"definitely not sqlite").unwrap();
        let config = Configuration {
            db_path: path,
            log_file: None,
            reset: false,
        };

        // Connection::open succeeds lazily; the failure surfaces when the
        // schema install touches the file. It must still classify as a
        // connection-establishment error.
        let err = SqliteInventory::open(&config).unwrap_err();
        assert!(matches!(err, StoreError::Connection { .. }));
    }

    #[test]
    fn reset_ok_when_missing_and_removes_existing_file() {
        let path = unique_temp_file("dealerdb_reset");
        SqliteInventory::reset(&path).unwrap();
        assert!(!path.exists());

        std::fs::write(&path, b"dummy").unwrap();
        SqliteInventory::reset(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn insert_vehicle_roundtrips_through_basic_listing() {
        let db = open_temp("dealerdb_roundtrip");
        let owner_id = seed_owner(&db, "Alice", "11111111A");

        db.insert_vehicle("1234ABC", "Ford", 50_000, 12_500.75, owner_id)
            .unwrap();

        let vehicles = db.list_basic().unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].plate, "1234ABC");
        assert_eq!(vehicles[0].brand, "Ford");
        assert_eq!(vehicles[0].km, 50_000);
        assert_eq!(vehicles[0].price, 12_500.75);
    }

    #[test]
    fn duplicate_owner_document_is_a_constraint_error() {
        let db = open_temp("dealerdb_dup_doc");
        db.insert_owner("Alice", "11111111A").unwrap();
        let err = db.insert_owner("Alicia", "11111111A").unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn duplicate_plate_is_a_constraint_error() {
        let db = open_temp("dealerdb_dup_plate");
        let owner_id = seed_owner(&db, "Alice", "11111111A");
        db.insert_vehicle("1234ABC", "Ford", 0, 100.0, owner_id)
            .unwrap();
        let err = db
            .insert_vehicle("1234ABC", "Honda", 0, 200.0, owner_id)
            .unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn vehicle_with_unknown_owner_is_rejected() {
        let db = open_temp("dealerdb_bad_fk");
        let err = db
            .insert_vehicle("1234ABC", "Ford", 0, 100.0, 999)
            .unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn negative_price_is_rejected_before_reaching_sqlite() {
        let db = open_temp("dealerdb_bad_price");
        let owner_id = seed_owner(&db, "Alice", "11111111A");
        let err = db
            .insert_vehicle("1234ABC", "Ford", 0, -1.0, owner_id)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPrice(_)));
    }

    #[test]
    fn delete_owner_referenced_by_vehicle_fails_and_keeps_row() {
        let db = open_temp("dealerdb_owner_fk");
        let owner_id = seed_owner(&db, "Alice", "11111111A");
        db.insert_vehicle("1234ABC", "Ford", 0, 100.0, owner_id)
            .unwrap();

        let err = db.delete_owner("11111111A").unwrap_err();
        assert!(err.is_constraint());
        assert!(db.find_owner("11111111A").unwrap().is_some());
    }

    #[test]
    fn delete_owner_without_match_reports_zero_rows() {
        let db = open_temp("dealerdb_owner_zero");
        assert_eq!(db.delete_owner("00000000Z").unwrap(), 0);
    }

    #[test]
    fn delete_owner_removes_exactly_one_row() {
        let db = open_temp("dealerdb_owner_del");
        seed_owner(&db, "Alice", "11111111A");
        assert_eq!(db.delete_owner("11111111A").unwrap(), 1);
        assert!(db.find_owner("11111111A").unwrap().is_none());
    }

    #[test]
    fn delete_vehicle_missing_plate_is_not_found() {
        let db = open_temp("dealerdb_veh_missing");
        let err = db.delete_vehicle("0000XXX").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_vehicle_removes_exactly_one_row() {
        let db = open_temp("dealerdb_veh_del");
        let owner_id = seed_owner(&db, "Alice", "11111111A");
        db.insert_vehicle("1234ABC", "Ford", 0, 100.0, owner_id)
            .unwrap();
        db.delete_vehicle("1234ABC").unwrap();
        assert!(db.list_basic().unwrap().is_empty());
    }

    #[test]
    fn update_owner_moves_vehicle_and_is_idempotent() {
        let db = open_temp("dealerdb_set_owner");
        let alice = seed_owner(&db, "Alice", "11111111A");
        let bob = seed_owner(&db, "Bob", "22222222B");
        db.insert_vehicle("1234ABC", "Ford", 0, 100.0, alice)
            .unwrap();

        db.update_owner("1234ABC", bob).unwrap();
        let all = db.list_all().unwrap();
        assert_eq!(all[0].owner_name, "Bob");

        // Same owner again: still one affected row, state unchanged.
        db.update_owner("1234ABC", bob).unwrap();
        let all = db.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].owner_name, "Bob");
    }

    #[test]
    fn update_owner_missing_plate_is_not_found() {
        let db = open_temp("dealerdb_set_owner_missing");
        let alice = seed_owner(&db, "Alice", "11111111A");
        let err = db.update_owner("0000XXX", alice).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_vehicle_fields_rewrites_brand_km_price() {
        let db = open_temp("dealerdb_update_fields");
        let owner_id = seed_owner(&db, "Alice", "11111111A");
        db.insert_vehicle("1234ABC", "Ford", 10, 100.0, owner_id)
            .unwrap();

        db.update_vehicle_fields("1234ABC", "Honda", 20, 250.5)
            .unwrap();
        let vehicles = db.list_basic().unwrap();
        let v = &vehicles[0];
        assert_eq!(v.brand, "Honda");
        assert_eq!(v.km, 20);
        assert_eq!(v.price, 250.5);
    }

    #[test]
    fn listings_are_ordered_by_plate() {
        let db = open_temp("dealerdb_order");
        let owner_id = seed_owner(&db, "Alice", "11111111A");
        db.insert_vehicle("9999ZZZ", "Ford", 0, 1.0, owner_id)
            .unwrap();
        db.insert_vehicle("1111AAA", "Ford", 0, 1.0, owner_id)
            .unwrap();

        let plates: Vec<_> = db
            .list_basic()
            .unwrap()
            .into_iter()
            .map(|v| v.plate)
            .collect();
        assert_eq!(plates, vec!["1111AAA", "9999ZZZ"]);
    }

    #[test]
    fn list_by_brand_filters_exactly() {
        let db = open_temp("dealerdb_brand");
        let owner_id = seed_owner(&db, "Alice", "11111111A");
        db.insert_vehicle("1111AAA", "Ford", 0, 1.0, owner_id)
            .unwrap();
        db.insert_vehicle("2222BBB", "Honda", 0, 1.0, owner_id)
            .unwrap();

        let fords = db.list_by_brand("Ford").unwrap();
        assert_eq!(fords.len(), 1);
        assert_eq!(fords[0].plate, "1111AAA");
        assert!(db.list_by_brand("Seat").unwrap().is_empty());
    }

    #[test]
    fn vehicles_of_owner_follows_the_document_join() {
        let db = open_temp("dealerdb_of_owner");
        let alice = seed_owner(&db, "Alice", "11111111A");
        let bob = seed_owner(&db, "Bob", "22222222B");
        db.insert_vehicle("1111AAA", "Ford", 0, 1.0, alice)
            .unwrap();
        db.insert_vehicle("2222BBB", "Honda", 0, 1.0, bob).unwrap();

        let of_alice = db.vehicles_of_owner("11111111A").unwrap();
        assert_eq!(of_alice.len(), 1);
        assert_eq!(of_alice[0].plate, "1111AAA");
        assert!(db.vehicles_of_owner("00000000Z").unwrap().is_empty());
    }

    #[test]
    fn price_range_boundaries_are_inclusive() {
        let db = open_temp("dealerdb_price");
        let owner_id = seed_owner(&db, "Alice", "11111111A");
        db.insert_vehicle("1111AAA", "Ford", 0, 20_000.00, owner_id)
            .unwrap();
        db.insert_vehicle("2222BBB", "Ford", 0, 20_000.01, owner_id)
            .unwrap();
        db.insert_vehicle("3333CCC", "Ford", 0, 10_000.00, owner_id)
            .unwrap();

        let hits = db.search_by_price_range(10_000.0, 20_000.0).unwrap();
        let plates: Vec<_> = hits.into_iter().map(|v| v.plate).collect();
        assert_eq!(plates, vec!["1111AAA", "3333CCC"]);
    }

    #[test]
    fn brand_ordered_listing_sorts_by_brand_then_plate() {
        let db = open_temp("dealerdb_brand_order");
        let owner_id = seed_owner(&db, "Alice", "11111111A");
        db.insert_vehicle("1111AAA", "Honda", 0, 1.0, owner_id)
            .unwrap();
        db.insert_vehicle("2222BBB", "Ford", 0, 1.0, owner_id)
            .unwrap();
        db.insert_vehicle("3333CCC", "Ford", 0, 1.0, owner_id)
            .unwrap();

        let brands: Vec<_> = db
            .list_basic_by_brand()
            .unwrap()
            .into_iter()
            .map(|v| (v.brand, v.plate))
            .collect();
        assert_eq!(
            brands,
            vec![
                ("Ford".to_string(), "2222BBB".to_string()),
                ("Ford".to_string(), "3333CCC".to_string()),
                ("Honda".to_string(), "1111AAA".to_string()),
            ]
        );
    }
}
