use crate::error::StoreError;
use crate::types::{Owner, Vehicle, VehicleWithOwner};

/// CRUD operations on the owners table, keyed by the national document.
pub trait OwnerStore {
    /// Insert one owner. Exactly one affected row or an error; a duplicate
    /// document surfaces as [`StoreError::Constraint`].
    fn insert_owner(&self, name: &str, document: &str) -> Result<(), StoreError>;

    /// Delete by document. Returns the number of rows removed (0 when no
    /// owner matches); deleting an owner still referenced by vehicles fails
    /// with [`StoreError::Constraint`].
    fn delete_owner(&self, document: &str) -> Result<usize, StoreError>;

    /// Vehicles of the owner with the given document, ordered by plate.
    fn vehicles_of_owner(&self, document: &str) -> Result<Vec<Vehicle>, StoreError>;

    /// All owners with their surrogate ids, ordered by document.
    fn list_owners(&self) -> Result<Vec<Owner>, StoreError>;

    /// Resolve a document to its stored row, if any.
    fn find_owner(&self, document: &str) -> Result<Option<Owner>, StoreError>;
}

/// CRUD operations and report reads on the vehicles table, keyed by plate.
pub trait VehicleStore {
    fn insert_vehicle(
        &self,
        plate: &str,
        brand: &str,
        km: u32,
        price: f64,
        owner_id: i64,
    ) -> Result<(), StoreError>;

    /// Delete by plate. A missing plate is [`StoreError::NotFound`],
    /// distinct from store-level failures.
    fn delete_vehicle(&self, plate: &str) -> Result<(), StoreError>;

    /// Re-point a vehicle at another owner. Idempotent for a repeated
    /// owner id; [`StoreError::NotFound`] when the plate does not exist.
    fn update_owner(&self, plate: &str, owner_id: i64) -> Result<(), StoreError>;

    /// Update brand, km and price in one statement.
    fn update_vehicle_fields(
        &self,
        plate: &str,
        brand: &str,
        km: u32,
        price: f64,
    ) -> Result<(), StoreError>;

    /// All vehicles joined with the owner name, ordered by plate.
    fn list_all(&self) -> Result<Vec<VehicleWithOwner>, StoreError>;

    /// Exact brand match, joined with the owner name, ordered by plate.
    fn list_by_brand(&self, brand: &str) -> Result<Vec<VehicleWithOwner>, StoreError>;

    /// All vehicles without the owner join, ordered by plate.
    fn list_basic(&self) -> Result<Vec<Vehicle>, StoreError>;

    /// All vehicles ordered by brand, then plate. The contiguous-run
    /// grouping in the report layer requires this ordering.
    fn list_basic_by_brand(&self) -> Result<Vec<Vehicle>, StoreError>;

    /// Inclusive price filter: `min <= price <= max`, ordered by plate.
    fn search_by_price_range(&self, min: f64, max: f64) -> Result<Vec<Vehicle>, StoreError>;
}
