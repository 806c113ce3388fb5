// Store traits and the SQLite implementation live here.
pub mod sqlite;
pub mod traits;

// Re-export the public interface for downstream consumers.
pub use sqlite::SqliteInventory;
pub use traits::{OwnerStore, VehicleStore};
