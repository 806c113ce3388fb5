use serde::Serialize;

/// An owner row as stored, including the surrogate id assigned by SQLite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub document: String,
}

/// A vehicle without its owner join: the basic projection used by the
/// owner listing, the basic listing and every report view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub plate: String,
    pub brand: String,
    pub km: u32,
    pub price: f64,
}

/// A vehicle joined with the name of its current owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleWithOwner {
    pub plate: String,
    pub brand: String,
    pub km: u32,
    pub price: f64,
    pub owner_name: String,
}

impl std::fmt::Display for Vehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plate: {}, Brand: {}, Km: {}, Price: {:.2}",
            self.plate, self.brand, self.km, self.price
        )
    }
}

impl std::fmt::Display for VehicleWithOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plate: {}, Brand: {}, Km: {}, Price: {:.2}, Owner: {}",
            self.plate, self.brand, self.km, self.price, self.owner_name
        )
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Id: {}, Name: {}, Document: {}",
            self.id, self.name, self.document
        )
    }
}
