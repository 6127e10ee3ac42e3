// Entity Models
// Places are the only registry the barcode scheme needs: a name → code table
// built once and shared read-only.

pub mod location;

pub use location::{LocationRegistry, PlaceEntry};
