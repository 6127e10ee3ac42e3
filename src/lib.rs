// Freight Code - Core Library
// Barcode codec, shipment classifier and issue ledger shared by the CLI and API server

pub mod codes;          // Closed code tables: shipment types, locations, classes
pub mod entities;       // Place-name registry
pub mod classifier;     // Shipment → classification code
pub mod barcode;        // Legacy + classified barcode formats
pub mod tracking;       // Tracking / QR links
pub mod manifest;       // Bulk CSV classification
pub mod ledger;         // SQLite record of issued barcodes
pub mod config;         // Environment settings

// Re-export commonly used types
pub use codes::{
    LocationCode, PlaceCode, SerialNumber, ShipmentClass, ShipmentType,
    TimeSensitivity, TransportMode, WeightBracket, WeightUnit,
};
pub use entities::{LocationRegistry, PlaceEntry};
pub use classifier::{ClassificationInput, Classifier};
pub use barcode::{Barcode, BarcodeCodec, BarcodeError, ClassificationCode, LegacyBarcode};
pub use tracking::{RouteInfo, Tracker};
pub use manifest::{build_manifest, load_manifest, write_manifest, ManifestEntry};
pub use ledger::{
    IssuedBarcode, RecordOutcome, Event,
    setup_database, open_ledger, record_barcode, find_barcode,
    insert_event, get_events_for_barcode, count_barcodes,
};
pub use config::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
