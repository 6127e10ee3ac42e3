// 🧭 Shipment Classifier - Raw shipment attributes → coded barcode fields
// Pure functions over the input plus a read-only location registry.

use crate::barcode::ClassificationCode;
use crate::codes::{
    PlaceCode, SerialNumber, ShipmentClass, TimeSensitivity, TransportMode, WeightBracket,
    WeightUnit,
};
use crate::entities::LocationRegistry;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::debug;

/// Upper bound (inclusive) of the Small bracket, in kg
pub const SMALL_MAX_KG: f64 = 25.0;

/// Upper bound (inclusive) of the Medium bracket, in kg
pub const MEDIUM_MAX_KG: f64 = 100.0;

/// Range serials are drawn from
pub const SERIAL_RANGE: RangeInclusive<u16> = 100..=999;

// ============================================================================
// CLASSIFICATION INPUT
// ============================================================================

/// Shipment attributes as gathered by the booking form / API
///
/// Transient: only used to derive a ClassificationCode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationInput {
    pub transport_mode: TransportMode,
    pub origin_city: String,
    pub origin_country: String,
    pub destination_city: String,
    pub destination_country: String,
    pub weight: f64,
    pub unit: WeightUnit,
    #[serde(default)]
    pub express: bool,
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct Classifier {
    locations: Arc<LocationRegistry>,
}

impl Classifier {
    pub fn new(locations: Arc<LocationRegistry>) -> Self {
        Classifier { locations }
    }

    pub fn locations(&self) -> &LocationRegistry {
        &self.locations
    }

    /// Transport mode + border crossing → shipment class
    ///
    /// Country names are compared as exact strings.
    pub fn classify_shipment_type(
        &self,
        mode: TransportMode,
        origin_country: &str,
        destination_country: &str,
    ) -> ShipmentClass {
        match mode {
            TransportMode::Air => ShipmentClass::Air,
            TransportMode::Sea => ShipmentClass::Sea,
            // Rail is always regional, even inside one country
            TransportMode::Rail => ShipmentClass::Regional,
            TransportMode::Land if origin_country == destination_country => ShipmentClass::Local,
            TransportMode::Land => ShipmentClass::Regional,
            TransportMode::Unknown => ShipmentClass::Local,
        }
    }

    /// Declared weight → bracket (bounds belong to the lower bracket)
    pub fn classify_weight_bracket(&self, weight: f64, unit: WeightUnit) -> WeightBracket {
        let kg = unit.to_kg(weight);

        if kg <= SMALL_MAX_KG {
            WeightBracket::Small
        } else if kg <= MEDIUM_MAX_KG {
            WeightBracket::Medium
        } else {
            WeightBracket::Heavy
        }
    }

    /// Registry code for a place, or the first-three-letters fallback
    pub fn lookup_location_code(&self, place_name: &str) -> PlaceCode {
        match self.locations.get(place_name) {
            Some(code) => code.clone(),
            None => {
                let derived = PlaceCode::derived(place_name);
                debug!(place = place_name, code = %derived, "place not in registry, using derived code");
                derived
            }
        }
    }

    pub fn time_sensitivity(&self, express: bool) -> TimeSensitivity {
        if express {
            TimeSensitivity::Express
        } else {
            TimeSensitivity::Normal
        }
    }

    /// Random serial in 100-999. No uniqueness check against issued codes.
    pub fn generate_serial(&self) -> SerialNumber {
        self.generate_serial_with_rng(&mut rand::thread_rng())
    }

    pub fn generate_serial_with_rng<R: Rng>(&self, rng: &mut R) -> SerialNumber {
        SerialNumber::clamped(rng.gen_range(SERIAL_RANGE))
    }

    /// Derive every field of the classification code
    pub fn classify(&self, input: &ClassificationInput) -> ClassificationCode {
        self.classify_with_rng(input, &mut rand::thread_rng())
    }

    pub fn classify_with_rng<R: Rng>(
        &self,
        input: &ClassificationInput,
        rng: &mut R,
    ) -> ClassificationCode {
        let code = ClassificationCode {
            shipment_class: self.classify_shipment_type(
                input.transport_mode,
                &input.origin_country,
                &input.destination_country,
            ),
            origin: self.lookup_location_code(&input.origin_city),
            destination: self.lookup_location_code(&input.destination_city),
            weight_bracket: self.classify_weight_bracket(input.weight, input.unit),
            serial: self.generate_serial_with_rng(rng),
            time_sensitivity: self.time_sensitivity(input.express),
        };

        debug!(code = %code.full_code(), mode = input.transport_mode.code(), "classified shipment");
        code
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(Arc::new(LocationRegistry::new()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
