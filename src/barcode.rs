// 🔖 Barcode Codec - Generate, parse, validate and describe shipment barcodes
//
// Two wire formats coexist:
//
//   legacy     LNG-{TYPE}-{LOCATION}-{ID}            LNG-DOM-LAG-A7K9M2N5
//   classified [LNG-]{C}-{ORIG}-{DEST}-{W}-{SSS}{T}  LNG-A-LOS-DXB-3-127X
//
// `decode` tries them in that order: legacy (4 segments), then classified
// with the LNG prefix (6 segments), then the bare classified code (5 segments).
// The segment counts never overlap, so at most one format can match.

use crate::codes::{
    LocationCode, PlaceCode, SerialNumber, ShipmentClass, ShipmentType, TimeSensitivity,
    WeightBracket,
};
use crate::entities::LocationRegistry;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Platform namespace prefix
pub const PREFIX: &str = "LNG";

/// Field separator of both formats
pub const SEPARATOR: char = '-';

/// Length of the random legacy identifier
pub const ID_LENGTH: usize = 8;

/// Alphabet of the random legacy identifier (already upper-case)
const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fixed answer of `describe` for anything that does not parse
pub const INVALID_BARCODE: &str = "Invalid barcode";

// ============================================================================
// ERRORS
// ============================================================================

/// Why a string is not a barcode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    #[error("expected {expected} segments, found {found}")]
    SegmentCount { expected: usize, found: usize },

    #[error("unknown prefix {0:?}, expected \"LNG\"")]
    Prefix(String),

    #[error("unknown shipment type {0:?}")]
    ShipmentType(String),

    #[error("unknown location {0:?}")]
    Location(String),

    #[error("invalid {field} field {value:?}")]
    Field { field: &'static str, value: String },
}

impl BarcodeError {
    fn field(field: &'static str, value: &str) -> Self {
        BarcodeError::Field {
            field,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// LEGACY BARCODE (4 fields)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegacyBarcode {
    pub shipment_type: ShipmentType,
    pub location: LocationCode,
    /// Trailing identifier; only its presence is checked when parsing
    pub id: String,
}

impl LegacyBarcode {
    /// Parse the 4-segment form, reporting the first structural problem
    pub fn parse(barcode: &str) -> Result<Self, BarcodeError> {
        let parts: Vec<&str> = barcode.split(SEPARATOR).collect();

        if parts.len() != 4 {
            return Err(BarcodeError::SegmentCount {
                expected: 4,
                found: parts.len(),
            });
        }

        if parts[0] != PREFIX {
            return Err(BarcodeError::Prefix(parts[0].to_string()));
        }

        let shipment_type = ShipmentType::from_code(parts[1])
            .ok_or_else(|| BarcodeError::ShipmentType(parts[1].to_string()))?;

        let location = LocationCode::from_code(parts[2])
            .ok_or_else(|| BarcodeError::Location(parts[2].to_string()))?;

        Ok(LegacyBarcode {
            shipment_type,
            location,
            id: parts[3].to_string(),
        })
    }

    pub fn describe(&self) -> String {
        format!(
            "{} shipment from {}",
            self.shipment_type.name(),
            self.location.name()
        )
    }
}

impl fmt::Display for LegacyBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.shipment_type, self.location, self.id
        )
    }
}

// ============================================================================
// CLASSIFICATION CODE (5 fields)
// ============================================================================

/// ClassificationCode - Fully classified shipment key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassificationCode {
    pub shipment_class: ShipmentClass,
    pub origin: PlaceCode,
    pub destination: PlaceCode,
    pub weight_bracket: WeightBracket,
    pub serial: SerialNumber,
    pub time_sensitivity: TimeSensitivity,
}

impl ClassificationCode {
    /// Code without the platform prefix, e.g. `A-LOS-DXB-3-127X`
    pub fn full_code(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}{}",
            self.shipment_class,
            self.origin,
            self.destination,
            self.weight_bracket,
            self.serial,
            self.time_sensitivity
        )
    }

    /// Parse either `LNG-{code}` or the bare 5-segment code
    pub fn parse(barcode: &str) -> Result<Self, BarcodeError> {
        let parts: Vec<&str> = barcode.split(SEPARATOR).collect();

        let fields = match parts.len() {
            6 if parts[0] == PREFIX => &parts[1..],
            6 => return Err(BarcodeError::Prefix(parts[0].to_string())),
            5 => &parts[..],
            found => return Err(BarcodeError::SegmentCount { expected: 5, found }),
        };

        let shipment_class = single_char(fields[0])
            .and_then(ShipmentClass::from_code)
            .ok_or_else(|| BarcodeError::field("shipment class", fields[0]))?;

        let origin =
            PlaceCode::parse(fields[1]).ok_or_else(|| BarcodeError::field("origin", fields[1]))?;

        let destination = PlaceCode::parse(fields[2])
            .ok_or_else(|| BarcodeError::field("destination", fields[2]))?;

        let weight_bracket = single_char(fields[3])
            .and_then(WeightBracket::from_code)
            .ok_or_else(|| BarcodeError::field("weight bracket", fields[3]))?;

        // Last segment is the 3-digit serial glued to the priority letter
        let tail = fields[4];
        if tail.len() != 4 || !tail.is_ascii() {
            return Err(BarcodeError::field("serial", tail));
        }
        let (digits, priority) = tail.split_at(3);

        let serial = SerialNumber::parse(digits).ok_or_else(|| BarcodeError::field("serial", tail))?;

        let time_sensitivity = single_char(priority)
            .and_then(TimeSensitivity::from_code)
            .ok_or_else(|| BarcodeError::field("time sensitivity", priority))?;

        Ok(ClassificationCode {
            shipment_class,
            origin,
            destination,
            weight_bracket,
            serial,
            time_sensitivity,
        })
    }

    /// Manifest sort key: class → destination → weight bracket → serial
    pub fn manifest_key(&self) -> (ShipmentClass, &PlaceCode, WeightBracket, SerialNumber) {
        (
            self.shipment_class,
            &self.destination,
            self.weight_bracket,
            self.serial,
        )
    }

    pub fn describe(&self, locations: &LocationRegistry) -> String {
        format!(
            "{} shipment from {} to {}, {}, {} priority, serial #{}",
            self.shipment_class.name(),
            place_label(locations, &self.origin),
            place_label(locations, &self.destination),
            self.weight_bracket.label(),
            self.time_sensitivity.name(),
            self.serial
        )
    }
}

/// Unified barcode form, `LNG-{full code}`
impl fmt::Display for ClassificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{SEPARATOR}{}", self.full_code())
    }
}

fn single_char(segment: &str) -> Option<char> {
    let mut chars = segment.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn place_label(locations: &LocationRegistry, code: &PlaceCode) -> String {
    match locations.name_for(code) {
        Some(name) => format!("{} ({})", name, code),
        None => code.to_string(),
    }
}

// ============================================================================
// BARCODE (either format)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Barcode {
    Legacy(LegacyBarcode),
    Classified(ClassificationCode),
}

impl Barcode {
    /// Format name as stored by the ledger
    pub fn format(&self) -> &'static str {
        match self {
            Barcode::Legacy(_) => "legacy",
            Barcode::Classified(_) => "classified",
        }
    }

    pub fn describe(&self, locations: &LocationRegistry) -> String {
        match self {
            Barcode::Legacy(legacy) => legacy.describe(),
            Barcode::Classified(code) => code.describe(locations),
        }
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Barcode::Legacy(legacy) => write!(f, "{}", legacy),
            Barcode::Classified(code) => write!(f, "{}", code),
        }
    }
}

impl From<LegacyBarcode> for Barcode {
    fn from(legacy: LegacyBarcode) -> Self {
        Barcode::Legacy(legacy)
    }
}

impl From<ClassificationCode> for Barcode {
    fn from(code: ClassificationCode) -> Self {
        Barcode::Classified(code)
    }
}

// ============================================================================
// CODEC
// ============================================================================

/// BarcodeCodec - Stateless generator/parser over a shared location registry
#[derive(Debug, Clone)]
pub struct BarcodeCodec {
    locations: Arc<LocationRegistry>,
}

impl BarcodeCodec {
    pub fn new(locations: Arc<LocationRegistry>) -> Self {
        BarcodeCodec { locations }
    }

    pub fn locations(&self) -> &LocationRegistry {
        &self.locations
    }

    /// Render a classification code in its unified `LNG-` form
    ///
    /// Fields are written as-is; a derived place code that is not 2-3
    /// letters produces a string that will not parse back.
    pub fn serialize(&self, code: &ClassificationCode) -> String {
        code.to_string()
    }

    /// New legacy barcode with a random 8-character identifier
    ///
    /// Identifiers are not checked for uniqueness.
    pub fn generate(&self, shipment_type: ShipmentType, location: LocationCode) -> String {
        self.generate_with_rng(shipment_type, location, &mut rand::thread_rng())
    }

    pub fn generate_with_rng<R: Rng>(
        &self,
        shipment_type: ShipmentType,
        location: LocationCode,
        rng: &mut R,
    ) -> String {
        let id: String = (0..ID_LENGTH)
            .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
            .collect();

        LegacyBarcode {
            shipment_type,
            location,
            id,
        }
        .to_string()
    }

    /// Legacy barcode fields, or None when the string is not one
    pub fn parse(&self, barcode: &str) -> Option<LegacyBarcode> {
        self.parse_detailed(barcode).ok()
    }

    /// Same acceptance as `parse`, with the reason for rejection
    pub fn parse_detailed(&self, barcode: &str) -> Result<LegacyBarcode, BarcodeError> {
        LegacyBarcode::parse(barcode)
    }

    pub fn validate(&self, barcode: &str) -> bool {
        self.parse(barcode).is_some()
    }

    /// Human-readable sentence for a legacy barcode
    pub fn describe(&self, barcode: &str) -> String {
        match self.parse(barcode) {
            Some(legacy) => legacy.describe(),
            None => INVALID_BARCODE.to_string(),
        }
    }

    /// Either format: legacy, then `LNG-` classified, then bare classified
    pub fn decode(&self, barcode: &str) -> Option<Barcode> {
        if let Some(legacy) = self.parse(barcode) {
            return Some(Barcode::Legacy(legacy));
        }

        ClassificationCode::parse(barcode)
            .ok()
            .map(Barcode::Classified)
    }

    pub fn describe_any(&self, barcode: &str) -> String {
        match self.decode(barcode) {
            Some(decoded) => decoded.describe(&self.locations),
            None => INVALID_BARCODE.to_string(),
        }
    }
}

impl Default for BarcodeCodec {
    fn default() -> Self {
        BarcodeCodec::new(Arc::new(LocationRegistry::new()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn is_canonical_legacy(barcode: &str, t: &str, l: &str) -> bool {
        let expected_head = format!("LNG-{}-{}-", t, l);
        let Some(id) = barcode.strip_prefix(&expected_head) else {
            return false;
        };
        id.len() == ID_LENGTH
            && id
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }

    fn sample_code() -> ClassificationCode {
        ClassificationCode {
            shipment_class: ShipmentClass::Air,
            origin: PlaceCode::parse("LOS").unwrap(),
            destination: PlaceCode::parse("DXB").unwrap(),
            weight_bracket: WeightBracket::Heavy,
            serial: SerialNumber::new(127).unwrap(),
            time_sensitivity: TimeSensitivity::Express,
        }
    }

    #[test]
    fn test_generate_round_trips_every_pair() {
        let codec = BarcodeCodec::default();

        for t in ShipmentType::ALL {
            for l in LocationCode::ALL {
                let barcode = codec.generate(t, l);
                let parsed = codec.parse(&barcode).expect("generated barcode must parse");

                assert_eq!(parsed.shipment_type, t);
                assert_eq!(parsed.location, l);
                assert!(codec.validate(&barcode));
            }
        }
    }

    #[test]
    fn test_generate_format() {
        let codec = BarcodeCodec::default();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..200 {
            let barcode = codec.generate_with_rng(ShipmentType::Domestic, LocationCode::Lag, &mut rng);
            assert!(is_canonical_legacy(&barcode, "DOM", "LAG"), "bad barcode {}", barcode);
        }
    }

    #[test]
    fn test_describe_generated() {
        let codec = BarcodeCodec::default();
        let barcode = codec.generate(ShipmentType::Domestic, LocationCode::Lag);

        let description = codec.describe(&barcode);
        assert_eq!(description, "Domestic shipment from Lagos");
        assert!(description.contains("Domestic"));
        assert!(description.contains("Lagos"));
    }

    #[test]
    fn test_describe_ports_and_foreign() {
        let codec = BarcodeCodec::default();

        assert_eq!(
            codec.describe("LNG-IMP-APT-B3X8Q1W7"),
            "Import shipment from Apapa Port"
        );
        assert_eq!(
            codec.describe("LNG-EXP-MMA-C9Z5P4R2"),
            "Export shipment from Murtala Mohammed Airport"
        );
        assert_eq!(
            codec.describe("LNG-TRN-LOM-00000000"),
            "Transit shipment from Lomé, Togo"
        );
    }

    #[test]
    fn test_rejects_malformed_input() {
        let codec = BarcodeCodec::default();

        assert!(!codec.validate("not-a-barcode"));
        assert!(!codec.validate("LNG-XX-LAG-12345678"));
        assert!(!codec.validate("LNG-DOM-XXX-12345678"));
        assert!(!codec.validate(""));
        assert!(!codec.validate("ABC-DOM-LAG-12345678"));
        assert!(!codec.validate("LNG-DOM-LAG-1234-5678"));
        assert!(!codec.validate("lng-dom-lag-12345678"));
    }

    #[test]
    fn test_parse_detailed_reasons() {
        let codec = BarcodeCodec::default();

        assert_eq!(
            codec.parse_detailed("not-a-barcode"),
            Err(BarcodeError::SegmentCount { expected: 4, found: 3 })
        );
        assert_eq!(
            codec.parse_detailed("ABC-DOM-LAG-12345678"),
            Err(BarcodeError::Prefix("ABC".to_string()))
        );
        assert_eq!(
            codec.parse_detailed("LNG-XX-LAG-12345678"),
            Err(BarcodeError::ShipmentType("XX".to_string()))
        );
        assert_eq!(
            codec.parse_detailed("LNG-DOM-XXX-12345678"),
            Err(BarcodeError::Location("XXX".to_string()))
        );
    }

    #[test]
    fn test_fourth_segment_only_needs_presence() {
        let codec = BarcodeCodec::default();

        let short = codec.parse("LNG-DOM-LAG-x").unwrap();
        assert_eq!(short.id, "x");

        let empty = codec.parse("LNG-INT-ABJ-").unwrap();
        assert_eq!(empty.id, "");
    }

    #[test]
    fn test_describe_invalid() {
        let codec = BarcodeCodec::default();

        assert_eq!(codec.describe("garbage"), INVALID_BARCODE);
        assert_eq!(codec.describe_any("garbage"), INVALID_BARCODE);
        assert_eq!(codec.describe(""), "Invalid barcode");
    }

    #[test]
    fn test_classification_serialize_round_trip() {
        let codec = BarcodeCodec::default();
        let code = sample_code();

        let serialized = codec.serialize(&code);
        assert_eq!(serialized, "LNG-A-LOS-DXB-3-127X");
        assert_eq!(code.full_code(), "A-LOS-DXB-3-127X");

        assert_eq!(ClassificationCode::parse(&serialized), Ok(code.clone()));
        assert_eq!(ClassificationCode::parse(&code.full_code()), Ok(code));
    }

    #[test]
    fn test_classification_round_trip_all_fields() {
        let mut rng = StdRng::seed_from_u64(3);

        for class in ShipmentClass::ALL {
            for weight in WeightBracket::ALL {
                for priority in [TimeSensitivity::Express, TimeSensitivity::Normal] {
                    let code = ClassificationCode {
                        shipment_class: class,
                        origin: PlaceCode::parse("NY").unwrap(),
                        destination: PlaceCode::parse("PHC").unwrap(),
                        weight_bracket: weight,
                        serial: SerialNumber::new(rng.gen_range(0..=999)).unwrap(),
                        time_sensitivity: priority,
                    };

                    assert_eq!(ClassificationCode::parse(&code.to_string()), Ok(code));
                }
            }
        }
    }

    #[test]
    fn test_classification_rejects_bad_fields() {
        assert!(ClassificationCode::parse("Z-LOS-DXB-3-127X").is_err());
        assert!(ClassificationCode::parse("A-LOSS-DXB-3-127X").is_err());
        assert!(ClassificationCode::parse("A-LOS-dxb-3-127X").is_err());
        assert!(ClassificationCode::parse("A-LOS-DXB-4-127X").is_err());
        assert!(ClassificationCode::parse("A-LOS-DXB-3-12X").is_err());
        assert!(ClassificationCode::parse("A-LOS-DXB-3-127Q").is_err());
        assert!(ClassificationCode::parse("A-LOS-DXB-3-1é7").is_err());
        assert_eq!(
            ClassificationCode::parse("XYZ-A-LOS-DXB-3-127X"),
            Err(BarcodeError::Prefix("XYZ".to_string()))
        );
    }

    #[test]
    fn test_derived_place_code_does_not_round_trip() {
        let codec = BarcodeCodec::default();
        let mut code = sample_code();
        code.origin = PlaceCode::derived("Ek-Ibo");

        let serialized = codec.serialize(&code);
        assert_eq!(serialized, "LNG-A-EK--DXB-3-127X");
        assert!(codec.decode(&serialized).is_none());
    }

    #[test]
    fn test_decode_picks_format() {
        let codec = BarcodeCodec::default();

        match codec.decode("LNG-DOM-LAG-A7K9M2N5") {
            Some(Barcode::Legacy(legacy)) => assert_eq!(legacy.id, "A7K9M2N5"),
            other => panic!("expected legacy, got {:?}", other),
        }

        match codec.decode("LNG-A-LOS-DXB-3-127X") {
            Some(Barcode::Classified(code)) => assert_eq!(code, sample_code()),
            other => panic!("expected classified, got {:?}", other),
        }

        match codec.decode("A-LOS-DXB-3-127X") {
            Some(Barcode::Classified(code)) => assert_eq!(code, sample_code()),
            other => panic!("expected classified, got {:?}", other),
        }

        assert!(codec.decode("not-a-barcode").is_none());
    }

    #[test]
    fn test_validate_stays_legacy_only() {
        let codec = BarcodeCodec::default();

        assert!(!codec.validate("LNG-A-LOS-DXB-3-127X"));
        assert!(codec.decode("LNG-A-LOS-DXB-3-127X").is_some());
    }

    #[test]
    fn test_describe_classified() {
        let codec = BarcodeCodec::default();

        assert_eq!(
            codec.describe_any("LNG-A-LOS-DXB-3-127X"),
            "Air Freight shipment from Lagos (LOS) to Dubai (DXB), Heavy (>100kg), Express priority, serial #127"
        );
        assert_eq!(
            codec.describe_any("L-CAL-UYO-1-004N"),
            "Local shipment from CAL to Uyo (UYO), Small (≤25kg), Standard priority, serial #004"
        );
        assert_eq!(
            codec.describe_any("LNG-DOM-LAG-A7K9M2N5"),
            "Domestic shipment from Lagos"
        );
    }

    #[test]
    fn test_barcode_json_is_tagged() {
        let barcode = Barcode::Classified(sample_code());
        let json = serde_json::to_value(&barcode).unwrap();

        assert_eq!(json["format"], "classified");
        assert_eq!(json["shipment_class"], "A");
        assert_eq!(json["origin"], "LOS");
        assert_eq!(json["serial"], 127);

        let back: Barcode = serde_json::from_value(json).unwrap();
        assert_eq!(back, barcode);
    }
}
