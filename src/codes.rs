// 🏷️ Code Tables - Closed enumerations behind every barcode field
// Wire strings only exist at the parse/serialize boundary; everything else uses these enums.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// LEGACY SHIPMENT TYPE (3 letters)
// ============================================================================

/// ShipmentType - Route category of the legacy `LNG-{TYPE}-{LOC}-{ID}` barcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShipmentType {
    #[serde(rename = "DOM")]
    Domestic,
    #[serde(rename = "INT")]
    International,
    #[serde(rename = "IMP")]
    Import,
    #[serde(rename = "EXP")]
    Export,
    #[serde(rename = "TRN")]
    Transit,
}

impl ShipmentType {
    pub const ALL: [ShipmentType; 5] = [
        ShipmentType::Domestic,
        ShipmentType::International,
        ShipmentType::Import,
        ShipmentType::Export,
        ShipmentType::Transit,
    ];

    /// Wire code used inside the barcode
    pub fn code(&self) -> &'static str {
        match self {
            ShipmentType::Domestic => "DOM",
            ShipmentType::International => "INT",
            ShipmentType::Import => "IMP",
            ShipmentType::Export => "EXP",
            ShipmentType::Transit => "TRN",
        }
    }

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            ShipmentType::Domestic => "Domestic",
            ShipmentType::International => "International",
            ShipmentType::Import => "Import",
            ShipmentType::Export => "Export",
            ShipmentType::Transit => "Transit",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Crosses a national border (customs flows apply)
    pub fn is_international(&self) -> bool {
        matches!(
            self,
            ShipmentType::International | ShipmentType::Import | ShipmentType::Export
        )
    }
}

impl fmt::Display for ShipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// LEGACY LOCATION CODE (3 letters)
// ============================================================================

/// LocationCode - Cities, ports and airports accepted by the legacy barcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LocationCode {
    Lag,
    Abj,
    Kan,
    Phc,
    Oni,
    Ibd,
    Ben,
    Mai,
    Jos,
    Enu,
    Apt,
    Tin,
    Mma,
    Nna,
    Acc,
    Lom,
    Cot,
}

impl LocationCode {
    pub const ALL: [LocationCode; 17] = [
        LocationCode::Lag,
        LocationCode::Abj,
        LocationCode::Kan,
        LocationCode::Phc,
        LocationCode::Oni,
        LocationCode::Ibd,
        LocationCode::Ben,
        LocationCode::Mai,
        LocationCode::Jos,
        LocationCode::Enu,
        LocationCode::Apt,
        LocationCode::Tin,
        LocationCode::Mma,
        LocationCode::Nna,
        LocationCode::Acc,
        LocationCode::Lom,
        LocationCode::Cot,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LocationCode::Lag => "LAG",
            LocationCode::Abj => "ABJ",
            LocationCode::Kan => "KAN",
            LocationCode::Phc => "PHC",
            LocationCode::Oni => "ONI",
            LocationCode::Ibd => "IBD",
            LocationCode::Ben => "BEN",
            LocationCode::Mai => "MAI",
            LocationCode::Jos => "JOS",
            LocationCode::Enu => "ENU",
            LocationCode::Apt => "APT",
            LocationCode::Tin => "TIN",
            LocationCode::Mma => "MMA",
            LocationCode::Nna => "NNA",
            LocationCode::Acc => "ACC",
            LocationCode::Lom => "LOM",
            LocationCode::Cot => "COT",
        }
    }

    /// Full place name shown to users
    pub fn name(&self) -> &'static str {
        match self {
            LocationCode::Lag => "Lagos",
            LocationCode::Abj => "Abuja",
            LocationCode::Kan => "Kano",
            LocationCode::Phc => "Port Harcourt",
            LocationCode::Oni => "Onitsha",
            LocationCode::Ibd => "Ibadan",
            LocationCode::Ben => "Benin City",
            LocationCode::Mai => "Maiduguri",
            LocationCode::Jos => "Jos",
            LocationCode::Enu => "Enugu",
            LocationCode::Apt => "Apapa Port",
            LocationCode::Tin => "Tin Can Port",
            LocationCode::Mma => "Murtala Mohammed Airport",
            LocationCode::Nna => "Nnamdi Azikiwe Airport",
            LocationCode::Acc => "Accra, Ghana",
            LocationCode::Lom => "Lomé, Togo",
            LocationCode::Cot => "Cotonou, Benin",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }

    pub fn is_port_or_airport(&self) -> bool {
        matches!(
            self,
            LocationCode::Apt | LocationCode::Tin | LocationCode::Mma | LocationCode::Nna
        )
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// CLASSIFICATION FIELDS (single character)
// ============================================================================

/// ShipmentClass - First field of the classification code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShipmentClass {
    #[serde(rename = "L")]
    Local,
    #[serde(rename = "R")]
    Regional,
    #[serde(rename = "A")]
    Air,
    #[serde(rename = "S")]
    Sea,
    #[serde(rename = "E")]
    Express,
    #[serde(rename = "W")]
    Warehouse,
}

impl ShipmentClass {
    pub const ALL: [ShipmentClass; 6] = [
        ShipmentClass::Local,
        ShipmentClass::Regional,
        ShipmentClass::Air,
        ShipmentClass::Sea,
        ShipmentClass::Express,
        ShipmentClass::Warehouse,
    ];

    pub fn code(&self) -> char {
        match self {
            ShipmentClass::Local => 'L',
            ShipmentClass::Regional => 'R',
            ShipmentClass::Air => 'A',
            ShipmentClass::Sea => 'S',
            ShipmentClass::Express => 'E',
            ShipmentClass::Warehouse => 'W',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShipmentClass::Local => "Local",
            ShipmentClass::Regional => "Regional",
            ShipmentClass::Air => "Air Freight",
            ShipmentClass::Sea => "Sea Freight",
            ShipmentClass::Express => "Express",
            ShipmentClass::Warehouse => "Warehouse Transfer",
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl fmt::Display for ShipmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// WeightBracket - Coarse declared-weight tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeightBracket {
    #[serde(rename = "1")]
    Small,
    #[serde(rename = "2")]
    Medium,
    #[serde(rename = "3")]
    Heavy,
}

impl WeightBracket {
    pub const ALL: [WeightBracket; 3] = [
        WeightBracket::Small,
        WeightBracket::Medium,
        WeightBracket::Heavy,
    ];

    pub fn code(&self) -> char {
        match self {
            WeightBracket::Small => '1',
            WeightBracket::Medium => '2',
            WeightBracket::Heavy => '3',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeightBracket::Small => "Small",
            WeightBracket::Medium => "Medium",
            WeightBracket::Heavy => "Heavy",
        }
    }

    /// Label with the kilogram range, as printed on labels
    pub fn label(&self) -> &'static str {
        match self {
            WeightBracket::Small => "Small (≤25kg)",
            WeightBracket::Medium => "Medium (25-100kg)",
            WeightBracket::Heavy => "Heavy (>100kg)",
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.code() == code)
    }
}

impl fmt::Display for WeightBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// TimeSensitivity - Processing priority suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeSensitivity {
    #[serde(rename = "X")]
    Express,
    #[serde(rename = "N")]
    Normal,
}

impl TimeSensitivity {
    pub fn code(&self) -> char {
        match self {
            TimeSensitivity::Express => 'X',
            TimeSensitivity::Normal => 'N',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimeSensitivity::Express => "Express",
            TimeSensitivity::Normal => "Standard",
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'X' => Some(TimeSensitivity::Express),
            'N' => Some(TimeSensitivity::Normal),
            _ => None,
        }
    }
}

impl fmt::Display for TimeSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// PLACE CODE & SERIAL
// ============================================================================

/// PlaceCode - Origin/destination code of the classification form
///
/// Registry codes are always 2-3 uppercase ASCII letters. Codes built with
/// `derived()` are best-effort and may not be (short, numeric or hyphenated
/// place names), in which case the rendered barcode will not parse back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceCode(String);

impl PlaceCode {
    /// Strict constructor used at the parse boundary
    pub fn parse(code: &str) -> Option<Self> {
        let well_formed = (2..=3).contains(&code.len())
            && code.chars().all(|c| c.is_ascii_uppercase());
        well_formed.then(|| PlaceCode(code.to_string()))
    }

    /// Fallback for unmapped place names: first three characters, upper-cased
    pub fn derived(place_name: &str) -> Self {
        let prefix: String = place_name.chars().take(3).collect();
        PlaceCode(prefix.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the code would survive a parse round trip
    pub fn is_well_formed(&self) -> bool {
        PlaceCode::parse(&self.0).is_some()
    }
}

impl fmt::Display for PlaceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SerialNumber - Three-digit disambiguator, 000-999
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct SerialNumber(u16);

impl SerialNumber {
    pub const MAX: u16 = 999;

    pub fn new(value: u16) -> Option<Self> {
        (value <= Self::MAX).then_some(SerialNumber(value))
    }

    /// Values above 999 saturate at 999
    pub fn clamped(value: u16) -> Self {
        SerialNumber(value.min(Self::MAX))
    }

    /// Exactly three ASCII digits
    pub fn parse(digits: &str) -> Option<Self> {
        if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().and_then(SerialNumber::new)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for SerialNumber {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        SerialNumber::new(value).ok_or_else(|| format!("serial {} exceeds {}", value, Self::MAX))
    }
}

impl From<SerialNumber> for u16 {
    fn from(serial: SerialNumber) -> Self {
        serial.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

// ============================================================================
// CLASSIFIER INPUT ENUMS
// ============================================================================

/// TransportMode - How the freight moves
///
/// Anything the platform sends that is not one of the four known modes
/// deserializes to `Unknown` instead of failing. CLI arguments, CSV cells and
/// JSON bodies all go through `from_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransportMode {
    Air,
    Sea,
    Rail,
    Land,
    Unknown,
}

impl TransportMode {
    /// Parse a mode name; unrecognized names become `Unknown`
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "AIR" => TransportMode::Air,
            "SEA" => TransportMode::Sea,
            "RAIL" => TransportMode::Rail,
            "LAND" => TransportMode::Land,
            _ => TransportMode::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TransportMode::Air => "AIR",
            TransportMode::Sea => "SEA",
            TransportMode::Rail => "RAIL",
            TransportMode::Land => "LAND",
            TransportMode::Unknown => "UNKNOWN",
        }
    }
}

impl<'de> Deserialize<'de> for TransportMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(TransportMode::from_code(&code))
    }
}

/// WeightUnit - Measurement system of the declared weight
///
/// Deserializes through `from_code`, same as CLI input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeightUnit {
    Metric,
    Imperial,
}

impl WeightUnit {
    /// Kilograms per pound
    pub const KG_PER_LB: f64 = 0.453592;

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "metric" | "kg" => Some(WeightUnit::Metric),
            "imperial" | "lb" | "lbs" => Some(WeightUnit::Imperial),
            _ => None,
        }
    }

    pub fn to_kg(&self, weight: f64) -> f64 {
        match self {
            WeightUnit::Metric => weight,
            WeightUnit::Imperial => weight * Self::KG_PER_LB,
        }
    }
}

impl<'de> Deserialize<'de> for WeightUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        WeightUnit::from_code(&code)
            .ok_or_else(|| de::Error::custom(format!("unknown weight unit {:?}", code)))
    }
}

// ============================================================================
// TESTS
// ============================================================================
