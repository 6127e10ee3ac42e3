// 📍 Location Registry - Place name → place code
//
// Many-to-one by nature: "Lagos" and "Lagos Island" both map to LOS,
// and some codes are shared by unrelated places (IKO, KAN, ILO...).
// Built once at startup and shared read-only behind an Arc.

use crate::codes::PlaceCode;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Default place table, in registration order
const DEFAULT_PLACES: &[(&str, &str)] = &[
    // Major cities
    ("Lagos", "LOS"),
    ("Abuja", "ABV"),
    ("Port Harcourt", "PHC"),
    ("Kano", "KAN"),
    ("Ibadan", "IBA"),
    ("Benin", "BEN"),
    ("Kaduna", "KAD"),
    ("Maiduguri", "MAI"),
    ("Zaria", "ZAR"),
    ("Aba", "ABA"),
    ("Jos", "JOS"),
    ("Ilorin", "ILO"),
    ("Oyo", "OYO"),
    ("Enugu", "ENU"),
    ("Abeokuta", "ABK"),
    ("Sokoto", "SOK"),
    ("Onitsha", "ONI"),
    ("Warri", "WAR"),
    ("Akure", "AKU"),
    ("Bauchi", "BAU"),
    ("Katsina", "KAT"),
    ("Owerri", "OWE"),
    ("Gombe", "GOM"),
    ("Lokoja", "LOK"),
    ("Ikorodu", "IKO"),
    ("Uyo", "UYO"),
    ("Asaba", "ASA"),
    ("Minna", "MIN"),
    ("Nnewi", "NNE"),
    ("Ilesa", "ILE"),
    ("Ondo", "OND"),
    ("Akwa", "AKW"),
    ("Gusau", "GUS"),
    ("Mubi", "MUB"),
    ("Ikot Ekpene", "IKO"),
    ("Lafia", "LAF"),
    ("Yola", "YOL"),
    ("Umuahia", "UMU"),
    ("Awka", "AWK"),
    ("Damaturu", "DAM"),
    ("Ikire", "IKI"),
    ("Nkpor", "NKP"),
    ("Makurdi", "MAK"),
    ("Kontagora", "KON"),
    ("Garki", "GAR"),
    ("Bida", "BID"),
    ("Sapele", "SAP"),
    ("Gashua", "GAS"),
    ("Biu", "BIU"),
    ("Kazaure", "KAZ"),
    ("Idah", "IDA"),
    ("Potiskum", "POT"),
    ("Koko", "KOK"),
    ("Shaki", "SHA"),
    ("Lere", "LER"),
    ("Kangiwa", "KAN"),
    ("Igboho", "IGB"),
    // South-west towns
    ("Effon Alaiye", "EFF"),
    ("Igbara-Odo", "IGO"),
    ("Ikere-Ekiti", "IKE"),
    ("Ilawe-Ekiti", "ILA"),
    ("Oye-Ekiti", "OYE"),
    ("Ifon-Osun", "IFO"),
    ("Ede", "EDE"),
    ("Ipetu-Ijesha", "IPE"),
    ("Ilobu", "ILO"),
    ("Ikirun", "IKI"),
    ("Iragbiji", "IRA"),
    ("Eruwa", "ERU"),
    ("Ayetoro", "AYE"),
    ("Iganna", "IGA"),
    ("Otu", "OTU"),
    ("Igbo-Ora", "IGO"),
    ("Igboora", "IGB"),
    ("Idere", "IDE"),
    // Lagos districts and LGAs
    ("Lagos Island", "LOS"),
    ("Victoria Island", "VIC"),
    ("Ikoyi", "IKO"),
    ("Surulere", "SUR"),
    ("Yaba", "YAB"),
    ("Mushin", "MUS"),
    ("Oshodi", "OSH"),
    ("Agege", "AGE"),
    ("Alaba", "ALA"),
    ("Badagry", "BAD"),
    ("Epe", "EPE"),
    ("Ibeju-Lekki", "IBE"),
    ("Ifako-Ijaiye", "IFA"),
    ("Ikeja", "IKE"),
    ("Kosofe", "KOS"),
    ("Lagos Mainland", "LAG"),
    ("Ojo", "OJO"),
    ("Ojodu", "OJO"),
    ("Shomolu", "SHO"),
    ("Ajeromi-Ifelodun", "AJE"),
    ("Amuwo-Odofin", "AMU"),
    ("Apapa", "APA"),
    ("Eti-Osa", "ETI"),
    ("Oshodi-Isolo", "OSH"),
    // International hubs
    ("Dubai", "DXB"),
    ("London", "LON"),
    ("New York", "NYC"),
];

// ============================================================================
// PLACE ENTRY
// ============================================================================

/// One row of the registry (also the JSON file format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceEntry {
    pub name: String,
    pub code: PlaceCode,
}

/// Raw file row, validated before it becomes a PlaceEntry
#[derive(Debug, Deserialize)]
struct PlaceRecord {
    name: String,
    code: String,
}

// ============================================================================
// LOCATION REGISTRY
// ============================================================================

/// Registry of known place names
///
/// Lookups are exact, case-sensitive string matches. Registering a name a
/// second time replaces its code (last registration wins).
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    entries: Vec<PlaceEntry>,
    by_name: HashMap<String, usize>,
}

impl LocationRegistry {
    /// Registry with the built-in Nigerian + hub table
    pub fn new() -> Self {
        let mut registry = LocationRegistry::empty();
        registry.register_default_places();
        registry
    }

    /// Registry with no places at all (every lookup falls back)
    pub fn empty() -> Self {
        LocationRegistry {
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    fn register_default_places(&mut self) {
        for (name, code) in DEFAULT_PLACES {
            if let Some(code) = PlaceCode::parse(code) {
                self.register(*name, code);
            }
        }
    }

    /// Default table extended/overridden by a JSON file
    ///
    /// File format: `[{ "name": "Calabar", "code": "CBQ" }, ...]`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read location file: {:?}", path.as_ref()))?;

        let records: Vec<PlaceRecord> =
            serde_json::from_str(&content).context("Failed to parse location JSON")?;

        let mut registry = LocationRegistry::new();
        let defaults = registry.len();

        for record in records {
            let code = PlaceCode::parse(&record.code).ok_or_else(|| {
                anyhow!(
                    "Invalid place code {:?} for {:?}: expected 2-3 uppercase letters",
                    record.code,
                    record.name
                )
            })?;
            registry.register(record.name, code);
        }

        info!(
            path = %path.as_ref().display(),
            defaults,
            total = registry.len(),
            "loaded location registry"
        );

        Ok(registry)
    }

    /// Register (or re-map) a place name
    pub fn register(&mut self, name: impl Into<String>, code: PlaceCode) {
        let name = name.into();

        if let Some(&idx) = self.by_name.get(&name) {
            if self.entries[idx].code != code {
                debug!(%name, old = %self.entries[idx].code, new = %code, "re-mapping place");
            }
            self.entries[idx].code = code;
            return;
        }

        self.by_name.insert(name.clone(), self.entries.len());
        self.entries.push(PlaceEntry { name, code });
    }

    /// Exact-match lookup, no fallback
    pub fn get(&self, place_name: &str) -> Option<&PlaceCode> {
        self.by_name
            .get(place_name)
            .map(|&idx| &self.entries[idx].code)
    }

    /// First registered name carrying this code (used for descriptions)
    pub fn name_for(&self, code: &PlaceCode) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| &entry.code == code)
            .map(|entry| entry.name.as_str())
    }

    /// All names sharing a code
    pub fn names_for(&self, code: &PlaceCode) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| &entry.code == code)
            .map(|entry| entry.name.as_str())
            .collect()
    }

    pub fn entries(&self) -> &[PlaceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn code(s: &str) -> PlaceCode {
        PlaceCode::parse(s).unwrap()
    }

    #[test]
    fn test_default_places() {
        let registry = LocationRegistry::new();

        assert_eq!(registry.get("Lagos"), Some(&code("LOS")));
        assert_eq!(registry.get("Abuja"), Some(&code("ABV")));
        assert_eq!(registry.get("Lagos Mainland"), Some(&code("LAG")));
        assert_eq!(registry.get("Dubai"), Some(&code("DXB")));
        assert_eq!(registry.get("New York"), Some(&code("NYC")));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = LocationRegistry::new();

        assert!(registry.get("lagos").is_none());
        assert!(registry.get("LAGOS").is_none());
        assert!(registry.get(" Lagos").is_none());
    }

    #[test]
    fn test_many_to_one_codes() {
        let registry = LocationRegistry::new();

        let iko = registry.names_for(&code("IKO"));
        assert_eq!(iko, vec!["Ikorodu", "Ikot Ekpene", "Ikoyi"]);

        // First registration wins for display
        assert_eq!(registry.name_for(&code("LOS")), Some("Lagos"));
        assert_eq!(registry.name_for(&code("ZZZ")), None);
    }

    #[test]
    fn test_register_remaps_existing_name() {
        let mut registry = LocationRegistry::new();
        let before = registry.len();

        registry.register("Lagos", code("LAG"));

        assert_eq!(registry.len(), before);
        assert_eq!(registry.get("Lagos"), Some(&code("LAG")));
    }

    #[test]
    fn test_from_file_extends_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Calabar", "code": "CBQ"}}, {{"name": "Kano", "code": "KN"}}]"#
        )
        .unwrap();

        let registry = LocationRegistry::from_file(file.path()).unwrap();

        assert_eq!(registry.get("Calabar"), Some(&code("CBQ")));
        assert_eq!(registry.get("Kano"), Some(&code("KN")));
        assert_eq!(registry.get("Lagos"), Some(&code("LOS")));
    }

    #[test]
    fn test_from_file_rejects_bad_codes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "Calabar", "code": "calabar"}}]"#).unwrap();

        let err = LocationRegistry::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid place code"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = LocationRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.get("Lagos").is_none());
    }
}
