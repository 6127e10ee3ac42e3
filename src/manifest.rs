// 📦 Manifest - Bulk classification of booking rows
// Rows come in as CSV, leave classified and in manifest sorting order
// (shipment class → destination → weight bracket → serial).
//
// Rows are numbered from 1 with the header excluded, in error messages and
// in the `row` output column alike.

use crate::barcode::ClassificationCode;
use crate::classifier::{ClassificationInput, Classifier};
use anyhow::{Context, Result};
use rand::Rng;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    /// 1-based data row in the source file (header not counted)
    pub row: usize,
    pub input: ClassificationInput,
    pub code: ClassificationCode,
}

/// Flat CSV row written for each entry
#[derive(Debug, Serialize)]
struct ManifestRow<'a> {
    barcode: String,
    code: String,
    shipment_class: &'static str,
    origin: &'a str,
    destination: &'a str,
    weight_bracket: &'static str,
    priority: &'static str,
    origin_city: &'a str,
    destination_city: &'a str,
    weight: f64,
    row: usize,
}

// ============================================================================
// LOADING
// ============================================================================

/// CSV columns: transport_mode, origin_city, origin_country,
/// destination_city, destination_country, weight, unit, express
pub fn load_manifest(csv_path: &Path) -> Result<Vec<ClassificationInput>> {
    let rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open manifest: {}", csv_path.display()))?;

    read_rows(rdr)
}

pub fn read_manifest<R: Read>(reader: R) -> Result<Vec<ClassificationInput>> {
    read_rows(csv::Reader::from_reader(reader))
}

fn read_rows<R: Read>(mut rdr: csv::Reader<R>) -> Result<Vec<ClassificationInput>> {
    let mut rows = Vec::new();

    for (idx, result) in rdr.deserialize().enumerate() {
        let row: ClassificationInput = result
            .with_context(|| format!("Failed to deserialize manifest row {}", idx + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classify every row and sort the result into manifest order
pub fn build_manifest(classifier: &Classifier, rows: Vec<ClassificationInput>) -> Vec<ManifestEntry> {
    build_manifest_with_rng(classifier, rows, &mut rand::thread_rng())
}

pub fn build_manifest_with_rng<R: Rng>(
    classifier: &Classifier,
    rows: Vec<ClassificationInput>,
    rng: &mut R,
) -> Vec<ManifestEntry> {
    let mut entries: Vec<ManifestEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(idx, input)| {
            let code = classifier.classify_with_rng(&input, rng);
            ManifestEntry {
                row: idx + 1,
                input,
                code,
            }
        })
        .collect();

    sort_manifest(&mut entries);

    let malformed = entries
        .iter()
        .filter(|e| !e.code.origin.is_well_formed() || !e.code.destination.is_well_formed())
        .count();
    if malformed > 0 {
        warn!(malformed, "manifest contains place codes that will not parse back");
    }

    info!(entries = entries.len(), "manifest classified");
    entries
}

/// Stable sort: equal keys keep their input order
pub fn sort_manifest(entries: &mut [ManifestEntry]) {
    entries.sort_by(|a, b| a.code.manifest_key().cmp(&b.code.manifest_key()));
}

// ============================================================================
// OUTPUT
// ============================================================================

pub fn write_manifest<W: Write>(writer: W, entries: &[ManifestEntry]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for entry in entries {
        wtr.serialize(ManifestRow {
            barcode: entry.code.to_string(),
            code: entry.code.full_code(),
            shipment_class: entry.code.shipment_class.name(),
            origin: entry.code.origin.as_str(),
            destination: entry.code.destination.as_str(),
            weight_bracket: entry.code.weight_bracket.name(),
            priority: entry.code.time_sensitivity.name(),
            origin_city: &entry.input.origin_city,
            destination_city: &entry.input.destination_city,
            weight: entry.input.weight,
            row: entry.row,
        })
        .context("Failed to write manifest row")?;
    }

    wtr.flush().context("Failed to flush manifest")?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{ShipmentClass, TransportMode, WeightBracket, WeightUnit};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write as _;

    const SAMPLE: &str = "\
transport_mode,origin_city,origin_country,destination_city,destination_country,weight,unit,express
SEA,Apapa,Nigeria,London,United Kingdom,1200,METRIC,false
LAND,Ikeja,Nigeria,Kano,Nigeria,12,kg,false
AIR,Lagos,Nigeria,Dubai,United Arab Emirates,40,lb,true
LAND,Lagos,Nigeria,Accra,Ghana,80,METRIC,false
LAND,Ikeja,Nigeria,Abuja,Nigeria,300,METRIC,true
";

    #[test]
    fn test_read_manifest() {
        let rows = read_manifest(SAMPLE.as_bytes()).unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].transport_mode, TransportMode::Sea);
        assert_eq!(rows[1].unit, WeightUnit::Metric);
        assert_eq!(rows[2].unit, WeightUnit::Imperial);
        assert!(rows[2].express);
    }

    #[test]
    fn test_load_manifest_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let rows = load_manifest(file.path()).unwrap();
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_bad_row_reports_row() {
        let csv = "\
transport_mode,origin_city,origin_country,destination_city,destination_country,weight,unit,express
AIR,Lagos,Nigeria,Dubai,UAE,12,METRIC,false
AIR,Lagos,Nigeria,Dubai,UAE,heavy,METRIC,false
";
        let err = read_manifest(csv.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to deserialize manifest row 2");
    }

    #[test]
    fn test_row_numbers_match_between_errors_and_entries() {
        let classifier = Classifier::default();
        let rows = read_manifest(SAMPLE.as_bytes()).unwrap();
        let entries = build_manifest_with_rng(&classifier, rows, &mut StdRng::seed_from_u64(5));

        // Second data row of SAMPLE is the Ikeja → Kano shipment
        let kano = entries.iter().find(|e| e.input.destination_city == "Kano").unwrap();
        assert_eq!(kano.row, 2);

        let mut broken = SAMPLE.lines().take(2).collect::<Vec<_>>().join("\n");
        broken.push_str("\nLAND,Ikeja,Nigeria,Kano,Nigeria,twelve,kg,false\n");
        let err = read_manifest(broken.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to deserialize manifest row 2");
    }

    #[test]
    fn test_cell_parsing_matches_cli_parsing() {
        let csv = "\
transport_mode,origin_city,origin_country,destination_city,destination_country,weight,unit,express
air,Lagos,Nigeria,Dubai,UAE,10,lbs,false
";
        let rows = read_manifest(csv.as_bytes()).unwrap();

        assert_eq!(rows[0].transport_mode, TransportMode::from_code("air"));
        assert_eq!(rows[0].transport_mode, TransportMode::Air);
        assert_eq!(Some(rows[0].unit), WeightUnit::from_code("lbs"));

        let classifier = Classifier::default();
        let code = classifier.classify_with_rng(&rows[0], &mut StdRng::seed_from_u64(1));
        assert_eq!(code.shipment_class, ShipmentClass::Air);
    }

    #[test]
    fn test_manifest_sort_order() {
        let classifier = Classifier::default();
        let rows = read_manifest(SAMPLE.as_bytes()).unwrap();
        let entries = build_manifest_with_rng(&classifier, rows, &mut StdRng::seed_from_u64(5));

        let classes: Vec<ShipmentClass> = entries.iter().map(|e| e.code.shipment_class).collect();
        assert_eq!(
            classes,
            vec![
                ShipmentClass::Local,
                ShipmentClass::Local,
                ShipmentClass::Regional,
                ShipmentClass::Air,
                ShipmentClass::Sea,
            ]
        );

        // Both Local rows: ABV sorts before KAN
        assert_eq!(entries[0].code.destination.as_str(), "ABV");
        assert_eq!(entries[0].code.weight_bracket, WeightBracket::Heavy);
        assert_eq!(entries[1].code.destination.as_str(), "KAN");
        assert_eq!(entries[1].row, 2);

        // Accra is not in the place table
        assert_eq!(entries[2].code.destination.as_str(), "ACC");
    }

    #[test]
    fn test_sort_breaks_ties_on_weight_then_serial() {
        let classifier = Classifier::default();
        let row = |weight: f64| ClassificationInput {
            transport_mode: TransportMode::Land,
            origin_city: "Ikeja".to_string(),
            origin_country: "Nigeria".to_string(),
            destination_city: "Kano".to_string(),
            destination_country: "Nigeria".to_string(),
            weight,
            unit: WeightUnit::Metric,
            express: false,
        };

        let entries = build_manifest_with_rng(
            &classifier,
            vec![row(500.0), row(5.0), row(50.0), row(6.0)],
            &mut StdRng::seed_from_u64(11),
        );

        let brackets: Vec<WeightBracket> = entries.iter().map(|e| e.code.weight_bracket).collect();
        assert_eq!(
            brackets,
            vec![
                WeightBracket::Small,
                WeightBracket::Small,
                WeightBracket::Medium,
                WeightBracket::Heavy,
            ]
        );
        assert!(entries[0].code.serial <= entries[1].code.serial);
    }

    #[test]
    fn test_write_manifest() {
        let classifier = Classifier::default();
        let rows = read_manifest(SAMPLE.as_bytes()).unwrap();
        let entries = build_manifest_with_rng(&classifier, rows, &mut StdRng::seed_from_u64(5));

        let mut out = Vec::new();
        write_manifest(&mut out, &entries).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("barcode,code,shipment_class,origin,destination,weight_bracket,priority,origin_city,destination_city,weight,row")
        );
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("LNG-S-APA-LON-3-"));
        assert!(text.contains("Sea Freight"));
    }
}
