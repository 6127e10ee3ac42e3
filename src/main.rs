use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use freight_code::{
    build_manifest, find_barcode, load_manifest, open_ledger, record_barcode, write_manifest,
    Barcode, ClassificationInput, IssuedBarcode, LocationCode, RecordOutcome, Settings,
    ShipmentType, TransportMode, WeightUnit,
};

const USAGE: &str = "\
Usage: freight-code <command> [args]

Commands:
  generate <TYPE> <LOCATION>     Issue a legacy barcode (TYPE: DOM INT IMP EXP TRN)
  parse <barcode>                Show the fields of a barcode
  validate <barcode>             Check a legacy barcode
  describe <barcode>             One-line description (either format)
  classify <mode> <origin city> <origin country> <dest city> <dest country> <weight> <unit> [--express]
                                 Issue a classification barcode
  manifest <file.csv> [out.csv]  Classify a CSV of shipments in manifest order
  track <barcode>                Ledger record, route and tracking links

Environment: FREIGHT_CODE_DB, FREIGHT_CODE_LOCATIONS, FREIGHT_CODE_TRACKING_URL, RUST_LOG";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    let command: fn(&Settings, &[String]) -> Result<()> = match args.first().map(String::as_str) {
        Some("generate") => run_generate,
        Some("parse") => run_parse,
        Some("validate") => run_validate,
        Some("describe") => run_describe,
        Some("classify") => run_classify,
        Some("manifest") => run_manifest,
        Some("track") => run_track,
        Some("help") | Some("--help") | Some("-h") | None => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => bail!("Unknown command: {}\n\n{}", other, USAGE),
    };

    // Settings are read only once a real command is known
    let settings = Settings::load()?;
    command(&settings, &args[1..])
}

fn barcode_arg(args: &[String]) -> Result<&str> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing <barcode> argument\n\n{}", USAGE))
}

/// Store a freshly issued barcode and report what happened
fn record(settings: &Settings, barcode: &Barcode, description: &str) -> Result<()> {
    let conn = open_ledger(&settings.db_path)?;
    let issued = IssuedBarcode::new(barcode, description);

    match record_barcode(&conn, &issued, "cli")? {
        RecordOutcome::Inserted => println!("✓ Recorded in {}", settings.db_path),
        RecordOutcome::Duplicate => println!("⚠️  Already issued: {} (not recorded again)", barcode),
    }
    Ok(())
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_generate(settings: &Settings, args: &[String]) -> Result<()> {
    let (type_arg, location_arg) = match args {
        [t, l, ..] => (t.to_uppercase(), l.to_uppercase()),
        _ => bail!("generate needs <TYPE> <LOCATION>\n\n{}", USAGE),
    };

    let shipment_type = ShipmentType::from_code(&type_arg)
        .ok_or_else(|| anyhow!("Unknown shipment type: {}", type_arg))?;
    let location = LocationCode::from_code(&location_arg)
        .ok_or_else(|| anyhow!("Unknown location code: {}", location_arg))?;

    let (_, tracker) = settings.build_services()?;
    let codec = tracker.codec();

    let code = codec.generate(shipment_type, location);
    let barcode = codec
        .decode(&code)
        .ok_or_else(|| anyhow!("Generated barcode did not parse: {}", code))?;
    let description = codec.describe(&code);

    println!("🏷️  {}", code);
    println!("   {}", description);
    println!("   {}", tracker.tracking_url(&code));

    record(settings, &barcode, &description)
}

fn run_parse(settings: &Settings, args: &[String]) -> Result<()> {
    let code = barcode_arg(args)?;
    let (_, tracker) = settings.build_services()?;
    let codec = tracker.codec();

    match codec.decode(code) {
        Some(Barcode::Legacy(legacy)) => {
            println!("📦 Legacy barcode");
            println!("   Type:     {} ({})", legacy.shipment_type.code(), legacy.shipment_type.name());
            println!("   Location: {} ({})", legacy.location.code(), legacy.location.name());
            println!("   ID:       {}", legacy.id);
        }
        Some(Barcode::Classified(classified)) => {
            println!("📦 Classification code {}", classified.full_code());
            println!("   Class:       {} ({})", classified.shipment_class.code(), classified.shipment_class.name());
            println!("   Origin:      {}", classified.origin);
            println!("   Destination: {}", classified.destination);
            println!("   Weight:      {}", classified.weight_bracket.label());
            println!("   Serial:      {}", classified.serial);
            println!("   Priority:    {}", classified.time_sensitivity.name());
        }
        None => {
            // Legacy rejection reason is the most useful one to show
            let reason = codec
                .parse_detailed(code)
                .err()
                .map(|e| e.to_string())
                .unwrap_or_default();
            bail!("Invalid barcode {:?}: {}", code, reason);
        }
    }

    Ok(())
}

fn run_validate(settings: &Settings, args: &[String]) -> Result<()> {
    let code = barcode_arg(args)?;
    let (_, tracker) = settings.build_services()?;

    match tracker.codec().parse_detailed(code) {
        Ok(_) => {
            println!("✓ Valid: {}", code);
            Ok(())
        }
        Err(e) => bail!("❌ Invalid: {} ({})", code, e),
    }
}

fn run_describe(settings: &Settings, args: &[String]) -> Result<()> {
    let code = barcode_arg(args)?;
    let (_, tracker) = settings.build_services()?;

    println!("{}", tracker.codec().describe_any(code));
    Ok(())
}

fn run_classify(settings: &Settings, args: &[String]) -> Result<()> {
    let express = args.iter().any(|a| a == "--express");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let [mode, origin_city, origin_country, destination_city, destination_country, weight, unit] =
        positional.as_slice()
    else {
        bail!("classify needs 7 arguments\n\n{}", USAGE);
    };

    let input = ClassificationInput {
        transport_mode: TransportMode::from_code(mode),
        origin_city: origin_city.to_string(),
        origin_country: origin_country.to_string(),
        destination_city: destination_city.to_string(),
        destination_country: destination_country.to_string(),
        weight: weight
            .parse()
            .with_context(|| format!("Invalid weight: {}", weight))?,
        unit: WeightUnit::from_code(unit).ok_or_else(|| anyhow!("Unknown weight unit: {}", unit))?,
        express,
    };

    let (classifier, tracker) = settings.build_services()?;
    let code = classifier.classify(&input);
    let barcode = Barcode::from(code);
    let description = barcode.describe(classifier.locations());

    println!("🏷️  {}", barcode);
    println!("   {}", description);
    println!("   {}", tracker.tracking_url(&barcode.to_string()));

    record(settings, &barcode, &description)
}

fn run_manifest(settings: &Settings, args: &[String]) -> Result<()> {
    let input_path = args
        .first()
        .ok_or_else(|| anyhow!("manifest needs <file.csv>\n\n{}", USAGE))?;

    let (classifier, _) = settings.build_services()?;
    let rows = load_manifest(Path::new(input_path))?;
    let entries = build_manifest(&classifier, rows);

    match args.get(1) {
        Some(output_path) => {
            let file = std::fs::File::create(output_path)
                .with_context(|| format!("Failed to create {}", output_path))?;
            write_manifest(file, &entries)?;
            println!("✓ {} shipments classified → {}", entries.len(), output_path);
        }
        None => write_manifest(std::io::stdout().lock(), &entries)?,
    }

    Ok(())
}

fn run_track(settings: &Settings, args: &[String]) -> Result<()> {
    let code = barcode_arg(args)?;
    let (_, tracker) = settings.build_services()?;

    println!("🔎 {}", tracker.codec().describe_any(code));

    if let Some(route) = tracker.route(code) {
        match route.destination {
            Some(destination) => println!("   Route: {} → {}", route.origin, destination),
            None => println!("   Origin: {}", route.origin),
        }
    }
    if tracker.is_international(code) {
        println!("   International shipment");
    }
    if tracker.is_port_or_airport(code) {
        println!("   Issued at a port/airport");
    }

    let conn = open_ledger(&settings.db_path)?;
    match find_barcode(&conn, code)? {
        Some(issued) => println!("   Issued: {} (record {})", issued.issued_at.to_rfc3339(), issued.id),
        None => println!("   Not found in ledger {}", settings.db_path),
    }

    println!("   Track: {}", tracker.tracking_url(code));
    println!("   QR:    {}", tracker.qr_code_url(code));

    Ok(())
}
