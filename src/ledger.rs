// 🗄️ Barcode Ledger - SQLite record of issued barcodes
//
// The generator never checks for collisions. Uniqueness is enforced here,
// at the storage layer: a second insert of the same barcode string is
// reported as a duplicate, not silently regenerated.

use crate::barcode::Barcode;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A barcode as stored by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedBarcode {
    /// Stable record identity (UUID), independent of the barcode string
    pub id: String,
    pub barcode: String,
    pub format: String,
    pub description: String,
    pub issued_at: DateTime<Utc>,
}

impl IssuedBarcode {
    pub fn new(barcode: &Barcode, description: impl Into<String>) -> Self {
        IssuedBarcode {
            id: uuid::Uuid::new_v4().to_string(),
            barcode: barcode.to_string(),
            format: barcode.format().to_string(),
            description: description.into(),
            issued_at: Utc::now(),
        }
    }
}

/// Outcome of recording a barcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    Inserted,
    /// Barcode string already issued; nothing written
    Duplicate,
}

/// Audit trail entry ("every change is an event")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub barcode: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(event_type: &str, barcode: &str, data: serde_json::Value, actor: &str) -> Self {
        Event {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            barcode: barcode.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS barcodes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            record_uuid TEXT UNIQUE NOT NULL,
            barcode TEXT UNIQUE NOT NULL,
            format TEXT NOT NULL,
            description TEXT NOT NULL,
            issued_at TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            barcode TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_barcode ON events(barcode)",
        [],
    )?;

    Ok(())
}

/// Open (or create) the ledger file and make sure the schema exists
pub fn open_ledger(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open ledger database: {}", path))?;
    setup_database(&conn).context("Failed to initialize ledger schema")?;
    Ok(conn)
}

// ============================================================================
// WRITES
// ============================================================================

/// Insert the barcode row and its `barcode_issued` event atomically
pub fn record_barcode(conn: &Connection, issued: &IssuedBarcode, actor: &str) -> Result<RecordOutcome> {
    // Dropped without commit on any early return: nothing is written
    let tx = conn.unchecked_transaction()?;

    let result = tx.execute(
        "INSERT INTO barcodes (record_uuid, barcode, format, description, issued_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            issued.id,
            issued.barcode,
            issued.format,
            issued.description,
            issued.issued_at.to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => {
            let event = Event::new(
                "barcode_issued",
                &issued.barcode,
                serde_json::json!({
                    "record_uuid": issued.id,
                    "format": issued.format,
                }),
                actor,
            );
            insert_event(&tx, &event)?;
            tx.commit().context("Failed to commit barcode record")?;

            debug!(barcode = %issued.barcode, format = %issued.format, "barcode recorded");
            Ok(RecordOutcome::Inserted)
        }
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            warn!(barcode = %issued.barcode, "barcode already issued");
            Ok(RecordOutcome::Duplicate)
        }
        Err(e) => Err(e).context("Failed to record barcode"),
    }
}

pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (event_id, timestamp, event_type, barcode, data, actor)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.barcode,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

// ============================================================================
// READS
// ============================================================================

/// Tracking lookup: the barcode string is the query key
pub fn find_barcode(conn: &Connection, barcode: &str) -> Result<Option<IssuedBarcode>> {
    let row = conn
        .query_row(
            "SELECT record_uuid, barcode, format, description, issued_at
             FROM barcodes WHERE barcode = ?1",
            params![barcode],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, barcode, format, description, issued_at)) => {
            let issued_at = DateTime::parse_from_rfc3339(&issued_at)
                .with_context(|| format!("Bad issued_at timestamp: {}", issued_at))?
                .with_timezone(&Utc);

            Ok(Some(IssuedBarcode {
                id,
                barcode,
                format,
                description,
                issued_at,
            }))
        }
        None => Ok(None),
    }
}

pub fn get_events_for_barcode(conn: &Connection, barcode: &str) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, barcode, data, actor
         FROM events WHERE barcode = ?1 ORDER BY id",
    )?;

    let rows = stmt.query_map(params![barcode], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut events = Vec::new();
    for row in rows {
        let (event_id, timestamp, event_type, barcode, data, actor) = row?;

        events.push(Event {
            event_id,
            timestamp: DateTime::parse_from_rfc3339(&timestamp)
                .with_context(|| format!("Bad event timestamp: {}", timestamp))?
                .with_timezone(&Utc),
            event_type,
            barcode,
            data: serde_json::from_str(&data).context("Bad event data JSON")?,
            actor,
        });
    }

    Ok(events)
}

pub fn count_barcodes(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM barcodes", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================
