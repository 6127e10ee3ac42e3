// ⚙️ Settings - Environment-driven configuration for the CLI and server

use crate::barcode::BarcodeCodec;
use crate::classifier::Classifier;
use crate::entities::LocationRegistry;
use crate::tracking::{Tracker, DEFAULT_TRACKING_URL};
use anyhow::{anyhow, Result};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

pub const DB_VAR: &str = "FREIGHT_CODE_DB";
pub const LOCATIONS_VAR: &str = "FREIGHT_CODE_LOCATIONS";
pub const TRACKING_URL_VAR: &str = "FREIGHT_CODE_TRACKING_URL";
pub const PORT_VAR: &str = "FREIGHT_CODE_PORT";

const DEFAULT_DB: &str = "freight_codes.db";
const DEFAULT_PORT: &str = "3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: String,
    /// JSON file layered over the built-in place table
    pub locations_path: Option<PathBuf>,
    pub tracking_base_url: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup (the process environment in `load`)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            db_path: try_load(&lookup, DB_VAR, DEFAULT_DB)?,
            locations_path: lookup(LOCATIONS_VAR).map(PathBuf::from),
            tracking_base_url: try_load(&lookup, TRACKING_URL_VAR, DEFAULT_TRACKING_URL)?,
        })
    }

    /// Listen port; only the server reads it
    pub fn server_port() -> Result<u16> {
        Self::server_port_from_lookup(|key| env::var(key).ok())
    }

    pub fn server_port_from_lookup<F>(lookup: F) -> Result<u16>
    where
        F: Fn(&str) -> Option<String>,
    {
        try_load(&lookup, PORT_VAR, DEFAULT_PORT)
    }

    /// Built-in places, plus overrides when a locations file is configured
    pub fn load_registry(&self) -> Result<Arc<LocationRegistry>> {
        let registry = match &self.locations_path {
            Some(path) => LocationRegistry::from_file(path)?,
            None => LocationRegistry::new(),
        };
        Ok(Arc::new(registry))
    }

    /// Classifier, codec and tracker sharing one registry
    pub fn build_services(&self) -> Result<(Classifier, Tracker)> {
        let locations = self.load_registry()?;
        let classifier = Classifier::new(Arc::clone(&locations));
        let tracker = Tracker::new(BarcodeCodec::new(locations), self.tracking_base_url.clone());
        Ok((classifier, tracker))
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}
