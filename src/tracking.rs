// 🔎 Tracking helpers - Links and quick checks built on top of the codec

use crate::barcode::{Barcode, BarcodeCodec};
use serde::Serialize;

/// Public tracking site used when nothing else is configured
pub const DEFAULT_TRACKING_URL: &str = "https://track.logistics.ng";

const QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";
const QR_SIZE: &str = "200x200";

/// Route information recoverable from a barcode alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub origin: String,
    /// Only classified codes carry a destination
    pub destination: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Tracker {
    codec: BarcodeCodec,
    base_url: String,
}

impl Tracker {
    pub fn new(codec: BarcodeCodec, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Tracker { codec, base_url }
    }

    pub fn codec(&self) -> &BarcodeCodec {
        &self.codec
    }

    pub fn tracking_url(&self, barcode: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(barcode))
    }

    /// QR image (SVG) that encodes the tracking link
    pub fn qr_code_url(&self, barcode: &str) -> String {
        format!(
            "{}?size={}&data={}&format=svg",
            QR_ENDPOINT,
            QR_SIZE,
            urlencoding::encode(&self.tracking_url(barcode))
        )
    }

    pub fn route(&self, barcode: &str) -> Option<RouteInfo> {
        match self.codec.decode(barcode)? {
            Barcode::Legacy(legacy) => Some(RouteInfo {
                origin: legacy.location.code().to_string(),
                destination: None,
            }),
            Barcode::Classified(code) => Some(RouteInfo {
                origin: code.origin.to_string(),
                destination: Some(code.destination.to_string()),
            }),
        }
    }

    /// INT, IMP and EXP legacy barcodes; false for anything else
    pub fn is_international(&self, barcode: &str) -> bool {
        self.codec
            .parse(barcode)
            .map(|legacy| legacy.shipment_type.is_international())
            .unwrap_or(false)
    }

    /// Legacy barcodes issued at a seaport or airport
    pub fn is_port_or_airport(&self, barcode: &str) -> bool {
        self.codec
            .parse(barcode)
            .map(|legacy| legacy.location.is_port_or_airport())
            .unwrap_or(false)
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Tracker::new(BarcodeCodec::default(), DEFAULT_TRACKING_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_url() {
        let tracker = Tracker::default();
        assert_eq!(
            tracker.tracking_url("LNG-DOM-LAG-A7K9M2N5"),
            "https://track.logistics.ng/LNG-DOM-LAG-A7K9M2N5"
        );

        let custom = Tracker::new(BarcodeCodec::default(), "http://localhost:3000/track/");
        assert_eq!(
            custom.tracking_url("LNG-DOM-LAG-A7K9M2N5"),
            "http://localhost:3000/track/LNG-DOM-LAG-A7K9M2N5"
        );
    }

    #[test]
    fn test_qr_code_url_encodes_link() {
        let tracker = Tracker::default();
        let url = tracker.qr_code_url("LNG-DOM-LAG-A7K9M2N5");

        assert_eq!(
            url,
            "https://api.qrserver.com/v1/create-qr-code/?size=200x200\
             &data=https%3A%2F%2Ftrack.logistics.ng%2FLNG-DOM-LAG-A7K9M2N5&format=svg"
        );
    }

    #[test]
    fn test_route() {
        let tracker = Tracker::default();

        assert_eq!(
            tracker.route("LNG-EXP-MMA-C9Z5P4R2"),
            Some(RouteInfo {
                origin: "MMA".to_string(),
                destination: None
            })
        );
        assert_eq!(
            tracker.route("LNG-S-APA-LON-3-500N"),
            Some(RouteInfo {
                origin: "APA".to_string(),
                destination: Some("LON".to_string())
            })
        );
        assert_eq!(tracker.route("garbage"), None);
    }

    #[test]
    fn test_international_and_port_checks() {
        let tracker = Tracker::default();

        assert!(tracker.is_international("LNG-IMP-APT-B3X8Q1W7"));
        assert!(tracker.is_international("LNG-INT-ACC-B3X8Q1W7"));
        assert!(!tracker.is_international("LNG-DOM-LAG-A7K9M2N5"));
        assert!(!tracker.is_international("garbage"));

        assert!(tracker.is_port_or_airport("LNG-IMP-APT-B3X8Q1W7"));
        assert!(tracker.is_port_or_airport("LNG-EXP-NNA-B3X8Q1W7"));
        assert!(!tracker.is_port_or_airport("LNG-IMP-LAG-B3X8Q1W7"));
        assert!(!tracker.is_port_or_airport(""));
    }
}
