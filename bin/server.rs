// Freight Code - Web Server
// REST API over the codec, classifier and ledger

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use freight_code::{
    find_barcode, get_events_for_barcode, open_ledger, record_barcode, Barcode,
    ClassificationInput, Classifier, Event, IssuedBarcode, LocationCode, RecordOutcome,
    RouteInfo, Settings, ShipmentType, Tracker,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    classifier: Arc<Classifier>,
    tracker: Arc<Tracker>,
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    fn ledger(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("ledger lock poisoned".to_string()))
    }

    /// Record a new barcode and build the response body for it
    fn issue(&self, barcode: Barcode) -> Result<(StatusCode, Json<ApiResponse<IssueResponse>>), ApiError> {
        let description = barcode.describe(self.classifier.locations());
        let issued = IssuedBarcode::new(&barcode, description);

        let outcome = record_barcode(&*self.ledger()?, &issued, "api")?;
        let status = match outcome {
            RecordOutcome::Inserted => StatusCode::CREATED,
            RecordOutcome::Duplicate => StatusCode::CONFLICT,
        };

        let code = barcode.to_string();
        let response = IssueResponse {
            tracking_url: self.tracker.tracking_url(&code),
            qr_code_url: self.tracker.qr_code_url(&code),
            barcode,
            description: issued.description,
            outcome,
        };

        Ok((status, Json(ApiResponse::ok(response))))
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Error, Debug)]
enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => {
                error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}

// ============================================================================
// Request / Response bodies
// ============================================================================

#[derive(Deserialize)]
struct GenerateRequest {
    shipment_type: ShipmentType,
    location: LocationCode,
}

#[derive(Serialize)]
struct IssueResponse {
    barcode: Barcode,
    description: String,
    tracking_url: String,
    qr_code_url: String,
    outcome: RecordOutcome,
}

#[derive(Serialize)]
struct DecodeResponse {
    barcode: String,
    /// Legacy-format validity
    valid: bool,
    decoded: Option<Barcode>,
    description: String,
}

#[derive(Serialize)]
struct TrackResponse {
    issued: IssuedBarcode,
    route: Option<RouteInfo>,
    international: bool,
    port_or_airport: bool,
    tracking_url: String,
    qr_code_url: String,
    events: Vec<Event>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/barcodes - Issue a legacy barcode
async fn generate_barcode(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let codec = state.tracker.codec();
    let code = codec.generate(request.shipment_type, request.location);
    let barcode = codec
        .decode(&code)
        .ok_or_else(|| ApiError::Internal(format!("generated barcode did not parse: {}", code)))?;

    state.issue(barcode)
}

/// GET /api/barcodes/:code - Decode and describe either format
async fn decode_barcode(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let codec = state.tracker.codec();

    Json(ApiResponse::ok(DecodeResponse {
        valid: codec.validate(&code),
        decoded: codec.decode(&code),
        description: codec.describe_any(&code),
        barcode: code,
    }))
}

/// POST /api/classify - Classify a shipment and issue its code
async fn classify_shipment(
    State(state): State<AppState>,
    Json(input): Json<ClassificationInput>,
) -> Result<impl IntoResponse, ApiError> {
    let code = state.classifier.classify(&input);
    info!(code = %code, mode = input.transport_mode.code(), "shipment classified");

    state.issue(Barcode::from(code))
}

/// GET /api/track/:code - Ledger record plus tracking links
async fn track_barcode(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (issued, events) = {
        let conn = state.ledger()?;
        let issued = find_barcode(&conn, &code)?;
        let events = get_events_for_barcode(&conn, &code)?;
        (issued, events)
    };

    let issued = issued.ok_or_else(|| {
        warn!(barcode = %code, "tracking lookup for unknown barcode");
        ApiError::NotFound(code.clone())
    })?;

    let tracker = &state.tracker;
    Ok(Json(ApiResponse::ok(TrackResponse {
        route: tracker.route(&code),
        international: tracker.is_international(&code),
        port_or_airport: tracker.is_port_or_airport(&code),
        tracking_url: tracker.tracking_url(&code),
        qr_code_url: tracker.qr_code_url(&code),
        issued,
        events,
    })))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    let port = Settings::server_port()?;
    let (classifier, tracker) = settings.build_services()?;

    let conn = open_ledger(&settings.db_path)?;
    info!(db = %settings.db_path, "ledger opened");

    let state = AppState {
        classifier: Arc::new(classifier),
        tracker: Arc::new(tracker),
        db: Arc::new(Mutex::new(conn)),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/barcodes", post(generate_barcode))
        .route("/barcodes/:code", get(decode_barcode))
        .route("/classify", post(classify_shipment))
        .route("/track/:code", get(track_barcode))
        .with_state(state);

    let app = Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
