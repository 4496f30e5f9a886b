// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod sweeper;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use fieldbook::Catalog;
use fieldbook_api::{
    ApiError, AvailabilityResponse, CancelReservationRequest, ConfirmReservationRequest,
    CreateBookingRequest, CreatePreferenceRequest, CreatePreferenceResponse, DayScheduleResponse,
    ReconcileError, ReconcileOutcome, ReservationHistoryResponse, ReservationResponse, SlotQuery,
    TransitionResponse, WebhookDelivery, WebhookReconciler, cancel_reservation,
    check_availability, confirm_reservation, create_booking, create_payment_preference,
    get_reservation, get_reservation_history, list_reservations_for_day,
};
use fieldbook_audit::Cause;
use fieldbook_payments::{
    DEFAULT_TOLERANCE_SECS, HttpGatewayConfig, HttpPaymentGateway, InMemoryGateway,
    PaymentGateway, SIGNATURE_HEADER, SignatureVerifier,
};
use fieldbook_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::sweeper::HoldSweeper;

/// Header carrying the caller's request id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Fieldbook Server - sports field reservations with online payment
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Facility catalog (JSON). If not provided, a demo catalog is used.
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Shared secret for payment notification signatures
    #[arg(long, env = "FIELDBOOK_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: String,

    /// Maximum age of a notification signature in seconds (0 disables the check)
    #[arg(long, default_value_t = DEFAULT_TOLERANCE_SECS)]
    signature_tolerance_secs: u64,

    /// Payment gateway API root. If not provided, an in-memory gateway is used.
    #[arg(long)]
    gateway_url: Option<String>,

    /// Payment gateway access token
    #[arg(long, env = "FIELDBOOK_GATEWAY_TOKEN", hide_env_values = true)]
    gateway_token: Option<String>,

    /// Public URL the gateway should post notifications to
    #[arg(long)]
    notification_url: Option<String>,

    /// URL the payer returns to after checkout
    #[arg(long)]
    return_url: Option<String>,

    /// Timeout for each gateway call in seconds
    #[arg(long, default_value_t = 10)]
    gateway_timeout_secs: u64,

    /// Minutes an unpaid pending reservation holds its instance
    #[arg(long, default_value_t = 30)]
    hold_timeout_mins: u64,

    /// Seconds between hold expiry sweeps
    #[arg(long, default_value_t = 60)]
    sweep_interval_secs: u64,
}

/// Application state shared across handlers.
///
/// The ledger is wrapped in a Mutex; handlers never hold it across a
/// gateway call.
#[derive(Clone)]
struct AppState {
    /// The reservation ledger.
    ledger: Arc<Mutex<Persistence>>,
    /// Facility capacity and pricing.
    catalog: Arc<Catalog>,
    /// The payment gateway.
    gateway: Arc<dyn PaymentGateway>,
    /// Applies payment notifications.
    reconciler: WebhookReconciler,
    /// Timeout for preference creation.
    gateway_timeout: Duration,
}

/// Query for listing a facility's day.
#[derive(Debug, Deserialize)]
struct DayQuery {
    /// The date (`YYYY-MM-DD`).
    date: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    /// Always `ok`.
    status: String,
}

/// Body returned for every payment notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NotificationResponse {
    /// `applied`, `ignored`, or `rejected`.
    outcome: String,
    /// The reservation the notification resolved to, if any.
    reservation_id: Option<i64>,
    /// The reservation state after the notification, if it changed.
    state: Option<String>,
    /// A human-readable summary.
    message: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::NoCapacity { .. } | ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::GatewayUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayRejected { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Builds the audit cause for a request, keyed by the caller's request id.
fn request_cause(headers: &HeaderMap, description: &str) -> Cause {
    let id: String = header_value(headers, REQUEST_ID_HEADER)
        .unwrap_or_else(|| format!("http-{}", OffsetDateTime::now_utc().unix_timestamp_nanos()));
    Cause::new(id, description.to_string())
}

/// Handler for GET `/health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Handler for GET `/availability`.
async fn handle_availability(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<AvailabilityResponse>, HttpError> {
    let mut persistence = app_state.ledger.lock().await;
    let response: AvailabilityResponse =
        check_availability(&mut persistence, app_state.catalog.as_ref(), &query)?;
    Ok(Json(response))
}

/// Handler for POST `/bookings`.
///
/// Books the lowest free instance of the requested slot.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), HttpError> {
    info!(
        facility_id = %req.facility_id,
        field_type = %req.field_type,
        date = %req.date,
        time = %req.time,
        "Handling create_booking request"
    );

    let cause: Cause = request_cause(&headers, "Booking request");
    let mut persistence = app_state.ledger.lock().await;
    let response: ReservationResponse = create_booking(
        &mut persistence,
        app_state.catalog.as_ref(),
        req,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    info!(
        reservation_id = response.reservation_id,
        instance_label = %response.instance_label,
        "Booking created"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/bookings/{id}`.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(reservation_id): Path<i64>,
) -> Result<Json<ReservationResponse>, HttpError> {
    let mut persistence = app_state.ledger.lock().await;
    Ok(Json(get_reservation(&mut persistence, reservation_id)?))
}

/// Handler for GET `/bookings/{id}/history`.
async fn handle_get_booking_history(
    AxumState(app_state): AxumState<AppState>,
    Path(reservation_id): Path<i64>,
) -> Result<Json<ReservationHistoryResponse>, HttpError> {
    let mut persistence = app_state.ledger.lock().await;
    Ok(Json(get_reservation_history(
        &mut persistence,
        reservation_id,
    )?))
}

/// Handler for POST `/bookings/{id}/confirm`.
async fn handle_confirm_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(reservation_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<ConfirmReservationRequest>,
) -> Result<Json<TransitionResponse>, HttpError> {
    info!(reservation_id, actor_id = %req.actor_id, "Handling confirm request");

    let cause: Cause = request_cause(&headers, "Manual confirmation");
    let mut persistence = app_state.ledger.lock().await;
    let response: TransitionResponse = confirm_reservation(
        &mut persistence,
        reservation_id,
        &req,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{id}/cancel`.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(reservation_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<CancelReservationRequest>,
) -> Result<Json<TransitionResponse>, HttpError> {
    info!(reservation_id, actor_id = %req.actor_id, "Handling cancel request");

    let cause: Cause = request_cause(&headers, "Cancellation request");
    let mut persistence = app_state.ledger.lock().await;
    let response: TransitionResponse = cancel_reservation(
        &mut persistence,
        reservation_id,
        req,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for GET `/facilities/{facility_id}/reservations`.
async fn handle_list_day(
    AxumState(app_state): AxumState<AppState>,
    Path(facility_id): Path<String>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DayScheduleResponse>, HttpError> {
    let mut persistence = app_state.ledger.lock().await;
    Ok(Json(list_reservations_for_day(
        &mut persistence,
        app_state.catalog.as_ref(),
        &facility_id,
        &query.date,
    )?))
}

/// Handler for POST `/payment/preference`.
///
/// Returns the checkout URL for a pending reservation.
async fn handle_create_preference(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePreferenceRequest>,
) -> Result<Json<CreatePreferenceResponse>, HttpError> {
    info!(reservation_id = req.reservation_id, "Handling create_preference request");

    let cause: Cause = request_cause(&headers, "Payment checkout");
    let response: CreatePreferenceResponse = create_payment_preference(
        &app_state.ledger,
        app_state.gateway.as_ref(),
        req,
        app_state.gateway_timeout,
        cause,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(Json(response))
}

/// Handler for GET and POST `/payment/notification`.
///
/// Answers 200 for every outcome except transient failures, which answer
/// 503 so the gateway redelivers.
async fn handle_notification(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> (StatusCode, Json<NotificationResponse>) {
    let delivery: WebhookDelivery = WebhookDelivery {
        signature: header_value(&headers, SIGNATURE_HEADER),
        request_id: header_value(&headers, REQUEST_ID_HEADER),
        query,
        body: body.to_vec(),
    };

    match app_state
        .reconciler
        .reconcile(&delivery, OffsetDateTime::now_utc())
        .await
    {
        Ok(ReconcileOutcome::Applied {
            reservation_id,
            previous_state,
            state,
        }) => (
            StatusCode::OK,
            Json(NotificationResponse {
                outcome: String::from("applied"),
                reservation_id: Some(reservation_id),
                state: Some(state.to_string()),
                message: format!("Reservation moved from {previous_state} to {state}"),
            }),
        ),
        Ok(ReconcileOutcome::Ignored {
            reservation_id,
            reason,
        }) => (
            StatusCode::OK,
            Json(NotificationResponse {
                outcome: String::from("ignored"),
                reservation_id,
                state: None,
                message: reason.to_string(),
            }),
        ),
        Err(err) => {
            let status: StatusCode = if err.is_transient() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::OK
            };
            let reservation_id: Option<i64> = match &err {
                ReconcileError::CorrelationMismatch { reservation_id, .. }
                | ReconcileError::AmountMismatch { reservation_id, .. } => Some(*reservation_id),
                _ => None,
            };
            (
                status,
                Json(NotificationResponse {
                    outcome: String::from("rejected"),
                    reservation_id,
                    state: None,
                    message: err.to_string(),
                }),
            )
        }
    }
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/availability", get(handle_availability))
        .route("/bookings", post(handle_create_booking))
        .route("/bookings/{id}", get(handle_get_booking))
        .route("/bookings/{id}/history", get(handle_get_booking_history))
        .route("/bookings/{id}/confirm", post(handle_confirm_booking))
        .route("/bookings/{id}/cancel", post(handle_cancel_booking))
        .route(
            "/facilities/{facility_id}/reservations",
            get(handle_list_day),
        )
        .route("/payment/preference", post(handle_create_preference))
        .route(
            "/payment/notification",
            get(handle_notification).post(handle_notification),
        )
        .with_state(app_state)
}

fn build_gateway(
    args: &Args,
    timeout: Duration,
) -> Result<Arc<dyn PaymentGateway>, Box<dyn std::error::Error>> {
    let Some(base_url) = &args.gateway_url else {
        warn!("No --gateway-url given, using the in-memory payment gateway");
        return Ok(Arc::new(InMemoryGateway::new()));
    };
    let access_token: String = args
        .gateway_token
        .clone()
        .ok_or("--gateway-token (or FIELDBOOK_GATEWAY_TOKEN) is required with --gateway-url")?;

    info!(base_url = %base_url, "Using HTTP payment gateway");
    Ok(Arc::new(HttpPaymentGateway::new(HttpGatewayConfig {
        base_url: base_url.clone(),
        access_token,
        notification_url: args.notification_url.clone(),
        return_url: args.return_url.clone(),
        timeout,
    })?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Fieldbook Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let catalog: Catalog = if let Some(path) = &args.catalog {
        info!("Loading facility catalog from: {}", path.display());
        config::load_catalog(path)?
    } else {
        info!("Using demo facility catalog");
        config::demo_catalog()?
    };
    info!(facilities = catalog.len(), "Catalog loaded");

    let gateway_timeout: Duration = Duration::from_secs(args.gateway_timeout_secs);
    let gateway: Arc<dyn PaymentGateway> = build_gateway(&args, gateway_timeout)?;
    let ledger: Arc<Mutex<Persistence>> = Arc::new(Mutex::new(persistence));
    let reconciler: WebhookReconciler = WebhookReconciler::new(
        Arc::clone(&ledger),
        Arc::clone(&gateway),
        SignatureVerifier::new(&args.webhook_secret, args.signature_tolerance_secs),
        gateway_timeout,
    );

    let _sweeper = HoldSweeper::new(
        Arc::clone(&ledger),
        Duration::from_secs(args.hold_timeout_mins.saturating_mul(60)),
    )
    .with_interval(Duration::from_secs(args.sweep_interval_secs))
    .spawn();

    let app_state: AppState = AppState {
        ledger,
        catalog: Arc::new(catalog),
        gateway,
        reconciler,
        gateway_timeout,
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
