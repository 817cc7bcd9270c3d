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

mod live;
mod sinks;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use ride_dispatch::{DEFAULT_NEAR_TERM_WINDOW_MINUTES, DispatchConfig, PriceTable};
use ride_dispatch_api::{
    ApiError, AuthError, AuthenticatedActor, AuthenticationService, CancelRideRequest,
    CreateRideRequest, DeliverySinks, DispatchEnvironment, EndRideRequest, EstimateRideResponse,
    InactivationResponse, RecordDistanceRequest, RideResponse, StopRideRequest, accept_ride,
    cancel_ride, create_ride, end_ride, estimate_ride, get_ride, record_distance,
    request_driver_inactivation, start_ride, stop_ride,
};
use ride_dispatch_domain::{RideId, UserId};
use ride_dispatch_persistence::{Persistence, PersistenceError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::live::{LiveEventBroadcaster, live_events_handler};
use crate::sinks::{LoggingEmailSink, LoggingNotificationSink, RandomTokenIssuer};

/// Header carrying the caller's user id, set by the fronting identity provider.
const USER_ID_HEADER: &str = "x-user-id";

/// Ride Dispatch Server - HTTP server for ride requests and lifecycle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// A busy driver finishing within this many minutes is still offered new rides
    #[arg(
        long,
        default_value_t = DEFAULT_NEAR_TERM_WINDOW_MINUTES,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    near_term_window_minutes: i64,

    /// JSON file of per-vehicle-type rates merged over the built-in price list
    #[arg(long)]
    pricing: Option<PathBuf>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer, one request at a time.
    persistence: Arc<Mutex<Persistence>>,
    /// Pricing, configuration and delivery channels.
    env: Arc<DispatchEnvironment>,
    /// Real-time ride update fan-out.
    broadcaster: Arc<LiveEventBroadcaster>,
}

impl AppState {
    /// Wires the logging sinks and the live broadcaster around a store.
    fn new(persistence: Persistence, pricing: PriceTable, config: DispatchConfig) -> Self {
        let broadcaster: Arc<LiveEventBroadcaster> = Arc::new(LiveEventBroadcaster::new());
        let sinks: DeliverySinks = DeliverySinks {
            notifications: Arc::new(LoggingNotificationSink),
            email: Arc::new(LoggingEmailSink),
            tokens: Arc::new(RandomTokenIssuer),
            broadcast: broadcaster.clone(),
        };
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            env: Arc::new(DispatchEnvironment {
                pricing: Arc::new(pricing),
                config,
                sinks,
            }),
            broadcaster,
        }
    }
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
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
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

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        Self::from(ApiError::from(err))
    }
}

impl From<PersistenceError> for HttpError {
    fn from(err: PersistenceError) -> Self {
        error!(error = %err, "Persistence error");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Persistence error: {err}"),
        }
    }
}

/// Reads the caller id header.
///
/// An absent header means an anonymous caller; a malformed one is rejected.
fn caller_id(headers: &HeaderMap) -> Result<Option<UserId>, HttpError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map(|id| Some(UserId(id)))
        .ok_or_else(|| {
            warn!("Rejected malformed caller id header");
            HttpError {
                status: StatusCode::UNAUTHORIZED,
                message: format!("Authentication failed: malformed {USER_ID_HEADER} header"),
            }
        })
}

/// Handler for POST `/rides`.
///
/// Requests a ride for the calling passenger.
async fn handle_create_ride(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRideRequest>,
) -> Result<Json<RideResponse>, HttpError> {
    let user_id: Option<UserId> = caller_id(&headers)?;
    info!(user_id = ?user_id, "Handling create_ride request");

    let mut persistence = app_state.persistence.lock().await;
    let actor: Option<AuthenticatedActor> =
        AuthenticationService::authenticate(&mut persistence, user_id)?;
    let response: RideResponse = create_ride(
        &mut persistence,
        &app_state.env,
        actor.as_ref(),
        req,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/rides/estimate`.
async fn handle_estimate_ride(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateRideRequest>,
) -> Result<Json<EstimateRideResponse>, HttpError> {
    let estimate: EstimateRideResponse =
        estimate_ride(&app_state.env, req, OffsetDateTime::now_utc())?;
    Ok(Json(estimate))
}

/// Handler for GET `/rides/{ride_id}`.
async fn handle_get_ride(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ride_id): Path<i64>,
) -> Result<Json<RideResponse>, HttpError> {
    let user_id: Option<UserId> = caller_id(&headers)?;
    let mut persistence = app_state.persistence.lock().await;
    let actor: Option<AuthenticatedActor> =
        AuthenticationService::authenticate(&mut persistence, user_id)?;
    let response: RideResponse = get_ride(&mut persistence, actor.as_ref(), RideId(ride_id))?;
    Ok(Json(response))
}

/// Handler for POST `/rides/{ride_id}/accept`.
async fn handle_accept_ride(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ride_id): Path<i64>,
) -> Result<Json<RideResponse>, HttpError> {
    let user_id: Option<UserId> = caller_id(&headers)?;
    info!(ride_id, user_id = ?user_id, "Handling accept_ride request");

    let mut persistence = app_state.persistence.lock().await;
    let actor: Option<AuthenticatedActor> =
        AuthenticationService::authenticate(&mut persistence, user_id)?;
    let response: RideResponse = accept_ride(
        &mut persistence,
        &app_state.env,
        actor.as_ref(),
        RideId(ride_id),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/rides/{ride_id}/start`.
async fn handle_start_ride(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ride_id): Path<i64>,
) -> Result<Json<RideResponse>, HttpError> {
    let user_id: Option<UserId> = caller_id(&headers)?;
    info!(ride_id, user_id = ?user_id, "Handling start_ride request");

    let mut persistence = app_state.persistence.lock().await;
    let actor: Option<AuthenticatedActor> =
        AuthenticationService::authenticate(&mut persistence, user_id)?;
    let response: RideResponse = start_ride(
        &mut persistence,
        &app_state.env,
        actor.as_ref(),
        RideId(ride_id),
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/rides/{ride_id}/distance`.
async fn handle_record_distance(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ride_id): Path<i64>,
    Json(req): Json<RecordDistanceRequest>,
) -> Result<Json<RideResponse>, HttpError> {
    let user_id: Option<UserId> = caller_id(&headers)?;
    let mut persistence = app_state.persistence.lock().await;
    let actor: Option<AuthenticatedActor> =
        AuthenticationService::authenticate(&mut persistence, user_id)?;
    let response: RideResponse =
        record_distance(&mut persistence, actor.as_ref(), RideId(ride_id), req)?;
    Ok(Json(response))
}

/// Handler for POST `/rides/{ride_id}/cancel`.
async fn handle_cancel_ride(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ride_id): Path<i64>,
    Json(req): Json<CancelRideRequest>,
) -> Result<Json<RideResponse>, HttpError> {
    let user_id: Option<UserId> = caller_id(&headers)?;
    info!(ride_id, user_id = ?user_id, "Handling cancel_ride request");

    let mut persistence = app_state.persistence.lock().await;
    let actor: Option<AuthenticatedActor> =
        AuthenticationService::authenticate(&mut persistence, user_id)?;
    let response: RideResponse = cancel_ride(
        &mut persistence,
        &app_state.env,
        actor.as_ref(),
        RideId(ride_id),
        req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/rides/{ride_id}/end`.
async fn handle_end_ride(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ride_id): Path<i64>,
    Json(req): Json<EndRideRequest>,
) -> Result<Json<RideResponse>, HttpError> {
    let user_id: Option<UserId> = caller_id(&headers)?;
    info!(ride_id, user_id = ?user_id, "Handling end_ride request");

    let mut persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = AuthenticationService::require(&mut persistence, user_id)?;
    let response: RideResponse = end_ride(
        &mut persistence,
        &app_state.env,
        &actor,
        RideId(ride_id),
        req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/rides/{ride_id}/stop`.
async fn handle_stop_ride(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ride_id): Path<i64>,
    Json(req): Json<StopRideRequest>,
) -> Result<Json<RideResponse>, HttpError> {
    let user_id: Option<UserId> = caller_id(&headers)?;
    info!(ride_id, user_id = ?user_id, "Handling stop_ride request");

    let mut persistence = app_state.persistence.lock().await;
    let actor: Option<AuthenticatedActor> =
        AuthenticationService::authenticate(&mut persistence, user_id)?;
    let response: RideResponse = stop_ride(
        &mut persistence,
        &app_state.env,
        actor.as_ref(),
        RideId(ride_id),
        req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/drivers/{driver_id}/inactivate`.
async fn handle_request_inactivation(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(driver_id): Path<i64>,
) -> Result<Json<InactivationResponse>, HttpError> {
    let user_id: Option<UserId> = caller_id(&headers)?;
    info!(driver_id, user_id = ?user_id, "Handling driver inactivation request");

    let mut persistence = app_state.persistence.lock().await;
    let actor: Option<AuthenticatedActor> =
        AuthenticationService::authenticate(&mut persistence, user_id)?;
    let response: InactivationResponse = request_driver_inactivation(
        &mut persistence,
        actor.as_ref(),
        UserId(driver_id),
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/rides", post(handle_create_ride))
        .route("/rides/estimate", post(handle_estimate_ride))
        .route("/rides/{ride_id}", get(handle_get_ride))
        .route("/rides/{ride_id}/accept", post(handle_accept_ride))
        .route("/rides/{ride_id}/start", post(handle_start_ride))
        .route("/rides/{ride_id}/distance", post(handle_record_distance))
        .route("/rides/{ride_id}/cancel", post(handle_cancel_ride))
        .route("/rides/{ride_id}/end", post(handle_end_ride))
        .route("/rides/{ride_id}/stop", post(handle_stop_ride))
        .route(
            "/drivers/{driver_id}/inactivate",
            post(handle_request_inactivation),
        )
        .route("/live", get(live_events_handler))
        .with_state(app_state)
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

    info!("Initializing Ride Dispatch Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let pricing: PriceTable = if let Some(path) = &args.pricing {
        info!("Loading price overrides from: {}", path.display());
        PriceTable::from_json_overrides(&std::fs::read_to_string(path)?)?
    } else {
        PriceTable::default()
    };

    let config: DispatchConfig =
        DispatchConfig::default().with_near_term_window_minutes(args.near_term_window_minutes);
    info!(
        near_term_window_minutes = args.near_term_window_minutes,
        "Dispatch configured"
    );

    let app: Router = build_router(AppState::new(persistence, pricing, config));

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::LiveEvent;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use ride_dispatch_domain::{GeoPoint, VehicleType};
    use ride_dispatch_persistence::NewVehicle;
    use tower::ServiceExt;

    #[test]
    fn test_args_reject_negative_near_term_window() {
        let result = Args::try_parse_from([
            "ride-dispatch-server",
            "--near-term-window-minutes=-5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_accept_zero_near_term_window() {
        let args = Args::try_parse_from([
            "ride-dispatch-server",
            "--near-term-window-minutes",
            "0",
        ])
        .unwrap();
        assert_eq!(args.near_term_window_minutes, 0);
        assert_eq!(args.port, 3000);
    }

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        let persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        AppState::new(persistence, PriceTable::default(), DispatchConfig::default())
    }

    /// Seeds a passenger and a nearby standard driver; returns their ids.
    async fn seed(app_state: &AppState) -> (UserId, UserId) {
        let mut persistence = app_state.persistence.lock().await;
        let passenger: UserId = persistence
            .create_passenger("rider@rides.test", Some("Rider"))
            .unwrap();
        let driver: UserId = persistence
            .create_driver("driver@rides.test", Some("Driver"), true)
            .unwrap();
        persistence
            .create_vehicle(&NewVehicle::new(
                driver,
                VehicleType::Standard,
                GeoPoint::new("Depot", 45.2560, 19.8450),
            ))
            .unwrap();
        (passenger, driver)
    }

    fn ride_request_json(vehicle_type: &str) -> String {
        serde_json::json!({
            "start": { "address": "Bulevar oslobodjenja 1", "latitude": 45.2550, "longitude": 19.8450 },
            "destination": { "address": "Trg slobode 3", "latitude": 45.2640, "longitude": 19.8450 },
            "requirements": { "vehicle_type": vehicle_type }
        })
        .to_string()
    }

    fn post(uri: &str, user: Option<UserId>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_ride_assigns_driver_and_broadcasts() {
        let app_state: AppState = create_test_app_state();
        let (passenger, driver) = seed(&app_state).await;
        let mut rx = app_state.broadcaster.subscribe();
        let app: Router = build_router(app_state.clone());

        let response = app
            .oneshot(post("/rides", Some(passenger), ride_request_json("STANDARD")))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let ride: RideResponse = body_json(response).await;
        assert_eq!(ride.status, "PENDING");
        assert_eq!(ride.driver.unwrap().user_id, driver.value());

        match rx.try_recv() {
            Ok(LiveEvent::RideUpdated { ride_id, ride }) => {
                assert_eq!(Some(ride_id), ride.ride_id);
                assert_eq!(ride.status, "PENDING");
            }
            other => panic!("Expected RideUpdated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_ride_without_caller_is_unauthorized() {
        let app_state: AppState = create_test_app_state();
        seed(&app_state).await;
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(post("/rides", None, ride_request_json("STANDARD")))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
        let body: ErrorResponse = body_json(response).await;
        assert!(body.error);
    }

    #[tokio::test]
    async fn test_malformed_caller_header_is_unauthorized() {
        let app: Router = build_router(create_test_app_state());
        let request = Request::builder()
            .method("POST")
            .uri("/rides")
            .header("content-type", "application/json")
            .header(USER_ID_HEADER, "not-a-number")
            .body(Body::from(ride_request_json("STANDARD")))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_estimate_with_unknown_vehicle_type_is_bad_request() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .oneshot(post("/rides/estimate", None, ride_request_json("BLIMP")))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_estimate_returns_quote() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .oneshot(post("/rides/estimate", None, ride_request_json("LUXURY")))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        let estimate: EstimateRideResponse = body_json(response).await;
        assert!(estimate.estimated_cost > 6.0);
    }

    #[tokio::test]
    async fn test_unknown_ride_is_not_found() {
        let app_state: AppState = create_test_app_state();
        let (passenger, _) = seed(&app_state).await;
        let app: Router = build_router(app_state);

        let request = Request::builder()
            .method("GET")
            .uri("/rides/404")
            .header(USER_ID_HEADER, passenger.to_string())
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ending_pending_ride_is_conflict_then_lifecycle_completes() {
        let app_state: AppState = create_test_app_state();
        let (passenger, driver) = seed(&app_state).await;
        let app: Router = build_router(app_state);

        let created = app
            .clone()
            .oneshot(post("/rides", Some(passenger), ride_request_json("STANDARD")))
            .await
            .unwrap();
        let ride: RideResponse = body_json(created).await;
        let ride_id: i64 = ride.ride_id.unwrap();

        let too_early = app
            .clone()
            .oneshot(post(
                &format!("/rides/{ride_id}/end"),
                Some(driver),
                String::from(r#"{"paid": true, "passengers_exited": true}"#),
            ))
            .await
            .unwrap();
        assert_eq!(too_early.status(), HttpStatusCode::CONFLICT);

        let started = app
            .clone()
            .oneshot(post(
                &format!("/rides/{ride_id}/start"),
                Some(driver),
                String::new(),
            ))
            .await
            .unwrap();
        assert_eq!(started.status(), HttpStatusCode::OK);

        let ended = app
            .clone()
            .oneshot(post(
                &format!("/rides/{ride_id}/end"),
                Some(driver),
                String::from(r#"{"paid": true, "passengers_exited": true}"#),
            ))
            .await
            .unwrap();
        assert_eq!(ended.status(), HttpStatusCode::OK);
        let finished: RideResponse = body_json(ended).await;
        assert_eq!(finished.status, "FINISHED");
        assert!(finished.total_cost.is_some());
    }

    #[tokio::test]
    async fn test_end_ride_requires_caller() {
        let app_state: AppState = create_test_app_state();
        seed(&app_state).await;
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(post("/rides/1/end", None, String::from("{}")))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_driver_inactivation_when_idle() {
        let app_state: AppState = create_test_app_state();
        let (_, driver) = seed(&app_state).await;
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(post(
                &format!("/drivers/{driver}/inactivate"),
                Some(driver),
                String::new(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: InactivationResponse = body_json(response).await;
        assert_eq!(body.outcome, "deactivated");
        assert!(!body.active);
    }
}
