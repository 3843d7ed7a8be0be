use crate::config::Config;
use crate::data::{
    ApiResponse, BookOutput, BookRequest, ErrorBody, FindOptimalOutput, FindOptimalRequest,
    HealthOutput, RandomOccupancyOutput, RandomOccupancyRequest, ResetOutput, RoomView,
    RoomsOutput,
};
use crate::error::{BookingError, OccupancyError, SelectionError};
use crate::solver;
use crate::store::OccupancyStore;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<OccupancyStore>,
    rng: Arc<Mutex<StdRng>>,
    default_rate: f64,
}

impl AppState {
    pub fn new(store: Arc<OccupancyStore>, rng: StdRng, default_rate: f64) -> Self {
        Self {
            store,
            rng: Arc::new(Mutex::new(rng)),
            default_rate,
        }
    }
}

/// Failures a handler can report. Everything except `Internal` is the
/// caller's fault and maps to 400.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    Internal(String),
}

impl From<SelectionError> for ApiError {
    fn from(e: SelectionError) -> Self {
        match e {
            SelectionError::Topology(_) => ApiError::Internal(e.to_string()),
            _ => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<OccupancyError> for ApiError {
    fn from(e: OccupancyError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => {
                warn!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Route not found".to_string()),
            ApiError::Internal(message) => {
                error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        let body = ErrorBody {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

async fn health_handler() -> Json<HealthOutput> {
    Json(HealthOutput {
        status: "OK",
        message: "Hotel Booking API is running",
    })
}

async fn rooms_handler(State(state): State<AppState>) -> Json<ApiResponse<RoomsOutput>> {
    let snapshot = state.store.snapshot();
    Json(ApiResponse::ok(RoomsOutput {
        rooms: snapshot.rooms.into_iter().map(RoomView::from).collect(),
        total_rooms: snapshot.total,
        available_rooms: snapshot.available,
        occupied_rooms: snapshot.occupied,
    }))
}

async fn find_optimal_handler(
    State(state): State<AppState>,
    payload: Result<Json<FindOptimalRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<FindOptimalOutput>>, ApiError> {
    let Json(input) = payload?;
    // negative counts fall outside the valid range just like 0 does
    let requested = usize::try_from(input.num_rooms).unwrap_or(0);
    let available = state.store.available_rooms();
    let selection = solver::select_optimal(state.store.topology(), &available, requested)?;
    Ok(Json(ApiResponse::ok(selection.into())))
}

async fn book_handler(
    State(state): State<AppState>,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BookOutput>>, ApiError> {
    let Json(input) = payload?;
    let booked = state.store.book(&input.room_ids)?;
    Ok(Json(ApiResponse::ok(BookOutput {
        booked_count: booked.len(),
        message: format!("Successfully booked {} rooms", booked.len()),
        booked_rooms: booked,
    })))
}

async fn random_occupancy_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<RandomOccupancyOutput>>, ApiError> {
    // an absent body means "use the default rate"; anything else must parse
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RandomOccupancyRequest::default()
    } else {
        serde_json::from_slice::<RandomOccupancyRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?
    };
    let rate = request.rate.unwrap_or(state.default_rate);

    let occupied_count = {
        let mut rng = state.rng.lock().unwrap_or_else(PoisonError::into_inner);
        state.store.occupy_random(rate, &mut *rng)?
    };

    Ok(Json(ApiResponse::ok(RandomOccupancyOutput {
        occupied_count,
        available_count: state.store.topology().len() - occupied_count,
        message: format!("Generated random occupancy: {} rooms occupied", occupied_count),
    })))
}

async fn reset_handler(State(state): State<AppState>) -> Json<ApiResponse<ResetOutput>> {
    let available_rooms = state.store.reset();
    Json(ApiResponse::ok(ResetOutput {
        available_rooms,
        message: "All bookings have been reset".to_string(),
    }))
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

/// Access log line per request, in the spirit of a combined log.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start_time = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} {} {:.2?}",
        method,
        uri,
        response.status().as_u16(),
        start_time.elapsed()
    );
    response
}

/// Allows `origin` when given, any origin otherwise.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    let allow_origin = match origin {
        Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin)?),
        None => AllowOrigin::any(),
    };
    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/rooms", get(rooms_handler))
        .route("/api/rooms/find-optimal", post(find_optimal_handler))
        .route("/api/rooms/book", post(book_handler))
        .route("/api/rooms/random-occupancy", post(random_occupancy_handler))
        .route("/api/rooms/reset", post(reset_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

pub async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let topology = Arc::new(config.topology()?);
    info!(
        "Loaded topology with {} rooms on {} floors",
        topology.len(),
        config.floor_sizes.len()
    );

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let store = Arc::new(OccupancyStore::new(topology));
    let cors = cors_layer(config.cors_origin.as_deref())?;
    let app = router(AppState::new(store, rng, config.default_rate), cors);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
