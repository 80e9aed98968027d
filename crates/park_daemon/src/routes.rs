use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{
        sse::{Event, Sse},
        Json,
    },
    routing::{delete, get, post, put},
    Router,
};
use chrono::Local;
use park_core::{Coaster, CoasterId, CoasterUpdate, InvalidInput, TimeOfDay, Wagon, WagonId};
use park_ops::{RideError, RideScheduler};
use park_store::{
    delete_wagon, load_coaster, register_coaster, save_coaster, save_wagon, StoreError,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, "http://localhost:5173")
}

pub fn make_router_with_cors(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<axum::http::HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/api/coasters", post(create_coaster_handler))
        .route("/api/coasters/:id", put(update_coaster_handler))
        .route("/api/coasters/:id/wagons", post(add_wagon_handler))
        .route(
            "/api/coasters/:id/wagons/:wagon_id",
            delete(delete_wagon_handler),
        )
        .route(
            "/api/coasters/:id/wagons/:wagon_id/start",
            post(start_ride_handler),
        )
        .route(
            "/api/coasters/:id/wagons/:wagon_id/status",
            get(wagon_status_handler),
        )
        .route("/api/reports", get(reports_handler))
        .route("/api/reports/stream", get(reports_stream_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type JsonReply = (StatusCode, Json<Value>);

fn invalid_input(err: &InvalidInput) -> JsonReply {
    (StatusCode::BAD_REQUEST, Json(json!({"error": err.to_string()})))
}

fn store_reply(err: &StoreError) -> JsonReply {
    let status = match err {
        StoreError::Missing { .. } => StatusCode::NOT_FOUND,
        StoreError::Corrupt { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(json!({"error": err.to_string()})))
}

fn parse_time(text: &str) -> Result<TimeOfDay, JsonReply> {
    text.parse::<TimeOfDay>().map_err(|err| invalid_input(&err))
}

// ---------------------------------------------------------------------------
// Coaster registration and update
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateCoasterRequest {
    staff_count: u32,
    daily_customer_target: u32,
    track_length_m: u32,
    operating_start: String,
    operating_end: String,
}

pub async fn create_coaster_handler(
    State(app_state): State<AppState>,
    Json(body): Json<CreateCoasterRequest>,
) -> JsonReply {
    let start = match parse_time(&body.operating_start) {
        Ok(t) => t,
        Err(reply) => return reply,
    };
    let end = match parse_time(&body.operating_end) {
        Ok(t) => t,
        Err(reply) => return reply,
    };
    let coaster = match Coaster::new(
        body.staff_count,
        body.daily_customer_target,
        body.track_length_m,
        start,
        end,
    ) {
        Ok(coaster) => coaster,
        Err(err) => return invalid_input(&err),
    };

    let id = CoasterId(format!("coaster_{}", Uuid::new_v4().simple()));
    match register_coaster(app_state.store.as_ref(), &id, &coaster).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({"id": id, "data": coaster})),
        ),
        Err(err) => store_reply(&err),
    }
}

#[derive(Deserialize)]
pub struct UpdateCoasterRequest {
    staff_count: Option<u32>,
    daily_customer_target: Option<u32>,
    operating_start: Option<String>,
    operating_end: Option<String>,
    // No track-length field: the track is immutable after registration.
}

pub async fn update_coaster_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCoasterRequest>,
) -> JsonReply {
    let operating_start = match body.operating_start.as_deref().map(parse_time).transpose() {
        Ok(t) => t,
        Err(reply) => return reply,
    };
    let operating_end = match body.operating_end.as_deref().map(parse_time).transpose() {
        Ok(t) => t,
        Err(reply) => return reply,
    };

    let id = CoasterId(id);
    let mut coaster = match load_coaster(app_state.store.as_ref(), &id).await {
        Ok(coaster) => coaster,
        Err(err) => return store_reply(&err),
    };
    let update = CoasterUpdate {
        staff_count: body.staff_count,
        daily_customer_target: body.daily_customer_target,
        operating_start,
        operating_end,
    };
    if let Err(err) = coaster.apply_update(update) {
        return invalid_input(&err);
    }
    match save_coaster(app_state.store.as_ref(), &id, &coaster).await {
        Ok(()) => (StatusCode::OK, Json(json!({"id": id, "data": coaster}))),
        Err(err) => store_reply(&err),
    }
}

// ---------------------------------------------------------------------------
// Wagons
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateWagonRequest {
    seat_count: u32,
    speed_mps: f64,
}

pub async fn add_wagon_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CreateWagonRequest>,
) -> JsonReply {
    let coaster_id = CoasterId(id);
    // The wagon must attach to a registered coaster.
    if let Err(err) = load_coaster(app_state.store.as_ref(), &coaster_id).await {
        return store_reply(&err);
    }
    let wagon = match Wagon::new(body.seat_count, body.speed_mps) {
        Ok(wagon) => wagon,
        Err(err) => return invalid_input(&err),
    };

    let wagon_id = WagonId(format!("wagon_{}", Uuid::new_v4().simple()));
    match save_wagon(app_state.store.as_ref(), &coaster_id, &wagon_id, &wagon).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({"wagon_id": wagon_id, "data": wagon})),
        ),
        Err(err) => store_reply(&err),
    }
}

pub async fn delete_wagon_handler(
    State(app_state): State<AppState>,
    Path((id, wagon_id)): Path<(String, String)>,
) -> JsonReply {
    let coaster_id = CoasterId(id);
    let wagon_id = WagonId(wagon_id);
    if let Err(err) = load_coaster(app_state.store.as_ref(), &coaster_id).await {
        return store_reply(&err);
    }
    let member = match app_state
        .store
        .set_is_member(&park_store::keys::wagon_set(&coaster_id), &wagon_id.0)
        .await
    {
        Ok(member) => member,
        Err(err) => return store_reply(&err),
    };
    if !member {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "wagon not found on this coaster"})),
        );
    }
    match delete_wagon(app_state.store.as_ref(), &coaster_id, &wagon_id).await {
        Ok(()) => (StatusCode::OK, Json(json!({"wagon_id": wagon_id}))),
        Err(err) => store_reply(&err),
    }
}

// ---------------------------------------------------------------------------
// Rides
// ---------------------------------------------------------------------------

pub async fn start_ride_handler(
    State(app_state): State<AppState>,
    Path((id, wagon_id)): Path<(String, String)>,
) -> JsonReply {
    let coaster_id = CoasterId(id);
    let wagon_id = WagonId(wagon_id);
    let scheduler = RideScheduler::new(app_state.store.clone());
    let now = Local::now().naive_local();

    match scheduler.start_ride(&coaster_id, &wagon_id, now).await {
        Ok(receipt) => (StatusCode::OK, Json(json!({"ride": receipt}))),
        Err(RideError::Denied(reason)) => (
            StatusCode::CONFLICT,
            Json(json!({"error": reason.to_string(), "denial": reason})),
        ),
        Err(RideError::Store(err)) => store_reply(&err),
    }
}

pub async fn wagon_status_handler(
    State(app_state): State<AppState>,
    Path((id, wagon_id)): Path<(String, String)>,
) -> JsonReply {
    let coaster_id = CoasterId(id);
    let wagon_id = WagonId(wagon_id);
    let scheduler = RideScheduler::new(app_state.store.clone());
    let now = Local::now().naive_local();

    match scheduler.wagon_status(&coaster_id, &wagon_id, now).await {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({"wagon_id": wagon_id, "status": status})),
        ),
        Err(err) => store_reply(&err),
    }
}

// ---------------------------------------------------------------------------
// Monitor reports
// ---------------------------------------------------------------------------

pub async fn reports_handler(State(app_state): State<AppState>) -> Json<Value> {
    let reports = app_state.latest_reports.read().clone();
    Json(json!({"reports": reports}))
}

pub async fn reports_stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.report_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(reports) => {
                    let data = serde_json::to_string(&reports).unwrap_or_default();
                    yield Ok(Event::default().data(data));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
