//! Reservations API Lambda - reservation lifecycle endpoints.
//!
//! Endpoints:
//! - GET /reservation/active - Get the caller's active reservation (or null)
//! - GET /reservation/list - List reservations, optionally filtered
//! - POST /reservation/create - Create a reservation
//! - PUT|DELETE /reservation/cancel/{id} - Cancel a reservation
//! - PUT /reservation/{id}/document - Attach or remove a document

use chrono::Utc;
use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use shared::http::{error_response, json_response, preflight_response, respond_error};
use shared::models::{
    select_active, sort_newest_first, CancelReservationResponse, CreateReservationRequest,
    DocumentAction, DocumentRequest, DocumentUpdateResponse, Reservation, ReservationStatus,
};
use shared::store::ListFilters;
use shared::{extract_user, AuthenticatedUser, Config, ReservationStore};

/// Application state
struct AppState {
    store: ReservationStore,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env().map_err(|_| "DYNAMODB_TABLE not set")?;
        let store = ReservationStore::from_config(&config).await;
        Ok(Self { store })
    }
}

/// Routed reservation endpoint.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Active,
    List,
    Create,
    Cancel(String),
    Document(String),
}

/// Match a method/path pair to an endpoint.
fn route(method: &Method, path: &str) -> Option<Route> {
    match (method.as_str(), path) {
        ("GET", "/reservation/active") => Some(Route::Active),
        ("GET", "/reservation/list") => Some(Route::List),
        ("POST", "/reservation/create") => Some(Route::Create),
        _ if path.starts_with("/reservation/cancel/")
            && (*method == Method::PUT || *method == Method::DELETE) =>
        {
            let id = path.trim_start_matches("/reservation/cancel/");
            Some(Route::Cancel(id.to_string()))
        }
        _ if path.starts_with("/reservation/") && path.ends_with("/document")
            && *method == Method::PUT =>
        {
            let id = path
                .trim_start_matches("/reservation/")
                .trim_end_matches("/document");
            Some(Route::Document(id.to_string()))
        }
        _ => None,
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let raw_path = event.uri().path().to_string();
    // Strip /api stage prefix if present (API Gateway REST API includes stage in path)
    let path = raw_path.strip_prefix("/api").unwrap_or(&raw_path).to_string();

    info!("Reservations request: {} {}", method, path);

    // Answer CORS preflight before anything else
    if method == Method::OPTIONS {
        return Ok(preflight_response());
    }

    let user = match extract_user(&event) {
        Ok(user) => user,
        Err(e) => {
            warn!("Unauthenticated request: {}", e);
            return error_response(401, "User not authenticated", "UNAUTHORIZED");
        }
    };

    let Some(route) = route(&method, &path) else {
        return error_response(404, "Not found", "NOT_FOUND");
    };

    let result = match route {
        Route::Active => get_active(&state.store, &user).await,
        Route::List => list_reservations(&state.store, &user, &event).await,
        Route::Create => create_reservation(&state.store, &user, &event).await,
        Route::Cancel(id) => cancel_reservation(&state.store, &user, &id).await,
        Route::Document(id) => update_document(&state.store, &user, &id, &event).await,
    };

    match result {
        Ok(response) => Ok(response),
        Err(e) => {
            if e.status_code() >= 500 {
                error!("Request failed: {}", e);
                error_response(500, "Internal server error", "INTERNAL_ERROR")
            } else {
                respond_error(&e)
            }
        }
    }
}

/// GET /reservation/active
///
/// Absence of an active reservation is a normal outcome: the body is a JSON
/// `null`, not a 404.
async fn get_active(
    store: &ReservationStore,
    user: &AuthenticatedUser,
) -> shared::Result<Response<Body>> {
    let reservations = store.list(&user.user_id, &ListFilters::default()).await?;

    let active: Option<&Reservation> = select_active(&reservations);
    match active {
        Some(reservation) => {
            info!("Active reservation found: {}", reservation.id);
            json_response(200, reservation)
        }
        None => {
            info!("No active reservation for user");
            json_response(200, &serde_json::Value::Null)
        }
    }
    .map_err(|e| shared::Error::Store(e.to_string()))
}

/// GET /reservation/list?userId&status&date
async fn list_reservations(
    store: &ReservationStore,
    user: &AuthenticatedUser,
    event: &Request,
) -> shared::Result<Response<Body>> {
    let params = event.query_string_parameters();

    // Known authorization gap carried over from the original design: a
    // client-supplied userId override is honored without any check against
    // the caller. Flagged here rather than silently fixed.
    let target_user_id = params
        .first("userId")
        .map(String::from)
        .unwrap_or_else(|| user.user_id.clone());
    if target_user_id != user.user_id {
        warn!(
            "List override: caller {} queried reservations of {}",
            user.user_id, target_user_id
        );
    }

    let filters = ListFilters {
        status: params.first("status").map(String::from),
        date: params.first("date").map(String::from),
    };

    let mut reservations = store.list(&target_user_id, &filters).await?;
    sort_newest_first(&mut reservations);

    info!("Found {} reservations", reservations.len());

    json_response(200, &reservations).map_err(|e| shared::Error::Store(e.to_string()))
}

/// POST /reservation/create
async fn create_reservation(
    store: &ReservationStore,
    user: &AuthenticatedUser,
    event: &Request,
) -> shared::Result<Response<Body>> {
    let request: CreateReservationRequest = serde_json::from_slice(event.body().as_ref())
        .map_err(|e| shared::Error::validation(format!("Invalid request body: {}", e)))?;
    request.validate()?;

    // Server assigns identity and timestamps; client-supplied status is
    // ignored and the initial status is always Pending.
    let reservation = Reservation {
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id.clone(),
        date: request.date.unwrap_or_default(),
        time: request.time.unwrap_or_default(),
        category: request.category.unwrap_or_default(),
        doctor: request.doctor.unwrap_or_default(),
        status: ReservationStatus::Pending,
        location: request.location,
        notes: request.notes,
        created_at: Utc::now(),
        user_document: None,
        doctor_document: None,
    };

    store.create(&reservation).await?;

    info!("Reservation created: {}", reservation.id);

    json_response(201, &reservation).map_err(|e| shared::Error::Store(e.to_string()))
}

/// PUT|DELETE /reservation/cancel/{id}
///
/// Soft-cancel: the record stays in the store with status Cancelled.
async fn cancel_reservation(
    store: &ReservationStore,
    user: &AuthenticatedUser,
    reservation_id: &str,
) -> shared::Result<Response<Body>> {
    verify_ownership(store, user, reservation_id).await?;

    let reservation = store.cancel(&user.user_id, reservation_id).await?;

    info!("Reservation cancelled: {}", reservation.id);

    json_response(
        200,
        &CancelReservationResponse {
            message: "Reservation cancelled successfully".to_string(),
            reservation,
        },
    )
    .map_err(|e| shared::Error::Store(e.to_string()))
}

/// PUT /reservation/{id}/document
async fn update_document(
    store: &ReservationStore,
    user: &AuthenticatedUser,
    reservation_id: &str,
    event: &Request,
) -> shared::Result<Response<Body>> {
    if reservation_id.is_empty() {
        return Err(shared::Error::Validation {
            code: "MISSING_RESERVATION_ID",
            message: "Missing reservation id".to_string(),
        });
    }

    let body = event.body();
    if body.as_ref().is_empty() {
        return Err(shared::Error::Validation {
            code: "MISSING_BODY",
            message: "Missing body".to_string(),
        });
    }

    let request: DocumentRequest =
        serde_json::from_slice(body.as_ref()).map_err(|e| shared::Error::Validation {
            code: "INVALID_JSON",
            message: format!("Invalid JSON in request body: {}", e),
        })?;

    let (action, slot) = request.validate()?;

    verify_ownership(store, user, reservation_id).await?;

    let (reservation, message) = match action {
        DocumentAction::Upload => {
            // validate() guarantees the document is present for uploads
            let document = request
                .document
                .as_ref()
                .ok_or_else(|| shared::Error::Store("Document vanished after validation".to_string()))?;
            let updated = store
                .set_document(&user.user_id, reservation_id, slot, document)
                .await?;
            (updated, "Document uploaded successfully")
        }
        DocumentAction::Delete => {
            let updated = store
                .remove_document(&user.user_id, reservation_id, slot)
                .await?;
            (updated, "Document deleted successfully")
        }
    };

    info!(
        "Document {} on reservation {} ({})",
        message, reservation_id, slot.attribute_name()
    );

    json_response(
        200,
        &DocumentUpdateResponse {
            message: message.to_string(),
            reservation,
        },
    )
    .map_err(|e| shared::Error::Store(e.to_string()))
}

/// Existence and ownership check by composite key plus an explicit owner
/// comparison on the fetched item.
async fn verify_ownership(
    store: &ReservationStore,
    user: &AuthenticatedUser,
    reservation_id: &str,
) -> shared::Result<()> {
    if reservation_id.is_empty() {
        return Err(shared::Error::Validation {
            code: "MISSING_RESERVATION_ID",
            message: "Missing reservation id".to_string(),
        });
    }

    let reservation = store
        .get(&user.user_id, reservation_id)
        .await?
        .ok_or_else(|| shared::Error::NotFound(reservation_id.to_string()))?;

    if reservation.user_id != user.user_id {
        // Key composition should make this unreachable; keep the check
        // first-class anyway.
        warn!(
            "Ownership mismatch on reservation {}: stored owner {}",
            reservation_id, reservation.user_id
        );
        return Err(shared::Error::NotFound(reservation_id.to_string()));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_fixed_paths() {
        assert_eq!(
            route(&Method::GET, "/reservation/active"),
            Some(Route::Active)
        );
        assert_eq!(route(&Method::GET, "/reservation/list"), Some(Route::List));
        assert_eq!(
            route(&Method::POST, "/reservation/create"),
            Some(Route::Create)
        );
        assert_eq!(route(&Method::GET, "/reservation/create"), None);
        assert_eq!(route(&Method::GET, "/other"), None);
    }

    #[test]
    fn test_route_cancel_accepts_put_and_delete() {
        assert_eq!(
            route(&Method::PUT, "/reservation/cancel/abc"),
            Some(Route::Cancel("abc".to_string()))
        );
        assert_eq!(
            route(&Method::DELETE, "/reservation/cancel/abc"),
            Some(Route::Cancel("abc".to_string()))
        );
        assert_eq!(route(&Method::GET, "/reservation/cancel/abc"), None);
    }

    #[test]
    fn test_route_document() {
        assert_eq!(
            route(&Method::PUT, "/reservation/abc/document"),
            Some(Route::Document("abc".to_string()))
        );
        assert_eq!(route(&Method::POST, "/reservation/abc/document"), None);
    }
}
