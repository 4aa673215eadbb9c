//! Reservation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::reservation::Reservation};

/// Create reservation request
#[derive(Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    /// Reserving patron
    pub patron_id: i64,
    /// Item to reserve
    pub item_id: i64,
}

/// Cancel reservation request
#[derive(Deserialize, ToSchema)]
pub struct CancelReservationRequest {
    /// Patron performing the cancellation (owner or admin)
    pub patron_id: i64,
}

/// Reserve an out-of-stock item
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 404, description = "Patron or item not found"),
        (status = 409, description = "A pending reservation already exists for this patron and item"),
        (status = 422, description = "The item has available copies, borrow it directly")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state
        .services
        .reservations
        .create_reservation(request.patron_id, request.item_id)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Cancel a pending reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    params(
        ("id" = i64, Path, description = "Reservation ID")
    ),
    request_body = CancelReservationRequest,
    responses(
        (status = 204, description = "Reservation cancelled"),
        (status = 403, description = "Acting patron may not cancel this reservation"),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation is no longer pending")
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    Path(reservation_id): Path<i64>,
    Json(request): Json<CancelReservationRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .reservations
        .cancel_reservation(reservation_id, request.patron_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reservations for a patron
#[utoipa::path(
    get,
    path = "/patrons/{id}/reservations",
    tag = "reservations",
    params(
        ("id" = i64, Path, description = "Patron ID")
    ),
    responses(
        (status = 200, description = "The patron's reservations", body = Vec<Reservation>),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn get_patron_reservations(
    State(state): State<crate::AppState>,
    Path(patron_id): Path<i64>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state
        .services
        .reservations
        .reservations_for_patron(patron_id)?;
    Ok(Json(reservations))
}
