//! Loan endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::loan::Loan};

/// Create loan request
#[derive(Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Borrowing patron
    pub patron_id: i64,
    /// Item to borrow
    pub item_id: i64,
}

/// Return loan request
#[derive(Deserialize, ToSchema)]
pub struct ReturnLoanRequest {
    /// Patron performing the return (owner or staff)
    pub patron_id: i64,
}

/// Borrow an item
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 404, description = "Patron or item not found"),
        (status = 409, description = "Item lock contention, retry"),
        (status = 422, description = "No copy available (a reservation was held), loan limit reached, or penalties over the ceiling")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state
        .services
        .circulation
        .create_loan(request.patron_id, request.item_id)
        .await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed item
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body = ReturnLoanRequest,
    responses(
        (status = 200, description = "Loan closed", body = Loan),
        (status = 403, description = "Acting patron may not return this loan"),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Loan already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i64>,
    Json(request): Json<ReturnLoanRequest>,
) -> AppResult<Json<Loan>> {
    let loan = state
        .services
        .circulation
        .return_loan(loan_id, request.patron_id)
        .await?;
    Ok(Json(loan))
}

/// Loans for a patron
#[utoipa::path(
    get,
    path = "/patrons/{id}/loans",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Patron ID")
    ),
    responses(
        (status = 200, description = "The patron's loans", body = Vec<Loan>),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn get_patron_loans(
    State(state): State<crate::AppState>,
    Path(patron_id): Path<i64>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.circulation.loans_for_patron(patron_id)?;
    Ok(Json(loans))
}

/// Loans currently marked overdue
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    responses(
        (status = 200, description = "Overdue loans", body = Vec<Loan>)
    )
)]
pub async fn get_overdue_loans(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Loan>>> {
    Ok(Json(state.services.circulation.overdue_loans()))
}
