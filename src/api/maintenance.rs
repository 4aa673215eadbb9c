//! Maintenance sweep endpoint
//!
//! Sweeps run on their own timers; this endpoint lets operators trigger
//! one out of band, optionally at a pinned instant.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    services::maintenance::{SweepKind, SweepReport},
};

/// Sweep trigger request
#[derive(Deserialize, ToSchema)]
pub struct SweepRequest {
    pub kind: SweepKind,
    /// Evaluate the sweep as of this instant instead of the current time
    pub now: Option<DateTime<Utc>>,
}

/// Run one maintenance sweep
#[utoipa::path(
    post,
    path = "/maintenance/sweep",
    tag = "maintenance",
    request_body = SweepRequest,
    responses(
        (status = 200, description = "Sweep completed", body = SweepReport)
    )
)]
pub async fn run_sweep(
    State(state): State<crate::AppState>,
    Json(request): Json<SweepRequest>,
) -> AppResult<Json<SweepReport>> {
    let report = state
        .services
        .maintenance
        .run_sweep(request.kind, request.now)
        .await;
    Ok(Json(report))
}
