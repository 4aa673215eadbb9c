//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, loans, maintenance, reservations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulate API",
        version = "0.3.0",
        description = "Library Circulation Server REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Loans
        loans::create_loan,
        loans::return_loan,
        loans::get_patron_loans,
        loans::get_overdue_loans,
        // Reservations
        reservations::create_reservation,
        reservations::cancel_reservation,
        reservations::get_patron_reservations,
        // Maintenance
        maintenance::run_sweep,
    ),
    components(
        schemas(
            // Loans
            loans::CreateLoanRequest,
            loans::ReturnLoanRequest,
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            // Reservations
            reservations::CreateReservationRequest,
            reservations::CancelReservationRequest,
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationStatus,
            // Catalog / patrons (read-side shapes)
            crate::models::item::Item,
            crate::models::patron::Patron,
            crate::models::patron::Role,
            // Maintenance
            maintenance::SweepRequest,
            crate::services::maintenance::SweepKind,
            crate::services::maintenance::SweepReport,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "loans", description = "Borrow and return operations"),
        (name = "reservations", description = "Reservation queue operations"),
        (name = "maintenance", description = "Time-triggered sweeps")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
