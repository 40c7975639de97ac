//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, fines, health, loans, members};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblion API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        // Members
        members::create_member,
        members::get_member,
        members::get_member_loans,
        members::get_member_fines,
        // Loans
        loans::create_loan,
        loans::get_loan,
        loans::return_loan,
        loans::list_overdue,
        // Fines
        fines::pay_fine,
    ),
    components(
        schemas(
            health::HealthResponse,
            loans::BorrowRequest,
            fines::PayFineResponse,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::member::Member,
            crate::models::member::CreateMember,
            crate::models::loan::BorrowingLog,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanStatus,
            crate::models::loan::BorrowReceipt,
            crate::models::loan::ReturnReceipt,
            crate::models::fine::Fine,
            crate::models::fine::FineCharge,
            crate::models::fine::OutstandingFine,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "books", description = "Catalog management"),
        (name = "members", description = "Member management"),
        (name = "loans", description = "Borrowing and returns"),
        (name = "fines", description = "Overdue fines"),
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router serving the OpenAPI document
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
