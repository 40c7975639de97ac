//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{BorrowReceipt, BorrowingLog, LoanDetails, ReturnReceipt},
    AppState,
};

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// Member borrowing the book
    pub member_id: i32,
    /// ISBN of the book to borrow
    pub isbn: String,
    /// Borrowing period in days (defaults to the configured period)
    pub period_days: Option<i64>,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowReceipt),
        (status = 404, description = "Book or member not found"),
        (status = 409, description = "No copies available, member suspended or limit reached"),
        (status = 503, description = "Store busy, retry")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowReceipt>)> {
    let receipt = state
        .services
        .circulation
        .borrow_book(request.member_id, &request.isbn, request.period_days)
        .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Get a borrowing log by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Borrowing log ID")
    ),
    responses(
        (status = 200, description = "Borrowing log", body = BorrowingLog),
        (status = 404, description = "Borrowing log not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    Path(log_id): Path<i64>,
) -> AppResult<Json<BorrowingLog>> {
    let log = state.services.circulation.get_loan(log_id).await?;
    Ok(Json(log))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Borrowing log ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnReceipt),
        (status = 404, description = "Borrowing log not found"),
        (status = 409, description = "Already returned"),
        (status = 503, description = "Store busy, retry")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    Path(log_id): Path<i64>,
) -> AppResult<Json<ReturnReceipt>> {
    let receipt = state.services.circulation.return_book(log_id).await?;
    Ok(Json(receipt))
}

/// List all overdue loans
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    responses(
        (status = 200, description = "Loans past their due date", body = Vec<LoanDetails>)
    )
)]
pub async fn list_overdue(State(state): State<AppState>) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.circulation.overdue_loans().await?;
    Ok(Json(loans))
}
