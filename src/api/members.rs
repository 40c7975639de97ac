//! Member management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        fine::OutstandingFine,
        loan::LoanDetails,
        member::{CreateMember, Member},
    },
    AppState,
};

/// Register a new member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member registered", body = Member),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let member = state.services.members.register(request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Get a member by ID
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<Json<Member>> {
    let member = state.services.members.get_member(member_id).await?;
    Ok(Json(member))
}

/// Get a member's current loans
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member's active loans", body = Vec<LoanDetails>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_loans(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.members.get_current_loans(member_id).await?;
    Ok(Json(loans))
}

/// Get a member's outstanding fines
#[utoipa::path(
    get,
    path = "/members/{id}/fines",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member's unpaid fines", body = Vec<OutstandingFine>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_fines(
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<Json<Vec<OutstandingFine>>> {
    let fines = state.services.circulation.outstanding_fines(member_id).await?;
    Ok(Json(fines))
}
