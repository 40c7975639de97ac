//! Fine payment endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, AppState};

/// Fine payment response
#[derive(Serialize, ToSchema)]
pub struct PayFineResponse {
    /// Fine ID
    pub fine_id: i64,
    /// Whether the paid flag changed (false if the fine was already paid)
    pub changed: bool,
}

/// Pay a fine
#[utoipa::path(
    post,
    path = "/fines/{id}/pay",
    tag = "fines",
    params(
        ("id" = i64, Path, description = "Fine ID")
    ),
    responses(
        (status = 200, description = "Payment recorded (or already paid)", body = PayFineResponse),
        (status = 404, description = "Fine not found")
    )
)]
pub async fn pay_fine(
    State(state): State<AppState>,
    Path(fine_id): Path<i64>,
) -> AppResult<Json<PayFineResponse>> {
    let changed = state.services.circulation.pay_fine(fine_id).await?;
    Ok(Json(PayFineResponse { fine_id, changed }))
}
