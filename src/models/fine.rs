//! Fine model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Fine row from database
///
/// At most one fine exists per borrowing log (UNIQUE on `log_id`); the
/// amount is fixed at creation and only the `paid` flag mutates afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Fine {
    pub fine_id: i64,
    pub log_id: i64,
    pub amount: Decimal,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

/// Fine created during a return, as reported in the return receipt
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FineCharge {
    pub fine_id: i64,
    pub amount: Decimal,
}

/// Unpaid fine with loan context, for member-facing listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OutstandingFine {
    pub fine_id: i64,
    pub log_id: i64,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub isbn: String,
    pub title: String,
    pub due_date: DateTime<Utc>,
}
