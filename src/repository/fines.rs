//! Fines repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::fine::{Fine, OutstandingFine},
};

#[derive(Clone)]
pub struct FinesRepository {
    pool: Pool<Postgres>,
}

impl FinesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get fine by ID
    pub async fn get_by_id(&self, fine_id: i64) -> AppResult<Fine> {
        sqlx::query_as::<_, Fine>("SELECT * FROM fines WHERE fine_id = $1")
            .bind(fine_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::FineNotFound(fine_id))
    }

    /// Unpaid fines belonging to a member, with loan context
    pub async fn get_unpaid_for_member(&self, member_id: i32) -> AppResult<Vec<OutstandingFine>> {
        let fines = sqlx::query_as::<_, OutstandingFine>(
            r#"
            SELECT f.fine_id, f.log_id, f.amount, f.created_at,
                   b.isbn, b.title, bl.due_date
            FROM fines f
            JOIN borrowing_logs bl ON f.log_id = bl.log_id
            JOIN books b ON bl.book_id = b.book_id
            WHERE bl.member_id = $1 AND NOT f.paid
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(fines)
    }

    /// Mark a fine paid. Returns whether a state change occurred; paying
    /// an already-paid fine is a benign no-op, a missing fine is an error.
    pub async fn pay(&self, fine_id: i64) -> AppResult<bool> {
        let updated =
            sqlx::query("UPDATE fines SET paid = TRUE WHERE fine_id = $1 AND NOT paid")
                .bind(fine_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        if updated == 1 {
            tracing::info!(fine_id, "Fine paid");
            return Ok(true);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM fines WHERE fine_id = $1)")
                .bind(fine_id)
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Ok(false)
        } else {
            Err(AppError::FineNotFound(fine_id))
        }
    }
}
