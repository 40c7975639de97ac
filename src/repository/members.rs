//! Members repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::LoanDetails,
        member::{CreateMember, Member},
    },
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE member_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::MemberNotFound(id))
    }

    /// Register a new member
    pub async fn create(&self, member: &CreateMember) -> AppResult<Member> {
        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (first_name, last_name, email, phone, address)
            VALUES ($1, $2, LOWER($3), $4, $5)
            RETURNING *
            "#,
        )
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict(format!("Member with email {} already exists", member.email))
            }
            _ => AppError::Database(e),
        })?;

        Ok(created)
    }

    /// Current (unreturned) loans for a member, newest first
    pub async fn get_current_loans(&self, member_id: i32) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT bl.log_id, bl.book_id, bl.member_id, bl.borrow_date, bl.due_date, bl.return_date,
                   b.isbn, b.title,
                   m.first_name || ' ' || m.last_name AS member_name
            FROM borrowing_logs bl
            JOIN books b ON bl.book_id = b.book_id
            JOIN members m ON bl.member_id = m.member_id
            WHERE bl.member_id = $1 AND bl.return_date IS NULL
            ORDER BY bl.borrow_date DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();

        Ok(rows
            .into_iter()
            .map(|row| super::circulation::loan_details_from_row(&row, now))
            .collect::<Result<_, _>>()?)
    }
}
