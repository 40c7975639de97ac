//! Circulation repository: the transactional borrow/return engine
//!
//! Every check-then-mutate sequence here runs inside a single Postgres
//! transaction with row locks (`SELECT ... FOR UPDATE`), so multiple
//! server instances can share one database without application-level
//! mutexes. Serialization conflicts are retried once, then surfaced as
//! [`AppError::Busy`].

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use std::future::Future;

use crate::{
    error::{AppError, AppResult},
    fines,
    models::{
        book::Book,
        fine::FineCharge,
        loan::{BorrowReceipt, BorrowingLog, LoanDetails, ReturnReceipt},
        member::Member,
    },
};

/// SQLSTATE codes Postgres raises on lock/serialization conflicts
fn is_transient_conflict(err: &AppError) -> bool {
    match err {
        AppError::Database(sqlx::Error::Database(db)) => {
            matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}

/// Run an atomic unit, retrying once on a transient store conflict.
async fn with_conflict_retry<T, F, Fut>(f: F) -> AppResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match f().await {
        Err(e) if is_transient_conflict(&e) => {
            tracing::debug!("Transient store conflict, retrying atomic unit once");
            match f().await {
                Err(e) if is_transient_conflict(&e) => Err(AppError::Busy),
                other => other,
            }
        }
        other => other,
    }
}

#[derive(Clone)]
pub struct CirculationRepository {
    pool: Pool<Postgres>,
}

impl CirculationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrowing log by ID
    pub async fn get_log(&self, log_id: i64) -> AppResult<BorrowingLog> {
        sqlx::query_as::<_, BorrowingLog>("SELECT * FROM borrowing_logs WHERE log_id = $1")
            .bind(log_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::LoanNotFound(log_id))
    }

    /// Borrow a book: validates availability, member status and the
    /// borrowing limit, then decrements availability and inserts the log.
    /// All of it commits as one unit or not at all.
    pub async fn borrow(
        &self,
        member_id: i32,
        isbn: &str,
        period_days: i64,
        borrowing_limit: i64,
    ) -> AppResult<BorrowReceipt> {
        with_conflict_retry(|| self.borrow_once(member_id, isbn, period_days, borrowing_limit))
            .await
    }

    async fn borrow_once(
        &self,
        member_id: i32,
        isbn: &str,
        period_days: i64,
        borrowing_limit: i64,
    ) -> AppResult<BorrowReceipt> {
        let now = Utc::now();

        // Fallible date arithmetic: an out-of-range period is a caller
        // error, not a panic.
        let due_date = Duration::try_days(period_days)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| {
                AppError::Validation(format!("borrowing period out of range: {} days", period_days))
            })?;

        let mut tx = self.pool.begin().await?;

        // Lock the book row: serializes availability checks across callers.
        // A failed check returns early and the dropped transaction rolls back.
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1 FOR UPDATE")
            .bind(isbn)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::BookNotFound(isbn.to_string()))?;

        // Lock the member row: serializes the limit check for this member.
        let member =
            sqlx::query_as::<_, Member>("SELECT * FROM members WHERE member_id = $1 FOR UPDATE")
                .bind(member_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(AppError::MemberNotFound(member_id))?;

        if !member.is_active {
            return Err(AppError::MemberSuspended(member_id));
        }

        if book.available_copies <= 0 {
            return Err(AppError::BookNotAvailable(isbn.to_string()));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowing_logs WHERE member_id = $1 AND return_date IS NULL",
        )
        .bind(member_id)
        .fetch_one(&mut *tx)
        .await?;

        if active >= borrowing_limit {
            return Err(AppError::BorrowLimitExceeded {
                current: active,
                limit: borrowing_limit,
            });
        }

        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE book_id = $1")
            .bind(book.book_id)
            .execute(&mut *tx)
            .await?;

        let log_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO borrowing_logs (book_id, member_id, borrow_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING log_id
            "#,
        )
        .bind(book.book_id)
        .bind(member_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            log_id,
            member_id,
            isbn,
            "Book borrowed, due {}",
            due_date.date_naive()
        );

        Ok(BorrowReceipt {
            log_id,
            book_id: book.book_id,
            member_id,
            isbn: isbn.to_string(),
            borrow_date: now,
            due_date,
        })
    }

    /// Return a borrowed book, restoring availability and charging an
    /// overdue fine if due. Idempotent: a second return of the same log
    /// observes `AlreadyReturned` and mutates nothing.
    pub async fn return_loan(&self, log_id: i64, daily_rate: Decimal) -> AppResult<ReturnReceipt> {
        with_conflict_retry(|| self.return_once(log_id, daily_rate)).await
    }

    async fn return_once(&self, log_id: i64, daily_rate: Decimal) -> AppResult<ReturnReceipt> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Lock the log row so concurrent returns of the same loan serialize;
        // the loser of the race sees return_date already set.
        let log = sqlx::query_as::<_, BorrowingLog>(
            "SELECT * FROM borrowing_logs WHERE log_id = $1 FOR UPDATE",
        )
        .bind(log_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::LoanNotFound(log_id))?;

        if log.return_date.is_some() {
            return Err(AppError::AlreadyReturned(log_id));
        }

        sqlx::query("UPDATE borrowing_logs SET return_date = $1 WHERE log_id = $2")
            .bind(now)
            .bind(log_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE book_id = $1")
            .bind(log.book_id)
            .execute(&mut *tx)
            .await?;

        let amount = fines::fine_amount(log.due_date, now, daily_rate);

        let fine = if amount > Decimal::ZERO {
            // Explicit existence check on top of the UNIQUE(log_id)
            // constraint, so a replayed return is a silent no-op rather
            // than a constraint error.
            let already_fined: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM fines WHERE log_id = $1)")
                    .bind(log_id)
                    .fetch_one(&mut *tx)
                    .await?;

            if already_fined {
                None
            } else {
                let fine_id = sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO fines (log_id, amount)
                    VALUES ($1, $2)
                    ON CONFLICT (log_id) DO NOTHING
                    RETURNING fine_id
                    "#,
                )
                .bind(log_id)
                .bind(amount)
                .fetch_optional(&mut *tx)
                .await?;

                fine_id.map(|fine_id| FineCharge { fine_id, amount })
            }
        } else {
            None
        };

        tx.commit().await?;

        if let Some(ref charge) = fine {
            tracing::info!(log_id, fine_id = charge.fine_id, amount = %charge.amount, "Overdue fine charged on return");
        }

        Ok(ReturnReceipt {
            log_id,
            return_date: now,
            fine_charged: fine.is_some(),
            fine,
        })
    }

    /// All active loans currently past their due date
    pub async fn list_overdue(&self) -> AppResult<Vec<LoanDetails>> {
        let now = Utc::now();

        let rows = sqlx::query(
            r#"
            SELECT bl.log_id, bl.book_id, bl.member_id, bl.borrow_date, bl.due_date, bl.return_date,
                   b.isbn, b.title,
                   m.first_name || ' ' || m.last_name AS member_name
            FROM borrowing_logs bl
            JOIN books b ON bl.book_id = b.book_id
            JOIN members m ON bl.member_id = m.member_id
            WHERE bl.return_date IS NULL AND bl.due_date < $1
            ORDER BY bl.due_date
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| loan_details_from_row(&row, now))
            .collect::<Result<_, _>>()?)
    }
}

/// Build a [`LoanDetails`] from a joined log/book/member row, classifying
/// the status as of `now`.
pub(crate) fn loan_details_from_row(
    row: &PgRow,
    now: DateTime<Utc>,
) -> Result<LoanDetails, sqlx::Error> {
    let due_date: DateTime<Utc> = row.try_get("due_date")?;
    let return_date: Option<DateTime<Utc>> = row.try_get("return_date")?;

    let log = BorrowingLog {
        log_id: row.try_get("log_id")?,
        book_id: row.try_get("book_id")?,
        member_id: row.try_get("member_id")?,
        borrow_date: row.try_get("borrow_date")?,
        due_date,
        return_date,
    };

    Ok(LoanDetails {
        log_id: log.log_id,
        isbn: row.try_get("isbn")?,
        title: row.try_get("title")?,
        member_id: log.member_id,
        member_name: row.try_get("member_name")?,
        borrow_date: log.borrow_date,
        due_date,
        return_date,
        status: log.status_at(now),
    })
}
