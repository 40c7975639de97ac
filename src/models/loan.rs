//! Borrowing log model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Borrowing log row from database
///
/// The stored state is the nullability of `return_date`: NULL means the
/// loan is active, a value means it was returned. `Overdue` is never
/// stored; it is computed at read time from the due date (see
/// [`BorrowingLog::status_at`]), so no background job has to flip state
/// on a clock.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowingLog {
    pub log_id: i64,
    pub book_id: i32,
    pub member_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

/// Read-time classification of a borrowing log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Borrowed,
    Overdue,
    Returned,
}

impl BorrowingLog {
    /// Classify the log as of `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> LoanStatus {
        match self.return_date {
            Some(_) => LoanStatus::Returned,
            None if self.due_date < now => LoanStatus::Overdue,
            None => LoanStatus::Borrowed,
        }
    }

    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Borrowing log with book and member context for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub log_id: i64,
    pub isbn: String,
    pub title: String,
    pub member_id: i32,
    pub member_name: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

/// Receipt returned by a successful borrow
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowReceipt {
    pub log_id: i64,
    pub book_id: i32,
    pub member_id: i32,
    pub isbn: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Receipt returned by a successful return
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnReceipt {
    pub log_id: i64,
    pub return_date: DateTime<Utc>,
    pub fine_charged: bool,
    pub fine: Option<super::fine::FineCharge>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn log(due_offset_days: i64, returned: bool) -> BorrowingLog {
        let borrow = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        BorrowingLog {
            log_id: 1,
            book_id: 1,
            member_id: 1,
            borrow_date: borrow,
            due_date: borrow + Duration::days(due_offset_days),
            return_date: returned.then(|| borrow + Duration::days(2)),
        }
    }

    #[test]
    fn active_loan_before_due_date_is_borrowed() {
        let l = log(14, false);
        assert_eq!(l.status_at(l.borrow_date + Duration::days(3)), LoanStatus::Borrowed);
    }

    #[test]
    fn active_loan_past_due_date_reads_as_overdue() {
        let l = log(14, false);
        assert_eq!(l.status_at(l.borrow_date + Duration::days(20)), LoanStatus::Overdue);
        // still active as far as mutation is concerned
        assert!(l.is_active());
    }

    #[test]
    fn returned_loan_is_terminal_regardless_of_due_date() {
        let l = log(1, true);
        assert_eq!(l.status_at(l.borrow_date + Duration::days(30)), LoanStatus::Returned);
        assert!(!l.is_active());
    }
}
