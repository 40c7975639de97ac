//! Circulation service: the borrowing engine facade
//!
//! Thin orchestration over the transactional circulation repository,
//! applying the configured circulation policy (borrowing limit, default
//! period, fine rate).

use crate::{
    config::LibraryConfig,
    error::{AppError, AppResult},
    models::{
        fine::OutstandingFine,
        loan::{BorrowReceipt, BorrowingLog, LoanDetails, ReturnReceipt},
    },
    repository::Repository,
};

/// Bounds on an explicit borrowing period, in days. Negative periods are
/// accepted (a due date already in the past) but the magnitude is capped
/// so date arithmetic stays in range.
const PERIOD_DAYS_RANGE: std::ops::RangeInclusive<i64> = -3650..=3650;

fn validate_period_days(period_days: i64) -> AppResult<()> {
    if PERIOD_DAYS_RANGE.contains(&period_days) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "period_days must be between {} and {}",
            PERIOD_DAYS_RANGE.start(),
            PERIOD_DAYS_RANGE.end()
        )))
    }
}

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    config: LibraryConfig,
}

impl CirculationService {
    pub fn new(repository: Repository, config: LibraryConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow a book for a member. `period_days` falls back to the
    /// configured default borrowing period.
    pub async fn borrow_book(
        &self,
        member_id: i32,
        isbn: &str,
        period_days: Option<i64>,
    ) -> AppResult<BorrowReceipt> {
        let period_days = period_days.unwrap_or(self.config.borrowing_period_days);
        validate_period_days(period_days)?;

        self.repository
            .circulation
            .borrow(member_id, isbn, period_days, self.config.borrowing_limit)
            .await
    }

    /// Return a borrowed book, charging an overdue fine if due
    pub async fn return_book(&self, log_id: i64) -> AppResult<ReturnReceipt> {
        self.repository
            .circulation
            .return_loan(log_id, self.config.fine_rate_per_day)
            .await
    }

    /// Get a borrowing log by ID
    pub async fn get_loan(&self, log_id: i64) -> AppResult<BorrowingLog> {
        self.repository.circulation.get_log(log_id).await
    }

    /// Pay a fine; returns whether the paid flag changed
    pub async fn pay_fine(&self, fine_id: i64) -> AppResult<bool> {
        self.repository.fines.pay(fine_id).await
    }

    /// Unpaid fines for a member
    pub async fn outstanding_fines(&self, member_id: i32) -> AppResult<Vec<OutstandingFine>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;
        self.repository.fines.get_unpaid_for_member(member_id).await
    }

    /// All loans currently past their due date
    pub async fn overdue_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.circulation.list_overdue().await
    }
}
