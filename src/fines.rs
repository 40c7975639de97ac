//! Overdue fine calculation
//!
//! Pure arithmetic over dates and a daily rate; never touches the store,
//! so it can also be used for estimates in reports.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of calendar days a return is late, clamped at zero.
pub fn overdue_days(due_date: DateTime<Utc>, return_date: DateTime<Utc>) -> i64 {
    (return_date.date_naive() - due_date.date_naive())
        .num_days()
        .max(0)
}

/// Fine owed for a return: overdue days times the daily rate, rounded to
/// currency precision (2 decimal places, half-up).
pub fn fine_amount(
    due_date: DateTime<Utc>,
    return_date: DateTime<Utc>,
    daily_rate: Decimal,
) -> Decimal {
    let days = Decimal::from(overdue_days(due_date, return_date));
    (days * daily_rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn five_days_late_at_fifty_cents() {
        let amount = fine_amount(date(2024, 1, 1), date(2024, 1, 6), Decimal::new(50, 2));
        assert_eq!(amount, Decimal::new(250, 2));
    }

    #[test]
    fn on_time_return_owes_nothing() {
        let amount = fine_amount(date(2024, 1, 10), date(2024, 1, 10), Decimal::new(50, 2));
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn early_return_owes_nothing() {
        let amount = fine_amount(date(2024, 1, 10), date(2024, 1, 3), Decimal::new(50, 2));
        assert_eq!(amount, Decimal::ZERO);
        assert_eq!(overdue_days(date(2024, 1, 10), date(2024, 1, 3)), 0);
    }

    #[test]
    fn rounds_half_up_to_currency_precision() {
        // 1 day at 0.125/day rounds up to 0.13
        let amount = fine_amount(date(2024, 3, 1), date(2024, 3, 2), Decimal::new(125, 3));
        assert_eq!(amount, Decimal::new(13, 2));
    }

    #[test]
    fn same_day_late_by_hours_only_is_not_overdue() {
        let due = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let returned = Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap();
        assert_eq!(overdue_days(due, returned), 0);
    }
}
