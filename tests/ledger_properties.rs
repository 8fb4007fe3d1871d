//! Property tests for applied-day derivation and ledger row arithmetic.

use chrono::{Days, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use leave_engine::models::{BalanceKey, LeaveBalance, LeaveType, compute_applied_days};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn now() -> NaiveDateTime {
    base_date().and_hms_opt(9, 0, 0).unwrap()
}

/// Day counts in half-day steps, 0.5 .. 15.
fn days() -> impl Strategy<Value = Decimal> {
    (1i64..=30).prop_map(|halves| Decimal::new(halves * 5, 1))
}

#[derive(Debug, Clone)]
enum Movement {
    Debit(Decimal),
    Credit(Decimal),
    Adjust(Decimal, Decimal),
}

fn movement() -> impl Strategy<Value = Movement> {
    prop_oneof![
        days().prop_map(Movement::Debit),
        days().prop_map(Movement::Credit),
        (days(), days()).prop_map(|(old, new)| Movement::Adjust(old, new)),
    ]
}

proptest! {
    #[test]
    fn full_day_ranges_count_every_calendar_day(offset in 0u64..300, length in 0u64..60) {
        let start = base_date() + Days::new(offset);
        let end = start + Days::new(length);

        let applied = compute_applied_days(start, end, false).unwrap();

        prop_assert_eq!(applied, Decimal::from(length + 1));
    }

    #[test]
    fn reversed_ranges_are_rejected(offset in 0u64..300, gap in 1u64..60) {
        let end = base_date() + Days::new(offset);
        let start = end + Days::new(gap);

        prop_assert!(compute_applied_days(start, end, false).is_err());
    }

    #[test]
    fn usage_stays_within_allowance(
        total_halves in 0i64..80,
        movements in prop::collection::vec(movement(), 1..40),
    ) {
        let total = Decimal::new(total_halves * 5, 1);
        let key = BalanceKey::new("emp_001", LeaveType::Annual, 2026);
        let mut row = LeaveBalance::new(key, total, Decimal::ZERO, now());

        for step in movements {
            let before = row.used;
            match step {
                Movement::Debit(d) => {
                    match row.debited(d, now()) {
                        Ok(next) => {
                            prop_assert_eq!(next.used, before + d);
                            row = next;
                        }
                        Err(_) => prop_assert!(before + d > total),
                    }
                }
                Movement::Credit(d) => row = row.credited(d, now()),
                Movement::Adjust(old, new) => {
                    if let Ok(next) = row.adjusted(old, new, now()) {
                        row = next;
                    }
                }
            }

            prop_assert!(row.used >= Decimal::ZERO);
            prop_assert!(row.used <= row.total_allowed);
            prop_assert_eq!(row.total_allowed, total);
        }
    }
}
