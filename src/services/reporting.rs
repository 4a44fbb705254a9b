//! Monthly payment totals.
//!
//! Rows are bucketed by the UTC calendar month of `paid_at`. Months with no
//! payments are omitted rather than reported as zero.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::validation::{self, ValidationError};
use super::ServiceResult;
use crate::repositories::{PaymentPoint, PaymentRepository, StudentRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyPaymentsReportItem {
    pub year: i32,
    pub month: u32,
    pub total_amount: Decimal,
    pub payments_count: u64,
}

/// Group payments by (year, month), ascending.
pub fn aggregate_monthly<I>(payments: I) -> Vec<MonthlyPaymentsReportItem>
where
    I: IntoIterator<Item = (DateTime<Utc>, Decimal)>,
{
    let mut buckets: BTreeMap<(i32, u32), (Decimal, u64)> = BTreeMap::new();

    for (paid_at, amount) in payments {
        let bucket = buckets
            .entry((paid_at.year(), paid_at.month()))
            .or_insert((Decimal::ZERO, 0));
        bucket.0 += amount;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(
            |((year, month), (total_amount, payments_count))| MonthlyPaymentsReportItem {
                year,
                month,
                total_amount,
                payments_count,
            },
        )
        .collect()
}

/// Half-open `[Jan 1 of year, Jan 1 of year + 1)` in UTC.
fn year_window(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let from = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let to = Utc.with_ymd_and_hms(year.checked_add(1)?, 1, 1, 0, 0, 0).single()?;
    Some((from, to))
}

async fn report(
    db: &DatabaseConnection,
    student_id: Option<Uuid>,
    year: Option<i32>,
) -> ServiceResult<Vec<MonthlyPaymentsReportItem>> {
    let window = match year {
        Some(year) => match year_window(year) {
            Some(window) => Some(window),
            // A year chrono cannot represent holds no payments.
            None => return Ok(Vec::new()),
        },
        None => None,
    };

    let points = PaymentRepository::new(db).points(student_id, window).await?;

    Ok(aggregate_monthly(points.into_iter().map(
        |PaymentPoint { paid_at, amount }| (paid_at.with_timezone(&Utc), amount),
    )))
}

/// Totals across every student, optionally limited to one calendar year.
pub async fn monthly(
    db: &DatabaseConnection,
    year: Option<i32>,
) -> ServiceResult<Vec<MonthlyPaymentsReportItem>> {
    report(db, None, year).await
}

/// Totals for one student, optionally limited to one calendar year.
pub async fn monthly_by_student(
    db: &DatabaseConnection,
    student_id: Option<Uuid>,
    year: Option<i32>,
) -> ServiceResult<Vec<MonthlyPaymentsReportItem>> {
    let student_id = validation::reference("studentId", student_id)?;

    if !StudentRepository::new(db).exists(student_id).await? {
        return Err(ValidationError::UnknownReference { field: "studentId" }.into());
    }

    report(db, Some(student_id), year).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use sea_orm::prelude::DateTimeWithTimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::str::FromStr;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn point_row(paid_at: DateTime<Utc>, amount: &str) -> BTreeMap<&'static str, Value> {
        let paid_at: DateTimeWithTimeZone = paid_at.into();
        BTreeMap::from([
            ("paid_at", Value::from(paid_at)),
            ("amount", Value::from(dec(amount))),
        ])
    }

    #[test]
    fn groups_by_month_in_ascending_order() {
        let items = aggregate_monthly([
            (at(2026, 4, 2, 9), dec("50")),
            (at(2026, 3, 5, 10), dec("100")),
            (at(2026, 3, 20, 18), dec("250")),
        ]);

        assert_eq!(
            items,
            vec![
                MonthlyPaymentsReportItem {
                    year: 2026,
                    month: 3,
                    total_amount: dec("350"),
                    payments_count: 2,
                },
                MonthlyPaymentsReportItem {
                    year: 2026,
                    month: 4,
                    total_amount: dec("50"),
                    payments_count: 1,
                },
            ]
        );
    }

    #[test]
    fn sums_cents_exactly() {
        let items = aggregate_monthly((0..10).map(|day| (at(2026, 1, day + 1, 12), dec("0.10"))));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_amount, dec("1.00"));
        assert_eq!(items[0].payments_count, 10);
    }

    #[test]
    fn orders_across_years() {
        let items = aggregate_monthly([
            (at(2026, 1, 1, 0), dec("1")),
            (at(2025, 12, 31, 23), dec("2")),
        ]);

        let keys: Vec<(i32, u32)> = items.iter().map(|item| (item.year, item.month)).collect();
        assert_eq!(keys, vec![(2025, 12), (2026, 1)]);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(aggregate_monthly(Vec::<(DateTime<Utc>, Decimal)>::new()).is_empty());
    }

    #[test]
    fn year_window_is_half_open() {
        let (from, to) = year_window(2026).unwrap();
        assert_eq!(from, at(2026, 1, 1, 0));
        assert_eq!(to, at(2027, 1, 1, 0));
    }

    #[tokio::test]
    async fn monthly_aggregates_store_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                point_row(at(2026, 3, 5, 10), "100"),
                point_row(at(2026, 3, 20, 18), "250"),
                point_row(at(2026, 4, 2, 9), "50"),
            ]])
            .into_connection();

        let items = monthly(&db, Some(2026)).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].total_amount, dec("350"));
        assert_eq!(items[1].total_amount, dec("50"));

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("paid_at"));
        assert!(log.contains(">="));
    }

    #[tokio::test]
    async fn by_student_requires_student_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let error = monthly_by_student(&db, Some(Uuid::nil()), None)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ServiceError::Validation(ValidationError::MissingReference { field: "studentId" })
        ));
    }

    #[tokio::test]
    async fn by_student_rejects_unknown_student() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&'static str, Value>>::new()])
            .into_connection();

        let error = monthly_by_student(&db, Some(Uuid::new_v4()), Some(2026))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ServiceError::Validation(ValidationError::UnknownReference { field: "studentId" })
        ));
    }
}
