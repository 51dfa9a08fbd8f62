//! Report snapshot: a pure derived view of payment status.
//!
//! The builder is deterministic for a fixed input set; the sink overwrites the
//! previous artefact on every refresh, so re-running against the same data
//! produces identical figures.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::payment::{FeeSchedule, Payment};
use super::ports::{
    PaymentRepository, PaymentRepositoryError, ReportWriter, ReportWriterError, UserRepository,
    UserRepositoryError,
};
use super::user::{Role, User};

/// File name of the exported summary sheet.
pub const SUMMARY_FILE: &str = "fee_report_summary.csv";

/// File name of the exported member-by-month details sheet.
pub const DETAILS_FILE: &str = "fee_report_details.csv";

/// Aggregate figures for the summary sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// Member accounts in the system.
    pub total_students: i64,
    /// Distinct members with a payment for the report year.
    pub paid_members: i64,
    /// `total_students - paid_members`.
    pub due_members: i64,
    /// Sum of amounts paid for the report year, major units.
    pub total_collection: i64,
    /// `total_students × 12 × fee − total_collection`.
    pub due_amount: i64,
}

/// Per-month figures for the summary sheet's breakdown table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyRow {
    /// Month ordinal in `1..=12`.
    pub month: u8,
    /// Paid payments covering this month of the report year.
    pub paid_count: i64,
    /// `total_students - paid_count`.
    pub due_count: i64,
    /// Sum of amounts for this month, major units.
    pub collection: i64,
}

/// One member × month line on the details sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    /// Login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Room assignment.
    pub room_number: String,
    /// Month ordinal in `1..=12`.
    pub month: u8,
    /// Report year.
    pub year: i32,
    /// Fee owed for the period, major units.
    pub amount: i64,
    /// Whether a paid payment covers the period.
    pub paid: bool,
    /// Reconciliation time of the covering payment.
    pub paid_at: Option<DateTime<Utc>>,
}

/// Everything a sink needs to render the two-sheet report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSnapshot {
    /// When this snapshot was generated.
    pub generated_at: DateTime<Utc>,
    /// Year the figures cover.
    pub year: i32,
    /// Aggregate figures.
    pub summary: ReportSummary,
    /// Twelve-month breakdown, January first.
    pub monthly: Vec<MonthlyRow>,
    /// Member × month status lines, ordered by username then month.
    pub details: Vec<DetailRow>,
}

/// Build a snapshot from the full user and payment sets.
///
/// Only member accounts appear in the figures; payments are matched by the
/// fee period they cover, not by when they were reconciled.
pub fn build_snapshot(
    users: &[User],
    payments: &[Payment],
    fee: &FeeSchedule,
    year: i32,
    generated_at: DateTime<Utc>,
) -> ReportSnapshot {
    let mut members: Vec<&User> = users.iter().filter(|u| u.role == Role::Member).collect();
    members.sort_by(|a, b| a.username.cmp(&b.username));

    let year_payments: Vec<&Payment> = payments
        .iter()
        .filter(|p| p.period.year == year && p.status == "paid")
        .collect();

    let total_students = members.len() as i64;
    let paid_member_ids: HashSet<Uuid> = year_payments.iter().map(|p| p.user_id).collect();
    let paid_members = paid_member_ids.len() as i64;
    let total_collection: i64 = year_payments.iter().map(|p| p.amount).sum();
    let due_amount = total_students * 12 * fee.monthly_fee - total_collection;

    let monthly = (1..=12u8)
        .map(|month| {
            let in_month: Vec<&&Payment> = year_payments
                .iter()
                .filter(|p| p.period.month == month)
                .collect();
            let paid_count = in_month.len() as i64;
            MonthlyRow {
                month,
                paid_count,
                due_count: total_students - paid_count,
                collection: in_month.iter().map(|p| p.amount).sum(),
            }
        })
        .collect();

    let details = members
        .iter()
        .flat_map(|member| {
            let member_payments: Vec<&&Payment> = year_payments
                .iter()
                .filter(|p| p.user_id == member.id)
                .collect();
            (1..=12u8).map(move |month| {
                let covering = member_payments.iter().find(|p| p.period.month == month);
                DetailRow {
                    username: member.username.clone(),
                    full_name: member.full_name.clone(),
                    room_number: member.room_number.clone(),
                    month,
                    year,
                    amount: fee.monthly_fee,
                    paid: covering.is_some(),
                    paid_at: covering.map(|p| p.paid_at),
                }
            })
        })
        .collect();

    ReportSnapshot {
        generated_at,
        year,
        summary: ReportSummary {
            total_students,
            paid_members,
            due_members: total_students - paid_members,
            total_collection,
            due_amount,
        },
        monthly,
        details,
    }
}

/// Failures during a report refresh. Callers invoke refresh as a best-effort
/// side effect and log these rather than propagating them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportRefreshError {
    /// Reading users failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
    /// Reading payments failed.
    #[error(transparent)]
    Payments(#[from] PaymentRepositoryError),
    /// Writing the artefact failed.
    #[error(transparent)]
    Writer(#[from] ReportWriterError),
}

/// Regenerates the report artefact from the current store contents.
pub struct ReportService {
    users: Arc<dyn UserRepository>,
    payments: Arc<dyn PaymentRepository>,
    writer: Arc<dyn ReportWriter>,
    fee: FeeSchedule,
}

impl ReportService {
    /// Wire the service with its collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        payments: Arc<dyn PaymentRepository>,
        writer: Arc<dyn ReportWriter>,
        fee: FeeSchedule,
    ) -> Self {
        Self {
            users,
            payments,
            writer,
            fee,
        }
    }

    /// Rebuild the report for the year containing `now` and overwrite the
    /// previous artefact.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<(), ReportRefreshError> {
        use chrono::Datelike;

        let users = self.users.list().await?;
        let payments = self.payments.list_all().await?;
        let snapshot = build_snapshot(&users, &payments, &self.fee, now.year(), now);
        self.writer.write(&snapshot).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::FeePeriodFields;
    use crate::domain::period::FeePeriod;
    use rstest::rstest;

    fn member(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.into(),
            full_name: format!("{username} full"),
            room_number: "A-1".into(),
            email: format!("{username}@example.com"),
            phone: None,
            role: Role::Member,
            created_at: Utc::now(),
        }
    }

    fn admin() -> User {
        User {
            id: Uuid::new_v4(),
            username: "admin".into(),
            full_name: "System Admin".into(),
            room_number: "A-001".into(),
            email: "admin@hostel.local".into(),
            phone: None,
            role: Role::Admin,
            created_at: Utc::now(),
        }
    }

    fn paid(user: &User, month: u8, year: i32, amount: i64) -> Payment {
        let period = FeePeriod::try_new(month, year).expect("valid period");
        Payment {
            id: Uuid::new_v4(),
            user_id: user.id,
            period: FeePeriodFields::from(period),
            amount,
            status: "paid".into(),
            payment_ref: format!("pay_{month}_{year}"),
            paid_at: Utc::now(),
        }
    }

    #[test]
    fn summary_figures_follow_the_dashboard_algebra() {
        let fee = FeeSchedule::default();
        let a = member("asha");
        let b = member("bela");
        let c = member("chad");
        let users = vec![admin(), a.clone(), b.clone(), c.clone()];
        let payments = vec![paid(&a, 1, 2024, 500), paid(&a, 2, 2024, 500), paid(&b, 1, 2024, 500)];

        let snapshot = build_snapshot(&users, &payments, &fee, 2024, Utc::now());

        assert_eq!(snapshot.summary.total_students, 3);
        assert_eq!(snapshot.summary.paid_members, 2);
        assert_eq!(snapshot.summary.due_members, 1);
        assert_eq!(snapshot.summary.total_collection, 1500);
        assert_eq!(snapshot.summary.due_amount, 3 * 12 * 500 - 1500);
    }

    #[test]
    fn other_years_do_not_leak_into_the_figures() {
        let fee = FeeSchedule::default();
        let a = member("asha");
        let payments = vec![paid(&a, 1, 2023, 500)];
        let snapshot = build_snapshot(&[a], &payments, &fee, 2024, Utc::now());
        assert_eq!(snapshot.summary.paid_members, 0);
        assert_eq!(snapshot.summary.total_collection, 0);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 0)]
    fn monthly_breakdown_counts_covering_payments(#[case] month: u8, #[case] expected: i64) {
        let fee = FeeSchedule::default();
        let a = member("asha");
        let payments = vec![paid(&a, 1, 2024, 500)];
        let snapshot = build_snapshot(&[a], &payments, &fee, 2024, Utc::now());
        let row = snapshot
            .monthly
            .iter()
            .find(|r| r.month == month)
            .expect("row for month");
        assert_eq!(row.paid_count, expected);
        assert_eq!(row.due_count, 1 - expected);
    }

    #[test]
    fn details_cover_every_member_month_in_username_order() {
        let fee = FeeSchedule::default();
        let b = member("bela");
        let a = member("asha");
        let payments = vec![paid(&a, 3, 2024, 500)];
        let snapshot = build_snapshot(&[b, a], &payments, &fee, 2024, Utc::now());

        assert_eq!(snapshot.details.len(), 24);
        let first = snapshot.details.first().expect("first row");
        assert_eq!(first.username, "asha");
        let march = snapshot
            .details
            .iter()
            .find(|r| r.username == "asha" && r.month == 3)
            .expect("asha march row");
        assert!(march.paid);
        assert!(march.paid_at.is_some());
    }

    #[test]
    fn building_twice_from_the_same_inputs_is_identical() {
        let fee = FeeSchedule::default();
        let a = member("asha");
        let payments = vec![paid(&a, 3, 2024, 500)];
        let generated_at = Utc::now();
        let first = build_snapshot(std::slice::from_ref(&a), &payments, &fee, 2024, generated_at);
        let second = build_snapshot(std::slice::from_ref(&a), &payments, &fee, 2024, generated_at);
        assert_eq!(first, second);
    }
}
