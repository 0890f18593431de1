//! Provider dashboard aggregates.
//!
//! Plain reductions over fetched rows, mirroring the dashboard's
//! original client-side computation: total revenue over completed
//! bookings from the last 30 days, per-status counts, monthly revenue
//! buckets and the next upcoming bookings.

use crate::status::BookingStatus;
use crate::types::Booking;
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Revenue window for the dashboard, in days.
const REVENUE_WINDOW_DAYS: i64 = 30;

/// Bookings shown in the upcoming list.
const UPCOMING_LIMIT: usize = 5;

/// Number of bookings per lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Bookings awaiting confirmation.
    pub pending: u64,
    /// Confirmed bookings.
    pub confirmed: u64,
    /// Cancelled bookings.
    pub cancelled: u64,
    /// Completed bookings.
    pub completed: u64,
}

/// Revenue attributed to one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    /// Month in `YYYY-MM` form.
    pub month: String,
    /// Summed completed-booking prices for the month.
    pub revenue: f64,
}

/// Aggregates backing the provider dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Services owned by the provider, active or not.
    pub total_services: u64,
    /// All bookings ever received.
    pub total_bookings: u64,
    /// Per-status booking counts.
    pub status_counts: StatusCounts,
    /// Revenue from completed bookings created in the last 30 days.
    pub total_revenue: f64,
    /// Monthly revenue buckets over the same window, oldest first.
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

/// Compute dashboard aggregates from a provider's bookings.
///
/// `total_services` is passed in because services and bookings live in
/// different stores.
#[must_use]
pub fn dashboard_stats(
    total_services: u64,
    bookings: &[Booking],
    now: DateTime<Utc>,
) -> DashboardStats {
    let mut status_counts = StatusCounts::default();
    for booking in bookings {
        match booking.status {
            BookingStatus::Pending => status_counts.pending += 1,
            BookingStatus::Confirmed => status_counts.confirmed += 1,
            BookingStatus::Cancelled => status_counts.cancelled += 1,
            BookingStatus::Completed => status_counts.completed += 1,
        }
    }

    let window_start = now - Duration::days(REVENUE_WINDOW_DAYS);
    let mut total_revenue = 0.0;
    let mut monthly: BTreeMap<String, f64> = BTreeMap::new();
    for booking in bookings {
        if booking.status == BookingStatus::Completed && booking.created_at >= window_start {
            total_revenue += booking.total_price;
            let month = format!(
                "{:04}-{:02}",
                booking.created_at.year(),
                booking.created_at.month()
            );
            *monthly.entry(month).or_insert(0.0) += booking.total_price;
        }
    }

    DashboardStats {
        total_services,
        total_bookings: bookings.len() as u64,
        status_counts,
        total_revenue,
        monthly_revenue: monthly
            .into_iter()
            .map(|(month, revenue)| MonthlyRevenue { month, revenue })
            .collect(),
    }
}

/// The provider's next few open bookings, ordered by (date, start time).
#[must_use]
pub fn upcoming_bookings(bookings: &[Booking], today: chrono::NaiveDate) -> Vec<Booking> {
    let mut upcoming: Vec<Booking> = bookings
        .iter()
        .filter(|b| {
            b.booking_date >= today
                && matches!(b.status, BookingStatus::Pending | BookingStatus::Confirmed)
        })
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| {
        (a.booking_date, a.start_time).cmp(&(b.booking_date, b.start_time))
    });
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::{BookingId, ServiceId, SlotId, UserId};
    use chrono::{NaiveDate, NaiveTime};

    fn booking(
        status: BookingStatus,
        price: f64,
        created_at: DateTime<Utc>,
        date: NaiveDate,
    ) -> Booking {
        Booking {
            id: BookingId::new(),
            customer_id: UserId::new(),
            service_id: ServiceId::new(),
            provider_id: UserId::new(),
            availability_id: SlotId::new(),
            booking_date: date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            total_price: price,
            status,
            notes: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn revenue_counts_only_recent_completed_bookings() {
        let now = Utc::now();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let bookings = vec![
            booking(BookingStatus::Completed, 50.0, now - Duration::days(3), date),
            booking(BookingStatus::Completed, 80.0, now - Duration::days(45), date),
            booking(BookingStatus::Confirmed, 70.0, now - Duration::days(1), date),
            booking(BookingStatus::Cancelled, 90.0, now - Duration::days(2), date),
        ];

        let stats = dashboard_stats(2, &bookings, now);
        assert_eq!(stats.total_services, 2);
        assert_eq!(stats.total_bookings, 4);
        assert!((stats.total_revenue - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.status_counts.completed, 2);
        assert_eq!(stats.status_counts.confirmed, 1);
        assert_eq!(stats.status_counts.cancelled, 1);
        assert_eq!(stats.monthly_revenue.len(), 1);
    }

    #[test]
    fn upcoming_excludes_past_and_closed_bookings() {
        let now = Utc::now();
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let bookings = vec![
            booking(BookingStatus::Pending, 10.0, now, today + Duration::days(1)),
            booking(BookingStatus::Confirmed, 10.0, now, today),
            booking(BookingStatus::Completed, 10.0, now, today + Duration::days(2)),
            booking(BookingStatus::Pending, 10.0, now, today - Duration::days(1)),
        ];

        let upcoming = upcoming_bookings(&bookings, today);
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].booking_date, today);
        assert_eq!(upcoming[1].booking_date, today + Duration::days(1));
    }
}
