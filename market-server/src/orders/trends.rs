//! Trend Aggregator
//!
//! Day-bucketed order counts per status for dashboards. The repository
//! returns sparse `(day, status, count)` rows; reshaping and gap-filling
//! happen here as a pure function so consumers always get a dense,
//! contiguous series: one entry per calendar day in range, zeros where
//! nothing happened.

use crate::db::repository::order::{self as order_repo, OrderScope, StatusDayCount};
use crate::utils::time;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::error::AppResult;
use shared::order::OrderStatus;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// One day of the dense series, all five statuses always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    pub requested: i64,
    pub in_progress: i64,
    pub advertiser_approval: i64,
    pub completed: i64,
    pub rejected: i64,
}

impl TrendPoint {
    fn zero(date: String) -> Self {
        Self {
            date,
            requested: 0,
            in_progress: 0,
            advertiser_approval: 0,
            completed: 0,
            rejected: 0,
        }
    }

    fn add(&mut self, status: OrderStatus, count: i64) {
        match status {
            OrderStatus::Requested => self.requested += count,
            OrderStatus::InProgress => self.in_progress += count,
            OrderStatus::AdvertiserApproval => self.advertiser_approval += count,
            OrderStatus::Completed => self.completed += count,
            OrderStatus::Rejected => self.rejected += count,
        }
    }

    /// Sum across all statuses, handy for asserting totals
    pub fn total(&self) -> i64 {
        self.requested + self.in_progress + self.advertiser_approval + self.completed + self.rejected
    }
}

/// Reshape sparse grouped counts into a dense daily series over
/// `[start, end]` inclusive. Rows outside the range are ignored.
pub fn fill_daily_series(
    start: NaiveDate,
    end: NaiveDate,
    rows: &[StatusDayCount],
) -> Vec<TrendPoint> {
    let mut points = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut day = start;
    while day <= end {
        let key = day.format("%Y-%m-%d").to_string();
        index.insert(key.clone(), points.len());
        points.push(TrendPoint::zero(key));
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    for row in rows {
        if let Some(&i) = index.get(&row.day) {
            points[i].add(row.status, row.count);
        }
    }

    points
}

/// Dense daily status counts for the given scope and date range
pub async fn order_trends(
    pool: &SqlitePool,
    scope: Option<OrderScope>,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<TrendPoint>> {
    let rows = order_repo::status_day_counts(
        pool,
        scope,
        time::day_start_millis(start),
        time::day_end_exclusive_millis(end),
    )
    .await?;
    Ok(fill_daily_series(start, end, &rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::website;
    use shared::models::WebsiteCreate;
    use shared::order::OrderType;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn row(day: &str, status: OrderStatus, count: i64) -> StatusDayCount {
        StatusDayCount {
            day: day.into(),
            status,
            count,
        }
    }

    #[test]
    fn test_series_is_dense_and_contiguous() {
        let points = fill_daily_series(date("2024-03-10"), date("2024-03-16"), &[]);
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, "2024-03-10");
        assert_eq!(points[6].date, "2024-03-16");
        assert!(points.iter().all(|p| p.total() == 0));
    }

    #[test]
    fn test_sparse_rows_land_on_their_day() {
        // Orders only on day 3 of the week
        let rows = vec![
            row("2024-03-12", OrderStatus::Requested, 2),
            row("2024-03-12", OrderStatus::Completed, 1),
        ];
        let points = fill_daily_series(date("2024-03-10"), date("2024-03-16"), &rows);
        assert_eq!(points.len(), 7);

        let totals: Vec<i64> = points.iter().map(TrendPoint::total).collect();
        assert_eq!(totals, vec![0, 0, 3, 0, 0, 0, 0]);
        assert_eq!(points[2].requested, 2);
        assert_eq!(points[2].completed, 1);
    }

    #[test]
    fn test_rows_outside_range_are_ignored() {
        let rows = vec![row("2024-02-01", OrderStatus::Requested, 5)];
        let points = fill_daily_series(date("2024-03-10"), date("2024-03-11"), &rows);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.total() == 0));
    }

    #[test]
    fn test_single_day_range() {
        let rows = vec![row("2024-03-10", OrderStatus::Rejected, 1)];
        let points = fill_daily_series(date("2024-03-10"), date("2024-03-10"), &rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].rejected, 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let point = TrendPoint::zero("2024-03-10".into());
        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("inProgress").is_some());
        assert!(json.get("advertiserApproval").is_some());
    }

    #[tokio::test]
    async fn test_order_trends_sums_match_raw_counts() {
        let db = DbService::in_memory().await.unwrap();
        let site = website::create(
            &db.pool,
            WebsiteCreate {
                publisher_id: 20,
                domain: "alpha.com".into(),
                guest_post_price: 50.0,
                link_insertion_price: 25.0,
                writing_price: 80.0,
            },
        )
        .await
        .unwrap();

        let day3_millis = time::day_start_millis(date("2024-03-12"));
        for i in 0..4 {
            let order = order_repo::create(
                &db.pool,
                order_repo::NewOrder {
                    advertiser_id: 10,
                    publisher_id: 20,
                    website_id: site.id,
                    order_type: OrderType::GuestPost,
                    post_id: Some(184),
                    link_insertion_id: None,
                    price: 50.0,
                },
            )
            .await
            .unwrap();
            sqlx::query("UPDATE orders SET created_at = ? WHERE id = ?")
                .bind(day3_millis + i * 3_600_000)
                .bind(order.id)
                .execute(&db.pool)
                .await
                .unwrap();
        }

        let points = order_trends(
            &db.pool,
            Some(OrderScope::Publisher(20)),
            date("2024-03-10"),
            date("2024-03-16"),
        )
        .await
        .unwrap();

        // Exactly 7 entries, all orders on day 3, zero-filled elsewhere
        assert_eq!(points.len(), 7);
        let totals: Vec<i64> = points.iter().map(TrendPoint::total).collect();
        assert_eq!(totals, vec![0, 0, 4, 0, 0, 0, 0]);
        assert_eq!(points.iter().map(TrendPoint::total).sum::<i64>(), 4);

        // A different scope sees nothing
        let other = order_trends(
            &db.pool,
            Some(OrderScope::Advertiser(99)),
            date("2024-03-10"),
            date("2024-03-16"),
        )
        .await
        .unwrap();
        assert!(other.iter().all(|p| p.total() == 0));
    }
}
