use std::collections::{BTreeMap, HashSet};

use super::period::ReportWindow;
use super::record::SummaryRecord;
use super::status::StatusTally;

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopItem {
    pub key: String,
    pub name: String,
    /// Number of records that reference the item.
    pub records: usize,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub window: ReportWindow,
    /// One entry per slice of the period, zero-filled.
    pub buckets: Vec<Bucket>,
    pub record_count: usize,
    pub revenue: f64,
    pub tally: StatusTally,
    pub distinct_clients: usize,
    pub top_items: Vec<TopItem>,
    /// In-window records whose date falls outside the bucket series.
    pub unbucketed: usize,
}

impl Summary {
    pub fn average_ticket(&self) -> f64 {
        if self.record_count == 0 {
            0.0
        } else {
            self.revenue / self.record_count as f64
        }
    }

    /// Share of records in an approved, authorized or completed state.
    pub fn approval_rate(&self) -> f64 {
        if self.record_count == 0 {
            0.0
        } else {
            self.tally.approved() as f64 / self.record_count as f64
        }
    }

    pub fn max_bucket_revenue(&self) -> f64 {
        self.buckets.iter().map(|b| b.revenue).fold(0.0, f64::max)
    }
}

/// Records dated inside the window, oldest first. Undated records are left out.
pub fn records_in_window<'a>(
    records: &'a [SummaryRecord],
    window: &ReportWindow,
) -> Vec<&'a SummaryRecord> {
    let mut selected: Vec<&SummaryRecord> = records
        .iter()
        .filter(|record| match record.created_at {
            Some(stamp) => window.contains(stamp.date()),
            None => {
                log::warn!("Skipping record '{}' without a readable date", record.number);
                false
            }
        })
        .collect();
    selected.sort_by_key(|record| record.created_at);
    selected
}

pub fn aggregate(records: &[SummaryRecord], window: &ReportWindow, top_n: usize) -> Summary {
    let mut buckets: Vec<Bucket> = window
        .bucket_labels()
        .into_iter()
        .map(|label| Bucket {
            label,
            count: 0,
            revenue: 0.0,
        })
        .collect();

    let selected = records_in_window(records, window);
    let mut tally = StatusTally::default();
    let mut clients = HashSet::new();
    let mut items: BTreeMap<String, TopItem> = BTreeMap::new();
    let mut revenue = 0.0;
    let mut unbucketed = 0;

    for record in &selected {
        revenue += record.total;
        tally.record(&record.status);

        if let Some(email) = &record.client_email {
            clients.insert(email.to_lowercase());
        }

        let bucket = record
            .created_at
            .and_then(|stamp| window.bucket_index(stamp.date()))
            .and_then(|index| buckets.get_mut(index));
        match bucket {
            Some(bucket) => {
                bucket.count += 1;
                bucket.revenue += record.total;
            }
            None => unbucketed += 1,
        }

        // A record counts once per item however many lines repeat it.
        let mut referenced = HashSet::new();
        for item in &record.items {
            let entry = items.entry(item.key.clone()).or_insert_with(|| TopItem {
                key: item.key.clone(),
                name: item.name.clone(),
                records: 0,
                quantity: 0.0,
            });
            if referenced.insert(item.key.as_str()) {
                entry.records += 1;
            }
            entry.quantity += item.quantity;
        }
    }

    if unbucketed > 0 {
        log::debug!("{unbucketed} record(s) fall outside the bucket series");
    }

    let mut top_items: Vec<TopItem> = items.into_values().collect();
    top_items.sort_by(|a, b| {
        b.records
            .cmp(&a.records)
            .then(b.quantity.total_cmp(&a.quantity))
            .then_with(|| a.name.cmp(&b.name))
    });
    top_items.truncate(top_n);

    Summary {
        window: *window,
        buckets,
        record_count: selected.len(),
        revenue,
        tally,
        distinct_clients: clients.len(),
        top_items,
        unbucketed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::period::Period;
    use crate::summary::status::Status;
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(created_at: &str, total: f64, status: &str, email: &str, items: serde_json::Value) -> SummaryRecord {
        serde_json::from_value(json!({
            "number": created_at,
            "created_at": created_at,
            "total": total,
            "status": status,
            "client_email": email,
            "items": items
        }))
        .unwrap()
    }

    #[test]
    fn empty_daily_report_has_seven_zero_buckets() {
        let window = ReportWindow::new(Period::Daily, date(2026, 10, 19));
        let summary = aggregate(&[], &window, 5);

        assert_eq!(summary.buckets.len(), 7);
        assert!(summary.buckets.iter().all(|b| b.count == 0 && b.revenue == 0.0));
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.revenue, 0.0);
        assert_eq!(summary.average_ticket(), 0.0);
        assert_eq!(summary.approval_rate(), 0.0);
        assert_eq!(summary.distinct_clients, 0);
        assert!(summary.top_items.is_empty());
    }

    #[test]
    fn bucket_density_is_fixed_by_the_period() {
        let records = vec![record("2026-02-10", 10.0, "sent", "a@x.mx", json!([]))];
        for (period, today, expected) in [
            (Period::Weekly, date(2026, 2, 14), 7),
            (Period::Monthly, date(2026, 2, 14), 4),
            (Period::Monthly, date(2026, 1, 14), 5),
            (Period::Yearly, date(2026, 2, 14), 12),
        ] {
            let window = ReportWindow::new(period, today);
            assert_eq!(aggregate(&records, &window, 5).buckets.len(), expected);
            assert_eq!(aggregate(&[], &window, 5).buckets.len(), expected);
        }
    }

    #[test]
    fn weekly_records_land_in_day_buckets() {
        let records = vec![
            record("2026-10-19 10:00:00", 100.0, "approved", "a@x.mx", json!([])),
            record("2026-10-19 18:00:00", 50.0, "pending", "b@x.mx", json!([])),
            record("2026-10-13T08:00:00Z", 25.0, "rechazada", "A@X.MX", json!([])),
            record("2026-10-01", 999.0, "approved", "c@x.mx", json!([])),
        ];
        let window = ReportWindow::new(Period::Weekly, date(2026, 10, 19));
        let summary = aggregate(&records, &window, 5);

        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.revenue, 175.0);
        assert_eq!(summary.buckets[6].count, 2);
        assert_eq!(summary.buckets[6].revenue, 150.0);
        assert_eq!(summary.buckets[0].count, 1);
        assert_eq!(summary.distinct_clients, 2);
        assert_eq!(summary.tally.count(Status::Rejected), 1);
        assert!((summary.approval_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn custom_range_wider_than_buckets_counts_but_skips_bucketing() {
        let records = vec![
            record("2026-10-19", 10.0, "sent", "", json!([])),
            record("2026-09-01", 20.0, "sent", "", json!([])),
        ];
        let today = date(2026, 10, 19);
        let window =
            ReportWindow::with_range(Period::Daily, date(2026, 9, 1), today, today).unwrap();
        let summary = aggregate(&records, &window, 5);

        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.unbucketed, 1);
        let bucketed: usize = summary.buckets.iter().map(|b| b.count).sum();
        assert_eq!(bucketed, 1);
    }

    #[test]
    fn top_items_rank_by_reference_count() {
        let records = vec![
            record("2026-10-19", 1.0, "sent", "", json!([{"name": "Cable"}, {"name": "Foco", "qty": 10}])),
            record("2026-10-18", 1.0, "sent", "", json!("[{\"name\": \"cable \"}]")),
            record("2026-10-17", 1.0, "sent", "", json!("not json")),
        ];
        let window = ReportWindow::new(Period::Weekly, date(2026, 10, 19));
        let summary = aggregate(&records, &window, 1);

        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.top_items.len(), 1);
        assert_eq!(summary.top_items[0].key, "cable");
        assert_eq!(summary.top_items[0].records, 2);
    }

    #[test]
    fn repeated_lines_count_their_record_once() {
        let records = vec![
            record(
                "2026-10-19",
                1.0,
                "sent",
                "",
                json!([{"name": "Cable"}, {"name": "Cable", "qty": 2}, {"name": "CABLE"}]),
            ),
            record("2026-10-18", 1.0, "sent", "", json!([{"name": "Foco"}])),
            record("2026-10-17", 1.0, "sent", "", json!([{"name": "Foco"}])),
        ];
        let window = ReportWindow::new(Period::Weekly, date(2026, 10, 19));
        let summary = aggregate(&records, &window, 5);

        assert_eq!(summary.top_items[0].key, "foco");
        assert_eq!(summary.top_items[0].records, 2);
        assert_eq!(summary.top_items[1].key, "cable");
        assert_eq!(summary.top_items[1].records, 1);
        assert_eq!(summary.top_items[1].quantity, 4.0);
    }

    #[test]
    fn undated_records_are_skipped() {
        let records = vec![record("nope", 10.0, "sent", "", json!([]))];
        let window = ReportWindow::new(Period::Yearly, date(2026, 10, 19));
        assert_eq!(aggregate(&records, &window, 5).record_count, 0);
    }
}
