use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{DocError, Result};

/// Days covered by the day-by-day bucket series.
pub const DAY_BUCKETS: usize = 7;
const WEEK_DAYS: u32 = 7;

const MONTHS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub fn title(&self) -> &'static str {
        match self {
            Period::Daily => "Reporte diario",
            Period::Weekly => "Reporte semanal",
            Period::Monthly => "Reporte mensual",
            Period::Yearly => "Reporte anual",
        }
    }

    /// Window covered when the caller gives no explicit range.
    pub fn default_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Daily => (today, today),
            Period::Weekly => (today - Duration::days(DAY_BUCKETS as i64 - 1), today),
            Period::Monthly => (first_of_month(today), last_of_month(today)),
            Period::Yearly => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
            ),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

impl FromStr for Period {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "diario" => Ok(Period::Daily),
            "weekly" | "week" | "semanal" => Ok(Period::Weekly),
            "monthly" | "month" | "mensual" => Ok(Period::Monthly),
            "yearly" | "year" | "annual" | "anual" => Ok(Period::Yearly),
            _ => Err(DocError::UnknownPeriod(s.to_string())),
        }
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    last_of_month(date).day()
}

fn weekday_short(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lun",
        Weekday::Tue => "Mar",
        Weekday::Wed => "Mié",
        Weekday::Thu => "Jue",
        Weekday::Fri => "Vie",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}

/// The records a report covers and how they are sliced into buckets.
///
/// Day buckets end on `today`; week buckets cover the month of `from`; month
/// buckets cover the year of `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub period: Period,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub today: NaiveDate,
}

impl ReportWindow {
    pub fn new(period: Period, today: NaiveDate) -> Self {
        let (from, to) = period.default_range(today);
        Self {
            period,
            from,
            to,
            today,
        }
    }

    pub fn with_range(
        period: Period,
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self> {
        if from > to {
            return Err(DocError::InvalidRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self {
            period,
            from,
            to,
            today,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn bucket_count(&self) -> usize {
        match self.period {
            Period::Daily | Period::Weekly => DAY_BUCKETS,
            Period::Monthly => days_in_month(self.from).div_ceil(WEEK_DAYS) as usize,
            Period::Yearly => MONTHS.len(),
        }
    }

    /// Bucket a date falls into, or `None` when it lies outside the series.
    pub fn bucket_index(&self, date: NaiveDate) -> Option<usize> {
        let index = match self.period {
            Period::Daily | Period::Weekly => {
                let back = (self.today - date).num_days();
                if !(0..DAY_BUCKETS as i64).contains(&back) {
                    return None;
                }
                DAY_BUCKETS - 1 - back as usize
            }
            Period::Monthly => {
                if date.year() != self.from.year() || date.month() != self.from.month() {
                    return None;
                }
                ((date.day() - 1) / WEEK_DAYS) as usize
            }
            Period::Yearly => {
                if date.year() != self.from.year() {
                    return None;
                }
                date.month0() as usize
            }
        };
        (index < self.bucket_count()).then_some(index)
    }

    pub fn bucket_labels(&self) -> Vec<String> {
        match self.period {
            Period::Daily | Period::Weekly => (0..DAY_BUCKETS)
                .rev()
                .map(|back| {
                    let day = self.today - Duration::days(back as i64);
                    format!("{} {}", weekday_short(day.weekday()), day.format("%d/%m"))
                })
                .collect(),
            Period::Monthly => {
                let last = days_in_month(self.from);
                (0..self.bucket_count() as u32)
                    .map(|week| {
                        let start = week * WEEK_DAYS + 1;
                        let end = (start + WEEK_DAYS - 1).min(last);
                        format!("Sem {} ({start}-{end})", week + 1)
                    })
                    .collect()
            }
            Period::Yearly => MONTHS
                .iter()
                .map(|month| format!("{month} {}", self.from.year()))
                .collect(),
        }
    }

    /// Human readable range, e.g. `01/10/2026 - 31/10/2026`.
    pub fn describe(&self) -> String {
        if self.from == self.to {
            self.from.format("%d/%m/%Y").to_string()
        } else {
            format!(
                "{} - {}",
                self.from.format("%d/%m/%Y"),
                self.to.format("%d/%m/%Y")
            )
        }
    }
}
