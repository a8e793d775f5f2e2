//! Time-bucketed statistics over stored quote and tax document records.

mod aggregate;
mod period;
mod record;
mod status;

pub use aggregate::{aggregate, records_in_window, Bucket, Summary, TopItem};
pub use period::{days_in_month, first_of_month, last_of_month, Period, ReportWindow, DAY_BUCKETS};
pub use record::{parse_records, SummaryRecord};
pub use status::{
    unknown_status_label, Status, StatusTally, NO_STATUS_LABEL, OTHER_STATUS_COLOR,
};
