//! Post timestamps: month buckets and RFC 3339 rendering for export.

use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// UTC month a post was created in. Field order gives chronological ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u8,
}

impl YearMonth {
    /// `None` when the timestamp is outside the representable calendar range.
    pub fn from_epoch(ts: i64) -> Option<Self> {
        let date = OffsetDateTime::from_unix_timestamp(ts).ok()?.date();
        Some(Self { year: date.year(), month: u8::from(date.month()) })
    }
}

/// Rendered as `YYYY-MM`, the key of the per-month export.
impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn rfc3339_from_epoch(ts: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(ts).ok()?.format(&Rfc3339).ok()
}
