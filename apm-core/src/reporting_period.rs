use chrono::{NaiveDate, TimeDelta};

/// Default visible window for load-demand charts.
pub const LOAD_DEMAND_WEEKS: i64 = 6;

/// Default visible window for physical-development charts.
pub const PHYSICAL_WEEKS: i64 = 52;

/// An inclusive calendar range `[start, end]` used to restrict what a chart shows.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct ReportingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `weeks` weeks ending on `end`. The start day is included, so six
    /// weeks back from a Sunday starts on a Sunday.
    pub fn last_weeks(end: NaiveDate, weeks: i64) -> Self {
        let start = TimeDelta::try_weeks(weeks)
            .and_then(|span| end.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.start <= *date && *date <= self.end
    }
}
