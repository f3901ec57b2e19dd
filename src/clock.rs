use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

/// Source of "now". Handlers never read the wall clock directly so that the
/// reconciliation window can be pinned in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Wall clock, in the configured offset or the host's local time.
    System { offset: Option<FixedOffset> },
    Fixed(DateTime<FixedOffset>),
}

impl Clock {
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self {
            Clock::System { offset: Some(offset) } => Utc::now().with_timezone(offset),
            Clock::System { offset: None } => Local::now().fixed_offset(),
            Clock::Fixed(at) => *at,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
