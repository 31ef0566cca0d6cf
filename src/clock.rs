use chrono::{Local, NaiveDate, Utc};

/// Injected time source. The daemon runs on `SystemClock`; tests and the
/// `today` request override use `FixedClock` so date-sensitive logic never
/// depends on ambient wall-clock state.
pub trait Clock {
    /// Current calendar date, local time.
    fn today(&self) -> NaiveDate;
    /// Current instant as epoch milliseconds.
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

pub struct FixedClock {
    pub today: NaiveDate,
    pub millis: i64,
}

impl FixedClock {
    pub fn at(today: NaiveDate, millis: i64) -> Self {
        Self { today, millis }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_millis(&self) -> i64 {
        self.millis
    }
}
