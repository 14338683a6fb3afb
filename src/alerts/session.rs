//! Market-close detection

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// Fires once per calendar date (in the exchange time zone) once local time
/// reaches the session close.
#[derive(Debug, Clone)]
pub struct SessionBoundary {
    close: NaiveTime,
    timezone: Tz,
    last_fired: Option<NaiveDate>,
}

impl SessionBoundary {
    pub fn new(close: NaiveTime, timezone: Tz) -> Self {
        Self {
            close,
            timezone,
            last_fired: None,
        }
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn last_fired(&self) -> Option<NaiveDate> {
        self.last_fired
    }

    /// `true` the first time `now` is at or past the close on a new date.
    pub fn check(&mut self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone);
        let date = local.date_naive();
        if local.time() < self.close || self.last_fired == Some(date) {
            return false;
        }
        self.last_fired = Some(date);
        true
    }
}

impl Default for SessionBoundary {
    fn default() -> Self {
        Self::new(
            NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default(),
            chrono_tz::Asia::Shanghai,
        )
    }
}
