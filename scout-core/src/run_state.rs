//! Run state carried between crawl runs

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::{format_utc, parse_utc};

/// Key of the watermark in the key-value configuration surface
pub const LAST_SCRAPE_KEY: &str = "LAST_SCRAPE_DATETIME";

/// Years the first-run watermark lies in the past
const FIRST_RUN_YEARS_BACK: u32 = 100;

/// Process-wide state persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Watermark of the last successfully processed competition
    pub last_scrape_datetime: DateTime<Utc>,
}

impl RunState {
    /// State of a run with no history: everything counts as new
    pub fn first_run(now: DateTime<Utc>) -> Self {
        let last_scrape_datetime = now
            .checked_sub_months(Months::new(FIRST_RUN_YEARS_BACK * 12))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            last_scrape_datetime,
        }
    }

    /// Decode a stored watermark. `None`, empty, the literal `"None"` and
    /// unparsable values all mean "no history".
    pub fn from_stored(value: Option<&str>) -> Option<Self> {
        let value = value.map(str::trim).filter(|v| !v.is_empty() && *v != "None")?;
        parse_utc(value).ok().map(|last_scrape_datetime| Self {
            last_scrape_datetime,
        })
    }

    /// Encoded watermark
    pub fn to_stored(&self) -> String {
        format_utc(&self.last_scrape_datetime)
    }

    /// Move the watermark forward; never backwards
    pub fn advance(&mut self, timestamp: DateTime<Utc>) {
        if timestamp > self.last_scrape_datetime {
            self.last_scrape_datetime = timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_first_run_is_a_century_back() {
        let now = Utc::now();
        let state = RunState::first_run(now);
        let age = now - state.last_scrape_datetime;

        // 100 calendar years is 36524 or 36525 days
        assert!(age.num_days() >= 36_524);
        assert!(age.num_days() <= 36_528);
    }

    #[test]
    fn test_stored_round_trip() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let state = RunState {
            last_scrape_datetime: ts,
        };
        assert_eq!(state.to_stored(), "2025-03-01T12:30:00+00:00");
        assert_eq!(RunState::from_stored(Some(&state.to_stored())), Some(state));
    }

    #[test]
    fn test_missing_values_mean_no_history() {
        assert_eq!(RunState::from_stored(None), None);
        assert_eq!(RunState::from_stored(Some("None")), None);
        assert_eq!(RunState::from_stored(Some("")), None);
        assert_eq!(RunState::from_stored(Some("garbage")), None);
    }

    #[test]
    fn test_advance_is_monotonic() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut state = RunState {
            last_scrape_datetime: early,
        };
        state.advance(late);
        state.advance(early);
        assert_eq!(state.last_scrape_datetime, late);
    }
}
