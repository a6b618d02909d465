//! Rebalance schedules: which bars are decision bars.

use crate::domain::error::AtsimError;
use chrono::{Datelike, NaiveDateTime, Weekday};
use std::fmt;

/// A side-effect free predicate over bar timestamps.
pub trait Schedule: fmt::Debug {
    fn is_eligible(&self, time: NaiveDateTime) -> bool;
}

/// Every bar is a decision bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl Schedule for Always {
    fn is_eligible(&self, _time: NaiveDateTime) -> bool {
        true
    }
}

/// Decision bars fall on one weekday.
#[derive(Debug, Clone, Copy)]
pub struct Weekly(pub Weekday);

impl Schedule for Weekly {
    fn is_eligible(&self, time: NaiveDateTime) -> bool {
        time.weekday() == self.0
    }
}

/// Parse `always` or `weekly:<weekday>` (e.g. `weekly:fri`).
pub fn parse_schedule(input: &str) -> Result<Box<dyn Schedule>, AtsimError> {
    let invalid = |reason: String| AtsimError::ConfigInvalid {
        section: "strategy".to_string(),
        key: "schedule".to_string(),
        reason,
    };

    let input = input.trim().to_lowercase();
    match input.split_once(':') {
        None if input == "always" => Ok(Box::new(Always)),
        Some(("weekly", day)) => {
            let weekday: Weekday = day
                .trim()
                .parse()
                .map_err(|_| invalid(format!("unknown weekday '{}'", day.trim())))?;
            Ok(Box::new(Weekly(weekday)))
        }
        _ => Err(invalid(format!("unknown schedule '{}'", input))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(17, 0, 0)
            .unwrap()
    }

    #[test]
    fn always_is_eligible() {
        assert!(Always.is_eligible(at(2018, 9, 1)));
        assert!(Always.is_eligible(at(2018, 12, 31)));
    }

    #[test]
    fn weekly_matches_weekday() {
        let friday = Weekly(Weekday::Fri);
        // 2018-09-07 was a Friday
        assert!(friday.is_eligible(at(2018, 9, 7)));
        assert!(!friday.is_eligible(at(2018, 9, 6)));
    }

    #[test]
    fn parse_known_schedules() {
        let s = parse_schedule("always").unwrap();
        assert!(s.is_eligible(at(2018, 9, 6)));

        let s = parse_schedule(" Weekly:FRI ").unwrap();
        assert!(s.is_eligible(at(2018, 9, 7)));
        assert!(!s.is_eligible(at(2018, 9, 6)));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!(parse_schedule("monthly").is_err());
        assert!(parse_schedule("weekly:someday").is_err());
        assert!(parse_schedule("always:1").is_err());
    }
}
