use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

/// How close a tender deadline is. Whole-day granularity in the local
/// timezone; a deadline of today counts as expired, not near.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    Expired,
    Near,
    Normal,
}

impl DeadlineStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeadlineStatus::Expired => "expired",
            DeadlineStatus::Near => "closing soon",
            DeadlineStatus::Normal => "open",
        }
    }
}

const NEAR_WINDOW_DAYS: i64 = 7;

pub fn classify(deadline: NaiveDate, today: NaiveDate) -> DeadlineStatus {
    let diff_days = (deadline - today).num_days();
    if diff_days <= 0 {
        DeadlineStatus::Expired
    } else if diff_days <= NEAR_WINDOW_DAYS {
        DeadlineStatus::Near
    } else {
        DeadlineStatus::Normal
    }
}

/// Classify a "YYYY-MM-DD" deadline string against the local calendar date.
pub fn classify_str(deadline: &str) -> Result<DeadlineStatus> {
    let date = parse_deadline(deadline)?;
    Ok(classify(date, Local::now().date_naive()))
}

pub fn parse_deadline(deadline: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(deadline, "%Y-%m-%d")
        .with_context(|| format!("Invalid deadline date '{}'", deadline))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_five_days_out_is_near() {
        let status = classify(date("2024-03-15"), date("2024-03-10"));
        assert_eq!(status, DeadlineStatus::Near);
    }

    #[test]
    fn test_day_after_deadline_is_expired() {
        let status = classify(date("2024-03-15"), date("2024-03-16"));
        assert_eq!(status, DeadlineStatus::Expired);
    }

    #[test]
    fn test_deadline_today_is_expired_not_near() {
        let status = classify(date("2024-03-15"), date("2024-03-15"));
        assert_eq!(status, DeadlineStatus::Expired);
    }

    #[test]
    fn test_window_boundaries() {
        assert_eq!(classify(date("2024-03-22"), date("2024-03-15")), DeadlineStatus::Near);
        assert_eq!(classify(date("2024-03-23"), date("2024-03-15")), DeadlineStatus::Normal);
        assert_eq!(classify(date("2024-03-16"), date("2024-03-15")), DeadlineStatus::Near);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_deadline("not-a-date").is_err());
        assert!(parse_deadline("2024-13-40").is_err());
    }
}
