use chrono::{Datelike, Duration, NaiveDate};

use super::ScheduleError;

pub const WEEKDAYS: [&str; 7] = [
    "월요일",
    "화요일",
    "수요일",
    "목요일",
    "금요일",
    "토요일",
    "일요일",
];

pub const TODAY: &str = "오늘";
pub const TOMORROW: &str = "내일";
pub const DAY_AFTER_TOMORROW: &str = "모레";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    /// Human-readable echo, e.g. "2025년 7월 3일 목요일". The trailing token
    /// is whatever was matched, so "오늘" stays "오늘".
    pub label: String,
}

pub fn weekday_index(token: &str) -> Option<usize> {
    WEEKDAYS.iter().position(|wd| *wd == token)
}

/// Resolves a relative day token against a reference date.
///
/// 오늘/내일/모레 resolve literally to +0/+1/+2 days. A weekday literal
/// resolves to the next occurrence strictly after the reference: a token
/// naming the reference's own weekday means next week, never today.
/// Confirmed meeting references are treated as forward-looking.
pub fn resolve_day_token(token: &str, reference: NaiveDate) -> Result<ResolvedDate, ScheduleError> {
    let days_ahead = match token {
        TODAY => 0,
        TOMORROW => 1,
        DAY_AFTER_TOMORROW => 2,
        _ => {
            let Some(index) = weekday_index(token) else {
                return Err(ScheduleError::InvalidWeekdayToken(token.to_string()));
            };
            let reference_index = reference.weekday().num_days_from_monday() as i64;
            let mut ahead = (index as i64 - reference_index + 7) % 7;
            if ahead == 0 {
                ahead = 7;
            }
            ahead
        }
    };

    let date = reference + Duration::days(days_ahead);
    Ok(ResolvedDate {
        label: format!("{}년 {}월 {}일 {}", date.year(), date.month(), date.day(), token),
        date,
    })
}
