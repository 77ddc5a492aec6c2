use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Seoul;
use serde::{Deserialize, Serialize};
use std::env;

use crate::scheduling::normalize::parse_hhmm;

// Returns the directory where the appointment snapshot lives.
// Defaults to a relative "./data" directory.
pub fn get_db_location() -> String {
    env::var("DB_LOCATION").unwrap_or("./data".to_string())
}

/// The confirmed meeting for one conversation. At most one exists per
/// conversation id, created by finalize and deleted on expiry or reset.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Appointment {
    /// Display label, e.g. "2025년 7월 3일 목요일".
    pub date: String,
    /// 24-hour clock, "HH:MM".
    pub time: String,
    pub reminder_enabled: bool,
    pub pre_day_reminder_sent: bool,
    pub same_day_reminder_sent: bool,
}

impl Appointment {
    pub fn new(date: String, time: String) -> Self {
        Appointment {
            date,
            time,
            reminder_enabled: false,
            pre_day_reminder_sent: false,
            same_day_reminder_sent: false,
        }
    }

    /// Calendar date parsed back out of the display label.
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        let mut tokens = self.date.split_whitespace();
        let year: i32 = tokens.next()?.strip_suffix('년')?.parse().ok()?;
        let month: u32 = tokens.next()?.strip_suffix('월')?.parse().ok()?;
        let day: u32 = tokens.next()?.strip_suffix('일')?.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// The appointment instant. Stored fields are local wall-clock time in
    /// Asia/Seoul.
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        let date = self.scheduled_date()?;
        let (hour, minute) = parse_hhmm(&self.time)?;
        let local = date.and_time(NaiveTime::from_hms_opt(hour, minute, 0)?);
        Some(Seoul.from_local_datetime(&local).single()?.with_timezone(&Utc))
    }
}
