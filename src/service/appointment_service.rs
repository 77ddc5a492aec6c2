use chrono::NaiveDate;
use std::fmt;

use crate::models::appointment::{Appointment, get_db_location};
use crate::scheduling::ScheduleError;
use crate::scheduling::calendar;
use crate::scheduling::normalize;
use crate::storage::{DB, StoreError, save_db};

#[derive(Debug)]
pub enum FinalizeError {
    /// The selector output matched neither accepted shape.
    Unparseable(String),
    Store(StoreError),
}

impl fmt::Display for FinalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalizeError::Unparseable(value) => write!(f, "unparseable final time: {}", value),
            FinalizeError::Store(e) => write!(f, "failed to persist appointment: {}", e),
        }
    }
}

impl std::error::Error for FinalizeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    Armed,
    AlreadyArmed,
    NoAppointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisarmOutcome {
    Disarmed,
    AlreadyDisarmed,
    NoAppointment,
}

/// Splits a confirmed display time string into `(date label, HH:MM)`.
///
/// Shape priority is fixed: the fully-qualified form first, then
/// "<dayToken> <HH:MM>" resolved against `reference`. Nothing else is
/// accepted; a day without a time cannot be finalized.
fn parse_final_time(value: &str, reference: NaiveDate) -> Result<(String, String), ScheduleError> {
    let value = value.trim();

    if normalize::is_fully_qualified(value) {
        let tokens: Vec<&str> = value.split_whitespace().collect();
        return Ok((tokens[..4].join(" "), tokens[4].to_string()));
    }

    if let Some((day_token, time)) = value.split_once(char::is_whitespace) {
        if let Some((hour, minute)) = normalize::parse_hhmm(time.trim()) {
            if let Ok(resolved) = calendar::resolve_day_token(day_token, reference) {
                return Ok((resolved.label, format!("{:02}:{:02}", hour, minute)));
            }
        }
    }

    Err(ScheduleError::UnparseableFinalTime(value.to_string()))
}

pub struct AppointmentService;

impl AppointmentService {
    /// Commits the confirmed time for a conversation, replacing any earlier
    /// appointment. The new appointment starts disarmed with clean
    /// sent-flags.
    pub fn finalize(
        db: &mut DB<Appointment>,
        conversation_id: &str,
        final_time: &str,
        reference: NaiveDate,
    ) -> Result<Appointment, FinalizeError> {
        let (date, time) = parse_final_time(final_time, reference)
            .map_err(|_| FinalizeError::Unparseable(final_time.to_string()))?;
        let appointment = Appointment::new(date, time);
        db.insert(conversation_id.to_string(), appointment.clone());
        save_db(&get_db_location(), db).map_err(FinalizeError::Store)?;
        Ok(appointment)
    }

    /// Arming always restarts the reminder cycle: both sent-flags reset.
    pub fn arm(db: &mut DB<Appointment>, conversation_id: &str) -> Result<ArmOutcome, StoreError> {
        let Some(appointment) = db.get_mut(conversation_id) else {
            return Ok(ArmOutcome::NoAppointment);
        };
        if appointment.reminder_enabled {
            return Ok(ArmOutcome::AlreadyArmed);
        }
        appointment.reminder_enabled = true;
        appointment.pre_day_reminder_sent = false;
        appointment.same_day_reminder_sent = false;
        save_db(&get_db_location(), db)?;
        Ok(ArmOutcome::Armed)
    }

    pub fn disarm(
        db: &mut DB<Appointment>,
        conversation_id: &str,
    ) -> Result<DisarmOutcome, StoreError> {
        let Some(appointment) = db.get_mut(conversation_id) else {
            return Ok(DisarmOutcome::NoAppointment);
        };
        if !appointment.reminder_enabled {
            return Ok(DisarmOutcome::AlreadyDisarmed);
        }
        appointment.reminder_enabled = false;
        save_db(&get_db_location(), db)?;
        Ok(DisarmOutcome::Disarmed)
    }

    pub fn get(db: &DB<Appointment>, conversation_id: &str) -> Option<Appointment> {
        db.get(conversation_id).cloned()
    }

    /// Drops a conversation's appointment as part of a reset. True when one
    /// existed.
    pub fn remove(db: &mut DB<Appointment>, conversation_id: &str) -> Result<bool, StoreError> {
        if db.remove(conversation_id).is_none() {
            return Ok(false);
        }
        save_db(&get_db_location(), db)?;
        Ok(true)
    }
}
