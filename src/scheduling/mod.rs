pub mod calendar;
pub mod consensus;
pub mod normalize;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The token is neither a weekday literal nor 오늘/내일/모레.
    InvalidWeekdayToken(String),
    /// The finalized time string matched none of the accepted shapes.
    UnparseableFinalTime(String),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidWeekdayToken(token) => {
                write!(f, "unrecognized day token: {}", token)
            }
            ScheduleError::UnparseableFinalTime(value) => {
                write!(f, "unparseable final time: {}", value)
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
