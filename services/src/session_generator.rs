//! Expands a recurrence rule into concrete session slots.
//!
//! Pure: nothing here touches storage. Collision checks against existing
//! sessions happen when the caller persists the result.

use crate::error::{ServiceError, ServiceResult};
use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;

/// Hard ceiling on the number of sessions one expansion may produce.
pub const MAX_GENERATED_SESSIONS: usize = 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    /// Every 7 days from the start date.
    Weekly,
    /// Every 14 days from the start date.
    Biweekly,
    /// Every day in range whose weekday is in the set.
    Custom(Vec<Weekday>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurrencePattern {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub frequency: Frequency,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
}

/// Values taken from the parent activity when the pattern leaves them out.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDefaults {
    pub location: String,
    pub max_participants: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedSession {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub max_participants: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expansion {
    pub sessions: Vec<GeneratedSession>,
    /// Set when the range held more occurrences than [`MAX_GENERATED_SESSIONS`].
    pub truncated: bool,
}

impl RecurrencePattern {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.end_time <= self.start_time {
            return Err(ServiceError::InvalidRange(format!(
                "end time {} must be after start time {}",
                self.end_time.format("%H:%M"),
                self.start_time.format("%H:%M")
            )));
        }
        if self.end_date < self.start_date {
            return Err(ServiceError::InvalidRange(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        if let Frequency::Custom(days) = &self.frequency {
            if days.is_empty() {
                return Err(ServiceError::InvalidRange(
                    "custom frequency needs at least one weekday".into(),
                ));
            }
        }
        if self.max_participants.is_some_and(|max| max < 1) {
            return Err(ServiceError::validation(
                "max_participants must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Produces the ordered list of sessions described by `pattern`.
///
/// Fails before producing anything if the pattern is malformed. Stops at
/// [`MAX_GENERATED_SESSIONS`] and flags the result as truncated.
pub fn expand(pattern: &RecurrencePattern, defaults: &SessionDefaults) -> ServiceResult<Expansion> {
    pattern.validate()?;

    let location = pattern
        .location
        .clone()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| defaults.location.clone());
    let max_participants = pattern.max_participants.unwrap_or(defaults.max_participants);

    let (stride, weekdays): (u64, Option<&[Weekday]>) = match &pattern.frequency {
        Frequency::Weekly => (7, None),
        Frequency::Biweekly => (14, None),
        Frequency::Custom(days) => (1, Some(days.as_slice())),
    };

    let mut sessions = Vec::new();
    let mut truncated = false;
    let mut cursor = pattern.start_date;

    while cursor <= pattern.end_date {
        let selected = weekdays.is_none_or(|days| days.contains(&cursor.weekday()));
        if selected {
            if sessions.len() == MAX_GENERATED_SESSIONS {
                truncated = true;
                break;
            }
            sessions.push(GeneratedSession {
                date: cursor,
                start_time: pattern.start_time,
                end_time: pattern.end_time,
                location: location.clone(),
                max_participants,
            });
        }

        match cursor.checked_add_days(Days::new(stride)) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    if truncated {
        tracing::warn!(
            start_date = %pattern.start_date,
            end_date = %pattern.end_date,
            cap = MAX_GENERATED_SESSIONS,
            "Recurring expansion hit the session cap; later dates were dropped"
        );
    }

    Ok(Expansion {
        sessions,
        truncated,
    })
}
