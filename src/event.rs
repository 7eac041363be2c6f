//! Calendar event records handed over by the iCalendar parsing collaborator.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{json_deserialize_error, TtvError, TtvResult};

const SECONDS_PER_DAY: i64 = 86_400;

/// iCalendar style duration, split into weeks/days/hours/minutes/seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDuration {
    #[serde(default)]
    pub weeks: u32,
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
}

impl EventDuration {
    /// Splits a span of seconds the way iCalendar does: whole weeks are only
    /// used when the day count is an exact multiple of seven.
    pub fn from_seconds(total: i64) -> Self {
        let mut secs = total.unsigned_abs();
        let mut days = secs / SECONDS_PER_DAY as u64;
        let mut weeks = 0;
        if days % 7 == 0 {
            weeks = days / 7;
            days = 0;
        }
        secs -= (days + weeks * 7) * SECONDS_PER_DAY as u64;
        let hours = secs / 3_600;
        secs -= hours * 3_600;
        let minutes = secs / 60;
        secs -= minutes * 60;
        Self {
            weeks: saturate(weeks),
            days: saturate(days),
            hours: saturate(hours),
            minutes: saturate(minutes),
            seconds: saturate(secs),
        }
    }

    pub fn between(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> Self {
        Self::from_seconds((*end - *start).num_seconds())
    }

    /// `{weeks}w{days}d{hours}h{minutes}m{seconds}s`
    pub fn format_compact(&self) -> String {
        format!(
            "{}w{}d{}h{}m{}s",
            self.weeks, self.days, self.hours, self.minutes, self.seconds
        )
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub duration: Option<EventDuration>,
}

impl CalendarEvent {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            uid: String::new(),
            summary: String::new(),
            description: String::new(),
            location: String::new(),
            start,
            end,
            duration: None,
        }
    }

    /// Parses a JSON array of event records.
    pub fn list_from_json(input: &str) -> TtvResult<Vec<Self>> {
        let events: Vec<Self> =
            serde_json::from_str(input).map_err(|err| json_deserialize_error(input, &err))?;
        for event in &events {
            event.validate()?;
        }
        Ok(events)
    }

    pub fn validate(&self) -> TtvResult<()> {
        if self.end < self.start {
            return Err(TtvError::InvalidEvent(format!(
                "event '{}' ends before it starts",
                self.uid
            )));
        }
        Ok(())
    }

    /// The stated duration, or the span between start and end.
    pub fn duration(&self) -> EventDuration {
        self.duration
            .unwrap_or_else(|| EventDuration::between(&self.start, &self.end))
    }

    /// Value of a reserved `_event.*` view variable.
    pub fn reserved_field(&self, key: &str) -> Option<String> {
        let value = match key {
            "_event.description" => self.description.clone(),
            "_event.location" => self.location.clone(),
            "_event.summary" => self.summary.clone(),
            "_event.uid" => self.uid.clone(),
            "_event.duration" => self.duration().format_compact(),
            "_event.start" => format_local_timestamp(&self.start),
            "_event.end" => format_local_timestamp(&self.end),
            _ => return None,
        };
        Some(value)
    }
}

/// `DD/MM/YYYY, h:mm:ss am` in the timestamp's own offset.
pub fn format_local_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.format("%d/%m/%Y, %-I:%M:%S %P").to_string()
}
