use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_LIST_ID: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub completed: bool,
    pub list_id: String,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "task.id")?;
        validate_non_empty(&self.title, "task.title")?;
        validate_non_empty(&self.list_id, "task.list_id")?;
        if let Some(due_date) = &self.due_date {
            validate_date(due_date, "task.due_date")?;
        }
        if let Some(due_time) = &self.due_time {
            validate_hhmm(due_time, "task.due_time")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskList {
    pub id: String,
    pub name: String,
}

impl TaskList {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "list.id")?;
        validate_non_empty(&self.name, "list.name")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subroutine {
    pub id: String,
    pub name: String,
    pub duration: String,
    pub completed: bool,
}

impl Subroutine {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "subroutine.id")?;
        validate_non_empty(&self.name, "subroutine.name")?;
        validate_duration(&self.duration, "subroutine.duration")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedDays {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl SelectedDays {
    pub fn contains(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn none_selected(&self) -> bool {
        !(self.monday
            || self.tuesday
            || self.wednesday
            || self.thursday
            || self.friday
            || self.saturday
            || self.sunday)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub subroutines: Vec<Subroutine>,
    pub selected_time: String,
    pub selected_days: SelectedDays,
    pub total_duration: String,
    pub notifications_enabled: bool,
    pub status_date: String,
}

impl Routine {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "routine.id")?;
        validate_non_empty(&self.name, "routine.name")?;
        validate_hhmm(&self.selected_time, "routine.selected_time")?;
        validate_date(&self.status_date, "routine.status_date")?;
        let mut seen_ids = HashSet::new();
        for subroutine in &self.subroutines {
            subroutine.validate()?;
            if !seen_ids.insert(subroutine.id.as_str()) {
                return Err(format!(
                    "routine.subroutines contains duplicate id '{}'",
                    subroutine.id
                ));
            }
        }
        Ok(())
    }

    /// Derived completion: every subroutine done. Never stored.
    pub fn is_complete(&self) -> bool {
        self.subroutines.iter().all(|subroutine| subroutine.completed)
    }
}

pub(crate) fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

pub(crate) fn validate_hhmm(value: &str, field_name: &str) -> Result<(), String> {
    let mut split = value.split(':');
    let Some(hour_str) = split.next() else {
        return Err(format!("{field_name} must be HH:MM"));
    };
    let Some(minute_str) = split.next() else {
        return Err(format!("{field_name} must be HH:MM"));
    };
    if split.next().is_some() {
        return Err(format!("{field_name} must be HH:MM"));
    }

    let hour = hour_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be HH:MM"))?;
    let minute = minute_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be HH:MM"))?;
    if hour > 23 || minute > 59 {
        return Err(format!("{field_name} must be HH:MM"));
    }
    Ok(())
}

pub(crate) fn validate_date(value: &str, field_name: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("{field_name} must be YYYY-MM-DD"))?;
    Ok(())
}

// A duration must start with a number the countdown can read; anything after
// the leading amount is aggregation detail handled leniently on read.
pub(crate) fn validate_duration(value: &str, field_name: &str) -> Result<(), String> {
    let Some(first_token) = value.split_whitespace().next() else {
        return Err(format!("{field_name} must not be empty"));
    };
    if parse_leading_int(first_token).is_none() {
        return Err(format!(
            "{field_name} must start with a whole number of minutes"
        ));
    }
    Ok(())
}

/// Longest decimal-digit prefix of a token, `None` when there is none.
pub(crate) fn parse_leading_int(token: &str) -> Option<u64> {
    let end = token
        .char_indices()
        .find(|(_, character)| !character.is_ascii_digit())
        .map(|(index, _)| index)
        .unwrap_or(token.len());
    let digits = &token[..end];
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}

pub(crate) fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
