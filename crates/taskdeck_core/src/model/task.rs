use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

pub const MAX_DESCRIPTION_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub starred: bool,
}

impl Task {
    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    pub fn toggle_starred(&mut self) {
        self.starred = !self.starred;
    }

    /// Replaces the description iff it fits the limit; the previous value is
    /// kept untouched on rejection.
    pub fn set_description(&mut self, text: &str) -> Result<(), AppError> {
        if text.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::invalid_input(format!(
                "description exceeds {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        self.description = text.to_string();
        Ok(())
    }
}

pub fn parse_calendar_date(value: &str) -> Result<Date, AppError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).map_err(|_| AppError::invalid_input("dates must be YYYY-MM-DD"))
}

/// Date ordering is the caller's job, checked before any task is mutated.
pub fn validate_date_range(start: Option<&str>, end: Option<&str>) -> Result<(), AppError> {
    let start_date = start.map(parse_calendar_date).transpose()?;
    let end_date = end.map(parse_calendar_date).transpose()?;

    if let (Some(start_date), Some(end_date)) = (start_date, end_date)
        && end_date < start_date
    {
        return Err(AppError::invalid_input(
            "end date must not precede start date",
        ));
    }

    Ok(())
}
