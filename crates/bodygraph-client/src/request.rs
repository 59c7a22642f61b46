//! Birth data submitted to the calculation service

use crate::service::{ClientError, ClientResult};
use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Birth time assumed when the exact time is unknown.
pub const APPROXIMATE_TIME: &str = "12:00";

const NAME_PATTERN: &str = r"^[\p{L}\s\-']+$";
const DATE_PATTERN: &str = r"^\d{2}\.\d{2}\.\d{4}$";
const TIME_PATTERN: &str = r"^\d{2}:\d{2}$";
const MAX_AGE_YEARS: i32 = 150;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub first_name: String,
    /// `DD.MM.YYYY`
    pub birth_date: String,
    /// `HH:MM`; ignored when `birth_time_approximate` is set.
    #[serde(default)]
    pub birth_time: String,
    #[serde(default)]
    pub birth_time_approximate: bool,
    pub birth_place: String,
}

impl ChartRequest {
    pub fn new(
        first_name: impl Into<String>,
        birth_date: impl Into<String>,
        birth_time: impl Into<String>,
        birth_place: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            birth_date: birth_date.into(),
            birth_time: birth_time.into(),
            birth_time_approximate: false,
            birth_place: birth_place.into(),
        }
    }

    pub fn approximate(mut self) -> Self {
        self.birth_time_approximate = true;
        self
    }

    /// Birth time actually sent to the service.
    pub fn effective_time(&self) -> &str {
        if self.birth_time_approximate {
            APPROXIMATE_TIME
        } else {
            &self.birth_time
        }
    }

    /// Copy with the effective time filled in, as sent on the wire.
    pub fn normalized(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            birth_time: self.effective_time().to_string(),
            birth_place: self.birth_place.trim().to_string(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        self.validate_at(Local::now().date_naive())
    }

    /// Validate against a fixed "today".
    pub fn validate_at(&self, today: NaiveDate) -> ClientResult<()> {
        let name = self.first_name.trim();
        let name_len = name.chars().count();
        if !(2..=50).contains(&name_len) {
            return Err(invalid("firstName", "name must be 2-50 characters"));
        }
        if !matches(NAME_PATTERN, name) {
            return Err(invalid(
                "firstName",
                "name may contain only letters, spaces, hyphens and apostrophes",
            ));
        }

        if !matches(DATE_PATTERN, &self.birth_date) {
            return Err(invalid("birthDate", "expected DD.MM.YYYY"));
        }
        let date = NaiveDate::parse_from_str(&self.birth_date, "%d.%m.%Y")
            .map_err(|_| invalid("birthDate", "not a calendar date"))?;
        if date > today {
            return Err(invalid("birthDate", "birth date is in the future"));
        }
        if date.year() < today.year() - MAX_AGE_YEARS {
            return Err(invalid("birthDate", "birth date is too far in the past"));
        }

        if !self.birth_time_approximate {
            validate_time(&self.birth_time)?;
        }

        let place_len = self.birth_place.trim().chars().count();
        if !(2..=200).contains(&place_len) {
            return Err(invalid("birthPlace", "place must be 2-200 characters"));
        }
        Ok(())
    }
}

fn validate_time(time: &str) -> ClientResult<()> {
    if !matches(TIME_PATTERN, time) {
        return Err(invalid("birthTime", "expected HH:MM"));
    }
    let (hour, minute) = time
        .split_once(':')
        .and_then(|(h, m)| Some((h.parse::<u32>().ok()?, m.parse::<u32>().ok()?)))
        .ok_or_else(|| invalid("birthTime", "expected HH:MM"))?;
    if hour > 23 {
        return Err(invalid("birthTime", "hour must be 00-23"));
    }
    if minute > 59 {
        return Err(invalid("birthTime", "minute must be 00-59"));
    }
    Ok(())
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

fn invalid(field: &str, message: &str) -> ClientError {
    ClientError::InvalidRequest {
        field: field.to_string(),
        message: message.to_string(),
    }
}
