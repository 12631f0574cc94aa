//! UTC calendar day stamps.

use crate::error::TokenError;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

const DAY_FORMAT: &str = "%Y%m%d";

/// A validated `YYYYMMDD` calendar date, the day component of a token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayStamp(String);

impl DayStamp {
    /// Today's UTC date.
    pub fn today() -> Self {
        Self::at(Utc::now())
    }

    /// The UTC date of an instant. No timezone offset is applied.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::from_date(instant.date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DAY_FORMAT).to_string())
    }

    /// Parse an 8-digit `YYYYMMDD` string naming a real calendar date.
    pub fn parse(value: &str) -> Result<Self, TokenError> {
        let well_formed = value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit());
        if !well_formed || NaiveDate::parse_from_str(value, DAY_FORMAT).is_err() {
            return Err(TokenError::InvalidDate(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
