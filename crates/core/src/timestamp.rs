//! Wall-clock stamps in the persisted document's textual formats.
//!
//! `last_updated` is written as `YYYY-MM-DD HH:MM:SS` and `created_date` as
//! `YYYY-MM-DD`, both in local time. Stamps are truncated to whole seconds on
//! construction so that formatting and parsing round-trip exactly.

use core::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Format of [`Timestamp`] in documents and output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of [`DateStamp`] in documents and output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A local date-time with second resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Current local time.
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    pub fn from_naive(value: NaiveDateTime) -> Self {
        Self(value.trunc_subsecs(0))
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Calendar date of this stamp.
    pub fn date(&self) -> DateStamp {
        DateStamp(self.0.date())
    }
}

impl ValueObject for Timestamp {}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .map(Self::from_naive)
            .map_err(|e| DomainError::validation(format!("timestamp {s:?}: {e}")))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A local calendar date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateStamp(NaiveDate);

impl DateStamp {
    pub fn today() -> Self {
        Timestamp::now().date()
    }

    pub fn from_naive(value: NaiveDate) -> Self {
        Self(value)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl ValueObject for DateStamp {}

impl core::fmt::Display for DateStamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DateStamp {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|e| DomainError::validation(format!("date {s:?}: {e}")))
    }
}

impl Serialize for DateStamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateStamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
