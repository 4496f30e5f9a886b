// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Identifies a facility ("complex") in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacilityId(String);

impl FacilityId {
    /// Creates a new `FacilityId`.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty.
    pub fn new(id: &str) -> Result<Self, DomainError> {
        let trimmed: &str = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidFacilityId(String::from(
                "Facility id cannot be empty",
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FacilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A category of interchangeable fields (e.g. "5v5").
///
/// Field type names are case-sensitive and must match the facility catalog keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldType(String);

impl FieldType {
    /// Creates a new `FieldType`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty.
    pub fn new(name: &str) -> Result<Self, DomainError> {
        let trimmed: &str = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidFieldType(String::from(
                "Field type cannot be empty",
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the field type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the label of the k-th interchangeable instance of this field type.
    #[must_use]
    pub fn instance_label(&self, instance_number: u32) -> String {
        format!("{} — Instance {instance_number}", self.0)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A non-negative amount of money in minor units (cents).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates an amount from minor units.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative.
    pub fn from_cents(cents: i64) -> Result<Self, DomainError> {
        if cents < 0 {
            return Err(DomainError::InvalidAmount(format!(
                "Amount cannot be negative, got {cents} cents"
            )));
        }
        Ok(Self { cents })
    }

    /// Parses a decimal string such as `"25"`, `"25.5"` or `"25.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a non-negative decimal with at
    /// most two fractional digits.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidAmount(format!("'{value}' is not a valid amount"));

        let trimmed: &str = value.trim();
        let (whole, fraction): (&str, &str) = trimmed.split_once('.').unwrap_or((trimmed, ""));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if trimmed.ends_with('.') {
            return Err(invalid());
        }

        let whole_value: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse::<i64>().map_err(|_| invalid())?,
        };

        let cents: i64 = whole_value
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_value))
            .ok_or_else(invalid)?;
        Self::from_cents(cents)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.cents
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

/// A one-hour booking unit identified by its date and start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timeslot {
    date: Date,
    start: Time,
}

impl Timeslot {
    /// The fixed length of every slot.
    pub const DURATION: Duration = Duration::HOUR;

    /// Creates a slot starting at `start` on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is not on the hour.
    pub fn new(date: Date, start: Time) -> Result<Self, DomainError> {
        if start.minute() != 0 || start.second() != 0 || start.nanosecond() != 0 {
            return Err(DomainError::SlotNotOnTheHour(start));
        }
        Ok(Self { date, start })
    }

    /// Parses a slot from `YYYY-MM-DD` and `HH:MM` strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either string fails to parse or the time is not
    /// on the hour.
    pub fn parse(date: &str, start: &str) -> Result<Self, DomainError> {
        Self::new(parse_date(date)?, parse_time(start)?)
    }

    /// Returns the slot date.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// Returns the slot start time.
    #[must_use]
    pub const fn start(&self) -> Time {
        self.start
    }

    /// Returns the date formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn date_string(&self) -> String {
        format_date(self.date)
    }

    /// Returns the start time formatted as `HH:MM`.
    #[must_use]
    pub fn start_string(&self) -> String {
        format_time(self.start)
    }
}

impl std::fmt::Display for Timeslot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date_string(), self.start_string())
    }
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Parses an `HH:MM` time.
///
/// # Errors
///
/// Returns `DomainError::TimeParseError` if the string is not a valid time.
pub fn parse_time(value: &str) -> Result<Time, DomainError> {
    Time::parse(value.trim(), format_description!("[hour]:[minute]")).map_err(|e| {
        DomainError::TimeParseError {
            time_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Formats a time as `HH:MM`.
#[must_use]
pub fn format_time(value: Time) -> String {
    format!("{:02}:{:02}", value.hour(), value.minute())
}

/// Formats a timestamp as UTC `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Sub-second precision is dropped, so formatted values order lexicographically.
#[must_use]
pub fn format_timestamp(value: OffsetDateTime) -> String {
    let utc: OffsetDateTime = value.to_offset(UtcOffset::UTC);
    format!(
        "{}T{:02}:{:02}:{:02}Z",
        format_date(utc.date()),
        utc.hour(),
        utc.minute(),
        utc.second()
    )
}

/// Parses a timestamp written by [`format_timestamp`].
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not in that format.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    PrimitiveDateTime::parse(
        value.trim(),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}

/// The exact (facility, field type, timeslot) tuple capacity is counted against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    /// The facility.
    pub facility_id: FacilityId,
    /// The field type within the facility.
    pub field_type: FieldType,
    /// The one-hour slot.
    pub timeslot: Timeslot,
}

impl SlotKey {
    /// Creates a new `SlotKey`.
    #[must_use]
    pub const fn new(facility_id: FacilityId, field_type: FieldType, timeslot: Timeslot) -> Self {
        Self {
            facility_id,
            field_type,
            timeslot,
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.facility_id, self.field_type, self.timeslot
        )
    }
}

/// Customer identity held by value on each reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Contact email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Optional phone number.
    pub phone: Option<String>,
}

impl Customer {
    /// Creates a new `Customer`.
    #[must_use]
    pub const fn new(email: String, name: String, phone: Option<String>) -> Self {
        Self { email, name, phone }
    }
}
