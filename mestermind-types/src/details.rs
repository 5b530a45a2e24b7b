use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

/// When the customer is available for the professional to visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Availability {
    pub days: BTreeSet<Weekday>,
    /// `"HH:MM"`
    pub start_time: String,
    /// `"HH:MM"`
    pub end_time: String,
}

impl Availability {
    pub fn new<I>(days: I, start_time: impl Into<String>, end_time: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        Self {
            days: days.into_iter().collect(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    /// At least one day and a window that ends strictly after it starts
    pub fn is_valid(&self) -> bool {
        if self.days.is_empty() {
            return false;
        }
        match (
            minutes_since_midnight(&self.start_time),
            minutes_since_midnight(&self.end_time),
        ) {
            (Some(start), Some(end)) => end > start,
            _ => false,
        }
    }
}

/// Parses `"HH:MM"` into minutes since midnight
pub fn minutes_since_midnight(value: &str) -> Option<u32> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()?;
    Some(time.hour() * 60 + time.minute())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ContactDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub postal_code: String,
}

impl ContactDetails {
    /// The professional needs at least one way to reach the customer
    pub fn is_reachable(&self) -> bool {
        !self.email.trim().is_empty() || !self.phone.trim().is_empty()
    }
}

/// Non-question state collected by the trailing steps of the flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct RequestDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub contact: ContactDetails,
    #[serde(default)]
    pub message_to_pro: String,
}
