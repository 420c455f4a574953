//! Core types for the Parkwise engine
//!
//! Everything here is an immutable value object built by the data layer
//! (see [`crate::ingest`]) and borrowed by the evaluator. The wire format is
//! camelCase JSON because the consumer is a browser UI.

use crate::error::{EngineError, Result};
use crate::window::SECONDS_PER_DAY;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Abbreviated day names indexed by day-of-week (0 = Sunday).
pub const DAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// 23:59 in minutes since midnight.
const LAST_MINUTE: u16 = 23 * 60 + 59;

/// Wall-clock time within a single calendar day, stored as minutes since midnight.
///
/// Parsed from and serialized to zero-padded 24-hour `HH:mm`. `24:00` is
/// accepted as the end of the day so a range can cover the last minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// 00:00
    pub const MIDNIGHT: Self = Self(0);
    /// 24:00
    pub const END_OF_DAY: Self = Self(24 * 60);

    /// Build a time from hour and minute components.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self> {
        if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(EngineError::InvalidTimeOfDay(format!(
                "{:02}:{:02}",
                hour, minute
            )));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Minutes since midnight (0..=1440).
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Seconds since midnight (0..=86400).
    pub fn seconds(self) -> u32 {
        u32::from(self.0) * 60
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl FromStr for TimeOfDay {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidTimeOfDay(s.to_string());
        let (hours, minutes) = s.trim().split_once(':').ok_or_else(invalid)?;

        if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        if !hours.chars().chain(minutes.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u16 = hours.parse().map_err(|_| invalid())?;
        let minute: u16 = minutes.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// A recurring weekly schedule slice during which a rule is in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// Days the range applies on (0 = Sunday ... 6 = Saturday)
    pub days_of_week: Vec<u8>,
}

impl TimeRange {
    /// Create a time range from `HH:mm` strings.
    ///
    /// # Example
    ///
    /// ```
    /// use parkwise_engine::TimeRange;
    ///
    /// let weekdays = TimeRange::new("09:00", "18:00", &[1, 2, 3, 4, 5]).unwrap();
    /// assert_eq!(weekdays.start_time.to_string(), "09:00");
    /// ```
    pub fn new(start: &str, end: &str, days: &[u8]) -> Result<Self> {
        Ok(Self {
            start_time: start.parse()?,
            end_time: end.parse()?,
            days_of_week: days.to_vec(),
        })
    }

    /// Whether the range applies on the given day-of-week.
    pub fn applies_on(&self, day_of_week: u8) -> bool {
        self.days_of_week.contains(&day_of_week)
    }

    /// End of the range in seconds since midnight.
    ///
    /// Posted schedules write "until end of day" as 23:59, so an end of 23:59
    /// closes the day and the final minute is covered.
    pub fn end_seconds(&self) -> u32 {
        if self.end_time.minutes() >= LAST_MINUTE {
            SECONDS_PER_DAY
        } else {
            self.end_time.seconds()
        }
    }

    /// True when the range covers the whole day (00:00 through 23:59 or 24:00).
    pub fn is_full_day(&self) -> bool {
        self.start_time == TimeOfDay::MIDNIGHT && self.end_seconds() == SECONDS_PER_DAY
    }
}

/// Kind of parking regulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleType {
    TowAway,
    StreetSweeping,
    NoParking,
    Meter,
    TimeLimit,
    RppZone,
}

impl RuleType {
    /// All rule types, highest default precedence first.
    pub const ALL: [RuleType; 6] = [
        RuleType::TowAway,
        RuleType::StreetSweeping,
        RuleType::NoParking,
        RuleType::Meter,
        RuleType::TimeLimit,
        RuleType::RppZone,
    ];

    /// Wire name (e.g. `"tow-away"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::TowAway => "tow-away",
            RuleType::StreetSweeping => "street-sweeping",
            RuleType::NoParking => "no-parking",
            RuleType::Meter => "meter",
            RuleType::TimeLimit => "time-limit",
            RuleType::RppZone => "rpp-zone",
        }
    }

    /// Check if this rule type forbids parking outright while active
    pub fn is_prohibition(&self) -> bool {
        matches!(
            self,
            RuleType::TowAway | RuleType::StreetSweeping | RuleType::NoParking
        )
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured details some rule types carry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetadata {
    /// Posted time limit in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    /// Meter rate in dollars per hour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_rate: Option<f64>,
    /// Residential permit zone letter/code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_zone: Option<String>,
}

/// One posted regulation attached to a blockface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingRule {
    pub id: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RuleMetadata>,
}

impl ParkingRule {
    /// Create a rule without schedule or metadata.
    pub fn new(id: impl Into<String>, rule_type: RuleType, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rule_type,
            time_ranges: Vec::new(),
            description: description.into(),
            metadata: None,
        }
    }

    /// Append a time range.
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_ranges.push(range);
        self
    }

    /// Set the metadata block.
    pub fn with_metadata(mut self, metadata: RuleMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Fixed precedence for this rule's type under the default scheme.
    ///
    /// Precedence is a pure function of the type and is never stored on the rule.
    pub fn precedence(&self) -> u32 {
        crate::precedence::PrecedenceTable::default().precedence(self.rule_type)
    }

    pub fn time_limit(&self) -> Option<u32> {
        self.metadata.as_ref().and_then(|m| m.time_limit)
    }

    pub fn meter_rate(&self) -> Option<f64> {
        self.metadata.as_ref().and_then(|m| m.meter_rate)
    }

    pub fn permit_zone(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.permit_zone.as_deref())
    }
}

/// GeoJSON-style line geometry. Carried through untouched; never validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            kind: "LineString".to_string(),
            coordinates: Vec::new(),
        }
    }
}

/// One side of one street segment, the unit rules attach to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blockface {
    pub id: String,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub street_name: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub rules: Vec<ParkingRule>,
}

impl Blockface {
    pub fn new(id: impl Into<String>, street_name: impl Into<String>, side: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            geometry: Geometry::default(),
            street_name: street_name.into(),
            side: side.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: ParkingRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Outcome category of a legality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegalityStatus {
    Legal,
    Illegal,
    InsufficientData,
}

impl LegalityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegalityStatus::Legal => "legal",
            LegalityStatus::Illegal => "illegal",
            LegalityStatus::InsufficientData => "insufficient-data",
        }
    }
}

impl fmt::Display for LegalityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one blockface against one query window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalityResult {
    pub status: LegalityStatus,
    pub explanation: String,
    /// Rules active during the window, highest precedence first
    pub applicable_rules: Vec<ParkingRule>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Result of a residential permit zone visitor check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RppEvaluation {
    pub can_park: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_limit_minutes: Option<u32>,
}
