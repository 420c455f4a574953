//! Rule text normalization for display
//!
//! Blockface datasets carry one rule entry per sign and often one time range
//! per day, so the raw descriptions repeat themselves ("2hr parking 9am-6pm
//! Mon", "2hr parking 9am-6pm Tue", ...). This module merges entries that
//! share a cleaned description, a time range and a permit-zone exception into
//! compact strings such as `2hr parking 9am-6pm Mon-Fri except Zone A`.
//!
//! Output order is first-seen order. If anything goes wrong the raw
//! descriptions are returned unchanged so the UI always has something to show.

use crate::error::{EngineError, Result};
use crate::types::{ParkingRule, RuleType, TimeOfDay, TimeRange, DAY_ABBREVIATIONS};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical sentence for oversized vehicle and trailer restrictions.
pub const OVERSIZED_VEHICLE_TEXT: &str = "No oversized vehicles or trailers";

/// Trailing "except Zone X" permit exemption.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ZONE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\s,;(\-–]*\bexcept\s+(?:rpp\s+|permit\s+)?(?:zone|area)\s+([a-z0-9]+)\)?\s*\.?\s*$",
    )
    .expect("valid regex")
});

/// Holiday phrases, with the connector word that precedes them.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HOLIDAY_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\s,;]*(?:\b(including|incl\.?|inc\.?|and|except|excluding|exc\.?)\s+|[&+]\s*)?\bholidays?\b",
    )
    .expect("valid regex")
});

/// A day name or abbreviation ("Mon", "Tues", "Thursdays", "Sat.").
const DAY_NAME: &str = r"(?:sun(?:day)?|mon(?:day)?|tue(?:s|sday)?|wed(?:nesday)?|thu(?:rs?|rsday)?|fri(?:day)?|sat(?:urday)?)s?\b\.?";

/// Clock times and clock ranges, with or without am/pm.
const CLOCK_SCHEDULE: &str = concat!(
    r"\b\d{1,2}(?::\d{2})?\s*(?:am|pm)?\s*(?:-|–|to)\s*\d{1,2}(?::\d{2})?\s*(?:am|pm)\b",
    r"|\b\d{1,2}:\d{2}\s*(?:-|–|to)\s*\d{1,2}:\d{2}\b",
    r"|\b\d{1,2}(?::\d{2})?\s*(?:am|pm)\b",
);

/// One trailing day, day range, clock time or time range.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TRAILING_SCHEDULE: LazyLock<Regex> = LazyLock::new(|| {
    let days = format!(r"\b{DAY_NAME}(?:\s*(?:-|–|to|thru|through|&|and|,)\s*{DAY_NAME})*");
    Regex::new(&format!(
        r"(?i)[\s,;:\-–]*(?:\bdaily\b|{days}|{CLOCK_SCHEDULE})\s*$"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HOURS_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*-?\s*(?:hours?|hrs?)\b").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static MINUTES_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*-?\s*(?:minutes?|mins?)\b").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static OVERSIZED_VEHICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bover-?sized?\s+vehicles?\b|\btrailers?\b|\bvehicles?\s+(?:over|longer\s+than|more\s+than|exceeding)\s+\d+\s*(?:ft|feet|foot|')",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EXTRA_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// How a description mentions holidays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum HolidayMention {
    None,
    Excepting,
    Including,
}

impl HolidayMention {
    fn label(self) -> Option<&'static str> {
        match self {
            HolidayMention::None => None,
            HolidayMention::Excepting => Some("except Holidays"),
            HolidayMention::Including => Some("including Holidays"),
        }
    }
}

/// Description pieces extracted from one rule.
#[derive(Debug, Clone, PartialEq)]
struct CleanedDescription {
    text: String,
    zone_suffix: Option<String>,
    holidays: HolidayMention,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    text: String,
    time: String,
    zone_suffix: Option<String>,
}

#[derive(Debug)]
struct Group {
    key: GroupKey,
    days: Vec<u8>,
    holidays: HolidayMention,
}

/// Insertion-ordered groups with a key index.
#[derive(Debug, Default)]
struct Groups {
    entries: Vec<Group>,
    index: HashMap<GroupKey, usize>,
}

impl Groups {
    fn merge(&mut self, key: GroupKey, days: &[u8], holidays: HolidayMention) {
        let position = match self.index.get(&key) {
            Some(position) => *position,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(Group {
                    key,
                    days: Vec::new(),
                    holidays: HolidayMention::None,
                });
                self.entries.len() - 1
            }
        };

        let group = &mut self.entries[position];
        for day in days {
            if !group.days.contains(day) {
                group.days.push(*day);
            }
        }
        group.holidays = group.holidays.max(holidays);
    }
}

/// Merge a blockface's rules into compact display strings.
///
/// Never fails: on any internal error the raw descriptions are returned.
pub fn format_rules_for_display(rules: &[ParkingRule]) -> Vec<String> {
    match try_format_rules(rules) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to raw rule descriptions");
            rules.iter().map(|rule| rule.description.clone()).collect()
        }
    }
}

/// Merge a blockface's rules, reporting normalization failures.
pub fn try_format_rules(rules: &[ParkingRule]) -> Result<Vec<String>> {
    let mut groups = Groups::default();

    for rule in rules {
        let cleaned = clean_description(rule);

        if rule.time_ranges.is_empty() {
            groups.merge(
                GroupKey {
                    text: cleaned.text.clone(),
                    time: String::new(),
                    zone_suffix: cleaned.zone_suffix.clone(),
                },
                &[],
                cleaned.holidays,
            );
            continue;
        }

        for range in &rule.time_ranges {
            if let Some(day) = range.days_of_week.iter().find(|day| **day > 6) {
                return Err(EngineError::Normalization {
                    rule_id: rule.id.clone(),
                    reason: format!("day index {day} out of range"),
                });
            }
            groups.merge(
                GroupKey {
                    text: cleaned.text.clone(),
                    time: format_time_range(range),
                    zone_suffix: cleaned.zone_suffix.clone(),
                },
                &range.days_of_week,
                cleaned.holidays,
            );
        }
    }

    Ok(groups.entries.into_iter().map(render_group).collect())
}

fn render_group(mut group: Group) -> String {
    group.days.sort_unstable();

    let days = format_days(&group.days);
    let mut parts: Vec<&str> = vec![group.key.text.as_str()];
    if !group.key.time.is_empty() {
        parts.push(&group.key.time);
    }
    if !days.is_empty() {
        parts.push(&days);
    }
    if let Some(label) = group.holidays.label() {
        parts.push(label);
    }
    if let Some(suffix) = &group.key.zone_suffix {
        parts.push(suffix);
    }
    parts.retain(|part| !part.is_empty());
    parts.join(" ")
}

fn clean_description(rule: &ParkingRule) -> CleanedDescription {
    let mut text = rule.description.trim().to_string();

    let zone_suffix = ZONE_SUFFIX.captures(&text).and_then(|caps| {
        let whole = caps.get(0)?;
        let zone = caps.get(1)?.as_str().to_uppercase();
        Some((whole.start(), format!("except Zone {zone}")))
    });
    let zone_suffix = zone_suffix.map(|(start, suffix)| {
        text.truncate(start);
        suffix
    });

    let holidays = holiday_mention(&text);
    if holidays != HolidayMention::None {
        text = HOLIDAY_PHRASE.replace_all(&text, "").into_owned();
    }

    let text = if rule.rule_type == RuleType::Meter {
        match rule.meter_rate() {
            Some(rate) => format!("Metered ({}/hr)", format_rate(rate)),
            None => "Metered".to_string(),
        }
    } else if OVERSIZED_VEHICLE.is_match(&text) {
        OVERSIZED_VEHICLE_TEXT.to_string()
    } else {
        let stripped = strip_trailing_schedule(&text);
        let stripped = HOURS_UNIT.replace_all(&stripped, "${1}hr");
        let stripped = MINUTES_UNIT.replace_all(&stripped, "${1}min");
        let stripped = tidy(&stripped);
        if stripped.is_empty() {
            fallback_label(rule)
        } else {
            stripped
        }
    };

    CleanedDescription {
        text,
        zone_suffix,
        holidays,
    }
}

fn holiday_mention(text: &str) -> HolidayMention {
    let mut mention = HolidayMention::None;
    for caps in HOLIDAY_PHRASE.captures_iter(text) {
        let excepting = caps
            .get(1)
            .map(|connector| {
                let connector = connector.as_str().to_lowercase();
                connector.starts_with("exc")
            })
            .unwrap_or(false);
        let found = if excepting {
            HolidayMention::Excepting
        } else {
            HolidayMention::Including
        };
        mention = mention.max(found);
    }
    mention
}

/// Remove trailing day, time and "Daily" tokens until none remain.
fn strip_trailing_schedule(text: &str) -> String {
    let mut result = text.trim_end().to_string();
    while let Some(found) = TRAILING_SCHEDULE.find(&result) {
        if found.start() >= result.len() {
            break;
        }
        result.truncate(found.start());
        result = result.trim_end().to_string();
    }
    result
}

fn tidy(text: &str) -> String {
    EXTRA_WHITESPACE
        .replace_all(text, " ")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '–'))
        .to_string()
}

fn fallback_label(rule: &ParkingRule) -> String {
    match rule.rule_type {
        RuleType::TowAway => "Tow-away".to_string(),
        RuleType::StreetSweeping => "Street cleaning".to_string(),
        RuleType::NoParking => "No parking".to_string(),
        RuleType::Meter => "Metered".to_string(),
        RuleType::TimeLimit => match rule.time_limit() {
            Some(limit) if limit % 60 == 0 && limit > 0 => format!("{}hr limit", limit / 60),
            Some(limit) => format!("{limit}min limit"),
            None => "Time limit".to_string(),
        },
        RuleType::RppZone => match rule.permit_zone() {
            Some(zone) => format!("Zone {zone} permit parking"),
            None => "Permit parking".to_string(),
        },
    }
}

/// Format a clock time in 12-hour style: 09:00 → "9am", 13:30 → "1:30pm".
pub fn format_clock(time: TimeOfDay) -> String {
    let hour = time.hour() % 24;
    let suffix = if hour < 12 { "am" } else { "pm" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    if time.minute() == 0 {
        format!("{display_hour}{suffix}")
    } else {
        format!("{display_hour}:{:02}{suffix}", time.minute())
    }
}

/// Format a range as "9am-6pm". Full-day ranges render as an empty string.
pub fn format_time_range(range: &TimeRange) -> String {
    if range.is_full_day() {
        return String::new();
    }
    format!(
        "{}-{}",
        format_clock(range.start_time),
        format_clock(range.end_time)
    )
}

/// Format a meter rate: 2.0 → "$2", 2.5 → "$2.50".
pub fn format_rate(rate: f64) -> String {
    if rate.fract().abs() < f64::EPSILON {
        format!("${rate:.0}")
    } else {
        format!("${rate:.2}")
    }
}

/// Render a sorted, deduplicated day set (0 = Sunday).
///
/// Every day is "Daily"; six days missing only Sunday or Saturday render as
/// "except Sun"/"except Sat"; one consecutive run of three or more days is a
/// range ("Mon-Fri"); anything else is a comma-separated list.
pub fn format_days(days: &[u8]) -> String {
    let name = |day: u8| DAY_ABBREVIATIONS.get(usize::from(day)).copied().unwrap_or("?");

    match days.len() {
        0 => return String::new(),
        7 => return "Daily".to_string(),
        6 if !days.contains(&0) => return "except Sun".to_string(),
        6 if !days.contains(&6) => return "except Sat".to_string(),
        _ => {}
    }

    let mut runs: Vec<(u8, u8)> = Vec::new();
    for &day in days {
        if let Some((_, last)) = runs.last_mut() {
            if *last + 1 == day {
                *last = day;
                continue;
            }
        }
        runs.push((day, day));
    }

    if let [(first, last)] = runs.as_slice() {
        if last - first >= 2 {
            return format!("{}-{}", name(*first), name(*last));
        }
    }

    days.iter()
        .map(|day| name(*day))
        .collect::<Vec<_>>()
        .join(", ")
}
