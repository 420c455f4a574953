//! Blockface dataset ingestion
//!
//! Turns loosely-typed records (curated YAML datasets, JSON from the backend
//! store) into the well-formed model the evaluator assumes. Nothing in a
//! single record is fatal; every gap is filled with the most restrictive
//! plausible reading:
//!
//! - unknown or missing rule type → `no-parking`
//! - unparseable or missing day tokens → the range applies every day
//! - missing or invalid start/end time → that range is skipped
//! - overnight ranges (`22:00`-`06:00`) → split at midnight
//! - equal start and end (`00:00`-`00:00`) → the whole day
//! - time-limit rules without a limit → limit inferred from the description
//!
//! Over-restricting only costs a parking opportunity; under-restricting risks
//! a citation.
//!
//! # Security Considerations
//!
//! Document size and array lengths are bounded (see [`crate::config`]).

use crate::config;
use crate::error::{EngineError, Result};
use crate::types::{
    Blockface, Geometry, ParkingRule, RuleMetadata, RuleType, TimeOfDay, TimeRange,
};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const ALL_DAYS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LIMIT_HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*-?\s*(?:hours?|hrs?|h)\b").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LIMIT_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*-?\s*(?:minutes?|mins?)\b").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PERMIT_ZONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bzone\s+([a-z0-9]{1,3})\b").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOLLAR_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\s*(\d+(?:\.\d+)?)").expect("valid regex"));

/// A day given either as an index (0 = Sunday) or as text ("Mon", "M-F", "Daily").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DayToken {
    Index(i64),
    Name(String),
}

/// Days given as a list of tokens or as one token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDays {
    List(Vec<DayToken>),
    Single(DayToken),
}

/// A number that may arrive as text (`"$2.50"`, `"120"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(*n),
            LooseNumber::Text(text) => DOLLAR_AMOUNT
                .captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTimeRange {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default, alias = "days")]
    pub days_of_week: Option<RawDays>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    #[serde(default)]
    pub time_limit: Option<LooseNumber>,
    #[serde(default)]
    pub meter_rate: Option<LooseNumber>,
    #[serde(default)]
    pub permit_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub time_ranges: Vec<RawTimeRange>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<RawMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlockface {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub street_name: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub rules: Vec<RawRule>,
}

/// Top-level dataset shape: a bare list or `{ blockfaces: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    List(Vec<RawBlockface>),
    Wrapped { blockfaces: Vec<RawBlockface> },
}

impl RawDocument {
    fn into_blockfaces(self) -> Vec<RawBlockface> {
        match self {
            RawDocument::List(list) => list,
            RawDocument::Wrapped { blockfaces } => blockfaces,
        }
    }
}

impl RawBlockface {
    /// Normalize into a [`Blockface`]. `index` names records without an id.
    pub fn into_blockface(self, index: usize) -> Blockface {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("blockface-{index}"));

        let rules = self
            .rules
            .into_iter()
            .enumerate()
            .map(|(position, raw)| raw.into_rule(&id, position))
            .collect();

        Blockface {
            geometry: self.geometry.unwrap_or_default(),
            street_name: self.street_name.unwrap_or_default(),
            side: self.side.unwrap_or_default(),
            rules,
            id,
        }
    }
}

impl RawRule {
    /// Normalize into a [`ParkingRule`], defaulting conservatively.
    pub fn into_rule(self, blockface_id: &str, position: usize) -> ParkingRule {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("{blockface_id}-rule-{position}"));
        let description = self.description.unwrap_or_default();

        let rule_type = match self.rule_type.as_deref().and_then(parse_rule_type) {
            Some(rule_type) => rule_type,
            None => {
                tracing::warn!(
                    rule = %id,
                    raw_type = ?self.rule_type,
                    "Unknown rule type, treating as no-parking"
                );
                RuleType::NoParking
            }
        };

        let time_ranges = self
            .time_ranges
            .iter()
            .flat_map(|raw| normalize_time_range(&id, raw))
            .collect();

        let metadata = build_metadata(rule_type, self.metadata.unwrap_or_default(), &description);

        ParkingRule {
            id,
            rule_type,
            time_ranges,
            description,
            metadata,
        }
    }
}

fn build_metadata(rule_type: RuleType, raw: RawMetadata, description: &str) -> Option<RuleMetadata> {
    let mut metadata = RuleMetadata {
        time_limit: raw
            .time_limit
            .and_then(|n| n.as_f64())
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.round() as u32),
        meter_rate: raw.meter_rate.and_then(|n| n.as_f64()).filter(|n| n.is_finite()),
        permit_zone: raw.permit_zone.filter(|zone| !zone.trim().is_empty()),
    };

    if rule_type == RuleType::TimeLimit && metadata.time_limit.is_none() {
        metadata.time_limit = infer_time_limit(description);
        if let Some(limit) = metadata.time_limit {
            tracing::debug!(limit, "Inferred time limit from description");
        }
    }
    if rule_type == RuleType::RppZone && metadata.permit_zone.is_none() {
        metadata.permit_zone = PERMIT_ZONE
            .captures(description)
            .and_then(|caps| caps.get(1))
            .map(|zone| zone.as_str().to_uppercase());
    }

    if metadata == RuleMetadata::default() {
        None
    } else {
        Some(metadata)
    }
}

/// Infer a posted limit in minutes from text such as "2hr parking" or "90 min".
pub fn infer_time_limit(description: &str) -> Option<u32> {
    let capture = |regex: &Regex| -> Option<u32> {
        regex
            .captures(description)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    };

    capture(&LIMIT_HOURS)
        .map(|hours| hours.saturating_mul(60))
        .or_else(|| capture(&LIMIT_MINUTES))
}

/// Parse a loosely spelled rule type ("Tow Away", "street_cleaning", "RPP").
pub fn parse_rule_type(raw: &str) -> Option<RuleType> {
    let normalized: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c.is_whitespace() { '-' } else { c })
        .collect();

    match normalized.as_str() {
        "tow-away" | "towaway" | "tow" | "tow-away-zone" => Some(RuleType::TowAway),
        "street-sweeping" | "street-cleaning" | "sweeping" | "street-sweep" => {
            Some(RuleType::StreetSweeping)
        }
        "no-parking" | "no-stopping" | "noparking" => Some(RuleType::NoParking),
        "meter" | "metered" | "parking-meter" => Some(RuleType::Meter),
        "time-limit" | "time-limited" | "timelimit" => Some(RuleType::TimeLimit),
        "rpp-zone" | "rpp" | "residential-permit" | "permit-zone" => Some(RuleType::RppZone),
        _ => None,
    }
}

fn day_from_name(name: &str) -> Option<u8> {
    let name = name.trim().trim_end_matches('.').to_lowercase();
    let day = match name.as_str() {
        "su" | "sun" | "sunday" | "sundays" => 0,
        "m" | "mo" | "mon" | "monday" | "mondays" => 1,
        "tu" | "tue" | "tues" | "tuesday" | "tuesdays" => 2,
        "w" | "we" | "wed" | "wednesday" | "wednesdays" => 3,
        "th" | "thu" | "thur" | "thurs" | "thursday" | "thursdays" => 4,
        "f" | "fr" | "fri" | "friday" | "fridays" => 5,
        "sa" | "sat" | "saturday" | "saturdays" => 6,
        _ => return None,
    };
    Some(day)
}

/// Parse one textual day token into day indices.
///
/// Understands single days, ranges (`Mon-Fri`, `M-F`, `Fri thru Mon` wraps
/// around the week), lists (`Mon, Wed`) and the keywords `Daily`,
/// `weekdays` and `weekends`. Returns `None` when any part is unrecognized.
pub fn parse_day_token(token: &str) -> Option<Vec<u8>> {
    let lowered = token.trim().to_lowercase();
    match lowered.as_str() {
        "daily" | "everyday" | "every day" | "all" | "all days" => return Some(ALL_DAYS.to_vec()),
        "weekdays" | "weekday" => return Some(vec![1, 2, 3, 4, 5]),
        "weekends" | "weekend" => return Some(vec![0, 6]),
        _ => {}
    }

    let mut days = Vec::new();
    for part in lowered.split([',', '/', '&', ';']) {
        let part = part.trim().replace(" through ", "-").replace(" thru ", "-").replace(" to ", "-");
        if part.is_empty() {
            continue;
        }
        let expanded = match part.split_once(['-', '–']) {
            Some((from, to)) => {
                let from = day_from_name(from)?;
                let to = day_from_name(to)?;
                let mut run = vec![from];
                let mut day = from;
                while day != to {
                    day = (day + 1) % 7;
                    run.push(day);
                }
                run
            }
            None => vec![day_from_name(&part)?],
        };
        for day in expanded {
            if !days.contains(&day) {
                days.push(day);
            }
        }
    }

    if days.is_empty() {
        None
    } else {
        days.sort_unstable();
        Some(days)
    }
}

fn parse_days(raw: Option<&RawDays>) -> Option<Vec<u8>> {
    let tokens: Vec<&DayToken> = match raw? {
        RawDays::List(list) => list.iter().collect(),
        RawDays::Single(token) => vec![token],
    };

    let mut days = Vec::new();
    for token in tokens {
        let parsed = match token {
            DayToken::Index(index) => u8::try_from(*index)
                .ok()
                .filter(|day| *day <= 6)
                .map(|day| vec![day]),
            DayToken::Name(name) => parse_day_token(name),
        }?;
        for day in parsed {
            if !days.contains(&day) {
                days.push(day);
            }
        }
    }

    if days.is_empty() {
        None
    } else {
        days.sort_unstable();
        Some(days)
    }
}

/// Normalize one raw range into zero, one or two well-formed ranges.
fn normalize_time_range(rule_id: &str, raw: &RawTimeRange) -> Vec<TimeRange> {
    let (Some(start), Some(end)) = (raw.start_time.as_deref(), raw.end_time.as_deref()) else {
        tracing::warn!(rule = rule_id, "Skipping time range without start or end");
        return Vec::new();
    };
    let (start_time, end_time) = match (start.parse::<TimeOfDay>(), end.parse::<TimeOfDay>()) {
        (Ok(start_time), Ok(end_time)) => (start_time, end_time),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(rule = rule_id, error = %e, "Skipping time range with invalid time");
            return Vec::new();
        }
    };

    let days_of_week = parse_days(raw.days_of_week.as_ref()).unwrap_or_else(|| {
        tracing::warn!(
            rule = rule_id,
            days = ?raw.days_of_week,
            "Missing or unparseable days, applying every day"
        );
        ALL_DAYS.to_vec()
    });

    if start_time < end_time {
        return vec![TimeRange {
            start_time,
            end_time,
            days_of_week,
        }];
    }

    if start_time == end_time {
        tracing::warn!(
            rule = rule_id,
            start = %start_time,
            "Equal start and end, treating range as the whole day"
        );
        return vec![TimeRange {
            start_time: TimeOfDay::MIDNIGHT,
            end_time: TimeOfDay::END_OF_DAY,
            days_of_week,
        }];
    }

    tracing::debug!(rule = rule_id, "Splitting overnight time range at midnight");
    let next_days = days_of_week.iter().map(|day| (day + 1) % 7).collect();
    vec![
        TimeRange {
            start_time,
            end_time: TimeOfDay::END_OF_DAY,
            days_of_week,
        },
        TimeRange {
            start_time: TimeOfDay::MIDNIGHT,
            end_time,
            days_of_week: next_days,
        },
    ]
}

fn check_limits(raw: &[RawBlockface]) -> Result<()> {
    if raw.len() > config::MAX_BLOCKFACES {
        return Err(EngineError::LoadError(format!(
            "Too many blockfaces ({}, max {})",
            raw.len(),
            config::MAX_BLOCKFACES
        )));
    }
    if let Some(crowded) = raw
        .iter()
        .find(|blockface| blockface.rules.len() > config::MAX_RULES_PER_BLOCKFACE)
    {
        return Err(EngineError::LoadError(format!(
            "Blockface {} has too many rules ({}, max {})",
            crowded.id.as_deref().unwrap_or("<unnamed>"),
            crowded.rules.len(),
            config::MAX_RULES_PER_BLOCKFACE
        )));
    }
    Ok(())
}

fn check_size(content: &str) -> Result<()> {
    if content.len() > config::MAX_DOCUMENT_SIZE {
        tracing::warn!(
            size = content.len(),
            max = config::MAX_DOCUMENT_SIZE,
            "Dataset exceeds size limit"
        );
        return Err(EngineError::LoadError(format!(
            "Dataset exceeds maximum size limit ({} bytes)",
            config::MAX_DOCUMENT_SIZE
        )));
    }
    Ok(())
}

fn normalize_document(document: RawDocument) -> Result<Vec<Blockface>> {
    let raw = document.into_blockfaces();
    check_limits(&raw)?;
    let blockfaces: Vec<Blockface> = raw
        .into_iter()
        .enumerate()
        .map(|(index, raw)| raw.into_blockface(index))
        .collect();
    tracing::debug!(blockfaces = blockfaces.len(), "Parsed dataset");
    Ok(blockfaces)
}

/// Parse a JSON dataset (a list of blockfaces or `{"blockfaces": [...]}`).
pub fn parse_blockfaces_json(content: &str) -> Result<Vec<Blockface>> {
    check_size(content)?;
    let document: RawDocument = serde_json::from_str(content)?;
    normalize_document(document)
}

/// Parse a YAML dataset (a list of blockfaces or `blockfaces: [...]`).
pub fn parse_blockfaces_yaml(content: &str) -> Result<Vec<Blockface>> {
    check_size(content)?;
    let document: RawDocument = serde_yaml_ng::from_str(content)?;
    normalize_document(document)
}

/// Load a dataset file. `.json` files are parsed as JSON, everything else as YAML.
pub fn load_blockfaces<P: AsRef<Path>>(path: P) -> Result<Vec<Blockface>> {
    let path_ref = path.as_ref();
    tracing::debug!(path = %path_ref.display(), "Loading blockface dataset");

    let metadata = fs::metadata(path_ref)
        .map_err(|_| EngineError::LoadError("Failed to access dataset file".to_string()))?;
    if metadata.len() > config::MAX_DOCUMENT_SIZE as u64 {
        return Err(EngineError::LoadError(format!(
            "File exceeds maximum size limit ({} bytes)",
            config::MAX_DOCUMENT_SIZE
        )));
    }

    let content = fs::read_to_string(path_ref)?;
    let is_json = path_ref
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_blockfaces_json(&content)
    } else {
        parse_blockfaces_yaml(&content)
    }
}
