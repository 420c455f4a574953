//! Legality classification
//!
//! Maps the resolved controlling rule to a [`LegalityStatus`] and a
//! plain-language explanation. The mapping is a closed match over
//! [`RuleType`]; there are no other states.

use crate::config::{NO_DATA_WARNING, RPP_VISITOR_WARNING, SIGN_VERIFICATION_WARNING};
use crate::display::format_rate;
use crate::precedence::{Resolution, TimeLimitOverride};
use crate::types::{LegalityResult, LegalityStatus, ParkingRule, RuleType};

/// Result for a blockface without any recorded rules. Never legal.
pub fn insufficient_data() -> LegalityResult {
    LegalityResult {
        status: LegalityStatus::InsufficientData,
        explanation: "Insufficient data: no parking regulations are recorded for this blockface."
            .to_string(),
        applicable_rules: Vec::new(),
        warnings: vec![
            NO_DATA_WARNING.to_string(),
            SIGN_VERIFICATION_WARNING.to_string(),
        ],
    }
}

/// Classify a resolution for a stay of `duration_minutes`.
pub fn classify(resolution: &Resolution<'_>, duration_minutes: u32) -> LegalityResult {
    let mut warnings = Vec::new();

    let (status, explanation) = match resolution.primary() {
        None => (
            LegalityStatus::Legal,
            "No restrictions apply during this time.".to_string(),
        ),
        Some(primary) => match primary.rule_type {
            RuleType::TowAway => (
                LegalityStatus::Illegal,
                format!(
                    "Tow-away zone: {}. Vehicles parked here during this time will be towed.",
                    description_or(primary, "tow-away restriction in effect")
                ),
            ),
            RuleType::StreetSweeping => (
                LegalityStatus::Illegal,
                format!(
                    "Street sweeping is scheduled during your stay: {}. Parking is not allowed while the street is swept.",
                    description_or(primary, "street cleaning")
                ),
            ),
            RuleType::NoParking => (
                LegalityStatus::Illegal,
                format!("No parking: {}.", description_or(primary, "parking prohibited")),
            ),
            RuleType::Meter => classify_meter(primary, resolution.time_limit_override.as_ref()),
            RuleType::TimeLimit => classify_time_limit(primary, duration_minutes),
            RuleType::RppZone => {
                warnings.push(RPP_VISITOR_WARNING.to_string());
                (LegalityStatus::Illegal, rpp_explanation(primary))
            }
        },
    };

    warnings.push(SIGN_VERIFICATION_WARNING.to_string());

    LegalityResult {
        status,
        explanation,
        applicable_rules: resolution.ordered.iter().map(|rule| (*rule).clone()).collect(),
        warnings,
    }
}

fn classify_meter(
    meter: &ParkingRule,
    overrun: Option<&TimeLimitOverride<'_>>,
) -> (LegalityStatus, String) {
    let mut summary = String::from("Metered parking");
    if let Some(rate) = meter.meter_rate() {
        summary.push_str(&format!(" ({}/hr)", format_rate(rate)));
    }

    match overrun {
        Some(overrun) => (
            LegalityStatus::Illegal,
            format!(
                "{summary}, but your {} stay exceeds the {} limit. Paying the meter does not extend a posted time limit.",
                duration_adjective(overrun.requested_minutes),
                duration_adjective(overrun.limit_minutes),
            ),
        ),
        None => {
            if let Some(limit) = meter.time_limit() {
                summary.push_str(&format!(", {} limit", duration_adjective(limit)));
            }
            summary.push_str(". Pay the meter for the length of your stay.");
            (LegalityStatus::Legal, summary)
        }
    }
}

fn classify_time_limit(rule: &ParkingRule, duration_minutes: u32) -> (LegalityStatus, String) {
    let stay = duration_adjective(duration_minutes);
    match rule.time_limit() {
        Some(limit) if duration_minutes <= limit => (
            LegalityStatus::Legal,
            format!(
                "Your {stay} stay is within the {} limit.",
                duration_adjective(limit)
            ),
        ),
        Some(limit) => (
            LegalityStatus::Illegal,
            format!(
                "Your {stay} stay exceeds the {} limit ({}).",
                duration_adjective(limit),
                description_or(rule, "posted time limit")
            ),
        ),
        None => {
            tracing::warn!(rule = %rule.id, "Time-limit rule without a recorded limit");
            (
                LegalityStatus::Illegal,
                format!(
                    "A time limit applies ({}) but its length is not recorded, so a {stay} stay cannot be confirmed as allowed.",
                    description_or(rule, "posted time limit")
                ),
            )
        }
    }
}

fn rpp_explanation(rule: &ParkingRule) -> String {
    match rule.permit_zone() {
        Some(zone) => format!(
            "Residential permit parking (Zone {zone}). Parking without a Zone {zone} permit is not allowed."
        ),
        None => "Residential permit parking. Parking without a permit for this zone is not allowed."
            .to_string(),
    }
}

fn description_or<'a>(rule: &'a ParkingRule, fallback: &'a str) -> &'a str {
    let trimmed = rule.description.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

/// Render a duration as an adjective: 120 → "2-hour", 90 → "90-minute".
pub fn duration_adjective(minutes: u32) -> String {
    if minutes > 0 && minutes % 60 == 0 {
        format!("{}-hour", minutes / 60)
    } else {
        format!("{minutes}-minute")
    }
}
