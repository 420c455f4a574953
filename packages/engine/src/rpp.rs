//! Residential permit zone visitor limits
//!
//! Permit-zone regulation text is free-form ("Residential Permit Zone W - 2
//! hour visitor parking", "2 hr non-permit holders", ...). The visitor
//! allowance is inferred by an ordered list of named patterns: the first
//! pattern that matches wins, whatever number it captures.
//!
//! Text mentioning visitors without a number falls back to
//! [`DEFAULT_VISITOR_LIMIT_MINUTES`]. Text without any visitor phrasing grants
//! no allowance. Extraction never fails.

use crate::classifier::duration_adjective;
use crate::config::DEFAULT_VISITOR_LIMIT_MINUTES;
use crate::types::RppEvaluation;
use regex::Regex;
use std::sync::LazyLock;

/// Keywords that imply some visitor allowance even without a number.
const VISITOR_KEYWORDS: [&str; 3] = ["visitor", "non-permit", "non-resident"];

/// A named extraction rule capturing an hour count.
#[derive(Debug)]
pub struct VisitorLimitPattern {
    pub name: &'static str,
    regex: Regex,
}

impl VisitorLimitPattern {
    #[allow(clippy::expect_used)] // Static patterns that are guaranteed to be valid
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("valid regex"),
        }
    }

    /// Hours captured by this pattern, if it matches.
    pub fn extract_hours(&self, text: &str) -> Option<u32> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|hours| hours.as_str().parse().ok())
    }
}

/// Extraction patterns in priority order.
static VISITOR_LIMIT_PATTERNS: LazyLock<Vec<VisitorLimitPattern>> = LazyLock::new(|| {
    vec![
        VisitorLimitPattern::new(
            "visitor-hours",
            r"(?i)\bvisitors?\s+(\d+)[\s-]*(?:hours?|hrs?)\b",
        ),
        VisitorLimitPattern::new(
            "hours-visitor",
            r"(?i)\b(\d+)[\s-]*(?:hours?|hrs?)\s+visitors?\b",
        ),
        VisitorLimitPattern::new(
            "hours-non-permit",
            r"(?i)\b(\d+)[\s-]*(?:hours?|hrs?)\s+non-?permit\b",
        ),
        VisitorLimitPattern::new(
            "non-permit-holder-hours",
            r"(?i)\bnon-?permit\s+holders?\s+(\d+)[\s-]*(?:hours?|hrs?)\b",
        ),
        VisitorLimitPattern::new(
            "hours-non-resident",
            r"(?i)\b(\d+)[\s-]*(?:hours?|hrs?)\s+non-?residents?\b",
        ),
    ]
});

/// The ordered extraction patterns.
pub fn visitor_limit_patterns() -> &'static [VisitorLimitPattern] {
    &VISITOR_LIMIT_PATTERNS
}

/// Where a visitor limit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitSource {
    /// A numbered pattern matched
    Pattern(&'static str),
    /// Visitor phrasing without a number
    KeywordDefault,
}

/// A visitor allowance inferred from regulation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitorLimit {
    pub minutes: u32,
    pub source: LimitSource,
}

/// Infer the visitor allowance stated in permit-zone text.
pub fn extract_visitor_limit(text: &str) -> Option<VisitorLimit> {
    for pattern in visitor_limit_patterns() {
        if let Some(hours) = pattern.extract_hours(text) {
            return Some(VisitorLimit {
                minutes: hours.saturating_mul(60),
                source: LimitSource::Pattern(pattern.name),
            });
        }
    }

    let lowered = text.to_lowercase();
    if VISITOR_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Some(VisitorLimit {
            minutes: DEFAULT_VISITOR_LIMIT_MINUTES,
            source: LimitSource::KeywordDefault,
        });
    }

    None
}

/// Check whether a non-permit holder may park for `duration_minutes` in a zone.
///
/// The limit is inclusive: staying exactly the visitor limit is allowed.
pub fn evaluate_rpp_zone(regulation_text: &str, zone_id: &str, duration_minutes: u32) -> RppEvaluation {
    let Some(limit) = extract_visitor_limit(regulation_text) else {
        tracing::debug!(zone = zone_id, "No visitor allowance in permit-zone text");
        return RppEvaluation {
            can_park: false,
            reason: format!(
                "A Zone {zone_id} residential permit is required; no visitor parking is allowed."
            ),
            visitor_limit_minutes: None,
        };
    };

    tracing::debug!(
        zone = zone_id,
        limit = limit.minutes,
        source = ?limit.source,
        "Visitor limit extracted"
    );

    let can_park = duration_minutes <= limit.minutes;
    let reason = if can_park {
        format!(
            "Zone {zone_id} allows visitors without a permit to park for up to {}.",
            describe_minutes(limit.minutes)
        )
    } else {
        format!(
            "Your {} stay exceeds the {} visitor limit for Zone {zone_id}; a Zone {zone_id} permit is required to stay longer.",
            duration_adjective(duration_minutes),
            duration_adjective(limit.minutes)
        )
    };

    RppEvaluation {
        can_park,
        reason,
        visitor_limit_minutes: Some(limit.minutes),
    }
}

fn describe_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (1, 0) => "1 hour".to_string(),
        (hours, 0) if hours > 0 => format!("{hours} hours"),
        _ if minutes == 1 => "1 minute".to_string(),
        _ => format!("{minutes} minutes"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE_W: &str = "Residential Permit Zone W - 2 hour visitor parking";

    #[test]
    fn test_zone_w_short_stay_allowed() {
        let eval = evaluate_rpp_zone(ZONE_W, "W", 60);
        assert!(eval.can_park);
        assert_eq!(eval.visitor_limit_minutes, Some(120));
        assert!(eval.reason.contains("Zone W"));
        assert!(eval.reason.contains("2 hours"));
    }

    #[test]
    fn test_zone_w_long_stay_rejected() {
        let eval = evaluate_rpp_zone(ZONE_W, "W", 180);
        assert!(!eval.can_park);
        assert_eq!(eval.visitor_limit_minutes, Some(120));
        assert!(eval.reason.contains("exceeds"));
        assert!(eval.reason.contains("2-hour"));
    }

    #[test]
    fn test_limit_is_inclusive() {
        assert!(evaluate_rpp_zone(ZONE_W, "W", 120).can_park);
        assert!(!evaluate_rpp_zone(ZONE_W, "W", 121).can_park);
    }

    #[test]
    fn test_permit_required_without_visitor_text() {
        let eval = evaluate_rpp_zone("Residential Permit Zone X - permit required", "X", 60);
        assert!(!eval.can_park);
        assert_eq!(eval.visitor_limit_minutes, None);
        assert!(eval.reason.contains("permit is required"));
    }

    #[test]
    fn test_each_pattern_fires() {
        let cases = [
            ("Visitors 3 hours max", "visitor-hours", 180),
            ("4 hr visitor parking", "hours-visitor", 240),
            ("1 hr non-permit parking", "hours-non-permit", 60),
            ("Non-permit holders 2 hours", "non-permit-holder-hours", 120),
            ("3 hrs non-resident", "hours-non-resident", 180),
        ];
        for (text, name, minutes) in cases {
            let limit = extract_visitor_limit(text).unwrap();
            assert_eq!(limit.source, LimitSource::Pattern(name), "{text}");
            assert_eq!(limit.minutes, minutes, "{text}");
        }
    }

    #[test]
    fn test_first_pattern_wins() {
        // both "visitors 1 hour" and "4 hr non-permit" are present
        let limit = extract_visitor_limit("Visitors 1 hour; 4 hr non-permit on Sundays").unwrap();
        assert_eq!(limit.source, LimitSource::Pattern("visitor-hours"));
        assert_eq!(limit.minutes, 60);
    }

    #[test]
    fn test_keyword_default() {
        let limit = extract_visitor_limit("Zone Q. VISITOR parking allowed").unwrap();
        assert_eq!(limit.source, LimitSource::KeywordDefault);
        assert_eq!(limit.minutes, DEFAULT_VISITOR_LIMIT_MINUTES);

        let limit = extract_visitor_limit("Non-resident vehicles limited").unwrap();
        assert_eq!(limit.minutes, DEFAULT_VISITOR_LIMIT_MINUTES);
    }

    #[test]
    fn test_never_panics_on_odd_input() {
        for text in ["", "   ", "visitor 99999999999999999999 hours", "☃ zone ☃"] {
            let _ = evaluate_rpp_zone(text, "Z", 60);
        }
        // overflowing numbers fall through to the keyword default
        let limit = extract_visitor_limit("visitor 99999999999999999999 hours").unwrap();
        assert_eq!(limit.source, LimitSource::KeywordDefault);
    }

    #[test]
    fn test_describe_minutes() {
        assert_eq!(describe_minutes(60), "1 hour");
        assert_eq!(describe_minutes(180), "3 hours");
        assert_eq!(describe_minutes(45), "45 minutes");
        assert_eq!(describe_minutes(1), "1 minute");
    }
}
