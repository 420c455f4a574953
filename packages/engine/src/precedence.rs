//! Precedence resolution
//!
//! Picks the controlling rule among all rules active during a query window.
//! The type → precedence mapping is a value ([`PrecedenceTable`]) handed to
//! the resolver, so alternate schemes can be evaluated side by side.
//!
//! Exactly one cross-rule composition exists: when a meter controls the
//! window but a co-applicable time limit is shorter than the requested stay,
//! the stay is illegal. Paying the meter does not excuse overstaying a posted
//! limit. Every other combination is settled by the highest precedence alone.

use crate::types::{ParkingRule, RuleType};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Precedence per rule type. Higher wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecedenceTable {
    pub tow_away: u32,
    pub street_sweeping: u32,
    pub no_parking: u32,
    pub meter: u32,
    pub time_limit: u32,
    pub rpp_zone: u32,
}

impl Default for PrecedenceTable {
    fn default() -> Self {
        Self {
            tow_away: 100,
            street_sweeping: 90,
            no_parking: 80,
            meter: 70,
            time_limit: 60,
            rpp_zone: 50,
        }
    }
}

impl PrecedenceTable {
    /// Precedence of a rule type under this table.
    pub fn precedence(&self, rule_type: RuleType) -> u32 {
        match rule_type {
            RuleType::TowAway => self.tow_away,
            RuleType::StreetSweeping => self.street_sweeping,
            RuleType::NoParking => self.no_parking,
            RuleType::Meter => self.meter,
            RuleType::TimeLimit => self.time_limit,
            RuleType::RppZone => self.rpp_zone,
        }
    }
}

/// A co-applicable time limit that a metered stay overruns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeLimitOverride<'a> {
    /// The time-limit rule being overrun
    pub rule: &'a ParkingRule,
    pub limit_minutes: u32,
    pub requested_minutes: u32,
}

/// Outcome of precedence resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    /// Applicable rules, highest precedence first (ties keep blockface order)
    pub ordered: Vec<&'a ParkingRule>,
    /// Set when the meter/time-limit composition forces an illegal result
    pub time_limit_override: Option<TimeLimitOverride<'a>>,
}

impl<'a> Resolution<'a> {
    /// The rule driving the explanation, if any rule applies.
    pub fn primary(&self) -> Option<&'a ParkingRule> {
        self.ordered.first().copied()
    }
}

/// Orders applicable rules and applies the meter/time-limit override.
#[derive(Debug, Clone, Default)]
pub struct PrecedenceResolver {
    table: PrecedenceTable,
}

impl PrecedenceResolver {
    pub fn new(table: PrecedenceTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PrecedenceTable {
        &self.table
    }

    /// Sort rules by descending precedence. The sort is stable.
    pub fn sort<'a>(&self, mut rules: Vec<&'a ParkingRule>) -> Vec<&'a ParkingRule> {
        rules.sort_by_key(|rule| Reverse(self.table.precedence(rule.rule_type)));
        rules
    }

    /// Resolve the applicable rules for a stay of `duration_minutes`.
    pub fn resolve<'a>(
        &self,
        applicable: Vec<&'a ParkingRule>,
        duration_minutes: u32,
    ) -> Resolution<'a> {
        let ordered = self.sort(applicable);

        let time_limit_override = match ordered.first() {
            Some(primary) if primary.rule_type == RuleType::Meter => {
                overrun_time_limit(&ordered, duration_minutes)
            }
            _ => None,
        };

        if let Some(overrun) = &time_limit_override {
            tracing::debug!(
                rule = %overrun.rule.id,
                limit = overrun.limit_minutes,
                requested = overrun.requested_minutes,
                "Metered stay overruns a co-applicable time limit"
            );
        }

        Resolution {
            ordered,
            time_limit_override,
        }
    }
}

/// Find the strictest time limit the stay overruns.
fn overrun_time_limit<'a>(
    ordered: &[&'a ParkingRule],
    duration_minutes: u32,
) -> Option<TimeLimitOverride<'a>> {
    ordered
        .iter()
        .filter(|rule| rule.rule_type == RuleType::TimeLimit)
        .filter_map(|rule| rule.time_limit().map(|limit| (*rule, limit)))
        .filter(|(_, limit)| duration_minutes > *limit)
        .min_by_key(|(_, limit)| *limit)
        .map(|(rule, limit_minutes)| TimeLimitOverride {
            rule,
            limit_minutes,
            requested_minutes: duration_minutes,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleMetadata;

    fn rule(id: &str, rule_type: RuleType) -> ParkingRule {
        ParkingRule::new(id, rule_type, id)
    }

    fn time_limit(id: &str, minutes: u32) -> ParkingRule {
        rule(id, RuleType::TimeLimit).with_metadata(RuleMetadata {
            time_limit: Some(minutes),
            ..Default::default()
        })
    }

    #[test]
    fn test_default_table_is_strictly_ordered() {
        let table = PrecedenceTable::default();
        let values: Vec<u32> = RuleType::ALL.iter().map(|t| table.precedence(*t)).collect();
        assert_eq!(values, vec![100, 90, 80, 70, 60, 50]);
    }

    #[test]
    fn test_primary_is_highest_precedence() {
        let rpp = rule("rpp", RuleType::RppZone);
        let meter = rule("meter", RuleType::Meter);
        let tow = rule("tow", RuleType::TowAway);
        let resolver = PrecedenceResolver::default();

        let resolution = resolver.resolve(vec![&rpp, &meter, &tow], 30);
        assert_eq!(resolution.primary().map(|r| r.id.as_str()), Some("tow"));
        let ids: Vec<&str> = resolution.ordered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["tow", "meter", "rpp"]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let first = rule("first", RuleType::NoParking);
        let second = rule("second", RuleType::NoParking);
        let resolution = PrecedenceResolver::default().resolve(vec![&first, &second], 30);
        assert_eq!(resolution.primary().map(|r| r.id.as_str()), Some("first"));
    }

    #[test]
    fn test_alternate_table_changes_primary() {
        let table = PrecedenceTable {
            rpp_zone: 200,
            ..Default::default()
        };
        let rpp = rule("rpp", RuleType::RppZone);
        let tow = rule("tow", RuleType::TowAway);
        let resolution = PrecedenceResolver::new(table).resolve(vec![&tow, &rpp], 30);
        assert_eq!(resolution.primary().map(|r| r.id.as_str()), Some("rpp"));
    }

    #[test]
    fn test_meter_override_when_limit_exceeded() {
        let meter = rule("meter", RuleType::Meter);
        let limit = time_limit("limit", 120);
        let resolution = PrecedenceResolver::default().resolve(vec![&limit, &meter], 180);

        assert_eq!(resolution.primary().map(|r| r.id.as_str()), Some("meter"));
        let overrun = resolution.time_limit_override.expect("override expected");
        assert_eq!(overrun.limit_minutes, 120);
        assert_eq!(overrun.requested_minutes, 180);
    }

    #[test]
    fn test_meter_override_not_triggered_within_limit() {
        let meter = rule("meter", RuleType::Meter);
        let limit = time_limit("limit", 120);
        let resolution = PrecedenceResolver::default().resolve(vec![&meter, &limit], 120);
        assert!(resolution.time_limit_override.is_none());
    }

    #[test]
    fn test_override_picks_strictest_limit() {
        let meter = rule("meter", RuleType::Meter);
        let loose = time_limit("loose", 240);
        let strict = time_limit("strict", 60);
        let resolution =
            PrecedenceResolver::default().resolve(vec![&meter, &loose, &strict], 300);
        let overrun = resolution.time_limit_override.expect("override expected");
        assert_eq!(overrun.rule.id, "strict");
    }

    #[test]
    fn test_no_override_for_other_primaries() {
        let tow = rule("tow", RuleType::TowAway);
        let limit = time_limit("limit", 60);
        let resolution = PrecedenceResolver::default().resolve(vec![&tow, &limit], 300);
        assert!(resolution.time_limit_override.is_none());
    }

    #[test]
    fn test_empty_resolution_has_no_primary() {
        let resolution = PrecedenceResolver::default().resolve(Vec::new(), 30);
        assert!(resolution.primary().is_none());
    }
}
