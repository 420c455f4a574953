//! Legality evaluation service
//!
//! Entry point called once per visible blockface whenever the query time or
//! duration changes. Wires the window expansion, rule matching, precedence
//! resolution and classification together.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use parkwise_engine::{
//!     evaluate_legality, Blockface, LegalityStatus, ParkingRule, RuleMetadata, RuleType,
//!     TimeRange,
//! };
//!
//! let rule = ParkingRule::new("tl-1", RuleType::TimeLimit, "2hr parking 9am-6pm Mon-Sat")
//!     .with_time_range(TimeRange::new("09:00", "18:00", &[1, 2, 3, 4, 5, 6]).unwrap())
//!     .with_metadata(RuleMetadata { time_limit: Some(120), ..Default::default() });
//! let blockface = Blockface::new("bf-1", "Valencia St", "east").with_rule(rule);
//!
//! let monday_ten = NaiveDate::from_ymd_opt(2025, 1, 6)
//!     .unwrap()
//!     .and_hms_opt(10, 0, 0)
//!     .unwrap();
//! let result = evaluate_legality(&blockface, monday_ten, 60);
//! assert_eq!(result.status, LegalityStatus::Legal);
//! ```

use crate::classifier::{classify, insufficient_data};
use crate::matcher::applicable_rules;
use crate::precedence::{PrecedenceResolver, PrecedenceTable};
use crate::types::{Blockface, LegalityResult};
use crate::window::QueryWindow;
use chrono::NaiveDateTime;

/// Evaluates blockfaces against query windows under one precedence scheme.
#[derive(Debug, Clone, Default)]
pub struct LegalityEvaluator {
    resolver: PrecedenceResolver,
}

impl LegalityEvaluator {
    /// Evaluator using the standard precedence table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluator using an alternate precedence table.
    pub fn with_precedence(table: PrecedenceTable) -> Self {
        Self {
            resolver: PrecedenceResolver::new(table),
        }
    }

    pub fn precedence(&self) -> &PrecedenceTable {
        self.resolver.table()
    }

    /// Evaluate one blockface for a stay starting at `check_time`.
    pub fn evaluate(
        &self,
        blockface: &Blockface,
        check_time: NaiveDateTime,
        duration_minutes: u32,
    ) -> LegalityResult {
        self.evaluate_window(blockface, &QueryWindow::new(check_time, duration_minutes))
    }

    /// Evaluate one blockface against an already constructed window.
    pub fn evaluate_window(&self, blockface: &Blockface, window: &QueryWindow) -> LegalityResult {
        if blockface.rules.is_empty() {
            tracing::debug!(blockface = %blockface.id, "No rules recorded");
            return insufficient_data();
        }

        let applicable = applicable_rules(blockface, window);
        let resolution = self
            .resolver
            .resolve(applicable, window.duration_minutes());
        let result = classify(&resolution, window.duration_minutes());

        tracing::debug!(
            blockface = %blockface.id,
            start = %window.start(),
            duration = window.duration_minutes(),
            applicable = result.applicable_rules.len(),
            status = %result.status,
            "Evaluated blockface"
        );

        result
    }

    /// Evaluate every blockface in a viewport, preserving input order.
    ///
    /// Blockfaces are independent, so callers wanting parallelism can split the
    /// slice across threads and call [`LegalityEvaluator::evaluate`] directly.
    pub fn evaluate_many<'a>(
        &self,
        blockfaces: &'a [Blockface],
        check_time: NaiveDateTime,
        duration_minutes: u32,
    ) -> Vec<(&'a str, LegalityResult)> {
        let window = QueryWindow::new(check_time, duration_minutes);
        blockfaces
            .iter()
            .map(|blockface| (blockface.id.as_str(), self.evaluate_window(blockface, &window)))
            .collect()
    }
}

/// Evaluate one blockface with the standard precedence table.
pub fn evaluate_legality(
    blockface: &Blockface,
    check_time: NaiveDateTime,
    duration_minutes: u32,
) -> LegalityResult {
    LegalityEvaluator::new().evaluate(blockface, check_time, duration_minutes)
}
