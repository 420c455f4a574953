//! World struct for Cucumber BDD tests
//!
//! Contains the test state that persists across steps in a scenario.

use chrono::NaiveDateTime;
use cucumber::World;
use parkwise_engine::{
    Blockface, LegalityEvaluator, LegalityResult, ParkingRule, PrecedenceTable, RppEvaluation,
};

/// Test world that holds state across steps in a Cucumber scenario.
#[derive(Debug, Default, World)]
pub struct ParkwiseWorld {
    /// Blockface under test
    pub blockface: Blockface,
    /// Precedence table used for the next evaluation
    pub precedence: PrecedenceTable,
    /// Last legality result
    pub result: Option<LegalityResult>,
    /// Permit-zone regulation text for visitor checks
    pub regulation_text: String,
    /// Last visitor check
    pub rpp: Option<RppEvaluation>,
    /// Rules queued for display formatting
    pub display_rules: Vec<ParkingRule>,
    /// Last display output
    pub display_lines: Vec<String>,
}

impl ParkwiseWorld {
    /// Evaluate the blockface and store the result
    pub fn evaluate(&mut self, check_time: NaiveDateTime, duration_minutes: u32) {
        let evaluator = LegalityEvaluator::with_precedence(self.precedence.clone());
        self.result = Some(evaluator.evaluate(&self.blockface, check_time, duration_minutes));
    }

    /// The last legality result, failing the scenario if none was computed
    pub fn result(&self) -> &LegalityResult {
        self.result
            .as_ref()
            .expect("no legality evaluation has been run in this scenario")
    }

    /// The last visitor check, failing the scenario if none was computed
    pub fn rpp(&self) -> &RppEvaluation {
        self.rpp
            .as_ref()
            .expect("no visitor check has been run in this scenario")
    }
}
