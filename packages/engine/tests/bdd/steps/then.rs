//! Then step definitions
//!
//! Steps that verify outcomes and assertions.

use cucumber::{gherkin::Step, then};
use parkwise_engine::config::SIGN_VERIFICATION_WARNING;
use pretty_assertions::assert_eq;

use crate::world::ParkwiseWorld;

// =============================================================================
// Legality steps
// =============================================================================

#[then(expr = "parking is {word}")]
fn assert_status(world: &mut ParkwiseWorld, expected: String) {
    let result = world.result();
    assert_eq!(
        result.status.as_str(),
        expected,
        "unexpected status, explanation: {}",
        result.explanation
    );
}

#[then(expr = "the controlling rule is {string}")]
fn assert_controlling_rule(world: &mut ParkwiseWorld, id: String) {
    let controlling = world.result().applicable_rules.first().map(|rule| rule.id.as_str());
    assert_eq!(controlling, Some(id.as_str()));
}

#[then("no rules apply")]
fn assert_no_rules(world: &mut ParkwiseWorld) {
    assert!(
        world.result().applicable_rules.is_empty(),
        "expected no applicable rules, got {:?}",
        world.result().applicable_rules
    );
}

#[then(expr = "{int} rules apply")]
fn assert_rule_count(world: &mut ParkwiseWorld, count: usize) {
    assert_eq!(world.result().applicable_rules.len(), count);
}

#[then(expr = "the explanation mentions {string}")]
fn assert_explanation(world: &mut ParkwiseWorld, needle: String) {
    let explanation = &world.result().explanation;
    assert!(
        explanation.contains(&needle),
        "expected '{needle}' in explanation: {explanation}"
    );
}

#[then("drivers are told to verify posted signs")]
fn assert_sign_warning(world: &mut ParkwiseWorld) {
    assert!(world
        .result()
        .warnings
        .iter()
        .any(|warning| warning == SIGN_VERIFICATION_WARNING));
}

// =============================================================================
// Permit zone steps
// =============================================================================

#[then("the visitor may park")]
fn assert_visitor_allowed(world: &mut ParkwiseWorld) {
    assert!(world.rpp().can_park, "reason: {}", world.rpp().reason);
}

#[then("the visitor may not park")]
fn assert_visitor_rejected(world: &mut ParkwiseWorld) {
    assert!(!world.rpp().can_park, "reason: {}", world.rpp().reason);
}

#[then(expr = "the visitor limit is {int} minutes")]
fn assert_visitor_limit(world: &mut ParkwiseWorld, minutes: u32) {
    assert_eq!(world.rpp().visitor_limit_minutes, Some(minutes));
}

#[then("no visitor limit is given")]
fn assert_no_visitor_limit(world: &mut ParkwiseWorld) {
    assert_eq!(world.rpp().visitor_limit_minutes, None);
}

#[then(expr = "the reason mentions {string}")]
fn assert_reason(world: &mut ParkwiseWorld, needle: String) {
    let reason = &world.rpp().reason;
    assert!(reason.contains(&needle), "expected '{needle}' in reason: {reason}");
}

// =============================================================================
// Display steps
// =============================================================================

#[then("the display lines are:")]
fn assert_display_lines(world: &mut ParkwiseWorld, step: &Step) {
    let table = step.table.as_ref().expect("step requires a table of lines");
    let expected: Vec<String> = table
        .rows
        .iter()
        .filter_map(|row| row.first().map(|line| line.trim().to_string()))
        .collect();
    assert_eq!(world.display_lines, expected);
}
