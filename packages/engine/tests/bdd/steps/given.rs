//! Given step definitions
//!
//! Steps that set up the initial state for scenarios.

use cucumber::{gherkin::Step, given};
use parkwise_engine::{ingest::parse_rule_type, Blockface};

use crate::helpers::rule_table::parse_rule_table;
use crate::world::ParkwiseWorld;

// =============================================================================
// Blockface steps
// =============================================================================

#[given(expr = "a blockface {string} on {string}")]
fn set_blockface(world: &mut ParkwiseWorld, id: String, street: String) {
    world.blockface = Blockface::new(id, street, "north");
}

#[given("the blockface has the following rules:")]
fn set_blockface_rules(world: &mut ParkwiseWorld, step: &Step) {
    let table = step.table.as_ref().expect("step requires a rule table");
    let blockface_id = world.blockface.id.clone();
    world.blockface.rules = parse_rule_table(table)
        .into_iter()
        .enumerate()
        .map(|(position, raw)| raw.into_rule(&blockface_id, position))
        .collect();
}

#[given(expr = "{string} rules rank at {int}")]
fn set_precedence(world: &mut ParkwiseWorld, rule_type: String, rank: u32) {
    let rule_type = parse_rule_type(&rule_type)
        .unwrap_or_else(|| panic!("unknown rule type in scenario: {rule_type}"));
    let table = &mut world.precedence;
    let slot = match rule_type {
        parkwise_engine::RuleType::TowAway => &mut table.tow_away,
        parkwise_engine::RuleType::StreetSweeping => &mut table.street_sweeping,
        parkwise_engine::RuleType::NoParking => &mut table.no_parking,
        parkwise_engine::RuleType::Meter => &mut table.meter,
        parkwise_engine::RuleType::TimeLimit => &mut table.time_limit,
        parkwise_engine::RuleType::RppZone => &mut table.rpp_zone,
    };
    *slot = rank;
}

// =============================================================================
// Permit zone steps
// =============================================================================

#[given(expr = "the permit zone regulation {string}")]
fn set_regulation_text(world: &mut ParkwiseWorld, text: String) {
    world.regulation_text = text;
}

// =============================================================================
// Display steps
// =============================================================================

#[given("the following regulation records:")]
fn set_display_rules(world: &mut ParkwiseWorld, step: &Step) {
    let table = step.table.as_ref().expect("step requires a rule table");
    world.display_rules = parse_rule_table(table)
        .into_iter()
        .enumerate()
        .map(|(position, raw)| raw.into_rule("display", position))
        .collect();
}
