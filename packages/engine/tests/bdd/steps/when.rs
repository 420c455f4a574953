//! When step definitions
//!
//! Steps that run evaluations.

use cucumber::when;
use parkwise_engine::{evaluate_rpp_zone, format_rules_for_display, parse_check_time};

use crate::world::ParkwiseWorld;

#[when(expr = "I check parking at {string} for {int} minutes")]
fn check_parking(world: &mut ParkwiseWorld, check_time: String, duration: u32) {
    let check_time = parse_check_time(&check_time)
        .unwrap_or_else(|e| panic!("invalid check time '{check_time}': {e}"));
    world.evaluate(check_time, duration);
}

#[when(expr = "a visitor parks in zone {string} for {int} minutes")]
fn check_visitor(world: &mut ParkwiseWorld, zone: String, duration: u32) {
    world.rpp = Some(evaluate_rpp_zone(&world.regulation_text, &zone, duration));
}

#[when("the rules are formatted for display")]
fn format_rules(world: &mut ParkwiseWorld) {
    world.display_lines = format_rules_for_display(&world.display_rules);
}
