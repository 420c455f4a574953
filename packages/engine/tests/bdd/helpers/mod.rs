//! Helper modules for BDD tests

pub mod rule_table;
