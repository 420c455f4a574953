//! Conversion of Gherkin rule tables into raw dataset records
//!
//! Rows go through the ingestion layer so scenarios exercise the same
//! defaulting the real datasets do. The first row is the header; recognized
//! columns are `id`, `type`, `description`, `start`, `end`, `days`, `limit`,
//! `rate` and `zone`. Empty cells are treated as missing.

use cucumber::gherkin::Table;
use parkwise_engine::ingest::{DayToken, LooseNumber, RawDays, RawMetadata, RawRule, RawTimeRange};

fn cell(header: &[String], row: &[String], column: &str) -> Option<String> {
    let position = header.iter().position(|name| name.trim() == column)?;
    row.get(position)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Convert each data row into a [`RawRule`] with at most one time range.
pub fn parse_rule_table(table: &Table) -> Vec<RawRule> {
    let Some((header, rows)) = table.rows.split_first() else {
        return Vec::new();
    };

    rows.iter()
        .map(|row| {
            let start_time = cell(header, row, "start");
            let end_time = cell(header, row, "end");
            let days = cell(header, row, "days");
            let time_ranges = if start_time.is_some() || end_time.is_some() {
                vec![RawTimeRange {
                    start_time,
                    end_time,
                    days_of_week: days.map(|days| RawDays::Single(DayToken::Name(days))),
                }]
            } else {
                Vec::new()
            };

            let metadata = RawMetadata {
                time_limit: cell(header, row, "limit").map(LooseNumber::Text),
                meter_rate: cell(header, row, "rate").map(LooseNumber::Text),
                permit_zone: cell(header, row, "zone"),
            };

            RawRule {
                id: cell(header, row, "id"),
                rule_type: cell(header, row, "type"),
                time_ranges,
                description: cell(header, row, "description"),
                metadata: Some(metadata),
            }
        })
        .collect()
}
