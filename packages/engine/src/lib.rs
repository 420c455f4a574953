//! Parkwise Engine
//!
//! Decides whether parking on a blockface is legal for a future time window.
//! This library provides functionality for:
//! - Loading blockface regulation datasets (YAML or JSON) with conservative defaults
//! - Evaluating legality for a start time and duration, including midnight spill-over
//! - Residential permit zone visitor-limit checks
//! - Formatting raw regulation records as deduplicated display lines
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use parkwise_engine::{evaluate_legality, parse_blockfaces_json, LegalityStatus};
//!
//! let blockfaces = parse_blockfaces_json(r#"[{
//!     "id": "bf-1",
//!     "streetName": "Mission St",
//!     "rules": [{
//!         "id": "sweep",
//!         "type": "street-sweeping",
//!         "description": "Street cleaning Tue 8am-10am",
//!         "timeRanges": [{"startTime": "08:00", "endTime": "10:00", "daysOfWeek": ["Tue"]}]
//!     }]
//! }]"#)?;
//!
//! let tuesday_nine = NaiveDate::from_ymd_opt(2025, 1, 7)
//!     .unwrap()
//!     .and_hms_opt(9, 0, 0)
//!     .unwrap();
//! let result = evaluate_legality(&blockfaces[0], tuesday_nine, 30);
//! assert_eq!(result.status, LegalityStatus::Illegal);
//! # Ok::<(), parkwise_engine::EngineError>(())
//! ```

pub mod classifier;
pub mod config;
pub mod display;
pub mod error;
pub mod evaluator;
pub mod ingest;
pub mod matcher;
pub mod precedence;
pub mod rpp;
pub mod types;
pub mod window;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used items
pub use display::{format_rules_for_display, try_format_rules};
pub use error::{EngineError, Result};
pub use evaluator::{evaluate_legality, LegalityEvaluator};
pub use ingest::{load_blockfaces, parse_blockfaces_json, parse_blockfaces_yaml};
pub use precedence::{PrecedenceResolver, PrecedenceTable, Resolution};
pub use rpp::{evaluate_rpp_zone, extract_visitor_limit, VisitorLimit};
pub use types::{
    Blockface, Geometry, LegalityResult, LegalityStatus, ParkingRule, RppEvaluation,
    RuleMetadata, RuleType, TimeOfDay, TimeRange,
};
pub use window::{parse_check_time, DaySlice, QueryWindow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
