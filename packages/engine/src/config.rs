//! Configuration constants for the Parkwise engine
//!
//! Centralized values used throughout the engine for:
//! - Query window bounds
//! - Visitor allowance defaults for residential permit zones
//! - Ingestion limits (prevent oversized datasets from exhausting memory)
//! - User-facing warning texts attached to every legality result
//!
//! The precedence scheme is deliberately not in here: it is a runtime value
//! ([`crate::precedence::PrecedenceTable`]) so alternate schemes can be tested.

/// Shortest query window the evaluator accepts, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 1;

/// Longest query window the evaluator accepts, in minutes (one full day).
pub const MAX_DURATION_MINUTES: u32 = 1_440;

/// Visitor allowance assumed when permit-zone text mentions visitors
/// (or non-permit holders) without stating a number of hours.
pub const DEFAULT_VISITOR_LIMIT_MINUTES: u32 = 120;

/// Maximum dataset document size in bytes (5 MB).
///
/// A viewport rarely holds more than a few hundred blockfaces; 5 MB leaves
/// room for a whole neighbourhood export.
pub const MAX_DOCUMENT_SIZE: usize = 5_000_000;

/// Maximum number of blockfaces in one dataset document.
pub const MAX_BLOCKFACES: usize = 10_000;

/// Maximum number of rules attached to a single blockface.
pub const MAX_RULES_PER_BLOCKFACE: usize = 64;

/// Warning attached to every legality result, whatever the status.
pub const SIGN_VERIFICATION_WARNING: &str =
    "Always check posted signs on-site; signage overrides this information.";

/// Warning attached when a blockface has no regulation data at all.
pub const NO_DATA_WARNING: &str =
    "No parking regulations are recorded for this blockface. Verify on-site before parking.";

/// Warning attached when a residential permit zone controls the result.
pub const RPP_VISITOR_WARNING: &str =
    "Visitor exceptions may exist for this permit zone; check the posted signage for a visitor time limit.";
