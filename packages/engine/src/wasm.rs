//! WASM bindings for the Parkwise engine
//!
//! Feature-gated behind the `wasm` feature flag. The map client loads the
//! viewport's blockfaces once and re-evaluates them whenever the user moves
//! the time slider.
//!
//! # Key Constraints
//!
//! - **No filesystem access in WASM**: datasets are passed as JSON strings via `loadBlockfaces()`
//! - **Efficient serialization**: uses `serde-wasm-bindgen` for Rust <-> JavaScript conversion
//! - **Local wall-clock time**: `checkTime` is an ISO-8601 local date-time without offset
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { WasmEvaluator } from 'parkwise-engine';
//!
//! await init();
//! const evaluator = new WasmEvaluator();
//!
//! const response = await fetch('/api/blockfaces?bbox=...');
//! evaluator.loadBlockfaces(await response.text());
//!
//! const results = evaluator.evaluateAll('2025-01-06T10:00:00', 120);
//! console.log(results[0].result.status);  // "legal" | "illegal" | "insufficient-data"
//! ```

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::MAX_DOCUMENT_SIZE;
use crate::display::format_rules_for_display;
use crate::evaluator::LegalityEvaluator;
use crate::ingest::{parse_blockfaces_json, RawBlockface, RawRule};
use crate::precedence::PrecedenceTable;
use crate::rpp::evaluate_rpp_zone;
use crate::types::{Blockface, LegalityResult};
use crate::window::parse_check_time;

/// Helper to create consistent error JsValues
fn wasm_error(msg: &str) -> JsValue {
    JsValue::from_str(msg)
}

/// Serializable per-blockface result for evaluateAll()
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WasmBlockfaceResult<'a> {
    blockface_id: &'a str,
    result: LegalityResult,
}

/// WASM-facing legality evaluator holding the currently loaded blockfaces.
#[wasm_bindgen]
pub struct WasmEvaluator {
    evaluator: LegalityEvaluator,
    blockfaces: Vec<Blockface>,
}

#[wasm_bindgen]
impl WasmEvaluator {
    /// Create an evaluator with the standard precedence table and no blockfaces.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            evaluator: LegalityEvaluator::new(),
            blockfaces: Vec::new(),
        }
    }

    /// Replace the precedence table (`{ towAway: 100, streetSweeping: 90, ... }`).
    #[wasm_bindgen(js_name = setPrecedence)]
    pub fn set_precedence(&mut self, table: JsValue) -> Result<(), JsValue> {
        let table: PrecedenceTable = serde_wasm_bindgen::from_value(table)
            .map_err(|e| wasm_error(&format!("Failed to parse precedence table: {}", e)))?;
        self.evaluator = LegalityEvaluator::with_precedence(table);
        Ok(())
    }

    /// Load a JSON blockface dataset, replacing any previously loaded one.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of blockfaces loaded
    /// * `Err(JsValue)` - Error message if parsing fails
    #[wasm_bindgen(js_name = loadBlockfaces)]
    pub fn load_blockfaces(&mut self, json: &str) -> Result<usize, JsValue> {
        if json.len() > MAX_DOCUMENT_SIZE {
            return Err(wasm_error("Dataset exceeds maximum size (5 MB)"));
        }
        self.blockfaces = parse_blockfaces_json(json).map_err(|e| wasm_error(&e.to_string()))?;
        Ok(self.blockfaces.len())
    }

    /// Evaluate a single blockface passed as a JavaScript object.
    ///
    /// # Example (JavaScript)
    /// ```javascript
    /// const result = evaluator.evaluateLegality(blockface, '2025-01-06T10:00', 60);
    /// console.log(result.explanation);
    /// ```
    #[wasm_bindgen(js_name = evaluateLegality)]
    pub fn evaluate_legality(
        &self,
        blockface: JsValue,
        check_time: &str,
        duration_minutes: u32,
    ) -> Result<JsValue, JsValue> {
        let blockface: RawBlockface = serde_wasm_bindgen::from_value(blockface)
            .map_err(|e| wasm_error(&format!("Failed to parse blockface: {}", e)))?;
        let result = self
            .evaluate_raw(blockface, check_time, duration_minutes)
            .map_err(|e| wasm_error(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&result)
            .map_err(|e| wasm_error(&format!("Failed to serialize result: {}", e)))
    }

    /// Evaluate every loaded blockface, in load order.
    #[wasm_bindgen(js_name = evaluateAll)]
    pub fn evaluate_all(&self, check_time: &str, duration_minutes: u32) -> Result<JsValue, JsValue> {
        let check_time = parse_check_time(check_time).map_err(|e| wasm_error(&e.to_string()))?;
        let results: Vec<WasmBlockfaceResult<'_>> = self
            .evaluator
            .evaluate_many(&self.blockfaces, check_time, duration_minutes)
            .into_iter()
            .map(|(blockface_id, result)| WasmBlockfaceResult {
                blockface_id,
                result,
            })
            .collect();

        serde_wasm_bindgen::to_value(&results)
            .map_err(|e| wasm_error(&format!("Failed to serialize results: {}", e)))
    }

    /// Check a visitor stay in a residential permit zone.
    #[wasm_bindgen(js_name = evaluateRppZone)]
    pub fn evaluate_rpp_zone(
        &self,
        regulation_text: &str,
        zone_id: &str,
        duration_minutes: u32,
    ) -> Result<JsValue, JsValue> {
        let evaluation = evaluate_rpp_zone(regulation_text, zone_id, duration_minutes);
        serde_wasm_bindgen::to_value(&evaluation)
            .map_err(|e| wasm_error(&format!("Failed to serialize evaluation: {}", e)))
    }

    /// Format a list of rules (JavaScript array) as display lines.
    #[wasm_bindgen(js_name = formatRulesForDisplay)]
    pub fn format_rules_for_display(&self, rules: JsValue) -> Result<Vec<String>, JsValue> {
        let rules: Vec<RawRule> = serde_wasm_bindgen::from_value(rules)
            .map_err(|e| wasm_error(&format!("Failed to parse rules: {}", e)))?;
        Ok(format_raw_rules(rules))
    }

    /// Get the number of loaded blockfaces.
    #[wasm_bindgen(js_name = blockfaceCount)]
    pub fn blockface_count(&self) -> usize {
        self.blockfaces.len()
    }

    /// Get the engine version.
    pub fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

impl WasmEvaluator {
    /// Normalize a raw blockface the same way loaded datasets are, then evaluate it.
    fn evaluate_raw(
        &self,
        blockface: RawBlockface,
        check_time: &str,
        duration_minutes: u32,
    ) -> crate::error::Result<LegalityResult> {
        let check_time = parse_check_time(check_time)?;
        let blockface: Blockface = blockface.into_blockface(0);
        Ok(self.evaluator.evaluate(&blockface, check_time, duration_minutes))
    }
}

fn format_raw_rules(rules: Vec<RawRule>) -> Vec<String> {
    let rules: Vec<_> = rules
        .into_iter()
        .enumerate()
        .map(|(position, raw)| raw.into_rule("display", position))
        .collect();
    format_rules_for_display(&rules)
}

impl Default for WasmEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

// JsValue conversion only works inside a WASM runtime; these tests cover the
// parts of the API that don't cross that boundary.
#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"[
        {"id": "a", "streetName": "Valencia St", "rules": []},
        {"id": "b", "streetName": "Mission St", "rules": [
            {"id": "tow", "type": "tow-away", "description": "Tow-away 7-9am",
             "timeRanges": [{"startTime": "07:00", "endTime": "09:00", "daysOfWeek": "weekdays"}]}
        ]}
    ]"#;

    #[test]
    fn test_wasm_evaluator_new() {
        let evaluator = WasmEvaluator::new();
        assert_eq!(evaluator.blockface_count(), 0);
        assert_eq!(evaluator.version(), "0.1.0");
    }

    #[test]
    fn test_single_blockface_gets_ingest_defaults() {
        let raw: RawBlockface = serde_json::from_str(
            r#"{"id": "c", "streetName": "Capp St", "rules": [
                {"type": "loading-zone", "description": "Commercial loading",
                 "timeRanges": [{"startTime": "18:00", "endTime": "09:00", "days": "Mon"}]}
            ]}"#,
        )
        .unwrap();
        let evaluator = WasmEvaluator::new();

        // Monday 18:00-09:00 is split at midnight; Tuesday 08:00 is inside it
        let result = evaluator
            .evaluate_raw(raw.clone(), "2025-01-07T08:00", 30)
            .unwrap();
        assert_eq!(result.status, crate::types::LegalityStatus::Illegal);
        assert_eq!(result.applicable_rules[0].rule_type, crate::types::RuleType::NoParking);

        assert!(matches!(
            evaluator.evaluate_raw(raw, "next tuesday", 30),
            Err(crate::error::EngineError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn test_raw_rules_format_for_display() {
        let rules: Vec<RawRule> = serde_json::from_str(
            r#"[{"type": "time-limit", "description": "2-hour parking",
                 "timeRanges": [{"startTime": "09:00", "endTime": "18:00", "daysOfWeek": [1]}]}]"#,
        )
        .unwrap();
        assert_eq!(format_raw_rules(rules), vec!["2hr parking 9am-6pm Mon".to_string()]);
    }

    #[test]
    fn test_blockface_result_keys_are_camel_case() {
        let evaluator = LegalityEvaluator::new();
        let blockfaces = parse_blockfaces_json(DATASET).unwrap();
        let check_time = parse_check_time("2025-01-06T08:00").unwrap();
        let results: Vec<WasmBlockfaceResult<'_>> = evaluator
            .evaluate_many(&blockfaces, check_time, 60)
            .into_iter()
            .map(|(blockface_id, result)| WasmBlockfaceResult {
                blockface_id,
                result,
            })
            .collect();

        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value[1]["blockfaceId"], "b");
        assert!(value[1].get("blockface_id").is_none());
    }

    #[test]
    fn test_loaded_blockfaces_are_kept() {
        let mut evaluator = WasmEvaluator::new();
        evaluator.blockfaces = parse_blockfaces_json(DATASET).unwrap();
        assert_eq!(evaluator.blockface_count(), 2);
    }
}
