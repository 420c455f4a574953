//! CLI binary for evaluating parking legality via stdin.
//!
//! Usage:
//!   echo '{"operation": "legality", "blockface": {...}, "checkTime": "2025-01-06T10:00:00", "durationMinutes": 60}' \
//!     | cargo run --bin evaluate
//!
//! Input (JSON on stdin), selected by `operation`:
//!   - legality: `blockface` (raw blockface record), `checkTime` (local ISO-8601),
//!     `durationMinutes`, optional `precedence` table
//!   - rpp: `regulationText`, `zoneId`, `durationMinutes`
//!   - display: `rules` (raw rule records)
//!
//! Output (JSON on stdout):
//!   - legality: `{ "result": LegalityResult }`
//!   - rpp: `{ "rpp": RppEvaluation }`
//!   - display: `{ "lines": [String] }`
//!   - error: `{ "error": String }` with exit code 1
//!
//! Logs go to stderr; set `RUST_LOG=parkwise_engine=debug` for evaluation traces.

use parkwise_engine::ingest::{RawBlockface, RawRule};
use parkwise_engine::{
    evaluate_rpp_zone, format_rules_for_display, parse_check_time, LegalityEvaluator,
    LegalityResult, PrecedenceTable, RppEvaluation,
};
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(serde::Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
enum EvaluateRequest {
    Legality {
        blockface: RawBlockface,
        #[serde(rename = "checkTime")]
        check_time: String,
        #[serde(rename = "durationMinutes")]
        duration_minutes: u32,
        #[serde(default)]
        precedence: Option<PrecedenceTable>,
    },
    Rpp {
        #[serde(rename = "regulationText")]
        regulation_text: String,
        #[serde(rename = "zoneId")]
        zone_id: String,
        #[serde(rename = "durationMinutes")]
        duration_minutes: u32,
    },
    Display {
        rules: Vec<RawRule>,
    },
}

#[derive(serde::Serialize, Default)]
struct EvaluateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<LegalityResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rpp: Option<RppEvaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn error_response(msg: String) -> EvaluateResponse {
    EvaluateResponse {
        error: Some(msg),
        ..Default::default()
    }
}

fn fail(msg: String) -> ! {
    let resp = error_response(msg);
    println!("{}", serde_json::to_string(&resp).unwrap_or_default());
    std::process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        fail(format!("Failed to read stdin: {e}"));
    }

    let request: EvaluateRequest = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => fail(format!("Failed to parse request JSON: {e}")),
    };

    let resp = match request {
        EvaluateRequest::Legality {
            blockface,
            check_time,
            duration_minutes,
            precedence,
        } => {
            let check_time = match parse_check_time(&check_time) {
                Ok(t) => t,
                Err(e) => fail(format!("{e}: expected YYYY-MM-DDTHH:MM[:SS]")),
            };
            let evaluator = match precedence {
                Some(table) => LegalityEvaluator::with_precedence(table),
                None => LegalityEvaluator::new(),
            };
            let blockface = blockface.into_blockface(0);
            EvaluateResponse {
                result: Some(evaluator.evaluate(&blockface, check_time, duration_minutes)),
                ..Default::default()
            }
        }
        EvaluateRequest::Rpp {
            regulation_text,
            zone_id,
            duration_minutes,
        } => EvaluateResponse {
            rpp: Some(evaluate_rpp_zone(
                &regulation_text,
                &zone_id,
                duration_minutes,
            )),
            ..Default::default()
        },
        EvaluateRequest::Display { rules } => {
            let rules: Vec<_> = rules
                .into_iter()
                .enumerate()
                .map(|(position, raw)| raw.into_rule("display", position))
                .collect();
            EvaluateResponse {
                lines: Some(format_rules_for_display(&rules)),
                ..Default::default()
            }
        }
    };

    println!("{}", serde_json::to_string(&resp).unwrap_or_default());
}
