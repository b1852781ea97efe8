//! Operation counters.
//!
//! # Metrics
//! - `token_transfers_total` (counter): transfers by outcome
//! - `token_balance_queries_total` (counter): balance queries by outcome
//! - `fhe_session_inits_total` (counter): session initializations by outcome
//!
//! Counters go to whatever `metrics` recorder the embedding process installs;
//! without one they are no-ops.

use metrics::counter;

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

pub fn record_transfer(success: bool) {
    counter!("token_transfers_total", "outcome" => outcome(success)).increment(1);
}

pub fn record_balance_query(success: bool) {
    counter!("token_balance_queries_total", "outcome" => outcome(success)).increment(1);
}

pub fn record_session_init(success: bool) {
    counter!("fhe_session_inits_total", "outcome" => outcome(success)).increment(1);
}
