//! Mock-backend behaviour: random latency and occasional injected failures.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use rand::Rng;
use serde_json::json;

use crate::AppState;

/// Lower bound of the simulated latency, in milliseconds.
const MIN_DELAY_MS: u64 = 200;

/// Width of the random latency window, in milliseconds.
const DELAY_SPREAD_MS: u64 = 400;

/// Probability of an injected 500 when error simulation is on.
const ERROR_RATE: f64 = 0.02;

/// Draw a latency in `[MIN_DELAY_MS, MIN_DELAY_MS + DELAY_SPREAD_MS)`.
pub fn random_delay<R: Rng>(rng: &mut R) -> Duration {
    Duration::from_millis(MIN_DELAY_MS + rng.random_range(0..DELAY_SPREAD_MS))
}

fn simulated_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal Server Error",
            "message": "Simulated server failure for testing error handling",
        })),
    )
        .into_response()
}

/// Delay each request and optionally fail a small share of them.
pub async fn simulate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let config = &state.config;
    if !config.simulate_latency && !config.simulate_errors {
        return next.run(request).await;
    }

    // ThreadRng is not Send; draw everything before the first await.
    let (delay, fail) = {
        let mut rng = rand::rng();
        let delay = random_delay(&mut rng);
        let fail = config.simulate_errors && rng.random_bool(ERROR_RATE);
        (delay, fail)
    };

    tracing::debug!(delay_ms = delay.as_millis() as u64, path = %request.uri().path(), "Simulated latency");
    tokio::time::sleep(delay).await;

    if fail {
        tracing::warn!(path = %request.uri().path(), "Injecting simulated server failure");
        return simulated_failure();
    }

    next.run(request).await
}
