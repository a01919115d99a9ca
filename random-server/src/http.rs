//! Plain-text HTTP routes.
//!
//! | Route | Query |
//! |---|---|
//! | `GET /ping` | |
//! | `GET /getRandomFloat64` | |
//! | `GET /getRandomInt64` | `min`, `max` |
//! | `GET /getDeterministicRandom` | `s` (sequence, `0..i64::MAX`), `p` (comma separated probabilities) |
//! | `POST /rpc` | JSON-RPC 2.0 body |
//!
//! JSON-RPC accepts the full `u64` sequence range; the HTTP route keeps the
//! signed 64-bit cap.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use random_core::{Distribution, ErrorKind};
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::warn;

use crate::{
    rpc,
    service::{RandomService, ServiceError},
};

/// Longest accepted decimal rendering of a `min`/`max` bound.
const MAX_BOUND_CHARS: usize = 10;

#[derive(Clone)]
pub struct AppState {
    service: Arc<RandomService>,
    max_probabilities_chars: usize,
}

impl AppState {
    pub fn new(service: Arc<RandomService>, max_probabilities_chars: usize) -> Self {
        Self {
            service,
            max_probabilities_chars,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/getRandomFloat64", get(get_random_float64))
        .route("/getRandomInt64", get(get_random_int64))
        .route("/getDeterministicRandom", get(get_deterministic_random))
        .route("/rpc", post(post_rpc))
        .layer(CatchPanicLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new().include_headers(false)),
        )
        .with_state(state)
}

/// A request that failed before or inside the service, rendered as plain text.
#[derive(Debug, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: String,
}

impl Rejection {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for Rejection {
    fn from(err: ServiceError) -> Self {
        let status = match err.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

type Params = Query<HashMap<String, String>>;

async fn ping() -> String {
    format!("pong @ {}", Utc::now())
}

async fn get_random_float64(State(state): State<AppState>) -> Result<String, Rejection> {
    let number = state.service.uniform_float64()?;
    Ok(number.to_string())
}

async fn get_random_int64(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<String, Rejection> {
    let min = parse_bound(&params, "min")?;
    let max = parse_bound(&params, "max")?;
    let number = state.service.uniform_int64(min, max)?;
    Ok(number.to_string())
}

async fn get_deterministic_random(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<String, Rejection> {
    let sequence = parse_sequence(&params)?;
    let probabilities = parse_probabilities(&params, state.max_probabilities_chars)?;
    let index = state.service.deterministic(sequence, &probabilities)?;
    Ok(index.to_string())
}

async fn post_rpc(State(state): State<AppState>, body: String) -> Response {
    let reply = rpc::handle_jsonrpc(&state.service, &body);
    let status = if reply.malformed {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response()
}

fn parse_bound(params: &HashMap<String, String>, name: &str) -> Result<i32, Rejection> {
    let raw = params
        .get(name)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| Rejection::bad_request(format!("{name} is missing")))?;
    if raw.len() > MAX_BOUND_CHARS {
        return Err(Rejection::bad_request(format!(
            "{name} must be less than 2,147,483,647"
        )));
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| Rejection::bad_request(format!("unable to parse {name} as number")))?;
    if !(0..i64::from(i32::MAX)).contains(&value) {
        return Err(Rejection::bad_request(format!(
            "{name} must be between 0 and 2,147,483,647"
        )));
    }
    Ok(value as i32)
}

/// Sequences are capped below `i64::MAX` so every served draw can also be
/// replayed by deployments that store sequence numbers as signed 64-bit values.
fn parse_sequence(params: &HashMap<String, String>) -> Result<u64, Rejection> {
    let raw = params
        .get("s")
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| Rejection::bad_request("sequence is missing"))?;
    let value: i64 = raw
        .parse()
        .map_err(|_| Rejection::bad_request("unable to parse sequence as number"))?;
    if !(0..i64::MAX).contains(&value) {
        return Err(Rejection::bad_request(
            "sequence must be between 0 and 9,223,372,036,854,775,806",
        ));
    }
    Ok(value as u64)
}

fn parse_probabilities(
    params: &HashMap<String, String>,
    max_chars: usize,
) -> Result<Vec<f64>, Rejection> {
    let raw = params
        .get("p")
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| Rejection::bad_request("probabilities are missing"))?;
    if raw.len() > max_chars {
        return Err(Rejection::bad_request(format!(
            "string of probabilities must be less than {max_chars} characters"
        )));
    }
    Distribution::parse_list(raw).map_err(|token| {
        warn!(token = %token, "unparsable probability");
        Rejection::bad_request(format!("invalid probability: {token}"))
    })
}
