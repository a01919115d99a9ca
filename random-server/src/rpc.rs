//! JSON-RPC 2.0 binding of the random service.
//!
//! Methods: `random_getRandomInt64`, `random_getRandomFloat64`,
//! `random_getDeterministicRandom`.

use random_core::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::service::{RandomService, ServiceError};

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
/// Domain rejection of well-formed params (bad range, bad distribution).
pub const INVALID_INPUT: i32 = -32000;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("malformed request: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("unsupported method {0}")]
    UnsupportedMethod(String),
    #[error("invalid params: {0}")]
    InvalidParams(#[source] serde_json::Error),
}

impl RpcError {
    pub fn code(&self) -> i32 {
        match self {
            RpcError::Parse(_) => PARSE_ERROR,
            RpcError::MissingField(_) => INVALID_REQUEST,
            RpcError::UnsupportedMethod(_) => METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => INVALID_PARAMS,
        }
    }
}

/// A request whose envelope parsed but whose method is not resolved yet.
#[derive(Clone, Debug)]
pub struct RpcCall {
    pub id: u64,
    pub method: String,
    pub params: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RandomRpc {
    GetRandomInt64(Int64Params),
    GetRandomFloat64,
    GetDeterministicRandom(DeterministicParams),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Int64Params {
    pub min: i32,
    pub max: i32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DeterministicParams {
    pub sequence: u64,
    pub probabilities: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct NumberResult<T> {
    number: T,
}

#[derive(Debug, Serialize)]
struct IndexResult {
    index: usize,
}

#[derive(Serialize)]
struct JsonRpcResponse<T> {
    jsonrpc: &'static str,
    id: u64,
    result: T,
}

#[derive(Serialize)]
struct JsonRpcErrorResponse {
    jsonrpc: &'static str,
    id: Option<u64>,
    error: JsonRpcError,
}

#[derive(Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

pub fn decode_envelope(raw: &str) -> Result<RpcCall, RpcError> {
    let envelope: Value = serde_json::from_str(raw).map_err(RpcError::Parse)?;
    let id = envelope
        .get("id")
        .and_then(|value| value.as_u64())
        .ok_or(RpcError::MissingField("id"))?;
    let method = envelope
        .get("method")
        .and_then(|value| value.as_str())
        .ok_or(RpcError::MissingField("method"))?
        .to_owned();
    let params = envelope
        .get("params")
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));
    Ok(RpcCall { id, method, params })
}

impl RpcCall {
    pub fn command(&self) -> Result<RandomRpc, RpcError> {
        let params = self.params.clone();
        let command = match self.method.as_str() {
            "random_getRandomInt64" => RandomRpc::GetRandomInt64(
                serde_json::from_value(params).map_err(RpcError::InvalidParams)?,
            ),
            "random_getRandomFloat64" => RandomRpc::GetRandomFloat64,
            "random_getDeterministicRandom" => RandomRpc::GetDeterministicRandom(
                serde_json::from_value(params).map_err(RpcError::InvalidParams)?,
            ),
            other => return Err(RpcError::UnsupportedMethod(other.into())),
        };
        Ok(command)
    }
}

pub fn dispatch(service: &RandomService, command: RandomRpc) -> Result<Value, ServiceError> {
    let value = match command {
        RandomRpc::GetRandomInt64(params) => to_value(NumberResult {
            number: service.uniform_int64(params.min, params.max)?,
        }),
        RandomRpc::GetRandomFloat64 => to_value(NumberResult {
            number: service.uniform_float64()?,
        }),
        RandomRpc::GetDeterministicRandom(params) => to_value(IndexResult {
            index: service.deterministic(params.sequence, &params.probabilities)?,
        }),
    };
    Ok(value)
}

/// Outcome of one JSON-RPC exchange: whether the envelope itself was usable,
/// plus the encoded response body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcReply {
    pub malformed: bool,
    pub body: String,
}

pub fn handle_jsonrpc(service: &RandomService, raw: &str) -> RpcReply {
    let call = match decode_envelope(raw) {
        Ok(call) => call,
        Err(err) => {
            warn!("random rpc rejected envelope err={err}");
            return RpcReply {
                malformed: true,
                body: encode_error(None, err.code(), &err.to_string()),
            };
        }
    };
    let command = match call.command() {
        Ok(command) => command,
        Err(err) => {
            warn!("random rpc rejected call id={} err={err}", call.id);
            return RpcReply {
                malformed: true,
                body: encode_error(Some(call.id), err.code(), &err.to_string()),
            };
        }
    };
    let body = match dispatch(service, command) {
        Ok(result) => encode_success(call.id, result),
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::InvalidInput => INVALID_INPUT,
                ErrorKind::Internal => INTERNAL_ERROR,
            };
            encode_error(Some(call.id), code, &err.to_string())
        }
    };
    RpcReply {
        malformed: false,
        body,
    }
}

pub fn encode_success(id: u64, result: Value) -> String {
    let response = JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result,
    };
    to_value(response).to_string()
}

pub fn encode_error(id: Option<u64>, code: i32, message: &str) -> String {
    let response = JsonRpcErrorResponse {
        jsonrpc: "2.0",
        id,
        error: JsonRpcError {
            code,
            message: message.into(),
        },
    };
    to_value(response).to_string()
}

// Only plain response structs reach this point; converting them to a `Value`
// has no failure path.
fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use random_core::Seed;
    use random_telemetry::{TelemetryConfig, TelemetryHandle};
    use serde_json::json;

    use super::*;

    fn service() -> RandomService {
        let seed = Seed::from_hex(&format!("9912f3bcf715a55ae5c9d47f9f656259{}", "0".repeat(32)))
            .unwrap();
        RandomService::new(seed, TelemetryHandle::from_config(TelemetryConfig::default())).unwrap()
    }

    fn reply(raw: Value) -> (bool, Value) {
        let reply = handle_jsonrpc(&service(), &raw.to_string());
        (reply.malformed, serde_json::from_str(&reply.body).unwrap())
    }

    #[test]
    fn deterministic_call_returns_index() {
        let (malformed, body) = reply(json!({
            "id": 1,
            "method": "random_getDeterministicRandom",
            "params": { "sequence": 0, "probabilities": [0.2, 0.2, 0.2, 0.2, 0.2] }
        }));
        assert!(!malformed);
        assert_eq!(body, json!({ "jsonrpc": "2.0", "id": 1, "result": { "index": 2 } }));
    }

    #[test]
    fn int64_call_honours_bounds() {
        let (_, body) = reply(json!({
            "id": 9,
            "method": "random_getRandomInt64",
            "params": { "min": 3, "max": 3 }
        }));
        assert_eq!(body["result"]["number"], json!(3));
    }

    #[test]
    fn float64_call_needs_no_params() {
        let (_, body) = reply(json!({ "id": 2, "method": "random_getRandomFloat64" }));
        let number = body["result"]["number"].as_f64().unwrap();
        assert!((0.0..1.0).contains(&number));
    }

    #[test]
    fn domain_errors_use_invalid_input_code() {
        let (malformed, body) = reply(json!({
            "id": 3,
            "method": "random_getDeterministicRandom",
            "params": { "sequence": 0, "probabilities": [0.5, 0.4] }
        }));
        assert!(!malformed);
        assert_eq!(body["error"]["code"], json!(INVALID_INPUT));
        assert_eq!(body["id"], json!(3));
    }

    #[test]
    fn envelope_errors_are_flagged_malformed() {
        let reply_raw = handle_jsonrpc(&service(), "{not json");
        assert!(reply_raw.malformed);
        let body: Value = serde_json::from_str(&reply_raw.body).unwrap();
        assert_eq!(body["error"]["code"], json!(PARSE_ERROR));
        assert_eq!(body["id"], Value::Null);

        let (malformed, body) = reply(json!({ "method": "random_getRandomFloat64" }));
        assert!(malformed);
        assert_eq!(body["error"]["code"], json!(INVALID_REQUEST));

        let (_, body) = reply(json!({ "id": 4, "method": "random_shuffle" }));
        assert_eq!(body["error"]["code"], json!(METHOD_NOT_FOUND));

        let (_, body) = reply(json!({
            "id": 5,
            "method": "random_getDeterministicRandom",
            "params": { "sequence": -1, "probabilities": [1.0] }
        }));
        assert_eq!(body["error"]["code"], json!(INVALID_PARAMS));
        assert_eq!(body["id"], json!(5));
    }
}
