use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::{
    method::Method,
    protocol_error::ProtocolError,
    types::{IceCandidateInit, RequestId, SessionDescription},
};

/// Error member of a response: `{"code": -32000, "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Answer to one of our correlated requests.
    Response {
        id: RequestId,
        outcome: Result<Value, RpcError>,
    },
    /// Uncorrelated message pushed by the coordinator.
    Notification(Notification),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Remote-initiated renegotiation.
    Offer(SessionDescription),
    Answer(SessionDescription),
    /// Remote connectivity candidate.
    Trickle(IceCandidateInit),
    /// Any method this client does not act on.
    Other { method: String, params: Value },
}

impl Notification {
    #[must_use]
    pub fn method_name(&self) -> &str {
        match self {
            Self::Offer(_) => Method::Offer.as_str(),
            Self::Answer(_) => Method::Answer.as_str(),
            Self::Trickle(_) => Method::Trickle.as_str(),
            Self::Other { method, .. } => method,
        }
    }
}

impl Inbound {
    /// Decodes one text frame.
    ///
    /// A frame with an `id` and a `result` or `error` member is a response;
    /// otherwise a `method` makes it a notification. An `id` on a frame that
    /// carries a `method` but no result is ignored.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;
        let Value::Object(mut obj) = value else {
            return Err(ProtocolError::UnknownShape);
        };

        let id = obj.get("id").and_then(id_text);
        if let Some(id) = id {
            if obj.contains_key("result") || obj.contains_key("error") {
                let outcome = match obj.remove("error") {
                    Some(err) if !err.is_null() => Err(serde_json::from_value::<RpcError>(err)
                        .map_err(ProtocolError::InvalidErrorObject)?),
                    _ => Ok(obj.remove("result").unwrap_or(Value::Null)),
                };
                return Ok(Self::Response { id, outcome });
            }
        }

        let Some(Value::String(method)) = obj.remove("method") else {
            return Err(ProtocolError::UnknownShape);
        };
        let params = obj.remove("params").unwrap_or(Value::Null);
        Notification::from_parts(method, params).map(Self::Notification)
    }
}

impl Notification {
    fn from_parts(method: String, params: Value) -> Result<Self, ProtocolError> {
        match Method::from_name(&method) {
            Some(Method::Offer) => description(Method::Offer, params).map(Self::Offer),
            Some(Method::Answer) => description(Method::Answer, params).map(Self::Answer),
            Some(Method::Trickle) => {
                let Value::Object(mut obj) = params else {
                    return Err(ProtocolError::MissingField {
                        method: Method::Trickle.as_str(),
                        field: "candidate",
                    });
                };
                let raw = obj.remove("candidate").ok_or(ProtocolError::MissingField {
                    method: Method::Trickle.as_str(),
                    field: "candidate",
                })?;
                let candidate = match raw {
                    // Some coordinators send the bare candidate line.
                    Value::String(line) => IceCandidateInit::new(line),
                    other => serde_json::from_value(other).map_err(|source| {
                        ProtocolError::InvalidParams {
                            method: Method::Trickle.as_str(),
                            source,
                        }
                    })?,
                };
                Ok(Self::Trickle(candidate))
            }
            Some(Method::Join) | None => Ok(Self::Other { method, params }),
        }
    }
}

/// Description payloads (params or a response result) arrive either bare or
/// wrapped as `{"desc": {...}}`.
pub fn description(method: Method, params: Value) -> Result<SessionDescription, ProtocolError> {
    let inner = match params {
        Value::Object(mut obj) if obj.contains_key("desc") => {
            obj.remove("desc").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner).map_err(|source| ProtocolError::InvalidParams {
        method: method.as_str(),
        source,
    })
}

fn id_text(id: &Value) -> Option<RequestId> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---- Outbound ---------------------------------------------------------------

#[derive(Serialize)]
struct OutFrame<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    method: &'static str,
    params: &'a Value,
}

/// `{"id": id, "method": method, "params": params}`
pub fn encode_request(id: &str, method: Method, params: &Value) -> Result<String, ProtocolError> {
    serde_json::to_string(&OutFrame {
        id: Some(id),
        method: method.as_str(),
        params,
    })
    .map_err(ProtocolError::Encode)
}

/// `{"method": method, "params": params}` with no `id`.
pub fn encode_notification(method: Method, params: &Value) -> Result<String, ProtocolError> {
    serde_json::to_string(&OutFrame {
        id: None,
        method: method.as_str(),
        params,
    })
    .map_err(ProtocolError::Encode)
}

/// Params of the `join` request.
#[derive(Debug, Serialize)]
pub struct JoinParams<'a> {
    pub offer: &'a SessionDescription,
    pub sid: &'a str,
}

/// Params of `offer` requests and `answer` notifications.
#[derive(Debug, Serialize)]
pub struct DescParams<'a> {
    pub desc: &'a SessionDescription,
}

/// Params of the `trickle` notification.
#[derive(Debug, Serialize)]
pub struct TrickleParams<'a> {
    pub candidate: &'a IceCandidateInit,
}

pub fn to_params<T: Serialize>(params: &T) -> Result<Value, ProtocolError> {
    serde_json::to_value(params).map_err(ProtocolError::Encode)
}

/// Builds a response frame; used by coordinators and test doubles.
pub fn encode_response(id: &str, result: Value) -> Result<String, ProtocolError> {
    let mut obj = Map::new();
    obj.insert("id".into(), Value::String(id.to_owned()));
    obj.insert("result".into(), result);
    serde_json::to_string(&Value::Object(obj)).map_err(ProtocolError::Encode)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn response_with_result_is_correlated() {
        let frame = r#"{"id":"a1","result":{"type":"answer","sdp":"v=0"}}"#;
        match Inbound::parse(frame).unwrap() {
            Inbound::Response { id, outcome } => {
                assert_eq!(id, "a1");
                assert_eq!(outcome.unwrap(), json!({"type":"answer","sdp":"v=0"}));
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn numeric_ids_are_accepted() {
        match Inbound::parse(r#"{"id":42,"result":null}"#).unwrap() {
            Inbound::Response { id, outcome } => {
                assert_eq!(id, "42");
                assert_eq!(outcome.unwrap(), Value::Null);
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn error_member_becomes_rpc_error() {
        let frame = r#"{"id":"a2","error":{"code":-32000,"message":"no such session"}}"#;
        match Inbound::parse(frame).unwrap() {
            Inbound::Response { outcome, .. } => {
                let err = outcome.unwrap_err();
                assert_eq!(err.code, -32000);
                assert_eq!(err.message, "no such session");
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn offer_notification_accepts_bare_and_wrapped_descriptions() {
        let bare = r#"{"method":"offer","params":{"type":"offer","sdp":"o2"}}"#;
        let wrapped = r#"{"method":"offer","params":{"desc":{"type":"offer","sdp":"o2"}}}"#;
        for frame in [bare, wrapped] {
            assert_eq!(
                Inbound::parse(frame).unwrap(),
                Inbound::Notification(Notification::Offer(SessionDescription::offer("o2")))
            );
        }
    }

    #[test]
    fn trickle_notification_carries_candidate() {
        let frame = r#"{"method":"trickle","params":{"candidate":{"candidate":"c1","sdpMid":"0"}}}"#;
        match Inbound::parse(frame).unwrap() {
            Inbound::Notification(Notification::Trickle(c)) => {
                assert_eq!(c.candidate, "c1");
                assert_eq!(c.sdp_mid.as_deref(), Some("0"));
            }
            other => panic!("expected trickle, got {other:?}"),
        }
    }

    #[test]
    fn trickle_without_candidate_is_rejected() {
        let err = Inbound::parse(r#"{"method":"trickle","params":{}}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingField {
                field: "candidate",
                ..
            }
        ));
    }

    #[test]
    fn unknown_methods_are_kept_as_other() {
        match Inbound::parse(r#"{"method":"kick","params":{"why":"busy"}}"#).unwrap() {
            Inbound::Notification(Notification::Other { method, params }) => {
                assert_eq!(method, "kick");
                assert_eq!(params, json!({"why":"busy"}));
            }
            other => panic!("expected other, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            Inbound::parse("not json"),
            Err(ProtocolError::InvalidJson(_))
        ));
        assert!(matches!(
            Inbound::parse("[1,2]"),
            Err(ProtocolError::UnknownShape)
        ));
        assert!(matches!(
            Inbound::parse(r#"{"id":"x"}"#),
            Err(ProtocolError::UnknownShape)
        ));
        assert!(matches!(
            Inbound::parse(r#"{"method":"offer","params":{"sdp":1}}"#),
            Err(ProtocolError::InvalidParams { method: "offer", .. })
        ));
    }

    #[test]
    fn request_and_notification_encoding() {
        let desc = SessionDescription::offer("o1");
        let params = to_params(&JoinParams {
            offer: &desc,
            sid: "abc",
        })
        .unwrap();
        let req = encode_request("id-1", Method::Join, &params).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&req).unwrap(),
            json!({"id":"id-1","method":"join","params":{"offer":{"type":"offer","sdp":"o1"},"sid":"abc"}})
        );

        let cand = IceCandidateInit::new("c1");
        let note = encode_notification(
            Method::Trickle,
            &to_params(&TrickleParams { candidate: &cand }).unwrap(),
        )
        .unwrap();
        let value: Value = serde_json::from_str(&note).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["method"], "trickle");
        assert_eq!(value["params"]["candidate"]["candidate"], "c1");
    }
}
