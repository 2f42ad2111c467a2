//! Outcome → HTTP status and JSON body.

use crate::engine::{FailureKind, Outcome};
use axum::http::StatusCode;
use serde_json::{json, Value};

/// Error payload for a tool name that is not registered.
pub const UNKNOWN_TOOL_ERROR: &str = "tool_unknown";

/// Map an outcome to its status code and body. Never fails.
pub fn encode(outcome: &Outcome) -> (StatusCode, Value) {
    match outcome {
        Outcome::Success { value } => (StatusCode::OK, json!({ "result": value })),
        Outcome::Failure { kind, message } => {
            let (status, error) = match kind {
                FailureKind::UnknownTool => (StatusCode::BAD_REQUEST, UNKNOWN_TOOL_ERROR),
                FailureKind::SchemaValidation => (StatusCode::BAD_REQUEST, message.as_str()),
                FailureKind::Timeout => (StatusCode::GATEWAY_TIMEOUT, message.as_str()),
                FailureKind::Overload | FailureKind::Handler | FailureKind::Internal => {
                    (StatusCode::INTERNAL_SERVER_ERROR, message.as_str())
                }
            };
            (status, json!({ "error": error }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_unknown_tool_payload() {
        let outcome = Outcome::failure(FailureKind::UnknownTool, "unknown tool: bogus");
        assert_eq!(
            encode(&outcome),
            (StatusCode::BAD_REQUEST, json!({"error": "tool_unknown"}))
        );
    }

    #[test]
    fn test_failure_statuses() {
        let cases = [
            (FailureKind::SchemaValidation, StatusCode::BAD_REQUEST),
            (FailureKind::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (FailureKind::Overload, StatusCode::INTERNAL_SERVER_ERROR),
            (FailureKind::Handler, StatusCode::INTERNAL_SERVER_ERROR),
            (FailureKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, status) in cases {
            let (got, body) = encode(&Outcome::failure(kind, "boom"));
            assert_eq!(got, status, "{kind}");
            assert_eq!(body, json!({"error": "boom"}));
        }
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            ".*".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::hash_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_success_wraps_value_unchanged(value in arb_json()) {
            let (status, body) = encode(&Outcome::success(value.clone()));
            prop_assert_eq!(status, StatusCode::OK);
            prop_assert_eq!(body, json!({ "result": value }));
        }
    }
}
