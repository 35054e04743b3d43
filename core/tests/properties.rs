//! Classification properties over generated status codes and bodies.

use std::io;

use outcome_core::{
    classify, decoder_fn, ClassifierConfig, DecodeError, HttpResponse, JsonDecoder, Outcome,
    TransportError,
};
use proptest::prelude::*;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct SuccessBody {
    success: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ErrorBody {
    error: String,
}

type Classified = Result<Outcome<SuccessBody, ErrorBody>, TransportError>;

fn run(status: u16, body: &str, fallback: bool) -> Classified {
    classify(
        Ok(HttpResponse::new(status, body.to_string())),
        &JsonDecoder::<SuccessBody>::new(),
        &JsonDecoder::<ErrorBody>::new(),
        ClassifierConfig::default().with_fallback(fallback),
    )
}

fn success_json(value: &str) -> String {
    serde_json::json!({ "success": value }).to_string()
}

fn error_json(value: &str) -> String {
    serde_json::json!({ "error": value }).to_string()
}

fn non_2xx() -> impl Strategy<Value = u16> {
    prop_oneof![100u16..200, 300u16..600]
}

fn invalid_status() -> impl Strategy<Value = u16> {
    prop_oneof![0u16..100, 600u16..=u16::MAX]
}

proptest! {
    #[test]
    fn decodable_2xx_is_success(status in 200u16..300, value in ".*", fallback in any::<bool>()) {
        let outcome = run(status, &success_json(&value), fallback).unwrap();
        prop_assert_eq!(outcome.success_body().map(|b| b.success.clone()), Some(value));
    }

    #[test]
    fn error_shaped_2xx_with_fallback_is_server_error(status in 200u16..300, value in ".*") {
        let body = error_json(&value);
        let outcome = run(status, &body, true).unwrap();
        prop_assert_eq!(outcome.status(), Some(status));
        prop_assert_eq!(outcome.error_body().map(|b| b.error.clone()), Some(value));
        prop_assert_eq!(outcome.raw_body(), Some(body.as_str()));
    }

    #[test]
    fn error_shaped_2xx_without_fallback_is_empty_success(status in 200u16..300, value in ".*") {
        let outcome = run(status, &error_json(&value), false).unwrap();
        let empty = matches!(outcome, Outcome::Success { body: None });
        prop_assert!(empty, "got {:?}", outcome);
    }

    #[test]
    fn undecodable_2xx_is_empty_success(status in 200u16..300, body in "[^{\\[]*", fallback in any::<bool>()) {
        let outcome = run(status, &body, fallback).unwrap();
        let empty = matches!(outcome, Outcome::Success { body: None });
        prop_assert!(empty, "got {:?}", outcome);
    }

    #[test]
    fn empty_failure_is_bodiless_server_error(status in non_2xx()) {
        let outcome = run(status, "", true).unwrap();
        prop_assert!(outcome.error_body().is_none());
        prop_assert_eq!(outcome.status(), Some(status));
        prop_assert_eq!(outcome.raw_body(), Some(""));
    }

    #[test]
    fn error_decodable_failure_is_server_error(status in non_2xx(), value in ".*") {
        let body = error_json(&value);
        let outcome = run(status, &body, true).unwrap();
        prop_assert_eq!(outcome.status(), Some(status));
        prop_assert_eq!(outcome.error_body().map(|b| b.error.clone()), Some(value));
        prop_assert_eq!(outcome.raw_body(), Some(body.as_str()));
    }

    #[test]
    fn invalid_status_is_network_error(status in invalid_status(), body in ".*", fallback in any::<bool>()) {
        let outcome = run(status, &body, fallback).unwrap();
        prop_assert!(
            matches!(outcome, Outcome::NetworkError(TransportError::InvalidStatus(s)) if s == status),
            "status {} produced {:?}", status, outcome
        );
    }

    #[test]
    fn server_error_status_is_always_valid(status in any::<u16>(), body in ".*") {
        if let Outcome::ServerError { status: reported, .. } = run(status, &body, true).unwrap() {
            prop_assert!((100..=599).contains(&reported));
        }
    }

    #[test]
    fn classification_is_idempotent(status in 100u16..600, body in ".*", fallback in any::<bool>()) {
        let first = run(status, &body, fallback).unwrap();
        let second = run(status, &body, fallback).unwrap();
        prop_assert_eq!(first.is_success(), second.is_success());
        prop_assert_eq!(first.status(), second.status());
        prop_assert_eq!(first.success_body(), second.success_body());
        prop_assert_eq!(first.error_body(), second.error_body());
        prop_assert_eq!(first.raw_body(), second.raw_body());
    }
}

#[test]
fn recognized_failure_keeps_the_original_cause() {
    let inner = io::Error::new(io::ErrorKind::TimedOut, "deadline elapsed");

    let outcome: Outcome<SuccessBody, ErrorBody> = classify(
        Err(TransportError::Io(inner)),
        &JsonDecoder::<SuccessBody>::new(),
        &JsonDecoder::<ErrorBody>::new(),
        ClassifierConfig::default(),
    )
    .unwrap();

    match outcome {
        Outcome::NetworkError(TransportError::Io(cause)) => {
            assert_eq!(cause.kind(), io::ErrorKind::TimedOut);
            assert_eq!(cause.to_string(), "deadline elapsed");
        }
        other => panic!("expected network error, got {other:?}"),
    }
}

#[test]
fn decoders_are_only_consulted_with_buffered_text() {
    let seen = std::sync::Mutex::new(Vec::new());
    let success = decoder_fn(|body: &str| -> Result<SuccessBody, DecodeError> {
        seen.lock().unwrap().push(("success", body.to_string()));
        Err(DecodeError::Message("never".to_string()))
    });
    let error = decoder_fn(|body: &str| -> Result<ErrorBody, DecodeError> {
        seen.lock().unwrap().push(("error", body.to_string()));
        Err(DecodeError::Message("never".to_string()))
    });

    let outcome = classify(
        Ok(HttpResponse::new(200, "payload".to_string())),
        &success,
        &error,
        ClassifierConfig::default(),
    )
    .unwrap();

    assert!(matches!(outcome, Outcome::Success { body: None }));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("success", "payload".to_string()), ("error", "payload".to_string())]
    );
}
