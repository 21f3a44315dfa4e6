// Test assertions for dispatch outcomes and responses

use crate::MockResponse;
use serde_json::Value;
use switchyard_core::{DispatchState, HttpResponse};

/// Assert that dispatch invoked a specific action
pub fn assert_invoked(state: &DispatchState, expected: &str) {
    assert_eq!(
        state,
        &DispatchState::Invoked {
            action: expected.to_string()
        },
        "Expected {} to be invoked, got {:?}",
        expected,
        state
    );
}

/// Assert that dispatch deferred to `next()`
pub fn assert_deferred(state: &DispatchState) {
    assert!(
        state.is_deferred(),
        "Expected dispatch to defer, got {:?}",
        state
    );
}

/// Assert that dispatch failed with a specific status code
pub fn assert_failed(state: &DispatchState, expected_status: u16) {
    match state {
        DispatchState::Failed { status, .. } => assert_eq!(
            *status, expected_status,
            "Expected failure status {}, got {}",
            expected_status, status
        ),
        other => panic!("Expected dispatch to fail, got {:?}", other),
    }
}

/// Assert that the last emission used the given mode, status and content
pub fn assert_emitted(response: &MockResponse, mode: &str, status: Option<u16>, content: &Value) {
    let last = response
        .last()
        .unwrap_or_else(|| panic!("Expected an emission, but nothing was sent"));
    assert_eq!(last.mode, mode, "Expected mode '{}', got '{}'", mode, last.mode);
    assert_eq!(
        last.status, status,
        "Expected status {:?}, got {:?}",
        status, last.status
    );
    assert_eq!(&last.content, content, "Emitted content does not match");
}

/// Assert that an [`HttpResponse`] has a specific status code
pub fn assert_status(response: &HttpResponse, expected: u16) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}",
        expected, response.status
    );
}

/// Assert that an [`HttpResponse`] body is JSON equal to `expected`
pub fn assert_json(response: &HttpResponse, expected: &Value) {
    let actual = response
        .json()
        .unwrap_or_else(|e| panic!("Failed to parse response body as JSON: {}", e));
    assert_eq!(&actual, expected, "JSON bodies do not match");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchyard_core::Response;

    #[test]
    fn test_assert_states() {
        assert_invoked(
            &DispatchState::Invoked {
                action: "listAction".into(),
            },
            "listAction",
        );
        assert_deferred(&DispatchState::Deferred);
        assert_failed(
            &DispatchState::Failed {
                action: None,
                status: 500,
            },
            500,
        );
    }

    #[test]
    #[should_panic(expected = "Expected dispatch to fail")]
    fn test_assert_failed_rejects_deferred() {
        assert_failed(&DispatchState::Deferred, 500);
    }

    #[test]
    fn test_assert_http_response() {
        let mut res = HttpResponse::new();
        res.emit("json", Some(201), json!({ "ok": true })).unwrap();
        assert_status(&res, 201);
        assert_json(&res, &json!({ "ok": true }));
    }
}
