// Recording router for testing route registration

use switchyard_core::{Handler, HttpMethod, PathPattern, Result, Router};

/// One binding made through [`Router::bind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRoute {
    /// `None` means every verb.
    pub method: Option<HttpMethod>,
    pub pattern: String,
    /// Number of handlers bound, middleware included.
    pub handlers: usize,
}

/// Router that records bindings without serving requests.
///
/// Patterns are still compiled, so malformed patterns fail the same way they
/// would on a real route table.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    routes: Vec<RecordedRoute>,
}

impl RecordingRouter {
    /// Create a new recording router
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded bindings, in order
    pub fn routes(&self) -> &[RecordedRoute] {
        &self.routes
    }

    /// Get the bound patterns, in order
    pub fn patterns(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.pattern.as_str()).collect()
    }

    /// Check if `pattern` was bound for `method`
    pub fn is_bound(&self, method: Option<HttpMethod>, pattern: &str) -> bool {
        self.routes
            .iter()
            .any(|r| r.method == method && r.pattern == pattern)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Router for RecordingRouter {
    fn bind(&mut self, method: Option<HttpMethod>, pattern: &str, handlers: Vec<Handler>) -> Result<()> {
        PathPattern::compile(pattern)?;
        self.routes.push(RecordedRoute {
            method,
            pattern: pattern.to_string(),
            handlers: handlers.len(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::handler;

    #[test]
    fn test_records_bindings() {
        let mut router = RecordingRouter::new();
        let noop = handler(|_req, _res, next| next.call());

        router.post("/user/?", vec![noop.clone()]).unwrap();
        router.all("/user/:id", vec![noop.clone(), noop]).unwrap();

        assert_eq!(router.len(), 2);
        assert!(router.is_bound(Some(HttpMethod::POST), "/user/?"));
        assert!(router.is_bound(None, "/user/:id"));
        assert_eq!(router.routes()[1].handlers, 2);
    }

    #[test]
    fn test_rejects_malformed_pattern() {
        let mut router = RecordingRouter::new();
        assert!(router.all("/user/:", Vec::new()).is_err());
        assert!(router.is_empty());
    }
}
