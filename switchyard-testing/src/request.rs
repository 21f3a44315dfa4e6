// Test request builder

use std::collections::HashMap;
use switchyard_core::{HttpMethod, HttpRequest};

/// Builder for [`HttpRequest`] values as a host router would hand them over.
#[derive(Debug, Clone)]
pub struct TestRequest {
    method: String,
    url: String,
    params: HashMap<String, String>,
}

impl TestRequest {
    /// Create a request with any method, including non-standard ones
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            params: HashMap::new(),
        }
    }

    pub fn method(method: HttpMethod, url: impl Into<String>) -> Self {
        Self::new(method.as_str(), url)
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::method(HttpMethod::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::method(HttpMethod::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::method(HttpMethod::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::method(HttpMethod::DELETE, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::method(HttpMethod::PATCH, url)
    }

    /// Set a route parameter
    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    /// Shorthand for the `action` route parameter
    pub fn action(self, value: &str) -> Self {
        self.param("action", value)
    }

    /// Shorthand for the `id` route parameter
    pub fn id(self, value: &str) -> Self {
        self.param("id", value)
    }

    pub fn build(self) -> HttpRequest {
        let mut req = HttpRequest::new(self.method, self.url);
        req.params = self.params;
        req
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request() {
        let req = TestRequest::put("/users/7").action("7").param("draft", "1").build();
        assert_eq!(req.method, "PUT");
        assert_eq!(req.url, "/users/7");
        assert_eq!(req.param("action"), Some("7"));
        assert_eq!(req.param("draft"), Some("1"));
        assert_eq!(req.param("id"), None);
    }
}
