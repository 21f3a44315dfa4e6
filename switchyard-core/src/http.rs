// HTTP request and response types seen by controllers

use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// HTTP methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
        HttpMethod::HEAD,
        HttpMethod::OPTIONS,
    ];

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The slice of a host request the router looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    /// Path plus optional query string and fragment, as received.
    pub url: String,
    /// Route parameters filled in by the host router.
    pub params: HashMap<String, String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Get a route parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The URL without its query string or fragment.
    pub fn path(&self) -> &str {
        match self.url.find(['?', '#']) {
            Some(idx) => &self.url[..idx],
            None => &self.url,
        }
    }

    /// Parse the query string into a map. Later keys overwrite earlier ones.
    pub fn query(&self) -> HashMap<String, String> {
        let Some((_, rest)) = self.url.split_once('?') else {
            return HashMap::new();
        };
        let query = rest.split('#').next().unwrap_or("");

        query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (decode(key), decode(value))
            })
            .collect()
    }

    pub fn http_method(&self) -> Option<HttpMethod> {
        HttpMethod::from_str(&self.method)
    }

    /// The conventional verb action name, e.g. `getAction` for `GET`.
    pub fn method_action(&self) -> String {
        crate::action_name(&self.method.to_lowercase())
    }

    pub fn is_method(&self, method: HttpMethod) -> bool {
        self.method.eq_ignore_ascii_case(method.as_str())
    }
}

pub(crate) fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// The emission side of a host response object.
///
/// Emission functions are addressed by name (`"json"`, `"jsonp"`, ...), the
/// way a controller's `res_func` selects its default mode.
pub trait Response {
    /// Emit `content` through the emission function named `mode`, with an
    /// explicit status when `status` is given.
    fn emit(&mut self, mode: &str, status: Option<u16>, content: Value) -> Result<()>;

    /// Render a template with `data`.
    fn render(&mut self, template: &str, data: Value) -> Result<()> {
        let _ = data;
        Err(Error::handler(format!(
            "no template renderer available for '{}'",
            template
        )))
    }

    /// Whether the response has already been completed.
    fn is_complete(&self) -> bool {
        false
    }
}

/// Template renderer used by [`HttpResponse::render`].
pub type Renderer = Arc<dyn Fn(&str, &Value) -> Result<String> + Send + Sync>;

/// A buffered response implementing the common emission modes.
#[derive(Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Name of the JSONP callback used by the `jsonp` mode.
    pub jsonp_callback: String,
    complete: bool,
    renderer: Option<Renderer>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &String::from_utf8_lossy(&self.body))
            .field("complete", &self.complete)
            .finish()
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpResponse {
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
            jsonp_callback: "callback".to_string(),
            complete: false,
            renderer: None,
        }
    }

    pub fn with_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<String> + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn with_jsonp_callback(mut self, name: impl Into<String>) -> Self {
        self.jsonp_callback = name.into();
        self
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or("")
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    fn finish(&mut self, status: Option<u16>, content_type: &str, body: Vec<u8>) -> Result<()> {
        if let Some(code) = status {
            http::StatusCode::from_u16(code).map_err(|_| Error::InvalidStatus(code))?;
            self.status = code;
        }
        self.headers
            .insert("Content-Type".to_string(), content_type.to_string());
        self.body = body;
        self.complete = true;
        Ok(())
    }
}

fn text_of(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Response for HttpResponse {
    fn emit(&mut self, mode: &str, status: Option<u16>, content: Value) -> Result<()> {
        match mode {
            "json" => {
                let body = serde_json::to_vec(&content)?;
                self.finish(status, "application/json", body)
            }
            "jsonp" => {
                let payload = serde_json::to_string(&content)?;
                let callback = self.jsonp_callback.clone();
                let body = format!(
                    "/**/ typeof {cb} === 'function' && {cb}({payload});",
                    cb = callback
                );
                self.finish(status, "text/javascript; charset=utf-8", body.into_bytes())
            }
            "send" => match content {
                Value::String(s) => self.finish(status, "text/html; charset=utf-8", s.into_bytes()),
                other => {
                    let body = serde_json::to_vec(&other)?;
                    self.finish(status, "application/json", body)
                }
            },
            "text" => {
                let body = text_of(&content).into_bytes();
                self.finish(status, "text/plain; charset=utf-8", body)
            }
            "html" => {
                let body = text_of(&content).into_bytes();
                self.finish(status, "text/html; charset=utf-8", body)
            }
            other => Err(Error::UnknownResponseMode(other.to_string())),
        }
    }

    fn render(&mut self, template: &str, data: Value) -> Result<()> {
        let renderer = self.renderer.clone().ok_or_else(|| {
            Error::handler(format!("no template renderer available for '{}'", template))
        })?;
        let html = renderer(template, &data)?;
        self.finish(None, "text/html; charset=utf-8", html.into_bytes())
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

/// The continuation handed to every handler: yields control to the next
/// handler in the host chain. Consumed on call, so it runs at most once.
pub struct Next<'a> {
    inner: Box<dyn FnOnce() + 'a>,
}

impl<'a> Next<'a> {
    pub fn new(f: impl FnOnce() + 'a) -> Self {
        Self { inner: Box::new(f) }
    }

    /// A continuation that does nothing.
    pub fn noop() -> Next<'static> {
        Next::new(|| {})
    }

    pub fn call(self) {
        (self.inner)()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_method_round_trip_names() {
        assert_eq!(HttpMethod::from_str("get"), Some(HttpMethod::GET));
        assert_eq!(HttpMethod::from_str("Delete"), Some(HttpMethod::DELETE));
        assert_eq!(HttpMethod::from_str("BREW"), None);
        assert_eq!(HttpMethod::PATCH.to_string(), "PATCH");
    }

    #[test]
    fn test_request_path_strips_query_and_fragment() {
        assert_eq!(HttpRequest::new("GET", "/users/5?x=1").path(), "/users/5");
        assert_eq!(HttpRequest::new("GET", "/users#top").path(), "/users");
        assert_eq!(HttpRequest::new("GET", "/users").path(), "/users");
    }

    #[test]
    fn test_request_query() {
        let req = HttpRequest::new("GET", "/search?q=rust+lang&page=2&flag#frag");
        let query = req.query();
        assert_eq!(query.get("q"), Some(&"rust lang".to_string()));
        assert_eq!(query.get("page"), Some(&"2".to_string()));
        assert_eq!(query.get("flag"), Some(&String::new()));
        assert!(HttpRequest::new("GET", "/").query().is_empty());
    }

    #[test]
    fn test_method_action() {
        assert_eq!(HttpRequest::new("GET", "/").method_action(), "getAction");
        assert_eq!(HttpRequest::new("POST", "/").method_action(), "postAction");
        assert!(HttpRequest::new("put", "/").is_method(HttpMethod::PUT));
    }

    #[test]
    fn test_json_mode() {
        let mut res = HttpResponse::new();
        res.emit("json", Some(201), json!({"id": 7})).unwrap();
        assert_eq!(res.status, 201);
        assert_eq!(res.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(res.json().unwrap(), json!({"id": 7}));
        assert!(res.is_complete());
    }

    #[test]
    fn test_jsonp_mode() {
        let mut res = HttpResponse::new().with_jsonp_callback("cb");
        res.emit("jsonp", None, json!("hello")).unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.body_str(), "/**/ typeof cb === 'function' && cb(\"hello\");");
    }

    #[test]
    fn test_send_and_text_modes() {
        let mut res = HttpResponse::new();
        res.emit("send", None, json!("<p>hi</p>")).unwrap();
        assert_eq!(res.body_str(), "<p>hi</p>");

        let mut res = HttpResponse::new();
        res.emit("text", Some(202), json!(12)).unwrap();
        assert_eq!(res.body_str(), "12");
        assert_eq!(res.status, 202);
    }

    #[test]
    fn test_unknown_mode_and_bad_status() {
        let mut res = HttpResponse::new();
        assert!(matches!(
            res.emit("xml", None, json!(null)),
            Err(Error::UnknownResponseMode(mode)) if mode == "xml"
        ));
        assert!(matches!(
            res.emit("json", Some(1000), json!(null)),
            Err(Error::InvalidStatus(1000))
        ));
        assert!(!res.is_complete());
    }

    #[test]
    fn test_render_uses_renderer() {
        let mut res = HttpResponse::new()
            .with_renderer(|template, data| Ok(format!("{}:{}", template, data["name"])));
        res.render("hello", json!({"name": "ada"})).unwrap();
        assert_eq!(res.body_str(), "hello:\"ada\"");

        let mut bare = HttpResponse::new();
        assert!(bare.render("hello", json!({})).is_err());
    }

    #[test]
    fn test_next_runs_once() {
        let calls = Cell::new(0);
        let next = Next::new(|| calls.set(calls.get() + 1));
        next.call();
        assert_eq!(calls.get(), 1);
    }
}
