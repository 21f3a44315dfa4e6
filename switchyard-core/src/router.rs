// Host router seam and an in-memory express-style route table

use crate::http::decode;
use crate::{Error, HttpMethod, HttpRequest, Next, Response, Result};
use regex::Regex;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use switchyard_log::debug;

/// A route handler: middleware or a controller trampoline.
///
/// Calling `next` hands the request to the following handler.
pub type Handler = Arc<dyn Fn(&mut HttpRequest, &mut dyn Response, Next<'_>) + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut HttpRequest, &mut dyn Response, Next<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The route-binding API of a host framework.
pub trait Router {
    /// Bind `handlers` to `pattern` for one verb, or for every verb when
    /// `method` is `None`.
    fn bind(&mut self, method: Option<HttpMethod>, pattern: &str, handlers: Vec<Handler>) -> Result<()>;

    fn all(&mut self, pattern: &str, handlers: Vec<Handler>) -> Result<()> {
        self.bind(None, pattern, handlers)
    }

    fn get(&mut self, pattern: &str, handlers: Vec<Handler>) -> Result<()> {
        self.bind(Some(HttpMethod::GET), pattern, handlers)
    }

    fn post(&mut self, pattern: &str, handlers: Vec<Handler>) -> Result<()> {
        self.bind(Some(HttpMethod::POST), pattern, handlers)
    }

    fn put(&mut self, pattern: &str, handlers: Vec<Handler>) -> Result<()> {
        self.bind(Some(HttpMethod::PUT), pattern, handlers)
    }

    fn delete(&mut self, pattern: &str, handlers: Vec<Handler>) -> Result<()> {
        self.bind(Some(HttpMethod::DELETE), pattern, handlers)
    }
}

/// A compiled express-style path pattern.
///
/// Supports `:name` and optional `:name?` parameters (an optional parameter
/// also makes its leading `/` optional), `/?` for an optional slash, and `*`
/// for a wildcard captured as parameter `0`, `1`, ... A trailing slash on the
/// request path is always accepted.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

impl PathPattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut out = String::from("^");
        let mut names = Vec::new();
        let mut wildcards = 0;
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '/' if chars.get(i + 1) == Some(&':') => {
                    let (name, optional, end) = read_param(&chars, i + 2, pattern)?;
                    let group = format!("/(?P<{}>[^/]+?)", group_name(&names, &name, pattern)?);
                    if optional {
                        out.push_str(&format!("(?:{})?", group));
                    } else {
                        out.push_str(&group);
                    }
                    names.push(name);
                    i = end;
                }
                '/' if chars.get(i + 1) == Some(&'?') => {
                    out.push_str("/?");
                    i += 2;
                }
                ':' => {
                    let (name, optional, end) = read_param(&chars, i + 1, pattern)?;
                    out.push_str(&format!("(?P<{}>[^/]+?)", group_name(&names, &name, pattern)?));
                    if optional {
                        out.push('?');
                    }
                    names.push(name);
                    i = end;
                }
                '*' => {
                    let name = wildcards.to_string();
                    out.push_str(&format!("(?P<w{}>.*)", wildcards));
                    wildcards += 1;
                    names.push(name);
                    i += 1;
                }
                c => {
                    out.push_str(&regex::escape(&c.to_string()));
                    i += 1;
                }
            }
        }

        if !out.ends_with("/?") {
            out.push_str("/?");
        }
        out.push('$');

        let regex = Regex::new(&out)
            .map_err(|e| Error::InvalidRoute(format!("'{}': {}", pattern, e)))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parameter names in pattern order. Wildcards are named `0`, `1`, ...
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Match a request path, returning the decoded route parameters.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;
        let mut params = HashMap::new();
        let mut wildcard = 0;

        for name in &self.names {
            let group = if name.chars().all(|c| c.is_ascii_digit()) {
                let g = format!("w{}", wildcard);
                wildcard += 1;
                g
            } else {
                name.clone()
            };
            if let Some(value) = caps.name(&group) {
                params.insert(name.clone(), decode(value.as_str()));
            }
        }

        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Read a parameter name starting at `start`. Returns the name, whether it
/// is optional and the index after it.
fn read_param(chars: &[char], start: usize, pattern: &str) -> Result<(String, bool, usize)> {
    let mut end = start;
    while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
        end += 1;
    }
    if end == start {
        return Err(Error::InvalidRoute(format!("empty parameter name in '{}'", pattern)));
    }

    let name: String = chars[start..end].iter().collect();
    let optional = chars.get(end) == Some(&'?');
    Ok((name, optional, if optional { end + 1 } else { end }))
}

fn group_name(existing: &[String], name: &str, pattern: &str) -> Result<String> {
    if existing.iter().any(|n| n == name) {
        return Err(Error::InvalidRoute(format!(
            "duplicate parameter ':{}' in '{}'",
            name, pattern
        )));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(Error::InvalidRoute(format!(
            "parameter ':{}' must not start with a digit in '{}'",
            name, pattern
        )));
    }
    Ok(name.to_string())
}

/// One bound route.
#[derive(Clone)]
pub struct Binding {
    pub method: Option<HttpMethod>,
    pub pattern: PathPattern,
    pub handlers: Vec<Handler>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// An in-memory host router.
///
/// Routes are tried in registration order. Within a route, handlers run in
/// order while each one calls `next`; after the last handler of a route calls
/// `next`, matching continues with the following routes.
#[derive(Default, Debug)]
pub struct RouteTable {
    bindings: Vec<Binding>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Run the request through every matching route.
    ///
    /// Returns `true` if some handler finished the request without calling
    /// `next`, `false` if every handler deferred (or nothing matched).
    /// Route parameters are replaced per matching route.
    pub fn handle(&self, req: &mut HttpRequest, res: &mut dyn Response) -> bool {
        let path = req.path().to_string();
        let method = req.http_method();

        for binding in &self.bindings {
            if binding.method.is_some() && binding.method != method {
                continue;
            }
            let Some(params) = binding.pattern.matches(&path) else {
                continue;
            };

            debug!(
                target: "switchyard::routes",
                "{} {} matched {}",
                req.method,
                path,
                binding.pattern
            );
            req.params = params;

            for handler in &binding.handlers {
                let advanced = Cell::new(false);
                handler(&mut *req, &mut *res, Next::new(|| advanced.set(true)));
                if !advanced.get() {
                    return true;
                }
            }
        }

        false
    }
}

impl Router for RouteTable {
    fn bind(&mut self, method: Option<HttpMethod>, pattern: &str, handlers: Vec<Handler>) -> Result<()> {
        let pattern = PathPattern::compile(pattern)?;
        debug!(
            target: "switchyard::routes",
            "binding {} {} ({} handlers)",
            method.map_or("ALL", |m| m.as_str()),
            pattern,
            handlers.len()
        );
        self.bindings.push(Binding {
            method,
            pattern,
            handlers,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpResponse;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_static_pattern() {
        let p = PathPattern::compile("/users").unwrap();
        assert_eq!(p.matches("/users"), Some(HashMap::new()));
        assert_eq!(p.matches("/users/"), Some(HashMap::new()));
        assert!(p.matches("/users/5").is_none());
        assert!(p.matches("/posts").is_none());
    }

    #[test]
    fn test_action_and_optional_id() {
        let p = PathPattern::compile("/example/:action/:id?").unwrap();
        assert_eq!(p.matches("/example/edit"), Some(params(&[("action", "edit")])));
        assert_eq!(
            p.matches("/example/edit/5"),
            Some(params(&[("action", "edit"), ("id", "5")]))
        );
        assert!(p.matches("/example").is_none());
        assert!(p.matches("/example/edit/5/extra").is_none());
    }

    #[test]
    fn test_optional_slash_then_optional_action() {
        let p = PathPattern::compile("/example/?:action?").unwrap();
        assert_eq!(p.matches("/example"), Some(HashMap::new()));
        assert_eq!(p.matches("/example/"), Some(HashMap::new()));
        assert_eq!(p.matches("/example/list"), Some(params(&[("action", "list")])));
        assert!(p.matches("/example/list/5").is_none());
    }

    #[test]
    fn test_wildcard_and_decoding() {
        let p = PathPattern::compile("/files/*").unwrap();
        assert_eq!(p.names(), &["0".to_string()]);
        assert_eq!(p.matches("/files/a/b.txt"), Some(params(&[("0", "a/b.txt")])));

        let p = PathPattern::compile("/tags/:name").unwrap();
        assert_eq!(p.matches("/tags/rust%20lang"), Some(params(&[("name", "rust lang")])));
    }

    #[test]
    fn test_literal_characters_escaped() {
        let p = PathPattern::compile("/v1.0/items").unwrap();
        assert!(p.matches("/v1.0/items").is_some());
        assert!(p.matches("/v1x0/items").is_none());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(PathPattern::compile("/users/:").is_err());
        assert!(PathPattern::compile("/:id/:id").is_err());
        assert!(PathPattern::compile("/:1st").is_err());
    }

    fn responder(body: &'static str) -> Handler {
        handler(move |_req, res, _next| {
            res.emit("text", None, json!(body)).unwrap();
        })
    }

    fn deferring() -> Handler {
        handler(|_req, _res, next| next.call())
    }

    #[test]
    fn test_table_runs_first_finishing_handler() {
        let mut table = RouteTable::new();
        table.get("/a", vec![responder("get")]).unwrap();
        table.all("/a", vec![responder("all")]).unwrap();

        let mut res = HttpResponse::new();
        assert!(table.handle(&mut HttpRequest::new("GET", "/a"), &mut res));
        assert_eq!(res.body_str(), "get");

        let mut res = HttpResponse::new();
        assert!(table.handle(&mut HttpRequest::new("POST", "/a"), &mut res));
        assert_eq!(res.body_str(), "all");
    }

    #[test]
    fn test_table_next_advances_to_following_route() {
        let mut table = RouteTable::new();
        table.all("/a/:x", vec![deferring(), deferring()]).unwrap();
        table.all("/a/:y", vec![responder("second")]).unwrap();

        let mut req = HttpRequest::new("GET", "/a/1?q=2");
        let mut res = HttpResponse::new();
        assert!(table.handle(&mut req, &mut res));
        assert_eq!(res.body_str(), "second");
        assert_eq!(req.param("y"), Some("1"));
        assert_eq!(req.param("x"), None);
    }

    #[test]
    fn test_table_unmatched() {
        let mut table = RouteTable::new();
        table.all("/a", vec![deferring()]).unwrap();
        let mut res = HttpResponse::new();
        assert!(!table.handle(&mut HttpRequest::new("GET", "/a"), &mut res));
        assert!(!table.handle(&mut HttpRequest::new("GET", "/b"), &mut res));
        assert_eq!(table.len(), 1);
    }
}
