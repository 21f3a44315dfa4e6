//! Action resolution
//!
//! Picks the action that handles a request, in strict order:
//!
//! 1. an override action fixed when the route was attached,
//! 2. the trailing URL segment (`/users/export` -> `exportAction`),
//! 3. the `action` route parameter, where an id-looking value is moved to `id`,
//! 4. the HTTP verb (`getAction`, with `listAction` for id-less GETs).
//!
//! The first stage that selects an action wins. Stages 1 and 3 fail hard with
//! [`Error::NoAction`] when their action is missing; stages 2 and 4 fall
//! through. When no enabled stage fires the result is [`Resolution::PassThrough`].

use crate::{action_name, Actions, Error, HttpRequest, Result, RoutePolicy};
use once_cell::sync::Lazy;
use regex::Regex;
use switchyard_log::debug;

const TARGET: &str = "switchyard::resolver";

/// Digits, or a 24 character hex database object id.
static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]+|[0-9a-fA-F]{24})$").expect("id pattern"));

/// Final path segment, ignoring one trailing slash and any query or fragment.
static TRAILING_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/([^/?#]*)/?(?:[?#].*)?$").expect("trailing segment pattern"));

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Invoke the named action.
    Action(String),
    /// Nothing applies; hand the request to the next handler without error.
    PassThrough,
}

impl Resolution {
    pub fn action(&self) -> Option<&str> {
        match self {
            Resolution::Action(name) => Some(name),
            Resolution::PassThrough => None,
        }
    }
}

/// Whether a value is an id rather than an action name.
pub fn is_id(value: &str) -> bool {
    ID_PATTERN.is_match(value)
}

/// The last path segment of `url`, if it has one.
pub fn trailing_segment(url: &str) -> Option<&str> {
    TRAILING_SEGMENT
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|segment| !segment.is_empty())
}

/// Resolve the action for `req`.
///
/// The request is only modified when an id-valued `action` parameter is
/// resolved to a verb action: the value moves to `params.id`. Failures leave
/// the request untouched.
pub fn resolve<A>(
    override_action: Option<&str>,
    req: &mut HttpRequest,
    policy: &RoutePolicy,
    actions: &A,
) -> Result<Resolution>
where
    A: Actions + ?Sized,
{
    debug!(
        target: TARGET,
        "{} {} override={:?} actionRouting={} restfulRouting={}",
        req.method,
        req.url,
        override_action,
        policy.action_routing,
        policy.restful_routing
    );

    if policy.action_routing {
        if let Some(name) = override_action {
            if actions.has_action(name) {
                debug!(target: TARGET, "mapped by override to {}", name);
                return Ok(Resolution::Action(name.to_string()));
            }
            debug!(target: TARGET, "override action {} does not exist", name);
            return Err(Error::NoAction);
        }

        if let Some(segment) = trailing_segment(&req.url) {
            if !is_id(segment) {
                let candidate = action_name(segment);
                if actions.has_action(&candidate) {
                    debug!(target: TARGET, "mapped by url to {}", candidate);
                    return Ok(Resolution::Action(candidate));
                }
            }
        }

        if let Some(value) = req.param("action").filter(|v| !v.is_empty()) {
            if !is_id(value) {
                let candidate = action_name(value);
                if actions.has_action(&candidate) {
                    debug!(target: TARGET, "mapped by param to {}", candidate);
                    return Ok(Resolution::Action(candidate));
                }
                debug!(target: TARGET, "param action {} does not exist", candidate);
                return Err(Error::NoAction);
            }

            // An id in the action slot: route by verb with it as the id.
            let method_action = req.method_action();
            if !actions.has_action(&method_action) {
                debug!(target: TARGET, "id param without {}", method_action);
                return Err(Error::NoAction);
            }
            if let Some(id) = req.params.remove("action") {
                debug!(target: TARGET, "action param {} treated as id", id);
                req.params.insert("id".to_string(), id);
            }
            return Ok(Resolution::Action(method_action));
        }
    }

    if policy.restful_routing {
        let method_action = req.method_action();
        let has_id = req.param("id").is_some_and(|id| !id.is_empty());

        if method_action == "getAction" && !has_id && actions.has_action("listAction") {
            debug!(target: TARGET, "restful routing mapped to listAction");
            return Ok(Resolution::Action("listAction".to_string()));
        }
        if actions.has_action(&method_action) {
            debug!(target: TARGET, "restful routing mapped to {}", method_action);
            return Ok(Resolution::Action(method_action));
        }
        debug!(target: TARGET, "restful routing found no {}", method_action);
        return Err(Error::NoAction);
    }

    debug!(target: TARGET, "no routing stage applied, passing through");
    Ok(Resolution::PassThrough)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(action_routing: bool, restful_routing: bool) -> RoutePolicy {
        RoutePolicy {
            action_routing,
            restful_routing,
            ..RoutePolicy::default()
        }
    }

    fn get(url: &str) -> HttpRequest {
        HttpRequest::new("GET", url)
    }

    #[test]
    fn test_is_id() {
        assert!(is_id("42"));
        assert!(is_id("507f1f77bcf86cd799439011"));
        assert!(is_id("507F1F77BCF86CD799439011"));
        assert!(!is_id("507f1f77bcf86cd79943901"));
        assert!(!is_id("remove"));
        assert!(!is_id("12a"));
        assert!(!is_id(""));
    }

    #[test]
    fn test_trailing_segment() {
        assert_eq!(trailing_segment("/users/export"), Some("export"));
        assert_eq!(trailing_segment("/users/export/"), Some("export"));
        assert_eq!(trailing_segment("/users/export?x=/y"), Some("export"));
        assert_eq!(trailing_segment("/users/export#top"), Some("export"));
        assert_eq!(trailing_segment("/users/42"), Some("42"));
        assert_eq!(trailing_segment("/"), None);
        assert_eq!(trailing_segment("users"), None);
    }

    #[test]
    fn test_override_selected() {
        let mut req = get("/users");
        let actions = ["removeAction", "listAction"];
        let outcome = resolve(Some("removeAction"), &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("removeAction".into()));
    }

    #[test]
    fn test_missing_override_fails_without_fallback() {
        let mut req = get("/users");
        let actions = ["listAction"];
        let outcome = resolve(Some("removeAction"), &mut req, &policy(true, true), &actions[..]);
        assert!(matches!(outcome, Err(Error::NoAction)));
    }

    #[test]
    fn test_override_ignored_when_action_routing_disabled() {
        let mut req = get("/users");
        let actions = ["removeAction", "listAction"];
        let outcome = resolve(Some("removeAction"), &mut req, &policy(false, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("listAction".into()));
    }

    #[test]
    fn test_url_segment_selected() {
        let mut req = HttpRequest::new("POST", "/users/export?format=csv");
        let actions = ["exportAction", "postAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("exportAction".into()));
    }

    #[test]
    fn test_url_segment_falls_through_when_missing() {
        let mut req = get("/users");
        let actions = ["listAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("listAction".into()));
    }

    #[test]
    fn test_url_segment_wins_over_param() {
        let mut req = get("/users/export").with_param("action", "remove");
        let actions = ["exportAction", "removeAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("exportAction".into()));
    }

    #[test]
    fn test_numeric_url_segment_is_not_an_action() {
        let mut req = get("/users/42").with_param("id", "42");
        let actions = ["42Action", "getAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("getAction".into()));
    }

    #[test]
    fn test_param_action_selected() {
        let mut req = get("/").with_param("action", "remove");
        let actions = ["removeAction", "getAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("removeAction".into()));
    }

    #[test]
    fn test_missing_param_action_fails_without_fallback() {
        let mut req = get("/").with_param("action", "remove");
        let actions = ["getAction", "listAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert!(matches!(outcome, Err(Error::NoAction)));
    }

    #[test]
    fn test_numeric_param_action_becomes_id() {
        let mut req = HttpRequest::new("PUT", "/").with_param("action", "42");
        let actions = ["putAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("putAction".into()));
        assert_eq!(req.param("id"), Some("42"));
        assert_eq!(req.param("action"), None);
    }

    #[test]
    fn test_object_id_param_action_becomes_id() {
        let mut req = get("/").with_param("action", "507f1f77bcf86cd799439011");
        let actions = ["getAction", "listAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        // With the id in place, the id-less list shortcut no longer applies.
        assert_eq!(outcome.unwrap(), Resolution::Action("getAction".into()));
        assert_eq!(req.param("id"), Some("507f1f77bcf86cd799439011"));
    }

    #[test]
    fn test_numeric_param_action_without_verb_action_leaves_request_alone() {
        let mut req = HttpRequest::new("DELETE", "/").with_param("action", "42");
        let actions = ["getAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert!(matches!(outcome, Err(Error::NoAction)));
        assert_eq!(req.param("action"), Some("42"));
        assert_eq!(req.param("id"), None);
    }

    #[test]
    fn test_numeric_param_routes_by_verb_even_without_restful_routing() {
        let mut req = get("/").with_param("action", "7");
        let actions = ["getAction"];
        let outcome = resolve(None, &mut req, &policy(true, false), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("getAction".into()));
    }

    #[test]
    fn test_list_preferred_for_id_less_get() {
        let mut req = get("/");
        let actions = ["getAction", "listAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("listAction".into()));
    }

    #[test]
    fn test_get_with_id_uses_get_action() {
        let mut req = get("/").with_param("id", "5");
        let actions = ["getAction", "listAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("getAction".into()));
    }

    #[test]
    fn test_verb_action_lowercased() {
        let mut req = HttpRequest::new("Post", "/");
        let actions = ["postAction"];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("postAction".into()));
    }

    #[test]
    fn test_missing_verb_action_is_no_action() {
        let mut req = get("/");
        let actions: [&str; 0] = [];
        let outcome = resolve(None, &mut req, &policy(true, true), &actions[..]);
        assert!(matches!(outcome, Err(Error::NoAction)));
    }

    #[test]
    fn test_pass_through_when_restful_disabled() {
        let mut req = get("/");
        let actions = ["getAction"];
        let outcome = resolve(None, &mut req, &policy(true, false), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::PassThrough);
    }

    #[test]
    fn test_param_ignored_when_action_routing_disabled() {
        let mut req = get("/").with_param("action", "remove");
        let actions = ["removeAction", "getAction"];
        let outcome = resolve(None, &mut req, &policy(false, true), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::Action("getAction".into()));

        let outcome = resolve(None, &mut req, &policy(false, false), &actions[..]);
        assert_eq!(outcome.unwrap(), Resolution::PassThrough);
    }
}
