//! Declared routes
//!
//! A route value is one or more entries separated by `|`. Each entry is a
//! path pattern, optionally prefixed by the verbs it accepts:
//!
//! ```text
//! [POST] /example/?|/example/:id/?|/examples/:action/?
//! [GET,DELETE] /example/:id
//! ```
//!
//! Entries without a verb prefix accept every verb.

use crate::{Error, HttpMethod, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static VERB_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\[\]]*)\]\s*(\S*)$").expect("verb prefix pattern"));

/// One route pattern and the verbs it is bound for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// `None` binds every verb.
    pub methods: Option<Vec<HttpMethod>>,
    pub path: String,
}

impl RouteEntry {
    pub fn any(path: impl Into<String>) -> Self {
        Self {
            methods: None,
            path: path.into(),
        }
    }

    pub fn with_methods(methods: Vec<HttpMethod>, path: impl Into<String>) -> Self {
        Self {
            methods: Some(methods),
            path: path.into(),
        }
    }
}

impl FromStr for RouteEntry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let entry = s.trim();

        if let Some(caps) = VERB_PREFIX.captures(entry) {
            let methods = caps[1]
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(|m| {
                    HttpMethod::from_str(m)
                        .ok_or_else(|| Error::InvalidRoute(format!("unknown verb '{}' in '{}'", m, entry)))
                })
                .collect::<Result<Vec<_>>>()?;

            if methods.is_empty() {
                return Err(Error::InvalidRoute(format!("empty verb list in '{}'", entry)));
            }

            let path = &caps[2];
            if !path.starts_with('/') {
                return Err(Error::InvalidRoute(format!("path must start with '/': '{}'", entry)));
            }
            return Ok(RouteEntry::with_methods(methods, path));
        }

        if !entry.starts_with('/') || entry.contains(char::is_whitespace) {
            return Err(Error::InvalidRoute(format!("path must start with '/': '{}'", entry)));
        }

        Ok(RouteEntry::any(entry))
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(methods) = &self.methods {
            let verbs: Vec<&str> = methods.iter().map(HttpMethod::as_str).collect();
            write!(f, "[{}] ", verbs.join(","))?;
        }
        f.write_str(&self.path)
    }
}

/// A controller's full route value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    entries: Vec<RouteEntry>,
}

impl RouteSpec {
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::InvalidRoute("a route needs at least one entry".to_string()));
        }
        Ok(Self { entries })
    }

    /// Parse each item as one entry. Items are not split on `|`.
    pub fn from_list<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = items
            .into_iter()
            .map(|item| item.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Every path pattern, in declaration order.
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }
}

impl FromStr for RouteSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_list(s.split('|').filter(|part| !part.trim().is_empty()))
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_entry_accepts_every_verb() {
        let entry: RouteEntry = "/example/:id".parse().unwrap();
        assert_eq!(entry, RouteEntry::any("/example/:id"));
    }

    #[test]
    fn test_verb_prefixed_entry() {
        let entry: RouteEntry = "[POST] /example/?".parse().unwrap();
        assert_eq!(entry.methods, Some(vec![HttpMethod::POST]));
        assert_eq!(entry.path, "/example/?");

        let entry: RouteEntry = "[get, Delete]/example/:id".parse().unwrap();
        assert_eq!(entry.methods, Some(vec![HttpMethod::GET, HttpMethod::DELETE]));
    }

    #[test]
    fn test_invalid_entries() {
        assert!("example".parse::<RouteEntry>().is_err());
        assert!("[BREW] /pot".parse::<RouteEntry>().is_err());
        assert!("[] /pot".parse::<RouteEntry>().is_err());
        assert!("[GET] pot".parse::<RouteEntry>().is_err());
        assert!("/a b".parse::<RouteEntry>().is_err());
    }

    #[test]
    fn test_pipe_separated_spec() {
        let spec: RouteSpec = "[POST] /example/?|/example/:id/?|/examples/:action/?"
            .parse()
            .unwrap();
        assert_eq!(spec.entries().len(), 3);
        assert_eq!(spec.paths(), vec!["/example/?", "/example/:id/?", "/examples/:action/?"]);
        assert_eq!(
            spec.to_string(),
            "[POST] /example/?|/example/:id/?|/examples/:action/?"
        );
    }

    #[test]
    fn test_list_spec_and_empty() {
        let spec = RouteSpec::from_list(["/a", "[PUT] /b"]).unwrap();
        assert_eq!(spec.entries()[1].methods, Some(vec![HttpMethod::PUT]));
        assert!("".parse::<RouteSpec>().is_err());
        assert!(RouteSpec::new(Vec::new()).is_err());
    }
}
