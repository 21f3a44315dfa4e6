//! Action tables
//!
//! A controller's actions are registered once, by name, into an
//! [`ActionTable`]. The resolver only ever asks the table whether a name
//! exists; the dispatcher looks the handler up by that name.

use crate::{Instance, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Suffix carried by every action method name.
pub const ACTION_SUFFIX: &str = "Action";

/// An action handler. Receives the per-request controller instance, which
/// owns the request, the response and the controller state.
pub type ActionFn<C> = Arc<dyn Fn(&mut Instance<'_, C>) -> Result<()> + Send + Sync>;

/// Append the action suffix unless `name` already carries it.
///
/// ```
/// use switchyard_core::action_name;
///
/// assert_eq!(action_name("list"), "listAction");
/// assert_eq!(action_name("listAction"), "listAction");
/// ```
pub fn action_name(name: &str) -> String {
    if name.len() > ACTION_SUFFIX.len() && name.ends_with(ACTION_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, ACTION_SUFFIX)
    }
}

/// Name lookup used by the resolver.
pub trait Actions {
    fn has_action(&self, name: &str) -> bool;
}

impl Actions for HashSet<String> {
    fn has_action(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl Actions for [&str] {
    fn has_action(&self, name: &str) -> bool {
        self.iter().any(|candidate| *candidate == name)
    }
}

/// Mapping from action name to handler, built once per controller type.
pub struct ActionTable<C> {
    actions: HashMap<String, ActionFn<C>>,
}

impl<C: 'static> ActionTable<C> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Register an action. `"list"` and `"listAction"` both register `listAction`.
    pub fn action<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&mut Instance<'_, C>) -> Result<()> + Send + Sync + 'static,
    {
        self.insert(name, handler);
        self
    }

    /// Register an action in place, replacing any previous one of the same name.
    pub fn insert<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut Instance<'_, C>) -> Result<()> + Send + Sync + 'static,
    {
        self.actions.insert(action_name(name), Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&ActionFn<C>> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.actions
            .keys()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<C: 'static> Actions for ActionTable<C> {
    fn has_action(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<C: 'static> Default for ActionTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for ActionTable<C> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
        }
    }
}

impl<C: 'static> fmt::Debug for ActionTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTable")
            .field("actions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Users;

    #[test]
    fn test_action_name() {
        assert_eq!(action_name("get"), "getAction");
        assert_eq!(action_name("removeAction"), "removeAction");
        assert_eq!(action_name("Action"), "ActionAction");
    }

    #[test]
    fn test_register_and_lookup() {
        let table = ActionTable::<Users>::new()
            .action("list", |_| Ok(()))
            .action("removeAction", |_| Ok(()));

        assert!(table.contains("listAction"));
        assert!(table.contains("removeAction"));
        assert!(!table.contains("list"));
        assert!(table.get("removeAction").is_some());
        assert_eq!(table.names(), vec!["listAction", "removeAction"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_insert_replaces() {
        let mut table = ActionTable::<Users>::new();
        table.insert("get", |_| Ok(()));
        table.insert("getAction", |_| Err(crate::Error::handler("second")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_slice_and_set_lookup() {
        let names = ["getAction", "listAction"];
        assert!(names.as_slice().has_action("listAction"));
        assert!(!names.as_slice().has_action("postAction"));

        let set: HashSet<String> = ["getAction".to_string()].into_iter().collect();
        assert!(set.has_action("getAction"));
    }
}
