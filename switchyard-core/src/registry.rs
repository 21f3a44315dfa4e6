//! Process-wide record of route values that have already been bound

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;

static GLOBAL: Lazy<RouteRegistry> = Lazy::new(RouteRegistry::new);

/// Set of route values already auto-routed. A route value is bound at most
/// once per registry, however many classes declare it.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routed: Mutex<HashSet<String>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process.
    pub fn global() -> &'static RouteRegistry {
        &GLOBAL
    }

    /// Record `route`. Returns `false` if it was already recorded.
    pub fn claim(&self, route: &str) -> bool {
        self.routed.lock().insert(route.to_string())
    }

    /// Forget `route` so a later auto-route may bind it again.
    pub fn release(&self, route: &str) -> bool {
        self.routed.lock().remove(route)
    }

    pub fn contains(&self, route: &str) -> bool {
        self.routed.lock().contains(route)
    }

    pub fn len(&self) -> usize {
        self.routed.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routed.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_claim_once() {
        let registry = RouteRegistry::new();
        assert!(registry.claim("/user/?:action?"));
        assert!(!registry.claim("/user/?:action?"));
        assert!(registry.contains("/user/?:action?"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_release_allows_claim_again() {
        let registry = RouteRegistry::new();
        assert!(registry.claim("/orders"));
        assert!(registry.release("/orders"));
        assert!(!registry.release("/orders"));
        assert!(registry.is_empty());
        assert!(registry.claim("/orders"));
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let registry = Arc::new(RouteRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.claim("/orders"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
