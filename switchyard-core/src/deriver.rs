//! Default routes derived from a controller's conventional name
//!
//! `UserController` (or `user_controller.rs`, or `users`) yields the roots
//! `/user` and `/users`, each bound as `<root>/:action/:id?` and
//! `<root>/?:action?`.

use crate::route_spec::{RouteEntry, RouteSpec};
use crate::Inflector;
use switchyard_log::debug;

const CONTROLLER_SUFFIX: &str = "controller";

/// Reduce a controller name or source file name to its route base name.
///
/// Strips any directory, a file extension and a case-insensitive
/// `controller` suffix, then lowercases. Returns `None` when nothing is left,
/// which is also the case for the bare word `controller`.
///
/// ```
/// use switchyard_core::deriver::base_name;
///
/// assert_eq!(base_name("UserController").as_deref(), Some("user"));
/// assert_eq!(base_name("src/controllers/order_controller.rs").as_deref(), Some("order"));
/// assert_eq!(base_name("Controller"), None);
/// ```
pub fn base_name(name: &str) -> Option<String> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match file.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => file,
    };

    let lower = stem.trim().to_lowercase();
    let without_suffix = lower.strip_suffix(CONTROLLER_SUFFIX).unwrap_or(&lower);
    let base = without_suffix.trim_end_matches(['_', '-', '.']);

    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

/// The two patterns bound per route root.
pub fn root_patterns(root: &str) -> [String; 2] {
    [format!("{}/:action/:id?", root), format!("{}/?:action?", root)]
}

/// Derive the default route for a controller.
///
/// `plural` overrides the inflector's plural form.
pub fn derive_route(name: &str, plural: Option<&str>, inflector: &dyn Inflector) -> Option<RouteSpec> {
    let Some(base) = base_name(name) else {
        debug!(target: "switchyard::routes", "no route derived for '{}'", name);
        return None;
    };

    let singular = inflector.singularize(&base);
    let plural = plural
        .map(str::to_lowercase)
        .unwrap_or_else(|| inflector.pluralize(&singular));

    let mut roots = vec![format!("/{}", singular)];
    if plural != singular {
        roots.push(format!("/{}", plural));
    }

    let entries: Vec<RouteEntry> = roots
        .iter()
        .flat_map(|root| root_patterns(root))
        .map(RouteEntry::any)
        .collect();

    let spec = RouteSpec::new(entries).ok()?;
    debug!(target: "switchyard::routes", "derived route {} for '{}'", spec, name);
    Some(spec)
}
