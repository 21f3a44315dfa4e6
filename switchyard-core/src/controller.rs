//! Controller declaration and registration
//!
//! A [`Controller`] type declares its conventional name and its actions. It
//! is turned into a [`ControllerClass`] once, at startup: the class holds the
//! routing policy, the action table, the derived or declared route and any
//! middleware. The class then hands out the dispatch trampoline
//! ([`ControllerClass::attach`]) and binds its routes
//! ([`ControllerClass::auto_route`]).

use crate::deriver::derive_route;
use crate::route_spec::RouteSpec;
use crate::{
    ActionTable, DispatchState, EnglishInflector, Error, Handler, HttpRequest, Inflector, Instance,
    Next, PathPattern, Response, Result, RouteRegistry, Router, SwitchyardConfig, action_name,
    handler,
};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use switchyard_log::{debug, info, warn};

/// Class-level routing flags. Immutable once the class is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Resolve actions from override names, the URL and the `action` param.
    pub action_routing: bool,
    /// Fall back to verb actions.
    pub restful_routing: bool,
    /// Bind routes on registration.
    pub auto_routing: bool,
    /// Explicit route. When absent and auto routing is on, one is derived.
    pub route: Option<RouteSpec>,
    /// Default emission mode for `send`.
    pub res_func: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::from_config(&SwitchyardConfig::default())
    }
}

impl RoutePolicy {
    pub fn from_config(config: &SwitchyardConfig) -> Self {
        Self {
            action_routing: config.action_routing,
            restful_routing: config.restful_routing,
            auto_routing: config.auto_routing,
            route: None,
            res_func: config.res_func.clone(),
        }
    }
}

/// A controller type.
///
/// The type itself is the per-request state: a fresh `Default` value is
/// created for every dispatched request.
///
/// ```
/// use switchyard_core::{ActionTable, Controller};
///
/// #[derive(Default)]
/// struct UserController;
///
/// impl Controller for UserController {
///     const NAME: &'static str = "UserController";
///
///     fn actions() -> ActionTable<Self> {
///         ActionTable::<Self>::new()
///             .action("list", |this| this.send("all users", None, None))
///             .action("get", |this| {
///                 let id = this.req.param("id").unwrap_or_default().to_string();
///                 this.send(id, None, None)
///             })
///     }
/// }
/// ```
pub trait Controller: Default + Send + 'static {
    /// Conventional name the default route is derived from, such as
    /// `"UserController"` or the controller's source file name.
    const NAME: &'static str;

    /// Plural form for the derived route, when the inflector gets it wrong.
    const PLURAL: Option<&'static str> = None;

    fn actions() -> ActionTable<Self>;

    fn policy() -> RoutePolicy {
        RoutePolicy::default()
    }
}

/// A declared controller: policy, actions, route and middleware.
pub struct ControllerClass<C> {
    name: &'static str,
    policy: RoutePolicy,
    actions: ActionTable<C>,
    middleware: Vec<Handler>,
    expose_stack: bool,
}

impl<C: Controller> ControllerClass<C> {
    /// Declare `C` with its own policy and the default inflector.
    pub fn declare() -> Result<Arc<Self>> {
        Self::builder().build()
    }

    pub fn builder() -> ClassBuilder<C> {
        ClassBuilder::new()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    pub fn route(&self) -> Option<&RouteSpec> {
        self.policy.route.as_ref()
    }

    pub fn actions(&self) -> &ActionTable<C> {
        &self.actions
    }

    pub(crate) fn expose_stack(&self) -> bool {
        self.expose_stack
    }

    /// The dispatch trampoline, optionally locked to one action.
    ///
    /// `override_action` may be given with or without the `Action` suffix.
    pub fn attach(self: &Arc<Self>, override_action: Option<&str>) -> Handler {
        let class = Arc::clone(self);
        let override_action = override_action.map(action_name);

        handler(move |req, res, next| {
            class.dispatch(override_action.as_deref(), req, res, next);
        })
    }

    /// Create the per-request instance without running it.
    pub fn instance<'a>(
        &'a self,
        req: &'a mut HttpRequest,
        res: &'a mut dyn Response,
        next: Next<'a>,
    ) -> Instance<'a, C> {
        Instance::new(self, req, res, next)
    }

    /// Resolve and run one request.
    pub fn dispatch(
        &self,
        override_action: Option<&str>,
        req: &mut HttpRequest,
        res: &mut dyn Response,
        next: Next<'_>,
    ) -> DispatchState {
        self.instance(req, res, next).dispatch(override_action)
    }

    /// Bind this class's routes on `router` through the process-wide registry.
    ///
    /// Returns `Ok(false)` when auto routing is off, no route is known, or the
    /// route value was already bound.
    pub fn auto_route(self: &Arc<Self>, router: &mut dyn Router) -> Result<bool> {
        self.auto_route_with(RouteRegistry::global(), router)
    }

    pub fn auto_route_with(
        self: &Arc<Self>,
        registry: &RouteRegistry,
        router: &mut dyn Router,
    ) -> Result<bool> {
        if !self.policy.auto_routing {
            return Ok(false);
        }
        let Some(route) = &self.policy.route else {
            debug!(target: "switchyard::routes", "{} has no route to bind", self.name);
            return Ok(false);
        };

        // Every path must compile before the router is touched, so a bad
        // entry cannot leave the earlier ones bound.
        for entry in route.entries() {
            PathPattern::compile(&entry.path)?;
        }

        let key = route.to_string();
        if !registry.claim(&key) {
            debug!(target: "switchyard::routes", "route {} already bound", key);
            return Ok(false);
        }

        info!(target: "switchyard::routes", "Autorouting {} for route {}", self.name, key);

        if let Err(err) = self.bind_entries(route, router) {
            registry.release(&key);
            warn!(target: "switchyard::routes", "Failed to bind route {}: {}", key, err);
            return Err(err);
        }

        Ok(true)
    }

    fn bind_entries(self: &Arc<Self>, route: &RouteSpec, router: &mut dyn Router) -> Result<()> {
        let mut handlers = self.middleware.clone();
        handlers.push(self.attach(None));

        for entry in route.entries() {
            match &entry.methods {
                None => router.all(&entry.path, handlers.clone())?,
                Some(methods) => {
                    for method in methods {
                        router.bind(Some(*method), &entry.path, handlers.clone())?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl<C> fmt::Debug for ControllerClass<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerClass")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

enum Middleware {
    Handler(Handler),
    Named(String),
}

/// Builder for a [`ControllerClass`].
pub struct ClassBuilder<C> {
    name: &'static str,
    plural: Option<String>,
    policy: RoutePolicy,
    expose_stack: bool,
    inflector: Box<dyn Inflector>,
    middleware: Vec<Middleware>,
    class_handlers: HashMap<String, Handler>,
    _controller: PhantomData<fn() -> C>,
}

impl<C: Controller> ClassBuilder<C> {
    fn new() -> Self {
        Self {
            name: C::NAME,
            plural: C::PLURAL.map(str::to_string),
            policy: C::policy(),
            expose_stack: SwitchyardConfig::default().expose_stack,
            inflector: Box::new(EnglishInflector::new()),
            middleware: Vec::new(),
            class_handlers: HashMap::new(),
            _controller: PhantomData,
        }
    }

    /// Take every flag from `config`, replacing the controller's own policy flags.
    pub fn config(mut self, config: &SwitchyardConfig) -> Self {
        let route = self.policy.route.take();
        self.policy = RoutePolicy {
            route,
            ..RoutePolicy::from_config(config)
        };
        self.expose_stack = config.expose_stack;
        self
    }

    pub fn action_routing(mut self, enabled: bool) -> Self {
        self.policy.action_routing = enabled;
        self
    }

    pub fn restful_routing(mut self, enabled: bool) -> Self {
        self.policy.restful_routing = enabled;
        self
    }

    pub fn auto_routing(mut self, enabled: bool) -> Self {
        self.policy.auto_routing = enabled;
        self
    }

    pub fn res_func(mut self, mode: impl Into<String>) -> Self {
        self.policy.res_func = mode.into();
        self
    }

    pub fn expose_stack(mut self, expose: bool) -> Self {
        self.expose_stack = expose;
        self
    }

    /// Declare the route explicitly, e.g. `"[POST] /user/?|/user/:id/?"`.
    pub fn route(mut self, route: &str) -> Result<Self> {
        self.policy.route = Some(route.parse()?);
        Ok(self)
    }

    pub fn route_spec(mut self, route: RouteSpec) -> Self {
        self.policy.route = Some(route);
        self
    }

    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    pub fn inflector(mut self, inflector: impl Inflector + 'static) -> Self {
        self.inflector = Box::new(inflector);
        self
    }

    /// Run `handler` before the trampoline on every bound route.
    pub fn middleware(mut self, handler: Handler) -> Self {
        self.middleware.push(Middleware::Handler(handler));
        self
    }

    /// Run the class handler registered as `name` before the trampoline.
    pub fn middleware_named(mut self, name: impl Into<String>) -> Self {
        self.middleware.push(Middleware::Named(name.into()));
        self
    }

    /// Register a class-level handler that middleware can refer to by name.
    pub fn class_handler(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.class_handlers.insert(name.into(), handler);
        self
    }

    pub fn build(self) -> Result<Arc<ControllerClass<C>>> {
        let ClassBuilder {
            name,
            plural,
            mut policy,
            expose_stack,
            inflector,
            middleware,
            class_handlers,
            ..
        } = self;

        if policy.auto_routing && policy.route.is_none() {
            policy.route = derive_route(name, plural.as_deref(), &*inflector);
        }

        let middleware = middleware
            .into_iter()
            .map(|mw| match mw {
                Middleware::Handler(handler) => Ok(handler),
                Middleware::Named(name) => class_handlers
                    .get(&name)
                    .cloned()
                    .ok_or(Error::UnknownMiddleware(name)),
            })
            .collect::<Result<Vec<_>>>()?;

        let actions = C::actions();
        debug!(
            target: "switchyard::routes",
            "declared {} with actions {:?}",
            name,
            actions.names()
        );

        Ok(Arc::new(ControllerClass {
            name,
            policy,
            actions,
            middleware,
            expose_stack,
        }))
    }
}
