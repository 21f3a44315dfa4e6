//! Per-request controller instances and the dispatch trampoline
//!
//! Every request bound to a controller goes through [`Instance::dispatch`]:
//! the resolver picks an action, the action runs, and whatever goes wrong is
//! turned into either a deferral to `next()` or an error response.

use crate::resolver::{resolve, Resolution};
use crate::{Controller, ControllerClass, Error, HttpMethod, HttpRequest, Next, Response, Result};
use serde::Serialize;
use serde_json::{Value, json};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use switchyard_log::{debug, error};

const TARGET: &str = "switchyard::dispatch";

/// How a dispatched request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchState {
    /// An action ran and returned normally.
    Invoked { action: String },
    /// No action applied; `next()` was called.
    Deferred,
    /// The resolver or the action failed and the exception handler responded.
    Failed { action: Option<String>, status: u16 },
}

impl DispatchState {
    pub fn is_invoked(&self) -> bool {
        matches!(self, DispatchState::Invoked { .. })
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, DispatchState::Deferred)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchState::Failed { .. })
    }

    /// The action that was invoked, if any.
    pub fn action(&self) -> Option<&str> {
        match self {
            DispatchState::Invoked { action } => Some(action),
            DispatchState::Failed { action, .. } => action.as_deref(),
            DispatchState::Deferred => None,
        }
    }
}

/// A controller instance, exclusive to one request.
pub struct Instance<'a, C> {
    pub req: &'a mut HttpRequest,
    pub res: &'a mut dyn Response,
    /// Default emission mode for [`Instance::send`].
    pub res_func: String,
    /// Controller state, fresh for every request.
    pub state: C,
    next: Option<Next<'a>>,
    action: Option<String>,
    response_sent: bool,
    expose_stack: bool,
    class: &'a ControllerClass<C>,
}

impl<'a, C: Controller> Instance<'a, C> {
    pub(crate) fn new(
        class: &'a ControllerClass<C>,
        req: &'a mut HttpRequest,
        res: &'a mut dyn Response,
        next: Next<'a>,
    ) -> Self {
        Self {
            req,
            res,
            res_func: class.policy().res_func.clone(),
            state: C::default(),
            next: Some(next),
            action: None,
            response_sent: false,
            expose_stack: class.expose_stack(),
            class,
        }
    }

    pub fn class(&self) -> &'a ControllerClass<C> {
        self.class
    }

    /// The action method invoked for this request, if one was.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn response_sent(&self) -> bool {
        self.response_sent
    }

    /// Resolve the request and run the chosen action.
    pub fn dispatch(&mut self, override_action: Option<&str>) -> DispatchState {
        let class = self.class;

        match resolve(override_action, &mut *self.req, class.policy(), class.actions()) {
            Ok(Resolution::Action(name)) => self.invoke(name),
            Ok(Resolution::PassThrough) => {
                debug!(target: TARGET, "{}: nothing to route, passing through", class.name());
                self.call_next();
                DispatchState::Deferred
            }
            Err(Error::NoAction) => {
                debug!(target: TARGET, "{}: No action found", class.name());
                self.call_next();
                DispatchState::Deferred
            }
            Err(err) => {
                let status = self.handle_exception(&err);
                DispatchState::Failed {
                    action: None,
                    status,
                }
            }
        }
    }

    fn invoke(&mut self, name: String) -> DispatchState {
        let class = self.class;
        let Some(action) = class.actions().get(&name) else {
            self.call_next();
            return DispatchState::Deferred;
        };

        debug!(target: TARGET, "{}: invoking {}", class.name(), name);
        self.action = Some(name.clone());

        let err = match panic::catch_unwind(AssertUnwindSafe(|| action(&mut *self))) {
            Ok(Ok(())) => return DispatchState::Invoked { action: name },
            Ok(Err(err)) => err,
            Err(payload) => Error::Panic(panic_message(&*payload)),
        };

        let status = self.handle_exception(&err);
        DispatchState::Failed {
            action: Some(name),
            status,
        }
    }

    /// Yield to the next handler in the host chain. Only the first call has
    /// any effect.
    pub fn call_next(&mut self) {
        if let Some(next) = self.next.take() {
            next.call();
        }
    }

    /// Emit `content` through `mode`, or through `res_func` when no mode is
    /// given. Does nothing once a response has been sent.
    pub fn send<T>(&mut self, content: T, code: Option<u16>, mode: Option<&str>) -> Result<()>
    where
        T: Serialize,
    {
        if self.response_sent || self.res.is_complete() {
            debug!(target: TARGET, "response already sent, dropping output");
            return Ok(());
        }

        let content = serde_json::to_value(content)?;
        let mode = mode.unwrap_or(self.res_func.as_str());
        self.res.emit(mode, code, content)?;
        self.response_sent = true;
        Ok(())
    }

    /// Render `template` with `data` through the response's renderer.
    pub fn render<T>(&mut self, template: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        if self.response_sent || self.res.is_complete() {
            debug!(target: TARGET, "response already sent, not rendering {}", template);
            return Ok(());
        }

        let data = serde_json::to_value(data)?;
        self.res.render(template, data)?;
        self.response_sent = true;
        Ok(())
    }

    /// Respond with an error payload for `err` and return the status used.
    pub fn handle_exception(&mut self, err: &Error) -> u16 {
        let status = err.status_code();
        error!(
            target: TARGET,
            "{}: unhandled exception in {}: {}",
            self.class.name(),
            self.action.as_deref().unwrap_or("resolver"),
            err
        );

        let mut body = json!({ "error": format!("Unhandled exception: {}", err) });
        if self.expose_stack {
            body["stack"] = Value::from(err.stack());
        }

        if let Err(send_err) = self.send(body.clone(), Some(status), None) {
            error!(target: TARGET, "failed to send error response: {}", send_err);
            // The configured mode may be the one that failed.
            if self.res_func != "json"
                && let Err(send_err) = self.send(body, Some(status), Some("json"))
            {
                error!(target: TARGET, "failed to send json error response: {}", send_err);
            }
        }
        status
    }

    pub fn is_get(&self) -> bool {
        self.req.is_method(HttpMethod::GET)
    }

    pub fn is_post(&self) -> bool {
        self.req.is_method(HttpMethod::POST)
    }

    pub fn is_put(&self) -> bool {
        self.req.is_method(HttpMethod::PUT)
    }

    pub fn is_delete(&self) -> bool {
        self.req.is_method(HttpMethod::DELETE)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
