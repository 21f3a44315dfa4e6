// Mock response and continuation for testing

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use switchyard_core::{Error, Handler, Next, Response, Result, handler};

/// One call to [`Response::emit`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmitCall {
    pub mode: String,
    pub status: Option<u16>,
    pub content: Value,
}

/// One call to [`Response::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub template: String,
    pub data: Value,
}

/// Response that records emissions instead of producing a body.
///
/// Every mode is accepted unless the response was restricted with
/// [`MockResponse::with_modes`].
#[derive(Debug, Default, Clone)]
pub struct MockResponse {
    emits: Vec<EmitCall>,
    renders: Vec<RenderCall>,
    modes: Option<HashSet<String>>,
    complete: bool,
}

impl MockResponse {
    /// Create a new mock response
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept the given emission modes
    pub fn with_modes(mut self, modes: &[&str]) -> Self {
        self.modes = Some(modes.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Report the response as already completed by someone else
    pub fn completed(mut self) -> Self {
        self.complete = true;
        self
    }

    /// Get all recorded emissions
    pub fn emits(&self) -> &[EmitCall] {
        &self.emits
    }

    /// Get the last emission
    pub fn last(&self) -> Option<&EmitCall> {
        self.emits.last()
    }

    /// Get the number of emissions
    pub fn emit_count(&self) -> usize {
        self.emits.len()
    }

    /// Get all recorded renders
    pub fn renders(&self) -> &[RenderCall] {
        &self.renders
    }

    /// Check if nothing was emitted or rendered
    pub fn is_untouched(&self) -> bool {
        self.emits.is_empty() && self.renders.is_empty()
    }
}

impl Response for MockResponse {
    fn emit(&mut self, mode: &str, status: Option<u16>, content: Value) -> Result<()> {
        if let Some(modes) = &self.modes
            && !modes.contains(mode)
        {
            return Err(Error::UnknownResponseMode(mode.to_string()));
        }
        self.emits.push(EmitCall {
            mode: mode.to_string(),
            status,
            content,
        });
        Ok(())
    }

    fn render(&mut self, template: &str, data: Value) -> Result<()> {
        self.renders.push(RenderCall {
            template: template.to_string(),
            data,
        });
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Counts calls to the `next()` continuations it hands out.
#[derive(Debug, Clone, Default)]
pub struct NextSpy {
    calls: Arc<AtomicUsize>,
}

impl NextSpy {
    /// Create a new spy
    pub fn new() -> Self {
        Self::default()
    }

    /// A continuation that records its call on this spy
    pub fn next(&self) -> Next<'static> {
        let calls = Arc::clone(&self.calls);
        Next::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Get the number of calls
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Check if any continuation was called
    pub fn was_called(&self) -> bool {
        self.count() > 0
    }
}

/// Hands out middleware handlers that log their name when run.
#[derive(Debug, Clone, Default)]
pub struct HandlerSpy {
    calls: Arc<Mutex<Vec<String>>>,
}

impl HandlerSpy {
    /// Create a new spy
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records `name` and then calls `next()`
    pub fn passing(&self, name: &str) -> Handler {
        let calls = Arc::clone(&self.calls);
        let name = name.to_string();
        handler(move |_req, _res, next| {
            calls.lock().push(name.clone());
            next.call();
        })
    }

    /// A handler that records `name` and stops the chain
    pub fn blocking(&self, name: &str) -> Handler {
        let calls = Arc::clone(&self.calls);
        let name = name.to_string();
        handler(move |_req, _res, _next| {
            calls.lock().push(name.clone());
        })
    }

    /// Get all recorded calls, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Check if a handler was called
    pub fn was_called(&self, name: &str) -> bool {
        self.calls.lock().iter().any(|call| call == name)
    }

    /// Clear all calls
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}
