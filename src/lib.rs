// Switchyard - convention-based controller routing for Rust
//
// Controllers declare actions by name; Switchyard resolves each request to one
// action from an override, the URL, the `action` parameter or the HTTP verb,
// and derives default URL patterns from the controller's name.

// Re-export core functionality
pub use switchyard_core::*;

// Re-export the logging crate for configuration from applications
pub use switchyard_log as log;

#[cfg(feature = "testing")]
pub use switchyard_testing as testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ActionTable, Controller, ControllerClass, DispatchState, Error, Handler, HttpMethod,
        HttpRequest, HttpResponse, Instance, Next, Response, Result, RouteSpec, RouteTable,
        RoutePolicy, Router, SwitchyardConfig, handler,
    };
}
