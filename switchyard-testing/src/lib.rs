//! Testing utilities for Switchyard controllers.
//!
//! This crate provides test doubles for the seams a controller talks to:
//!
//! - **MockResponse** - records every emission and render instead of writing a body
//! - **NextSpy** - counts how often `next()` was called
//! - **TestRequest** - request builder
//! - **RecordingRouter** - records the bindings made by auto-routing
//! - **HandlerSpy** - middleware handlers that record their invocation order
//! - **Assertions** - assertion helpers for dispatch outcomes and responses
//!
//! ## Quick Start
//!
//! ```
//! use switchyard_core::{ActionTable, Controller, ControllerClass};
//! use switchyard_testing::*;
//!
//! #[derive(Default)]
//! struct UserController;
//!
//! impl Controller for UserController {
//!     const NAME: &'static str = "UserController";
//!
//!     fn actions() -> ActionTable<Self> {
//!         ActionTable::<Self>::new().action("list", |this| this.send("everyone", None, None))
//!     }
//! }
//!
//! let class = ControllerClass::<UserController>::declare().unwrap();
//! let mut req = TestRequest::get("/users").build();
//! let mut res = MockResponse::new();
//! let next = NextSpy::new();
//!
//! let state = class.dispatch(None, &mut req, &mut res, next.next());
//! assert_invoked(&state, "listAction");
//! assert_emitted(&res, "json", None, &serde_json::json!("everyone"));
//! assert_eq!(next.count(), 0);
//! ```
//!
//! ## Recording Routes
//!
//! ```
//! use switchyard_core::{ActionTable, Controller, ControllerClass, RouteRegistry};
//! use switchyard_testing::RecordingRouter;
//!
//! #[derive(Default)]
//! struct OrderController;
//!
//! impl Controller for OrderController {
//!     const NAME: &'static str = "OrderController";
//!
//!     fn actions() -> ActionTable<Self> {
//!         ActionTable::<Self>::new()
//!     }
//! }
//!
//! let class = ControllerClass::<OrderController>::declare().unwrap();
//! let mut router = RecordingRouter::new();
//! class.auto_route_with(&RouteRegistry::new(), &mut router).unwrap();
//!
//! assert_eq!(router.patterns()[0], "/order/:action/:id?");
//! ```

pub mod assertions;
pub mod mock;
pub mod request;
pub mod router;

pub use assertions::*;
pub use mock::*;
pub use request::*;
pub use router::*;
