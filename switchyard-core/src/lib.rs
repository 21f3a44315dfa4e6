// Core library for Switchyard convention-based controller routing
// This crate contains action resolution, the dispatch trampoline, route derivation
// and the host-router seam.

pub mod action;
pub mod config;
pub mod controller;
pub mod deriver;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod inflector;
pub mod registry;
pub mod resolver;
pub mod route_spec;
pub mod router;

// Re-export commonly used types
pub use action::*;
pub use config::*;
pub use controller::*;
pub use deriver::derive_route;
pub use dispatch::*;
pub use error::*;
pub use http::*;
pub use inflector::*;
pub use registry::*;
pub use resolver::{Resolution, resolve};
pub use route_spec::{RouteEntry, RouteSpec};
pub use router::*;
