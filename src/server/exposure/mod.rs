//! API exposures
//!
//! Each exposure consumes a `ServerHost` and produces a Router. Websocket
//! live views are part of the registry routes.

pub mod rest;

pub use rest::RestExposure;
