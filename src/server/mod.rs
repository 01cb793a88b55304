//! HTTP server: host, builder and exposures
//!
//! `ServerBuilder` assembles a `ServerHost` (store, identity provider,
//! session hook, event bus, registries) and exposes it over REST.

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
pub use host::ServerHost;
