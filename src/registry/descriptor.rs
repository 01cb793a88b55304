//! Entity descriptor wiring a registry's handlers to its routes

use super::handlers::{bulk_delete, bulk_status, create, delete, export, get, list, update};
use super::live::live;
use super::{RegistryHooks, RegistryState};
use crate::server::entity_registry::EntityDescriptor;
use axum::Router;
use axum::routing::{get as get_route, post};

/// Routes of one registry under its configured plural
pub struct RegistryDescriptor<T> {
    singular: String,
    plural: String,
    state: RegistryState<T>,
}

impl<T: RegistryHooks> RegistryDescriptor<T> {
    pub fn new(singular: &str, plural: &str, state: RegistryState<T>) -> Self {
        Self {
            singular: singular.to_string(),
            plural: plural.to_string(),
            state,
        }
    }
}

impl<T: RegistryHooks> EntityDescriptor for RegistryDescriptor<T> {
    fn entity_type(&self) -> &str {
        &self.singular
    }

    fn plural(&self) -> &str {
        &self.plural
    }

    fn build_routes(&self) -> Router {
        let base = format!("/{}", self.plural);

        Router::new()
            .route(&base, get_route(list::<T>).post(create::<T>))
            .route(&format!("{base}/bulk/status"), post(bulk_status::<T>))
            .route(&format!("{base}/bulk/delete"), post(bulk_delete::<T>))
            .route(&format!("{base}/export"), get_route(export::<T>))
            .route(&format!("{base}/live"), get_route(live::<T>))
            .route(
                &format!("{base}/{{id}}"),
                get_route(get::<T>).put(update::<T>).delete(delete::<T>),
            )
            .with_state(self.state.clone())
    }
}
