//! Entity registry collecting the route descriptors of every registry

use axum::Router;

/// Trait that describes how to build routes for a registry
///
/// Implemented by [`RegistryDescriptor`](crate::registry::RegistryDescriptor)
/// for every record type.
pub trait EntityDescriptor: Send + Sync {
    /// The registry name (singular, e.g., "client")
    fn entity_type(&self) -> &str;

    /// The plural form used in URLs (e.g., "clients")
    fn plural(&self) -> &str;

    /// Build the routes of this registry under `/{plural}`
    fn build_routes(&self) -> Router;
}

/// Registry for all entities in the application, in registration order
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: Vec<Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Register an entity descriptor
    ///
    /// A descriptor for an already registered entity type replaces it.
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.entity_type() == descriptor.entity_type())
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    /// Build a router with all registered entity routes
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .iter()
            .fold(Router::new(), |router, descriptor| {
                tracing::debug!(
                    entity_type = descriptor.entity_type(),
                    plural = descriptor.plural(),
                    "registry routes mounted"
                );
                router.merge(descriptor.build_routes())
            })
    }

    /// Get all registered entity types
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.entity_type()).collect()
    }

    /// URL plural of a registered entity type
    pub fn plural_of(&self, entity_type: &str) -> Option<&str> {
        self.descriptors
            .iter()
            .find(|d| d.entity_type() == entity_type)
            .map(|d| d.plural())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
