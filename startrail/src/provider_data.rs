//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::sync::Arc;

/// Shared, read-only provider state built once during configure.
#[derive(Clone)]
pub struct StartrailProviderData {
    pub client: Arc<Client>,
    pub tenant: String,
    /// Default environment applied when a resource leaves its own empty.
    pub environment: String,
}

impl StartrailProviderData {
    pub fn new(client: Client, tenant: String, environment: String) -> Self {
        Self {
            client: Arc::new(client),
            tenant,
            environment,
        }
    }
}
