use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::Config;

/// Shared dependencies for the service functions.
/// Generic over the store so tests can substitute an in-memory one.
#[derive(Clone)]
pub struct AppContext<S> {
    pub store: S,
    pub auth: Arc<AuthManager>,
    pub config: Arc<Config>,
}

impl<S> AppContext<S> {
    pub fn new(store: S, auth: Arc<AuthManager>, config: Arc<Config>) -> Self {
        Self {
            store,
            auth,
            config,
        }
    }
}
