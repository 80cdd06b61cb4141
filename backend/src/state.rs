use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::db::DbPool;
use crate::realtime::ChangeNotifier;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub auth_config: Arc<AuthConfig>,
    pub notifier: ChangeNotifier,
}

impl AppState {
    pub fn new(pool: DbPool, auth_config: AuthConfig) -> Self {
        Self {
            pool,
            auth_config: Arc::new(auth_config),
            notifier: ChangeNotifier::default(),
        }
    }
}
