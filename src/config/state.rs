// Shared application state

use crate::config::Config;
use crate::store::AccountStore;

/// State shared across connections: the loaded configuration plus the
/// account table the handlers read and mutate.
pub struct AppState {
    pub config: Config,
    pub store: AccountStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: AccountStore::new(),
        }
    }
}
