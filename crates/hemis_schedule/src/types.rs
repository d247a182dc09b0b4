use crate::config::AppConfig;
use crate::db::ScheduleStore;
use crate::hemis::HemisClient;

/// Shared state handed to every request handler.
///
/// The store and the client are created once by the process entry point.
pub struct AppState {
    pub config: AppConfig,
    pub store: ScheduleStore,
    pub client: HemisClient,
}

impl AppState {
    pub fn new(config: AppConfig, store: ScheduleStore, client: HemisClient) -> Self {
        Self {
            config,
            store,
            client,
        }
    }
}
