use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::BookingService;
use crate::store::BookingStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn BookingStore>,
    pub bookings: BookingService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn BookingStore>) -> Self {
        let bookings = BookingService::new(Arc::clone(&store), config.grid())
            .tolerate_corrupt_storage(config.tolerate_corrupt_storage);
        Self {
            config,
            store,
            bookings,
        }
    }
}
