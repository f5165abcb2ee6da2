//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use crate::config::environment::EnvironmentConfig;
use crate::controllers::TransportController;
use crate::repositories::TransportStore;
use crate::services::notification_service::RouteNotifier;
use crate::services::route_builder::MapLinkBuilder;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub store: Arc<dyn TransportStore>,
    pub notifier: Arc<dyn RouteNotifier>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        store: Arc<dyn TransportStore>,
        notifier: Arc<dyn RouteNotifier>,
    ) -> Self {
        Self {
            config,
            store,
            notifier,
        }
    }

    /// Controlador de transporte sobre el almacén y notificador compartidos
    pub fn transport_controller(&self) -> TransportController {
        TransportController::new(
            self.store.clone(),
            self.notifier.clone(),
            MapLinkBuilder::new(self.config.maps_base_url.clone()),
        )
    }
}
