//! Business logic services

pub mod circulation;
pub mod maintenance;
pub mod notifications;
pub mod reservations;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use crate::{
    clock::Clock,
    config::{RulesConfig, SchedulerConfig},
    rules::BusinessRules,
    store::Store,
};

/// Container for all services
pub struct Services {
    pub circulation: circulation::CirculationService,
    pub reservations: reservations::ReservationsService,
    pub maintenance: Arc<maintenance::MaintenanceService>,
}

impl Services {
    /// Wire all services over one shared store
    pub fn new(
        store: Store,
        rules_config: &RulesConfig,
        scheduler_config: &SchedulerConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn notifications::NotificationSink>,
    ) -> Self {
        let rules = BusinessRules::from_config(rules_config);
        let lock_wait = StdDuration::from_millis(rules_config.lock_wait_ms);

        let circulation = circulation::CirculationService::new(
            store.clone(),
            rules.clone(),
            clock.clone(),
            notifier.clone(),
            lock_wait,
        );
        let reservations = reservations::ReservationsService::new(
            store.clone(),
            rules,
            clock.clone(),
            lock_wait,
        );
        let maintenance = Arc::new(maintenance::MaintenanceService::new(
            store,
            clock,
            notifier,
            reservations.clone(),
            scheduler_config,
            lock_wait,
        ));

        Self {
            circulation,
            reservations,
            maintenance,
        }
    }
}
