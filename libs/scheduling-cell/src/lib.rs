pub mod catalog;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

use shared_config::AppConfig;

use catalog::ClinicCatalog;

/// Shared state for the scheduling routes: environment configuration plus
/// the injected clinic catalog (service codes, coverage, rosters).
pub struct SchedulingState {
    pub config: AppConfig,
    pub catalog: ClinicCatalog,
}

impl SchedulingState {
    pub fn new(config: AppConfig, catalog: ClinicCatalog) -> Self {
        Self { config, catalog }
    }
}
