use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fhir_base_url: String,
    pub default_patient_id: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            fhir_base_url: env::var("FHIR_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("FHIR_BASE_URL not set, using empty value");
                    String::new()
                }),
            default_patient_id: env::var("FHIR_DEFAULT_PATIENT_ID")
                .unwrap_or_else(|_| String::new()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.fhir_base_url.is_empty()
    }
}
