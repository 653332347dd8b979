use std::env;
use tracing::warn;

/// Length of the implicit appointment slot when the environment does not
/// override it. Appointments only record a start time; conflict checking
/// treats each booking as occupying one slot of this many minutes.
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub jwt_secret: String,
    pub slot_minutes: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: env::var("AGENDA_STORE_URL")
                .unwrap_or_else(|_| {
                    warn!("AGENDA_STORE_URL not set, using empty value");
                    String::new()
                }),
            store_api_key: env::var("AGENDA_STORE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("AGENDA_STORE_API_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("AGENDA_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("AGENDA_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            slot_minutes: env::var("APPOINTMENT_SLOT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&m| m > 0)
                .unwrap_or(DEFAULT_SLOT_MINUTES),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty()
            && !self.jwt_secret.is_empty()
    }
}
