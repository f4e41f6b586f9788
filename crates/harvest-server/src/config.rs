use harvest_core::AppError;

/// Server-only settings; harvesting settings live in [`harvest_core::HarvestConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Run the background sweep alongside the API.
    pub scheduler_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            scheduler_enabled: true,
        }
    }
}

impl ServerConfig {
    /// - `HARVEST_SERVER_PORT` (optional, defaults to 3000)
    /// - `HARVEST_SCHEDULER_ENABLED` (optional, defaults to true)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let port = match lookup("HARVEST_SERVER_PORT") {
            None => defaults.port,
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid HARVEST_SERVER_PORT '{raw}': must be a port number"
                ))
            })?,
        };

        let scheduler_enabled = match lookup("HARVEST_SCHEDULER_ENABLED") {
            None => defaults.scheduler_enabled,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid HARVEST_SCHEDULER_ENABLED '{raw}': expected true or false"
                    )));
                }
            },
        };

        Ok(Self {
            port,
            scheduler_enabled,
        })
    }
}
