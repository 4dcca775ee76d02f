mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use types::{
    AdminSettings, AiSettings, ApiSettings, AssessmentSettings, ConfigError, CorsSettings,
    DatabaseSettings, Environment, RedisSettings, RuntimeSettings, SecuritySettings, Settings,
    TelemetrySettings, UploadSettings,
};
