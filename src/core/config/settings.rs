use super::parsing::{
    env_optional, env_or_default, is_supported_text_extension, parse_bool, parse_cors_origins,
    parse_environment, parse_string_list, parse_u16, parse_u64, parse_usize,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, AiSettings, ApiSettings, AssessmentSettings, ConfigError, CorsSettings,
    DatabaseSettings, RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort,
    ServerSettings, Settings, TelemetrySettings, UploadSettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("ORISH_HOST", "0.0.0.0");
        let port = env_or_default("ORISH_PORT", "8000");

        let environment =
            parse_environment(env_optional("ORISH_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("ORISH_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Orish API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "orishsuperuser");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "orish_db");
        let database_url = env_optional("DATABASE_URL");

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let ai_api_key = env_or_default("DEEPSEEK_API_KEY", "");
        let ai_base_url = env_or_default("DEEPSEEK_BASE_URL", "https://api.deepseek.com");
        let ai_model = env_or_default("AI_MODEL", "deepseek-chat");
        let ai_request_timeout =
            parse_u64("AI_REQUEST_TIMEOUT", env_or_default("AI_REQUEST_TIMEOUT", "30"))?;

        let default_question_count = parse_usize(
            "DEFAULT_QUESTION_COUNT",
            env_or_default("DEFAULT_QUESTION_COUNT", "5"),
        )?;
        let max_question_count =
            parse_usize("MAX_QUESTION_COUNT", env_or_default("MAX_QUESTION_COUNT", "50"))?;

        let max_upload_size_mb =
            parse_u64("MAX_UPLOAD_SIZE_MB", env_or_default("MAX_UPLOAD_SIZE_MB", "10"))?;
        let allowed_text_extensions =
            parse_string_list(env_optional("ALLOWED_TEXT_EXTENSIONS"), &["txt", "md", "csv"]);

        let default_teacher_username = env_or_default("DEFAULT_TEACHER_USERNAME", "teacher");
        let default_teacher_password = env_or_default("DEFAULT_TEACHER_PASSWORD", "");

        let log_level = env_or_default("ORISH_LOG_LEVEL", "info");
        let json = env_optional("ORISH_LOG_JSON")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);
        let prometheus_enabled = env_optional("PROMETHEUS_ENABLED")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            ai: AiSettings {
                api_key: ai_api_key,
                base_url: ai_base_url,
                model: ai_model,
                request_timeout_seconds: ai_request_timeout,
            },
            assessment: AssessmentSettings { default_question_count, max_question_count },
            uploads: UploadSettings { max_upload_size_mb, allowed_text_extensions },
            admin: AdminSettings { default_teacher_username, default_teacher_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn ai(&self) -> &AiSettings {
        &self.ai
    }

    pub(crate) fn assessment(&self) -> &AssessmentSettings {
        &self.assessment
    }

    pub(crate) fn uploads(&self) -> &UploadSettings {
        &self.uploads
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.assessment.default_question_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DEFAULT_QUESTION_COUNT",
                value: "0".to_string(),
            });
        }

        if self.assessment.max_question_count < self.assessment.default_question_count {
            return Err(ConfigError::InvalidValue {
                field: "MAX_QUESTION_COUNT",
                value: self.assessment.max_question_count.to_string(),
            });
        }

        if self.uploads.allowed_text_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_TEXT_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }

        for extension in &self.uploads.allowed_text_extensions {
            if !is_supported_text_extension(extension) {
                return Err(ConfigError::InvalidValue {
                    field: "ALLOWED_TEXT_EXTENSIONS",
                    value: extension.clone(),
                });
            }
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.ai.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("DEEPSEEK_API_KEY"));
        }
        if self.ai.base_url.is_empty() {
            return Err(ConfigError::MissingSecret("DEEPSEEK_BASE_URL"));
        }
        if self.admin.default_teacher_password.is_empty() {
            return Err(ConfigError::MissingSecret("DEFAULT_TEACHER_PASSWORD"));
        }

        Ok(())
    }
}
