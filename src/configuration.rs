use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub pagespeed: PagespeedSettings,
    pub openai: OpenaiSettings,
    pub cache: CacheSettings,
    pub analysis: AnalysisSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct PagespeedSettings {
    pub api_key: String,
    pub api_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_seconds: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct OpenaiSettings {
    pub api_key: String,
    pub model: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct CacheSettings {
    /// How long a completed analysis is considered fresh.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub ttl_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub cleanup_interval_seconds: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct AnalysisSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub fetch_timeout_seconds: u64,
    /// Terminal jobs older than this are garbage-collected.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub job_retention_seconds: u64,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // e.g. `APP_PAGESPEED__API_KEY=...` overrides `pagespeed.api_key`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
