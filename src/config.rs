use crate::error::{Error, Result};
use crate::mt::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Runtime settings read from the environment (and `.env`).
#[derive(Clone)]
pub struct Config {
    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,

    // Locales
    pub source_locale: String,
    pub target_locale: String,

    // Translation fan-out
    pub concurrency: usize,

    // Dump loaded/translated stories next to the archive
    pub debug_files: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            source_locale: "en".to_string(),
            target_locale: "pl".to_string(),
            concurrency: 8,
            debug_files: false,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let concurrency = match get("TRANSLATION_CONCURRENCY") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::Config(format!("TRANSLATION_CONCURRENCY must be a number, got '{}'", raw))
            })?,
            None => defaults.concurrency,
        };

        Ok(Config {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            source_locale: get("SOURCE_LOCALE").unwrap_or(defaults.source_locale),
            target_locale: get("TARGET_LOCALE").unwrap_or(defaults.target_locale),
            concurrency: concurrency.max(1),
            debug_files: get("DEBUG_FILES").is_some_and(|v| v == "1" || v == "true"),
        })
    }

    /// The API key, or a config error naming the variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY not set".to_string()))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("source_locale", &self.source_locale)
            .field("target_locale", &self.target_locale)
            .field("concurrency", &self.concurrency)
            .field("debug_files", &self.debug_files)
            .finish()
    }
}
