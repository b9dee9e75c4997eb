//! File plus environment configuration.
//!
//! Settings load from `config.toml` under the user configuration directory,
//! with `DEEPTHINK_*` environment variables taking precedence key by key. A
//! missing file is fine as long as the environment supplies every key; an
//! unresolvable key reports which one, and where to put it.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment override for the API key.
pub const API_KEY_ENV_VAR: &str = "DEEPTHINK_API_KEY";
/// Environment override for the endpoint base URL.
pub const API_URL_ENV_VAR: &str = "DEEPTHINK_API_URL";
/// Environment override for the model name.
pub const MODEL_ENV_VAR: &str = "DEEPTHINK_MODEL";

/// Raw shape of `config.toml`. Every key is optional here; requiredness is
/// enforced after environment overrides are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model_name: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub model_name: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a user configuration directory")]
    NoConfigDir,

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing `{key}`: set it in {path} or via the {env_var} environment variable")]
    MissingKey {
        key: &'static str,
        env_var: &'static str,
        path: PathBuf,
    },
}

impl ConfigError {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn missing_key(
        key: &'static str,
        env_var: &'static str,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::MissingKey {
            key,
            env_var,
            path: path.into(),
        }
    }
}

/// Default location: `<config dir>/deepthink/config.toml`.
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("deepthink").join("config.toml"))
}

impl Config {
    /// Loads the default config file and applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&path)
    }

    /// Loads an explicit file and applies environment overrides. A missing
    /// file is not an error; every key may still come from the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let file = read_config_file(path)?;
        resolve(file, path)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    match fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw).map_err(|source| ConfigError::parse(path, source)),
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(source) => Err(ConfigError::io(path, source)),
    }
}

fn resolve(file: ConfigFile, path: &Path) -> Result<Config, ConfigError> {
    let api_key = resolved_value(API_KEY_ENV_VAR, file.api_key)
        .ok_or_else(|| ConfigError::missing_key("api_key", API_KEY_ENV_VAR, path))?;
    let api_url = resolved_value(API_URL_ENV_VAR, file.api_url)
        .ok_or_else(|| ConfigError::missing_key("api_url", API_URL_ENV_VAR, path))?;
    let model_name = resolved_value(MODEL_ENV_VAR, file.model_name)
        .ok_or_else(|| ConfigError::missing_key("model_name", MODEL_ENV_VAR, path))?;

    Ok(Config {
        api_key,
        api_url,
        model_name,
    })
}

/// Environment wins over the file; blank values count as absent either way.
fn resolved_value(env_var: &str, file_value: Option<String>) -> Option<String> {
    let from_env = env::var(env_var).ok().and_then(non_blank);
    from_env.or_else(|| file_value.and_then(non_blank))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    use super::*;

    const FULL_CONFIG: &str = concat!(
        "api_key = \"sk-file\"\n",
        "api_url = \"https://api.example.com\"\n",
        "model_name = \"deepseek-chat\"\n",
    );

    struct EnvVarGuard {
        name: &'static str,
        previous: Option<String>,
    }

    impl EnvVarGuard {
        fn set(name: &'static str, value: Option<&str>) -> Self {
            let previous = env::var(name).ok();
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }

            Self { name, previous }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(value) => env::set_var(self.name, value),
                None => env::remove_var(self.name),
            }
        }
    }

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn clear_overrides() -> [EnvVarGuard; 3] {
        [
            EnvVarGuard::set(API_KEY_ENV_VAR, None),
            EnvVarGuard::set(API_URL_ENV_VAR, None),
            EnvVarGuard::set(MODEL_ENV_VAR, None),
        ]
    }

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("write config file");
        (dir, path)
    }

    #[test]
    fn file_supplies_all_keys() {
        let _env_serialization = lock_unpoisoned(env_lock());
        let _clear = clear_overrides();
        let (_dir, path) = write_config(FULL_CONFIG);

        let config = Config::load_from(&path).expect("load config");
        assert_eq!(config.api_key, "sk-file");
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.model_name, "deepseek-chat");
    }

    #[test]
    fn environment_overrides_file_values() {
        let _env_serialization = lock_unpoisoned(env_lock());
        let _clear = clear_overrides();
        let _key = EnvVarGuard::set(API_KEY_ENV_VAR, Some("sk-env"));
        let (_dir, path) = write_config(FULL_CONFIG);

        let config = Config::load_from(&path).expect("load config");
        assert_eq!(config.api_key, "sk-env");
        assert_eq!(config.api_url, "https://api.example.com");
    }

    #[test]
    fn missing_file_with_full_environment_loads() {
        let _env_serialization = lock_unpoisoned(env_lock());
        let _clear = clear_overrides();
        let _key = EnvVarGuard::set(API_KEY_ENV_VAR, Some("sk-env"));
        let _url = EnvVarGuard::set(API_URL_ENV_VAR, Some("https://api.example.com"));
        let _model = EnvVarGuard::set(MODEL_ENV_VAR, Some("deepseek-chat"));
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("absent.toml");

        let config = Config::load_from(&path).expect("load config");
        assert_eq!(config.api_key, "sk-env");
        assert_eq!(config.model_name, "deepseek-chat");
    }

    #[test]
    fn missing_key_error_names_the_key_and_override() {
        let _env_serialization = lock_unpoisoned(env_lock());
        let _clear = clear_overrides();
        let (_dir, path) = write_config(
            "api_key = \"sk-file\"\napi_url = \"https://api.example.com\"\n",
        );

        let error = Config::load_from(&path).expect_err("model_name unresolved");
        match &error {
            ConfigError::MissingKey { key, env_var, .. } => {
                assert_eq!(*key, "model_name");
                assert_eq!(*env_var, MODEL_ENV_VAR);
            }
            other => panic!("expected MissingKey, got {other:?}"),
        }
        let message = error.to_string();
        assert!(message.contains("model_name"), "message: {message}");
        assert!(message.contains(MODEL_ENV_VAR), "message: {message}");
    }

    #[test]
    fn blank_environment_value_falls_back_to_the_file() {
        let _env_serialization = lock_unpoisoned(env_lock());
        let _clear = clear_overrides();
        let _key = EnvVarGuard::set(API_KEY_ENV_VAR, Some("   "));
        let (_dir, path) = write_config(FULL_CONFIG);

        let config = Config::load_from(&path).expect("load config");
        assert_eq!(config.api_key, "sk-file");
    }

    #[test]
    fn values_are_trimmed() {
        let _env_serialization = lock_unpoisoned(env_lock());
        let _clear = clear_overrides();
        let (_dir, path) = write_config(
            "api_key = \"  sk-file  \"\napi_url = \"https://api.example.com\"\nmodel_name = \"deepseek-chat\"\n",
        );

        let config = Config::load_from(&path).expect("load config");
        assert_eq!(config.api_key, "sk-file");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let _env_serialization = lock_unpoisoned(env_lock());
        let _clear = clear_overrides();
        let (_dir, path) = write_config("api_key = [not toml");

        let error = Config::load_from(&path).expect_err("parse failure");
        assert!(matches!(error, ConfigError::Parse { .. }), "got {error:?}");
    }
}
