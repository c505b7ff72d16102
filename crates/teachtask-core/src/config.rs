use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Env var overriding the database location.
pub const DB_ENV: &str = "TEACHTASK_DB";

const DEFAULT_ENDPOINT: &str = "https://models.github.ai/inference";
const DEFAULT_API_KEY_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub user: UserSection,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserSection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// One entry of the ordered suggestion provider chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub key: String,
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
}

impl ProviderConfig {
    fn hosted(key: &str, model: &str, max_tokens: Option<u32>) -> Self {
        Self {
            key: key.to_string(),
            model: model.to_string(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            max_tokens,
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

/// The stock `primary` / `fallback1` / `fallback2` chain.
#[must_use]
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::hosted("primary", "openai/gpt-4.1", None),
        ProviderConfig::hosted("fallback1", "mistral-ai/Mistral-Large-2411", None),
        ProviderConfig::hosted("fallback2", "meta/Llama-3.2-11B-Vision-Instruct", Some(1000)),
    ]
}

/// Where the user config lives, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("teachtask/config.toml"))
}

/// Load `<config_dir>/teachtask/config.toml`; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    load_user_config_from(&path)
}

/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            output: None,
            user: UserSection::default(),
            storage: StorageConfig::default(),
            providers: default_providers(),
        }
    }
}

/// Output mode: `--json` > `FORMAT` env > config `output` > TTY default.
#[must_use]
pub fn resolve_output(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

/// Output mode using the process `FORMAT` variable.
#[must_use]
pub fn resolve_output_from_env(cli_json: bool, config: &UserConfig) -> String {
    let env_format = env::var("FORMAT").ok();
    resolve_output(cli_json, config.output.as_deref(), env_format.as_deref())
}

/// Database path: `--db` > `TEACHTASK_DB` > config `[storage] path` > data dir.
///
/// # Errors
///
/// Returns an error only when every source is absent and the platform has
/// no data directory.
pub fn resolve_db_path(
    cli_db: Option<&Path>,
    env_db: Option<&str>,
    config: &UserConfig,
) -> Result<PathBuf> {
    if let Some(path) = cli_db {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env_db.map(str::trim).filter(|path| !path.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = &config.storage.path {
        return Ok(path.clone());
    }
    dirs::data_dir()
        .map(|dir| dir.join("teachtask/teachtask.db"))
        .context("No data directory on this platform; pass --db or set TEACHTASK_DB")
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_api_key_env() -> Option<String> {
    Some(DEFAULT_API_KEY_ENV.to_string())
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_top_p() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = load_user_config_from(&dir.path().join("absent.toml")).expect("load");
        assert!(cfg.output.is_none());
        assert!(cfg.user.id.is_none());
        let keys: Vec<_> = cfg.providers.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["primary", "fallback1", "fallback2"]);
        assert_eq!(cfg.providers[2].max_tokens, Some(1000));
    }

    #[test]
    fn empty_file_keeps_default_providers() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = load_user_config_from(&write_config(&dir, "")).expect("load");
        assert_eq!(cfg.providers, default_providers());
    }

    #[test]
    fn full_config_parses() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(
            &dir,
            r#"
output = "json"

[user]
id = "u-42"
email = "ms.rivera@school.edu"

[storage]
path = "/var/lib/teachtask/lists.db"

[[providers]]
key = "local"
model = "llama3"
endpoint = "http://localhost:11434/v1"
api_key_env = "LOCAL_KEY"
temperature = 0.2
"#,
        );
        let cfg = load_user_config_from(&path).expect("load");
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.user.id.as_deref(), Some("u-42"));
        assert_eq!(
            cfg.storage.path,
            Some(PathBuf::from("/var/lib/teachtask/lists.db"))
        );
        assert_eq!(cfg.providers.len(), 1);
        let local = &cfg.providers[0];
        assert_eq!(local.endpoint, "http://localhost:11434/v1");
        assert_eq!(local.api_key_env.as_deref(), Some("LOCAL_KEY"));
        assert!((local.temperature - 0.2).abs() < f64::EPSILON);
        assert!((local.top_p - 1.0).abs() < f64::EPSILON);
        assert_eq!(local.max_tokens, None);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_user_config_from(&write_config(&dir, "output = [")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        assert_eq!(resolve_output(true, Some("pretty"), Some("text")), "json");
    }

    #[test]
    fn env_format_beats_config() {
        assert_eq!(resolve_output(false, Some("json"), Some("text")), "text");
        assert_eq!(resolve_output(false, Some("json"), Some("bogus")), "json");
    }

    #[test]
    fn legacy_aliases_are_normalized() {
        assert_eq!(resolve_output(false, Some("table"), Some("human")), "pretty");
        assert_eq!(resolve_output(false, Some("human"), Some("table")), "text");
    }

    #[test]
    fn db_path_precedence() {
        let mut cfg = UserConfig::default();
        cfg.storage.path = Some(PathBuf::from("/cfg.db"));

        let cli = resolve_db_path(Some(Path::new("/cli.db")), Some("/env.db"), &cfg).expect("cli");
        assert_eq!(cli, PathBuf::from("/cli.db"));

        let env = resolve_db_path(None, Some("/env.db"), &cfg).expect("env");
        assert_eq!(env, PathBuf::from("/env.db"));

        let blank_env = resolve_db_path(None, Some("  "), &cfg).expect("config");
        assert_eq!(blank_env, PathBuf::from("/cfg.db"));
    }
}
