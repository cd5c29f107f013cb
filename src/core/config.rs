//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.chatai/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Theme;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub answer_url: Option<String>,
    pub store_url: Option<String>,
    pub login_url: Option<String>,
    pub answer_timeout_secs: Option<u64>,
    pub store_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    pub cookie: Option<String>,
    pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub typing_interval_ms: Option<u64>,
    pub theme: Option<Theme>,
    pub suggestions: Option<Vec<String>>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ANSWER_URL: &str = "http://localhost:8080/api/answer";
pub const DEFAULT_STORE_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOGIN_URL: &str = "http://localhost:3000/login";
pub const DEFAULT_ANSWER_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_TYPING_INTERVAL_MS: u64 = 3;

pub const DEFAULT_SUGGESTIONS: [&str; 4] = [
    "What are some tips for staying healthy?",
    "Some skills to be learn in college",
    "What are some simple mindfulness exercises?",
    "mention some real time projects ",
];

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub answer_url: String,
    pub store_url: String,
    pub login_url: String,
    pub answer_timeout: Duration,
    pub store_timeout: Duration,
    pub user_id: Option<String>,
    pub session_cookie: Option<String>,
    pub state_dir: PathBuf,
    pub typing_interval: Duration,
    pub theme: Theme,
    pub suggestions: Vec<String>,
}

/// Values supplied on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub user_id: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub theme: Option<Theme>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// `~/.chatai`, the home of the config file and default state directory.
pub fn app_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chatai"))
}

/// Returns the path to `~/.chatai/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    app_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.chatai/config.toml`.
pub fn load_config() -> Result<ChatConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(ChatConfig::default())
        }
    }
}

/// Load config from `path`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ChatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<ChatConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(ChatConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ChatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Chat AI Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [service]
# answer_url = "http://localhost:8080/api/answer"   # Or CHATAI_ANSWER_URL
# store_url = "http://localhost:8080"               # Or CHATAI_STORE_URL
# login_url = "http://localhost:3000/login"
# answer_timeout_secs = 60
# store_timeout_secs = 15                         # Per conversation-store request

# [session]
# user_id = "..."                    # Or CHATAI_USER_ID / --user-id
# cookie = "token=..."               # Or CHATAI_SESSION_COOKIE
# state_dir = "/home/me/.chatai"     # Or --state-dir

# [display]
# typing_interval_ms = 3
# theme = "dark"                     # "dark" or "light"
# suggestions = [
#     "What are some tips for staying healthy?",
#     "Some skills to be learn in college",
# ]
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ChatConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Answer URL: env → config → default
    let answer_url = env_var("CHATAI_ANSWER_URL")
        .or_else(|| config.service.answer_url.clone())
        .unwrap_or_else(|| DEFAULT_ANSWER_URL.to_string());

    // Store URL: env → config → default
    let store_url = env_var("CHATAI_STORE_URL")
        .or_else(|| config.service.store_url.clone())
        .unwrap_or_else(|| DEFAULT_STORE_URL.to_string());

    // User id: CLI → env → config
    let user_id = cli
        .user_id
        .clone()
        .or_else(|| env_var("CHATAI_USER_ID"))
        .or_else(|| config.session.user_id.clone());

    // Cookie: env → config
    let session_cookie =
        env_var("CHATAI_SESSION_COOKIE").or_else(|| config.session.cookie.clone());

    // State dir: CLI → config → ~/.chatai → ./.chatai
    let state_dir = cli
        .state_dir
        .clone()
        .or_else(|| config.session.state_dir.clone())
        .or_else(app_dir)
        .unwrap_or_else(|| PathBuf::from(".chatai"));

    let suggestions = match &config.display.suggestions {
        Some(list) if !list.is_empty() => list.clone(),
        _ => DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
    };

    ResolvedConfig {
        answer_url,
        store_url,
        login_url: config
            .service
            .login_url
            .clone()
            .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string()),
        answer_timeout: Duration::from_secs(
            config
                .service
                .answer_timeout_secs
                .unwrap_or(DEFAULT_ANSWER_TIMEOUT_SECS),
        ),
        store_timeout: Duration::from_secs(
            config
                .service
                .store_timeout_secs
                .unwrap_or(DEFAULT_STORE_TIMEOUT_SECS),
        ),
        user_id,
        session_cookie,
        state_dir,
        typing_interval: Duration::from_millis(
            config
                .display
                .typing_interval_ms
                .unwrap_or(DEFAULT_TYPING_INTERVAL_MS),
        ),
        theme: cli.theme.or(config.display.theme).unwrap_or_default(),
        suggestions,
    }
}

/// Reads an env var, treating empty values as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = ChatConfig::default();
        assert!(config.service.answer_url.is_none());
        assert!(config.display.suggestions.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&ChatConfig::default(), &CliOverrides::default());
        assert_eq!(resolved.login_url, DEFAULT_LOGIN_URL);
        assert_eq!(resolved.answer_timeout, Duration::from_secs(60));
        assert_eq!(resolved.store_timeout, Duration::from_secs(15));
        assert_eq!(resolved.typing_interval, Duration::from_millis(3));
        assert_eq!(resolved.theme, Theme::Dark);
        assert_eq!(resolved.suggestions.len(), 4);
        assert_eq!(resolved.suggestions[3], "mention some real time projects ");
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = ChatConfig {
            service: ServiceConfig {
                login_url: Some("https://example.test/login".to_string()),
                answer_timeout_secs: Some(5),
                store_timeout_secs: Some(2),
                ..Default::default()
            },
            display: DisplayConfig {
                typing_interval_ms: Some(10),
                theme: Some(Theme::Light),
                suggestions: Some(vec!["Only one".to_string()]),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.login_url, "https://example.test/login");
        assert_eq!(resolved.answer_timeout, Duration::from_secs(5));
        assert_eq!(resolved.store_timeout, Duration::from_secs(2));
        assert_eq!(resolved.typing_interval, Duration::from_millis(10));
        assert_eq!(resolved.theme, Theme::Light);
        assert_eq!(resolved.suggestions, vec!["Only one".to_string()]);
    }

    #[test]
    fn test_empty_suggestion_list_falls_back() {
        let config = ChatConfig {
            display: DisplayConfig {
                suggestions: Some(Vec::new()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.suggestions.len(), DEFAULT_SUGGESTIONS.len());
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = ChatConfig {
            session: SessionConfig {
                state_dir: Some(PathBuf::from("/from/config")),
                ..Default::default()
            },
            display: DisplayConfig {
                theme: Some(Theme::Light),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            user_id: Some("cli-user".to_string()),
            state_dir: Some(PathBuf::from("/from/cli")),
            theme: Some(Theme::Dark),
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.user_id.as_deref(), Some("cli-user"));
        assert_eq!(resolved.state_dir, PathBuf::from("/from/cli"));
        assert_eq!(resolved.theme, Theme::Dark);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[service]
answer_url = "http://answers.test/ask"
store_url = "http://store.test"
answer_timeout_secs = 30

[session]
user_id = "u-1"
cookie = "token=abc"
state_dir = "/tmp/chatai"

[display]
typing_interval_ms = 0
theme = "light"
suggestions = ["a", "b"]
"#;
        let config: ChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.service.answer_url.as_deref(),
            Some("http://answers.test/ask")
        );
        assert_eq!(config.service.answer_timeout_secs, Some(30));
        assert_eq!(config.session.cookie.as_deref(), Some("token=abc"));
        assert_eq!(config.session.state_dir, Some(PathBuf::from("/tmp/chatai")));
        assert_eq!(config.display.typing_interval_ms, Some(0));
        assert_eq!(config.display.theme, Some(Theme::Light));
        assert_eq!(config.display.suggestions.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[display]
theme = "dark"
"#;
        let config: ChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.display.theme, Some(Theme::Dark));
        assert!(config.service.store_url.is_none());
        assert!(config.session.user_id.is_none());
    }

    #[test]
    fn test_unknown_theme_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display]\ntheme = \"purple\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.service.answer_url.is_none());

        let generated = fs::read_to_string(&path).unwrap();
        assert!(generated.contains("# [service]"));
        // Everything is commented out, so it parses back to defaults
        let reparsed: ChatConfig = toml::from_str(&generated).unwrap();
        assert!(reparsed.display.theme.is_none());
    }
}
