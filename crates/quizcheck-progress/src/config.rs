//! quizcheck configuration and progress store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizcheck_core::session::SessionConfig;
use quizcheck_core::statistics::DEFAULT_PASS_THRESHOLD;
use quizcheck_core::traits::ProgressStore;

use crate::http::HttpProgressStore;
use crate::local::LocalProgressStore;

/// Which progress backend to use.
///
/// Note: Custom Debug impl masks the API key and access token to prevent
/// accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressConfig {
    Http {
        base_url: String,
        api_key: String,
        #[serde(default)]
        access_token: Option<String>,
        /// Anonymous when unset.
        #[serde(default)]
        user_id: Option<String>,
    },
    Local {
        /// In-memory when unset.
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

impl std::fmt::Debug for ProgressConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressConfig::Http {
                base_url,
                api_key: _,
                access_token,
                user_id,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_key", &"***")
                .field("access_token", &access_token.as_ref().map(|_| "***"))
                .field("user_id", user_id)
                .finish(),
            ProgressConfig::Local { path } => {
                f.debug_struct("Local").field("path", path).finish()
            }
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        ProgressConfig::Local { path: None }
    }
}

/// Top-level quizcheck configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizcheckConfig {
    #[serde(default)]
    pub progress: ProgressConfig,
    /// A lesson passes when the share of correct answers exceeds this.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
    /// Clear an open answer's input once it has been checked.
    #[serde(default = "default_clear_open_answer")]
    pub clear_open_answer_after_check: bool,
    /// Output directory for run reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_pass_threshold() -> f64 {
    DEFAULT_PASS_THRESHOLD
}
fn default_clear_open_answer() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizcheck-results")
}

impl Default for QuizcheckConfig {
    fn default() -> Self {
        Self {
            progress: ProgressConfig::default(),
            pass_threshold: default_pass_threshold(),
            clear_open_answer_after_check: default_clear_open_answer(),
            output_dir: default_output_dir(),
        }
    }
}

impl QuizcheckConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            pass_threshold: self.pass_threshold,
            clear_open_answer_after_check: self.clear_open_answer_after_check,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_progress_config(config: &ProgressConfig) -> ProgressConfig {
    let resolve_opt = |v: &Option<String>| {
        v.as_deref()
            .map(resolve_env_vars)
            .filter(|resolved| !resolved.is_empty())
    };
    match config {
        ProgressConfig::Http {
            base_url,
            api_key,
            access_token,
            user_id,
        } => ProgressConfig::Http {
            base_url: resolve_env_vars(base_url),
            api_key: resolve_env_vars(api_key),
            access_token: resolve_opt(access_token),
            user_id: resolve_opt(user_id),
        },
        ProgressConfig::Local { path } => ProgressConfig::Local {
            path: path
                .as_ref()
                .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy()))),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizcheck.toml` in the current directory
/// 2. `~/.config/quizcheck/config.toml`
///
/// Environment variable overrides: `QUIZCHECK_API_KEY`, `QUIZCHECK_ACCESS_TOKEN`
/// (HTTP backend only).
pub fn load_config() -> Result<QuizcheckConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizcheckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizcheck.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizcheckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizcheckConfig::default(),
    };

    // Apply env var overrides
    if let ProgressConfig::Http {
        api_key,
        access_token,
        ..
    } = &mut config.progress
    {
        if let Ok(key) = std::env::var("QUIZCHECK_API_KEY") {
            *api_key = key;
        }
        if let Ok(token) = std::env::var("QUIZCHECK_ACCESS_TOKEN") {
            *access_token = Some(token);
        }
    }

    config.progress = resolve_progress_config(&config.progress);

    if !(0.0..=1.0).contains(&config.pass_threshold) {
        anyhow::bail!(
            "pass_threshold must be between 0 and 1, got {}",
            config.pass_threshold
        );
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizcheck"))
}

/// Create a progress store from its configuration.
pub async fn create_store(config: &ProgressConfig) -> Result<Arc<dyn ProgressStore>> {
    match config {
        ProgressConfig::Http {
            base_url,
            api_key,
            access_token,
            user_id,
        } => {
            let mut store = HttpProgressStore::new(base_url, api_key)?;
            if let Some(user_id) = user_id {
                store = store.with_user(user_id.clone(), access_token.clone());
            }
            Ok(Arc::new(store))
        }
        ProgressConfig::Local { path: Some(path) } => {
            Ok(Arc::new(LocalProgressStore::open(path).await?))
        }
        ProgressConfig::Local { path: None } => Ok(Arc::new(LocalProgressStore::in_memory())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZCHECK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZCHECK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZCHECK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no refs"), "no refs");
        std::env::remove_var("_QUIZCHECK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizcheckConfig::default();
        assert_eq!(config.pass_threshold, 0.5);
        assert!(config.clear_open_answer_after_check);
        assert!(matches!(config.progress, ProgressConfig::Local { path: None }));

        let session = config.session_config();
        assert_eq!(session.pass_threshold, 0.5);
    }

    #[test]
    fn parse_http_config() {
        let toml_str = r#"
pass_threshold = 0.75
clear_open_answer_after_check = false

[progress]
type = "http"
base_url = "https://example.supabase.co"
api_key = "anon"
user_id = "user-1"
"#;
        let config: QuizcheckConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pass_threshold, 0.75);
        assert!(!config.clear_open_answer_after_check);
        match &config.progress {
            ProgressConfig::Http {
                user_id,
                access_token,
                ..
            } => {
                assert_eq!(user_id.as_deref(), Some("user-1"));
                assert!(access_token.is_none());
            }
            other => panic!("expected http progress config, got {other:?}"),
        }
    }

    #[test]
    fn debug_masks_secrets() {
        let config = ProgressConfig::Http {
            base_url: "https://example.supabase.co".into(),
            api_key: "secret-key".into(),
            access_token: Some("secret-token".into()),
            user_id: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/nonexistent/quizcheck.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_resolves_env_refs() {
        std::env::set_var("_QUIZCHECK_CFG_USER", "user-42");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizcheck.toml");
        std::fs::write(
            &path,
            r#"
[progress]
type = "http"
base_url = "http://localhost:54321"
api_key = "anon"
user_id = "${_QUIZCHECK_CFG_USER}"
access_token = "${_QUIZCHECK_CFG_UNSET_TOKEN}"
"#,
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        match config.progress {
            ProgressConfig::Http {
                user_id,
                access_token,
                ..
            } => {
                assert_eq!(user_id.as_deref(), Some("user-42"));
                // Unset variables resolve to empty, which means no token.
                assert_eq!(access_token, None);
            }
            other => panic!("expected http config, got {other:?}"),
        }
        std::env::remove_var("_QUIZCHECK_CFG_USER");
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizcheck.toml");
        std::fs::write(&path, "pass_threshold = 1.5\n").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("pass_threshold"));
    }

    #[tokio::test]
    async fn creates_stores() {
        let local = create_store(&ProgressConfig::default()).await.unwrap();
        assert_eq!(local.name(), "local");

        let http = create_store(&ProgressConfig::Http {
            base_url: "http://localhost:54321".into(),
            api_key: "anon".into(),
            access_token: None,
            user_id: Some("user-1".into()),
        })
        .await
        .unwrap();
        assert_eq!(http.name(), "http");

        let bad = create_store(&ProgressConfig::Http {
            base_url: "not a url".into(),
            api_key: "anon".into(),
            access_token: None,
            user_id: None,
        })
        .await;
        assert!(bad.is_err());
    }
}
