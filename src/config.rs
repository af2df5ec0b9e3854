use crate::discovery;
use crate::error::ConfigError;
use crate::syntax::{LanguagesConfig, LexerRegistry, QueryLoader, Theme};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Contents of `config.toml`.
///
/// ```toml
/// theme = "default"
/// runtime-dir = "/opt/codereel/runtime"
///
/// [typing]
/// delay_ms = 130
/// variance_ms = 30
///
/// [[language]]
/// name = "pyi"
/// grammar = "py3"
/// file-types = ["pyi"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodereelConfig {
    /// Built-in theme name or path to a theme file.
    pub theme: Option<String>,
    pub typing: TypingSettings,
    #[serde(rename = "runtime-dir")]
    pub runtime_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub languages: LanguagesConfig,
}

/// Pacing of the typing animation, handed to whatever drives the steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TypingSettings {
    /// Base delay between typed characters.
    pub delay_ms: u64,
    /// Random extra delay added on top of `delay_ms`.
    pub variance_ms: u64,
    /// Fixed delay replacing the random one, for reproducible recordings.
    pub movie_mode_ms: Option<u64>,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            delay_ms: 130,
            variance_ms: 30,
            movie_mode_ms: None,
        }
    }
}

impl TypingSettings {
    /// Delay for one character, with `jitter` in `0.0..=1.0` choosing a
    /// point in the variance window.
    pub fn delay(&self, jitter: f64) -> Duration {
        if let Some(fixed) = self.movie_mode_ms {
            return Duration::from_millis(fixed);
        }
        let extra = (self.variance_ms as f64 * jitter.clamp(0.0, 1.0)).round() as u64;
        Duration::from_millis(self.delay_ms + extra)
    }

    pub fn is_movie_mode(&self) -> bool {
        self.movie_mode_ms.is_some()
    }
}

impl CodereelConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The user's config file, or the defaults when there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match discovery::find_config_file() {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Resolve the configured theme: a built-in name, a file path or a file
    /// in the themes directory. Without a setting, a user `theme.toml` wins
    /// over the built-in default.
    pub fn load_theme(&self) -> Result<Theme, ConfigError> {
        let Some(name) = &self.theme else {
            return match discovery::find_user_theme() {
                Some(path) => Theme::from_file(path),
                None => Ok(Theme::default_theme()),
            };
        };

        if let Some(theme) = Theme::builtin(name) {
            return Ok(theme);
        }
        let path = Path::new(name);
        if path.is_file() {
            return Theme::from_file(path);
        }
        match discovery::find_named_theme(name) {
            Some(path) => Theme::from_file(path),
            None => Err(ConfigError::UnknownTheme(name.clone())),
        }
    }

    /// Built-in specs plus the configured languages.
    pub fn registry(&self) -> Result<LexerRegistry, ConfigError> {
        let mut registry = LexerRegistry::builtin();
        registry.apply_config(&self.languages)?;
        Ok(registry)
    }

    /// Query loader reading overrides from the configured runtime directory,
    /// or from `runtime/` in the config dir when that exists.
    pub fn query_loader(&self) -> QueryLoader {
        let runtime_dir = self.runtime_dir.clone().or_else(discovery::find_runtime_dir);
        match runtime_dir {
            Some(dir) => QueryLoader::new().with_runtime_dir(dir),
            None => QueryLoader::new(),
        }
    }
}
