// src/error.rs - Errors surfaced by listing construction and mutation

#[derive(thiserror::Error, Debug)]
pub enum ListingError {
    #[error("position {position} (count {count}) is out of range for a listing of {len} lines")]
    Range {
        position: isize,
        count: usize,
        len: usize,
    },
    #[error("unknown lexer spec '{name}'. Choices are: {choices}")]
    SpecNotFound { name: String, choices: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("grammar error: {0}")]
    Grammar(String),
    #[error("filter error: {0}")]
    Filter(String),
}

impl ListingError {
    pub(crate) fn range(position: impl TryInto<isize>, count: usize, len: usize) -> Self {
        ListingError::Range {
            position: position.try_into().unwrap_or(isize::MAX),
            count,
            len,
        }
    }
}

/// Problems reading configuration or theme files.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown token name '{0}'")]
    UnknownToken(String),
    #[error("invalid colour '{value}' for '{key}'")]
    BadColor { key: String, value: String },
    #[error("unknown theme '{0}'")]
    UnknownTheme(String),
    #[error("unknown grammar '{base}' for language '{name}'")]
    UnknownGrammar { name: String, base: String },
}
