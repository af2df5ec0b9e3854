use crate::error::ConfigError;
use crate::syntax::LexerRegistry;
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Extra lexer specs and file associations, from the `[[language]]` tables
/// of a config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguagesConfig {
    #[serde(default)]
    pub language: Vec<LanguageEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    /// Existing spec whose grammar the entry reuses. Without one the entry
    /// extends the spec called `name`.
    pub grammar: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "file-types", default)]
    pub file_types: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Load language configuration from a TOML file
pub fn load_languages_config(path: &Path) -> Result<LanguagesConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: LanguagesConfig = toml::from_str(&content)?;
    Ok(config)
}

impl LexerRegistry {
    /// Register the specs and extensions described by `config`.
    pub fn apply_config(&mut self, config: &LanguagesConfig) -> Result<(), ConfigError> {
        for entry in &config.language {
            let base_name = entry.grammar.as_deref().unwrap_or(&entry.name);
            let mut spec = self.get(base_name).map_err(|_| ConfigError::UnknownGrammar {
                name: entry.name.clone(),
                base: base_name.to_string(),
            })?;

            if entry.grammar.is_some() {
                spec.name = entry.name.to_lowercase();
                spec.aliases.clear();
            }
            if let Some(description) = &entry.description {
                spec.description = description.clone();
            }
            for alias in &entry.aliases {
                let alias = alias.to_lowercase();
                if !spec.aliases.contains(&alias) {
                    spec.aliases.push(alias);
                }
            }

            debug!("Configured lexer spec '{}' from '{}'", spec.name, base_name);
            let name = spec.name.clone();
            self.register(spec);
            for ext in &entry.file_types {
                self.map_extension(ext, &name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_language_registry() {
        let config: LanguagesConfig = toml::from_str(
            r#"
            [[language]]
            name = "pyi"
            grammar = "py3"
            description = "Python stub file"
            file-types = ["pyi"]
            aliases = ["stub"]

            [[language]]
            name = "rust"
            file-types = ["rs.in"]
            aliases = ["rustlang"]
            "#,
        )
        .unwrap();

        let mut registry = LexerRegistry::builtin();
        registry.apply_config(&config).unwrap();

        let stub = registry.get_by_extension("pyi").unwrap();
        assert_eq!(stub.name, "pyi");
        assert_eq!(stub.description, "Python stub file");
        assert_eq!(registry.get("STUB").unwrap().name, "pyi");
        assert_eq!(registry.get("rustlang").unwrap().name, "rust");
        assert_eq!(registry.get("rs").unwrap().name, "rust");
        // the base spec is untouched
        assert_eq!(registry.get("python").unwrap().name, "py3");
    }

    #[test]
    fn test_unknown_grammar() {
        let config: LanguagesConfig =
            toml::from_str("[[language]]\nname = \"x\"\ngrammar = \"cobol\"\n").unwrap();
        let mut registry = LexerRegistry::builtin();
        assert!(matches!(
            registry.apply_config(&config),
            Err(ConfigError::UnknownGrammar { .. })
        ));
    }

    #[test]
    fn test_load_languages_config() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[[language]]\nname = \"none\"\nfile-types = [\"log\"]\n").unwrap();
        let config = load_languages_config(file.path()).unwrap();
        assert_eq!(config.language.len(), 1);
        assert_eq!(config.language[0].file_types, vec!["log".to_string()]);
    }
}
