use crate::error::ListingError;
use crate::syntax::console::SessionDialect;
use crate::syntax::{CustomLexer, LanguageConfig, LanguageId};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Theme family a spec is styled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeFamily {
    #[default]
    Code,
    Doc,
    Xml,
}

impl ThemeFamily {
    pub fn name(self) -> &'static str {
        match self {
            ThemeFamily::Code => "code",
            ThemeFamily::Doc => "doc",
            ThemeFamily::Xml => "xml",
        }
    }
}

/// How a spec turns text into classified spans.
#[derive(Clone)]
pub enum Grammar {
    /// Every line is a single `Generic.Output` part.
    Plain,
    TreeSitter(LanguageId),
    Console(SessionDialect),
    Custom(Arc<dyn CustomLexer>),
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grammar::Plain => write!(f, "Plain"),
            Grammar::TreeSitter(id) => write!(f, "TreeSitter({:?})", id),
            Grammar::Console(dialect) => write!(f, "Console({:?})", dialect),
            Grammar::Custom(lexer) => write!(f, "Custom({})", lexer.name()),
        }
    }
}

/// Named grammar and theme configuration used to tokenize a block of text.
#[derive(Debug, Clone)]
pub struct LexerSpec {
    pub name: String,
    pub description: String,
    pub grammar: Grammar,
    /// Console specs hold REPL transcripts: prompts, code and output.
    pub console: bool,
    pub family: ThemeFamily,
    pub aliases: Vec<String>,
}

impl PartialEq for LexerSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl LexerSpec {
    fn builtin(
        name: &str,
        description: &str,
        grammar: Grammar,
        family: ThemeFamily,
        aliases: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            console: matches!(grammar, Grammar::Console(_)),
            grammar,
            family,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Passthrough spec, no highlighting.
    pub fn plain() -> Self {
        Self::builtin(
            "none",
            "No parsing, plain text",
            Grammar::Plain,
            ThemeFamily::Doc,
            &["plain", "txt"],
        )
    }

    /// Wrap a caller supplied lexer in a spec.
    pub fn custom(
        name: &str,
        description: &str,
        lexer: Arc<dyn CustomLexer>,
        console: bool,
        family: ThemeFamily,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            grammar: Grammar::Custom(lexer),
            console,
            family,
            aliases: Vec::new(),
        }
    }

    /// Look a spec up in the built-in registry.
    pub fn from_name(name: &str) -> Result<Self, ListingError> {
        LexerRegistry::builtin().get(name)
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.name == name || self.aliases.iter().any(|alias| *alias == name)
    }

    /// Tree-sitter configuration for the code portion of this spec, if any.
    pub fn language_config(&self) -> Option<LanguageConfig> {
        match &self.grammar {
            Grammar::TreeSitter(id) => get_language_config(*id),
            Grammar::Console(dialect) => get_language_config(dialect.language()),
            Grammar::Plain | Grammar::Custom(_) => None,
        }
    }
}

pub fn get_language_config(id: LanguageId) -> Option<LanguageConfig> {
    match id {
        #[cfg(feature = "rust")]
        LanguageId::Rust => Some(LanguageConfig {
            id,
            tree_sitter_language: tree_sitter_rust::language,
            highlight_query_path: Some("queries/rust/highlights.scm".to_string()),
            highlight_query_fallback: &[tree_sitter_rust::HIGHLIGHT_QUERY],
        }),
        #[cfg(feature = "python")]
        LanguageId::Python => Some(LanguageConfig {
            id,
            tree_sitter_language: tree_sitter_python::language,
            highlight_query_path: Some("queries/python/highlights.scm".to_string()),
            highlight_query_fallback: &[tree_sitter_python::HIGHLIGHT_QUERY],
        }),
        #[cfg(feature = "javascript")]
        LanguageId::JavaScript => Some(LanguageConfig {
            id,
            tree_sitter_language: tree_sitter_javascript::language,
            highlight_query_path: Some("queries/javascript/highlights.scm".to_string()),
            highlight_query_fallback: &[tree_sitter_javascript::HIGHLIGHT_QUERY],
        }),
        #[cfg(feature = "typescript")]
        LanguageId::TypeScript => Some(LanguageConfig {
            id,
            tree_sitter_language: tree_sitter_typescript::language_typescript,
            highlight_query_path: Some("queries/typescript/highlights.scm".to_string()),
            // the typescript query only covers what it adds on top of javascript
            highlight_query_fallback: &[
                tree_sitter_typescript::HIGHLIGHT_QUERY,
                tree_sitter_javascript::HIGHLIGHT_QUERY,
            ],
        }),
        #[cfg(feature = "bash")]
        LanguageId::Bash => Some(LanguageConfig {
            id,
            tree_sitter_language: tree_sitter_bash::language,
            highlight_query_path: Some("queries/bash/highlights.scm".to_string()),
            highlight_query_fallback: &[include_str!("../../queries/bash/highlights.scm")],
        }),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Known specs, searchable by name, alias and file extension.
#[derive(Debug, Clone)]
pub struct LexerRegistry {
    specs: Vec<LexerSpec>,
    extension_map: HashMap<String, String>, // extension -> spec name
}

impl LexerRegistry {
    /// Empty registry; most callers want [`LexerRegistry::builtin`].
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            extension_map: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        use Grammar::*;
        use ThemeFamily::*;

        let mut registry = Self::new();
        registry.register(LexerSpec::builtin(
            "py3",
            "Python 3 Source",
            TreeSitter(LanguageId::Python),
            Code,
            &["py", "python"],
        ));
        registry.register(LexerSpec::builtin(
            "con",
            "Interactive Python 3 console",
            Console(SessionDialect::Python),
            Code,
            &["repl", "pycon"],
        ));
        registry.register(LexerSpec::builtin(
            "bash",
            "Interactive bash console",
            Console(SessionDialect::Bash),
            Code,
            &[],
        ));
        registry.register(LexerSpec::builtin(
            "dbash",
            "Interactive bash console with a dollar-sign prompt",
            Console(SessionDialect::DollarBash),
            Code,
            &[],
        ));
        registry.register(LexerSpec::builtin(
            "node",
            "Interactive JavaScript Node.js console",
            Console(SessionDialect::Node),
            Code,
            &[],
        ));
        registry.register(LexerSpec::builtin(
            "rust",
            "Rust Source",
            TreeSitter(LanguageId::Rust),
            Code,
            &["rs"],
        ));
        registry.register(LexerSpec::builtin(
            "js",
            "JavaScript Source",
            TreeSitter(LanguageId::JavaScript),
            Code,
            &["javascript"],
        ));
        registry.register(LexerSpec::builtin(
            "ts",
            "TypeScript Source",
            TreeSitter(LanguageId::TypeScript),
            Code,
            &["typescript"],
        ));
        registry.register(LexerSpec::plain());

        for (ext, name) in [("py", "py3"), ("rs", "rust"), ("js", "js"), ("ts", "ts"), ("txt", "none")] {
            registry.map_extension(ext, name);
        }
        registry
    }

    /// Add a spec, replacing any existing spec with the same name.
    pub fn register(&mut self, spec: LexerSpec) {
        self.specs.retain(|existing| existing.name != spec.name);
        self.specs.push(spec);
    }

    pub fn register_custom(
        &mut self,
        name: &str,
        description: &str,
        lexer: Arc<dyn CustomLexer>,
        console: bool,
        family: ThemeFamily,
    ) {
        self.register(LexerSpec::custom(name, description, lexer, console, family));
    }

    pub fn map_extension(&mut self, ext: &str, name: &str) {
        self.extension_map
            .insert(ext.trim_start_matches('.').to_lowercase(), name.to_string());
    }

    /// Find a spec by name or alias, case-insensitively.
    pub fn get(&self, name: &str) -> Result<LexerSpec, ListingError> {
        self.specs
            .iter()
            .find(|spec| spec.matches(name))
            .cloned()
            .ok_or_else(|| ListingError::SpecNotFound {
                name: name.to_string(),
                choices: self.choices(),
            })
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<LexerSpec> {
        self.extension_map
            .get(&ext.trim_start_matches('.').to_lowercase())
            .and_then(|name| self.get(name).ok())
    }

    /// Spec for a file, chosen by its extension.
    pub fn get_by_path(&self, path: &Path) -> Result<LexerSpec, ListingError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        self.get_by_extension(ext)
            .ok_or_else(|| ListingError::SpecNotFound {
                name: format!("*.{}", ext),
                choices: self.choices(),
            })
    }

    /// Guess the spec from the content: transcripts with `>>> ` prompts are
    /// Python consoles, `$ ` prompts are bash sessions, anything else is
    /// Python source.
    pub fn detect(&self, source: &str) -> LexerSpec {
        let has_prompt = |prompt: &str| source.lines().any(|line| line.starts_with(prompt));
        let name = if has_prompt(">>> ") {
            "con"
        } else if has_prompt("$ ") {
            "bash"
        } else {
            "py3"
        };
        self.get(name).unwrap_or_else(|_| LexerSpec::plain())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|spec| spec.name.as_str())
    }

    /// Human readable list of specs and their descriptions.
    pub fn choices(&self) -> String {
        self.specs
            .iter()
            .map(|spec| format!("'{}' ({})", spec.name, spec.description))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for LexerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_name_and_alias() {
        let registry = LexerRegistry::builtin();
        assert_eq!(registry.get("py3").unwrap().name, "py3");
        assert_eq!(registry.get("Python").unwrap().name, "py3");
        assert_eq!(registry.get("repl").unwrap().name, "con");
        assert_eq!(registry.get("plain").unwrap().name, "none");
        assert!(registry.get("con").unwrap().console);
        assert!(!registry.get("rust").unwrap().console);
    }

    #[test]
    fn test_unknown_spec() {
        let registry = LexerRegistry::builtin();
        match registry.get("cobol") {
            Err(ListingError::SpecNotFound { name, choices }) => {
                assert_eq!(name, "cobol");
                assert!(choices.contains("'py3'"));
            }
            other => panic!("expected SpecNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_get_by_extension() {
        let registry = LexerRegistry::builtin();
        assert_eq!(registry.get_by_extension("rs").unwrap().name, "rust");
        assert_eq!(registry.get_by_extension(".py").unwrap().name, "py3");
        assert!(registry.get_by_extension("cob").is_none());
        assert!(registry.get_by_path(Path::new("notes.cob")).is_err());
        assert_eq!(registry.get_by_path(Path::new("a/b.txt")).unwrap().name, "none");
    }

    #[test]
    fn test_detect() {
        let registry = LexerRegistry::builtin();
        assert_eq!(registry.detect(">>> 1 + 1\n2\n").name, "con");
        assert_eq!(registry.detect("$ ls\nfile\n").name, "bash");
        assert_eq!(registry.detect("x = 1\n").name, "py3");
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = LexerRegistry::builtin();
        let count = registry.names().count();
        let mut spec = LexerSpec::plain();
        spec.description = "Replaced".to_string();
        registry.register(spec);
        assert_eq!(registry.names().count(), count);
        assert_eq!(registry.get("none").unwrap().description, "Replaced");
    }
}
