use crate::error::ListingError;
use crate::filters::Filter;
use crate::line::CodeLine;
use crate::syntax::{LexerRegistry, LexerSpec, Tokenizer};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Source text paired with the spec used to tokenize it.
#[derive(Debug, Clone)]
pub struct Code {
    source: String,
    spec: LexerSpec,
    path: Option<PathBuf>,
}

impl Code {
    pub fn from_text(text: impl Into<String>, spec: &LexerSpec) -> Self {
        Self {
            source: text.into(),
            spec: spec.clone(),
            path: None,
        }
    }

    /// Text with a spec looked up by name or alias in the built-in registry.
    pub fn from_text_named(text: impl Into<String>, name: &str) -> Result<Self, ListingError> {
        Ok(Self::from_text(text, &LexerSpec::from_name(name)?))
    }

    /// Text with a spec guessed from the content.
    pub fn detect(text: impl Into<String>) -> Self {
        let text = text.into();
        let spec = LexerRegistry::builtin().detect(&text);
        debug!("Detected spec '{}'", spec.name);
        Self::from_text(text, &spec)
    }

    /// Read a file, choosing the spec by extension with the built-in
    /// registry and guessing from the content for unknown extensions.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ListingError> {
        Self::from_file_with_registry(path, &LexerRegistry::builtin())
    }

    pub fn from_file_with_registry(
        path: impl AsRef<Path>,
        registry: &LexerRegistry,
    ) -> Result<Self, ListingError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let spec = registry
            .get_by_path(path)
            .unwrap_or_else(|_| registry.detect(&source));
        debug!("Loaded {} with spec '{}'", path.display(), spec.name);
        Ok(Self {
            source,
            spec,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn from_file_with_spec(path: impl AsRef<Path>, spec: &LexerSpec) -> Result<Self, ListingError> {
        let path = path.as_ref();
        Ok(Self {
            source: fs::read_to_string(path)?,
            spec: spec.clone(),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn spec(&self) -> &LexerSpec {
        &self.spec
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn with_spec(mut self, spec: &LexerSpec) -> Self {
        self.spec = spec.clone();
        self
    }

    /// Run a filter over the source.
    pub fn filter(mut self, filter: &Filter) -> Result<Self, ListingError> {
        self.source = filter.apply(&self.source)?;
        Ok(self)
    }

    pub fn tokenize(&self) -> Result<Vec<CodeLine>, ListingError> {
        Ok(Tokenizer::new(&self.spec)?.tokenize(&self.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_text_named() {
        let code = Code::from_text_named("hello\n", "plain").unwrap();
        assert_eq!(code.spec().name, "none");
        assert_eq!(code.tokenize().unwrap().len(), 1);
        assert!(matches!(
            Code::from_text_named("x", "cobol"),
            Err(ListingError::SpecNotFound { .. })
        ));
    }

    #[test]
    fn test_detect() {
        assert_eq!(Code::detect(">>> 1\n1\n").spec().name, "con");
        assert_eq!(Code::detect("print(1)\n").spec().name, "py3");
    }

    #[cfg(feature = "rust")]
    #[test]
    fn test_from_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".rs").tempfile().unwrap();
        write!(file, "fn main() {{}}\n").unwrap();
        let code = Code::from_file(file.path()).unwrap();
        assert_eq!(code.spec().name, "rust");
        assert_eq!(code.source(), "fn main() {}\n");
        assert_eq!(code.path(), Some(file.path()));
    }

    #[test]
    fn test_from_file_unknown_extension_detects() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "$ ls\nREADME\n").unwrap();
        assert_eq!(Code::from_file(file.path()).unwrap().spec().name, "bash");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Code::from_file("/definitely/not/here.py"),
            Err(ListingError::Io(_))
        ));
    }

    #[test]
    fn test_filter_chain() {
        let code = Code::from_text("  a\n\n\n  b", &LexerSpec::plain())
            .filter(&Filter::RemoveDoubleBlanks)
            .unwrap()
            .filter(&Filter::LeftJustify)
            .unwrap();
        assert_eq!(code.source(), "a\n\nb");
    }
}
