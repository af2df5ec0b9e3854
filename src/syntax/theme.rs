use crate::error::ConfigError;
use crate::syntax::token::resolve_with;
use crate::syntax::{ThemeFamily, TokenKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A color represented as RGB values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `rrggbb`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 && hex.is_ascii() {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color { r, g, b })
        } else {
            None
        }
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Style {
    const fn fg(hex: u32) -> Self {
        Self {
            fg: Some(Color::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)),
            bg: None,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Style entry as written in a theme file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeStyle {
    pub fg: Option<String>, // color name or hex
    pub bg: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
}

/// Theme configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeFile {
    pub name: Option<String>,
    /// Built-in theme to start from
    pub inherits: Option<String>,
    #[serde(default)]
    pub palette: HashMap<String, String>, // color name -> hex
    #[serde(default)]
    pub code: HashMap<String, ThemeStyle>, // dotted token name -> style
    #[serde(default)]
    pub doc: HashMap<String, ThemeStyle>,
    #[serde(default)]
    pub xml: HashMap<String, ThemeStyle>,
    #[serde(default)]
    pub ui: UiStyleFile,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiStyleFile {
    pub highlight: Option<ThemeStyle>,
    pub fold: Option<ThemeStyle>,
    pub line_number: Option<ThemeStyle>,
}

/// Styles for listing decorations rather than tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiStyles {
    /// Applied on top of highlighted lines
    pub highlight: Style,
    pub fold: Style,
    pub line_number: Style,
}

const DEFAULT_CODE: &[(TokenKind, Style)] = &[
    (TokenKind::Comment, Style::fg(0x66dddd)),
    (TokenKind::Keyword, Style::fg(0xdd88dd)),
    (TokenKind::KeywordConstant, Style::fg(0x008000)),
    (TokenKind::Operator, Style::fg(0xaaaaaa)),
    (TokenKind::Punctuation, Style::fg(0x88ddff)),
    (TokenKind::Text, Style::fg(0xdddddd)),
    (TokenKind::Name, Style::fg(0xdddddd)),
    (TokenKind::NameBuiltin, Style::fg(0x88aaff)),
    (TokenKind::NameBuiltinPseudo, Style::fg(0xaa6666).bold()),
    (TokenKind::NameFunction, Style::fg(0xaaddff)),
    (TokenKind::NameClass, Style::fg(0xaaddff)),
    (TokenKind::NameException, Style::fg(0xffdd66).bold()),
    (TokenKind::NameDecorator, Style::fg(0xffdd66).bold()),
    (TokenKind::String, Style::fg(0xdddddd)),
    (TokenKind::Number, Style::fg(0xff8866)),
    (TokenKind::GenericPrompt, Style::fg(0xffffff).bold()),
    (TokenKind::GenericError, Style::fg(0xffdd66).bold()),
    (TokenKind::GenericTraceback, Style::fg(0xdddddd)),
    (TokenKind::Error, Style::fg(0xffdd66).bold()),
];

const DEFAULT_DOC: &[(TokenKind, Style)] = &[
    (TokenKind::NameTag, Style::fg(0xcdcd00)),
    (TokenKind::NameAttribute, Style::fg(0xcdcd00)),
    (TokenKind::Literal, Style::fg(0x88aaff)),
    (TokenKind::String, Style::fg(0x8700af)),
];

const DEFAULT_XML: &[(TokenKind, Style)] = &[
    (TokenKind::NameAttribute, Style::fg(0xcdcd00)),
    (TokenKind::Keyword, Style::fg(0x88aaff)),
    (TokenKind::NameTag, Style::fg(0x88aaff)),
    (TokenKind::Punctuation, Style::fg(0x88aaff)),
];

/// Token styles for each theme family.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    families: HashMap<ThemeFamily, HashMap<TokenKind, Style>>,
    pub ui: UiStyles,
}

impl Theme {
    /// Theme without any styles; every token renders with the defaults.
    pub fn no_colour() -> Self {
        Self {
            name: "no_colour".to_string(),
            families: HashMap::new(),
            ui: UiStyles::default(),
        }
    }

    pub fn default_theme() -> Self {
        let code: HashMap<TokenKind, Style> = DEFAULT_CODE.iter().copied().collect();
        let mut doc = code.clone();
        doc.extend(DEFAULT_DOC.iter().copied());
        let mut xml = code.clone();
        xml.extend(DEFAULT_XML.iter().copied());

        Self {
            name: "default".to_string(),
            families: HashMap::from([
                (ThemeFamily::Code, code),
                (ThemeFamily::Doc, doc),
                (ThemeFamily::Xml, xml),
            ]),
            ui: UiStyles {
                highlight: Style {
                    bg: Some(Color::rgb(0xff, 0xff, 0xff)),
                    ..Style::default()
                },
                fold: Style::fg(0xffffff),
                line_number: Style::fg(0x7f7f7f),
            },
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default_theme()),
            "no_colour" | "no_color" => Some(Self::no_colour()),
            _ => None,
        }
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["default", "no_colour"]
    }

    /// Load theme from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut theme = Self::from_toml_str(&content)?;
        if theme.name.is_empty() {
            theme.name = path
                .as_ref()
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default();
        }
        Ok(theme)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ThemeFile = toml::from_str(content)?;
        Self::from_theme_file(file)
    }

    pub fn from_theme_file(file: ThemeFile) -> Result<Self, ConfigError> {
        let mut theme = match &file.inherits {
            Some(base) => {
                Self::builtin(base).ok_or_else(|| ConfigError::UnknownTheme(base.clone()))?
            }
            None => Self::no_colour(),
        };
        theme.name = file.name.clone().unwrap_or_default();

        // code entries also flow into doc and xml, like the built-in families
        let code = file.resolve_family(&file.code)?;
        for family in [ThemeFamily::Code, ThemeFamily::Doc, ThemeFamily::Xml] {
            theme
                .families
                .entry(family)
                .or_default()
                .extend(code.iter().map(|(k, v)| (*k, *v)));
        }
        for (family, entries) in [(ThemeFamily::Doc, &file.doc), (ThemeFamily::Xml, &file.xml)] {
            let styles = file.resolve_family(entries)?;
            theme.families.entry(family).or_default().extend(styles);
        }

        if let Some(style) = &file.ui.highlight {
            theme.ui.highlight = file.resolve_style("ui.highlight", style)?;
        }
        if let Some(style) = &file.ui.fold {
            theme.ui.fold = file.resolve_style("ui.fold", style)?;
        }
        if let Some(style) = &file.ui.line_number {
            theme.ui.line_number = file.resolve_style("ui.line_number", style)?;
        }
        Ok(theme)
    }

    /// Style for a token: the entry for the token or its nearest styled
    /// ancestor, or the plain style when nothing in the family matches.
    pub fn style_for(&self, token: TokenKind, family: ThemeFamily) -> Style {
        let Some(styles) = self.families.get(&family) else {
            return Style::default();
        };
        let found = resolve_with(token, |kind| styles.contains_key(&kind));
        styles.get(&found).copied().unwrap_or_default()
    }

    /// Tokens with an explicit entry in a family.
    pub fn styled_tokens(&self, family: ThemeFamily) -> Vec<TokenKind> {
        let mut tokens: Vec<TokenKind> = self
            .families
            .get(&family)
            .map(|styles| styles.keys().copied().collect())
            .unwrap_or_default();
        tokens.sort_by_key(|token| token.name());
        tokens
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl ThemeFile {
    fn resolve_family(
        &self,
        entries: &HashMap<String, ThemeStyle>,
    ) -> Result<HashMap<TokenKind, Style>, ConfigError> {
        entries
            .iter()
            .map(|(key, style)| {
                let token = TokenKind::from_name(key)
                    .ok_or_else(|| ConfigError::UnknownToken(key.clone()))?;
                Ok((token, self.resolve_style(key, style)?))
            })
            .collect()
    }

    fn resolve_style(&self, key: &str, style: &ThemeStyle) -> Result<Style, ConfigError> {
        Ok(Style {
            fg: self.parse_color(key, style.fg.as_deref())?,
            bg: self.parse_color(key, style.bg.as_deref())?,
            bold: style.bold.unwrap_or(false),
            italic: style.italic.unwrap_or(false),
            underline: style.underline.unwrap_or(false),
        })
    }

    /// Parse color from hex string or palette name
    fn parse_color(&self, key: &str, value: Option<&str>) -> Result<Option<Color>, ConfigError> {
        let Some(value) = value else {
            return Ok(None);
        };
        let hex = self.palette.get(value).map(String::as_str).unwrap_or(value);
        Color::from_hex(hex)
            .map(Some)
            .ok_or_else(|| ConfigError::BadColor {
                key: key.to_string(),
                value: value.to_string(),
            })
    }
}
