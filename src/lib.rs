// lib.rs - Library root for codereel, the presentation model behind animated
// code listings

pub mod config;
pub mod content;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod filters;
pub mod highlight;
pub mod line;
pub mod listing;
pub mod syntax;
pub mod typewriter;

pub use config::{CodereelConfig, TypingSettings};
pub use content::Code;
pub use diff::Change;
pub use error::{ConfigError, ListingError};
pub use filters::Filter;
pub use highlight::{HighlightChain, HighlightSpec};
pub use line::{CodeLine, CodePart, FoldState};
pub use listing::{Content, FoldGroup, Listing, ViewRow};
pub use syntax::{LexerRegistry, LexerSpec, Theme, TokenKind};
pub use typewriter::{Step, Target, TypewriterOptions, TypewriterScript};
