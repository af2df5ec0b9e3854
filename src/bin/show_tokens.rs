use anyhow::{Context, Result, bail};
use clap::Parser;
use codereel::syntax::Tokenizer;
use codereel::{Code, CodereelConfig, Listing};
use std::io::Read;
use std::path::PathBuf;

/// Print how a file is split into lines and token parts.
#[derive(Debug, Parser)]
#[command(name = "show-tokens")]
#[command(version = "0.1.0")]
#[command(about = "Show the tokens codereel produces for a source file")]
struct Args {
    /// File to tokenize; reads standard input when omitted
    file: Option<PathBuf>,

    /// Lexer spec name or alias (detected when omitted)
    #[arg(long, short = 'l')]
    lexer: Option<String>,

    /// Config file to use instead of the discovered one
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Also print the theme style of each part
    #[arg(long, short = 's')]
    styles: bool,

    /// List the known lexer specs and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger (set RUST_LOG env var to control verbosity)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = match &args.config {
        Some(path) => CodereelConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => CodereelConfig::load()?,
    };
    let registry = config.registry()?;

    if args.list {
        for name in registry.names() {
            let spec = registry.get(name)?;
            println!("{:<10} {}", spec.name, spec.description);
        }
        return Ok(());
    }

    let code = match (&args.file, &args.lexer) {
        (Some(path), Some(name)) => Code::from_file_with_spec(path, &registry.get(name)?)?,
        (Some(path), None) => Code::from_file_with_registry(path, &registry)?,
        (None, lexer) => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            if text.is_empty() {
                bail!("nothing to tokenize");
            }
            match lexer {
                Some(name) => Code::from_text(text, &registry.get(name)?),
                None => Code::detect(text),
            }
        }
    };

    let tokenizer = Tokenizer::with_loader(code.spec(), config.query_loader())?;
    let mut listing = Listing::with_tokenizer(tokenizer).with_line_numbers(1);
    listing.append(code.source())?;
    let theme = config.load_theme()?;

    println!("spec: {} ({:?})", code.spec().name, code.spec().grammar);
    for line in listing.lines() {
        let number = line.line_number().unwrap_or_default();
        let newline = if line.has_newline() { "\\n" } else { "" };
        println!("{:>4} {}", number, newline);
        for part in line.parts() {
            if args.styles {
                let style = theme.style_for(part.token, code.spec().family);
                println!("       {:<24} {:?} {:?}", part.token.name(), part.text, style);
            } else {
                println!("       {:<24} {:?}", part.token.name(), part.text);
            }
        }
    }
    Ok(())
}
