//! pseudoblocks - render block-built pseudocode programs
//!
//! This is the command-line interface: it loads a program saved as JSON,
//! validates it and renders it to one or every target language.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use pseudoblocks::codegen::{
    CodepointTransliterator, IdentifierMap, RenderOptions, Target, TransliterationCache,
    render_all, render_with, resolve_identifiers,
};
use pseudoblocks::model::{Program, flatten};
use pseudoblocks::semantic::validate;

/// pseudoblocks - render block-built pseudocode programs
#[derive(Parser, Debug)]
#[command(name = "pseudoblocks")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Program file (JSON statement tree)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Target language
    #[arg(short, long, value_enum, default_value_t = Target::JavaScript)]
    target: Target,

    /// Render every target
    #[arg(long, conflicts_with = "target")]
    all: bool,

    /// Output file (with --all, the stem for one file per target)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only validate the program
    #[arg(long)]
    check: bool,

    /// Print the flattened program (for debugging)
    #[arg(long)]
    flatten: bool,

    /// Spaces per indentation level
    #[arg(long, value_name = "N", default_value_t = 4)]
    indent: usize,

    /// Name of the VBA entry-point Sub
    #[arg(long, value_name = "NAME", default_value = "Main")]
    entry_point: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let source = match fs::read_to_string(&args.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {}", args.input.display(), e);
            std::process::exit(1);
        }
    };
    let program = match Program::from_json(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing '{}': {}", args.input.display(), e);
            std::process::exit(1);
        }
    };
    debug!("loaded {} root statement(s)", program.len());

    if args.flatten {
        for (line, item) in flatten(&program).iter().enumerate() {
            println!(
                "{:4} {}{} {:?}",
                line + 1,
                "  ".repeat(item.depth),
                item.kind,
                item.tokens
            );
        }
        return;
    }

    let report = validate(&program);
    if report.has_error() {
        for err in &report.errors {
            eprintln!("{}: {}", args.input.display(), err);
        }
        std::process::exit(1);
    }
    if args.check {
        println!("{}: OK", args.input.display());
        return;
    }

    let options = RenderOptions {
        indent_width: args.indent,
        entry_point: args.entry_point.clone(),
    };
    let cache = TransliterationCache::new();

    let result = if args.all {
        render_every_target(program, &options, &cache, args.output.as_deref()).await
    } else {
        render_one(&program, args.target, &options, &cache, args.output.as_deref()).await
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn render_one(
    program: &Program,
    target: Target,
    options: &RenderOptions,
    cache: &TransliterationCache,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let idents = if target.requires_ascii_identifiers() {
        resolve_identifiers(program, &CodepointTransliterator, cache).await?
    } else {
        IdentifierMap::new()
    };
    let code = render_with(program, target, options, &idents)?;
    match output {
        Some(path) => {
            fs::write(path, code)?;
            info!("wrote {} to {}", target, path.display());
        }
        None => print!("{}", code),
    }
    Ok(())
}

async fn render_every_target(
    program: Program,
    options: &RenderOptions,
    cache: &TransliterationCache,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let outputs = render_all(Arc::new(program), options, &CodepointTransliterator, cache).await?;
    for (target, code) in outputs {
        match output {
            Some(stem) => {
                let path = stem.with_extension(target.extension());
                fs::write(&path, code)?;
                info!("wrote {} to {}", target, path.display());
            }
            None => {
                println!("==> {} <==", target);
                print!("{}", code);
                println!();
            }
        }
    }
    Ok(())
}
