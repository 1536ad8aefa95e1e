#![allow(dead_code)]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

mod config;
mod error;
mod generator;
mod parser;
mod scanner;

use config::Config;
use error::Error;
use generator::{Generator, Outcome};
use parser::GoParser;

#[derive(Parser)]
#[command(name = "enum-gen")]
#[command(about = "Directive-driven enum code generator for Go sources")]
#[command(version)]
struct Cli {
    /// Input glob pattern, or a directory to scan recursively
    #[arg(short, long)]
    input: Option<String>,

    /// Output directory for generated files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Package name for generated files
    #[arg(short, long)]
    package: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reject empty, duplicate, or non-identifier member names
    #[arg(long)]
    strict: bool,

    /// Skip regeneration only when the existing file matches the rendered
    /// output exactly, instead of the identity-header check
    #[arg(long)]
    hash_guard: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = try_main() {
        // One-line diagnostic on stdout, non-zero exit.
        println!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };

    run(&cli, &config)
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let input = cli
        .input
        .clone()
        .or_else(|| config.input.clone())
        .unwrap_or_else(|| "*".to_string());
    let strict = cli.strict || config.strict;
    let hash_guard = cli.hash_guard || config.hash_guard;

    let files = scanner::discover(&input)?;
    if files.is_empty() {
        return Err(Error::Discovery {
            pattern: input,
            detail: "no files matched".to_string(),
        }
        .into());
    }
    if cli.verbose {
        println!("Scanning {} candidate files", files.len());
    }

    // Infer the output directory and package name from the first input
    // file when either is unset.
    let mut output_dir = cli.output_dir.clone().or_else(|| config.output_dir.clone());
    let mut package = cli.package.clone().or_else(|| config.package.clone());
    if output_dir.is_none() || package.is_none() {
        let (inferred_dir, inferred_pkg) = infer_defaults(&files[0])?;
        output_dir.get_or_insert(inferred_dir);
        package.get_or_insert(inferred_pkg);
    }
    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
    let package = package.unwrap_or_default();

    let enums = GoParser::with_strict(strict).parse_enums(&files)?;
    if cli.verbose {
        println!("Extracted {} annotated enums", enums.len());
    }

    let generator = Generator::with_hash_guard(hash_guard);
    let mut generated = 0;
    let mut skipped = 0;
    for enum_info in &enums {
        match generator.generate(&output_dir, &package, enum_info)? {
            Outcome::Generated(path) => {
                generated += 1;
                if cli.verbose {
                    println!("  [generated] {}", path.display());
                }
            }
            Outcome::Skipped(path) => {
                skipped += 1;
                if cli.verbose {
                    println!("  [skipped] {}", path.display());
                }
            }
        }
    }

    println!(
        "Enum generation completed: {} generated, {} skipped",
        generated, skipped
    );
    Ok(())
}

fn infer_defaults(first: &Path) -> Result<(PathBuf, String)> {
    let abs = std::fs::canonicalize(first)
        .with_context(|| format!("Failed to resolve input file {:?}", first))?;
    let dir = abs
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let package = parser::package_clause(first)?;
    Ok((dir, package))
}
