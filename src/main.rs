use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use mooseblocks::generator::dump;
use mooseblocks::model::{CatalogDoc, forest_structurally_eq};
use mooseblocks::parser::{parse_file, parse_with_warnings};
use mooseblocks::schema::{FsSource, SchemaLoader};
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(author, version, about = "Read MOOSE block schemas and GetPot input files", long_about = None)]
struct Cli {
    /// Log filter (e.g. "debug" or "mooseblocks::parser=debug"); defaults to RUST_LOG or "warn"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a YAML schema (and its sibling .syntax file) and print the catalog as JSON
    Schema {
        #[arg(value_name = "SCHEMA_FILE")]
        schema_file: Utf8PathBuf,
        /// Also write a binary catalog cache to this path
        #[arg(long)]
        cache: Option<Utf8PathBuf>,
    },
    /// Parse a GetPot input file and print the blocks as JSON
    Parse {
        #[arg(value_name = "INPUT_FILE")]
        input_file: Utf8PathBuf,
    },
    /// Parse a GetPot input file and write it back in canonical form
    Dump {
        #[arg(value_name = "INPUT_FILE")]
        input_file: Utf8PathBuf,
    },
    /// Round-trip every *.i file below a directory and report unstable ones
    Check {
        #[arg(value_name = "DIR")]
        dir: Utf8PathBuf,
    },
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Command::Schema { schema_file, cache } => {
            let mut loader = SchemaLoader::new(FsSource);
            let catalog = loader
                .load_schema_file(&schema_file)
                .with_context(|| format!("Failed to load schema {}", schema_file))?;
            info!(
                "{}: {} blocks, adaptive at {:?}",
                schema_file,
                catalog.blocks.len(),
                catalog.adaptive_positions()
            );
            let json = serde_json::to_string_pretty(&catalog)?;
            println!("{}", json);
            if let Some(cache) = cache {
                CatalogDoc { catalog }
                    .save_to_binary(&cache)
                    .with_context(|| format!("Write cache {}", cache))?;
            }
        }
        Command::Parse { input_file } => {
            let parsed = parse_file(&mut FsSource, &input_file)
                .with_context(|| format!("Failed to parse {}", input_file))?;
            let json = serde_json::to_string_pretty(&parsed.blocks)?;
            println!("{}", json);
        }
        Command::Dump { input_file } => {
            let parsed = parse_file(&mut FsSource, &input_file)
                .with_context(|| format!("Failed to parse {}", input_file))?;
            print!("{}", dump(&parsed.blocks));
        }
        Command::Check { dir } => {
            let files: Vec<Utf8PathBuf> = WalkDir::new(&dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter_map(|e| Utf8PathBuf::from_path_buf(e.into_path()).ok())
                .filter(|p| p.extension() == Some("i"))
                .collect();
            let failures: Vec<(Utf8PathBuf, String)> = files
                .par_iter()
                .filter_map(|p| check_roundtrip(p).err().map(|e| (p.clone(), format!("{:#}", e))))
                .collect();
            for (path, err) in &failures {
                println!("{}: {}", path, err);
            }
            println!(
                "\n{}/{} files stable, {} failed",
                files.len() - failures.len(),
                files.len(),
                failures.len()
            );
            if !failures.is_empty() {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

/// Parse, dump and re-parse one input file, failing if the structure changed.
fn check_roundtrip(path: &Utf8Path) -> Result<()> {
    let parsed = parse_file(&mut FsSource, path)?;
    for w in &parsed.warnings {
        warn!("{}: {}", path, w);
    }
    let text = dump(&parsed.blocks);
    let reparsed = parse_with_warnings(&text);
    if !reparsed.warnings.is_empty() {
        anyhow::bail!("{} warnings after round trip", reparsed.warnings.len());
    }
    if !forest_structurally_eq(&parsed.blocks, &reparsed.blocks) {
        anyhow::bail!("structure changed after round trip");
    }
    Ok(())
}
