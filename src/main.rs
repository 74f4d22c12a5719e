use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{info, warn, LevelFilter};
use regex::Regex;
use serde_json::Value;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

mod capabilities;
mod cli;
mod collectors;
mod constants;
mod definitions;
mod errors;
mod models;
mod schema;
mod utils;

use capabilities::Capabilities;
use cli::{Args, Commands};
use collectors::Collector;
use definitions::{parse_documents, Platform, Registry, STARTER_DEFINITIONS};
use models::{ArtifactResult, OutputRow};

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.verbose)?;

    match args.command {
        Commands::Collect { artifacts, artifact_files, definitions, target_os, output } => {
            run_collect(&artifacts, &artifact_files, &definitions, target_os, output.as_deref())
        }
        Commands::List { regex, artifact_files, supported_os, labels } => {
            run_list(&regex, &artifact_files, &supported_os, &labels)
        }
        Commands::InitDefinitions { path } => init_definitions(&path),
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}

/// Load definition files into a fresh registry, best-effort per document.
fn load_registry(artifact_files: &[PathBuf]) -> Result<Registry> {
    let mut registry = Registry::new();
    for path in artifact_files {
        let added = registry.load_yaml_file(path)?;
        info!("Loaded {} definitions from {}", added, path.display());
    }
    Ok(registry)
}

fn run_collect(
    artifacts: &[String],
    artifact_files: &[PathBuf],
    inline: &[String],
    target_os: Option<Platform>,
    output: Option<&Path>,
) -> Result<()> {
    let mut registry = load_registry(artifact_files)?;

    // Inline definitions are layered onto a copy, and unlike file loading
    // they fail hard on a bad document.
    if !inline.is_empty() {
        let mut layered = registry.clone();
        for document in inline {
            for value in parse_documents(document)? {
                layered
                    .insert(&value)
                    .map_err(|e| anyhow!("Invalid inline definition: {}", e))?;
            }
        }
        registry = layered;
    }

    let collector = Collector::new(registry, target_os, Capabilities::default())?;
    info!("Collecting {} artifacts for {}", artifacts.len(), collector.platform());

    let timestamp = Utc::now().to_rfc3339();
    let mut collected = Vec::new();
    for row in collector.collect(artifacts) {
        match row? {
            OutputRow::Divider { divider } => println!("\n{}", divider),
            OutputRow::Result { result } => {
                render_result(&result);
                collected.push(result);
            }
        }
    }

    if let Some(path) = output {
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        let summary = utils::create_collection_summary(&hostname, &timestamp, artifacts, &collected)?;
        fs::write(path, summary)
            .context(format!("Failed to write summary to {}", path.display()))?;
        info!("Wrote collection summary to {}", path.display());
    }

    info!("Collection finished: {} result sets", collected.len());
    Ok(())
}

/// Print one result bundle as a plain text table.
fn render_result(result: &ArtifactResult) {
    if result.results.is_empty() {
        return;
    }

    let columns: Vec<&str> = result.fields.iter().map(|c| c.name.as_str()).collect();
    let header: Vec<String> = columns.iter().map(|name| format!("{:<20}", name)).collect();
    let rule: Vec<String> = columns
        .iter()
        .map(|name| format!("{:<20}", "-".repeat(name.len())))
        .collect();
    println!("{}", header.join(" "));
    println!("{}", rule.join(" "));

    for row in &result.results {
        let cells: Vec<String> = columns
            .iter()
            .map(|name| format!("{:<20}", row.get(*name).map(render_cell).unwrap_or_default()))
            .collect();
        println!("{}", cells.join(" "));
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn run_list(
    pattern: &str,
    artifact_files: &[PathBuf],
    supported_os: &[Platform],
    labels: &[String],
) -> Result<()> {
    let registry = load_registry(artifact_files)?;
    let name_filter = Regex::new(pattern).context("Invalid artifact name regex")?;

    let os_filter: Vec<Platform> = if supported_os.is_empty() {
        match Platform::current() {
            Some(platform) => vec![platform],
            None => {
                warn!("Could not determine the host platform, listing for all");
                Platform::ALL.to_vec()
            }
        }
    } else {
        supported_os.to_vec()
    };

    println!(
        "{:<30} {:<22} {:<25} {:<30} Description",
        "Name", "OS", "Labels", "Types"
    );
    for definition in registry.definitions() {
        if !os_filter.iter().any(|p| definition.supported_os.contains(p)) {
            continue;
        }
        if !labels.is_empty() && !labels.iter().any(|l| definition.labels.contains(l)) {
            continue;
        }
        if !name_filter.is_match(&definition.name) {
            continue;
        }

        let mut types: Vec<&str> = definition
            .sources
            .iter()
            .map(|source| source.type_indicator())
            .collect();
        types.sort_unstable();
        types.dedup();

        let os: Vec<&str> = definition.supported_os.iter().map(|p| p.as_str()).collect();
        println!(
            "{:<30} {:<22} {:<25} {:<30} {}",
            definition.name,
            os.join(","),
            definition.labels.join(","),
            types.join(","),
            definition.doc
        );
    }
    Ok(())
}

fn init_definitions(path: &Path) -> Result<()> {
    fs::write(path, STARTER_DEFINITIONS)
        .context(format!("Failed to write {}", path.display()))?;
    info!("Wrote starter definitions to {}", path.display());
    Ok(())
}
