use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::definitions::Platform;

/// Command-line arguments for the artifact-collector tool.
///
/// Definitions are loaded from YAML files passed per subcommand; the
/// `collect` subcommand additionally accepts inline definitions that are
/// layered onto a copy of the loaded registry.
#[derive(Parser, Debug)]
#[clap(name = "artifact-collector", about = "Declarative forensic artifact collector")]
pub struct Args {
    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the collector.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect one or more artifacts and print their result rows
    Collect {
        /// Artifact names to collect
        #[clap(required = true)]
        artifacts: Vec<String>,

        /// Additional YAML files with artifact definitions to load
        #[clap(short = 'f', long = "artifact-file")]
        artifact_files: Vec<PathBuf>,

        /// Inline artifact definitions in YAML format
        #[clap(short = 'd', long = "definition")]
        definitions: Vec<String>,

        /// Platform to collect for (default: the running host)
        #[clap(long)]
        target_os: Option<Platform>,

        /// Write a JSON collection summary to this path
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// List known artifact definitions
    List {
        /// Filter artifact names by this regular expression
        #[clap(short = 'e', long, default_value = ".")]
        regex: String,

        /// YAML files with artifact definitions to load
        #[clap(short = 'f', long = "artifact-file")]
        artifact_files: Vec<PathBuf>,

        /// Show artifacts for these platforms (default: the running host)
        #[clap(long = "supported-os")]
        supported_os: Vec<Platform>,

        /// Only show artifacts carrying one of these labels
        #[clap(short, long = "label")]
        labels: Vec<String>,
    },

    /// Write a starter definitions file
    InitDefinitions {
        /// Path of the definitions file to create
        #[clap(default_value = "artifact_definitions.yaml")]
        path: PathBuf,
    },
}
