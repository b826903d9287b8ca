//! nether-assemble - Nethercore content assembler
//!
//! Loads a parsed interchange document (JSON), assembles it into welded
//! meshes, skeletons, a flattened scene and animation clips, and writes the
//! result as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nether_assembly::{assemble_content, AssemblyOptions};
use nether_dae::Document;
use std::path::{Path, PathBuf};

mod config;
mod inspect;

use config::AssembleConfig;

#[derive(Parser)]
#[command(name = "nether-assemble")]
#[command(about = "Nethercore content assembler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a document into renderer-ready content
    Assemble {
        /// Input document (JSON)
        document: PathBuf,

        /// Path to assemble.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output JSON file (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bone influences kept per vertex
        #[arg(long)]
        max_influences: Option<usize>,

        /// Keep the document's up axis
        #[arg(long)]
        no_up_axis: bool,

        /// Keep the document's unit
        #[arg(long)]
        no_unit_scale: bool,

        /// Process meshes and clips on one thread
        #[arg(long)]
        sequential: bool,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List what a document contains without assembling it
    Inspect {
        /// Input document (JSON)
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match &cli.command {
        Commands::Assemble { verbose: true, .. } => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Assemble {
            document,
            config,
            output,
            max_influences,
            no_up_axis,
            no_unit_scale,
            sequential,
            pretty,
            verbose: _,
        } => {
            let (settings, config_output) = match &config {
                Some(path) => {
                    let settings = AssembleConfig::load(path)?;
                    let config_output = settings.output_path(path);
                    (settings, config_output)
                }
                None => (AssembleConfig::default(), None),
            };

            let mut options = settings.assembly;
            if let Some(max) = max_influences {
                options.max_bone_influences_per_vertex = max;
            }
            if no_up_axis {
                options.up_axis_normalization = false;
            }
            if no_unit_scale {
                options.unit_scale_normalization = false;
            }
            if sequential {
                options.parallel = false;
            }

            let output = output
                .or(config_output)
                .unwrap_or_else(|| document.with_extension("content.json"));
            tracing::info!("Assembling {:?} -> {:?}", document, output);

            let doc = load_document(&document)?;
            assemble_to_file(&doc, &options, &output, pretty || settings.output.pretty)?;
            tracing::info!("Done!");
        }

        Commands::Inspect { document } => {
            let doc = load_document(&document)?;
            inspect::list_document(&doc, &document);
        }
    }

    Ok(())
}

/// Read and validate a JSON document
fn load_document(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    let doc: Document = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse document: {}", path.display()))?;
    doc.validate()
        .with_context(|| format!("Invalid document: {}", path.display()))?;
    Ok(doc)
}

fn assemble_to_file(
    doc: &Document,
    options: &AssemblyOptions,
    output: &Path,
    pretty: bool,
) -> Result<()> {
    let content = assemble_content(doc, options).context("Assembly failed")?;
    tracing::info!(
        "Assembled {} meshes, {} clips, {} nodes",
        content.meshes.len(),
        content.clips.len(),
        content.nodes.len()
    );
    inspect::summarize_content(&content);

    let json = if pretty {
        serde_json::to_string_pretty(&content)?
    } else {
        serde_json::to_string(&content)?
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    Ok(())
}
