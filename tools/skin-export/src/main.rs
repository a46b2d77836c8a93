//! skin-export - skin weight exporter/importer
//!
//! Exports the influence weights of a binding in a scene file to a JSON
//! document, and imports such a document back onto a binding.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use skin_export::{OverwritePrompt, SceneFile, SessionConfig, TransferSession};

#[derive(Parser)]
#[command(name = "skin-export")]
#[command(about = "Skin weight exporter/importer")]
#[command(version)]
struct Cli {
    /// Path to skin-export.toml (default: ./skin-export.toml, then user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bindings in a scene
    List {
        /// Scene file (JSON)
        scene: PathBuf,
    },

    /// Export a binding's weights to a JSON document
    Export {
        /// Scene file (JSON)
        scene: PathBuf,

        /// Binding to export
        binding: String,

        /// Output directory (default: export_dir from config, "{project}/data")
        #[arg(short, long)]
        dir: Option<String>,

        /// File name without extension (default: binding name)
        #[arg(short, long)]
        name: Option<String>,

        /// Full output path (overrides --dir and --name)
        #[arg(short, long)]
        output: Option<String>,

        /// Creator recorded in the document (default: config, then login name)
        #[arg(short, long)]
        creator: Option<String>,

        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Import a JSON document onto a binding and save the scene
    Import {
        /// Scene file (JSON)
        scene: PathBuf,

        /// Binding to import onto
        binding: String,

        /// Weight document to import
        input: String,

        /// Validate only, do not write weights
        #[arg(long)]
        dry_run: bool,
    },

    /// Show a document's metadata
    Inspect {
        /// Weight document
        input: String,
    },
}

/// Asks on stdin before overwriting
struct StdinPrompt;

impl OverwritePrompt for StdinPrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        print!("File {} exists, overwrite? [y/N] ", path.display());
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = SessionConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::List { scene } => {
            let mut host = SceneFile::load(&scene)?;
            let session = TransferSession::new(&mut host, config);
            let bindings = session.list_candidate_bindings();
            if bindings.is_empty() {
                tracing::warn!("No bindings found in {:?}", scene);
            }
            for binding in bindings {
                println!("{}", binding);
            }
        }

        Commands::Export {
            scene,
            binding,
            dir,
            name,
            output,
            creator,
            force,
        } => {
            let creator = creator.unwrap_or_else(|| config.creator_name());
            let mut host = SceneFile::load(&scene)?;
            let mut session = TransferSession::new(&mut host, config);

            let output = match output {
                Some(path) => path,
                None => session
                    .export_path(dir.as_deref(), name.as_deref(), &binding)
                    .to_string_lossy()
                    .into_owned(),
            };
            session
                .export_with_prompt(&binding, &output, &creator, force, &mut StdinPrompt)
                .with_context(|| format!("Export of '{}' failed", binding))?;
            tracing::info!("Done!");
        }

        Commands::Import {
            scene,
            binding,
            input,
            dry_run,
        } => {
            let mut host = SceneFile::load(&scene)?;
            let mut session = TransferSession::new(&mut host, config);

            if dry_run {
                let doc = session
                    .check_import(&binding, &input)
                    .with_context(|| format!("Import onto '{}' failed", binding))?;
                tracing::info!(
                    "{:?} can be imported onto '{}' ({} influences)",
                    input,
                    binding,
                    doc.snapshot.influences.len()
                );
                return Ok(());
            }

            session
                .import(&binding, &input)
                .with_context(|| format!("Import onto '{}' failed", binding))?;
            host.save(&scene)?;
            tracing::info!("Done!");
        }

        Commands::Inspect { input } => {
            // No scene is needed; an empty one leaves relative paths as given
            let mut host = SceneFile::default();
            let session = TransferSession::new(&mut host, config);
            let summary = session
                .inspect(&input)
                .with_context(|| format!("Failed to inspect {:?}", input))?;
            println!("Name:       {}", summary.binding_id);
            println!("Mesh:       {}", summary.target_surface_id);
            println!("Creator:    {}", summary.meta.creator);
            println!("Created:    {}", summary.meta.created_at);
            println!("Platform:   {}", summary.meta.platform_version);
            println!("Vertices:   {}", summary.vertex_count);
            println!("Influences: {}", summary.influence_names.join(", "));
        }
    }

    Ok(())
}
