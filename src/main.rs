use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trawl::indexing::{ScipIndexOutcome, ScipIndexer};
use trawl::io::ExitCode;
use trawl::vector::{FastEmbedGenerator, VectorStore};
use trawl::{IndexPipeline, ProjectRegistry, SearchRouter, SearchType, Settings};

#[derive(Parser)]
#[command(
    name = "trawl",
    version,
    about = "Multi-modal code search: semantic, literal, and structural"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a project
    #[command(about = "Register a project directory under a unique name")]
    Add {
        /// Unique project name
        name: String,
        /// Path to the project directory
        path: PathBuf,
    },

    /// Remove a project
    #[command(about = "Remove a project from the registry")]
    Remove { name: String },

    /// List projects
    #[command(about = "List registered projects")]
    List,

    /// Build the semantic index
    #[command(
        about = "Build or refresh a project's semantic index",
        after_help = "Embeds every Java method body in the project and upserts it into the\nproject's vector collection. The first run downloads the embedding model."
    )]
    Index { name: String },

    /// Build the structural index
    #[command(
        name = "index-scip",
        about = "Build a project's structural (SCIP) index via scip-java"
    )]
    IndexScip { name: String },

    /// Search a project
    #[command(
        about = "Search a registered project",
        after_help = "Examples:\n  trawl search sample-java \"how to greet someone\"\n  trawl search sample-java 'System.out.println' --type literal\n  trawl search sample-java com.example.Main.greet --type structural"
    )]
    Search {
        /// Project to search
        name: String,
        /// The query; for structural search use a dotted name like com.example.Main.greet
        query: String,
        #[arg(long = "type", value_enum, default_value = "semantic")]
        search_type: SearchType,
        /// Number of results (semantic only)
        #[arg(short = 'k', long, default_value_t = 5)]
        limit: usize,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .trawl/settings.toml")]
    Config,

    /// Start the HTTP query API
    #[command(about = "Start the HTTP query API")]
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.into());
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut settings = Settings::load().context("failed to load configuration")?;

    match cli.command {
        Commands::Add { name, path } => {
            if !path.is_dir() {
                eprintln!(
                    "Error: path '{}' does not exist or is not a directory",
                    path.display()
                );
                return Ok(ExitCode::IoError);
            }
            let registry = ProjectRegistry::open(&settings.registry_db_path())?;
            match registry.register(&name, &path) {
                Ok(_) => {
                    println!("Project '{name}' added at '{}'.", path.display());
                    Ok(ExitCode::Success)
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    Ok(ExitCode::from_registry_error(&e))
                }
            }
        }

        Commands::Remove { name } => {
            let registry = ProjectRegistry::open(&settings.registry_db_path())?;
            registry.remove(&name)?;
            println!("Project '{name}' removed.");
            Ok(ExitCode::Success)
        }

        Commands::List => {
            let registry = ProjectRegistry::open(&settings.registry_db_path())?;
            let projects = registry.list()?;
            if projects.is_empty() {
                println!("No projects registered.");
                return Ok(ExitCode::Success);
            }
            for project in projects {
                let last_indexed = project
                    .last_indexed_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "Never".to_string());
                println!("{}", project.name);
                println!("  Path: {}", project.path.display());
                println!("  Last indexed: {last_indexed}");
            }
            Ok(ExitCode::Success)
        }

        Commands::Index { name } => {
            let registry = ProjectRegistry::open(&settings.registry_db_path())?;
            let store = VectorStore::new(settings.vector_path());
            let embedder = FastEmbedGenerator::new(
                &settings.indexing.embedding_model,
                &settings.model_cache_path(),
            )?;
            let pipeline = IndexPipeline::new(registry, store, Arc::new(embedder));

            match pipeline.run(&name) {
                Ok(report) => {
                    println!(
                        "Indexed {} methods from {} files ({} skipped).",
                        report.snippets_indexed, report.files_processed, report.files_skipped
                    );
                    Ok(ExitCode::Success)
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    Ok(ExitCode::from_index_error(&e))
                }
            }
        }

        Commands::IndexScip { name } => {
            let registry = ProjectRegistry::open(&settings.registry_db_path())?;
            let project_root = registry.resolve(&name)?;
            let indexer = ScipIndexer::new(
                settings.structural.indexer_bin.clone(),
                settings.scip_index_dir(),
            );
            match indexer.build_index(&name, &project_root) {
                ScipIndexOutcome::Success(path) => {
                    println!("Structural index written to '{}'.", path.display());
                    Ok(ExitCode::Success)
                }
                ScipIndexOutcome::ToolMissing => {
                    eprintln!(
                        "Error: '{}' not found on PATH. Install it and retry",
                        settings.structural.indexer_bin
                    );
                    Ok(ExitCode::ToolMissing)
                }
                ScipIndexOutcome::ToolError { code, stderr } => {
                    eprintln!(
                        "Error: {} failed (exit code {code:?}): {stderr}",
                        settings.structural.indexer_bin
                    );
                    Ok(ExitCode::GeneralError)
                }
            }
        }

        Commands::Search {
            name,
            query,
            search_type,
            limit,
        } => {
            let router = SearchRouter::new(Arc::new(settings));
            match router.route(&name, search_type, &query, limit) {
                Ok(response) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                    Ok(ExitCode::Success)
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    Ok(ExitCode::from_search_error(&e))
                }
            }
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&settings)?);
            Ok(ExitCode::Success)
        }

        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.server.bind = bind;
            }
            trawl::server::serve(Arc::new(settings)).await?;
            Ok(ExitCode::Success)
        }
    }
}
