use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jamdoc::{api, pdf};
use jamdoc_core::models::Snapshot;
use jamdoc_core::Database;

#[derive(Parser)]
#[command(name = "jamdoc")]
#[command(about = "Local-first GDD and task tracking for game developers")]
struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the local HTTP API for the browser front-end
    Serve {
        /// Port to listen on (loopback only)
        #[arg(short, long, default_value = "7151")]
        port: u16,
    },
    /// Export a project's GDD as a PDF
    Export {
        project_id: i64,

        /// Output file (defaults to a name derived from the title)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Company shown on the cover
        #[arg(long, default_value = "")]
        company: String,

        /// Authors shown on the cover
        #[arg(long, default_value = "")]
        authors: String,

        /// Document version shown on the cover
        #[arg(long, default_value = "1.0.0")]
        doc_version: String,
    },
    /// Write the whole data set to a JSON backup file
    Backup { output: PathBuf },
    /// Replace the whole data set from a JSON backup file
    Restore { input: PathBuf },
    /// Delete all projects, tasks and notes
    Reset {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
    /// Print the dashboard counters
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "jamdoc=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let db = match &cli.db {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    match cli.command.unwrap_or(Commands::Serve { port: 7151 }) {
        Commands::Serve { port } => {
            let app = api::create_router(db);
            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("JamDoc listening on http://127.0.0.1:{}", port);
            axum::serve(listener, app).await?;
        }
        Commands::Export {
            project_id,
            output,
            company,
            authors,
            doc_version,
        } => {
            let project = db
                .get_project(project_id)?
                .with_context(|| format!("no project with id {project_id}"))?;
            let meta = pdf::CoverMeta {
                company,
                authors,
                version: doc_version,
            };
            let bytes = pdf::render_gdd(&project, &meta)?;
            let path = output.unwrap_or_else(|| PathBuf::from(pdf::gdd_file_name(&project)));
            std::fs::write(&path, bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("GDD written to {}", path.display());
        }
        Commands::Backup { output } => {
            let snapshot = db.export_snapshot()?;
            let json = serde_json::to_string_pretty(&snapshot)?;
            std::fs::write(&output, json)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Backup written to {} ({} projects, {} tasks, {} notes)",
                output.display(),
                snapshot.projects.len(),
                snapshot.tasks.len(),
                snapshot.notes.len()
            );
        }
        Commands::Restore { input } => {
            let json = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let snapshot: Snapshot =
                serde_json::from_str(&json).context("not a valid JamDoc backup file")?;
            db.import_snapshot(&snapshot)?;
            println!(
                "Restored {} projects, {} tasks, {} notes",
                snapshot.projects.len(),
                snapshot.tasks.len(),
                snapshot.notes.len()
            );
        }
        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("this deletes every project, task and note; rerun with --yes");
            }
            db.reset()?;
            println!("All data cleared");
        }
        Commands::Stats => {
            let stats = db.stats()?;
            println!("Active projects: {}", stats.active_projects);
            println!("Active jams:     {}", stats.active_jams);
            println!("Pending tasks:   {}", stats.pending_tasks);
        }
    }

    Ok(())
}
