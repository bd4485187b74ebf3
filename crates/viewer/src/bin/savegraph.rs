use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use extract::DocumentShape;
use graph::{LabelPolicy, MissingTargets, to_mermaid};
use std::path::PathBuf;
use store::{ListingLimits, SaveEntry, SaveStore};
use viewer::{GraphRequest, SavesClient, ViewerSession, build_payload, render};

#[derive(Parser)]
#[command(name = "savegraph")]
#[command(about = "Browse game saves and show their situation graphs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the saves API
    #[arg(long, global = true, env = "SAVES_SERVER", default_value = "http://localhost:3000")]
    server: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List folders that contain saves
    Folders,

    /// List save files, optionally inside one folder
    Files {
        #[arg(long)]
        folder: Option<String>,
    },

    /// Print the raw JSON of a save
    Raw { path: String },

    /// Show the situation graph of a save
    Show {
        path: String,
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Show the situation graph of the newest save in a folder
    Latest {
        folder: String,
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Print a save as a Mermaid flowchart
    Mermaid {
        path: String,
        #[command(flatten)]
        graph: GraphArgs,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a graph from a local saves directory without a server
    Export {
        path: String,
        /// Saves directory the path is relative to
        #[arg(long, env = "SAVES_ROOT", default_value = "../saves")]
        root: PathBuf,
        #[command(flatten)]
        graph: GraphArgs,
        #[arg(long, value_enum, default_value_t = ExportFormat::Text)]
        format: ExportFormat,
    },
}

#[derive(Args, Clone, Copy)]
struct GraphArgs {
    /// Force one save shape instead of detecting it
    #[arg(long)]
    shape: Option<DocumentShape>,
    /// Node labels: full, first_sentence or max_chars:N
    #[arg(long)]
    labels: Option<LabelPolicy>,
    /// Missing targets: auto, synthesize or dangling
    #[arg(long)]
    missing: Option<MissingTargets>,
}

impl From<GraphArgs> for GraphRequest {
    fn from(args: GraphArgs) -> Self {
        GraphRequest {
            shape: args.shape,
            labels: args.labels,
            missing: args.missing,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Text,
    Mermaid,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Export {
            path,
            root,
            graph,
            format,
        } => export(root, &path, graph.into(), format),
        command => {
            let client = SavesClient::new(&cli.server)?;
            run_remote(&client, command).await
        }
    }
}

async fn run_remote(client: &SavesClient, command: Commands) -> Result<()> {
    tracing::debug!(server = %client.base_url(), "Using saves API");
    match command {
        Commands::Folders => {
            let mut session = ViewerSession::new();
            session.set_folders(client.list_folders().await);
            if let Some(error) = session.last_error() {
                anyhow::bail!("{}", error);
            }
            print_entries(session.folders());
        }
        Commands::Files { folder } => print_entries(&client.list_files(folder.as_deref()).await?),
        Commands::Raw { path } => {
            let doc = client.fetch_document(&path).await?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Commands::Show { path, graph } => {
            let mut session = ViewerSession::new();
            show_file(client, &mut session, path, graph.into()).await;
            println!("{}", render::render_session(&session));
        }
        Commands::Latest { folder, graph } => latest(client, folder, graph.into()).await?,
        Commands::Mermaid {
            path,
            graph,
            output,
        } => {
            let chart = client.fetch_mermaid(&path, graph.into()).await?;
            write_output(output, &chart)?;
        }
        Commands::Export { path, root, graph, format } => export(root, &path, graph.into(), format)?,
    }
    Ok(())
}

async fn show_file(client: &SavesClient, session: &mut ViewerSession, path: String, request: GraphRequest) {
    let ticket = session.select_file(path.clone());
    let result = client.fetch_graph(&path, request).await;
    session.apply_graph(ticket, result);
}

/// Walk the same steps as the interactive viewer: pick the folder, load its
/// files, then open the newest save.
async fn latest(client: &SavesClient, folder: String, request: GraphRequest) -> Result<()> {
    let mut session = ViewerSession::new();
    let ticket = session.select_folder(folder.clone());
    session.apply_files(ticket, client.list_files(Some(&folder)).await);
    if session.files().is_empty() {
        println!("No saves in {}", folder);
        return Ok(());
    }

    let entry = client
        .latest(&folder)
        .await
        .with_context(|| format!("Failed to find the latest save in {}", folder))?;
    println!("{} of {} saves in {}", entry.name, session.files().len(), folder);

    show_file(client, &mut session, entry.path, request).await;
    println!("{}", render::render_session(&session));
    Ok(())
}

fn export(root: PathBuf, path: &str, request: GraphRequest, format: ExportFormat) -> Result<()> {
    let store = SaveStore::new(root, ListingLimits::default());
    let payload = build_payload(&store, path, request)?;

    let text = match format {
        ExportFormat::Text => render::render_payload(&payload),
        ExportFormat::Mermaid => to_mermaid(&payload.graph),
        ExportFormat::Json => serde_json::to_string_pretty(&payload.graph)?,
    };
    println!("{}", text);
    Ok(())
}

fn print_entries(entries: &[SaveEntry]) {
    if entries.is_empty() {
        println!("(none)");
    }
    for entry in entries {
        println!("{}", entry.path);
    }
}

fn write_output(output: Option<PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, text).with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!("Wrote {:?}", path);
        }
        None => println!("{}", text),
    }
    Ok(())
}
