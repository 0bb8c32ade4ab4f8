use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use onyx_sdk::{
    ClientConfig, CodeEntityKind, ConfigOverrides, CreateEdgeRequest, CreateNodeRequest, EdgeType,
    IngestCodeUnitRequest, Language, MergeBranchRequest, NodeType, OnyxClient, SearchRequest,
};

/// Onyx: command-line client for a remote Onyx knowledge store
#[derive(Parser)]
#[command(name = "onyx")]
#[command(about = "Talk to an Onyx server: nodes, edges, semantic search, history and ingestion.")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    conn: ConnectionArgs,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Server origin; overrides the config file
    #[arg(long, env = "ONYX_BASE_URL", global = true)]
    base_url: Option<String>,
    /// Bearer credential
    #[arg(long, env = "ONYX_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// Config file (TOML/YAML/JSON) with base_url, api_key, timeout_secs
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the server is up
    Health,
    /// Node operations
    #[command(subcommand)]
    Node(NodeCommand),
    /// Edge operations
    #[command(subcommand)]
    Edge(EdgeCommand),
    /// Run a semantic query
    Search {
        /// Query embedding, comma-separated (e.g. 0.1,0.2,0.3)
        #[arg(short, long)]
        embedding: String,
        /// Number of results
        #[arg(short, long)]
        top_k: Option<usize>,
        /// Maximum traversal depth
        #[arg(short, long)]
        depth: Option<usize>,
        /// Edge types to follow (comma-separated: calls,imports,defines,...)
        #[arg(short, long)]
        relations: Option<String>,
        /// Include version summaries in results
        #[arg(long)]
        history: bool,
        /// Minimum edge confidence
        #[arg(long)]
        min_confidence: Option<f64>,
    },
    /// Version history and branches
    #[command(subcommand)]
    History(HistoryCommand),
    /// Ingest a source file as a single code unit
    Ingest {
        /// Path to the source file
        #[arg(short, long)]
        file: PathBuf,
        /// Entity name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,
        /// Entity kind (function, struct, module, ...)
        #[arg(short, long, default_value = "module")]
        kind: String,
        /// Language (defaults from the file extension)
        #[arg(short, long)]
        language: Option<String>,
        /// Commit the content belongs to
        #[arg(long)]
        commit: Option<String>,
        /// Branch the content belongs to
        #[arg(long)]
        branch: Option<String>,
    },
}

#[derive(Subcommand)]
enum NodeCommand {
    /// Show a node
    Get { id: Uuid },
    /// List nodes
    List {
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long, default_value = "50")]
        per_page: usize,
    },
    /// Create a node
    Create {
        #[arg(short, long)]
        name: String,
        /// Inline content
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read content from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Code entity kind; omit to let the server decide
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Delete a node and its edges
    Delete { id: Uuid },
    /// Show direct neighbors
    Neighbors { id: Uuid },
    /// Extract a subgraph
    Subgraph {
        id: Uuid,
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },
}

#[derive(Subcommand)]
enum EdgeCommand {
    /// Show an edge
    Get { id: Uuid },
    /// List all edges
    List,
    /// Create an edge
    Create {
        #[arg(long)]
        source: Uuid,
        #[arg(long)]
        target: Uuid,
        /// Relationship (calls, imports, defines, ...)
        #[arg(short, long)]
        relation: String,
        #[arg(long)]
        confidence: Option<f64>,
    },
    /// Delete an edge
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List versions of an entity
    Versions { entity: Uuid },
    /// Show one version
    Version { id: String },
    /// Print an entity's content at a version
    Content { entity: Uuid, version: String },
    /// List branches
    Branches,
    /// Show a branch
    Branch { name: String },
    /// Merge one branch into another
    Merge { source: String, target: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn resolve_config(conn: &ConnectionArgs) -> Result<ClientConfig> {
    let overrides = ConfigOverrides {
        base_url: conn.base_url.clone(),
        api_key: conn.api_key.clone(),
        timeout_secs: conn.timeout,
    };
    ClientConfig::load_with(conn.config.as_deref(), overrides)
        .context("no usable configuration; pass --base-url or --config")
}

async fn run(cli: Cli) -> Result<()> {
    let client = OnyxClient::new(resolve_config(&cli.conn)?)?;

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await;
            println!("{}", if healthy { "ok" } else { "unreachable" });
            if !healthy {
                std::process::exit(2);
            }
        }
        Commands::Node(cmd) => run_node(&client, cmd).await?,
        Commands::Edge(cmd) => run_edge(&client, cmd).await?,
        Commands::Search {
            embedding,
            top_k,
            depth,
            relations,
            history,
            min_confidence,
        } => {
            let mut req = SearchRequest::new(parse_embedding(&embedding)?);
            if let Some(k) = top_k {
                req = req.top_k(k);
            }
            if let Some(d) = depth {
                req = req.max_depth(d);
            }
            if let Some(rel) = relations {
                req = req.edge_types(parse_edge_types(&rel)?);
            }
            if history {
                req = req.include_history(true);
            }
            if let Some(c) = min_confidence {
                req = req.min_confidence(c);
            }
            print_json(&client.search().query(req).await?)?;
        }
        Commands::History(cmd) => run_history(&client, cmd).await?,
        Commands::Ingest {
            file: path,
            name,
            kind,
            language,
            commit,
            branch,
        } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = match name {
                Some(n) => n,
                None => path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .context("cannot derive a name from the path; pass --name")?,
            };
            let language = match language {
                Some(l) => l.parse::<Language>().map_err(anyhow::Error::msg)?,
                None => language_from_path(&path),
            };
            let kind = kind.parse::<CodeEntityKind>().map_err(anyhow::Error::msg)?;

            let mut req = IngestCodeUnitRequest::new(
                name,
                content,
                kind,
                language,
                path.to_string_lossy(),
            );
            if let Some(c) = commit {
                req = req.commit_id(c);
            }
            if let Some(b) = branch {
                req = req.branch(b);
            }
            print_json(&client.ingest().ingest_unit(req).await?)?;
        }
    }

    client.close();
    Ok(())
}

async fn run_node(client: &OnyxClient, cmd: NodeCommand) -> Result<()> {
    let nodes = client.nodes();
    match cmd {
        NodeCommand::Get { id } => print_json(&nodes.get(id).await?),
        NodeCommand::List { page, per_page } => print_json(&nodes.list(page, per_page).await?),
        NodeCommand::Create {
            name,
            content,
            file,
            kind,
        } => {
            let content = match (content, file) {
                (Some(c), _) => c,
                (None, Some(f)) => std::fs::read_to_string(&f)
                    .with_context(|| format!("failed to read {}", f.display()))?,
                (None, None) => bail!("either --content or --file is required"),
            };
            let mut req = CreateNodeRequest::new(name, content);
            if let Some(k) = kind {
                let kind = k.parse::<CodeEntityKind>().map_err(anyhow::Error::msg)?;
                req = req.node_type(NodeType::code_entity(kind));
            }
            print_json(&nodes.create(req).await?)
        }
        NodeCommand::Delete { id } => {
            nodes.delete(id).await?;
            println!("deleted {id}");
            Ok(())
        }
        NodeCommand::Neighbors { id } => print_json(&nodes.neighbors(id).await?),
        NodeCommand::Subgraph { id, depth } => print_json(&nodes.subgraph(id, depth).await?),
    }
}

async fn run_edge(client: &OnyxClient, cmd: EdgeCommand) -> Result<()> {
    let edges = client.edges();
    match cmd {
        EdgeCommand::Get { id } => print_json(&edges.get(id).await?),
        EdgeCommand::List => print_json(&edges.list().await?),
        EdgeCommand::Create {
            source,
            target,
            relation,
            confidence,
        } => {
            let edge_type = relation.parse::<EdgeType>().map_err(anyhow::Error::msg)?;
            let mut req = CreateEdgeRequest::new(edge_type, source, target);
            if let Some(c) = confidence {
                req = req.confidence(c);
            }
            print_json(&edges.create(req).await?)
        }
        EdgeCommand::Delete { id } => {
            edges.delete(id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

async fn run_history(client: &OnyxClient, cmd: HistoryCommand) -> Result<()> {
    let history = client.history();
    match cmd {
        HistoryCommand::Versions { entity } => print_json(&history.list_versions(entity).await?),
        HistoryCommand::Version { id } => print_json(&history.get_version(&id).await?),
        HistoryCommand::Content { entity, version } => {
            print!("{}", history.get_content_at_version(entity, &version).await?);
            Ok(())
        }
        HistoryCommand::Branches => print_json(&history.list_branches().await?),
        HistoryCommand::Branch { name } => print_json(&history.get_branch(&name).await?),
        HistoryCommand::Merge { source, target } => print_json(
            &history
                .merge_branch(MergeBranchRequest::new(source, target))
                .await?,
        ),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_embedding(raw: &str) -> Result<Vec<f32>> {
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f32>()
                .with_context(|| format!("invalid embedding component '{s}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.is_empty() {
        bail!("embedding must contain at least one number");
    }
    Ok(values)
}

fn parse_edge_types(raw: &str) -> Result<Vec<EdgeType>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<EdgeType>().map_err(anyhow::Error::msg))
        .collect()
}

fn language_from_path(path: &std::path::Path) -> Language {
    match path.extension().and_then(|e| e.to_str()) {
        Some("rs") => Language::Rust,
        Some("py") => Language::Python,
        Some("ts") | Some("tsx") => Language::TypeScript,
        Some("js") | Some("jsx") | Some("mjs") => Language::JavaScript,
        Some("go") => Language::Go,
        Some(other) => Language::Other(other.to_string()),
        None => Language::Other("unknown".to_string()),
    }
}
