use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::resolve_config;
use crate::core::{DlcId, IdentifierResolver, LookupEntry, RequirementRow};
use crate::error::{LocographError, Result};
use crate::graph::highlight::{self, Classification};
use crate::graph::{build_graph, viz, RouteGraph};
use crate::layout::Viewport;
use crate::table::{load_lookup_table, load_network_table};
use crate::util::output;
use crate::viewer::{Snapshot, Viewer};

#[derive(Parser, Debug)]
#[command(name = "locograph")]
#[command(about = "DLC requirement graph for simulated routes", long_about = None)]
pub struct Cli {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Build(BuildArgs),
    Layout(LayoutArgs),
    Deps(DepsArgs),
    Dot(TableArgs),
}

#[derive(Args, Debug)]
pub struct TableArgs {
    #[arg(short = 'l', long)]
    pub lookup: PathBuf,
    #[arg(short = 'n', long)]
    pub network: PathBuf,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub tables: TableArgs,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub dot: bool,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub tables: TableArgs,
    #[arg(long)]
    pub json: bool,
    /// Safety valve on the total number of simulation ticks.
    #[arg(long, default_value_t = 1000)]
    pub ticks: u64,
    #[arg(long)]
    pub width: Option<f64>,
    #[arg(long)]
    pub height: Option<f64>,
    /// Also emit the highlight classification for this route.
    #[arg(long)]
    pub select: Option<String>,
}

#[derive(Args, Debug)]
pub struct DepsArgs {
    pub route: String,
    #[command(flatten)]
    pub tables: TableArgs,
    #[arg(long)]
    pub json: bool,
    /// Print the deduplicated required closure instead of per-locomotive
    /// entries.
    #[arg(long)]
    pub closure: bool,
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build(args) => handle_build(args),
        Commands::Layout(args) => handle_layout(args, cli.config),
        Commands::Deps(args) => handle_deps(args),
        Commands::Dot(args) => handle_dot(args),
    }
}

fn load_tables(tables: &TableArgs) -> Result<(Vec<LookupEntry>, Vec<RequirementRow>)> {
    let lookup = load_lookup_table(&tables.lookup)?;
    output::load_op(&format!(
        "{} ({} entries)",
        tables.lookup.display(),
        lookup.len()
    ));
    let network = load_network_table(&tables.network)?;
    output::load_op(&format!(
        "{} ({} rows)",
        tables.network.display(),
        network.len()
    ));
    Ok((lookup, network))
}

fn handle_build(args: BuildArgs) -> Result<()> {
    let (lookup, network) = load_tables(&args.tables)?;
    let resolver = IdentifierResolver::new(&lookup);
    let graph = build_graph(&network, &resolver);

    if args.dot {
        print!("{}", viz::render_dot(&graph));
        return Ok(());
    }
    if args.json {
        println!("{}", to_json(&graph)?);
        return Ok(());
    }

    print_summary(&graph);
    Ok(())
}

fn print_summary(graph: &RouteGraph) {
    println!(
        "{} nodes, {} edges, {} regions, {} routes indexed",
        graph.nodes.len(),
        graph.edges.len(),
        graph.regions.len(),
        graph.dependency_index.len()
    );
    for region in &graph.regions {
        let count = graph
            .nodes
            .iter()
            .filter(|node| &node.region == region)
            .count();
        println!("  {}: {} nodes", region, count);
    }
}

#[derive(Debug, Serialize)]
struct LayoutJson {
    ticks: u64,
    #[serde(flatten)]
    snapshot: Snapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    classification: Option<Classification>,
}

fn handle_layout(args: LayoutArgs, config: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config.as_deref())?;
    let params = config.layout_params();
    let mut viewport: Viewport = config.viewport();
    if let Some(width) = args.width {
        viewport.width = width;
    }
    if let Some(height) = args.height {
        viewport.height = height;
    }

    let (lookup, network) = load_tables(&args.tables)?;
    let mut viewer = Viewer::new(params, viewport);
    viewer.load_graph(&lookup, &network);
    if let Some(route) = args.select.as_deref() {
        viewer.select_node(Some(DlcId::new(route)));
    }

    viewer.start();
    let bar = ProgressBar::new(args.ticks);
    bar.set_style(
        ProgressStyle::with_template("{spinner} layout {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let mut ticks = 0;
    while ticks < args.ticks {
        if !viewer.tick()? {
            break;
        }
        ticks += 1;
        bar.inc(1);
    }
    bar.finish_and_clear();
    viewer.stop();

    if args.json {
        let classification = args.select.as_deref().map(|_| viewer.classification());
        let json = LayoutJson {
            ticks,
            snapshot: viewer.snapshot(),
            classification,
        };
        println!("{}", to_json(&json)?);
        return Ok(());
    }

    println!("rest after {} ticks", ticks);
    for node in viewer.snapshot().nodes {
        println!("{} {:.2} {:.2}", node.id, node.x, node.y);
    }
    Ok(())
}

fn handle_deps(args: DepsArgs) -> Result<()> {
    let (lookup, network) = load_tables(&args.tables)?;
    let resolver = IdentifierResolver::new(&lookup);
    let graph = build_graph(&network, &resolver);

    // Accept either a short name or a canonical route name.
    let route = if graph.dependency_index.contains(&DlcId::new(&args.route)) {
        DlcId::new(&args.route)
    } else if let Some(short) = resolver.short_for(&args.route) {
        DlcId::new(short)
    } else {
        DlcId::new(&args.route)
    };

    let entries = graph
        .dependency_index
        .get(&route)
        .ok_or_else(|| LocographError::Other(anyhow::anyhow!("unknown route {}", args.route)))?;

    if args.closure {
        let mut closure: Vec<String> = highlight::required_closure(&graph.dependency_index, &route)
            .into_iter()
            .collect();
        closure.sort();
        if args.json {
            println!("{}", to_json(&closure)?);
        } else {
            for name in closure {
                println!("{}", name);
            }
        }
        return Ok(());
    }

    if args.json {
        println!("{}", to_json(&entries)?);
        return Ok(());
    }

    for entry in entries {
        let required: Vec<String> = entry
            .required_dlcs
            .iter()
            .map(|identity| {
                if identity.known {
                    identity.short_name.clone()
                } else {
                    format!("{} (unresolved)", identity.short_name)
                }
            })
            .collect();
        if required.is_empty() {
            println!("{}: no requirements", entry.locomotive);
        } else {
            println!("{}: {}", entry.locomotive, required.join(", "));
        }
    }
    Ok(())
}

fn handle_dot(args: TableArgs) -> Result<()> {
    let (lookup, network) = load_tables(&args)?;
    let resolver = IdentifierResolver::new(&lookup);
    let graph = build_graph(&network, &resolver);
    print!("{}", viz::render_dot(&graph));
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| LocographError::Other(anyhow::Error::new(err)))
}
