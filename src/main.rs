//! linkeval CLI: link-prediction evaluation over JSON edge tables.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use linkeval::{
    Adjacency, EdgeOrder, EdgeTable, EvalConfig, build_adjacency, build_graph, recall_report,
    select_test_edges,
};

#[derive(Parser)]
#[command(name = "linkeval", version, about = "Link-prediction evaluation helpers")]
struct Cli {
    /// TOML config with [selection] and [recall] parameters.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// Edge table (JSON rows or columns with u, v, t).
    #[arg(long)]
    edges: PathBuf,

    /// Only nodes with more outgoing edges than this qualify.
    #[arg(long)]
    threshold: Option<usize>,

    /// Edges taken from each qualifying node.
    #[arg(long)]
    n_smallest: Option<usize>,

    /// Take the latest edges instead of the earliest.
    #[arg(long)]
    latest: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Select held-out test edges and print them as JSON.
    Select {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Split an edge table into training rows and held-out test edges.
    Split {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Where to write the training table.
        #[arg(long)]
        train_out: PathBuf,

        /// Where to write the test edges.
        #[arg(long)]
        test_out: PathBuf,
    },

    /// Print the adjacency mapping of an edge table as JSON.
    Adjacency {
        /// Edge table with u and v columns.
        #[arg(long)]
        edges: PathBuf,
    },

    /// Build the weighted graph of an edge table and print its size.
    Graph {
        /// Edge table with u, v and h columns.
        #[arg(long)]
        edges: PathBuf,
    },

    /// Compute recall@k of predicted neighbor sets against ground truth.
    Recall {
        /// Predicted adjacency mapping (JSON object of node -> [neighbors]).
        #[arg(long)]
        predicted: PathBuf,

        /// Ground-truth adjacency mapping.
        #[arg(long)]
        actual: PathBuf,

        /// Cap on each node's ground-truth count.
        #[arg(long)]
        k: Option<usize>,

        /// Also print each node's hits and denominator.
        #[arg(long)]
        per_node: bool,
    },

    /// Write the default configuration as TOML.
    InitConfig {
        /// Target path.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EvalConfig::load(path)?,
        None => EvalConfig::default(),
    };

    match cli.command {
        Commands::Select { selection } => {
            selection.apply(&mut config);
            config.validate()?;
            let table = EdgeTable::load_json(&selection.edges)?;
            let test_edges = select_test_edges(&table, &config.selection)?;
            let json = serde_json::to_string_pretty(&test_edges).into_diagnostic()?;
            println!("{json}");
        }

        Commands::Split {
            selection,
            train_out,
            test_out,
        } => {
            selection.apply(&mut config);
            config.validate()?;
            let table = EdgeTable::load_json(&selection.edges)?;
            let test_edges = select_test_edges(&table, &config.selection)?;
            let train = table.without_pairs(test_edges.iter().copied().map(Into::into))?;

            write_json(&train_out, &train.to_json_value())?;
            write_json(&test_out, &test_edges)?;
            tracing::info!(
                rows = table.len(),
                train = train.len(),
                test = test_edges.len(),
                "split edge table"
            );
            println!(
                "Wrote {} training rows to {} and {} test edges to {}",
                train.len(),
                train_out.display(),
                test_edges.len(),
                test_out.display()
            );
        }

        Commands::Adjacency { edges } => {
            let table = EdgeTable::load_json(&edges)?;
            let adjacency = build_adjacency(&table)?;
            let json = serde_json::to_string_pretty(&adjacency).into_diagnostic()?;
            println!("{json}");
        }

        Commands::Graph { edges } => {
            let table = EdgeTable::load_json(&edges)?;
            let graph = build_graph(&table)?;
            println!("Weighted graph from {}:", edges.display());
            println!("  rows:  {}", table.len());
            println!("  nodes: {}", graph.node_count());
            println!("  edges: {}", graph.edge_count());
        }

        Commands::Recall {
            predicted,
            actual,
            k,
            per_node,
        } => {
            if let Some(k) = k {
                config.recall.k = k;
            }
            config.validate()?;
            let predicted = Adjacency::load_json(&predicted)?;
            let actual = Adjacency::load_json(&actual)?;
            let report = recall_report(&predicted, &actual, config.recall.k)?;

            println!(
                "recall@{}: {:.6} ({} / {})",
                report.k,
                report.recall(),
                report.total_hits,
                report.total_actual
            );
            if per_node {
                for entry in &report.per_node {
                    println!(
                        "  {}: {} / {}",
                        entry.node, entry.hits, entry.denominator
                    );
                }
            }
        }

        Commands::InitConfig { path } => {
            EvalConfig::default().save(&path)?;
            println!("Wrote default config to {}", path.display());
        }
    }

    Ok(())
}

impl SelectionArgs {
    /// Override config values with the flags given on the command line.
    fn apply(&self, config: &mut EvalConfig) {
        if let Some(threshold) = self.threshold {
            config.selection.edges_threshold = threshold;
        }
        if let Some(n_smallest) = self.n_smallest {
            config.selection.n_smallest = n_smallest;
        }
        if self.latest {
            config.selection.order = EdgeOrder::Latest;
        }
    }
}

fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    std::fs::write(path, json).into_diagnostic()
}
