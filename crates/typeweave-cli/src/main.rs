mod source;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use typeweave_core::{
    build_flow_edges, summarize_flows, ConfidenceLevel, Config, CrossRepoMatch, CrossRepoMatcher,
    Extractor, ParserRegistry, RepoFlowSummary, TypeDefinition, TypeFlowEdge,
};

use crate::source::LocalRepoSource;

#[derive(Parser)]
#[command(name = "typeweave")]
#[command(about = "Extract type definitions and find shared data contracts across repositories", long_about = None)]
struct Cli {
    /// Config file (defaults to ./typeweave.toml, then the user config)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List file extensions with a parser
    Extensions,
    /// Extract types, relationships and modules from one repository
    Extract {
        /// Repository root
        path: PathBuf,

        /// Keep non-public types and fields
        #[arg(long)]
        include_private: bool,
    },
    /// Find types shared between repositories and how data flows between them
    Match {
        /// Repository roots (at least two)
        #[arg(required = true, num_args = 2..)]
        paths: Vec<PathBuf>,

        /// Minimum similarity for a flow edge (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        min_similarity: Option<u8>,
    },
    /// Print the default configuration as TOML
    Config,
}

#[derive(Serialize)]
struct FlowReport {
    #[serde(flatten)]
    edge: TypeFlowEdge,
    level: ConfidenceLevel,
}

#[derive(Serialize)]
struct MatchReport {
    matches: Vec<CrossRepoMatch>,
    flows: Vec<FlowReport>,
    summaries: Vec<RepoFlowSummary>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    match cli.command {
        Commands::Extensions => {
            let registry = ParserRegistry::new();
            for (language, extensions) in registry.list_parsers() {
                println!("{:<12} {}", language.as_str(), extensions.join(", "));
            }
        }
        Commands::Extract {
            path,
            include_private,
        } => {
            let mut extraction = config.extraction.clone();
            extraction.include_private |= include_private;
            let source = LocalRepoSource::new(&path, extraction.exclude_dirs.clone());
            let set = Extractor::new(extraction)
                .extract(&source)
                .with_context(|| format!("Failed to extract {}", path.display()))?;
            info!("{}: {}", source.name(), set.stats);
            println!("{}", serde_json::to_string_pretty(&set)?);
        }
        Commands::Match {
            paths,
            min_similarity,
        } => {
            let extractor = Extractor::new(config.extraction.clone());
            let mut by_repo: BTreeMap<String, Vec<TypeDefinition>> = BTreeMap::new();
            for path in &paths {
                let source = LocalRepoSource::new(path, config.extraction.exclude_dirs.clone());
                let name = source.name();
                if by_repo.contains_key(&name) {
                    bail!("Two repositories are both named '{}'", name);
                }
                let set = extractor
                    .extract(&source)
                    .with_context(|| format!("Failed to extract {}", path.display()))?;
                info!("{}: {}", name, set.stats);
                by_repo.insert(name, set.types);
            }

            let matching = &config.matching;
            let threshold = min_similarity.unwrap_or(matching.min_similarity);
            let matches = CrossRepoMatcher::new(matching.weights).find_matches(&by_repo);
            let edges = build_flow_edges(&matches, threshold);
            let summaries = summarize_flows(&edges);
            let flows = edges
                .into_iter()
                .map(|edge| FlowReport {
                    level: ConfidenceLevel::classify(
                        edge.confidence,
                        matching.high_confidence,
                        threshold,
                    ),
                    edge,
                })
                .collect();

            let report = MatchReport {
                matches,
                flows,
                summaries,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Config => {
            print!("{}", Config::default_config_string());
        }
    }

    Ok(())
}

/// Logs go to stderr so JSON on stdout stays clean.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
