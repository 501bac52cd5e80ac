//! anaphora CLI: referring-expression resolution over semantic feature graphs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use anaphora::analyzer::AnalyzerConfig;
use anaphora::engine::{Engine, EngineConfig};
use anaphora::graph::FeatureGraph;
use anaphora::oracle::TypeLattice;
use anaphora::resolve::{ResolutionReport, Resolver, ResolverConfig};
use anaphora::rules::RuleTable;

#[derive(Parser)]
#[command(name = "anaphora", version, about = "Referring-expression resolution engine")]
struct Cli {
    /// TOML file overriding the stock bridge-rule table.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Maximum inference targets promoted per resolution pass.
    #[arg(long, global = true, default_value = "1")]
    max_inference_targets: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a serialized feature graph offline, against a type-lattice file.
    Resolve {
        /// Path to the graph JSON file.
        #[arg(long)]
        graph: PathBuf,

        /// Path to the type-lattice TOML file.
        #[arg(long)]
        types: PathBuf,

        /// Emit the report as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Parse an utterance via the analyzer service and resolve every candidate graph.
    Utterance {
        /// The utterance to parse and resolve.
        text: String,

        /// Analyzer base URL.
        #[arg(long, default_value = "http://localhost:8090")]
        analyzer_url: String,

        /// Analyzer request timeout in seconds.
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Print the active bridge-rule table.
    Rules,
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
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let rules = match &cli.rules {
        Some(path) => {
            let content = std::fs::read_to_string(path).into_diagnostic()?;
            RuleTable::from_toml_str(&content)?
        }
        None => RuleTable::default(),
    };
    let resolver_config = ResolverConfig {
        max_inference_targets: cli.max_inference_targets,
    };

    match cli.command {
        Commands::Resolve { graph, types, json } => {
            let graph_content = std::fs::read_to_string(&graph).into_diagnostic()?;
            let mut feature_graph: FeatureGraph =
                serde_json::from_str(&graph_content).into_diagnostic()?;
            if feature_graph.roots().is_empty() {
                return Err(anaphora::error::GraphError::NoRoots.into());
            }

            let lattice_content = std::fs::read_to_string(&types).into_diagnostic()?;
            let lattice = TypeLattice::from_toml_str(&lattice_content)?;

            let resolver = Resolver::new(lattice)
                .with_rules(rules)
                .with_config(resolver_config);
            let report = resolver.resolve(&mut feature_graph)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            } else {
                print_report(&report);
            }
        }

        Commands::Utterance {
            text,
            analyzer_url,
            timeout,
        } => {
            let engine = Engine::new(EngineConfig {
                analyzer: AnalyzerConfig {
                    base_url: analyzer_url,
                    timeout_secs: timeout,
                },
                rules_path: cli.rules.clone(),
                resolver: resolver_config,
            })?;

            let resolved = engine.resolve_utterance(&text)?;
            if resolved.is_empty() {
                println!("No resolvable graph for this input.");
            }
            for (index, (_, report)) in resolved.iter().enumerate() {
                println!("Candidate graph {}:", index + 1);
                print_report(report);
            }
        }

        Commands::Rules => {
            print!("{}", rules.to_toml_string());
        }
    }

    Ok(())
}

fn print_report(report: &ResolutionReport) {
    for (referent, antecedent) in &report.bound {
        println!("  bound {referent} -> {antecedent}");
    }
    if report.bound.is_empty() {
        println!("  nothing bound");
    }
    for referent in &report.unresolved {
        println!("  unresolved {referent}");
    }
    if report.bridges_remaining > 0 {
        println!("  {} bridging schema(s) left unconsumed", report.bridges_remaining);
    }
}
