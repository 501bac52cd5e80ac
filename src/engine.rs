//! Engine facade: analyzer client + resolver, wired at construction.
//!
//! The engine is the convenience layer for deployments that talk to a live
//! analyzer: it parses utterances into candidate graphs and resolves each one.
//! Library users who already hold graphs (or who want an in-memory oracle)
//! use [`crate::resolve::Resolver`] directly.

use std::path::PathBuf;

use crate::analyzer::{AnalyzerClient, AnalyzerConfig};
use crate::error::{AnalyzerError, AnaphoraResult, EngineError};
use crate::graph::FeatureGraph;
use crate::resolve::{ResolutionReport, Resolver, ResolverConfig};
use crate::rules::RuleTable;

/// Configuration for the anaphora engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Analyzer connection settings.
    pub analyzer: AnalyzerConfig,
    /// Optional TOML file overriding the stock bridge-rule table.
    pub rules_path: Option<PathBuf>,
    /// Resolver settings.
    pub resolver: ResolverConfig,
}

/// The anaphora resolution engine.
#[derive(Debug)]
pub struct Engine {
    analyzer: AnalyzerClient,
    rules: RuleTable,
    resolver_config: ResolverConfig,
}

impl Engine {
    /// Create an engine from configuration. Loads the rule table eagerly so
    /// a bad rules file fails here, not mid-utterance.
    pub fn new(config: EngineConfig) -> AnaphoraResult<Self> {
        if config.analyzer.base_url.is_empty() {
            return Err(EngineError::InvalidConfig {
                message: "analyzer base_url must not be empty".into(),
            }
            .into());
        }

        let rules = match &config.rules_path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| EngineError::ConfigFile {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                RuleTable::from_toml_str(&content)?
            }
            None => RuleTable::default(),
        };

        tracing::info!(
            analyzer = %config.analyzer.base_url,
            custom_rules = config.rules_path.is_some(),
            max_inference_targets = config.resolver.max_inference_targets,
            "initializing anaphora engine"
        );

        Ok(Self {
            analyzer: AnalyzerClient::new(config.analyzer),
            rules,
            resolver_config: config.resolver,
        })
    }

    /// Whether the analyzer answers its health endpoint.
    pub fn analyzer_available(&self) -> bool {
        self.analyzer.probe()
    }

    /// Resolve one already-parsed graph in place.
    pub fn resolve_graph(&self, graph: &mut FeatureGraph) -> AnaphoraResult<ResolutionReport> {
        self.resolver().resolve(graph)
    }

    /// Parse an utterance and resolve every candidate graph.
    ///
    /// A parse rejection yields an empty list ("no resolvable graph for this
    /// input"); transport and protocol failures propagate.
    pub fn resolve_utterance(
        &self,
        utterance: &str,
    ) -> AnaphoraResult<Vec<(FeatureGraph, ResolutionReport)>> {
        let graphs = match self.analyzer.parse(utterance) {
            Ok(graphs) => graphs,
            Err(AnalyzerError::ParseRejected { message }) => {
                tracing::warn!(%message, "analyzer rejected utterance");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let resolver = self.resolver();
        let mut resolved = Vec::with_capacity(graphs.len());
        for mut graph in graphs {
            let report = resolver.resolve(&mut graph)?;
            resolved.push((graph, report));
        }
        Ok(resolved)
    }

    fn resolver(&self) -> Resolver<&AnalyzerClient> {
        Resolver::new(&self.analyzer)
            .with_rules(self.rules.clone())
            .with_config(self.resolver_config.clone())
    }
}
