//! Referent resolution: crawl, bridge-match, infer-match, report.
//!
//! [`Resolver`] is the single entry point the downstream specialization
//! pipeline consumes. All per-pass state ([`Registries`]) is constructed
//! inside [`Resolver::resolve`] and dropped at the end, so nothing leaks
//! between utterances. The graph is mutated in place by binding; the `&mut`
//! receiver keeps concurrent resolution of one graph unrepresentable.

pub mod bridging;
pub mod entail;
pub mod scalar;

use serde::Serialize;

use crate::error::AnaphoraResult;
use crate::graph::crawl::crawl;
use crate::graph::{FeatureGraph, NodeId};
use crate::oracle::TypeOracle;
use crate::rules::RuleTable;

pub use entail::Entailment;

/// Configuration for a [`Resolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// How many intensifier sources may be promoted to inference targets per
    /// pass. The stock grammar produces one per utterance; raise this for
    /// grammars that stack intensifiers.
    pub max_inference_targets: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_inference_targets: 1,
        }
    }
}

/// Outcome of one resolution pass.
///
/// Unresolved leftovers are a normal terminal state, not an error; the
/// downstream pipeline decides whether they matter.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    /// (referent, antecedent) pairs bound during the pass.
    pub bound: Vec<(NodeId, NodeId)>,
    /// Referents still pending after the pass.
    pub unresolved: Vec<NodeId>,
    /// Bridging schemas discovered but not consumed.
    pub bridges_remaining: usize,
}

impl ResolutionReport {
    /// Whether every discovered referent was discharged.
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// The resolution engine: owns the oracle, the rule table, and the config.
///
/// Stateless across calls; safe to reuse for any number of graphs.
pub struct Resolver<O: TypeOracle> {
    oracle: O,
    rules: RuleTable,
    config: ResolverConfig,
}

impl<O: TypeOracle> Resolver<O> {
    /// Create a resolver with the stock rule table and default config.
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            rules: RuleTable::default(),
            config: ResolverConfig::default(),
        }
    }

    /// Replace the bridge-rule table.
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the resolver configuration.
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Access the oracle (for callers that need ad-hoc type queries).
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Resolve one graph: crawl, bridge-match, infer-match.
    ///
    /// Binds zero or more referents in place and reports the outcome. An
    /// unknown bridging kind or an oracle failure aborts the pass; batches
    /// already bound before the abort stay bound (each batch is atomic, the
    /// pass as a whole is not transactional).
    pub fn resolve(&self, graph: &mut FeatureGraph) -> AnaphoraResult<ResolutionReport> {
        let mut registries = crawl(graph, &self.oracle, self.config.max_inference_targets)?;
        let pending_before = registries.unresolved.len();

        let mut bound = bridging::resolve_bridging(graph, &self.oracle, &self.rules, &mut registries)?;
        bound.extend(scalar::resolve_scalar(graph, &self.oracle, &mut registries)?);

        let report = ResolutionReport {
            bound: bound
                .iter()
                .map(|entailment| (entailment.target, entailment.antecedent))
                .collect(),
            unresolved: registries.unresolved.clone(),
            bridges_remaining: registries.bridges.len(),
        };
        tracing::info!(
            pending_before,
            bound = report.bound.len(),
            unresolved = report.unresolved.len(),
            bridges_remaining = report.bridges_remaining,
            "resolution pass complete"
        );
        Ok(report)
    }
}
