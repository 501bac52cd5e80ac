//! Graph crawler: one depth-first pass that classifies every reachable node
//! and populates the per-pass registries.
//!
//! The crawl records, for each discovered node, the handle path from its root.
//! Paths are sequences of node handles (not attribute names), so the ancestor
//! guard in bridging is a plain membership check. Reentrancy is handled by a
//! visited set keyed on handle identity; each node is classified at most once
//! per crawl regardless of how many paths reach it.

use std::collections::{HashMap, HashSet};

use crate::error::OracleError;
use crate::graph::{FeatureGraph, NodeId, Typesystem, names};
use crate::oracle::TypeOracle;

/// A node discovered during the crawl, with its root-to-node handle path
/// (inclusive of the node itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub node: NodeId,
    pub path: Vec<NodeId>,
}

impl Discovery {
    /// Whether `other` lies on this discovery's path from the root.
    ///
    /// The path includes the discovered node, so this also answers
    /// "is `other` this node itself".
    pub fn path_contains(&self, other: NodeId) -> bool {
        self.path.contains(&other)
    }
}

/// Total classification of a node's referring status.
///
/// A node that superficially resembles an RD but lacks the expected `referent`
/// substructure classifies as `Resolved`: structurally malformed candidates
/// are treated as already resolved, never as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentStatus {
    /// An RD whose referent is already bound or absent.
    Resolved,
    /// An RD whose referent carries the `antecedent` sentinel.
    Unresolved,
    /// Not a referring device at all.
    NotReferring,
}

/// Registries produced by one crawl. Scoped to a single resolution pass;
/// constructed fresh inside `resolve` and dropped at the end.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Registries {
    /// Bridging schemas in registration order (the bridging tie-break:
    /// earlier-discovered bridges win).
    pub bridges: Vec<Discovery>,
    /// Every referring device, keyed by identity.
    pub rds: HashMap<NodeId, Discovery>,
    /// Unresolved RDs, in discovery order. Shrinks as referents bind.
    pub unresolved: Vec<NodeId>,
    /// Relative-scale records usable as inference sources.
    pub scale_sources: Vec<Discovery>,
    /// Intensifier modifications not (yet) promoted to targets.
    pub intensifier_sources: Vec<Discovery>,
    /// Intensifier modifications whose embedded referent is unresolved.
    pub inference_targets: Vec<Discovery>,
}

impl Registries {
    /// Whether the referent is still pending.
    pub fn is_unresolved(&self, id: NodeId) -> bool {
        self.unresolved.contains(&id)
    }

    /// Drop a referent from the pending list. Idempotent; a referent leaves
    /// the list exactly once, when bound.
    pub fn remove_unresolved(&mut self, id: NodeId) {
        self.unresolved.retain(|&pending| pending != id);
    }
}

/// Classify one node's referring status. Total: structural misses come back
/// as `Resolved`, only oracle failures propagate.
pub fn classify_referent<O: TypeOracle>(
    graph: &FeatureGraph,
    oracle: &O,
    id: NodeId,
) -> Result<ReferentStatus, OracleError> {
    let node = graph.node(id);
    if node.typesystem != Typesystem::Schema {
        return Ok(ReferentStatus::NotReferring);
    }
    if !oracle.is_subtype(Typesystem::Schema, &node.type_name, names::RD)? {
        return Ok(ReferentStatus::NotReferring);
    }
    // An RD whose binding has already moved is resolved, whatever its
    // structural referent slot still says.
    if graph.is_bound(id) {
        return Ok(ReferentStatus::Resolved);
    }
    match graph.slot(id, names::REFERENT) {
        Some(referent) if graph.node(referent).type_name == names::ANTECEDENT => {
            Ok(ReferentStatus::Unresolved)
        }
        // Missing or already-typed referent: nothing pending here.
        _ => Ok(ReferentStatus::Resolved),
    }
}

/// Crawl the graph from all declared roots, classifying every reachable node.
///
/// After the traversal, intensifier sources whose nested
/// `modifiedThing.modifiedThing` referent is still unresolved are promoted to
/// inference targets, up to `max_inference_targets`.
pub fn crawl<O: TypeOracle>(
    graph: &FeatureGraph,
    oracle: &O,
    max_inference_targets: usize,
) -> Result<Registries, OracleError> {
    let mut registries = Registries::default();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<Discovery> = graph
        .roots()
        .iter()
        .map(|&(_, root)| Discovery {
            node: root,
            path: vec![root],
        })
        .collect();

    while let Some(discovery) = stack.pop() {
        let id = discovery.node;
        if !visited.insert(id) {
            continue;
        }
        let node = graph.node(id);

        if node.typesystem == Typesystem::Schema {
            if oracle.is_subtype(Typesystem::Schema, &node.type_name, names::BRIDGE_SCHEMA)? {
                tracing::debug!(node = %id, r#type = %node.type_name, "registered bridging schema");
                registries.bridges.push(discovery.clone());
            }
            match classify_referent(graph, oracle, id)? {
                ReferentStatus::Unresolved => {
                    tracing::debug!(node = %id, r#type = %node.type_name, "unresolved referring device");
                    registries.rds.insert(id, discovery.clone());
                    registries.unresolved.push(id);
                }
                ReferentStatus::Resolved => {
                    registries.rds.insert(id, discovery.clone());
                }
                ReferentStatus::NotReferring => {}
            }
            if node.filled {
                if oracle.is_subtype(Typesystem::Schema, &node.type_name, names::RELATIVE_SCALE)? {
                    registries.scale_sources.push(discovery.clone());
                }
                if oracle.is_subtype(
                    Typesystem::Schema,
                    &node.type_name,
                    names::INTENSIFIER_MODIFICATION,
                )? {
                    registries.intensifier_sources.push(discovery.clone());
                }
            }
        }

        if node.filled {
            for &(_, child) in &node.slots {
                if !visited.contains(&child) {
                    let mut child_path = discovery.path.clone();
                    child_path.push(child);
                    stack.push(Discovery {
                        node: child,
                        path: child_path,
                    });
                }
            }
        }
    }

    promote_inference_targets(graph, &mut registries, max_inference_targets);

    tracing::debug!(
        bridges = registries.bridges.len(),
        rds = registries.rds.len(),
        unresolved = registries.unresolved.len(),
        scale_sources = registries.scale_sources.len(),
        inference_targets = registries.inference_targets.len(),
        "crawl complete"
    );
    Ok(registries)
}

/// Promotion pass: an intensifier source whose ultimate referent
/// (`modifiedThing.modifiedThing`) is still unresolved becomes a target.
/// Stops once `max_targets` have been promoted.
fn promote_inference_targets(
    graph: &FeatureGraph,
    registries: &mut Registries,
    max_targets: usize,
) {
    let mut remaining = Vec::with_capacity(registries.intensifier_sources.len());
    for source in registries.intensifier_sources.drain(..) {
        if registries.inference_targets.len() < max_targets
            && graph
                .slot_chain(source.node, &[names::MODIFIED_THING, names::MODIFIED_THING])
                .is_some_and(|referent| registries.unresolved.contains(&referent))
        {
            tracing::debug!(node = %source.node, "promoted intensifier source to inference target");
            registries.inference_targets.push(source);
        } else {
            remaining.push(source);
        }
    }
    registries.intensifier_sources = remaining;
}
