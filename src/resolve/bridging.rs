//! Bridging matcher: discharge unresolved referents using bridging context.
//!
//! A second traversal over the graph visits every non-bridge schema node and
//! tries to match it against the registered bridging schemas, in registration
//! order (earlier-discovered bridges win ties). A successful match derives the
//! kind-specific entailment batch, validates it, binds it atomically, and
//! consumes the bridge — each bridging schema resolves at most one match per
//! pass.

use std::collections::HashSet;

use crate::error::AnaphoraError;
use crate::graph::crawl::{Discovery, Registries};
use crate::graph::{FeatureGraph, NodeId, Typesystem, names};
use crate::oracle::TypeOracle;
use crate::rules::{EntailmentSide, RuleTable};

use super::entail::{Entailment, bind_batch, validate_batch};

/// Run the bridging pass. Returns the pairs that were bound.
///
/// No-op (and makes no oracle calls) when there are no bridges or no
/// unresolved referents.
pub fn resolve_bridging<O: TypeOracle>(
    graph: &mut FeatureGraph,
    oracle: &O,
    rules: &RuleTable,
    registries: &mut Registries,
) -> Result<Vec<Entailment>, AnaphoraError> {
    if registries.bridges.is_empty() || registries.unresolved.is_empty() {
        return Ok(Vec::new());
    }

    let mut bound: Vec<Entailment> = Vec::new();
    let mut consumed: HashSet<NodeId> = HashSet::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<NodeId> = graph.roots().iter().map(|&(_, root)| root).collect();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let node = graph.node(id);

        if node.typesystem == Typesystem::Schema
            && !oracle.is_subtype(Typesystem::Schema, &node.type_name, names::BRIDGE_SCHEMA)?
        {
            if let Some(batch) = match_bridging_schema(graph, oracle, rules, registries, &consumed, id)?
            {
                let (bridge, entailments) = batch;
                bind_batch(graph, registries, &entailments);
                consumed.insert(bridge);
                bound.extend(entailments);
                tracing::info!(bridge = %bridge, candidate = %id, "bridging schema consumed");
            }
        }

        let node = graph.node(id);
        if node.filled {
            for &(_, child) in &node.slots {
                if !visited.contains(&child) {
                    stack.push(child);
                }
            }
        }
    }

    registries.bridges.retain(|d| !consumed.contains(&d.node));
    Ok(bound)
}

/// Try the candidate against each unconsumed bridge in registration order.
/// First valid match wins; returns the consumed bridge and its bound batch.
fn match_bridging_schema<O: TypeOracle>(
    graph: &FeatureGraph,
    oracle: &O,
    rules: &RuleTable,
    registries: &Registries,
    consumed: &HashSet<NodeId>,
    candidate: NodeId,
) -> Result<Option<(NodeId, Vec<Entailment>)>, AnaphoraError> {
    let candidate_type = &graph.node(candidate).type_name;

    for bridge in &registries.bridges {
        if consumed.contains(&bridge.node) {
            continue;
        }

        // The bridge's kind decides which ontology category a candidate must
        // fall under. A kind outside the rule table is fatal; a bridge with
        // no kind slot at all is a structural miss and is skipped.
        let Some(kind_slot) = graph.slot(bridge.node, names::KIND) else {
            tracing::warn!(bridge = %bridge.node, "bridging schema has no kind slot, skipping");
            continue;
        };
        let kind_label = &graph.node(kind_slot).type_name;
        let (kind, category) = rules.category_for(kind_label)?;

        if !oracle.is_subtype(Typesystem::Schema, candidate_type, category)? {
            continue;
        }

        // Ancestor guard: a bridge on the candidate's own path from the root
        // (or the candidate itself) would make the match circular.
        if bridge.path_contains(candidate) {
            tracing::debug!(
                bridge = %bridge.node,
                candidate = %candidate,
                "skipping ancestor bridge"
            );
            continue;
        }

        let Some(entailments) = build_entailments(graph, bridge, candidate, kind) else {
            continue;
        };

        if validate_batch(graph, oracle, &entailments)? {
            return Ok(Some((bridge.node, entailments)));
        }
        tracing::debug!(
            bridge = %bridge.node,
            candidate = %candidate,
            kind = %kind,
            "entailments failed validation, trying next bridge"
        );
    }

    Ok(None)
}

/// Derive the kind-specific entailment batch for a (bridge, candidate) pair.
///
/// Returns `None` when a slot named by the pattern is structurally absent on
/// either side; that bridge/candidate combination is simply not a match.
fn build_entailments(
    graph: &FeatureGraph,
    bridge: &Discovery,
    candidate: NodeId,
    kind: crate::rules::BridgeKind,
) -> Option<Vec<Entailment>> {
    let mut entailments = Vec::new();
    for pairing in kind.entailment_pattern() {
        let candidate_child = graph.slot(candidate, pairing.candidate_slot);
        let bridge_child = graph.slot(bridge.node, pairing.bridge_slot);
        let (Some(candidate_child), Some(bridge_child)) = (candidate_child, bridge_child) else {
            tracing::warn!(
                bridge = %bridge.node,
                candidate = %candidate,
                candidate_slot = pairing.candidate_slot,
                bridge_slot = pairing.bridge_slot,
                "missing slot for bridging pattern, candidate disqualified"
            );
            return None;
        };
        let (target, antecedent) = match pairing.target {
            EntailmentSide::Candidate => (candidate_child, bridge_child),
            EntailmentSide::Bridge => (bridge_child, candidate_child),
        };
        entailments.push(Entailment { target, antecedent });
    }
    Some(entailments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FeatureNode;
    use crate::graph::crawl::crawl;
    use crate::oracle::TypeLattice;

    fn lattice() -> TypeLattice {
        let mut l = TypeLattice::new();
        l.add_schema("ThanksBridge", "BridgeSchema");
        l.add_schema("Gratitude", "TransitiveAction");
        l.add_schema("Telling", "Communication");
        l.add_ontology("woman", "person");
        l.add_ontology("man", "person");
        l
    }

    /// An entity node carrying an ontological category slot.
    fn entity(graph: &mut FeatureGraph, category: &str) -> NodeId {
        let cat = graph.add_node(FeatureNode::ontology(category));
        graph.add_node(FeatureNode::schema("RD").with_slot("ontological-category", cat))
    }

    fn thanks_bridge(graph: &mut FeatureGraph, agent: NodeId, patient: NodeId) -> NodeId {
        let kind = graph.add_node(FeatureNode::schema("thanks"));
        graph.add_node(
            FeatureNode::schema("ThanksBridge")
                .with_slot(names::KIND, kind)
                .with_slot(names::BRIDGE_AGENT, agent)
                .with_slot(names::BRIDGE_PATIENT, patient),
        )
    }

    /// Thanks scenario: bridge carries Alice/Bob, a Gratitude action carries
    /// two compatible pronouns.
    fn thanks_graph(
        graph: &mut FeatureGraph,
    ) -> (NodeId, NodeId, NodeId, NodeId) {
        let alice = entity(graph, "woman");
        let bob = entity(graph, "man");
        let bridge = thanks_bridge(graph, alice, bob);

        let he = entity(graph, "person");
        let him = entity(graph, "person");
        let action = graph.add_node(
            FeatureNode::schema("Gratitude")
                .with_slot(names::AGENT, he)
                .with_slot(names::PATIENT, him),
        );
        let root = graph.add_node(
            FeatureNode::schema("Root")
                .with_slot("bridge", bridge)
                .with_slot("event", action),
        );
        graph.add_root("m", root);
        (alice, bob, he, him)
    }

    fn registries_with_pending(
        graph: &FeatureGraph,
        oracle: &TypeLattice,
        pending: &[NodeId],
    ) -> Registries {
        let mut registries = crawl(graph, oracle, 1).unwrap();
        // The toy RDs here have no referent substructure, so mark pending
        // referents explicitly.
        registries.unresolved = pending.to_vec();
        registries
    }

    #[test]
    fn thanks_bridge_binds_agent_and_patient() {
        let mut graph = FeatureGraph::new();
        let (alice, bob, he, him) = thanks_graph(&mut graph);
        let oracle = lattice();
        let mut registries = registries_with_pending(&graph, &oracle, &[he, him]);

        let bound =
            resolve_bridging(&mut graph, &oracle, &RuleTable::default(), &mut registries).unwrap();

        assert_eq!(bound.len(), 2);
        assert_eq!(graph.binding_of(he), alice);
        assert_eq!(graph.binding_of(him), bob);
        assert!(registries.bridges.is_empty(), "bridge must be consumed");
        assert!(registries.unresolved.is_empty());
    }

    #[test]
    fn no_bridges_is_a_noop() {
        let mut graph = FeatureGraph::new();
        let he = entity(&mut graph, "person");
        let root = graph.add_node(FeatureNode::schema("Root").with_slot("x", he));
        graph.add_root("m", root);
        let oracle = lattice();
        let mut registries = registries_with_pending(&graph, &oracle, &[he]);

        let bound =
            resolve_bridging(&mut graph, &oracle, &RuleTable::default(), &mut registries).unwrap();
        assert!(bound.is_empty());
        assert_eq!(registries.unresolved, vec![he]);
    }

    #[test]
    fn no_unresolved_referents_is_a_noop() {
        let mut graph = FeatureGraph::new();
        thanks_graph(&mut graph);
        let oracle = lattice();
        let mut registries = registries_with_pending(&graph, &oracle, &[]);

        let bound =
            resolve_bridging(&mut graph, &oracle, &RuleTable::default(), &mut registries).unwrap();
        assert!(bound.is_empty());
        assert_eq!(registries.bridges.len(), 1, "bridge must survive a no-op pass");
    }

    #[test]
    fn incompatible_candidate_leaves_bridge_registered() {
        let mut graph = FeatureGraph::new();
        let alice = entity(&mut graph, "woman");
        let bob = entity(&mut graph, "man");
        let bridge = thanks_bridge(&mut graph, alice, bob);

        // The action's agent is an artifact, incompatible with Alice.
        let it = entity(&mut graph, "artifact");
        let him = entity(&mut graph, "person");
        let action = graph.add_node(
            FeatureNode::schema("Gratitude")
                .with_slot(names::AGENT, it)
                .with_slot(names::PATIENT, him),
        );
        let root = graph.add_node(
            FeatureNode::schema("Root")
                .with_slot("bridge", bridge)
                .with_slot("event", action),
        );
        graph.add_root("m", root);

        let oracle = lattice();
        let mut registries = registries_with_pending(&graph, &oracle, &[it, him]);
        let bound =
            resolve_bridging(&mut graph, &oracle, &RuleTable::default(), &mut registries).unwrap();

        assert!(bound.is_empty());
        assert_eq!(registries.unresolved, vec![it, him]);
        assert_eq!(registries.bridges.len(), 1, "failed match must not consume the bridge");
        assert!(!graph.is_bound(it));
    }

    #[test]
    fn ancestor_candidate_is_never_matched() {
        let mut graph = FeatureGraph::new();
        let alice = entity(&mut graph, "woman");
        let bob = entity(&mut graph, "man");
        let kind = graph.add_node(FeatureNode::schema("thanks"));

        // The bridge sits *inside* the candidate action, so the candidate is
        // on the bridge's path from the root; matching would be circular.
        let he = entity(&mut graph, "person");
        let him = entity(&mut graph, "person");
        let bridge = graph.add_node(
            FeatureNode::schema("ThanksBridge")
                .with_slot(names::KIND, kind)
                .with_slot(names::BRIDGE_AGENT, alice)
                .with_slot(names::BRIDGE_PATIENT, bob),
        );
        let action = graph.add_node(
            FeatureNode::schema("Gratitude")
                .with_slot(names::AGENT, he)
                .with_slot(names::PATIENT, him)
                .with_slot("context", bridge),
        );
        let root = graph.add_node(FeatureNode::schema("Root").with_slot("event", action));
        graph.add_root("m", root);

        let oracle = lattice();
        let mut registries = registries_with_pending(&graph, &oracle, &[he, him]);
        let bound =
            resolve_bridging(&mut graph, &oracle, &RuleTable::default(), &mut registries).unwrap();

        assert!(bound.is_empty(), "ancestor guard must reject the embedded candidate");
        assert_eq!(registries.bridges.len(), 1);
    }

    #[test]
    fn unknown_bridge_kind_aborts_the_pass() {
        let mut graph = FeatureGraph::new();
        let alice = entity(&mut graph, "woman");
        let bob = entity(&mut graph, "man");
        let kind = graph.add_node(FeatureNode::schema("apology"));
        let bridge = graph.add_node(
            FeatureNode::schema("ThanksBridge")
                .with_slot(names::KIND, kind)
                .with_slot(names::BRIDGE_AGENT, alice)
                .with_slot(names::BRIDGE_PATIENT, bob),
        );
        let he = entity(&mut graph, "person");
        let him = entity(&mut graph, "person");
        let action = graph.add_node(
            FeatureNode::schema("Gratitude")
                .with_slot(names::AGENT, he)
                .with_slot(names::PATIENT, him),
        );
        let root = graph.add_node(
            FeatureNode::schema("Root")
                .with_slot("bridge", bridge)
                .with_slot("event", action),
        );
        graph.add_root("m", root);

        let oracle = lattice();
        let mut registries = registries_with_pending(&graph, &oracle, &[he, him]);
        let err = resolve_bridging(&mut graph, &oracle, &RuleTable::default(), &mut registries)
            .unwrap_err();
        assert!(matches!(
            err,
            AnaphoraError::Rule(crate::error::RuleError::UnknownKind { .. })
        ));
    }

    #[test]
    fn response_bridge_binds_three_slots_from_communication() {
        let mut graph = FeatureGraph::new();
        // Response bridge: the unresolved side is on the bridge.
        let b_agent = entity(&mut graph, "person");
        let b_patient = entity(&mut graph, "person");
        let b_theme = entity(&mut graph, "person");
        let kind = graph.add_node(FeatureNode::schema("response"));
        let bridge = graph.add_node(
            FeatureNode::schema("ThanksBridge")
                .with_slot(names::KIND, kind)
                .with_slot(names::BRIDGE_AGENT, b_agent)
                .with_slot(names::BRIDGE_PATIENT, b_patient)
                .with_slot(names::BRIDGE_THEME, b_theme),
        );

        let speaker = entity(&mut graph, "woman");
        let listener = entity(&mut graph, "man");
        let media = entity(&mut graph, "person");
        let telling = graph.add_node(
            FeatureNode::schema("Telling")
                .with_slot(names::SPEAKER, speaker)
                .with_slot(names::LISTENER, listener)
                .with_slot(names::MEDIA, media),
        );
        let root = graph.add_node(
            FeatureNode::schema("Root")
                .with_slot("bridge", bridge)
                .with_slot("event", telling),
        );
        graph.add_root("m", root);

        let oracle = lattice();
        let mut registries =
            registries_with_pending(&graph, &oracle, &[b_agent, b_patient, b_theme]);
        let bound =
            resolve_bridging(&mut graph, &oracle, &RuleTable::default(), &mut registries).unwrap();

        assert_eq!(bound.len(), 3);
        assert_eq!(graph.binding_of(b_agent), speaker);
        assert_eq!(graph.binding_of(b_patient), listener);
        assert_eq!(graph.binding_of(b_theme), media);
        assert!(registries.bridges.is_empty());
    }
}
