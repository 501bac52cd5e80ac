//! Entailment validation and binding.
//!
//! An entailment batch is all-or-nothing: every pair must pass feature-level
//! compatibility against the oracle before any pair is bound. A rejected batch
//! is not an error; the proposing matcher simply moves on to its next
//! candidate.

use crate::error::OracleError;
use crate::graph::crawl::Registries;
use crate::graph::{FeatureGraph, NodeId, Typesystem, names};
use crate::oracle::TypeOracle;

/// A proposed (referent, antecedent) binding pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entailment {
    /// The unresolved side, whose binding will move.
    pub target: NodeId,
    /// The resolved side. Never mutated by binding.
    pub antecedent: NodeId,
}

/// Check feature-level compatibility of every pair in the batch.
///
/// For each slot key present on both sides of a pair (the `referent` slot
/// itself excluded), if both children are filled, their types must be
/// mutually compatible in the ontology. One incompatible shared slot rejects
/// the whole batch.
pub fn validate_batch<O: TypeOracle>(
    graph: &FeatureGraph,
    oracle: &O,
    entailments: &[Entailment],
) -> Result<bool, OracleError> {
    for entailment in entailments {
        let target = graph.node(entailment.target);
        for (key, target_child) in &target.slots {
            if key == names::REFERENT {
                continue;
            }
            let Some(antecedent_child) = graph.slot(entailment.antecedent, key) else {
                continue;
            };
            let target_value = graph.node(*target_child);
            let antecedent_value = graph.node(antecedent_child);
            if !(target_value.filled && antecedent_value.filled) {
                continue;
            }
            if !oracle.is_compatible(
                Typesystem::Ontology,
                &target_value.type_name,
                &antecedent_value.type_name,
            )? {
                tracing::debug!(
                    target = %entailment.target,
                    antecedent = %entailment.antecedent,
                    slot = %key,
                    target_type = %target_value.type_name,
                    antecedent_type = %antecedent_value.type_name,
                    "entailment batch rejected on incompatible slot"
                );
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Bind every pair in a validated batch and retire the targets from the
/// pending set. Callers must have validated the batch first.
pub fn bind_batch(
    graph: &mut FeatureGraph,
    registries: &mut Registries,
    entailments: &[Entailment],
) {
    for entailment in entailments {
        graph.bind(entailment.target, entailment.antecedent);
        registries.remove_unresolved(entailment.target);
        tracing::info!(
            target = %entailment.target,
            antecedent = %entailment.antecedent,
            "bound referent"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FeatureNode;
    use crate::oracle::TypeLattice;

    fn lattice() -> TypeLattice {
        let mut l = TypeLattice::new();
        l.add_ontology("woman", "person");
        l.add_ontology("man", "person");
        l
    }

    /// A node with an `ontological-category` slot of the given type.
    fn categorized(graph: &mut FeatureGraph, category: &str) -> NodeId {
        let cat = graph.add_node(FeatureNode::ontology(category));
        graph.add_node(FeatureNode::schema("RD").with_slot("ontological-category", cat))
    }

    #[test]
    fn compatible_pair_validates() {
        let mut graph = FeatureGraph::new();
        let pronoun = categorized(&mut graph, "person");
        let alice = categorized(&mut graph, "woman");
        let batch = [Entailment {
            target: pronoun,
            antecedent: alice,
        }];
        assert!(validate_batch(&graph, &lattice(), &batch).unwrap());
    }

    #[test]
    fn incompatible_pair_rejects() {
        let mut graph = FeatureGraph::new();
        let pronoun = categorized(&mut graph, "woman");
        let table = categorized(&mut graph, "artifact");
        let batch = [Entailment {
            target: pronoun,
            antecedent: table,
        }];
        assert!(!validate_batch(&graph, &lattice(), &batch).unwrap());
    }

    #[test]
    fn one_bad_pair_rejects_whole_batch() {
        let mut graph = FeatureGraph::new();
        let good_target = categorized(&mut graph, "person");
        let good_antecedent = categorized(&mut graph, "woman");
        let bad_target = categorized(&mut graph, "woman");
        let bad_antecedent = categorized(&mut graph, "artifact");
        let batch = [
            Entailment {
                target: good_target,
                antecedent: good_antecedent,
            },
            Entailment {
                target: bad_target,
                antecedent: bad_antecedent,
            },
        ];
        assert!(!validate_batch(&graph, &lattice(), &batch).unwrap());
    }

    #[test]
    fn referent_slot_is_excluded_from_comparison() {
        let mut graph = FeatureGraph::new();
        // Both sides carry a `referent` slot with wildly different types;
        // validation must ignore it.
        let t_ref = graph.add_node(FeatureNode::schema(names::ANTECEDENT));
        let a_ref = graph.add_node(FeatureNode::ontology("artifact"));
        let target = graph.add_node(FeatureNode::schema("RD").with_slot(names::REFERENT, t_ref));
        let antecedent = graph.add_node(FeatureNode::schema("RD").with_slot(names::REFERENT, a_ref));
        let batch = [Entailment { target, antecedent }];
        assert!(validate_batch(&graph, &lattice(), &batch).unwrap());
    }

    #[test]
    fn unfilled_slots_are_skipped() {
        let mut graph = FeatureGraph::new();
        let t_cat = graph.add_node(FeatureNode::ontology("woman").unfilled());
        let a_cat = graph.add_node(FeatureNode::ontology("artifact"));
        let target = graph.add_node(FeatureNode::schema("RD").with_slot("ontological-category", t_cat));
        let antecedent =
            graph.add_node(FeatureNode::schema("RD").with_slot("ontological-category", a_cat));
        let batch = [Entailment { target, antecedent }];
        // The target's slot is an unfilled variable, so no comparison happens.
        assert!(validate_batch(&graph, &lattice(), &batch).unwrap());
    }

    #[test]
    fn bind_batch_retires_pending_referents() {
        let mut graph = FeatureGraph::new();
        let pronoun = categorized(&mut graph, "person");
        let alice = categorized(&mut graph, "woman");
        let mut registries = Registries::default();
        registries.unresolved.push(pronoun);

        bind_batch(
            &mut graph,
            &mut registries,
            &[Entailment {
                target: pronoun,
                antecedent: alice,
            }],
        );

        assert_eq!(graph.binding_of(pronoun), alice);
        assert!(!registries.is_unresolved(pronoun));
    }
}
