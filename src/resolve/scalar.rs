//! Scalar inference: discharge unresolved referents that sit under an
//! intensifier modification, using relative-scale records seen elsewhere in
//! the graph.
//!
//! An inference target is an intensifier whose ultimate referent
//! (`modifiedThing.modifiedThing`) is still unresolved. A matching source is
//! a relative-scale record over the same property; which end of the scale the
//! referent binds to depends on the modification's direction and on negation
//! polarity found on the source's path from the root.

use crate::error::AnaphoraError;
use crate::graph::crawl::{Discovery, Registries};
use crate::graph::{FeatureGraph, NodeId, names};
use crate::oracle::TypeOracle;

use super::entail::{Entailment, bind_batch, validate_batch};

/// Direction of an intensifier modification along its property's scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    Up,
    Down,
}

impl ScaleDirection {
    /// Parse the direction from the `scaleDirection` slot's type label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "up" => Some(ScaleDirection::Up),
            "down" => Some(ScaleDirection::Down),
            _ => None,
        }
    }

    /// Which end of the scale the referent binds to.
    ///
    /// Negation flips the direction: "not bigger" points at the smaller end.
    pub fn scale_end(self, negated: bool) -> &'static str {
        match (negated, self) {
            (false, ScaleDirection::Up) | (true, ScaleDirection::Down) => names::LARGER,
            (false, ScaleDirection::Down) | (true, ScaleDirection::Up) => names::SMALLER,
        }
    }
}

/// Run the scalar-inference pass. Returns the pairs that were bound.
pub fn resolve_scalar<O: TypeOracle>(
    graph: &mut FeatureGraph,
    oracle: &O,
    registries: &mut Registries,
) -> Result<Vec<Entailment>, AnaphoraError> {
    if registries.inference_targets.is_empty() {
        return Ok(Vec::new());
    }

    let mut bound: Vec<Entailment> = Vec::new();
    let targets = registries.inference_targets.clone();

    for target in &targets {
        let Some(modification) = extract_modification(graph, target) else {
            continue;
        };
        if !registries.is_unresolved(modification.referent) {
            continue;
        }

        for source in registries.scale_sources.clone() {
            let Some(source_property) = graph.slot(source.node, names::PROPERTY) else {
                continue;
            };
            if graph.node(source_property).type_name != modification.property_type {
                continue;
            }

            let negated = path_polarity(graph, &source);
            let end = modification.direction.scale_end(negated);
            let Some(antecedent) = graph.slot(source.node, end) else {
                tracing::warn!(source = %source.node, end, "scale source lacks the chosen end slot");
                continue;
            };

            let batch = [Entailment {
                target: modification.referent,
                antecedent,
            }];
            if validate_batch(graph, oracle, &batch)? {
                bind_batch(graph, registries, &batch);
                tracing::info!(
                    target = %modification.referent,
                    antecedent = %antecedent,
                    negated,
                    direction = ?modification.direction,
                    "scalar inference bound referent"
                );
                bound.extend(batch);
                break;
            }
        }
    }

    Ok(bound)
}

/// The unpacked `modifiedThing` chain of an inference target.
struct Modification {
    /// The ultimate unresolved referent (`target.modifiedThing.modifiedThing`).
    referent: NodeId,
    /// Type name of the modification's `property` slot.
    property_type: String,
    direction: ScaleDirection,
}

/// Unpack an intensifier target. Structural misses disqualify the target
/// silently, same policy as referent classification.
fn extract_modification(graph: &FeatureGraph, target: &Discovery) -> Option<Modification> {
    let inner = graph.slot(target.node, names::MODIFIED_THING)?;
    let referent = graph.slot(inner, names::MODIFIED_THING)?;
    let property = graph.slot(inner, names::PROPERTY)?;
    let direction_slot = graph.slot(inner, names::SCALE_DIRECTION)?;
    let direction = ScaleDirection::from_label(&graph.node(direction_slot).type_name)?;
    Some(Modification {
        referent,
        property_type: graph.node(property).type_name.clone(),
        direction,
    })
}

/// Negation polarity of a scale source: walk its recorded path root-first;
/// the first ancestor carrying a `negated` slot decides (marker present and
/// filled means negated). No marker anywhere means plain polarity.
fn path_polarity(graph: &FeatureGraph, source: &Discovery) -> bool {
    source
        .path
        .iter()
        .find_map(|&ancestor| {
            graph
                .slot(ancestor, names::NEGATED)
                .map(|marker| graph.node(marker).filled)
        })
        .unwrap_or(false)
}
