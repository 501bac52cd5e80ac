//! Static bridge-rule tables: which ontology category each bridging kind
//! licenses, and the slot correspondences its entailments follow.
//!
//! The kind enumeration is closed. A bridging schema carrying a kind outside
//! it is a grammar/rule-table mismatch and fails the whole resolution pass
//! rather than being skipped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::graph::names;

/// The closed set of bridging-construction kinds the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeKind {
    /// "Thanks" constructions bridge onto a transitive action's agent/patient.
    Thanks,
    /// "Response" constructions bridge onto a communication event.
    Response,
    /// "Repetition" constructions bridge onto a communication event.
    Repetition,
}

impl BridgeKind {
    /// All kinds, in rule-table order.
    pub const ALL: [BridgeKind; 3] = [
        BridgeKind::Thanks,
        BridgeKind::Response,
        BridgeKind::Repetition,
    ];

    /// Parse a kind from the type label carried on a bridge schema's `kind` slot.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "thanks" => Some(BridgeKind::Thanks),
            "response" => Some(BridgeKind::Response),
            "repetition" => Some(BridgeKind::Repetition),
            _ => None,
        }
    }

    /// The canonical label for this kind.
    pub fn label(self) -> &'static str {
        match self {
            BridgeKind::Thanks => "thanks",
            BridgeKind::Response => "response",
            BridgeKind::Repetition => "repetition",
        }
    }

    /// The slot correspondences this kind's entailments follow.
    ///
    /// Exhaustive by construction: adding a kind without a pattern is a
    /// compile error, so "unknown kind" can only arise from graph labels.
    pub fn entailment_pattern(self) -> &'static [SlotPairing] {
        match self {
            BridgeKind::Thanks => &[
                SlotPairing {
                    candidate_slot: names::AGENT,
                    bridge_slot: names::BRIDGE_AGENT,
                    target: EntailmentSide::Candidate,
                },
                SlotPairing {
                    candidate_slot: names::PATIENT,
                    bridge_slot: names::BRIDGE_PATIENT,
                    target: EntailmentSide::Candidate,
                },
            ],
            BridgeKind::Response | BridgeKind::Repetition => &[
                SlotPairing {
                    candidate_slot: names::SPEAKER,
                    bridge_slot: names::BRIDGE_AGENT,
                    target: EntailmentSide::Bridge,
                },
                SlotPairing {
                    candidate_slot: names::LISTENER,
                    bridge_slot: names::BRIDGE_PATIENT,
                    target: EntailmentSide::Bridge,
                },
                SlotPairing {
                    candidate_slot: names::MEDIA,
                    bridge_slot: names::BRIDGE_THEME,
                    target: EntailmentSide::Bridge,
                },
            ],
        }
    }
}

impl std::fmt::Display for BridgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Which side of a slot correspondence holds the unresolved referent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntailmentSide {
    /// The candidate schema's slot is the referent; the bridge slot is the antecedent.
    Candidate,
    /// The bridge's slot is the referent; the candidate slot is the antecedent.
    Bridge,
}

/// One slot correspondence in a kind's entailment pattern.
#[derive(Debug, Clone, Copy)]
pub struct SlotPairing {
    /// Slot read from the matched (non-bridge) schema.
    pub candidate_slot: &'static str,
    /// Slot read from the bridging schema.
    pub bridge_slot: &'static str,
    /// Which side is the unresolved referent.
    pub target: EntailmentSide,
}

/// Serialized rule table: bridging-kind label → ontology category.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleTableDoc {
    bridges: HashMap<String, String>,
}

/// The bridge-rule table: for each kind, the ontology category a candidate
/// schema must fall under to be matched by that kind of bridge.
///
/// Immutable during a resolution pass; supplied at resolver construction.
#[derive(Debug, Clone)]
pub struct RuleTable {
    categories: HashMap<BridgeKind, String>,
}

impl RuleTable {
    /// Look up the ontology category for a kind label read off a graph node.
    ///
    /// An unknown label is fatal for the current graph: a rule-table/grammar
    /// mismatch must surface, not be skipped.
    pub fn category_for(&self, kind_label: &str) -> Result<(BridgeKind, &str), RuleError> {
        let kind = BridgeKind::from_label(kind_label).ok_or_else(|| RuleError::UnknownKind {
            kind: kind_label.to_string(),
        })?;
        let category = self
            .categories
            .get(&kind)
            .ok_or_else(|| RuleError::UnknownKind {
                kind: kind_label.to_string(),
            })?;
        Ok((kind, category))
    }

    /// Parse a rule table from TOML, e.g.:
    ///
    /// ```toml
    /// [bridges]
    /// thanks = "TransitiveAction"
    /// response = "Communication"
    /// repetition = "Communication"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, RuleError> {
        let doc: RuleTableDoc = toml::from_str(content).map_err(|e| RuleError::Parse {
            message: e.to_string(),
        })?;
        let mut categories = HashMap::new();
        for (label, category) in doc.bridges {
            let kind = BridgeKind::from_label(&label)
                .ok_or_else(|| RuleError::UnknownKind { kind: label })?;
            categories.insert(kind, category);
        }
        if categories.is_empty() {
            return Err(RuleError::Parse {
                message: "rule table defines no bridges".into(),
            });
        }
        Ok(Self { categories })
    }

    /// Render the table as TOML.
    pub fn to_toml_string(&self) -> String {
        let doc = RuleTableDoc {
            bridges: self
                .categories
                .iter()
                .map(|(kind, category)| (kind.label().to_string(), category.clone()))
                .collect(),
        };
        // A HashMap of strings always serializes.
        toml::to_string_pretty(&doc).unwrap_or_default()
    }
}

impl Default for RuleTable {
    /// The built-in table matching the grammar's stock bridging constructions.
    fn default() -> Self {
        let mut categories = HashMap::new();
        categories.insert(BridgeKind::Thanks, "TransitiveAction".to_string());
        categories.insert(BridgeKind::Response, "Communication".to_string());
        categories.insert(BridgeKind::Repetition, "Communication".to_string());
        Self { categories }
    }
}
