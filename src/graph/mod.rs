//! Semantic feature graph: arena-allocated, possibly reentrant, handle-addressed.
//!
//! The analyzer produces a rooted graph of typed feature nodes. Two different
//! paths may lead to the identical node (shared substructure), so node sameness
//! is defined by handle identity, never by structural equality. The arena owns
//! every node; attribute edges are stored as [`NodeId`] handles rather than
//! owned values, which makes reentrancy and cycles representable without
//! ownership gymnastics.
//!
//! Binding lives in a separate store on the graph: resolving a referent
//! repoints its entry to the antecedent's entry, aliasing the two without
//! mutating the antecedent side.

pub mod crawl;

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Well-known type-category and slot names from the grammar.
pub mod names {
    /// Schema category for referring devices (pronouns, anaphors).
    pub const RD: &str = "RD";
    /// Schema category for bridging constructions.
    pub const BRIDGE_SCHEMA: &str = "BridgeSchema";
    /// Schema category for scalar-comparison records.
    pub const RELATIVE_SCALE: &str = "RelativeScale";
    /// Schema category for intensifier modifications.
    pub const INTENSIFIER_MODIFICATION: &str = "IntensifierModification";

    /// Referent sub-type marking an RD as unresolved.
    pub const ANTECEDENT: &str = "antecedent";

    pub const REFERENT: &str = "referent";
    pub const KIND: &str = "kind";
    pub const BRIDGE_AGENT: &str = "bridgeAgent";
    pub const BRIDGE_PATIENT: &str = "bridgePatient";
    pub const BRIDGE_THEME: &str = "bridgeTheme";
    pub const AGENT: &str = "agent";
    pub const PATIENT: &str = "patient";
    pub const SPEAKER: &str = "speaker";
    pub const LISTENER: &str = "listener";
    pub const MEDIA: &str = "media";
    pub const MODIFIED_THING: &str = "modifiedThing";
    pub const PROPERTY: &str = "property";
    pub const SCALE_DIRECTION: &str = "scaleDirection";
    pub const SMALLER: &str = "smaller";
    pub const LARGER: &str = "larger";
    pub const NEGATED: &str = "negated";
}

/// Unique, niche-optimized handle for a node in a [`FeatureGraph`] arena.
///
/// Uses `NonZeroU32` so that `Option<NodeId>` is the same size as `NodeId`.
/// Handles are only meaningful for the graph that allocated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Create a `NodeId` from a raw `u32`.
    ///
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(NodeId)
    }

    /// Get the underlying `u32` value.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Arena slot backing this handle.
    fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// The two type hierarchies a node's type can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Typesystem {
    /// Construction/schema types (RD, BridgeSchema, Communication, ...).
    Schema,
    /// Ontology types (person, artifact, ...), used for compatibility checks.
    Ontology,
}

impl std::fmt::Display for Typesystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typesystem::Schema => write!(f, "SCHEMA"),
            Typesystem::Ontology => write!(f, "ONTOLOGY"),
        }
    }
}

/// A single typed feature node.
///
/// `filled` distinguishes instantiated nodes from unfilled variables; only
/// filled nodes are expanded during traversal and compared during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureNode {
    /// Type name within `typesystem`.
    pub type_name: String,
    /// Which hierarchy `type_name` belongs to.
    pub typesystem: Typesystem,
    /// Whether the node has been instantiated (vs. left as a variable).
    pub filled: bool,
    /// Ordered attribute edges, by handle.
    #[serde(default)]
    pub slots: Vec<(String, NodeId)>,
}

impl FeatureNode {
    /// Create a filled node in the SCHEMA typesystem.
    pub fn schema(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            typesystem: Typesystem::Schema,
            filled: true,
            slots: Vec::new(),
        }
    }

    /// Create a filled node in the ONTOLOGY typesystem.
    pub fn ontology(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            typesystem: Typesystem::Ontology,
            filled: true,
            slots: Vec::new(),
        }
    }

    /// Mark the node as an unfilled variable.
    pub fn unfilled(mut self) -> Self {
        self.filled = false;
        self
    }

    /// Attach an attribute edge.
    pub fn with_slot(mut self, name: impl Into<String>, child: NodeId) -> Self {
        self.slots.push((name.into(), child));
        self
    }

    /// Look up an attribute edge by name.
    pub fn slot(&self, name: &str) -> Option<NodeId> {
        self.slots
            .iter()
            .find(|(slot_name, _)| slot_name == name)
            .map(|&(_, child)| child)
    }
}

/// Serialized form of a [`FeatureGraph`]: node table plus named roots.
///
/// The binding store is not part of the wire format; a freshly decoded graph
/// always starts with identity bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphDoc {
    nodes: Vec<FeatureNode>,
    roots: Vec<(String, NodeId)>,
}

/// A rooted, possibly-reentrant semantic feature graph.
///
/// Invariant: every `NodeId` stored in `roots`, in any node's `slots`, or in
/// the binding store points into this graph's arena. Construction through
/// [`FeatureGraph::add_node`] and deserialization validation both maintain it,
/// so internal lookups index without re-checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GraphDoc", into = "GraphDoc")]
pub struct FeatureGraph {
    nodes: Vec<FeatureNode>,
    roots: Vec<(String, NodeId)>,
    /// Binding store: `bindings[i]` is the node that handle `i+1` currently
    /// denotes. Identity until a referent is bound.
    bindings: Vec<NodeId>,
}

impl FeatureGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Allocate a node in the arena and return its handle.
    pub fn add_node(&mut self, node: FeatureNode) -> NodeId {
        self.nodes.push(node);
        // The arena can't reach u32::MAX nodes in practice; the +1 keeps
        // handle 0 free for the niche.
        let id = NodeId::new(self.nodes.len() as u32)
            .unwrap_or_else(|| unreachable!("arena length overflowed NodeId"));
        self.bindings.push(id);
        id
    }

    /// Declare a named root slot (e.g. `"m"` for the main predication).
    pub fn add_root(&mut self, name: impl Into<String>, id: NodeId) {
        self.roots.push((name.into(), id));
    }

    /// The declared root slots, in declaration order.
    pub fn roots(&self) -> &[(String, NodeId)] {
        &self.roots
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Access a node by handle.
    pub fn node(&self, id: NodeId) -> &FeatureNode {
        &self.nodes[id.index()]
    }

    /// Fallible node access for handles of unverified provenance.
    pub fn try_node(&self, id: NodeId) -> Result<&FeatureNode, GraphError> {
        self.nodes
            .get(id.index())
            .ok_or(GraphError::NodeNotFound { node_id: id.get() })
    }

    /// Look up an attribute edge on a node.
    pub fn slot(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id).slot(name)
    }

    /// Follow a chain of attribute edges, returning `None` at the first miss.
    pub fn slot_chain(&self, id: NodeId, path: &[&str]) -> Option<NodeId> {
        let mut current = id;
        for name in path {
            current = self.slot(current, name)?;
        }
        Some(current)
    }

    /// What a handle currently denotes, after any binding.
    pub fn binding_of(&self, id: NodeId) -> NodeId {
        self.bindings[id.index()]
    }

    /// Whether a handle has been rebound away from itself.
    pub fn is_bound(&self, id: NodeId) -> bool {
        self.bindings[id.index()] != id
    }

    /// Alias `target` to whatever `antecedent` denotes.
    ///
    /// Union-style merge: only the target's entry moves; the antecedent is
    /// never mutated. Irreversible within a resolution pass.
    pub fn bind(&mut self, target: NodeId, antecedent: NodeId) {
        self.bindings[target.index()] = self.bindings[antecedent.index()];
    }

    fn into_doc(self) -> GraphDoc {
        GraphDoc {
            nodes: self.nodes,
            roots: self.roots,
        }
    }

    fn from_doc(doc: GraphDoc) -> Result<Self, GraphError> {
        let node_count = doc.nodes.len() as u32;
        let check = |id: NodeId, context: &str| -> Result<(), GraphError> {
            if id.get() > node_count {
                return Err(GraphError::Malformed {
                    message: format!("{context} references {id} but the graph has {node_count} nodes"),
                });
            }
            Ok(())
        };

        for (name, id) in &doc.roots {
            check(*id, &format!("root slot \"{name}\""))?;
        }
        for (i, node) in doc.nodes.iter().enumerate() {
            for (slot_name, child) in &node.slots {
                check(*child, &format!("slot \"{slot_name}\" of node {}", i + 1))?;
            }
        }

        let bindings = (1..=node_count)
            .map(|raw| NodeId::new(raw).unwrap_or_else(|| unreachable!("raw starts at 1")))
            .collect();

        Ok(Self {
            nodes: doc.nodes,
            roots: doc.roots,
            bindings,
        })
    }
}

impl Default for FeatureGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl From<FeatureGraph> for GraphDoc {
    fn from(graph: FeatureGraph) -> Self {
        graph.into_doc()
    }
}

impl TryFrom<GraphDoc> for FeatureGraph {
    type Error = GraphError;

    fn try_from(doc: GraphDoc) -> Result<Self, Self::Error> {
        FeatureGraph::from_doc(doc)
    }
}
