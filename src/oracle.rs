//! Type-compatibility oracle: the external authority on subtype and
//! compatibility questions.
//!
//! Every type-hierarchy decision in the engine goes through [`TypeOracle`].
//! Production deployments answer these queries from the analyzer service
//! (see [`crate::analyzer`]); tests and offline runs use the in-memory
//! [`TypeLattice`], built from child → parent edges per typesystem.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::graph::Typesystem;

/// Answers "is type A a subtype of type B" and "are A and B compatible"
/// within a named typesystem.
///
/// Both queries are fallible: a remote oracle can be unreachable, and the
/// resolution pass must abort rather than bind unvalidated pairs.
pub trait TypeOracle {
    /// Subtype membership (reflexive: every type is a subtype of itself).
    fn is_subtype(
        &self,
        typesystem: Typesystem,
        type_name: &str,
        ancestor: &str,
    ) -> Result<bool, OracleError>;

    /// Symmetric ontological compatibility, distinct from subtyping.
    fn is_compatible(
        &self,
        typesystem: Typesystem,
        a: &str,
        b: &str,
    ) -> Result<bool, OracleError>;
}

/// Serialized lattice: per-typesystem tables mapping a type to its parents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LatticeDoc {
    #[serde(default)]
    schema: HashMap<String, Vec<String>>,
    #[serde(default)]
    ontology: HashMap<String, Vec<String>>,
}

/// In-memory type hierarchy.
///
/// Subtyping is the reflexive-transitive closure of the parent edges.
/// Compatibility holds when either side is a subtype of the other.
#[derive(Debug, Clone, Default)]
pub struct TypeLattice {
    schema: HashMap<String, Vec<String>>,
    ontology: HashMap<String, Vec<String>>,
}

impl TypeLattice {
    /// Create an empty lattice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `child` is a direct subtype of `parent` in the SCHEMA hierarchy.
    pub fn add_schema(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        self.schema.entry(child.into()).or_default().push(parent.into());
    }

    /// Record that `child` is a direct subtype of `parent` in the ONTOLOGY hierarchy.
    pub fn add_ontology(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        self.ontology
            .entry(child.into())
            .or_default()
            .push(parent.into());
    }

    /// Parse a lattice from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, OracleError> {
        let doc: LatticeDoc = toml::from_str(content).map_err(|e| OracleError::LatticeParse {
            message: e.to_string(),
        })?;
        Ok(Self {
            schema: doc.schema,
            ontology: doc.ontology,
        })
    }

    fn table(&self, typesystem: Typesystem) -> &HashMap<String, Vec<String>> {
        match typesystem {
            Typesystem::Schema => &self.schema,
            Typesystem::Ontology => &self.ontology,
        }
    }

    /// BFS over parent edges. Handles multiple inheritance and (defensively)
    /// cyclic parent declarations via the visited set.
    fn reaches(&self, typesystem: Typesystem, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let table = self.table(typesystem);
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let Some(parents) = table.get(current) else {
                continue;
            };
            for parent in parents {
                if parent == to {
                    return true;
                }
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        false
    }
}

impl TypeOracle for TypeLattice {
    fn is_subtype(
        &self,
        typesystem: Typesystem,
        type_name: &str,
        ancestor: &str,
    ) -> Result<bool, OracleError> {
        Ok(self.reaches(typesystem, type_name, ancestor))
    }

    fn is_compatible(
        &self,
        typesystem: Typesystem,
        a: &str,
        b: &str,
    ) -> Result<bool, OracleError> {
        Ok(self.reaches(typesystem, a, b) || self.reaches(typesystem, b, a))
    }
}

// Allows passing `&lattice` or boxed oracles anywhere a TypeOracle is expected.
impl<O: TypeOracle + ?Sized> TypeOracle for &O {
    fn is_subtype(
        &self,
        typesystem: Typesystem,
        type_name: &str,
        ancestor: &str,
    ) -> Result<bool, OracleError> {
        (**self).is_subtype(typesystem, type_name, ancestor)
    }

    fn is_compatible(
        &self,
        typesystem: Typesystem,
        a: &str,
        b: &str,
    ) -> Result<bool, OracleError> {
        (**self).is_compatible(typesystem, a, b)
    }
}
