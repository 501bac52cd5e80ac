//! # anaphora
//!
//! A referring-expression resolution engine for semantic feature graphs.
//!
//! Given a rooted, possibly-reentrant graph of typed feature nodes produced
//! by an upstream semantic analyzer, the engine finds unresolved referring
//! devices (pronouns, anaphors), matches them against bridging constructions
//! and scalar-inference rules found elsewhere in the graph, validates each
//! proposed (referent, antecedent) pair against a type-compatibility oracle,
//! and binds the valid ones in place.
//!
//! ## Architecture
//!
//! - **Feature graph** (`graph`): arena-allocated nodes addressed by handle,
//!   with a union-style binding store
//! - **Crawler** (`graph::crawl`): one DFS pass classifying every reachable
//!   node into per-pass registries
//! - **Resolution** (`resolve`): bridging matcher, scalar-inference resolver,
//!   and the atomic entailment validator/binder
//! - **Oracle** (`oracle`): subtype/compatibility queries, answered in-memory
//!   or by the remote analyzer (`analyzer`)
//!
//! ## Library usage
//!
//! ```
//! use anaphora::graph::{FeatureGraph, FeatureNode, names};
//! use anaphora::oracle::TypeLattice;
//! use anaphora::resolve::Resolver;
//!
//! let mut lattice = TypeLattice::new();
//! lattice.add_schema("PronounRD", "RD");
//!
//! let mut graph = FeatureGraph::new();
//! let sentinel = graph.add_node(FeatureNode::schema(names::ANTECEDENT));
//! let pronoun = graph.add_node(
//!     FeatureNode::schema("PronounRD").with_slot(names::REFERENT, sentinel),
//! );
//! let root = graph.add_node(FeatureNode::schema("Root").with_slot("subject", pronoun));
//! graph.add_root("m", root);
//!
//! let resolver = Resolver::new(lattice);
//! let report = resolver.resolve(&mut graph).unwrap();
//! assert_eq!(report.unresolved, vec![pronoun]); // nothing to bridge against
//! ```

pub mod analyzer;
pub mod engine;
pub mod error;
pub mod graph;
pub mod oracle;
pub mod resolve;
pub mod rules;
