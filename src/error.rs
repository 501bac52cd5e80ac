//! Rich diagnostic error types for the anaphora engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly what went wrong and
//! how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the anaphora engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source chains) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum AnaphoraError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("node not found: {node_id}")]
    #[diagnostic(
        code(anaphora::graph::node_not_found),
        help(
            "The node handle does not point into this graph's arena. \
             Handles are only valid for the graph that allocated them."
        )
    )]
    NodeNotFound { node_id: u32 },

    #[error("graph has no root slots")]
    #[diagnostic(
        code(anaphora::graph::no_roots),
        help(
            "A feature graph must declare at least one named root slot \
             (e.g. the main predication) before it can be crawled."
        )
    )]
    NoRoots,

    #[error("malformed graph document: {message}")]
    #[diagnostic(
        code(anaphora::graph::malformed),
        help(
            "The serialized graph references node handles outside its own \
             node table. Re-export the graph from the analyzer."
        )
    )]
    Malformed { message: String },
}

// ---------------------------------------------------------------------------
// Oracle errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OracleError {
    #[error("oracle transport failure: {message}")]
    #[diagnostic(
        code(anaphora::oracle::transport),
        help(
            "A subtype or compatibility query could not reach the analyzer. \
             Check that the analyzer service is running and the URL is correct."
        )
    )]
    Transport { message: String },

    #[error("oracle returned a malformed reply: {message}")]
    #[diagnostic(
        code(anaphora::oracle::protocol),
        help(
            "The analyzer answered, but not with the expected JSON shape. \
             The engine and analyzer versions may be out of sync."
        )
    )]
    Protocol { message: String },

    #[error("unknown typesystem: {name}")]
    #[diagnostic(
        code(anaphora::oracle::unknown_typesystem),
        help("Valid typesystems are SCHEMA and ONTOLOGY.")
    )]
    UnknownTypesystem { name: String },

    #[error("type lattice parse error: {message}")]
    #[diagnostic(
        code(anaphora::oracle::lattice_parse),
        help(
            "The type-lattice TOML could not be parsed. Expected `[schema]` \
             and `[ontology]` tables mapping each type to its parent list, \
             e.g. `PersonRD = [\"RD\"]`."
        )
    )]
    LatticeParse { message: String },
}

// ---------------------------------------------------------------------------
// Rule-table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("unknown bridging kind: {kind}")]
    #[diagnostic(
        code(anaphora::rules::unknown_kind),
        help(
            "A bridging schema in the graph carries a kind with no entry in \
             the bridge-rule table. This is a grammar/rule-table mismatch: \
             either the grammar emits a kind the engine does not know, or the \
             rule table was loaded from a stale file. Known kinds: thanks, \
             response, repetition."
        )
    )]
    UnknownKind { kind: String },

    #[error("rule table parse error: {message}")]
    #[diagnostic(
        code(anaphora::rules::parse),
        help(
            "The rule-table TOML could not be parsed. Each entry maps a \
             bridging kind to an ontology category, e.g. `thanks = \
             \"TransitiveAction\"`."
        )
    )]
    Parse { message: String },
}

// ---------------------------------------------------------------------------
// Analyzer client errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AnalyzerError {
    #[error("analyzer unavailable at {url}")]
    #[diagnostic(
        code(anaphora::analyzer::unavailable),
        help(
            "No analyzer is answering at this address. Start the analyzer \
             service or pass the correct --analyzer-url."
        )
    )]
    Unavailable { url: String },

    #[error("analyzer request failed: {message}")]
    #[diagnostic(
        code(anaphora::analyzer::request_failed),
        help("The HTTP request to the analyzer failed. Check connectivity and logs.")
    )]
    RequestFailed { message: String },

    #[error("analyzer rejected the utterance: {message}")]
    #[diagnostic(
        code(anaphora::analyzer::parse_rejected),
        help(
            "The analyzer could not produce a semantic parse for this input. \
             Treat this as \"no resolvable graph\", not as an engine fault."
        )
    )]
    ParseRejected { message: String },

    #[error("analyzer reply could not be decoded: {message}")]
    #[diagnostic(
        code(anaphora::analyzer::decode),
        help(
            "The analyzer's reply was not a valid graph document. \
             The engine and analyzer wire formats may be out of sync."
        )
    )]
    Decode { message: String },
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(anaphora::engine::invalid_config),
        help("Check the EngineConfig fields. {message}")
    )]
    InvalidConfig { message: String },

    #[error("config file error: {path}: {message}")]
    #[diagnostic(
        code(anaphora::engine::config_file),
        help("Ensure the file exists, is readable, and contains valid TOML.")
    )]
    ConfigFile { path: String, message: String },
}

/// Convenience alias for functions returning anaphora results.
pub type AnaphoraResult<T> = std::result::Result<T, AnaphoraError>;
