//! Client for the upstream analyzer service.
//!
//! The analyzer owns the grammar and the type ontology. This engine consumes
//! it through three operations: parsing an utterance into candidate feature
//! graphs, and the two oracle queries (subtype membership, ontological
//! compatibility). All calls are synchronous HTTP with JSON bodies; a stuck
//! analyzer stalls the resolution pass, which is the documented contract.

use serde::Deserialize;

use crate::error::{AnalyzerError, OracleError};
use crate::graph::{FeatureGraph, Typesystem};
use crate::oracle::TypeOracle;

/// Configuration for connecting to the analyzer service.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Base URL, e.g. `http://localhost:8090`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Synchronous HTTP client for the analyzer.
#[derive(Debug)]
pub struct AnalyzerClient {
    config: AnalyzerConfig,
}

#[derive(Debug, Deserialize)]
struct ParseReply {
    #[serde(default)]
    graphs: Vec<FeatureGraph>,
}

#[derive(Debug, Deserialize)]
struct BoolReply {
    result: bool,
}

impl AnalyzerClient {
    /// Create a client. No connection is made until the first request.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build()
    }

    /// Probe the analyzer's health endpoint.
    pub fn probe(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(5))
            .build();
        matches!(agent.get(&url).call(), Ok(resp) if resp.status() == 200)
    }

    /// Parse an utterance into zero or more candidate feature graphs.
    ///
    /// A parse rejection (the analyzer understood the request but could not
    /// produce a semantic parse) comes back as [`AnalyzerError::ParseRejected`];
    /// callers treat it as "no resolvable graph for this input".
    pub fn parse(&self, utterance: &str) -> Result<Vec<FeatureGraph>, AnalyzerError> {
        let url = format!("{}/parse", self.config.base_url);
        let body = serde_json::json!({ "utterance": utterance });

        let resp = self
            .agent()
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body.to_string())
            .map_err(|e| match e {
                ureq::Error::Status(422, resp) => AnalyzerError::ParseRejected {
                    message: resp
                        .into_string()
                        .unwrap_or_else(|_| "unparseable utterance".to_string()),
                },
                ureq::Error::Status(code, _) => AnalyzerError::RequestFailed {
                    message: format!("analyzer returned status {code}"),
                },
                ureq::Error::Transport(t) => AnalyzerError::Unavailable {
                    url: format!("{} ({t})", self.config.base_url),
                },
            })?;

        let text = resp.into_string().map_err(|e| AnalyzerError::Decode {
            message: e.to_string(),
        })?;
        let reply: ParseReply =
            serde_json::from_str(&text).map_err(|e| AnalyzerError::Decode {
                message: e.to_string(),
            })?;
        tracing::debug!(graphs = reply.graphs.len(), "analyzer parse complete");
        Ok(reply.graphs)
    }

    /// One oracle round trip: POST a query body, expect `{"result": bool}`.
    fn bool_query(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<bool, OracleError> {
        let url = format!("{}/{endpoint}", self.config.base_url);
        let resp = self
            .agent()
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body.to_string())
            .map_err(|e| OracleError::Transport {
                message: e.to_string(),
            })?;

        let text = resp.into_string().map_err(|e| OracleError::Protocol {
            message: e.to_string(),
        })?;
        let reply: BoolReply = serde_json::from_str(&text).map_err(|e| OracleError::Protocol {
            message: e.to_string(),
        })?;
        Ok(reply.result)
    }
}

impl TypeOracle for AnalyzerClient {
    fn is_subtype(
        &self,
        typesystem: Typesystem,
        type_name: &str,
        ancestor: &str,
    ) -> Result<bool, OracleError> {
        self.bool_query(
            "issubtype",
            serde_json::json!({
                "typesystem": typesystem.to_string(),
                "type": type_name,
                "ancestor": ancestor,
            }),
        )
    }

    fn is_compatible(
        &self,
        typesystem: Typesystem,
        a: &str,
        b: &str,
    ) -> Result<bool, OracleError> {
        self.bool_query(
            "iscompatible",
            serde_json::json!({
                "typesystem": typesystem.to_string(),
                "a": a,
                "b": b,
            }),
        )
    }
}
