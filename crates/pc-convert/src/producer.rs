//! The model collaborator seam: connection settings, the producer trait, an
//! init-once handle for a shared producer and the response decoder.

use std::fmt;
use std::sync::{Arc, OnceLock};

use pc_core::{GraphDocument, GraphError};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::Strategy;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_HOSTED_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:8080";

const ENDPOINT_VAR: &str = "PROSECHART_MODEL_ENDPOINT";
const API_KEY_VAR: &str = "PROSECHART_API_KEY";
const LEGACY_API_KEY_VAR: &str = "GEMINI_API_KEY";
const MODEL_VAR: &str = "PROSECHART_MODEL";

/// Where and how to reach a model-backed producer.
#[derive(Clone, PartialEq, Eq)]
pub struct ModelConnection {
    pub endpoint: String,
    pub model: String,
    credential: Option<String>,
}

impl ModelConnection {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            credential: None,
        }
    }

    /// Defaults for a strategy: the hosted API or a local server, both with
    /// the default model and no credential.
    #[must_use]
    pub fn for_strategy(strategy: Strategy) -> Self {
        let endpoint = match strategy {
            Strategy::Local => DEFAULT_LOCAL_ENDPOINT,
            Strategy::RuleBased | Strategy::Hosted => DEFAULT_HOSTED_ENDPOINT,
        };
        Self::new(endpoint, DEFAULT_MODEL)
    }

    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        let credential = credential.into();
        self.credential = (!credential.trim().is_empty()).then_some(credential);
        self
    }

    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Build a connection from the process environment.
    #[must_use]
    pub fn from_env(strategy: Strategy) -> Self {
        Self::from_lookup(strategy, |key| std::env::var(key).ok())
    }

    /// Build a connection from an arbitrary variable lookup. Unset or blank
    /// variables fall back to the strategy defaults.
    pub fn from_lookup<F>(strategy: Strategy, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut connection = Self::for_strategy(strategy);
        if let Some(endpoint) = read(ENDPOINT_VAR) {
            connection.endpoint = endpoint;
        }
        if let Some(model) = read(MODEL_VAR) {
            connection.model = model;
        }
        connection.credential = read(API_KEY_VAR).or_else(|| read(LEGACY_API_KEY_VAR));
        connection
    }
}

impl fmt::Debug for ModelConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConnection")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Everything a producer needs to answer one conversion.
#[derive(Debug, Clone, Copy)]
pub struct ProducerRequest<'a> {
    pub text: &'a str,
    pub connection: &'a ModelConnection,
    /// JSON schema the response must follow.
    pub schema: &'a Value,
}

impl ProducerRequest<'_> {
    /// Instruction sent alongside the schema.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("Convert this text to a mermaid.js syntax: {}", self.text)
    }
}

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("model endpoint {endpoint} unreachable: {message}")]
    Unreachable { endpoint: String, message: String },
    #[error("model rejected the request: {0}")]
    Rejected(String),
    #[error("model response is not a graph document: {0}")]
    Malformed(#[from] GraphError),
}

/// Source of structured graphs for the model-backed strategies.
///
/// `Ok(None)` means the model answered with nothing usable.
pub trait GraphProducer: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ProducerError`] when the model cannot be reached or its
    /// answer does not decode.
    fn produce(&self, request: &ProducerRequest<'_>) -> Result<Option<GraphDocument>, ProducerError>;
}

impl<F> GraphProducer for F
where
    F: Fn(&ProducerRequest<'_>) -> Result<Option<GraphDocument>, ProducerError> + Send + Sync,
{
    fn produce(&self, request: &ProducerRequest<'_>) -> Result<Option<GraphDocument>, ProducerError> {
        self(request)
    }
}

/// Init-once handle to a shared producer.
///
/// `new` is `const`, so a slot can live in a `static` when one producer
/// should serve the whole process.
#[derive(Default)]
pub struct ProducerSlot {
    producer: OnceLock<Arc<dyn GraphProducer>>,
}

impl ProducerSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            producer: OnceLock::new(),
        }
    }

    /// Install the producer. The first install wins.
    ///
    /// # Errors
    ///
    /// Hands the rejected producer back when the slot is already filled.
    pub fn install(&self, producer: Arc<dyn GraphProducer>) -> Result<(), Arc<dyn GraphProducer>> {
        self.producer.set(producer)
    }

    /// The installed producer, or the one built by `init` on first use.
    pub fn get_or_install<F>(&self, init: F) -> Arc<dyn GraphProducer>
    where
        F: FnOnce() -> Arc<dyn GraphProducer>,
    {
        Arc::clone(self.producer.get_or_init(init))
    }

    #[must_use]
    pub fn get(&self) -> Option<Arc<dyn GraphProducer>> {
        self.producer.get().map(Arc::clone)
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.producer.get().is_some()
    }
}

impl fmt::Debug for ProducerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.trim_start_matches(|ch: char| ch.is_ascii_alphanumeric() || ch == '-');
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Decode a raw model answer into a graph document, tolerating a surrounding
/// Markdown code fence (with or without a `json`/`mermaid` tag).
///
/// # Errors
///
/// Returns [`GraphError`] when the body is not a valid graph document.
pub fn decode_model_response(raw: &str) -> Result<GraphDocument, GraphError> {
    let body = strip_code_fence(raw);
    debug!(bytes = body.len(), fenced = body.len() != raw.trim().len(), "decoding model response");
    GraphDocument::from_json_str(body)
}

/// Producer that replays one recorded model answer for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedProducer {
    response: String,
}

impl RecordedProducer {
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl GraphProducer for RecordedProducer {
    fn produce(&self, request: &ProducerRequest<'_>) -> Result<Option<GraphDocument>, ProducerError> {
        if strip_code_fence(&self.response).is_empty() {
            debug!(text = request.text, "recorded response is empty");
            return Ok(None);
        }
        Ok(Some(decode_model_response(&self.response)?))
    }
}
