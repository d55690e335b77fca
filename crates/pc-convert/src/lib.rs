#![forbid(unsafe_code)]

//! Selects between the rule-based sentence parser and a model-backed graph
//! producer, and renders whatever the chosen pipeline returns.

mod producer;

pub use producer::{
    DEFAULT_HOSTED_ENDPOINT, DEFAULT_LOCAL_ENDPOINT, DEFAULT_MODEL, GraphProducer,
    ModelConnection, ProducerError, ProducerRequest, ProducerSlot, RecordedProducer,
    decode_model_response,
};

use std::fmt;
use std::sync::Arc;

use pc_core::flowchart_response_schema;
use pc_parser::{ExtractionMethod, LexiconTagger, PhraseTagger, SentenceParser};
use pc_render::{RenderConfig, RenderError, render_with_config};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Which pipeline turns text into a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    RuleBased,
    /// Hosted model API
    Hosted,
    /// Model served from a local endpoint
    Local,
}

impl Strategy {
    pub const ALL: [Self; 3] = [Self::RuleBased, Self::Hosted, Self::Local];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RuleBased => "rule-based",
            Self::Hosted => "hosted",
            Self::Local => "local",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rule" | "rule-based" | "rules" | "deterministic" => Some(Self::RuleBased),
            "hosted" | "genai" | "remote" => Some(Self::Hosted),
            "local" | "neural" => Some(Self::Local),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_model_backed(self) -> bool {
        !matches!(self, Self::RuleBased)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a model-backed strategy combines with the rule-based parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchPolicy {
    /// The selected strategy runs alone.
    #[default]
    Exclusive,
    /// Always try the parser first; consult the model only when it finds
    /// nothing.
    RuleFirst,
}

impl DispatchPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::RuleFirst => "rule-first",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no producer registered for the {strategy} strategy")]
    ProducerUnavailable { strategy: Strategy },
    #[error(transparent)]
    Producer(#[from] ProducerError),
    #[error("model graph could not be rendered: {0}")]
    Render(#[from] RenderError),
}

/// Outcome of [`Converter::convert`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    /// Flowchart text, or `None` when the pipeline found nothing.
    pub diagram: Option<String>,
    /// Pipeline that produced (or failed to produce) the diagram.
    pub pipeline: Strategy,
    /// Extraction rule, for rule-based results.
    pub method: Option<ExtractionMethod>,
}

/// Strategy dispatcher over a sentence parser and one producer slot per
/// model-backed strategy.
#[derive(Debug)]
pub struct Converter<T = LexiconTagger> {
    parser: SentenceParser<T>,
    hosted: Arc<ProducerSlot>,
    local: Arc<ProducerSlot>,
    policy: DispatchPolicy,
    render_config: RenderConfig,
    schema: Value,
}

impl Default for Converter<LexiconTagger> {
    fn default() -> Self {
        Self::new(SentenceParser::new())
    }
}

impl<T: PhraseTagger> Converter<T> {
    #[must_use]
    pub fn new(parser: SentenceParser<T>) -> Self {
        Self {
            parser,
            hosted: Arc::new(ProducerSlot::new()),
            local: Arc::new(ProducerSlot::new()),
            policy: DispatchPolicy::default(),
            render_config: RenderConfig::default(),
            schema: flowchart_response_schema(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.render_config = config;
        self
    }

    /// Share an existing slot for a model-backed strategy. A rule-based
    /// strategy has no slot and is ignored.
    #[must_use]
    pub fn with_slot(mut self, strategy: Strategy, slot: Arc<ProducerSlot>) -> Self {
        match strategy {
            Strategy::Hosted => self.hosted = slot,
            Strategy::Local => self.local = slot,
            Strategy::RuleBased => warn!("rule-based strategy has no producer slot"),
        }
        self
    }

    /// Install a producer for a model-backed strategy. Returns `false` when
    /// the slot was already filled or the strategy takes no producer.
    pub fn install(&self, strategy: Strategy, producer: Arc<dyn GraphProducer>) -> bool {
        self.slot(strategy)
            .is_some_and(|slot| slot.install(producer).is_ok())
    }

    #[must_use]
    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    #[must_use]
    pub fn parser(&self) -> &SentenceParser<T> {
        &self.parser
    }

    fn slot(&self, strategy: Strategy) -> Option<&ProducerSlot> {
        match strategy {
            Strategy::RuleBased => None,
            Strategy::Hosted => Some(&self.hosted),
            Strategy::Local => Some(&self.local),
        }
    }

    /// Turn `text` into flowchart text with the selected strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::ProducerUnavailable`] when a model-backed
    /// strategy has no installed producer, and propagates producer and render
    /// failures.
    pub fn convert(
        &self,
        text: &str,
        strategy: Strategy,
        connection: &ModelConnection,
    ) -> Result<Conversion, ConvertError> {
        debug!(%strategy, policy = self.policy.as_str(), "dispatching conversion");
        if !strategy.is_model_backed() {
            return Ok(self.rule_based(text));
        }
        if self.policy == DispatchPolicy::RuleFirst {
            let conversion = self.rule_based(text);
            if conversion.diagram.is_some() {
                info!(%strategy, "rule-based parser answered; model not consulted");
                return Ok(conversion);
            }
        }
        self.model_backed(text, strategy, connection)
    }

    fn rule_based(&self, text: &str) -> Conversion {
        let extraction = self.parser.extract(text);
        Conversion {
            method: extraction.as_ref().map(|found| found.method),
            diagram: extraction.map(|found| found.diagram()),
            pipeline: Strategy::RuleBased,
        }
    }

    fn model_backed(
        &self,
        text: &str,
        strategy: Strategy,
        connection: &ModelConnection,
    ) -> Result<Conversion, ConvertError> {
        let producer = self
            .slot(strategy)
            .and_then(ProducerSlot::get)
            .ok_or(ConvertError::ProducerUnavailable { strategy })?;
        if strategy == Strategy::Hosted && connection.credential().is_none() {
            warn!(endpoint = %connection.endpoint, "hosted strategy without a credential");
        }

        let request = ProducerRequest {
            text,
            connection,
            schema: &self.schema,
        };
        let document = producer.produce(&request)?;
        let diagram = document
            .map(|document| render_with_config(&document, &self.render_config))
            .transpose()?;
        debug!(%strategy, found = diagram.is_some(), "model-backed conversion finished");
        Ok(Conversion {
            diagram,
            pipeline: strategy,
            method: None,
        })
    }
}
