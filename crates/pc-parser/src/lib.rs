#![forbid(unsafe_code)]

mod grammar;
mod graph_builder;
mod labels;
mod lexicon;
mod tagger;

use pc_core::{Orientation, TaggedSentence};
use serde::Serialize;
use tracing::debug;

pub use grammar::{
    CheckedLink, CheckedNode, Diagnostic, FlowchartCheck, Severity, check_flowchart,
};
pub use graph_builder::{SentenceEdge, SentenceGraph, SentenceNode};
pub use tagger::{LexiconTagger, PhraseTagger};

use graph_builder::SentenceGraphBuilder;
use labels::{clean_edge_label, clean_node_label};

const INTERROGATIVES: [&str; 6] = ["who", "what", "where", "when", "why", "how"];

/// Rule used to turn a sentence into a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Two or more noun phrases linked by the text between them
    NounChain,
    /// One noun phrase preceded by a verb phrase
    VerbObject,
    /// One noun phrase on its own
    SingleNoun,
    /// Question word followed by the rest of the question
    Interrogative,
    /// No noun phrase, first verb phrase as the only node
    VerbOnly,
    /// No phrases at all; the short sentence itself
    ShortText,
}

impl ExtractionMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NounChain => "noun chain",
            Self::VerbObject => "verb and object",
            Self::SingleNoun => "single noun phrase",
            Self::Interrogative => "interrogative",
            Self::VerbOnly => "verb phrase only",
            Self::ShortText => "short text fallback",
        }
    }

    /// How much of the sentence's structure the method captures (0.0 to 1.0).
    #[must_use]
    pub const fn confidence(self) -> f32 {
        match self {
            Self::NounChain => 0.9,
            Self::VerbObject => 0.8,
            Self::SingleNoun | Self::Interrogative => 0.6,
            Self::VerbOnly => 0.4,
            Self::ShortText => 0.2,
        }
    }
}

/// Tunables for [`SentenceParser`]. The defaults produce the canonical output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    pub orientation: Orientation,
    /// Sentences shorter than this many characters become a single node when
    /// no phrase is found.
    pub short_text_limit: usize,
    /// Edge labels longer than this are truncated with `...`.
    pub max_edge_label_chars: usize,
    /// Edge label when nothing meaningful sits between two noun phrases.
    pub chain_fallback_label: String,
    /// Edge label between a verb and its object when nothing separates them.
    pub verb_object_label: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::TB,
            short_text_limit: 50,
            max_edge_label_chars: 50,
            chain_fallback_label: "related to".to_string(),
            verb_object_label: "to".to_string(),
        }
    }
}

/// Structured result of [`SentenceParser::extract`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub graph: SentenceGraph,
    pub method: ExtractionMethod,
    /// Extraction confidence (0.0 to 1.0)
    pub confidence: f32,
    pub tagged: TaggedSentence,
}

impl Extraction {
    /// Flowchart text for the extracted graph.
    #[must_use]
    pub fn diagram(&self) -> String {
        self.graph.to_mermaid()
    }
}

/// Rule-based sentence-to-flowchart parser over a pluggable tagger.
#[derive(Debug, Clone, Default)]
pub struct SentenceParser<T = LexiconTagger> {
    tagger: T,
    config: ParserConfig,
}

impl SentenceParser<LexiconTagger> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: PhraseTagger> SentenceParser<T> {
    #[must_use]
    pub fn with_tagger(tagger: T) -> Self {
        Self {
            tagger,
            config: ParserConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[must_use]
    pub fn tagger(&self) -> &T {
        &self.tagger
    }

    /// Convert a sentence to flowchart text, or `None` when no structure
    /// can be extracted.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<String> {
        self.extract(text).map(|extraction| extraction.diagram())
    }

    /// Run the extraction rules and keep the intermediate results.
    #[must_use]
    pub fn extract(&self, text: &str) -> Option<Extraction> {
        let sentence = text.trim();
        if sentence.is_empty() {
            debug!("empty input; nothing to extract");
            return None;
        }

        let tagged = self.tagger.tag(sentence);
        let nouns = phrase_texts(&tagged.nouns);
        let verbs = phrase_texts(&tagged.verbs);
        debug!(
            nouns = nouns.len(),
            verbs = verbs.len(),
            "tagged sentence"
        );

        let (builder, method) = match nouns.as_slice() {
            [] => self.without_nouns(sentence, &verbs)?,
            [noun] => self.single_noun(sentence, noun, &verbs)?,
            _ => (self.noun_chain(sentence, &nouns), ExtractionMethod::NounChain),
        };
        let graph = builder.finish()?;
        debug!(
            method = method.as_str(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "extracted sentence graph"
        );
        Some(Extraction {
            graph,
            method,
            confidence: method.confidence(),
            tagged,
        })
    }

    fn builder(&self) -> SentenceGraphBuilder {
        SentenceGraphBuilder::new(self.config.orientation)
    }

    fn edge_label(&self, between: &str, fallback: &str) -> String {
        clean_edge_label(between, fallback, self.config.max_edge_label_chars)
    }

    /// Walk the noun phrases left to right; each phrase becomes a node and
    /// the text since the previous node becomes the edge label. Phrases not
    /// found after the cursor are skipped without moving it.
    fn noun_chain(&self, sentence: &str, nouns: &[&str]) -> SentenceGraphBuilder {
        let mut builder = self.builder();
        let mut remaining = sentence;
        let mut pending = String::new();
        let mut previous: Option<usize> = None;

        for noun in nouns {
            let Some(position) = remaining.find(noun) else {
                debug!(noun, "noun phrase not found after cursor; skipped");
                continue;
            };
            pending.push_str(&remaining[..position]);
            remaining = &remaining[position + noun.len()..];

            let Some(index) = builder.push_node(&clean_node_label(noun)) else {
                pending.push_str(noun);
                continue;
            };
            if let Some(previous) = previous {
                let label = self.edge_label(&pending, &self.config.chain_fallback_label);
                builder.push_edge(previous, index, Some(label));
            }
            previous = Some(index);
            pending.clear();
        }
        builder
    }

    /// A verb phrase before the single noun phrase yields `verb -> noun`;
    /// otherwise the noun phrase stands alone.
    fn single_noun(
        &self,
        sentence: &str,
        noun: &str,
        verbs: &[&str],
    ) -> Option<(SentenceGraphBuilder, ExtractionMethod)> {
        let noun_position = sentence.find(noun);
        let first_verb = verbs
            .iter()
            .filter_map(|verb| sentence.find(verb).map(|position| (position, *verb)))
            .min_by_key(|(position, _)| *position);

        if let (Some(noun_position), Some((verb_position, verb))) = (noun_position, first_verb)
            && verb_position < noun_position
        {
            let verb_end = verb_position + verb.len();
            let between = sentence.get(verb_end..noun_position).unwrap_or("");
            let mut builder = self.builder();
            if let (Some(from), Some(to)) = (
                builder.push_node(&clean_node_label(verb)),
                builder.push_node(&clean_node_label(noun)),
            ) {
                let label = self.edge_label(between, &self.config.verb_object_label);
                builder.push_edge(from, to, Some(label));
                return Some((builder, ExtractionMethod::VerbObject));
            }
        }

        let mut builder = self.builder();
        builder.push_node(&clean_node_label(noun))?;
        Some((builder, ExtractionMethod::SingleNoun))
    }

    /// Fallbacks in priority order: question word, first verb phrase, the
    /// whole sentence if it is short, then nothing.
    fn without_nouns(
        &self,
        sentence: &str,
        verbs: &[&str],
    ) -> Option<(SentenceGraphBuilder, ExtractionMethod)> {
        if let Some(found) = self.interrogative(sentence) {
            return Some(found);
        }

        let first_verb = verbs
            .iter()
            .filter_map(|verb| sentence.find(verb).map(|position| (position, *verb)))
            .min_by_key(|(position, _)| *position);
        if let Some((_, verb)) = first_verb {
            let mut builder = self.builder();
            if builder.push_node(&clean_node_label(verb)).is_some() {
                return Some((builder, ExtractionMethod::VerbOnly));
            }
        }

        if sentence.chars().count() < self.config.short_text_limit {
            let mut builder = self.builder();
            if builder.push_node(&clean_node_label(sentence)).is_some() {
                return Some((builder, ExtractionMethod::ShortText));
            }
        }
        None
    }

    fn interrogative(&self, sentence: &str) -> Option<(SentenceGraphBuilder, ExtractionMethod)> {
        let first_word = sentence.split_whitespace().next()?;
        let bare = first_word.trim_matches(|ch: char| !ch.is_alphanumeric());
        if !INTERROGATIVES.contains(&bare.to_lowercase().as_str()) {
            return None;
        }
        let remainder = clean_node_label(&sentence[first_word.len()..]);
        if remainder.is_empty() {
            return None;
        }
        let mut builder = self.builder();
        let question = builder.push_node(bare)?;
        let rest = builder.push_node(&remainder)?;
        builder.push_edge(question, rest, None);
        Some((builder, ExtractionMethod::Interrogative))
    }
}

fn phrase_texts(spans: &[pc_core::TaggedSpan]) -> Vec<&str> {
    spans
        .iter()
        .map(|span| span.text.as_str())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

/// Convert a sentence with the default lexicon tagger.
#[must_use]
pub fn parse(text: &str) -> Option<String> {
    SentenceParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use pc_core::{Orientation, TaggedSentence};
    use proptest::prelude::*;

    use super::{ExtractionMethod, ParserConfig, SentenceParser, check_flowchart, parse};

    fn fixed(
        nouns: &'static [&'static str],
        verbs: &'static [&'static str],
    ) -> SentenceParser<impl Fn(&str) -> TaggedSentence + Send + Sync> {
        SentenceParser::with_tagger(move |_: &str| {
            TaggedSentence::new(nouns.iter().copied(), verbs.iter().copied())
        })
    }

    #[test]
    fn subject_verb_object_sentence() {
        assert_eq!(
            parse("Client sends request").as_deref(),
            Some(
                "graph TB\n    node_0((\"Client\"))\n    node_1[\"request\"]\n    node_0 --> |\"sends\"| node_1"
            )
        );
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   \n\t"), None);
    }

    #[test]
    fn imperative_sentence_links_verb_to_object() {
        let parser = SentenceParser::new();
        let extraction = parser.extract("Start the server").expect("extraction");
        assert_eq!(extraction.method, ExtractionMethod::VerbObject);
        assert_eq!(
            extraction.diagram(),
            "graph TB\n    node_0((\"Start\"))\n    node_1[\"server\"]\n    node_0 --> |\"to\"| node_1"
        );
    }

    #[test]
    fn long_sentence_chains_noun_phrases() {
        let sentence = "The fast multipole method (FMM) is a numerical technique that was \
                        developed to speed up the calculation of long-ranged forces in the \
                        n-body problem.";
        let expected = "graph TB\n    node_0((\"fast multipole method FMM\"))\n    node_1[\"numerical technique\"]\n    node_2[\"calculation\"]\n    node_3[\"long-ranged forces\"]\n    node_4[\"n-body problem\"]\n    node_0 --> |\"is\"| node_1\n    node_1 --> |\"was developed to speed up\"| node_2\n    node_2 --> |\"of\"| node_3\n    node_3 --> |\"in\"| node_4";
        assert_eq!(parse(sentence).as_deref(), Some(expected));
    }

    #[test]
    fn greeting_becomes_single_node() {
        let extraction = SentenceParser::new()
            .extract("Hello world")
            .expect("extraction");
        assert_eq!(extraction.method, ExtractionMethod::SingleNoun);
        assert_eq!(extraction.diagram(), "graph TB\n    node_0((\"world\"))");
    }

    #[test]
    fn subject_with_trailing_verb_is_single_node() {
        assert_eq!(
            parse("Server starts").as_deref(),
            Some("graph TB\n    node_0((\"Server\"))")
        );
    }

    #[test]
    fn question_links_question_word_to_remainder() {
        let extraction = SentenceParser::new()
            .extract("How does it work")
            .expect("extraction");
        assert_eq!(extraction.method, ExtractionMethod::Interrogative);
        assert_eq!(
            extraction.diagram(),
            "graph TB\n    node_0((\"How\"))\n    node_1[\"does it work\"]\n    node_0 --> node_1"
        );
    }

    #[test]
    fn question_starting_with_who_links_to_remainder() {
        let expected = "graph TB\n    node_0((\"Who\"))\n    node_1[\"owns it\"]\n    node_0 --> node_1";

        let extraction = SentenceParser::new()
            .extract("Who owns it")
            .expect("extraction");
        assert_eq!(extraction.method, ExtractionMethod::Interrogative);
        assert_eq!(extraction.diagram(), expected);

        let extraction = fixed(&[], &["owns"])
            .extract("Who owns it")
            .expect("extraction");
        assert_eq!(extraction.method, ExtractionMethod::Interrogative);
        assert_eq!(extraction.diagram(), expected);
    }

    #[test]
    fn bare_question_word_falls_through_to_short_text() {
        let extraction = SentenceParser::new().extract("Why?").expect("extraction");
        assert_eq!(extraction.method, ExtractionMethod::ShortText);
        assert_eq!(extraction.diagram(), "graph TB\n    node_0((\"Why?\"))");
    }

    #[test]
    fn verb_without_nouns_becomes_single_node() {
        let parser = fixed(&[], &["deploy"]);
        let extraction = parser.extract("deploy now").expect("extraction");
        assert_eq!(extraction.method, ExtractionMethod::VerbOnly);
        assert_eq!(extraction.diagram(), "graph TB\n    node_0((\"deploy\"))");
    }

    #[test]
    fn long_text_without_phrases_yields_nothing() {
        let parser = fixed(&[], &[]);
        let sentence = "zzz ".repeat(20);
        assert!(sentence.trim().chars().count() >= 50);
        assert_eq!(parser.parse(&sentence), None);

        let short = parser.extract("zzz zzz").expect("short text");
        assert_eq!(short.method, ExtractionMethod::ShortText);
    }

    #[test]
    fn users_like_apps_about_games() {
        assert_eq!(
            parse("users likes apps about games").as_deref(),
            Some(
                "graph TB\n    node_0((\"users\"))\n    node_1[\"apps\"]\n    node_2[\"games\"]\n    node_0 --> |\"likes\"| node_1\n    node_1 --> |\"about\"| node_2"
            )
        );
    }

    #[test]
    fn unmatched_noun_phrases_are_skipped() {
        let parser = fixed(&["alpha", "zeta", "beta"], &[]);
        assert_eq!(
            parser.parse("alpha then beta").as_deref(),
            Some(
                "graph TB\n    node_0((\"alpha\"))\n    node_1[\"beta\"]\n    node_0 --> |\"then\"| node_1"
            )
        );
    }

    #[test]
    fn relative_pronoun_alone_uses_fallback_label() {
        let parser = fixed(&["cats", "dogs"], &[]);
        let diagram = parser.parse("cats that dogs").expect("diagram");
        assert!(diagram.ends_with("node_0 --> |\"related to\"| node_1"));
    }

    #[test]
    fn long_edge_labels_are_truncated() {
        let sentence = format!("start {} end", "m".repeat(60));
        let parser = fixed(&["start", "end"], &[]);
        let extraction = parser.extract(&sentence).expect("extraction");
        let label = extraction.graph.edges[0].label.clone().expect("label");
        assert_eq!(label, format!("{}...", "m".repeat(47)));
    }

    #[test]
    fn config_controls_orientation_and_fallbacks() {
        let config = ParserConfig {
            orientation: Orientation::LR,
            chain_fallback_label: "and".to_string(),
            ..ParserConfig::default()
        };
        let parser = fixed(&["cats", "dogs"], &[]).with_config(config);
        assert_eq!(
            parser.parse("cats dogs").as_deref(),
            Some("graph LR\n    node_0((\"cats\"))\n    node_1[\"dogs\"]\n    node_0 --> |\"and\"| node_1")
        );
    }

    #[test]
    fn extraction_reports_confidence_of_method() {
        let extraction = SentenceParser::new()
            .extract("Client sends request")
            .expect("extraction");
        assert_eq!(extraction.method, ExtractionMethod::NounChain);
        assert!((extraction.confidence - 0.9).abs() < f32::EPSILON);
        assert_eq!(extraction.tagged.nouns.len(), 2);
    }

    #[test]
    fn parser_output_passes_grammar_check() {
        for sentence in [
            "Client sends request",
            "Start the server",
            "How does it work",
            "Welcome to the era of Gemini 3.",
            "The user's \"profile\" [draft] is stored in {cache}",
        ] {
            let diagram = parse(sentence).expect("diagram");
            let check = check_flowchart(&diagram);
            assert!(check.is_valid(), "{sentence}: {:?}", check.diagnostics);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_parse_is_total_and_well_formed(input in ".{0,200}") {
            if let Some(diagram) = parse(&input) {
                prop_assert!(diagram.starts_with("graph TB\n    node_0(("));
                prop_assert_eq!(diagram.trim(), diagram.as_str());
                let check = check_flowchart(&diagram);
                prop_assert!(check.is_valid(), "{:?}", check.diagnostics);
            }
        }

        #[test]
        fn prop_parse_is_deterministic(input in "[A-Za-z ,.?]{0,120}") {
            prop_assert_eq!(parse(&input), parse(&input));
        }
    }
}
