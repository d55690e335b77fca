#![forbid(unsafe_code)]

//! prosechart CLI - turn sentences and graph documents into flowchart text.
//!
//! # Commands
//!
//! - `parse`: Rule-based sentence to flowchart conversion
//! - `tag`: Show the noun and verb phrases the tagger finds
//! - `render`: Render a JSON or YAML graph document
//! - `convert`: Dispatch between the parser and a model-backed producer
//! - `validate`: Check flowchart text against the diagram grammar
//! - `schema`: Print the response schema handed to models

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pc_convert::{
    Conversion, Converter, DispatchPolicy, ModelConnection, RecordedProducer, Strategy,
    decode_model_response,
};
use pc_core::{GraphDocument, Orientation, TaggedSentence, flowchart_response_schema};
use pc_parser::{
    Diagnostic, Extraction, ExtractionMethod, LexiconTagger, ParserConfig, PhraseTagger,
    SentenceParser, check_flowchart,
};
use pc_render::{RenderConfig, render_with_config};
use serde::Serialize;
use tracing::{debug, info, warn};

/// prosechart CLI - turn sentences and graph documents into flowchart text.
#[derive(Debug, Parser)]
#[command(
    name = "prosechart",
    version,
    about = "Turn sentences and graph documents into flowchart text",
    long_about = "Converts plain-language sentences into Mermaid-style flowcharts.\n\n\
        A rule-based parser handles sentences directly; structured graph documents\n\
        (for example from a language model) are rendered deterministically."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a sentence with the rule-based parser.
    Parse {
        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Flowchart orientation (TB, TD, BT, RL, LR)
        #[arg(long, value_parser = parse_orientation)]
        orientation: Option<Orientation>,

        /// Output the extraction as JSON
        #[arg(long, conflicts_with = "document")]
        json: bool,

        /// Output the extracted graph as a graph document for `render`
        #[arg(long)]
        document: bool,
    },

    /// Show the phrases the tagger finds in a sentence.
    Tag {
        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a graph document (JSON or YAML) to flowchart text.
    Render {
        /// Input file path, "-" for stdin, or inline document.
        #[arg(default_value = "-")]
        input: String,

        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Leave labels unquoted unless they need quotes
        #[arg(long)]
        bare_labels: bool,
    },

    /// Convert text with the selected strategy.
    Convert {
        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Pipeline to use
        #[arg(short, long, value_enum, default_value = "rule")]
        strategy: StrategyArg,

        /// How model-backed strategies combine with the parser
        #[arg(long, value_enum, default_value = "exclusive")]
        policy: PolicyArg,

        /// Recorded model response replayed by model-backed strategies
        #[arg(long)]
        model_response: Option<String>,

        /// Model endpoint (overrides PROSECHART_MODEL_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,

        /// Model credential (overrides PROSECHART_API_KEY / GEMINI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Model name (overrides PROSECHART_MODEL)
        #[arg(long)]
        model: Option<String>,

        /// Output the conversion as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check flowchart text against the diagram grammar.
    Validate {
        /// Input file path, "-" for stdin, or inline flowchart.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Print the JSON schema for model responses.
    Schema {
        /// Pretty-print the schema
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum StrategyArg {
    /// Rule-based sentence parser
    Rule,
    /// Hosted model API
    Hosted,
    /// Model on a local endpoint
    Local,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Rule => Self::RuleBased,
            StrategyArg::Hosted => Self::Hosted,
            StrategyArg::Local => Self::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum PolicyArg {
    /// The selected strategy runs alone
    Exclusive,
    /// Try the parser first, then the model
    RuleFirst,
}

impl From<PolicyArg> for DispatchPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Exclusive => Self::Exclusive,
            PolicyArg::RuleFirst => Self::RuleFirst,
        }
    }
}

/// Result of the parse command.
#[derive(Debug, Serialize)]
struct ParseReport<'a> {
    found: bool,
    method: Option<ExtractionMethod>,
    confidence: Option<f32>,
    diagram: Option<String>,
    extraction: Option<&'a Extraction>,
}

/// Result of validating a flowchart.
#[derive(Debug, Serialize)]
struct ValidateResult<'a> {
    valid: bool,
    orientation: Option<&'static str>,
    node_count: usize,
    link_count: usize,
    errors: Vec<&'a Diagnostic>,
    warnings: Vec<&'a Diagnostic>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Parse {
            input,
            orientation,
            json,
            document,
        } => cmd_parse(&input, orientation, json, document),

        Command::Tag { input, json } => cmd_tag(&input, json),

        Command::Render {
            input,
            output,
            bare_labels,
        } => cmd_render(&input, output.as_deref(), bare_labels),

        Command::Convert {
            input,
            strategy,
            policy,
            model_response,
            endpoint,
            api_key,
            model,
            json,
        } => {
            let strategy = Strategy::from(strategy);
            let mut connection = ModelConnection::from_env(strategy);
            if let Some(endpoint) = endpoint {
                connection.endpoint = endpoint;
            }
            if let Some(model) = model {
                connection.model = model;
            }
            if let Some(api_key) = api_key {
                connection = connection.with_credential(api_key);
            }
            cmd_convert(
                &input,
                strategy,
                policy.into(),
                model_response.as_deref(),
                &connection,
                json,
            )
        }

        Command::Validate {
            input,
            json,
            strict,
        } => cmd_validate(&input, json, strict),

        Command::Schema { pretty } => cmd_schema(pretty),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn parse_orientation(raw: &str) -> Result<Orientation, String> {
    Orientation::parse(raw).ok_or_else(|| {
        format!("unknown orientation `{raw}` (expected one of TB, TD, BT, RL, LR)")
    })
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).is_file() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Inline text
        Ok(input.to_string())
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(
    input: &str,
    orientation: Option<Orientation>,
    json_output: bool,
    document_output: bool,
) -> Result<()> {
    let text = load_input(input)?;
    let mut config = ParserConfig::default();
    if let Some(orientation) = orientation {
        config.orientation = orientation;
    }
    let parser = SentenceParser::new().with_config(config);
    let extraction = parser.extract(&text);

    if let Some(found) = &extraction {
        debug!(
            method = found.method.as_str(),
            nodes = found.graph.nodes.len(),
            edges = found.graph.edges.len(),
            "extraction finished"
        );
    }

    if json_output {
        let report = ParseReport {
            found: extraction.is_some(),
            method: extraction.as_ref().map(|found| found.method),
            confidence: extraction.as_ref().map(|found| found.confidence),
            diagram: extraction.as_ref().map(Extraction::diagram),
            extraction: extraction.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(found) = extraction.as_ref().filter(|_| document_output) {
        println!("{}", serde_json::to_string_pretty(&found.graph.to_document())?);
    } else if let Some(found) = &extraction {
        write_output(None, &with_newline(found.diagram()))?;
    }

    if extraction.is_none() {
        warn!("no structure found in input");
        std::process::exit(1);
    }
    Ok(())
}

// =============================================================================
// Command: tag
// =============================================================================

fn cmd_tag(input: &str, json_output: bool) -> Result<()> {
    let text = load_input(input)?;
    let tagged: TaggedSentence = LexiconTagger::new().tag(text.trim());

    if json_output {
        println!("{}", serde_json::to_string_pretty(&tagged)?);
        return Ok(());
    }

    for span in tagged.nouns.iter().chain(&tagged.verbs) {
        println!("{:<12} {}", span.role.as_str(), span.text);
    }
    if tagged.is_empty() {
        println!("(no phrases)");
    }
    Ok(())
}

// =============================================================================
// Command: render
// =============================================================================

/// Read a graph document as JSON (optionally fenced) or YAML.
fn load_document(source: &str) -> Result<GraphDocument> {
    let trimmed = source.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with("```") {
        decode_model_response(source).context("Failed to decode JSON graph document")
    } else {
        serde_yaml::from_str(source).context("Failed to decode YAML graph document")
    }
}

fn cmd_render(input: &str, output: Option<&str>, bare_labels: bool) -> Result<()> {
    let source = load_input(input)?;
    let document = load_document(&source)?;
    let config = if bare_labels {
        RenderConfig::bare()
    } else {
        RenderConfig::default()
    };

    let rendered = render_with_config(&document, &config).context("Failed to render document")?;
    write_output(output, &rendered)?;

    info!(
        "Rendered {} nodes, {} links",
        document.nodes.len(),
        document.links.len()
    );
    Ok(())
}

// =============================================================================
// Command: convert
// =============================================================================

fn cmd_convert(
    input: &str,
    strategy: Strategy,
    policy: DispatchPolicy,
    model_response: Option<&str>,
    connection: &ModelConnection,
    json_output: bool,
) -> Result<()> {
    let text = load_input(input)?;
    let converter = Converter::new(SentenceParser::new()).with_policy(policy);

    if let Some(path) = model_response {
        if !strategy.is_model_backed() && policy == DispatchPolicy::Exclusive {
            warn!("--model-response is ignored by the rule-based strategy");
        }
        let recorded = std::fs::read_to_string(path)
            .context(format!("Failed to read model response: {path}"))?;
        let installed = converter.install(strategy, Arc::new(RecordedProducer::new(recorded)));
        debug!(installed, %strategy, "recorded producer");
    }

    let conversion: Conversion = converter
        .convert(&text, strategy, connection)
        .context(format!("{strategy} conversion failed"))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&conversion)?);
    } else if let Some(diagram) = &conversion.diagram {
        write_output(None, &with_newline(diagram.clone()))?;
    }

    if conversion.diagram.is_none() {
        warn!(pipeline = %conversion.pipeline, "no diagram produced");
        std::process::exit(1);
    }
    Ok(())
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, json_output: bool, strict: bool) -> Result<()> {
    let source = load_input(input)?;
    let check = check_flowchart(&source);

    let errors: Vec<&Diagnostic> = check.errors().collect();
    let warnings: Vec<&Diagnostic> = check.warnings().collect();
    let valid = errors.is_empty() && (!strict || warnings.is_empty());

    let result = ValidateResult {
        valid,
        orientation: check.orientation.map(Orientation::as_str),
        node_count: check.nodes.len(),
        link_count: check.links.len(),
        errors,
        warnings,
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if result.valid {
            println!("✓ Valid flowchart");
        } else {
            println!("✗ Invalid flowchart");
        }

        println!("  Nodes: {}", result.node_count);
        println!("  Links: {}", result.link_count);

        if !result.errors.is_empty() {
            println!("\nErrors:");
            for diagnostic in &result.errors {
                println!("  {diagnostic}");
            }
        }

        if !result.warnings.is_empty() {
            println!("\nWarnings:");
            for diagnostic in &result.warnings {
                println!("  {diagnostic}");
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}

// =============================================================================
// Command: schema
// =============================================================================

fn cmd_schema(pretty: bool) -> Result<()> {
    let schema = flowchart_response_schema();
    let text = if pretty {
        serde_json::to_string_pretty(&schema)?
    } else {
        serde_json::to_string(&schema)?
    };
    println!("{text}");
    Ok(())
}
