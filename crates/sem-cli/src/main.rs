//! # sem-cli
//!
//! Command-line interface for the semantic-model compiler.
//!
//! Each subcommand runs one pipeline stage over CSV artifacts: `fsm`
//! builds the foundational model from a BIE sheet, `specialize`
//! resolves it into the business model, `graphwalk` produces the
//! hierarchical model, and `schema` renders an XML schema from it.
//! Output files are written only after a stage succeeds in full.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use sem_adapter_csv::{read_bie, read_lhm, read_semantic_rows, write_bsm, write_fsm, write_lhm};
use sem_bsm::ModuleCodes;
use sem_pipeline::{Pipeline, PipelineConfig};
use sem_xsd::{XsdConfig, XsdEmitter};

#[derive(Parser)]
#[command(name = "semc")]
#[command(about = "Semantic-model compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Input text encoding (utf-8 or utf-8-sig)
    #[arg(long, default_value = "utf-8")]
    encoding: String,

    /// Log selected associations and resolution steps
    #[arg(long)]
    trace: bool,

    /// Log per-class progress
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the foundational semantic model from a BIE sheet
    Fsm {
        /// BIE definition sheet
        input: String,

        /// FSM output file
        output: String,

        /// Module code prefixed to generated identifiers
        #[arg(long, default_value = "CO")]
        module_code: String,

        /// Sharing threshold for pooled abstract properties
        #[arg(long, default_value_t = 3)]
        threshold: u32,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Resolve specialization into the business semantic model
    Specialize {
        /// FSM input files, base first, joined with '+'
        inputs: String,

        /// BSM output file
        output: String,

        /// JSON file replacing the built-in module-code table
        #[arg(long)]
        modules: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Walk the business model into the hierarchical model
    Graphwalk {
        /// BSM input file
        input: String,

        /// LHM output file
        output: String,

        /// Root class term, repeatable
        #[arg(long, required = true)]
        root: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Render an XML schema from the hierarchical model
    Schema {
        /// LHM input file
        input: String,

        /// Schema output file
        output: String,

        /// Root class term the schema is named after
        #[arg(long)]
        root: String,

        /// Include dictionary annotations
        #[arg(long)]
        annotation: bool,

        /// Version date stamped into the schema (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

impl Commands {
    fn common(&self) -> &CommonArgs {
        match self {
            Commands::Fsm { common, .. }
            | Commands::Specialize { common, .. }
            | Commands::Graphwalk { common, .. }
            | Commands::Schema { common, .. } => common,
        }
    }
}

/// A failed run, split by exit code: unreadable input is 1, a model
/// or validation error is 2.
enum Failure {
    Input(anyhow::Error),
    Model(anyhow::Error),
}

impl Failure {
    fn code(&self) -> u8 {
        match self {
            Failure::Input(_) => 1,
            Failure::Model(_) => 2,
        }
    }

    fn error(&self) -> &anyhow::Error {
        match self {
            Failure::Input(e) | Failure::Model(e) => e,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.command.common());

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("error: {:#}", failure.error());
            ExitCode::from(failure.code())
        }
    }
}

fn init_logging(common: &CommonArgs) {
    let filter = if common.trace {
        "trace"
    } else if common.debug {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), Failure> {
    match command {
        Commands::Fsm {
            input,
            output,
            module_code,
            threshold,
            common,
        } => {
            let bytes = read_input(&input, &common.encoding)?;
            let rows = read_bie(bytes.as_slice()).map_err(model_error)?;

            let mut config = PipelineConfig::with_roots(Vec::new());
            config.fsm.module_code = module_code;
            config.fsm.threshold = threshold;
            let fsm = Pipeline::new(config).build_fsm(&rows).map_err(model_error)?;

            let mut rendered = Vec::new();
            write_fsm(&mut rendered, &fsm).map_err(model_error)?;
            write_output(&output, &rendered)?;
            tracing::info!(rows = fsm.len(), output, "fsm written");
            Ok(())
        }
        Commands::Specialize {
            inputs,
            output,
            modules,
            common,
        } => {
            let mut row_sets = Vec::new();
            for path in inputs.split('+') {
                let bytes = read_input(path, &common.encoding)?;
                row_sets.push(read_semantic_rows(bytes.as_slice()).map_err(model_error)?);
            }
            let codes = match modules {
                Some(path) => ModuleCodes::from_json_file(&path).map_err(model_error)?,
                None => ModuleCodes::default(),
            };

            let mut config = PipelineConfig::with_roots(Vec::new());
            config.modules = codes;
            let bsm = Pipeline::new(config)
                .specialize(&row_sets)
                .map_err(model_error)?;

            let mut rendered = Vec::new();
            write_bsm(&mut rendered, &bsm).map_err(model_error)?;
            write_output(&output, &rendered)?;
            tracing::info!(rows = bsm.len(), output, "bsm written");
            Ok(())
        }
        Commands::Graphwalk {
            input,
            output,
            root,
            common,
        } => {
            let bytes = read_input(&input, &common.encoding)?;
            let rows = read_semantic_rows(bytes.as_slice()).map_err(model_error)?;

            let lhm = Pipeline::new(PipelineConfig::with_roots(root))
                .graph_walk(&rows)
                .map_err(model_error)?;

            let mut rendered = Vec::new();
            write_lhm(&mut rendered, &lhm).map_err(model_error)?;
            write_output(&output, &rendered)?;
            tracing::info!(nodes = lhm.len(), output, "lhm written");
            Ok(())
        }
        Commands::Schema {
            input,
            output,
            root,
            annotation,
            date,
            common,
        } => {
            let bytes = read_input(&input, &common.encoding)?;
            let nodes = read_lhm(bytes.as_slice()).map_err(model_error)?;

            let mut config = XsdConfig::new(root).with_annotation(annotation);
            if let Some(date) = date {
                let stamp = parse_version_date(&date).map_err(model_error)?;
                let num = config.version_num.clone();
                config = config.with_version(num, stamp);
            }
            let text = XsdEmitter::new(config).emit(&nodes).map_err(model_error)?;

            write_output(&output, text.as_bytes())?;
            tracing::info!(bytes = text.len(), output, "schema written");
            Ok(())
        }
    }
}

fn model_error(e: impl Into<anyhow::Error>) -> Failure {
    Failure::Model(e.into())
}

/// Read an input file whole. The adapters tolerate a UTF-8 byte order
/// mark, so the two supported encodings share a code path.
fn read_input(path: &str, encoding: &str) -> Result<Vec<u8>, Failure> {
    match encoding {
        "utf-8" | "utf-8-sig" => {}
        other => {
            return Err(Failure::Input(anyhow::anyhow!(
                "unsupported encoding '{}'",
                other
            )));
        }
    }
    fs::read(Path::new(path))
        .with_context(|| format!("cannot read {}", path))
        .map_err(Failure::Input)
}

fn write_output(path: &str, rendered: &[u8]) -> Result<(), Failure> {
    fs::write(Path::new(path), rendered)
        .with_context(|| format!("cannot write {}", path))
        .map_err(Failure::Input)
}

/// Turn a YYYY-MM-DD flag into the compact timestamp the schema header
/// carries.
fn parse_version_date(date: &str) -> anyhow::Result<String> {
    let digits: String = date.chars().filter(char::is_ascii_digit).collect();
    if date.len() != 10 || digits.len() != 8 || date.split('-').count() != 3 {
        bail!("invalid date '{}', expected YYYY-MM-DD", date);
    }
    Ok(format!("{}000000", digits))
}
